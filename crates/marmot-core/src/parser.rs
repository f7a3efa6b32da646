//! Module parsing and parse-event dispatch.
//!
//! [`ModuleParser`] parses one module with SWC and walks the syntax tree
//! twice: a scope pass collecting identifier bindings that fold to strings,
//! then a dispatch pass offering `new` expressions to the hook registry. All
//! rewriter state lives in the per-module [`ModuleContext`], so modules
//! parsed concurrently by the host share nothing and need no locking.

use std::collections::HashMap;

use swc_common::{BytePos, FileName, SourceMap, Span, sync::Lrc};
use swc_ecma_ast::{EsVersion, Expr, NewExpr, Pat, Program, VarDeclarator};
use swc_ecma_parser::{EsSyntax, Parser, StringInput, Syntax, lexer::Lexer};
use swc_ecma_visit::{Visit, VisitWith};

use crate::diagnostics::Warning;
use crate::dialect::SourceDialect;
use crate::error::{ParseError, ParseResult};
use crate::evaluate::{Evaluation, evaluate};
use crate::hooks::HookRegistry;
use crate::rewrite::{CodeReplacement, SyntheticImport, apply_replacements};

/// Per-module parse state handed to hook handlers.
///
/// Everything in here is created for one [`ModuleParser::parse`] call and
/// dropped with it, including the counter behind [`next_uid`]: generated
/// identifiers are unique within their module, and numbering restarts for
/// every module.
///
/// [`next_uid`]: ModuleContext::next_uid
pub struct ModuleContext {
    dialect: SourceDialect,
    source_map: Lrc<SourceMap>,
    file_start: BytePos,
    scope: HashMap<String, String>,
    uid: u32,
    warnings: Vec<Warning>,
    replacements: Vec<CodeReplacement>,
    synthetic_imports: Vec<SyntheticImport>,
}

impl ModuleContext {
    fn new(dialect: SourceDialect, source_map: Lrc<SourceMap>, file_start: BytePos) -> Self {
        Self {
            dialect,
            source_map,
            file_start,
            scope: HashMap::new(),
            uid: 0,
            warnings: Vec::new(),
            replacements: Vec::new(),
            synthetic_imports: Vec::new(),
        }
    }

    pub fn dialect(&self) -> SourceDialect {
        self.dialect
    }

    /// Statically evaluate an expression against this module's collected
    /// string bindings.
    pub fn evaluate_expression(&self, expr: &Expr) -> Evaluation {
        evaluate(expr, &self.scope)
    }

    /// Advance the per-module counter used for generated identifiers.
    ///
    /// The first call returns `1`.
    pub fn next_uid(&mut self) -> u32 {
        self.uid += 1;
        self.uid
    }

    /// Record a constant substitution covering `span`.
    pub fn replace_span(&mut self, span: Span, content: impl Into<String>) {
        self.replace_between(span.lo, span.hi, content);
    }

    /// Record a constant substitution between two source positions.
    pub fn replace_between(&mut self, lo: BytePos, hi: BytePos, content: impl Into<String>) {
        self.replacements.push(CodeReplacement {
            start: self.offset(lo),
            end: self.offset(hi),
            content: content.into(),
        });
    }

    /// Register a synthesized module-level binding resolving to `request`.
    pub fn add_synthetic_import(&mut self, name: impl Into<String>, request: impl Into<String>) {
        self.synthetic_imports.push(SyntheticImport {
            name: name.into(),
            request: request.into(),
        });
    }

    /// Append a warning positioned at `span` to the module's diagnostics.
    pub fn warn(&mut self, message: impl Into<String>, span: Span) {
        let loc = self.source_map.lookup_char_pos(span.lo);
        self.warnings.push(Warning {
            message: message.into(),
            line: loc.line,
            column: loc.col_display,
        });
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    fn offset(&self, pos: BytePos) -> u32 {
        pos.0 - self.file_start.0
    }
}

/// Outcome of parsing one module through the hook pipeline.
#[derive(Debug)]
pub struct ParsedModule {
    pub dialect: SourceDialect,
    pub source: String,
    pub warnings: Vec<Warning>,
    pub replacements: Vec<CodeReplacement>,
    pub synthetic_imports: Vec<SyntheticImport>,
}

impl ParsedModule {
    /// The module source with all recorded replacements applied.
    pub fn render(&self) -> String {
        apply_replacements(&self.source, &self.replacements)
    }
}

/// Parses modules and dispatches parse events to a hook registry.
pub struct ModuleParser<'a> {
    hooks: &'a HookRegistry,
}

impl<'a> ModuleParser<'a> {
    pub fn new(hooks: &'a HookRegistry) -> Self {
        Self { hooks }
    }

    /// Parse `source` under `dialect` and run the hook pipeline over it.
    pub fn parse(&self, source: &str, dialect: SourceDialect) -> ParseResult<ParsedModule> {
        let cm: Lrc<SourceMap> = Default::default();
        let fm = cm.new_source_file(Lrc::new(FileName::Anon), source.to_string());

        let lexer = Lexer::new(
            Syntax::Es(EsSyntax {
                jsx: false,
                ..Default::default()
            }),
            EsVersion::Es2022,
            StringInput::from(&*fm),
            None,
        );
        let mut parser = Parser::new_from(lexer);

        let program = match dialect {
            SourceDialect::Auto => parser.parse_program(),
            SourceDialect::Esm => parser.parse_module().map(Program::Module),
            SourceDialect::Dynamic => parser.parse_script().map(Program::Script),
        }
        .map_err(|e| ParseError::Syntax {
            dialect,
            message: format!("{:?}", e.kind()),
        })?;

        // Recoverable errors do not stop the pipeline.
        for _e in parser.take_errors() {}

        let mut ctx = ModuleContext::new(dialect, cm, fm.start_pos);

        let mut collector = ScopeCollector::default();
        program.visit_with(&mut collector);
        ctx.scope = collector.bindings;

        let mut dispatcher = HookDispatcher {
            ctx: &mut ctx,
            hooks: self.hooks,
        };
        program.visit_with(&mut dispatcher);

        Ok(ParsedModule {
            dialect,
            source: source.to_string(),
            warnings: ctx.warnings,
            replacements: ctx.replacements,
            synthetic_imports: ctx.synthetic_imports,
        })
    }
}

/// First pass: collect identifier bindings whose initializer folds to a
/// string, so evaluation sees bindings declared anywhere in the module.
/// A name bound more than once keeps its last foldable value.
#[derive(Default)]
struct ScopeCollector {
    bindings: HashMap<String, String>,
}

impl Visit for ScopeCollector {
    fn visit_var_declarator(&mut self, declarator: &VarDeclarator) {
        if let Pat::Ident(name) = &declarator.name
            && let Some(init) = declarator.init.as_deref()
            && let Evaluation::Str { value, .. } = evaluate(init, &self.bindings)
        {
            self.bindings.insert(name.id.sym.as_str().to_string(), value);
        }
        declarator.visit_children_with(self);
    }
}

/// Second pass: offer `new <Ident>(...)` expressions to registered handlers.
/// A claimed expression is not traversed further.
struct HookDispatcher<'a> {
    ctx: &'a mut ModuleContext,
    hooks: &'a HookRegistry,
}

impl Visit for HookDispatcher<'_> {
    fn visit_new_expr(&mut self, new_expr: &NewExpr) {
        if let Expr::Ident(ident) = &*new_expr.callee
            && self
                .hooks
                .dispatch_new_expr(self.ctx, ident.sym.as_str(), new_expr)
        {
            return;
        }
        new_expr.visit_children_with(self);
    }
}
