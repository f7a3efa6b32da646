//! Static evaluation of constant expressions.
//!
//! The bundler only ever needs to fold expressions that prove, at build
//! time, that a value is a particular string: a string literal, a
//! parenthesized expression around one, or an identifier bound to one by the
//! module's scope pass. Anything else is [`Evaluation::Unresolved`] and the
//! caller decides what that means.

use std::collections::HashMap;

use swc_ecma_ast::{Expr, Lit};

/// Result of statically evaluating an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// The expression folds to a compile-time string.
    Str {
        value: String,
        /// The value was reached through an identifier binding rather than a
        /// literal at the use site.
        from_identifier: bool,
    },
    /// The expression cannot be folded at build time.
    Unresolved,
}

impl Evaluation {
    pub fn is_string(&self) -> bool {
        matches!(self, Evaluation::Str { .. })
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Evaluation::Str { value, .. } => Some(value),
            Evaluation::Unresolved => None,
        }
    }

    pub fn into_string(self) -> Option<String> {
        match self {
            Evaluation::Str { value, .. } => Some(value),
            Evaluation::Unresolved => None,
        }
    }
}

/// Statically evaluate `expr` against the module's collected string bindings.
pub fn evaluate(expr: &Expr, scope: &HashMap<String, String>) -> Evaluation {
    match expr {
        Expr::Paren(paren) => evaluate(&paren.expr, scope),
        Expr::Lit(Lit::Str(s)) => match s.value.as_str() {
            Some(value) => Evaluation::Str {
                value: value.to_string(),
                from_identifier: false,
            },
            None => Evaluation::Unresolved,
        },
        Expr::Ident(ident) => match scope.get(ident.sym.as_str()) {
            Some(value) => Evaluation::Str {
                value: value.clone(),
                from_identifier: true,
            },
            None => Evaluation::Unresolved,
        },
        _ => Evaluation::Unresolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swc_common::{FileName, SourceMap, sync::Lrc};
    use swc_ecma_ast::EsVersion;
    use swc_ecma_parser::{EsSyntax, Parser, StringInput, Syntax, lexer::Lexer};

    fn parse_expr(source: &str) -> Box<Expr> {
        let cm: Lrc<SourceMap> = Default::default();
        let fm = cm.new_source_file(Lrc::new(FileName::Anon), source.to_string());
        let lexer = Lexer::new(
            Syntax::Es(EsSyntax::default()),
            EsVersion::Es2022,
            StringInput::from(&*fm),
            None,
        );
        let mut parser = Parser::new_from(lexer);
        parser.parse_expr().expect("expression parses")
    }

    #[test]
    fn test_string_literal() {
        let expr = parse_expr(r#""./worker.js""#);
        assert_eq!(
            evaluate(&expr, &HashMap::new()),
            Evaluation::Str {
                value: "./worker.js".to_string(),
                from_identifier: false,
            }
        );
    }

    #[test]
    fn test_parenthesized_literal() {
        let expr = parse_expr(r#"("./worker.js")"#);
        assert_eq!(
            evaluate(&expr, &HashMap::new()).as_string(),
            Some("./worker.js")
        );
    }

    #[test]
    fn test_bound_identifier() {
        let expr = parse_expr("entry");
        let mut scope = HashMap::new();
        scope.insert("entry".to_string(), "./worker.js".to_string());
        assert_eq!(
            evaluate(&expr, &scope),
            Evaluation::Str {
                value: "./worker.js".to_string(),
                from_identifier: true,
            }
        );
    }

    #[test]
    fn test_unbound_identifier() {
        let expr = parse_expr("entry");
        assert_eq!(evaluate(&expr, &HashMap::new()), Evaluation::Unresolved);
    }

    #[test]
    fn test_call_is_unresolved() {
        let expr = parse_expr("getPath()");
        assert_eq!(evaluate(&expr, &HashMap::new()), Evaluation::Unresolved);
        assert!(!evaluate(&expr, &HashMap::new()).is_string());
    }

    #[test]
    fn test_non_string_literals_are_unresolved() {
        for source in ["42", "null", "true", "`./worker.js`"] {
            let expr = parse_expr(source);
            assert_eq!(
                evaluate(&expr, &HashMap::new()),
                Evaluation::Unresolved,
                "{source} should not fold to a string"
            );
        }
    }
}
