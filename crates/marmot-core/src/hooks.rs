//! Parse-event hook registry.
//!
//! Plugins subscribe to parse events instead of subclassing the parser: the
//! registry maps (dialect, constructor name) to an ordered list of handlers
//! for `new` expressions. Handlers run synchronously in registration order;
//! the first handler returning `true` claims the expression.

use std::collections::HashMap;
use std::sync::Arc;

use swc_ecma_ast::NewExpr;
use tracing::debug;

use crate::dialect::SourceDialect;
use crate::parser::ModuleContext;

/// Handler invoked for a matched `new` expression.
///
/// Returning `true` claims the expression: the parser neither traverses its
/// children nor offers it to later handlers. Returning `false` defers to the
/// parser's default handling.
pub type NewExprHandler = Arc<dyn Fn(&mut ModuleContext, &NewExpr) -> bool + Send + Sync>;

/// A plugin that attaches handlers to the parser's hook registry.
pub trait ParserPlugin {
    fn name(&self) -> &str;

    fn apply(&self, hooks: &mut HookRegistry);
}

/// Registry of parse-event subscriptions, keyed by dialect and constructor
/// name.
#[derive(Default)]
pub struct HookRegistry {
    new_expr: HashMap<SourceDialect, HashMap<String, Vec<NewExprHandler>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `new <constructor>(...)` expressions parsed
    /// under `dialect`.
    pub fn on_new_expr(
        &mut self,
        dialect: SourceDialect,
        constructor: &str,
        handler: NewExprHandler,
    ) {
        self.new_expr
            .entry(dialect)
            .or_default()
            .entry(constructor.to_string())
            .or_default()
            .push(handler);
    }

    /// Apply a plugin's registrations.
    pub fn register(&mut self, plugin: &dyn ParserPlugin) {
        debug!(plugin = plugin.name(), "registering parser plugin");
        plugin.apply(self);
    }

    /// Offer a matched `new` expression to the registered handlers.
    ///
    /// Returns `true` if a handler claimed it.
    pub fn dispatch_new_expr(
        &self,
        ctx: &mut ModuleContext,
        constructor: &str,
        expr: &NewExpr,
    ) -> bool {
        let Some(handlers) = self
            .new_expr
            .get(&ctx.dialect())
            .and_then(|by_name| by_name.get(constructor))
        else {
            return false;
        };
        handlers.iter().any(|handler| handler(ctx, expr))
    }
}
