//! marmot-plugin-worker - bundles `new Worker(...)` entry points.
//!
//! During parsing this plugin recognizes `new Worker(<specifier>, { type:
//! 'module' })` calls whose shape proves, at build time, that the worker is
//! an ES-module worker with a literal entry path. Accepted calls are
//! rewritten so the entry is produced by the dedicated worker loader and
//! referenced through a generated identifier; the identifier is registered
//! as a synthetic import so the rest of the build treats the worker entry as
//! a real dependency.
//!
//! Anything ambiguous - a computed specifier, missing options, a `type`
//! other than `'module'` - is left untouched and explained with a per-module
//! warning. Nothing here ever fails the build.

mod options;

pub use options::WorkerPluginOptions;

use std::collections::BTreeMap;
use std::sync::Arc;

use marmot_core::{
    Evaluation, HookRegistry, ModuleContext, NewExprHandler, ParserPlugin, SourceDialect,
};
use serde::Serialize;
use serde_json::Value;
use swc_common::{BytePos, Span, Spanned};
use swc_ecma_ast::{Expr, ExprOrSpread, NewExpr, Prop, PropName, PropOrSpread};
use tracing::debug;

/// Constructor name recognized by the matcher.
const WORKER_CONSTRUCTOR: &str = "Worker";

/// Option key that must evaluate to `"module"` for a call to be eligible.
const TYPE_KEY: &str = "type";

/// Default request prefix for the built-in worker loader.
pub const WORKER_LOADER: &str = "builtin:worker-loader";

const STRING_WARNING: &str = "new Worker() will only be bundled if passed a String.";
const OPTIONS_WARNING: &str =
    "new Worker() will only be bundled if passed options that include { type: 'module' }.";

/// Parser plugin that rewrites eligible `new Worker(...)` calls.
pub struct WorkerPlugin {
    options: WorkerPluginOptions,
    loader: String,
}

impl WorkerPlugin {
    pub fn new(options: WorkerPluginOptions) -> Self {
        Self {
            options,
            loader: WORKER_LOADER.to_string(),
        }
    }

    /// Override the worker-loader request prefix with the host's own loader
    /// path.
    pub fn with_loader(mut self, loader: impl Into<String>) -> Self {
        self.loader = loader.into();
        self
    }
}

impl Default for WorkerPlugin {
    fn default() -> Self {
        Self::new(WorkerPluginOptions::default())
    }
}

impl ParserPlugin for WorkerPlugin {
    fn name(&self) -> &str {
        "worker"
    }

    fn apply(&self, hooks: &mut HookRegistry) {
        let options = self.options.clone();
        let loader = self.loader.clone();
        let handler: NewExprHandler =
            Arc::new(move |ctx, expr| rewrite_worker_call(ctx, expr, &options, &loader));
        for dialect in SourceDialect::ALL {
            hooks.on_new_expr(dialect, WORKER_CONSTRUCTOR, handler.clone());
        }
    }
}

/// Source spans of the `type` entry, kept so the rewrite step can target it.
struct TypeProp {
    key_lo: BytePos,
    value_span: Span,
}

/// Options object scanned from the call site.
///
/// Values that do not fold to strings are kept as `None` so duplicate-key
/// tie-breaks still see the entry.
#[derive(Default)]
struct EvaluatedOptions {
    entries: BTreeMap<String, Option<String>>,
    type_prop: Option<TypeProp>,
}

impl EvaluatedOptions {
    fn string_value(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(|value| value.as_deref())
    }

    /// Serialized form for diagnostics. Entries without a folded value are
    /// omitted, the same way `JSON.stringify` drops `undefined` members.
    fn to_json(&self) -> String {
        let map: serde_json::Map<String, Value> = self
            .entries
            .iter()
            .filter_map(|(key, value)| {
                value
                    .as_ref()
                    .map(|v| (key.clone(), Value::String(v.clone())))
            })
            .collect();
        Value::Object(map).to_string()
    }
}

/// Scan the options argument, keeping only plain `key: value` entries with
/// identifier keys. Computed, shorthand, method, getter/setter and spread
/// entries are skipped, not evaluated.
///
/// Properties are walked in reverse declaration order, so a key declared
/// more than once resolves to its first declaration.
fn scan_options(ctx: &ModuleContext, arg: &ExprOrSpread) -> EvaluatedOptions {
    let mut evaluated = EvaluatedOptions::default();
    if arg.spread.is_some() {
        return evaluated;
    }
    let Expr::Object(object) = &*arg.expr else {
        return evaluated;
    };

    for prop in object.props.iter().rev() {
        let PropOrSpread::Prop(prop) = prop else {
            continue;
        };
        let Prop::KeyValue(entry) = &**prop else {
            continue;
        };
        let PropName::Ident(key) = &entry.key else {
            continue;
        };

        if key.sym.as_str() == TYPE_KEY {
            evaluated.type_prop = Some(TypeProp {
                key_lo: key.span.lo,
                value_span: entry.value.span(),
            });
        }
        let value = ctx.evaluate_expression(&entry.value).into_string();
        evaluated.entries.insert(key.sym.as_str().to_string(), value);
    }
    evaluated
}

/// Query string understood by the worker loader. Only the `name` option is
/// forwarded.
#[derive(Serialize)]
struct LoaderQuery<'a> {
    name: &'a str,
}

/// Build the request the worker loader resolves:
/// `<loader>[?{"name":<value>}]!<specifier>`.
fn loader_request(loader: &str, evaluated: &EvaluatedOptions, specifier: &str) -> String {
    let mut request = String::from(loader);
    if let Some(name) = evaluated.string_value("name").filter(|name| !name.is_empty())
        && let Ok(query) = serde_json::to_string(&LoaderQuery { name })
    {
        request.push('?');
        request.push_str(&query);
    }
    request.push('!');
    request.push_str(specifier);
    request
}

/// Pipeline for one matched call: evaluate the arguments, decide
/// eligibility, then rewrite or warn.
///
/// Returns `true` only when the call was rewritten; every rejection leaves
/// the expression for default handling.
fn rewrite_worker_call(
    ctx: &mut ModuleContext,
    expr: &NewExpr,
    options: &WorkerPluginOptions,
    loader: &str,
) -> bool {
    let args: &[ExprOrSpread] = expr.args.as_deref().unwrap_or_default();

    let specifier = match args.first() {
        Some(arg) if arg.spread.is_none() => ctx.evaluate_expression(&arg.expr),
        _ => Evaluation::Unresolved,
    };
    let Some(specifier) = specifier.into_string() else {
        ctx.warn(STRING_WARNING, expr.span);
        return false;
    };

    let evaluated = args.get(1).map(|arg| scan_options(ctx, arg));
    let eligible = evaluated
        .as_ref()
        .is_some_and(|opts| opts.string_value(TYPE_KEY) == Some("module"));
    if !eligible {
        let mut message = OPTIONS_WARNING.to_string();
        if let Some(opts) = &evaluated {
            message.push_str(&format!(
                "\n  Received: new Worker({}, {})",
                Value::String(specifier.clone()),
                opts.to_json()
            ));
        }
        ctx.warn(message, expr.span);
        return false;
    }

    // Eligibility guarantees the options argument exists and a plain `type`
    // entry was recorded.
    let Some(evaluated) = evaluated else {
        return false;
    };
    let Some(type_prop) = evaluated.type_prop.as_ref() else {
        return false;
    };
    let Some(first_arg) = args.first() else {
        return false;
    };

    let request = loader_request(loader, &evaluated, &specifier);
    let id = format!("__bundled_worker__{}", ctx.next_uid());

    ctx.add_synthetic_import(id.clone(), request.clone());
    // The call site now reads as if the first argument were the generated
    // identifier.
    ctx.replace_span(first_arg.expr.span(), id.clone());

    if let Some(worker_type) = &options.worker_type {
        ctx.replace_span(
            type_prop.value_span,
            Value::String(worker_type.clone()).to_string(),
        );
    } else if !options.preserve_type_module {
        ctx.replace_between(type_prop.key_lo, type_prop.value_span.hi, "");
    }

    debug!(specifier = %specifier, id = %id, request = %request, "bundling worker entry");
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options_with(entries: &[(&str, Option<&str>)]) -> EvaluatedOptions {
        EvaluatedOptions {
            entries: entries
                .iter()
                .map(|(key, value)| (key.to_string(), value.map(str::to_string)))
                .collect(),
            type_prop: None,
        }
    }

    #[test]
    fn test_loader_request_without_name() {
        let evaluated = options_with(&[("type", Some("module"))]);
        assert_eq!(
            loader_request(WORKER_LOADER, &evaluated, "./worker.js"),
            "builtin:worker-loader!./worker.js"
        );
    }

    #[test]
    fn test_loader_request_forwards_name() {
        let evaluated = options_with(&[("type", Some("module")), ("name", Some("x"))]);
        assert_eq!(
            loader_request(WORKER_LOADER, &evaluated, "./worker.js"),
            r#"builtin:worker-loader?{"name":"x"}!./worker.js"#
        );
    }

    #[test]
    fn test_loader_request_ignores_empty_name() {
        let evaluated = options_with(&[("type", Some("module")), ("name", Some(""))]);
        assert_eq!(
            loader_request(WORKER_LOADER, &evaluated, "./worker.js"),
            "builtin:worker-loader!./worker.js"
        );
    }

    #[test]
    fn test_loader_request_drops_other_options() {
        let evaluated = options_with(&[("type", Some("module")), ("credentials", Some("omit"))]);
        assert_eq!(
            loader_request(WORKER_LOADER, &evaluated, "./worker.js"),
            "builtin:worker-loader!./worker.js"
        );
    }

    #[test]
    fn test_options_json_omits_unresolved_values() {
        let evaluated = options_with(&[("type", None), ("name", Some("x"))]);
        assert_eq!(evaluated.to_json(), r#"{"name":"x"}"#);
    }
}
