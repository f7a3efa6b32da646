//! marmot-core - parser plugin surface for the marmot bundler.
//!
//! marmot parses every module of a build with SWC and lets plugins subscribe
//! to parse events instead of walking the syntax tree themselves. This crate
//! carries the pieces of that surface:
//!
//! - **Dialects**: the three parse dialects a module can be read under
//!   (script, ES module, auto-detected)
//! - **Hooks**: an explicit event-subscription registry mapping
//!   (dialect, constructor name) to handlers for `new` expressions
//! - **Per-module context**: static evaluation against collected string
//!   bindings, span-based constant replacements, synthetic import
//!   registration, warnings
//!
//! All rewriter state is scoped to one [`ModuleParser::parse`] call, so
//! modules parsed concurrently by the host share nothing.
//!
//! # Example
//!
//! ```
//! use marmot_core::{HookRegistry, ModuleParser, SourceDialect};
//!
//! let hooks = HookRegistry::new();
//! let parser = ModuleParser::new(&hooks);
//! let parsed = parser.parse("const x = 1;", SourceDialect::Esm).unwrap();
//! assert!(parsed.warnings.is_empty());
//! ```

pub mod diagnostics;
pub mod dialect;
pub mod error;
pub mod evaluate;
pub mod hooks;
pub mod parser;
pub mod rewrite;

pub use diagnostics::Warning;
pub use dialect::SourceDialect;
pub use error::{ParseError, ParseResult};
pub use evaluate::{Evaluation, evaluate};
pub use hooks::{HookRegistry, NewExprHandler, ParserPlugin};
pub use parser::{ModuleContext, ModuleParser, ParsedModule};
pub use rewrite::{CodeReplacement, SyntheticImport, apply_replacements};
