//! `j2lint_core` is the core library for [j2lint](https://github.com/j2lint/j2lint), a linter for Jinja2 templates. It extracts `{% ... %}` statements, rebuilds their block nesting to check indentation, and runs a set of line based style rules over every template.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Template text
//!   → Extractor (finds {% ... %} statements with their lines and delimiters)
//!   → Indentation checker (rebuilds if/for/macro nesting, compares columns)
//!   → Rules (indentation, syntax, spacing, naming, delimiters)
//!   → Rule collection (ignore / warn selection, disable comments)
//!   → Runner (reads files, groups errors and warnings per file)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from `j2lint.toml`.
//! - [`extractor`]: Statement, comment and variable extraction.
//! - [`indenter`]: The statement tree and the indentation check.
//! - [`rules`]: The built-in rules `S0`–`S7`, `V1` and `V2`.
//! - [`files`]: Expanding files and directories into templates to lint.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use j2lint_core::RuleCollection;
//! use j2lint_core::Runner;
//!
//! let collection = RuleCollection::builtin().warn(["S1"]).unwrap();
//! let report = Runner::new(&collection).lint_text("inline.j2", "{% if x %}\n{% endif %}\n");
//! for issue in &report.errors {
//!     println!("{issue}");
//! }
//! ```

pub use collection::*;
pub use config::J2LintConfig;
pub use error::*;
pub use files::DiscoveryOptions;
pub use files::collect_files;
pub use rule::*;
pub use runner::*;
pub use statement::*;

mod collection;
pub mod config;
#[allow(unused_assignments)]
mod error;
pub mod extractor;
pub mod files;
pub mod indenter;
mod rule;
pub mod rules;
mod runner;
mod statement;

#[cfg(test)]
mod __fixtures;
#[cfg(test)]
mod __tests;
