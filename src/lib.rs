//! Lint Patcher: one-shot regex rewrites that silence linter warnings
//!
//! Loads a target file, runs an ordered table of regular-expression
//! substitutions over its text, and writes the result back to the same path.
//!
//! # Architecture
//!
//! - [`rules`]: the declarative rule table (TOML), including the built-in one.
//! - [`transform`]: rules compiled into a [`Pipeline`] of [`Transformation`]s.
//! - [`document`]: load/apply/save for one file.
//! - [`target`]: a path or glob naming the files to rewrite.
//! - [`runner`]: [`PatchRunner`] ties them together and returns a [`RunReport`].
//!
//! Rules run strictly in authored order, each on the output of the previous
//! one. A rule that matches nothing is a silent no-op; the per-rule counts in
//! the [`RunReport`] are the only place that shows up.
//!
//! # Example
//!
//! ```no_run
//! use lint_patcher::{rules, PatchRunner};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let table = rules::builtin()?;
//! let report = PatchRunner::from_table(&table, None)?.run()?;
//! for file in &report.files {
//!     println!("{}: {} replacements", file.path.display(), file.total_matches());
//! }
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod report;
pub mod rules;
pub mod runner;
pub mod target;
pub mod telemetry;
pub mod transform;

// Re-exports
pub use document::{Document, DocumentError};
pub use report::{FileReport, MatchCount, RuleOutcome, RunReport};
pub use rules::{RuleDefinition, RuleError, RuleTable};
pub use runner::{Mode, PatchRunner, RunError, CONFIRMATION};
pub use target::{TargetError, TargetSelector, DEFAULT_TARGET};
pub use transform::{Pipeline, Transformation};
