//! The patch runner: load each target, apply every rule in order, save.
//!
//! A run is one deterministic pass in two phases. Every target is loaded and
//! rewritten in memory first, so a target that cannot be read or decoded ends
//! the run before any file is written. Then every target is saved. Nothing is
//! retried: a save failure ends the run, and targets saved before it stay
//! saved.

use crate::document::{Document, DocumentError};
use crate::report::{FileReport, RuleOutcome, RunReport};
use crate::rules::{RuleError, RuleTable};
use crate::target::{TargetError, TargetSelector};
use crate::transform::Pipeline;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Printed on stdout after a successful run.
pub const CONFIRMATION: &str = "Lint fixes applied!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Rewrite every target.
    #[default]
    Write,
    /// Compute everything, write nothing.
    DryRun,
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Rules(#[from] RuleError),

    #[error(transparent)]
    Target(#[from] TargetError),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

#[derive(Debug, Clone)]
pub struct PatchRunner {
    pipeline: Pipeline,
    selector: TargetSelector,
    root: Option<PathBuf>,
    mode: Mode,
    diagnostics: bool,
}

impl PatchRunner {
    pub fn new(pipeline: Pipeline, selector: TargetSelector) -> Self {
        Self {
            pipeline,
            selector,
            root: None,
            mode: Mode::Write,
            diagnostics: false,
        }
    }

    /// Compile `table` and pick the target: `selector` if given, else the
    /// table's own `meta.target`, else [`DEFAULT_TARGET`](crate::target::DEFAULT_TARGET).
    pub fn from_table(
        table: &RuleTable,
        selector: Option<TargetSelector>,
    ) -> Result<Self, RunError> {
        let pipeline = Pipeline::compile(table)?;
        let selector = selector
            .or_else(|| table.meta.target.as_deref().map(TargetSelector::parse))
            .unwrap_or_default();
        Ok(Self::new(pipeline, selector))
    }

    /// Resolve relative targets against `root` instead of the working directory.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Log a warning for every rule that matched nothing.
    pub fn with_diagnostics(mut self, diagnostics: bool) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn selector(&self) -> &TargetSelector {
        &self.selector
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn run(&self) -> Result<RunReport, RunError> {
        let targets = self.selector.resolve(self.root.as_deref())?;

        let mut pending = Vec::with_capacity(targets.len());
        for path in &targets {
            pending.push(self.transform_file(path)?);
        }

        let mut report = RunReport::default();
        for (document, mut file) in pending {
            if self.mode == Mode::Write {
                document.save()?;
                tracing::info!(file = %file.path.display(), changed = file.changed, "wrote target");
                file.written = true;
            }
            file.patched = document.into_content();
            report.files.push(file);
        }
        Ok(report)
    }

    /// Read-only check that every idempotent rule is already satisfied.
    ///
    /// Runs only the rules flagged idempotent, without writing. A target whose
    /// report says `changed` still has patches pending.
    pub fn verify(&self) -> Result<RunReport, RunError> {
        let checker = PatchRunner {
            pipeline: self.pipeline.idempotent_only(),
            selector: self.selector.clone(),
            root: self.root.clone(),
            mode: Mode::DryRun,
            diagnostics: false,
        };
        checker.run()
    }

    /// Load one target and run the whole pipeline over it in memory.
    fn transform_file(&self, path: &Path) -> Result<(Document, FileReport), RunError> {
        let mut document = Document::load(path)?;
        let original = document.content().to_string();

        let mut rules = Vec::with_capacity(self.pipeline.len());
        for transformation in self.pipeline.transformations() {
            let matches = document.apply(transformation);
            tracing::debug!(
                file = %path.display(),
                rule = transformation.id(),
                matches,
                "applied rule"
            );
            if matches == 0 && self.diagnostics {
                tracing::warn!(
                    file = %path.display(),
                    rule = transformation.id(),
                    "rule matched nothing"
                );
            }
            rules.push(RuleOutcome {
                id: transformation.id().to_string(),
                matches,
            });
        }

        let file = FileReport {
            path: path.to_path_buf(),
            rules,
            changed: document.content() != original,
            written: false,
            original,
            patched: String::new(),
        };
        Ok((document, file))
    }
}
