//! Compiled rules.
//!
//! A [`Transformation`] is a [`RuleDefinition`] whose pattern has been
//! compiled. A [`Pipeline`] holds them in authored order. Compiling the whole
//! table up front means a bad pattern is reported before any file is read.

use crate::rules::{RuleDefinition, RuleError, RuleTable};
use regex::Regex;
use std::borrow::Cow;

#[derive(Debug, Clone)]
pub struct Transformation {
    id: String,
    regex: Regex,
    replacement: String,
    idempotent: bool,
}

impl Transformation {
    pub fn new(
        id: impl Into<String>,
        pattern: &str,
        replacement: impl Into<String>,
    ) -> Result<Self, RuleError> {
        let id = id.into();
        let regex = Regex::new(pattern).map_err(|source| RuleError::Pattern {
            id: id.clone(),
            source,
        })?;
        Ok(Self {
            id,
            regex,
            replacement: replacement.into(),
            idempotent: true,
        })
    }

    pub fn compile(rule: &RuleDefinition) -> Result<Self, RuleError> {
        let mut transformation = Self::new(&rule.id, &rule.pattern, &rule.replacement)?;
        transformation.idempotent = rule.idempotent;
        Ok(transformation)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    pub fn is_idempotent(&self) -> bool {
        self.idempotent
    }

    /// Replace every non-overlapping match, expanding `$n`/`${name}` in the
    /// replacement. Borrows the input when nothing matched.
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.regex.replace_all(text, self.replacement.as_str())
    }

    /// Like [`apply`](Self::apply), but `None` when nothing matched.
    pub fn rewrite(&self, text: &str) -> Option<String> {
        match self.apply(text) {
            Cow::Owned(rewritten) => Some(rewritten),
            Cow::Borrowed(_) => None,
        }
    }

    pub fn count_matches(&self, text: &str) -> usize {
        self.regex.find_iter(text).count()
    }
}

/// Transformations in the order they must run.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    transformations: Vec<Transformation>,
}

impl Pipeline {
    pub fn new(transformations: Vec<Transformation>) -> Self {
        Self { transformations }
    }

    /// Compile every rule of `table`; the first invalid pattern aborts.
    pub fn compile(table: &RuleTable) -> Result<Self, RuleError> {
        let transformations = table
            .rules
            .iter()
            .map(Transformation::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { transformations })
    }

    pub fn transformations(&self) -> &[Transformation] {
        &self.transformations
    }

    pub fn len(&self) -> usize {
        self.transformations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transformations.is_empty()
    }

    /// Run every transformation over `text` in order.
    pub fn apply(&self, text: &str) -> String {
        let mut current = text.to_string();
        for transformation in &self.transformations {
            if let Some(next) = transformation.rewrite(&current) {
                current = next;
            }
        }
        current
    }

    /// The subset of this pipeline whose rules are flagged idempotent.
    pub fn idempotent_only(&self) -> Pipeline {
        Pipeline::new(
            self.transformations
                .iter()
                .filter(|t| t.is_idempotent())
                .cloned()
                .collect(),
        )
    }
}
