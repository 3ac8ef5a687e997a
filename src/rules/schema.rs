use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

/// An ordered rule table as written in TOML.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct RuleTable {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

impl RuleTable {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.rules.is_empty() {
            issues.push(ValidationIssue::EmptyRuleList);
        }

        let mut seen = HashSet::new();
        for rule in &self.rules {
            if rule.id.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    rule_id: None,
                    field: "id",
                });
            } else if !seen.insert(rule.id.as_str()) {
                issues.push(ValidationIssue::DuplicateId {
                    rule_id: rule.id.clone(),
                });
            }

            // An empty replacement is a deletion and is allowed; an empty
            // pattern would match between every character.
            if rule.pattern.is_empty() {
                issues.push(ValidationIssue::MissingField {
                    rule_id: Some(rule.id.clone()),
                    field: "pattern",
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Append the rules of `other` after this table's rules.
    ///
    /// Metadata already present here wins; missing fields are filled from
    /// `other`.
    pub fn extend(&mut self, other: RuleTable) {
        if self.meta.name.is_empty() {
            self.meta.name = other.meta.name;
        }
        if self.meta.description.is_none() {
            self.meta.description = other.meta.description;
        }
        if self.meta.target.is_none() {
            self.meta.target = other.meta.target;
        }
        self.rules.extend(other.rules);
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Default target selector (a path or a glob) used when none is given.
    #[serde(default)]
    pub target: Option<String>,
}

/// One search-pattern/replacement-template pair.
#[derive(Debug, Deserialize, Clone)]
pub struct RuleDefinition {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    pub pattern: String,
    pub replacement: String,
    /// Whether a second pass over already-patched text is expected to be a
    /// no-op. Rules that insert a prefix before text they still match are not.
    #[serde(default = "default_idempotent")]
    pub idempotent: bool,
}

fn default_idempotent() -> bool {
    true
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyRuleList,
    MissingField {
        rule_id: Option<String>,
        field: &'static str,
    },
    DuplicateId {
        rule_id: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyRuleList => write!(f, "rule table contains no rules"),
            ValidationIssue::MissingField { rule_id, field } => match rule_id {
                Some(id) if !id.is_empty() => {
                    write!(f, "rule '{id}' missing required field '{field}'")
                }
                _ => write!(f, "rule missing required field '{field}'"),
            },
            ValidationIssue::DuplicateId { rule_id } => {
                write!(f, "rule id '{rule_id}' is defined more than once")
            }
        }
    }
}
