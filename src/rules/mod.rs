pub mod loader;
pub mod schema;

pub use loader::{
    builtin, load_from_dir, load_from_path, load_from_str, load_rules, RuleError, BUILTIN_RULES,
};
pub use schema::{Metadata, RuleDefinition, RuleTable, ValidationError, ValidationIssue};
