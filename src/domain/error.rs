//! Error types for schema loading and engine construction

use thiserror::Error;

/// Structural defect in a form schema, detected before rendering begins
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// No schema document was supplied
    #[error("Form schema is missing")]
    MissingSchema,

    /// Required top-level attribute is absent or blank
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Multi-step schema without steps
    #[error("Multi-step form must declare at least one step")]
    NoSteps,

    /// A step has no group carrying a field
    #[error("Step {index} ('{title}') must contain at least one group with at least one field")]
    EmptyStep { index: usize, title: String },

    /// Single-step schema without groups
    #[error("Single-step form must declare at least one group")]
    NoGroups,

    /// Single-step schema whose groups are all empty
    #[error("Single-step form must contain at least one field")]
    NoFields,

    /// Field declared with a blank id
    #[error("Field '{label}' in group '{group}' has an empty id")]
    EmptyFieldId { group: String, label: String },

    /// Field id used more than once
    #[error("Duplicate field id: {0}")]
    DuplicateFieldId(String),

    /// Conditional logic points at a field that does not exist
    #[error("Field '{field}' depends on unknown field '{depends_on}'")]
    UnknownDependency { field: String, depends_on: String },

    /// Conditional logic points at the field itself
    #[error("Field '{0}' cannot depend on itself")]
    SelfDependency(String),

    /// Conditional logic forms a loop
    #[error("Circular visibility dependency: {}", .0.join(" -> "))]
    CircularDependency(Vec<String>),

    /// `validation.pattern` does not compile
    #[error("Invalid pattern for field '{field}': {reason}")]
    InvalidPattern { field: String, reason: String },

    /// Lower bound above upper bound
    #[error("Invalid range for field '{field}': {reason}")]
    InvalidRange { field: String, reason: String },
}

/// Errors surfaced by the form engine API
#[derive(Debug, Error)]
pub enum FormError {
    /// Schema failed validation; carries every defect found
    #[error("Invalid form schema:\n{}", format_schema_errors(.0))]
    InvalidSchema(Vec<SchemaError>),

    /// Schema document could not be decoded
    #[error("Failed to parse form schema: {0}")]
    Parse(String),

    /// Field id is not part of the schema
    #[error("Unknown field: {0}")]
    UnknownField(String),
}

fn format_schema_errors(errors: &[SchemaError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Result type alias for form engine operations
pub type FormResult<T> = Result<T, FormError>;
