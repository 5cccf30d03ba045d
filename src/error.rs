//! Error types for report and allowlist parsing.
//!
//! [`AnalysisError`] covers every way an analysis can fail. Both parsing
//! stages return it unchanged through [`crate::analyze`]; the only failure
//! that is not an error is an unrecognised (but object-shaped) report, which
//! degrades to an empty result.
//!
//! # Categories
//!
//! - **Report**: `JsonSyntax`, `UnsupportedFormat`
//! - **Allowlist**: `JsonSyntax`, `AllowlistStructure`, `AllowlistSchema`

use std::fmt;

/// Which input a syntax error was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Report,
    Allowlist,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputKind::Report => write!(f, "audit report"),
            InputKind::Allowlist => write!(f, "allowlist"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Input is not valid JSON.
    #[error(
        "{input} is not valid JSON at line {line}, column {column}: {message} \
         (check for trailing commas, unquoted keys or unbalanced braces)"
    )]
    JsonSyntax {
        input: InputKind,
        line: usize,
        column: usize,
        message: String,
    },

    /// Report is valid JSON but its top-level value cannot be a report.
    #[error("unsupported audit report format: {reason}")]
    UnsupportedFormat { reason: String },

    /// Allowlist top-level value is not an array.
    #[error("allowlist must be a JSON array, found {found}")]
    AllowlistStructure { found: &'static str },

    /// One or more allowlist entries break the entry schema.
    #[error("allowlist failed validation with {} error(s):\n{}", .violations.len(), format_violations(.violations))]
    AllowlistSchema { violations: Vec<SchemaViolation> },
}

impl AnalysisError {
    pub(crate) fn syntax(input: InputKind, err: &serde_json::Error) -> Self {
        AnalysisError::JsonSyntax {
            input,
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}

/// One broken rule in one allowlist entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// Position of the entry in the allowlist array.
    pub index: usize,
    /// Offending property, `None` when the entry itself is wrong.
    pub field: Option<String>,
    pub kind: ViolationKind,
}

impl SchemaViolation {
    pub fn entry(index: usize, kind: ViolationKind) -> Self {
        Self {
            index,
            field: None,
            kind,
        }
    }

    pub fn field(index: usize, field: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            index,
            field: Some(field.into()),
            kind,
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "[{}].{}: {}", self.index, field, self.kind),
            None => write!(f, "[{}]: {}", self.index, self.kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    NotAnObject,
    Missing,
    Empty,
    WrongType { expected: &'static str },
    UnknownProperty,
    InvalidDate { value: String },
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::NotAnObject => write!(f, "entry must be an object"),
            ViolationKind::Missing => write!(f, "is required"),
            ViolationKind::Empty => write!(f, "must not be empty"),
            ViolationKind::WrongType { expected } => write!(f, "must be {}", expected),
            ViolationKind::UnknownProperty => write!(f, "is not an allowed property"),
            ViolationKind::InvalidDate { value } => {
                write!(f, "'{}' is not a valid date-time", value)
            }
        }
    }
}

/// Article-prefixed JSON type name for error messages.
pub(crate) fn json_type(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn format_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("  - {}", v))
        .collect::<Vec<_>>()
        .join("\n")
}
