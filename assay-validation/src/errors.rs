// Validation errors

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Which channel a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The data is invalid; the message is the localized user-facing text.
    Invalid,
    /// The rule is misconfigured (unknown property, type mismatch, ...).
    /// The message is plain developer-facing text and is not localized.
    Diagnostic,
}

/// A single failed rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Failure text
    pub message: String,

    /// Members the failure applies to
    pub members: Vec<String>,

    /// Name of the rule that failed
    pub constraint: String,

    pub kind: FailureKind,
}

impl ValidationError {
    /// Create a data-validity failure for one member.
    pub fn new(member: impl Into<String>, message: impl Into<String>) -> Self {
        let member = member.into();
        Self {
            message: message.into(),
            members: if member.is_empty() { Vec::new() } else { vec![member] },
            constraint: "custom".to_string(),
            kind: FailureKind::Invalid,
        }
    }

    /// Create a configuration diagnostic for one member.
    pub fn diagnostic(member: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Diagnostic,
            ..Self::new(member, message)
        }
    }

    /// Set the constraint name
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = constraint.into();
        self
    }

    /// Replace the member list
    pub fn with_members(mut self, members: Vec<String>) -> Self {
        self.members = members;
        self
    }

    pub fn is_diagnostic(&self) -> bool {
        self.kind == FailureKind::Diagnostic
    }

    /// First member, if any
    pub fn member(&self) -> Option<&str> {
        self.members.first().map(String::as_str)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.member() {
            Some(member) => write!(f, "{}: {}", member, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    /// Errors that mention a specific member
    pub fn get_member_errors(&self, member: &str) -> Vec<&ValidationError> {
        self.errors
            .iter()
            .filter(|e| e.members.iter().any(|m| m == member))
            .collect()
    }

    /// Only the configuration diagnostics
    pub fn diagnostics(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(|e| e.is_diagnostic())
    }

    /// Convert to JSON representation
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "errors": self.errors.iter().map(|e| {
                serde_json::json!({
                    "members": e.members,
                    "message": e.message,
                    "constraint": e.constraint,
                    "kind": e.kind,
                })
            }).collect::<Vec<_>>()
        })
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for error in &self.errors {
            writeln!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::new(errors)
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

/// Rejected rule configuration, raised when the rule is constructed.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Argument '{name}' must not be empty")]
    InvalidArgument { name: &'static str },

    #[error("Argument '{name}' is out of range: {message}")]
    OutOfRange { name: &'static str, message: String },

    #[error("Invalid regular expression: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("At least one item rule is required")]
    EmptyRuleList,
}

/// Failure to load a schema configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load schema configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse schema configuration: {0}")]
    ParseError(String),

    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid rule for member '{member}': {source}")]
    RuleError {
        member: String,
        #[source]
        source: RuleError,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Reject empty or whitespace-only required strings.
pub(crate) fn require_non_blank(name: &'static str, value: String) -> Result<String, RuleError> {
    if value.trim().is_empty() {
        Err(RuleError::InvalidArgument { name })
    } else {
        Ok(value)
    }
}

/// One `(message, members)` pair stored in a [`ValidationFailed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub message: String,
    pub members: Vec<String>,
}

impl From<&ValidationError> for ErrorEntry {
    fn from(error: &ValidationError) -> Self {
        Self {
            message: if error.message.trim().is_empty() {
                "Errors".to_string()
            } else {
                error.message.clone()
            },
            members: error.members.clone(),
        }
    }
}

/// Error returned by the `ensure_valid` guards.
///
/// The per-member failures live in [`data`](Self::data) under
/// [`DATA_KEY`](Self::DATA_KEY), with the count under
/// [`COUNT_KEY`](Self::COUNT_KEY). Both entries are absent when the error was
/// built from an empty result list.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ValidationFailed {
    message: String,
    data: BTreeMap<String, serde_json::Value>,
}

impl ValidationFailed {
    pub const DATA_KEY: &'static str = "assay:validation";
    pub const COUNT_KEY: &'static str = "assay:validation_count";
    pub const DEFAULT_MESSAGE: &'static str =
        "Validation failed. Inspect the 'assay:validation' data entry for details.";

    pub fn new(results: &[ValidationError]) -> Self {
        Self::with_message(Self::DEFAULT_MESSAGE, results)
    }

    pub fn with_message(message: impl Into<String>, results: &[ValidationError]) -> Self {
        let mut data = BTreeMap::new();

        if !results.is_empty() {
            let entries: Vec<ErrorEntry> = results.iter().map(ErrorEntry::from).collect();
            data.insert(Self::COUNT_KEY.to_string(), serde_json::json!(entries.len()));
            data.insert(Self::DATA_KEY.to_string(), serde_json::json!(entries));
        }

        Self {
            message: message.into(),
            data,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Attached data entries
    pub fn data(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.data
    }

    /// Copy the stored entries into `errors`.
    ///
    /// `errors` is cleared first. Returns `false` (leaving it empty) when no
    /// entry is stored under [`DATA_KEY`](Self::DATA_KEY).
    pub fn try_get_validation_errors(&self, errors: &mut Vec<ErrorEntry>) -> bool {
        errors.clear();

        let Some(stored) = self.data.get(Self::DATA_KEY) else {
            return false;
        };

        match Vec::<ErrorEntry>::deserialize(stored) {
            Ok(entries) => {
                errors.extend(entries);
                true
            }
            Err(_) => false,
        }
    }

    /// The stored entries, empty if none.
    pub fn errors(&self) -> Vec<ErrorEntry> {
        let mut errors = Vec::new();
        self.try_get_validation_errors(&mut errors);
        errors
    }
}
