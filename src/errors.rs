use itertools::Itertools;
use std::fmt::{Display, Formatter};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IsoModelError {
    #[error("Request was considered invalid due to error: {0}")]
    InvalidRequest(#[from] anyhow::Error),
    #[error("Building description could not be translated: {0}")]
    Translation(#[from] TranslationError),
    #[error("Reduced building model failed validation: {0}")]
    Validation(#[from] ValidationError),
}

/// An error raised by the forward translator when the detailed building description lacks
/// data that the reduced model cannot be built without.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TranslationError {
    #[error("Building description has no conditioned floor area")]
    MissingFloorArea,
    #[error("Building description has no weather file location")]
    MissingWeatherFile,
    #[error("Building description has no exterior walls")]
    MissingEnvelope,
    #[error("Surface '{name}' is invalid: {reason}")]
    InvalidSurface { name: String, reason: String },
}

/// A single broken invariant of a reduced building model, keyed by the path of the field
/// that breaks it (e.g. `geometry.window_to_wall_ratio.south`).
#[derive(Clone, Debug, PartialEq)]
pub struct InvariantViolation {
    field: String,
    message: String,
}

impl InvariantViolation {
    pub(crate) fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for InvariantViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every invariant violation found while compiling a reduced building model. Never empty.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{} invariant violation(s): {}", .violations.len(), .violations.iter().join("; "))]
pub struct ValidationError {
    violations: Vec<InvariantViolation>,
}

impl ValidationError {
    pub(crate) fn new(violations: Vec<InvariantViolation>) -> Self {
        debug_assert!(!violations.is_empty());
        Self { violations }
    }

    pub fn violations(&self) -> &[InvariantViolation] {
        &self.violations
    }

    /// Whether any violation was recorded against the given field path.
    pub fn names_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}
