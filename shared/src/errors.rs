//! Error types for the Meal Tracker application

use thiserror::Error;

/// Domain error taxonomy shared by every layer.
///
/// Validation and not-found are client errors; internal covers storage
/// inconsistencies the caller cannot fix.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MealError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
