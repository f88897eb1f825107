//! Use-case result model.
//!
//! Every use case returns [`UseCaseResult`]: either a payload with metadata
//! or a typed [`UseCaseError`]. Nothing panics or propagates a collaborator
//! error type across a use-case boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed error taxonomy for the use-case layer.
///
/// Three families: caller errors (invalid input), collaborator errors
/// (network services), and business outcomes that are not exceptional
/// (no results, budget exceeded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidInput,
    MissingRequiredField,
    InvalidCoordinates,
    InvalidTimeConstraint,
    GeocodingFailed,
    IsochroneFailed,
    PoiSearchFailed,
    RoutingFailed,
    OptimizationFailed,
    NoResultsFound,
    TimeConstraintExceeded,
    TooManyResults,
    UnknownError,
}

impl ErrorCode {
    /// Whether a caller may retry the same request and plausibly succeed.
    ///
    /// Collaborator failures are transient; caller errors and business
    /// outcomes are not.
    #[must_use]
    pub fn retryable(self) -> bool {
        match self {
            ErrorCode::GeocodingFailed
            | ErrorCode::IsochroneFailed
            | ErrorCode::PoiSearchFailed
            | ErrorCode::RoutingFailed
            | ErrorCode::OptimizationFailed
            | ErrorCode::UnknownError => true,
            ErrorCode::InvalidInput
            | ErrorCode::MissingRequiredField
            | ErrorCode::InvalidCoordinates
            | ErrorCode::InvalidTimeConstraint
            | ErrorCode::NoResultsFound
            | ErrorCode::TimeConstraintExceeded
            | ErrorCode::TooManyResults => false,
        }
    }
}

/// Typed failure crossing a use-case boundary.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{code:?}: {message}")]
pub struct UseCaseError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub retryable: bool,
}

impl UseCaseError {
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            retryable: code.retryable(),
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    #[must_use]
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingRequiredField,
            format!("required field missing: {field}"),
        )
    }

    #[must_use]
    pub fn invalid_coordinates(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidCoordinates, message)
    }

    #[must_use]
    pub fn invalid_time_constraint(minutes: f64) -> Self {
        Self::new(
            ErrorCode::InvalidTimeConstraint,
            format!("time constraint must be in (0, 180] minutes, got {minutes}"),
        )
    }

    #[must_use]
    pub fn no_results(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NoResultsFound, message)
    }
}

/// Successful use-case payload plus free-form metadata.
///
/// Metadata carries observability extras (winning strategy, warnings,
/// fallbacks taken) that are not part of the payload contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UseCaseOutput<T> {
    pub data: T,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl<T> UseCaseOutput<T> {
    #[must_use]
    pub fn new(data: T) -> Self {
        Self {
            data,
            metadata: serde_json::Value::Null,
        }
    }

    #[must_use]
    pub fn with_metadata(data: T, metadata: serde_json::Value) -> Self {
        Self { data, metadata }
    }
}

pub type UseCaseResult<T> = Result<UseCaseOutput<T>, UseCaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collaborator_codes_are_retryable() {
        assert!(ErrorCode::IsochroneFailed.retryable());
        assert!(ErrorCode::UnknownError.retryable());
    }

    #[test]
    fn business_outcomes_are_not_retryable() {
        assert!(!ErrorCode::NoResultsFound.retryable());
        assert!(!ErrorCode::TimeConstraintExceeded.retryable());
        assert!(!ErrorCode::InvalidTimeConstraint.retryable());
    }

    #[test]
    fn error_constructor_sets_retryable_from_code() {
        let err = UseCaseError::new(ErrorCode::RoutingFailed, "routing service down");
        assert!(err.retryable);
        let err = UseCaseError::missing_field("user_location");
        assert!(!err.retryable);
        assert_eq!(err.code, ErrorCode::MissingRequiredField);
    }

    #[test]
    fn error_code_serializes_screaming_snake() {
        let json = serde_json::to_string(&ErrorCode::TimeConstraintExceeded).unwrap();
        assert_eq!(json, "\"TIME_CONSTRAINT_EXCEEDED\"");
    }
}
