//! Transport-agnostic tool implementations
//!
//! The MCP server, HTTP API and CLI all call into these functions and only
//! differ in how they present results and errors.

pub mod macros;
pub mod profiles;
pub mod status;
pub mod weights;

use chrono::NaiveDate;
use thiserror::Error;

use crate::db::DbError;
use crate::estimator::EstimateError;

/// Errors returned by tool functions
#[derive(Debug, Error)]
pub enum ToolError {
    #[error(transparent)]
    Estimate(#[from] EstimateError),

    #[error("Invalid {field}: {message}")]
    InvalidInput { field: &'static str, message: String },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Database(#[from] DbError),
}

/// How a transport should present a [`ToolError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    BadRequest,
    Unprocessable,
    NotFound,
    Conflict,
    Internal,
}

impl StatusClass {
    /// Stable machine-readable code for error bodies
    pub fn code(&self) -> &'static str {
        match self {
            StatusClass::BadRequest => "invalid_input",
            StatusClass::Unprocessable => "infeasible",
            StatusClass::NotFound => "not_found",
            StatusClass::Conflict => "conflict",
            StatusClass::Internal => "internal_error",
        }
    }

    /// True for errors caused by the caller rather than the service
    pub fn is_client_error(&self) -> bool {
        !matches!(self, StatusClass::Internal)
    }
}

impl ToolError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ToolError::InvalidInput {
            field,
            message: message.into(),
        }
    }

    pub fn status_class(&self) -> StatusClass {
        match self {
            ToolError::Estimate(e) if e.is_infeasible() => StatusClass::Unprocessable,
            ToolError::Estimate(_) | ToolError::InvalidInput { .. } => StatusClass::BadRequest,
            ToolError::NotFound(_) => StatusClass::NotFound,
            ToolError::Conflict(_) => StatusClass::Conflict,
            ToolError::Database(_) => StatusClass::Internal,
        }
    }
}

/// Result type for tool operations
pub type ToolResult<T> = Result<T, ToolError>;

/// Run a tool body, logging rejected requests at warn and failures at error
pub(crate) fn logged<T>(tool: &'static str, body: impl FnOnce() -> ToolResult<T>) -> ToolResult<T> {
    let result = body();
    if let Err(e) = &result {
        if e.status_class().is_client_error() {
            tracing::warn!(tool, error = %e, "request rejected");
        } else {
            tracing::error!(tool, error = %e, "request failed");
        }
    }
    result
}

/// Maximum accepted length of a user identifier
pub const MAX_USER_ID_LEN: usize = 64;

/// Trim a user identifier and reject empty or oversized ones
pub fn normalize_user_id(user_id: &str) -> ToolResult<String> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(ToolError::invalid("user_id", "must not be empty"));
    }
    if trimmed.chars().count() > MAX_USER_ID_LEN {
        return Err(ToolError::invalid(
            "user_id",
            format!("must be at most {} characters", MAX_USER_ID_LEN),
        ));
    }
    Ok(trimmed.to_string())
}

/// Parse a YYYY-MM-DD date
pub fn parse_date(field: &'static str, value: &str) -> ToolResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ToolError::invalid(field, format!("'{}' is not a YYYY-MM-DD date", value))
    })
}

/// Parse an optional date parameter
pub fn parse_optional_date(field: &'static str, value: Option<&str>) -> ToolResult<Option<NaiveDate>> {
    value.map(|v| parse_date(field, v)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classes() {
        let invalid: ToolError = EstimateError::invalid("sex", "bad").into();
        assert_eq!(invalid.status_class(), StatusClass::BadRequest);

        let infeasible: ToolError = EstimateError::InfeasibleInput { calories: -10.0 }.into();
        assert_eq!(infeasible.status_class(), StatusClass::Unprocessable);
        assert_eq!(infeasible.status_class().code(), "infeasible");

        assert_eq!(
            ToolError::NotFound("x".into()).status_class(),
            StatusClass::NotFound
        );
        assert_eq!(
            ToolError::Conflict("x".into()).status_class(),
            StatusClass::Conflict
        );
        assert!(!StatusClass::Internal.is_client_error());
    }

    #[test]
    fn test_estimate_message_passes_through() {
        let err: ToolError = EstimateError::unrecognized("sex", "other", &["male", "female"]).into();
        assert_eq!(
            err.to_string(),
            "Invalid sex: 'other' is not recognized. Choose from: male, female"
        );
    }

    #[test]
    fn test_normalize_user_id() {
        assert_eq!(normalize_user_id("  alex ").unwrap(), "alex");
        assert!(normalize_user_id("   ").is_err());
        assert!(normalize_user_id(&"x".repeat(MAX_USER_ID_LEN + 1)).is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("date", "2025-01-31").unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
        );
        assert!(parse_date("date", "31/01/2025").is_err());
        assert_eq!(parse_optional_date("start_date", None).unwrap(), None);
    }
}
