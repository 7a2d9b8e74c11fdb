//! Estimator error types

use thiserror::Error;

/// Errors raised while turning a profile into calorie and macro targets
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimateError {
    /// Malformed, out-of-range or unrecognized input field
    #[error("Invalid {field}: {message}")]
    InvalidInput { field: &'static str, message: String },

    /// Valid input whose goal-adjusted calories come out negative
    #[error("Infeasible input: goal calories would be {calories:.1} kcal")]
    InfeasibleInput { calories: f64 },

    /// Protein and fat floors exceed the calorie budget, leaving negative carbs
    #[error("Infeasible macro split: carbohydrates would be {carbs_g:.1} g")]
    InfeasibleMacroSplit { carbs_g: f64 },
}

/// Result type for estimator operations
pub type EstimateResult<T> = Result<T, EstimateError>;

impl EstimateError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        EstimateError::InvalidInput {
            field,
            message: message.into(),
        }
    }

    /// Unrecognized enumerated value, listing what is accepted
    pub fn unrecognized(field: &'static str, value: &str, accepted: &[&str]) -> Self {
        Self::invalid(
            field,
            format!("'{}' is not recognized. Choose from: {}", value, accepted.join(", ")),
        )
    }

    /// A field the selected model or policy depends on was not supplied
    pub fn missing(field: &'static str, needed_by: &str) -> Self {
        Self::invalid(field, format!("required by {}", needed_by))
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, EstimateError::InvalidInput { .. })
    }

    pub fn is_infeasible(&self) -> bool {
        matches!(
            self,
            EstimateError::InfeasibleInput { .. } | EstimateError::InfeasibleMacroSplit { .. }
        )
    }
}
