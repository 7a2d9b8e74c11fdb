//! Activity levels and their TDEE multipliers

use serde::{Deserialize, Serialize};

use super::error::{EstimateError, EstimateResult};

/// Activity tier used to scale resting energy into total daily expenditure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// Light exercise 1-3 days/week
    Light,
    /// Moderate exercise 3-5 days/week
    Moderate,
    /// Hard exercise 6-7 days/week
    Active,
    /// Hard daily exercise plus a physical job or twice-daily training
    VeryActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::Active,
        ActivityLevel::VeryActive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very_active",
        }
    }

    /// Match a key case-insensitively, treating '-' and ' ' as '_'
    pub fn from_str(s: &str) -> Option<Self> {
        let key = s.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL.into_iter().find(|level| level.as_str() == key)
    }

    /// Like `from_str`, but an unknown key becomes an `InvalidInput` naming the accepted keys
    pub fn parse(s: &str) -> EstimateResult<Self> {
        Self::from_str(s)
            .ok_or_else(|| EstimateError::unrecognized("activity_level", s, &Self::accepted_values()))
    }

    pub fn accepted_values() -> Vec<&'static str> {
        Self::ALL.iter().map(ActivityLevel::as_str).collect()
    }

    /// TDEE multiplier for this tier
    pub fn factor(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Sedentary",
            ActivityLevel::Light => "Lightly Active",
            ActivityLevel::Moderate => "Moderately Active",
            ActivityLevel::Active => "Active",
            ActivityLevel::VeryActive => "Very Active",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_table() {
        let factors: Vec<f64> = ActivityLevel::ALL.iter().map(|a| a.factor()).collect();
        assert_eq!(factors, vec![1.2, 1.375, 1.55, 1.725, 1.9]);
    }

    #[test]
    fn test_from_str_normalizes_keys() {
        assert_eq!(ActivityLevel::from_str("sedentary"), Some(ActivityLevel::Sedentary));
        assert_eq!(ActivityLevel::from_str("Very Active"), Some(ActivityLevel::VeryActive));
        assert_eq!(ActivityLevel::from_str("very-active"), Some(ActivityLevel::VeryActive));
        assert_eq!(ActivityLevel::from_str(" MODERATE "), Some(ActivityLevel::Moderate));
    }

    #[test]
    fn test_unknown_tiers_are_rejected() {
        assert_eq!(ActivityLevel::from_str("super_active"), None);

        let err = ActivityLevel::parse("super_duper_active").unwrap_err();
        assert!(err.is_invalid_input());
        let message = err.to_string();
        assert!(message.contains("activity_level"));
        assert!(message.contains("sedentary, light, moderate, active, very_active"));
    }

    #[test]
    fn test_serde_uses_snake_case_keys() {
        let json = serde_json::to_string(&ActivityLevel::VeryActive).unwrap();
        assert_eq!(json, "\"very_active\"");
    }
}
