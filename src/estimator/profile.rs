//! Profile snapshot consumed by the estimator

use serde::{Deserialize, Serialize};

use super::activity::ActivityLevel;
use super::error::{EstimateError, EstimateResult};

/// Biological sex, used only by the imperial Mifflin-St Jeor equations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub const ACCEPTED: [&'static str; 2] = ["male", "female"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Some(Sex::Male),
            "female" | "f" => Some(Sex::Female),
            _ => None,
        }
    }

    pub fn parse(s: &str) -> EstimateResult<Self> {
        Self::from_str(s).ok_or_else(|| EstimateError::unrecognized("sex", s, &Self::ACCEPTED))
    }
}

/// Calorie goal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Cut,
    #[default]
    Maintain,
    Bulk,
}

impl Goal {
    pub const ALL: [Goal; 3] = [Goal::Cut, Goal::Maintain, Goal::Bulk];

    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::Cut => "cut",
            Goal::Maintain => "maintain",
            Goal::Bulk => "bulk",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "cut" | "cutting" | "lose" => Some(Goal::Cut),
            "maintain" | "maintaining" | "maintenance" => Some(Goal::Maintain),
            "bulk" | "bulking" | "gain" => Some(Goal::Bulk),
            _ => None,
        }
    }

    pub fn parse(s: &str) -> EstimateResult<Self> {
        Self::from_str(s).ok_or_else(|| {
            let accepted: Vec<&str> = Self::ALL.iter().map(Goal::as_str).collect();
            EstimateError::unrecognized("goal", s, &accepted)
        })
    }
}

/// Body metrics and goal for one person at one point in time
///
/// Fields marked optional are only required by some energy models or split
/// policies; the estimator reports which one is missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub weight_lb: f64,
    pub height_in: Option<f64>,
    pub body_fat_pct: Option<f64>,
    pub age_years: Option<u32>,
    pub sex: Option<Sex>,
    pub activity: ActivityLevel,
    #[serde(default)]
    pub goal: Goal,
}

impl Profile {
    pub fn new(weight_lb: f64, activity: ActivityLevel) -> Self {
        Self {
            weight_lb,
            height_in: None,
            body_fat_pct: None,
            age_years: None,
            sex: None,
            activity,
            goal: Goal::default(),
        }
    }

    pub fn with_height(mut self, height_in: f64) -> Self {
        self.height_in = Some(height_in);
        self
    }

    pub fn with_age(mut self, age_years: u32) -> Self {
        self.age_years = Some(age_years);
        self
    }

    pub fn with_sex(mut self, sex: Sex) -> Self {
        self.sex = Some(sex);
        self
    }

    pub fn with_body_fat(mut self, body_fat_pct: f64) -> Self {
        self.body_fat_pct = Some(body_fat_pct);
        self
    }

    pub fn with_goal(mut self, goal: Goal) -> Self {
        self.goal = goal;
        self
    }

    /// Check ranges of every supplied field
    pub fn validate(&self) -> EstimateResult<()> {
        validate_weight(self.weight_lb)?;
        validate_metrics(self.height_in, self.age_years, self.body_fat_pct)
    }

    pub fn require_height(&self, needed_by: &str) -> EstimateResult<f64> {
        self.height_in
            .ok_or_else(|| EstimateError::missing("height_in", needed_by))
    }

    pub fn require_age(&self, needed_by: &str) -> EstimateResult<u32> {
        self.age_years
            .ok_or_else(|| EstimateError::missing("age_years", needed_by))
    }

    pub fn require_sex(&self, needed_by: &str) -> EstimateResult<Sex> {
        self.sex.ok_or_else(|| {
            EstimateError::invalid(
                "sex",
                format!("required by {}. Choose from: {}", needed_by, Sex::ACCEPTED.join(", ")),
            )
        })
    }

    pub fn require_body_fat(&self, needed_by: &str) -> EstimateResult<f64> {
        self.body_fat_pct
            .ok_or_else(|| EstimateError::missing("body_fat_pct", needed_by))
    }

    /// Body weight minus estimated fat mass
    pub fn lean_mass_lb(&self, needed_by: &str) -> EstimateResult<f64> {
        let body_fat = self.require_body_fat(needed_by)?;
        Ok(self.weight_lb * (1.0 - body_fat / 100.0))
    }
}

/// Weight must be a finite positive number
pub fn validate_weight(weight_lb: f64) -> EstimateResult<()> {
    if !weight_lb.is_finite() || weight_lb <= 0.0 {
        return Err(EstimateError::invalid(
            "weight_lb",
            format!("must be a positive number, got {}", weight_lb),
        ));
    }
    Ok(())
}

/// Range checks for the optional metrics, independent of weight
pub fn validate_metrics(
    height_in: Option<f64>,
    age_years: Option<u32>,
    body_fat_pct: Option<f64>,
) -> EstimateResult<()> {
    if let Some(height) = height_in {
        if !height.is_finite() || height <= 0.0 {
            return Err(EstimateError::invalid(
                "height_in",
                format!("must be a positive number, got {}", height),
            ));
        }
    }
    if age_years == Some(0) {
        return Err(EstimateError::invalid("age_years", "must be greater than zero"));
    }
    if let Some(body_fat) = body_fat_pct {
        if !body_fat.is_finite() || !(0.0..=100.0).contains(&body_fat) {
            return Err(EstimateError::invalid(
                "body_fat_pct",
                format!("must be in [0, 100], got {}", body_fat),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Profile {
        Profile::new(180.0, ActivityLevel::Sedentary)
    }

    #[test]
    fn test_sex_parsing() {
        assert_eq!(Sex::from_str("Male"), Some(Sex::Male));
        assert_eq!(Sex::from_str("FEMALE"), Some(Sex::Female));
        assert_eq!(Sex::from_str("other"), None);

        let err = Sex::parse("other").unwrap_err();
        assert!(err.to_string().contains("male, female"));
    }

    #[test]
    fn test_goal_parsing() {
        assert_eq!(Goal::from_str("cutting"), Some(Goal::Cut));
        assert_eq!(Goal::from_str("Maintenance"), Some(Goal::Maintain));
        assert_eq!(Goal::from_str("bulk"), Some(Goal::Bulk));
        assert!(Goal::parse("recomp").unwrap_err().to_string().contains("cut, maintain, bulk"));
    }

    #[test]
    fn test_validate_accepts_complete_profile() {
        let profile = base()
            .with_height(70.0)
            .with_age(30)
            .with_sex(Sex::Male)
            .with_body_fat(20.0);
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_positive_values() {
        assert!(Profile::new(0.0, ActivityLevel::Light).validate().is_err());
        assert!(Profile::new(-5.0, ActivityLevel::Light).validate().is_err());
        assert!(Profile::new(f64::NAN, ActivityLevel::Light).validate().is_err());
        assert!(base().with_height(0.0).validate().is_err());
        assert!(base().with_age(0).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_body_fat_out_of_range() {
        assert!(base().with_body_fat(-1.0).validate().is_err());
        assert!(base().with_body_fat(100.1).validate().is_err());
        assert!(base().with_body_fat(0.0).validate().is_ok());
        assert!(base().with_body_fat(100.0).validate().is_ok());
    }

    #[test]
    fn test_lean_mass() {
        let lean = base().with_body_fat(20.0).lean_mass_lb("test").unwrap();
        assert!((lean - 144.0).abs() < 1e-9);

        let err = base().lean_mass_lb("katch_mcardle").unwrap_err();
        assert_eq!(
            err,
            EstimateError::InvalidInput {
                field: "body_fat_pct",
                message: "required by katch_mcardle".to_string(),
            }
        );
    }
}
