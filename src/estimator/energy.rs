//! Resting energy models and the baseline they feed
//!
//! Two formula families exist: Mifflin-St Jeor (height, age and sex driven)
//! and Katch-McArdle (lean-mass driven). The imperial and metric Mifflin-St
//! Jeor forms give different numbers and are kept as separate variants.

use serde::{Deserialize, Serialize};

use super::activity::ActivityLevel;
use super::error::{EstimateError, EstimateResult};
use super::profile::{Profile, Sex};
use super::units::{in_to_cm, lb_to_kg};

/// Formula used to estimate resting metabolic rate (kcal/day)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyModel {
    /// Imperial, sex-specific form:
    /// male `66 + 6.23 lb + 12.7 in - 6.8 age`,
    /// female `655 + 4.35 lb + 4.7 in - 4.7 age`
    #[default]
    MifflinStJeor,
    /// Metric, sex-independent form: `10 kg + 6.25 cm - 5 age + 5`
    MifflinStJeorMetric,
    /// `370 + 21.6 * lean_mass_lb`
    KatchMcArdle,
}

impl EnergyModel {
    pub const ALL: [EnergyModel; 3] = [
        EnergyModel::MifflinStJeor,
        EnergyModel::MifflinStJeorMetric,
        EnergyModel::KatchMcArdle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnergyModel::MifflinStJeor => "mifflin_st_jeor",
            EnergyModel::MifflinStJeorMetric => "mifflin_st_jeor_metric",
            EnergyModel::KatchMcArdle => "katch_mcardle",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "mifflin_st_jeor" | "mifflin" | "msj" => Some(EnergyModel::MifflinStJeor),
            "mifflin_st_jeor_metric" | "mifflin_metric" | "msj_metric" => {
                Some(EnergyModel::MifflinStJeorMetric)
            }
            "katch_mcardle" | "katch" => Some(EnergyModel::KatchMcArdle),
            _ => None,
        }
    }

    pub fn parse(s: &str) -> EstimateResult<Self> {
        Self::from_str(s).ok_or_else(|| {
            let accepted: Vec<&str> = Self::ALL.iter().map(EnergyModel::as_str).collect();
            EstimateError::unrecognized("model", s, &accepted)
        })
    }

    /// Resting metabolic rate for the profile
    pub fn rmr(&self, profile: &Profile) -> EstimateResult<f64> {
        let name = self.as_str();
        let rmr = match self {
            EnergyModel::MifflinStJeor => {
                let height = profile.require_height(name)?;
                let age = f64::from(profile.require_age(name)?);
                match profile.require_sex(name)? {
                    Sex::Male => 66.0 + 6.23 * profile.weight_lb + 12.7 * height - 6.8 * age,
                    Sex::Female => 655.0 + 4.35 * profile.weight_lb + 4.7 * height - 4.7 * age,
                }
            }
            EnergyModel::MifflinStJeorMetric => {
                let height_cm = in_to_cm(profile.require_height(name)?);
                let age = f64::from(profile.require_age(name)?);
                10.0 * lb_to_kg(profile.weight_lb) + 6.25 * height_cm - 5.0 * age + 5.0
            }
            EnergyModel::KatchMcArdle => 370.0 + 21.6 * profile.lean_mass_lb(name)?,
        };
        Ok(rmr)
    }
}

/// What the goal adjustment is applied to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyBasis {
    /// RMR scaled by the activity multiplier
    #[default]
    Tdee,
    /// RMR alone, activity ignored
    Rmr,
}

impl EnergyBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnergyBasis::Tdee => "tdee",
            EnergyBasis::Rmr => "rmr",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "tdee" => Some(EnergyBasis::Tdee),
            "rmr" | "bmr" => Some(EnergyBasis::Rmr),
            _ => None,
        }
    }

    pub fn parse(s: &str) -> EstimateResult<Self> {
        Self::from_str(s).ok_or_else(|| EstimateError::unrecognized("basis", s, &["tdee", "rmr"]))
    }

    /// Activity multiplier in effect under this basis
    pub fn factor(&self, activity: ActivityLevel) -> f64 {
        match self {
            EnergyBasis::Tdee => activity.factor(),
            EnergyBasis::Rmr => 1.0,
        }
    }
}
