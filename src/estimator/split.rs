//! Macro split policies
//!
//! Each policy allocates a calorie target across protein, carbohydrate and
//! fat grams. Values stay unrounded here; rounding happens once when the
//! plan is assembled.

use serde::{Deserialize, Serialize};

use super::error::{EstimateError, EstimateResult};
use super::profile::Profile;
use super::units::{KCAL_PER_G_CARBS, KCAL_PER_G_FAT, KCAL_PER_G_PROTEIN};

/// Unrounded gram targets
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroGrams {
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

/// How calories are divided between macronutrients
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroSplitPolicy {
    /// 40% protein, 30% carbs, 30% fat by calories
    #[default]
    Percentage,
    /// 1 g protein per lb bodyweight, 40% carbs, 30% fat by calories
    BodyweightProtein,
    /// 1 g protein per lb lean mass, 0.3 g fat per lb bodyweight, carbs fill the rest
    LeanMass,
}

impl MacroSplitPolicy {
    pub const ALL: [MacroSplitPolicy; 3] = [
        MacroSplitPolicy::Percentage,
        MacroSplitPolicy::BodyweightProtein,
        MacroSplitPolicy::LeanMass,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MacroSplitPolicy::Percentage => "percentage",
            MacroSplitPolicy::BodyweightProtein => "bodyweight_protein",
            MacroSplitPolicy::LeanMass => "lean_mass",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "percentage" | "percent" => Some(MacroSplitPolicy::Percentage),
            "bodyweight_protein" | "bodyweight" => Some(MacroSplitPolicy::BodyweightProtein),
            "lean_mass" | "lean" => Some(MacroSplitPolicy::LeanMass),
            _ => None,
        }
    }

    pub fn parse(s: &str) -> EstimateResult<Self> {
        Self::from_str(s).ok_or_else(|| {
            let accepted: Vec<&str> = Self::ALL.iter().map(MacroSplitPolicy::as_str).collect();
            EstimateError::unrecognized("policy", s, &accepted)
        })
    }

    /// Split `calories` for the given profile
    pub fn split(&self, profile: &Profile, calories: f64) -> EstimateResult<MacroGrams> {
        match self {
            MacroSplitPolicy::Percentage => Ok(MacroGrams {
                protein_g: calories * 0.40 / KCAL_PER_G_PROTEIN,
                carbs_g: calories * 0.30 / KCAL_PER_G_CARBS,
                fat_g: calories * 0.30 / KCAL_PER_G_FAT,
            }),
            MacroSplitPolicy::BodyweightProtein => Ok(MacroGrams {
                protein_g: profile.weight_lb,
                carbs_g: calories * 0.40 / KCAL_PER_G_CARBS,
                fat_g: calories * 0.30 / KCAL_PER_G_FAT,
            }),
            MacroSplitPolicy::LeanMass => {
                let protein_g = profile.lean_mass_lb(self.as_str())?;
                let fat_g = profile.weight_lb * 0.3;
                let carbs_g = (calories
                    - protein_g * KCAL_PER_G_PROTEIN
                    - fat_g * KCAL_PER_G_FAT)
                    / KCAL_PER_G_CARBS;
                if carbs_g < 0.0 {
                    return Err(EstimateError::InfeasibleMacroSplit { carbs_g });
                }
                Ok(MacroGrams {
                    protein_g,
                    carbs_g,
                    fat_g,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::ActivityLevel;

    fn profile() -> Profile {
        Profile::new(180.0, ActivityLevel::Sedentary).with_body_fat(20.0)
    }

    #[test]
    fn test_percentage_split() {
        let grams = MacroSplitPolicy::Percentage.split(&profile(), 2000.0).unwrap();
        assert!((grams.protein_g - 200.0).abs() < 1e-9);
        assert!((grams.carbs_g - 150.0).abs() < 1e-9);
        assert!((grams.fat_g - 2000.0 * 0.3 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_bodyweight_protein_split() {
        let grams = MacroSplitPolicy::BodyweightProtein
            .split(&profile(), 2000.0)
            .unwrap();
        assert_eq!(grams.protein_g, 180.0);
        assert!((grams.carbs_g - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_lean_mass_split() {
        let grams = MacroSplitPolicy::LeanMass.split(&profile(), 2980.4).unwrap();
        assert!((grams.protein_g - 144.0).abs() < 1e-9);
        assert!((grams.fat_g - 54.0).abs() < 1e-9);
        assert!((grams.carbs_g - 479.6).abs() < 1e-9);
    }

    #[test]
    fn test_lean_mass_split_rejects_negative_carbs() {
        // 144 g protein + 54 g fat = 1062 kcal before any carbs
        let err = MacroSplitPolicy::LeanMass.split(&profile(), 1000.0).unwrap_err();
        match err {
            EstimateError::InfeasibleMacroSplit { carbs_g } => {
                assert!((carbs_g - (-15.5)).abs() < 1e-9)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_lean_mass_split_requires_body_fat() {
        let bare = Profile::new(180.0, ActivityLevel::Sedentary);
        let err = MacroSplitPolicy::LeanMass.split(&bare, 2500.0).unwrap_err();
        assert!(err.is_invalid_input());
    }
}
