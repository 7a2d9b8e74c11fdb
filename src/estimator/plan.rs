//! Goal-adjusted calorie and macro plans

use serde::{Deserialize, Serialize};

use super::activity::ActivityLevel;
use super::energy::{EnergyBasis, EnergyModel};
use super::error::{EstimateError, EstimateResult};
use super::profile::{Goal, Profile};
use super::split::{MacroGrams, MacroSplitPolicy};

/// Deficit applied for a cut (kcal)
pub const DEFAULT_CUT_DEFICIT: f64 = 500.0;

/// Surplus applied for a bulk (kcal)
pub const DEFAULT_BULK_SURPLUS: f64 = 300.0;

/// Surplus that mirrors the cut deficit, used by the symmetric variant
pub const SYMMETRIC_BULK_SURPLUS: f64 = 500.0;

/// Rounded daily targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacroPlan {
    pub calories: u32,
    pub protein_g: u32,
    pub carbs_g: u32,
    pub fat_g: u32,
}

impl MacroPlan {
    fn from_parts(calories: f64, grams: &MacroGrams) -> EstimateResult<Self> {
        Ok(Self {
            calories: round_non_negative("calories", calories)?,
            protein_g: round_non_negative("protein_g", grams.protein_g)?,
            carbs_g: round_non_negative("carbs_g", grams.carbs_g)?,
            fat_g: round_non_negative("fat_g", grams.fat_g)?,
        })
    }
}

fn round_non_negative(field: &'static str, value: f64) -> EstimateResult<u32> {
    if !value.is_finite() || value > f64::from(u32::MAX) {
        return Err(EstimateError::invalid(
            field,
            format!("computed value {} is out of range", value),
        ));
    }
    // Negative values are rejected before this point
    Ok(value.max(0.0).round() as u32)
}

/// Plans for all three goals from one profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalPlans {
    pub cutting: MacroPlan,
    pub maintaining: MacroPlan,
    pub bulking: MacroPlan,
}

impl GoalPlans {
    pub fn get(&self, goal: Goal) -> &MacroPlan {
        match goal {
            Goal::Cut => &self.cutting,
            Goal::Maintain => &self.maintaining,
            Goal::Bulk => &self.bulking,
        }
    }
}

/// A single-goal plan together with the intermediate values that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    pub goal: Goal,
    pub model: EnergyModel,
    pub basis: EnergyBasis,
    pub policy: MacroSplitPolicy,
    pub activity: ActivityLevel,
    pub rmr: f64,
    pub tdee: f64,
    pub baseline: f64,
    pub calories: f64,
    pub plan: MacroPlan,
}

/// Selects the model, basis, policy and goal offsets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimatorSettings {
    pub model: EnergyModel,
    pub basis: EnergyBasis,
    pub policy: MacroSplitPolicy,
    pub cut_deficit: f64,
    pub bulk_surplus: f64,
}

impl Default for EstimatorSettings {
    fn default() -> Self {
        Self {
            model: EnergyModel::default(),
            basis: EnergyBasis::default(),
            policy: MacroSplitPolicy::default(),
            cut_deficit: DEFAULT_CUT_DEFICIT,
            bulk_surplus: DEFAULT_BULK_SURPLUS,
        }
    }
}

impl EstimatorSettings {
    pub fn with_model(mut self, model: EnergyModel) -> Self {
        self.model = model;
        self
    }

    pub fn with_basis(mut self, basis: EnergyBasis) -> Self {
        self.basis = basis;
        self
    }

    pub fn with_policy(mut self, policy: MacroSplitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_bulk_surplus(mut self, bulk_surplus: f64) -> Self {
        self.bulk_surplus = bulk_surplus;
        self
    }

    pub fn with_cut_deficit(mut self, cut_deficit: f64) -> Self {
        self.cut_deficit = cut_deficit;
        self
    }

    pub fn validate(&self) -> EstimateResult<()> {
        if !self.cut_deficit.is_finite() || self.cut_deficit < 0.0 {
            return Err(EstimateError::invalid(
                "cut_deficit",
                format!("must be a non-negative number, got {}", self.cut_deficit),
            ));
        }
        if !self.bulk_surplus.is_finite() || self.bulk_surplus < 0.0 {
            return Err(EstimateError::invalid(
                "bulk_surplus",
                format!("must be a non-negative number, got {}", self.bulk_surplus),
            ));
        }
        if self.cut_deficit.fract() != 0.0 {
            return Err(EstimateError::invalid(
                "cut_deficit",
                format!("must be a whole number of kcal, got {}", self.cut_deficit),
            ));
        }
        if self.bulk_surplus.fract() != 0.0 {
            return Err(EstimateError::invalid(
                "bulk_surplus",
                format!("must be a whole number of kcal, got {}", self.bulk_surplus),
            ));
        }
        Ok(())
    }

    /// Calorie offset for a goal, relative to the baseline
    pub fn goal_offset(&self, goal: Goal) -> f64 {
        match goal {
            Goal::Cut => -self.cut_deficit,
            Goal::Maintain => 0.0,
            Goal::Bulk => self.bulk_surplus,
        }
    }
}

/// Pure calculator turning profiles into plans
///
/// Holds only its settings, so one instance can be shared freely between
/// callers and always returns the same output for the same profile.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Estimator {
    settings: EstimatorSettings,
}

impl Estimator {
    pub fn new(settings: EstimatorSettings) -> EstimateResult<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &EstimatorSettings {
        &self.settings
    }

    /// Resting metabolic rate under the configured model
    pub fn rmr(&self, profile: &Profile) -> EstimateResult<f64> {
        profile.validate()?;
        self.settings.model.rmr(profile)
    }

    /// Energy the goal adjustment is applied to: TDEE or RMR depending on basis
    pub fn baseline(&self, profile: &Profile) -> EstimateResult<f64> {
        let rmr = self.rmr(profile)?;
        Ok(rmr * self.settings.basis.factor(profile.activity))
    }

    /// Unrounded goal calories; negative results are an error, never clamped
    pub fn calories_for(&self, profile: &Profile, goal: Goal) -> EstimateResult<f64> {
        let baseline = self.baseline(profile)?;
        adjusted_calories(baseline, self.settings.goal_offset(goal))
    }

    /// Plan for the profile's own goal
    pub fn plan(&self, profile: &Profile) -> EstimateResult<MacroPlan> {
        Ok(self.estimate(profile)?.plan)
    }

    /// Plan for the profile's own goal, with intermediates
    pub fn estimate(&self, profile: &Profile) -> EstimateResult<Estimate> {
        let rmr = self.rmr(profile)?;
        let tdee = rmr * profile.activity.factor();
        let baseline = rmr * self.settings.basis.factor(profile.activity);
        let goal = profile.goal;
        let calories = adjusted_calories(baseline, self.settings.goal_offset(goal))?;
        let plan = self.plan_from_calories(profile, calories)?;

        tracing::debug!(
            model = self.settings.model.as_str(),
            basis = self.settings.basis.as_str(),
            goal = goal.as_str(),
            rmr,
            baseline,
            calories,
            "computed macro plan"
        );

        Ok(Estimate {
            goal,
            model: self.settings.model,
            basis: self.settings.basis,
            policy: self.settings.policy,
            activity: profile.activity,
            rmr,
            tdee,
            baseline,
            calories,
            plan,
        })
    }

    /// Plans for cut, maintain and bulk; the first failing goal fails the call
    pub fn plan_all(&self, profile: &Profile) -> EstimateResult<GoalPlans> {
        let baseline = self.baseline(profile)?;
        let plan_for = |goal: Goal| -> EstimateResult<MacroPlan> {
            let calories = adjusted_calories(baseline, self.settings.goal_offset(goal))?;
            self.plan_from_calories(profile, calories)
        };

        Ok(GoalPlans {
            cutting: plan_for(Goal::Cut)?,
            maintaining: plan_for(Goal::Maintain)?,
            bulking: plan_for(Goal::Bulk)?,
        })
    }

    fn plan_from_calories(&self, profile: &Profile, calories: f64) -> EstimateResult<MacroPlan> {
        let grams = self.settings.policy.split(profile, calories)?;
        MacroPlan::from_parts(calories, &grams)
    }
}

fn adjusted_calories(baseline: f64, offset: f64) -> EstimateResult<f64> {
    let calories = baseline + offset;
    if calories < 0.0 {
        return Err(EstimateError::InfeasibleInput { calories });
    }
    Ok(calories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::Sex;

    fn male_180() -> Profile {
        Profile::new(180.0, ActivityLevel::Sedentary)
            .with_height(70.0)
            .with_age(30)
            .with_sex(Sex::Male)
    }

    fn lean_mass_estimator() -> Estimator {
        Estimator::new(
            EstimatorSettings::default()
                .with_model(EnergyModel::KatchMcArdle)
                .with_basis(EnergyBasis::Rmr)
                .with_policy(MacroSplitPolicy::LeanMass),
        )
        .unwrap()
    }

    #[test]
    fn test_mifflin_sedentary_maintenance() {
        let estimator = Estimator::default();
        let baseline = estimator.baseline(&male_180()).unwrap();
        assert!((baseline - 2246.88).abs() < 1e-9);

        let plans = estimator.plan_all(&male_180()).unwrap();
        assert_eq!(plans.maintaining.calories, 2247);
        // 40/30/30 of 2246.88
        assert_eq!(plans.maintaining.protein_g, 225);
        assert_eq!(plans.maintaining.carbs_g, 169);
        assert_eq!(plans.maintaining.fat_g, 75);
    }

    #[test]
    fn test_katch_mcardle_cut_with_lean_mass_split() {
        let profile = Profile::new(180.0, ActivityLevel::Sedentary)
            .with_body_fat(20.0)
            .with_goal(Goal::Cut);
        let estimate = lean_mass_estimator().estimate(&profile).unwrap();

        assert!((estimate.rmr - 3480.4).abs() < 1e-9);
        assert!((estimate.calories - 2980.4).abs() < 1e-9);
        assert_eq!(
            estimate.plan,
            MacroPlan {
                calories: 2980,
                protein_g: 144,
                carbs_g: 480,
                fat_g: 54,
            }
        );
    }

    #[test]
    fn test_katch_mcardle_at_full_body_fat() {
        let estimator =
            Estimator::new(EstimatorSettings::default().with_model(EnergyModel::KatchMcArdle))
                .unwrap();
        let profile = Profile::new(180.0, ActivityLevel::VeryActive).with_body_fat(100.0);

        let estimate = estimator.estimate(&profile).unwrap();
        assert!((estimate.rmr - 370.0).abs() < 1e-9);
        assert_eq!(estimate.plan.calories, 703);

        let plans = estimator.plan_all(&profile).unwrap();
        assert_eq!(plans.cutting.calories, 203);
    }

    #[test]
    fn test_goal_offsets_hold_across_profiles() {
        let estimator = Estimator::default();
        for weight in [110.0, 150.0, 180.0, 240.0, 320.0] {
            for activity in ActivityLevel::ALL {
                let profile = Profile::new(weight, activity)
                    .with_height(66.0)
                    .with_age(45)
                    .with_sex(Sex::Female);
                let plans = estimator.plan_all(&profile).unwrap();
                assert_eq!(plans.cutting.calories, plans.maintaining.calories - 500);
                assert_eq!(plans.bulking.calories, plans.maintaining.calories + 300);
            }
        }
    }

    #[test]
    fn test_symmetric_bulk_surplus() {
        let estimator = Estimator::new(
            EstimatorSettings::default().with_bulk_surplus(SYMMETRIC_BULK_SURPLUS),
        )
        .unwrap();
        let plans = estimator.plan_all(&male_180()).unwrap();
        assert_eq!(plans.bulking.calories, plans.maintaining.calories + 500);
    }

    #[test]
    fn test_rmr_basis_ignores_activity() {
        let estimator =
            Estimator::new(EstimatorSettings::default().with_basis(EnergyBasis::Rmr)).unwrap();
        let sedentary = estimator.baseline(&male_180()).unwrap();
        let mut active = male_180();
        active.activity = ActivityLevel::VeryActive;
        assert_eq!(sedentary, estimator.baseline(&active).unwrap());
        assert!((sedentary - 1872.4).abs() < 1e-9);
    }

    #[test]
    fn test_single_goal_plan_matches_three_goal_output() {
        let estimator = Estimator::default();
        let plans = estimator.plan_all(&male_180()).unwrap();
        for goal in Goal::ALL {
            let plan = estimator.plan(&male_180().with_goal(goal)).unwrap();
            assert_eq!(&plan, plans.get(goal));
        }
    }

    #[test]
    fn test_invalid_sex_returns_no_plan() {
        let mut profile = male_180();
        profile.sex = Sex::from_str("other");
        let err = Estimator::default().plan_all(&profile).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_negative_calories_are_infeasible() {
        let estimator = Estimator::new(
            EstimatorSettings::default()
                .with_basis(EnergyBasis::Rmr)
                .with_cut_deficit(5000.0),
        )
        .unwrap();
        let err = estimator
            .plan(&male_180().with_goal(Goal::Cut))
            .unwrap_err();
        assert!(matches!(err, EstimateError::InfeasibleInput { .. }));
        assert!(estimator.plan_all(&male_180()).is_err());
        assert!(estimator.plan(&male_180()).is_ok());
    }

    #[test]
    fn test_lean_mass_negative_carbs_are_infeasible() {
        // Very lean, heavy profile: protein and fat floors exceed a cut budget
        let profile = Profile::new(250.0, ActivityLevel::Sedentary)
            .with_body_fat(5.0)
            .with_goal(Goal::Cut);
        let estimator = Estimator::new(
            EstimatorSettings::default()
                .with_model(EnergyModel::KatchMcArdle)
                .with_basis(EnergyBasis::Rmr)
                .with_policy(MacroSplitPolicy::LeanMass)
                .with_cut_deficit(4800.0),
        )
        .unwrap();
        // rmr 5500, calories 700 against 1625 kcal of protein and fat
        let err = estimator.plan(&profile).unwrap_err();
        assert!(matches!(err, EstimateError::InfeasibleMacroSplit { .. }));
    }

    #[test]
    fn test_settings_validation() {
        assert!(Estimator::new(EstimatorSettings::default().with_bulk_surplus(-1.0)).is_err());
        assert!(Estimator::new(EstimatorSettings::default().with_cut_deficit(f64::NAN)).is_err());
        assert!(Estimator::new(EstimatorSettings::default().with_bulk_surplus(300.5)).is_err());
        assert!(Estimator::new(EstimatorSettings::default().with_cut_deficit(499.9)).is_err());
        assert!(Estimator::new(EstimatorSettings::default().with_bulk_surplus(250.0)).is_ok());
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let estimator = Estimator::default();
        let profile = male_180().with_goal(Goal::Bulk);
        let first = estimator.estimate(&profile).unwrap();
        let second = estimator.estimate(&profile).unwrap();
        assert_eq!(first.calories.to_bits(), second.calories.to_bits());
        assert_eq!(first, second);
    }
}
