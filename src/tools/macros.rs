//! Macro calculation tools
//!
//! Turn loosely-typed request fields into a validated [`Profile`] and run the
//! estimator, either ad hoc or against a stored profile.

use rmcp::schemars;
use serde::{Deserialize, Serialize};

use super::{logged, normalize_user_id, ToolError, ToolResult};
use crate::db::Database;
use crate::estimator::{
    ActivityLevel, EnergyBasis, EnergyModel, Estimate, Estimator, EstimatorSettings, Goal,
    GoalPlans, MacroSplitPolicy, Profile, Sex,
};
use crate::models::{StoredProfile, WeightSample};

/// Per-call overrides of the configured estimator settings
#[derive(Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema)]
pub struct EstimatorOverrides {
    /// Energy model: mifflin_st_jeor, mifflin_st_jeor_metric or katch_mcardle
    pub model: Option<String>,
    /// Energy basis: tdee or rmr
    pub basis: Option<String>,
    /// Macro split policy: percentage, bodyweight_protein or lean_mass
    pub policy: Option<String>,
}

impl EstimatorOverrides {
    /// Apply the overrides on top of `defaults`
    pub fn apply(&self, defaults: &EstimatorSettings) -> ToolResult<EstimatorSettings> {
        let mut settings = *defaults;
        if let Some(model) = self.model.as_deref() {
            settings.model = EnergyModel::parse(model)?;
        }
        if let Some(basis) = self.basis.as_deref() {
            settings.basis = EnergyBasis::parse(basis)?;
        }
        if let Some(policy) = self.policy.as_deref() {
            settings.policy = MacroSplitPolicy::parse(policy)?;
        }
        Ok(settings)
    }

    pub fn estimator(&self, defaults: &EstimatorSettings) -> ToolResult<Estimator> {
        Ok(Estimator::new(self.apply(defaults)?)?)
    }
}

/// Body metrics for an ad hoc calculation
#[derive(Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema)]
pub struct MacroRequest {
    /// Body weight in pounds
    pub weight: f64,
    /// Height in inches (Mifflin-St Jeor models)
    pub height: Option<f64>,
    /// Age in years (Mifflin-St Jeor models)
    pub age: Option<u32>,
    /// male or female (Mifflin-St Jeor models)
    #[serde(alias = "gender")]
    pub sex: Option<String>,
    /// Body fat percentage in [0, 100] (Katch-McArdle and lean_mass policy)
    pub body_fat_pct: Option<f64>,
    /// sedentary, light, moderate, active or very_active
    pub activity_level: String,
    /// cut, maintain or bulk (default maintain)
    pub goal: Option<String>,
    #[serde(flatten)]
    pub overrides: EstimatorOverrides,
}

impl MacroRequest {
    /// Validated estimator input
    pub fn to_profile(&self) -> ToolResult<Profile> {
        let activity = ActivityLevel::parse(&self.activity_level)?;
        let sex = self.sex.as_deref().map(Sex::parse).transpose()?;
        let goal = self.goal.as_deref().map(Goal::parse).transpose()?.unwrap_or_default();

        let profile = Profile {
            weight_lb: self.weight,
            height_in: self.height,
            body_fat_pct: self.body_fat_pct,
            age_years: self.age,
            sex,
            activity,
            goal,
        };
        profile.validate()?;
        Ok(profile)
    }
}

/// Cutting, maintaining and bulking plans for an ad hoc profile
pub fn calculate_macros(defaults: &EstimatorSettings, req: &MacroRequest) -> ToolResult<GoalPlans> {
    logged("calculate_macros", || {
        let estimator = req.overrides.estimator(defaults)?;
        let profile = req.to_profile()?;
        Ok(estimator.plan_all(&profile)?)
    })
}

/// Detailed single-goal estimate for an ad hoc profile
pub fn calculate_macro_plan(defaults: &EstimatorSettings, req: &MacroRequest) -> ToolResult<Estimate> {
    logged("calculate_macro_plan", || {
        let estimator = req.overrides.estimator(defaults)?;
        let profile = req.to_profile()?;
        Ok(estimator.estimate(&profile)?)
    })
}

/// Where the weight used for a stored-profile plan came from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum WeightSource {
    Profile,
    LatestSample { date: chrono::NaiveDate },
}

#[derive(Debug, Serialize)]
pub struct UserPlanResponse {
    pub user_id: String,
    pub weight_lb: f64,
    pub weight_source: WeightSource,
    /// Plan for the profile's own goal
    pub estimate: Estimate,
    pub all_goals: GoalPlans,
}

/// Plan for a stored profile, falling back to the latest weight sample
pub fn plan_for_user(
    db: &Database,
    defaults: &EstimatorSettings,
    user_id: &str,
    overrides: &EstimatorOverrides,
) -> ToolResult<UserPlanResponse> {
    logged("plan_for_user", || {
        let user_id = normalize_user_id(user_id)?;
        let estimator = overrides.estimator(defaults)?;

        let (stored, latest) = db.with_conn(|conn| {
            Ok((
                StoredProfile::get(conn, &user_id)?,
                WeightSample::latest(conn, &user_id)?,
            ))
        })?;
        let stored = stored
            .ok_or_else(|| ToolError::NotFound(format!("No profile for user '{}'", user_id)))?;

        let weight_source = match (&stored.weight_lb, &latest) {
            (Some(_), _) => WeightSource::Profile,
            (None, Some(sample)) => WeightSource::LatestSample { date: sample.date },
            (None, None) => WeightSource::Profile,
        };
        let profile = stored.to_profile(latest.as_ref().map(|s| s.weight_lb))?;
        profile.validate()?;

        let estimate = estimator.estimate(&profile)?;
        let all_goals = estimator.plan_all(&profile)?;

        Ok(UserPlanResponse {
            user_id,
            weight_lb: profile.weight_lb,
            weight_source,
            estimate,
            all_goals,
        })
    })
}
