//! Energy and macro estimator
//!
//! Pure, synchronous calculations: resting energy, activity scaling, goal
//! adjustment and macronutrient split. No I/O happens in this module.

mod activity;
mod energy;
mod error;
mod plan;
mod profile;
mod split;
pub mod units;

pub use activity::ActivityLevel;
pub use energy::{EnergyBasis, EnergyModel};
pub use error::{EstimateError, EstimateResult};
pub use plan::{
    Estimate, Estimator, EstimatorSettings, GoalPlans, MacroPlan, DEFAULT_BULK_SURPLUS,
    DEFAULT_CUT_DEFICIT, SYMMETRIC_BULK_SURPLUS,
};
pub use profile::{validate_metrics, validate_weight, Goal, Profile, Sex};
pub use split::{MacroGrams, MacroSplitPolicy};
