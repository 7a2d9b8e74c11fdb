//! Macro Planner Status Tool
//!
//! Runtime status of the service and usage instructions for assistants.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::estimator::EstimatorSettings;

/// Planner usage instructions for AI assistants
pub const PLANNER_INSTRUCTIONS: &str = r#"
# Macro Planner Instructions

Daily calorie and macronutrient targets from body metrics. All weights are in
pounds and heights in inches.

## Quick Calculation

**Tool:** `calculate_macros`
- Required: `weight`, `activity_level`
- Mifflin-St Jeor (default model) also needs `height`, `age`, `sex`
- Returns `cutting`, `maintaining` and `bulking` plans

**Tool:** `calculate_macro_plan`
- Same input plus an optional `goal` (cut, maintain, bulk; default maintain)
- Returns one plan together with rmr, tdee, baseline and the settings used

### Activity levels

| Level | Multiplier |
|-------|------------|
| sedentary | 1.2 |
| light | 1.375 |
| moderate | 1.55 |
| active | 1.725 |
| very_active | 1.9 |

### Optional selectors

- `model`: mifflin_st_jeor (imperial, default), mifflin_st_jeor_metric,
  katch_mcardle (needs `body_fat_pct`)
- `basis`: tdee (activity-scaled, default) or rmr (goal offset applied to RMR)
- `policy`: percentage (40/30/30 of calories), bodyweight_protein
  (1 g protein per lb, 40% carbs, 30% fat), lean_mass (1 g protein per lb of
  lean mass, 0.3 g fat per lb, remainder carbs)

Omitted selectors fall back to the server's configured defaults.

## Stored Profiles

1. `set_profile` with `user_id` and the same body fields. Weight is optional.
2. `record_weight` to append dated weigh-ins (one per day, YYYY-MM-DD).
3. `plan_for_user` computes a plan from the stored profile. When the profile
   has no weight, the most recent weigh-in is used.

Other tools: `get_profile`, `list_profiles`, `delete_profile`,
`get_weight_history`, `get_weight_trend` (weekly rate of change).

## Errors

- Unrecognized sex, activity level, goal, model, basis or policy values are
  rejected with the accepted choices listed.
- A goal that would drive calories or carbohydrates below zero is reported as
  infeasible instead of being clamped.
- Recording a second weight for the same user and date is a conflict.
"#;

/// Runtime status of the Macro Planner service
#[derive(Debug, Clone, Serialize)]
pub struct PlannerStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Estimator defaults
    pub estimator: EstimatorSettings,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
    estimator: EstimatorSettings,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf, estimator: EstimatorSettings) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
            estimator,
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> PlannerStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        PlannerStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            estimator: self.estimator,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::ActivityLevel;

    #[test]
    fn test_status_reports_settings_and_process() {
        let tracker = StatusTracker::new(
            PathBuf::from("/nonexistent/macro_planner.db"),
            EstimatorSettings::default().with_bulk_surplus(500.0),
        );
        let status = tracker.get_status();
        assert_eq!(status.process_id, std::process::id());
        assert_eq!(status.database_size_bytes, None);
        assert_eq!(status.estimator.bulk_surplus, 500.0);
        assert_eq!(status.version, crate::build_info::VERSION);
    }

    #[test]
    fn test_instructions_list_every_activity_level() {
        for level in ActivityLevel::ALL {
            assert!(PLANNER_INSTRUCTIONS.contains(level.as_str()));
        }
    }
}
