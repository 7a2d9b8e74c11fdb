//! Runtime configuration
//!
//! Read once from environment variables at startup.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::estimator::{EnergyBasis, EnergyModel, EstimatorSettings, MacroSplitPolicy};

pub const ENV_DATABASE_PATH: &str = "MACRO_PLANNER_DATABASE_PATH";
pub const ENV_ENERGY_MODEL: &str = "MACRO_PLANNER_ENERGY_MODEL";
pub const ENV_ENERGY_BASIS: &str = "MACRO_PLANNER_ENERGY_BASIS";
pub const ENV_MACRO_POLICY: &str = "MACRO_PLANNER_MACRO_POLICY";
pub const ENV_CUT_DEFICIT: &str = "MACRO_PLANNER_CUT_DEFICIT";
pub const ENV_BULK_SURPLUS: &str = "MACRO_PLANNER_BULK_SURPLUS";
pub const ENV_HTTP_ADDR: &str = "MACRO_PLANNER_HTTP_ADDR";

const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8080";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} has invalid value '{value}': {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            var,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Application configuration shared by every binary
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub estimator: EstimatorSettings,
    pub http_addr: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = lookup(ENV_DATABASE_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let mut estimator = EstimatorSettings::default();
        if let Some(value) = lookup(ENV_ENERGY_MODEL) {
            estimator.model = EnergyModel::parse(&value)
                .map_err(|e| ConfigError::invalid(ENV_ENERGY_MODEL, &value, e.to_string()))?;
        }
        if let Some(value) = lookup(ENV_ENERGY_BASIS) {
            estimator.basis = EnergyBasis::parse(&value)
                .map_err(|e| ConfigError::invalid(ENV_ENERGY_BASIS, &value, e.to_string()))?;
        }
        if let Some(value) = lookup(ENV_MACRO_POLICY) {
            estimator.policy = MacroSplitPolicy::parse(&value)
                .map_err(|e| ConfigError::invalid(ENV_MACRO_POLICY, &value, e.to_string()))?;
        }
        if let Some(value) = lookup(ENV_CUT_DEFICIT) {
            estimator.cut_deficit = parse_kcal(ENV_CUT_DEFICIT, &value)?;
        }
        if let Some(value) = lookup(ENV_BULK_SURPLUS) {
            estimator.bulk_surplus = parse_kcal(ENV_BULK_SURPLUS, &value)?;
        }

        let http_addr_raw = lookup(ENV_HTTP_ADDR).unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string());
        let http_addr = http_addr_raw
            .parse()
            .map_err(|e: std::net::AddrParseError| {
                ConfigError::invalid(ENV_HTTP_ADDR, &http_addr_raw, e.to_string())
            })?;

        Ok(Self {
            database_path,
            estimator,
            http_addr,
        })
    }
}

fn parse_kcal(var: &'static str, value: &str) -> Result<f64, ConfigError> {
    let kcal: f64 = value
        .trim()
        .parse()
        .map_err(|e: std::num::ParseFloatError| ConfigError::invalid(var, value, e.to_string()))?;
    if !kcal.is_finite() || kcal < 0.0 {
        return Err(ConfigError::invalid(var, value, "must be a non-negative number"));
    }
    if kcal.fract() != 0.0 {
        return Err(ConfigError::invalid(var, value, "must be a whole number of kcal"));
    }
    Ok(kcal)
}

/// `<project>/data/macro_planner.db`, resolved relative to the executable
pub fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(parent) = path.parent() {
            if let Some(grandparent) = parent.parent() {
                path = grandparent.to_path_buf();
            }
        }
    }

    path.push("data");
    path.push("macro_planner.db");
    path
}
