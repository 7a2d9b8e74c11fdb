//! Macro Planner Library
//!
//! Calorie and macronutrient estimation, a profile and weight-history store,
//! and the MCP and HTTP transports over them.

pub mod build_info;
pub mod config;
pub mod db;
pub mod estimator;
pub mod http;
pub mod mcp;
pub mod models;
pub mod tools;
