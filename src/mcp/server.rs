//! Macro Planner MCP Server Implementation
//!
//! Exposes the estimator, profile store and weight history as MCP tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::estimator::EstimatorSettings;
use crate::tools::macros::{self, EstimatorOverrides, MacroRequest};
use crate::tools::profiles::{self, ProfileFields};
use crate::tools::status::StatusTracker;
use crate::tools::{weights, StatusClass, ToolError, ToolResult};

/// Macro Planner MCP Service
#[derive(Clone)]
pub struct MacroPlannerService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    settings: EstimatorSettings,
    tool_router: ToolRouter<MacroPlannerService>,
}

impl MacroPlannerService {
    pub fn new(database_path: PathBuf, database: Database, settings: EstimatorSettings) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path, settings))),
            database,
            settings,
            tool_router: Self::tool_router(),
        }
    }
}

/// Map a tool error onto the MCP error space
fn to_mcp_error(e: ToolError) -> McpError {
    let message = e.to_string();
    match e.status_class() {
        StatusClass::NotFound => McpError::resource_not_found(message, None),
        class if class.is_client_error() => McpError::invalid_params(message, None),
        _ => McpError::internal_error(message, None),
    }
}

/// Serialize a tool result as pretty JSON text content
fn json_result<T: Serialize>(result: ToolResult<T>) -> Result<CallToolResult, McpError> {
    let value = result.map_err(to_mcp_error)?;
    let json = serde_json::to_string_pretty(&value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetProfileParams {
    /// User identifier (1-64 characters)
    pub user_id: String,
    #[serde(flatten)]
    pub fields: ProfileFields,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UserIdParams {
    /// User identifier
    pub user_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PlanForUserParams {
    /// User identifier
    pub user_id: String,
    #[serde(flatten)]
    pub overrides: EstimatorOverrides,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecordWeightParams {
    /// User identifier
    pub user_id: String,
    /// Body weight in pounds
    pub weight: f64,
    /// Date in YYYY-MM-DD format (default today)
    pub date: Option<String>,
    /// Optional notes
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct WeightHistoryParams {
    /// User identifier
    pub user_id: String,
    /// Earliest date, inclusive (YYYY-MM-DD)
    pub start_date: Option<String>,
    /// Latest date, inclusive (YYYY-MM-DD)
    pub end_date: Option<String>,
    /// Only the most recent N samples (max 1000)
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct WeightTrendParams {
    /// User identifier
    pub user_id: String,
    /// Earliest date, inclusive (YYYY-MM-DD)
    pub start_date: Option<String>,
    /// Latest date, inclusive (YYYY-MM-DD)
    pub end_date: Option<String>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl MacroPlannerService {
    // --- Status ---

    #[tool(description = "Get the current status of the Macro Planner service including build info, estimator defaults, database status, and process information")]
    async fn macro_planner_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status();
        json_result(Ok(status))
    }

    #[tool(description = "Get instructions for calculating macros, managing profiles and recording weights. Call this when unsure which inputs a model needs.")]
    fn planner_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::PLANNER_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(PLANNER_INSTRUCTIONS)]))
    }

    // --- Calculation ---

    #[tool(description = "Calculate cutting, maintaining and bulking calorie and macro targets from weight (lb), height (in), age, sex and activity level")]
    fn calculate_macros(&self, Parameters(p): Parameters<MacroRequest>) -> Result<CallToolResult, McpError> {
        json_result(macros::calculate_macros(&self.settings, &p))
    }

    #[tool(description = "Calculate a detailed plan for a single goal (cut, maintain, bulk), including RMR, TDEE and the model, basis and policy used")]
    fn calculate_macro_plan(&self, Parameters(p): Parameters<MacroRequest>) -> Result<CallToolResult, McpError> {
        json_result(macros::calculate_macro_plan(&self.settings, &p))
    }

    #[tool(description = "Calculate a plan from a stored profile. Uses the most recent recorded weight when the profile has none.")]
    fn plan_for_user(&self, Parameters(p): Parameters<PlanForUserParams>) -> Result<CallToolResult, McpError> {
        json_result(macros::plan_for_user(&self.database, &self.settings, &p.user_id, &p.overrides))
    }

    // --- Profiles ---

    #[tool(description = "Create or replace a user's profile (weight, height, age, sex, body fat, activity level, goal)")]
    fn set_profile(&self, Parameters(p): Parameters<SetProfileParams>) -> Result<CallToolResult, McpError> {
        json_result(profiles::set_profile(&self.database, &p.user_id, &p.fields))
    }

    #[tool(description = "Get a user's profile and their most recent weight sample")]
    fn get_profile(&self, Parameters(p): Parameters<UserIdParams>) -> Result<CallToolResult, McpError> {
        json_result(profiles::get_profile(&self.database, &p.user_id))
    }

    #[tool(description = "List all stored profiles")]
    fn list_profiles(&self) -> Result<CallToolResult, McpError> {
        json_result(profiles::list_profiles(&self.database))
    }

    #[tool(description = "Delete a user's profile. Weight history is kept.")]
    fn delete_profile(&self, Parameters(p): Parameters<UserIdParams>) -> Result<CallToolResult, McpError> {
        json_result(profiles::delete_profile(&self.database, &p.user_id))
    }

    // --- Weight History ---

    #[tool(description = "Record a dated body weight (lb). One sample per user per day; samples are append-only.")]
    fn record_weight(&self, Parameters(p): Parameters<RecordWeightParams>) -> Result<CallToolResult, McpError> {
        json_result(weights::record_weight(
            &self.database,
            &p.user_id,
            p.date.as_deref(),
            p.weight,
            p.notes,
        ))
    }

    #[tool(description = "Get a user's weight samples in date order, optionally limited to a date range or the most recent N")]
    fn get_weight_history(&self, Parameters(p): Parameters<WeightHistoryParams>) -> Result<CallToolResult, McpError> {
        json_result(weights::get_weight_history(
            &self.database,
            &p.user_id,
            p.start_date.as_deref(),
            p.end_date.as_deref(),
            p.limit,
        ))
    }

    #[tool(description = "Get the trend of a user's weight: total change, days spanned and least-squares weekly rate")]
    fn get_weight_trend(&self, Parameters(p): Parameters<WeightTrendParams>) -> Result<CallToolResult, McpError> {
        json_result(weights::get_weight_trend(
            &self.database,
            &p.user_id,
            p.start_date.as_deref(),
            p.end_date.as_deref(),
        ))
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for MacroPlannerService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "macro-planner".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Macro Planner".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Macro Planner - daily calorie and macronutrient targets. \
                 Call planner_instructions for inputs, models and policies. \
                 Calculation: calculate_macros (cut/maintain/bulk), calculate_macro_plan (single goal, detailed). \
                 Profiles: set/get/list/delete_profile, plan_for_user. \
                 Weights: record_weight, get_weight_history, get_weight_trend."
                    .into(),
            ),
        }
    }
}
