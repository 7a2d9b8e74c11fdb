//! HTTP transport
//!
//! JSON API over the same tool functions the MCP server uses. Errors are
//! returned as `{"error": {"code", "message"}}` with a matching status.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::estimator::{Estimate, EstimatorSettings, GoalPlans};
use crate::tools::macros::{self, EstimatorOverrides, MacroRequest, UserPlanResponse};
use crate::tools::profiles::{self, DeleteProfileResponse, ListProfilesResponse, ProfileDetail, ProfileFields};
use crate::tools::status::{PlannerStatus, StatusTracker, PLANNER_INSTRUCTIONS};
use crate::tools::weights::{self, RecordWeightResponse, WeightHistoryResponse, WeightTrendResponse};
use crate::tools::{StatusClass, ToolError, ToolResult};

#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub settings: EstimatorSettings,
    pub status: Arc<StatusTracker>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    #[serde(skip)]
    status: StatusCode,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            status,
        }
    }

    fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusClass::Internal.code(),
            "internal error",
        )
    }
}

fn status_for(class: StatusClass) -> StatusCode {
    match class {
        StatusClass::BadRequest => StatusCode::BAD_REQUEST,
        StatusClass::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
        StatusClass::NotFound => StatusCode::NOT_FOUND,
        StatusClass::Conflict => StatusCode::CONFLICT,
        StatusClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ToolError> for ApiError {
    fn from(error: ToolError) -> Self {
        let class = error.status_class();
        if !class.is_client_error() {
            // Already logged by the tool layer; keep storage details out of the body
            return Self::internal();
        }
        Self::new(status_for(class), class.code(), error.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!(error = %rejection.body_text(), "rejected request body");
        Self::new(StatusCode::BAD_REQUEST, "bad_request", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::warn!(error = %rejection.body_text(), "rejected query string");
        Self::new(StatusCode::BAD_REQUEST, "bad_request", rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Run a store-backed tool off the async workers
async fn blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> ToolResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => Ok(Json(result?)),
        Err(e) => {
            tracing::error!(error = %e, "blocking task failed");
            Err(ApiError::internal())
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    #[serde(flatten)]
    details: PlannerStatus,
}

#[derive(Debug, Deserialize)]
pub struct RecordWeightBody {
    pub weight: f64,
    pub date: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        details: state.status.get_status(),
    })
}

async fn instructions() -> &'static str {
    PLANNER_INSTRUCTIONS
}

async fn calculate_macros(
    State(state): State<AppState>,
    body: Result<Json<MacroRequest>, JsonRejection>,
) -> ApiResult<GoalPlans> {
    let Json(req) = body?;
    Ok(Json(macros::calculate_macros(&state.settings, &req)?))
}

async fn calculate_macro_plan(
    State(state): State<AppState>,
    body: Result<Json<MacroRequest>, JsonRejection>,
) -> ApiResult<Estimate> {
    let Json(req) = body?;
    Ok(Json(macros::calculate_macro_plan(&state.settings, &req)?))
}

async fn list_profiles(State(state): State<AppState>) -> ApiResult<ListProfilesResponse> {
    blocking(move || profiles::list_profiles(&state.database)).await
}

async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<ProfileDetail> {
    blocking(move || profiles::get_profile(&state.database, &user_id)).await
}

async fn put_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Result<Json<ProfileFields>, JsonRejection>,
) -> ApiResult<ProfileDetail> {
    let Json(fields) = body?;
    blocking(move || profiles::set_profile(&state.database, &user_id, &fields)).await
}

async fn delete_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<DeleteProfileResponse> {
    blocking(move || profiles::delete_profile(&state.database, &user_id)).await
}

async fn plan_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    query: Result<Query<EstimatorOverrides>, QueryRejection>,
) -> ApiResult<UserPlanResponse> {
    let Query(overrides) = query?;
    blocking(move || macros::plan_for_user(&state.database, &state.settings, &user_id, &overrides))
        .await
}

async fn record_weight(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Result<Json<RecordWeightBody>, JsonRejection>,
) -> Result<(StatusCode, Json<RecordWeightResponse>), ApiError> {
    let Json(body) = body?;
    let response = blocking(move || {
        weights::record_weight(
            &state.database,
            &user_id,
            body.date.as_deref(),
            body.weight,
            body.notes,
        )
    })
    .await?;
    Ok((StatusCode::CREATED, response))
}

async fn weight_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> ApiResult<WeightHistoryResponse> {
    let Query(q) = query?;
    blocking(move || {
        weights::get_weight_history(
            &state.database,
            &user_id,
            q.start_date.as_deref(),
            q.end_date.as_deref(),
            q.limit,
        )
    })
    .await
}

async fn weight_trend(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> ApiResult<WeightTrendResponse> {
    let Query(q) = query?;
    blocking(move || {
        weights::get_weight_trend(
            &state.database,
            &user_id,
            q.start_date.as_deref(),
            q.end_date.as_deref(),
        )
    })
    .await
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/instructions", get(instructions))
        .route("/calculate_macros", post(calculate_macros))
        .route("/calculate_macro_plan", post(calculate_macro_plan))
        .route("/profiles", get(list_profiles))
        .route(
            "/profiles/{user_id}",
            get(get_profile).put(put_profile).delete(delete_profile),
        )
        .route("/profiles/{user_id}/plan", get(plan_for_user))
        .route(
            "/profiles/{user_id}/weights",
            get(weight_history).post(record_weight),
        )
        .route("/profiles/{user_id}/weights/trend", get(weight_trend))
        .with_state(state)
}

/// Resolves on Ctrl-C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::path::PathBuf;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let database = Database::open_in_memory().expect("database");
        database
            .with_conn(migrations::run_migrations)
            .expect("migrations");
        let settings = EstimatorSettings::default();
        build_app(AppState {
            database,
            settings,
            status: Arc::new(StatusTracker::new(PathBuf::from(":memory:"), settings)),
        })
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn original_body() -> serde_json::Value {
        serde_json::json!({
            "weight": 180,
            "height": 70,
            "age": 30,
            "gender": "male",
            "activity_level": "sedentary"
        })
    }

    #[tokio::test]
    async fn calculate_macros_returns_three_goals() {
        let app = test_app();
        let (status, json) = send(&app, "POST", "/calculate_macros", Some(original_body())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["maintaining"]["calories"], 2247);
        assert_eq!(json["cutting"]["calories"], 1747);
        assert_eq!(json["bulking"]["calories"], 2547);
    }

    #[tokio::test]
    async fn invalid_gender_is_bad_request() {
        let app = test_app();
        let mut body = original_body();
        body["gender"] = serde_json::json!("other");
        let (status, json) = send(&app, "POST", "/calculate_macros", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "invalid_input");
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("male, female"));
    }

    #[tokio::test]
    async fn invalid_activity_is_bad_request() {
        let app = test_app();
        let mut body = original_body();
        body["activity_level"] = serde_json::json!("super_duper_active");
        let (status, _) = send(&app, "POST", "/calculate_macros", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_body_uses_error_envelope() {
        let app = test_app();
        let (status, json) = send(
            &app,
            "POST",
            "/calculate_macros",
            Some(serde_json::json!({"weight": "heavy"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "bad_request");
    }

    #[tokio::test]
    async fn infeasible_goal_is_unprocessable() {
        let app = test_app();
        let body = serde_json::json!({
            "weight": 20,
            "height": 20,
            "age": 120,
            "sex": "female",
            "activity_level": "sedentary",
            "goal": "cut"
        });
        let (status, json) = send(&app, "POST", "/calculate_macro_plan", Some(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"]["code"], "infeasible");
    }

    #[tokio::test]
    async fn profile_weights_and_plan_flow() {
        let app = test_app();

        let profile = serde_json::json!({
            "height": 70,
            "age": 30,
            "sex": "male",
            "activity_level": "sedentary"
        });
        let (status, _) = send(&app, "PUT", "/profiles/alex", Some(profile)).await;
        assert_eq!(status, StatusCode::OK);

        for (date, weight) in [("2025-03-01", 182.0), ("2025-03-08", 180.0)] {
            let body = serde_json::json!({"date": date, "weight": weight});
            let (status, _) = send(&app, "POST", "/profiles/alex/weights", Some(body)).await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let duplicate = serde_json::json!({"date": "2025-03-08", "weight": 179.0});
        let (status, json) = send(&app, "POST", "/profiles/alex/weights", Some(duplicate)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "conflict");

        let (status, json) = send(&app, "GET", "/profiles/alex/plan", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["weight_lb"], 180.0);
        assert_eq!(json["estimate"]["plan"]["calories"], 2247);

        let (status, json) = send(&app, "GET", "/profiles/alex/weights?limit=1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total"], 1);

        let (status, json) = send(&app, "GET", "/profiles/alex/weights/trend", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["trend"]["days_spanned"], 7);

        let (status, _) = send(&app, "DELETE", "/profiles/alex", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, json) = send(&app, "GET", "/profiles/alex", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let app = test_app();
        let (status, json) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], crate::build_info::VERSION);
    }

    #[test]
    fn api_error_maps_tool_errors() {
        let response = ApiError::from(ToolError::Conflict("dup".into())).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let response = ApiError::from(ToolError::NotFound("gone".into())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
