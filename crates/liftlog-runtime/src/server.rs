//! HTTP API for the dashboard front end.
//!
//! - `GET /api/csv-data?year=&month=`: the full [`DashboardReport`]; `month`
//!   is zero-based (January is 0) to match the front end
//! - `GET /api/user-settings`: persisted goals and filtering
//! - `PUT /api/user-settings`: validate and persist new settings
//! - `GET /health`: liveness probe
//!
//! Every report request reads the CSV and the user settings file again, so
//! edits to either show up without a restart.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use liftlog_core::error::{LiftlogError, Result};
use liftlog_core::models::DashboardReport;
use liftlog_core::settings::{Settings, UserSettings};
use liftlog_core::time_utils::{today_in, MonthKey};
use liftlog_data::analysis::ReportRequest;
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::data_manager::DataManager;

// ── State ─────────────────────────────────────────────────────────────────────

/// Everything a request needs to build a report.
#[derive(Debug)]
pub struct AppContext {
    /// CSV file, or directory holding exports.
    pub source: PathBuf,
    /// Persisted user settings file.
    pub settings_path: PathBuf,
    /// Command-line / environment settings; explicit values override the
    /// user settings file.
    pub settings: Settings,
}

impl AppContext {
    /// Build the report for `year` / `month`, defaulting to the current
    /// month in the configured timezone.
    pub fn report(&self, year: Option<i32>, month: Option<u32>) -> Result<DashboardReport> {
        let today = today_in(&self.settings.timezone);
        let month = MonthKey::resolve(year, month, today)?;
        let user = UserSettings::load_from(&self.settings_path);
        let config = self.settings.dashboard_config(&user)?;

        let request = ReportRequest {
            month,
            today,
            config,
        };
        DataManager::new(self.source.clone()).report(&request)
    }
}

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    inner: Arc<AppContext>,
}

impl AppState {
    pub fn new(context: AppContext) -> Self {
        Self {
            inner: Arc::new(context),
        }
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Failure of an API handler, rendered as a JSON error body.
#[derive(Debug)]
pub enum ApiError {
    /// A pipeline or configuration error.
    Liftlog(LiftlogError),
    /// The request carried unusable input.
    BadRequest(String),
    /// Anything else, such as a panicked worker.
    Internal(String),
}

impl From<LiftlogError> for ApiError {
    fn from(e: LiftlogError) -> Self {
        Self::Liftlog(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Liftlog(e @ LiftlogError::SourceUnavailable(_)) => {
                (StatusCode::NOT_FOUND, json!({ "error": e.to_string() }))
            }
            Self::Liftlog(e @ (LiftlogError::NoColumnsFound | LiftlogError::InvalidMonth { .. })) => {
                (StatusCode::BAD_REQUEST, json!({ "error": e.to_string() }))
            }
            Self::Liftlog(LiftlogError::ParseFailure { diagnostics }) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Error parsing CSV file", "details": diagnostics }),
            ),
            Self::Liftlog(e) => internal_error(e.to_string()),
            Self::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "error": message }),
            ),
            Self::Internal(message) => internal_error(message),
        };

        if status.is_server_error() {
            tracing::error!(%status, body = %body, "request failed");
        } else {
            tracing::debug!(%status, body = %body, "request rejected");
        }

        (status, Json(body)).into_response()
    }
}

fn internal_error(message: String) -> (StatusCode, serde_json::Value) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "Internal server error", "message": message }),
    )
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// Optional `year` / `month` (0-11) query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl MonthQuery {
    /// Calendar month (1-12) for [`MonthKey`].
    fn calendar_month(&self) -> Option<u32> {
        self.month.map(|m| m.saturating_add(1))
    }
}

async fn csv_data_handler(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> std::result::Result<Json<DashboardReport>, ApiError> {
    let context = Arc::clone(&state.inner);
    let month = query.calendar_month();
    let report = tokio::task::spawn_blocking(move || context.report(query.year, month))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(Json(report))
}

async fn get_user_settings_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let user = UserSettings::load_from(&state.inner.settings_path);
    Json(json!({ "userSettings": user }))
}

async fn put_user_settings_handler(
    State(state): State<AppState>,
    Json(user): Json<UserSettings>,
) -> std::result::Result<Json<serde_json::Value>, ApiError> {
    user.validate().map_err(|e| match e {
        LiftlogError::Config(message) => ApiError::BadRequest(message),
        other => ApiError::Liftlog(other),
    })?;
    let context = Arc::clone(&state.inner);
    tokio::task::spawn_blocking(move || user.save_to(&context.settings_path))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    tracing::info!(path = %state.inner.settings_path.display(), "user settings saved");
    Ok(Json(json!({ "success": true })))
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

// ── Router ────────────────────────────────────────────────────────────────────

/// All API routes with request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/csv-data", get(csv_data_handler))
        .route(
            "/api/user-settings",
            get(get_user_settings_handler).put(put_user_settings_handler),
        )
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API on `addr` until `shutdown` resolves.
pub async fn serve(
    addr: SocketAddr,
    state: AppState,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use tempfile::TempDir;
    use tower::ServiceExt;

    const EXPORT: &str = "\
Date,Workout Name,Duration,Exercise Name,Set Order,Weight,Reps,Distance
2024-03-02 08:00:00,Legs,1h 5m,Squat,1,100,5,
2024-03-02 08:00:00,Legs,1h 5m,Squat,2,100,5,
2024-03-05 18:00:00,Cardio,30m,Running (Outdoor),1,,,5.0
2024-02-20 08:00:00,Push,50m,Bench Press,1,60,8,
";

    struct Fixture {
        _dir: TempDir,
        csv: PathBuf,
        state: AppState,
    }

    fn fixture(csv_text: Option<&str>) -> Fixture {
        let dir = TempDir::new().expect("tempdir");
        let csv = dir.path().join("strong_workouts.csv");
        if let Some(text) = csv_text {
            std::fs::write(&csv, text).unwrap();
        }
        let state = AppState::new(AppContext {
            source: csv.clone(),
            settings_path: UserSettings::config_path_in(dir.path()),
            settings: Settings::load_from_args(["liftlog", "--timezone", "UTC"]),
        });
        Fixture {
            _dir: dir,
            csv,
            state,
        }
    }

    async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router(state.clone())
            .oneshot(request)
            .await
            .expect("request");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    fn put_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("PUT")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    // ── /api/csv-data ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_csv_data_for_month() {
        let fx = fixture(Some(EXPORT));
        let (status, body) = send(&fx.state, get_request("/api/csv-data?year=2024&month=2")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["dateColumn"], "Date");
        assert_eq!(body["totalGroups"], 3);
        assert_eq!(body["totalRows"], 4);
        assert_eq!(body["thisMonthSessionCount"], 2);
        assert_eq!(body["thisMonthAverageDistance"], 5.0);
        assert_eq!(body["prevMonthAverageDuration"], 50);
        assert_eq!(body["weeklyGoal"], 3);
        assert_eq!(body["last10Sessions"][0]["date"], "2024-03-02");
        assert_eq!(body["groups"][0]["date"], "2024-03-05");
    }

    #[tokio::test]
    async fn test_csv_data_defaults_to_current_month() {
        let fx = fixture(Some(EXPORT));
        let (status, body) = send(&fx.state, get_request("/api/csv-data")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalRows"], 4);
    }

    #[tokio::test]
    async fn test_csv_data_missing_file_is_404() {
        let fx = fixture(None);
        let (status, body) = send(&fx.state, get_request("/api/csv-data")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let message = body["error"].as_str().unwrap();
        assert!(message.starts_with("CSV file not found at path:"));
        assert!(message.contains(fx.csv.to_str().unwrap()));
    }

    #[tokio::test]
    async fn test_csv_data_parse_errors_are_500_with_details() {
        let fx = fixture(Some("Date,Weight,Reps\n2024-03-02,100\n"));
        let (status, body) = send(&fx.state, get_request("/api/csv-data")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Error parsing CSV file");
        assert_eq!(body["details"][0]["line"], 2);
    }

    #[tokio::test]
    async fn test_csv_data_empty_file_is_400() {
        let fx = fixture(Some(""));
        let (status, body) = send(&fx.state, get_request("/api/csv-data")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No columns found in CSV file");
    }

    #[tokio::test]
    async fn test_csv_data_month_is_zero_based() {
        let fx = fixture(Some(EXPORT));

        let (status, body) = send(&fx.state, get_request("/api/csv-data?year=2024&month=1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["thisMonthSessionCount"], 1);
        assert_eq!(body["thisMonthAverageDuration"], 50);

        // January.
        let (status, body) = send(&fx.state, get_request("/api/csv-data?year=2024&month=0")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["thisMonthSessionCount"], 0);
    }

    #[tokio::test]
    async fn test_csv_data_invalid_month_is_400() {
        let fx = fixture(Some(EXPORT));
        let (status, _) = send(&fx.state, get_request("/api/csv-data?year=2024&month=12")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    // ── /api/user-settings ────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_get_user_settings_defaults() {
        let fx = fixture(None);
        let (status, body) = send(&fx.state, get_request("/api/user-settings")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["userSettings"]["goals"]["WeeklyWorkoutGoal"], 3);
        assert_eq!(
            body["userSettings"]["filtering"]["MaxSessionLengthInMinutes"],
            360
        );
    }

    #[tokio::test]
    async fn test_put_user_settings_applies_to_reports() {
        let fx = fixture(Some(EXPORT));
        let new_settings = json!({
            "goals": {
                "WeeklyWorkoutGoal": 5,
                "VolumeIncreasePercentageGoal": 2.5,
                "SessionLengthGoalInMinutes": 45
            },
            "filtering": { "MaxSessionLengthInMinutes": 60 }
        });

        let (status, body) = send(&fx.state, put_json("/api/user-settings", new_settings)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (_, body) = send(&fx.state, get_request("/api/user-settings")).await;
        assert_eq!(body["userSettings"]["goals"]["WeeklyWorkoutGoal"], 5);

        let (_, report) = send(&fx.state, get_request("/api/csv-data?year=2024&month=2")).await;
        assert_eq!(report["weeklyGoal"], 5);
        assert_eq!(report["volumeIncreaseGoal"], 2.5);
        assert_eq!(report["sessionLengthGoal"], 45);
        // "1h 5m" is now over the 60-minute ceiling.
        assert_eq!(report["thisMonthAverageDuration"], 30);
    }

    #[tokio::test]
    async fn test_put_invalid_user_settings_is_400() {
        let fx = fixture(None);
        let invalid = json!({ "filtering": { "MaxSessionLengthInMinutes": 0 } });
        let (status, body) = send(&fx.state, put_json("/api/user-settings", invalid)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(!fx.state.inner.settings_path.exists());
    }

    // ── /health ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_health() {
        let fx = fixture(None);
        let (status, body) = send(&fx.state, get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    // ── ApiError ──────────────────────────────────────────────────────────────

    #[test]
    fn test_unexpected_errors_are_generic_500() {
        let err = ApiError::from(LiftlogError::Config("bad hours".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
