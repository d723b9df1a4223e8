mod fees;
mod search;

use std::sync::Arc;

use axum::{
    BoxError, Json, Router,
    error_handling::HandleErrorLayer,
    http::{Method, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDateTime;
use parkfinder_core::tariff::{DurationRounding, stay_hours};
use parkfinder_core::{Error, Hours, TariffTable};
use serde::Serialize;
use tower::ServiceBuilder;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower::timeout::TimeoutLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

/// Shared read-only state. The tariff table is built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub tariffs: Arc<TariffTable>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(tariffs: TariffTable, config: ServerConfig) -> Self {
        Self {
            tariffs: Arc::new(tariffs),
            config: Arc::new(config),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    fn worker_failed(error: tokio::task::JoinError) -> Self {
        tracing::error!(error = %error, "blocking worker failed");
        Self::new("internal_error", "blocking worker failed")
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        if !error.is_recoverable() {
            tracing::warn!(error = %error, "request rejected");
        }
        ApiError::new(error.code(), error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "unknown_facility" | "no_open_facility" => StatusCode::NOT_FOUND,
            "not_locatable" | "no_destination" | "invalid_stay" | "invalid_tariff"
            | "invalid_data" | "bad_request" => StatusCode::BAD_REQUEST,
            "timeout" => StatusCode::REQUEST_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Billable hours of a stay given either as a duration or as a departure
/// time.
pub(super) fn resolve_duration(
    arrival: NaiveDateTime,
    duration_hours: Option<Hours>,
    departure: Option<NaiveDateTime>,
    rounding: DurationRounding,
) -> Result<Hours, ApiError> {
    match (duration_hours, departure) {
        (Some(hours), None) => Ok(hours),
        (None, Some(departure)) => Ok(stay_hours(arrival, departure, rounding)?),
        (Some(_), Some(_)) => Err(ApiError::new(
            "bad_request",
            "give either duration_hours or departure, not both",
        )),
        (None, None) => Err(ApiError::new(
            "bad_request",
            "duration_hours or departure is required",
        )),
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

async fn handle_middleware_error(error: BoxError) -> ApiError {
    if error.is::<tower::timeout::error::Elapsed>() {
        ApiError::new("timeout", "request took too long")
    } else {
        tracing::error!(error = %error, "unhandled middleware error");
        ApiError::new("internal_error", "internal error")
    }
}

pub fn build_app(state: AppState) -> Router {
    let timeout = state.config.request_timeout();
    let concurrency = state.config.max_concurrent_requests;

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/tariffs", get(fees::list_tariffs))
        .route("/api/v1/fees", post(fees::compute_fee))
        .route("/api/v1/quotes", post(fees::quote_facilities))
        .route("/api/v1/search", post(search::run_search))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(timeout))
                .layer(GlobalConcurrencyLimitLayer::new(concurrency)),
        )
        .with_state(state)
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

async fn health() -> impl IntoResponse {
    Json(HealthData { status: "ok" })
}


#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;

    use super::test_support::send;
    use super::*;

    #[tokio::test]
    async fn health_reports_ok() {
        let (status, json) = send(
            Request::builder()
                .uri("/api/v1/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[test]
    fn core_errors_map_to_statuses() {
        let unknown: ApiError = Error::UnknownFacility("Mystery".into()).into();
        assert_eq!(unknown.into_response().status(), StatusCode::NOT_FOUND);

        let stay: ApiError = Error::InvalidStay("backwards".into()).into();
        assert_eq!(stay.into_response().status(), StatusCode::BAD_REQUEST);

        let io: ApiError = Error::IoError(std::io::Error::other("disk")).into();
        assert_eq!(
            io.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn duration_comes_from_exactly_one_source() {
        let arrival = chrono::NaiveDate::from_ymd_opt(2024, 5, 10)
            .and_then(|d| d.and_hms_opt(21, 0, 0))
            .expect("date");
        let departure = arrival + chrono::TimeDelta::minutes(90);

        let rounding = DurationRounding::Ceil;
        assert_eq!(
            resolve_duration(arrival, None, Some(departure), rounding).unwrap(),
            2.0
        );
        assert_eq!(resolve_duration(arrival, Some(1.5), None, rounding).unwrap(), 1.5);
        assert!(resolve_duration(arrival, Some(1.5), Some(departure), rounding).is_err());
        assert!(resolve_duration(arrival, None, None, rounding).is_err());
        assert!(resolve_duration(departure, None, Some(arrival), rounding).is_err());
    }
}
