use axum::{Json, extract::State};
use chrono::NaiveDateTime;
use parkfinder_core::tariff::{DurationRounding, FacilityTariff};
use parkfinder_core::{FeeResult, Hours};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState, ErrorBody, resolve_duration};

#[derive(Debug, Deserialize)]
pub(super) struct FeeRequest {
    facility: String,
    arrival: NaiveDateTime,
    duration_hours: Option<Hours>,
    departure: Option<NaiveDateTime>,
    #[serde(default)]
    rounding: DurationRounding,
}

#[derive(Debug, Deserialize)]
pub(super) struct QuoteRequest {
    facilities: Vec<String>,
    arrival: NaiveDateTime,
    duration_hours: Option<Hours>,
    departure: Option<NaiveDateTime>,
    #[serde(default)]
    rounding: DurationRounding,
}

#[derive(Debug, Serialize)]
pub(super) struct QuoteItem {
    facility: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fee: Option<FeeResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody>,
}

pub(super) async fn list_tariffs(State(state): State<AppState>) -> Json<Vec<FacilityTariff>> {
    Json(state.tariffs.iter().cloned().collect())
}

pub(super) async fn compute_fee(
    State(state): State<AppState>,
    Json(request): Json<FeeRequest>,
) -> Result<Json<FeeResult>, ApiError> {
    let hours = resolve_duration(
        request.arrival,
        request.duration_hours,
        request.departure,
        request.rounding,
    )?;
    let tariffs = state.tariffs.clone();
    let fee = tokio::task::spawn_blocking(move || {
        tariffs.compute_fee(&request.facility, request.arrival, hours)
    })
    .await
    .map_err(ApiError::worker_failed)??;
    Ok(Json(fee))
}

pub(super) async fn quote_facilities(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<Vec<QuoteItem>>, ApiError> {
    let hours = resolve_duration(
        request.arrival,
        request.duration_hours,
        request.departure,
        request.rounding,
    )?;

    let tariffs = state.tariffs.clone();
    let quotes = tokio::task::spawn_blocking(move || {
        tariffs.quote_all(&request.facilities, request.arrival, hours)
    })
    .await
    .map_err(ApiError::worker_failed)?;

    let items = quotes
        .into_iter()
        .map(|(facility, result)| match result {
            Ok(fee) => QuoteItem {
                facility,
                fee: Some(fee),
                error: None,
            },
            Err(e) => QuoteItem {
                facility,
                fee: None,
                error: Some(ErrorBody {
                    code: e.code().to_string(),
                    message: e.to_string(),
                }),
            },
        })
        .collect();
    Ok(Json(items))
}
