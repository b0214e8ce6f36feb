//! JSON API handlers

use std::sync::Arc;

use axum::{
    Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::AirqError;
use crate::estimator::{EstimateRequest, EstimatorService};
use crate::models::{Estimate, LiveReading};

/// Shared, read-only state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<EstimatorService>,
}

impl AppState {
    pub fn new(service: EstimatorService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model_loaded: bool,
    pub model: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiRegion {
    pub region: String,
    pub districts: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct LiveQuery {
    pub district: String,
    pub region: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}

/// Error returned by handlers; rendered as an inline message
pub struct ApiError(AirqError);

impl From<AirqError> for ApiError {
    fn from(err: AirqError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            AirqError::LocationNotFound { .. } => StatusCode::NOT_FOUND,
            AirqError::Validation { .. }
            | AirqError::NoData { .. }
            | AirqError::Unclassifiable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AirqError::Geocoding { .. } | AirqError::AirQuality { .. } => StatusCode::BAD_GATEWAY,
            AirqError::ModelUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AirqError::Inference { .. } | AirqError::Config { .. } | AirqError::Io { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!(status = status.as_u16(), "Request failed: {}", self.0);
        let body = ErrorBody {
            error: self.0.user_message(),
            code: self.0.code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// JSON body for requests cut off by the request timeout
pub(crate) async fn timeout_as_json(response: Response) -> Response {
    if response.status() != StatusCode::REQUEST_TIMEOUT {
        return response;
    }
    warn!("Request timed out");
    let body = ErrorBody {
        error: "The request took too long. Please try again later.".to_string(),
        code: "timeout".to_string(),
    };
    (StatusCode::REQUEST_TIMEOUT, Json(body)).into_response()
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/regions", get(get_regions))
        .route("/live", get(get_live))
        .route("/predict", post(predict))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        model_loaded: state.service.model_loaded(),
        model: state.service.model_description(),
    })
}

async fn get_regions(State(state): State<AppState>) -> Json<Vec<ApiRegion>> {
    let regions = state
        .service
        .regions()
        .regions()
        .iter()
        .map(|region| ApiRegion {
            region: region.name.to_string(),
            districts: region.districts.iter().map(ToString::to_string).collect(),
        })
        .collect();
    Json(regions)
}

async fn get_live(
    State(state): State<AppState>,
    query: Result<Query<LiveQuery>, QueryRejection>,
) -> Result<Json<LiveReading>, ApiError> {
    let Query(query) = query.map_err(|rejection| AirqError::validation(rejection.body_text()))?;
    let district = state
        .service
        .resolve_district(query.region.as_deref(), &query.district)?;
    let live = state.service.fetch_live(&district).await?;
    Ok(Json(live))
}

async fn predict(
    State(state): State<AppState>,
    request: Result<Json<EstimateRequest>, JsonRejection>,
) -> Result<Json<Estimate>, ApiError> {
    let Json(request) =
        request.map_err(|rejection| AirqError::validation(rejection.body_text()))?;
    let estimate = state.service.estimate(request).await?;
    Ok(Json(estimate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (AirqError::location_not_found("X"), StatusCode::NOT_FOUND),
            (AirqError::validation("bad"), StatusCode::UNPROCESSABLE_ENTITY),
            (
                AirqError::no_data(Coordinates::new(0.0, 0.0).unwrap(), "empty"),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (AirqError::geocoding("timeout"), StatusCode::BAD_GATEWAY),
            (AirqError::air_quality("HTTP 500"), StatusCode::BAD_GATEWAY),
            (
                AirqError::model_unavailable("missing"),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AirqError::inference("nan"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }
}
