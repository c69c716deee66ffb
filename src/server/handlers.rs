use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::lookup::{AddressRecord, LookupError, ProviderDescriptor};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

pub(super) struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

impl From<LookupError> for ApiError {
    fn from(e: LookupError) -> Self {
        let status = match e {
            LookupError::InvalidCep(_) => StatusCode::BAD_REQUEST,
            LookupError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        api_error(status, e.to_string())
    }
}

// ─── GET /api/cep/{cep} ──────────────────────────────────────────

pub(super) async fn lookup(
    State(state): State<Arc<AppState>>,
    Path(cep): Path<String>,
) -> Result<Json<AddressRecord>, ApiError> {
    let start = Instant::now();

    // Providers block on HTTP; keep them off the async workers.
    let query = cep.clone();
    let result = tokio::task::spawn_blocking(move || state.resolver.lookup(&query))
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    match result {
        Ok(record) => {
            tracing::info!(cep = %cep, provider = %record.provider_id, elapsed_ms, "GET /api/cep");
            Ok(Json(record))
        }
        Err(e) => {
            tracing::info!(cep = %cep, outcome = %e, elapsed_ms, "GET /api/cep");
            Err(e.into())
        }
    }
}

// ─── GET /api/providers ──────────────────────────────────────────

pub(super) async fn providers(State(state): State<Arc<AppState>>) -> Json<Vec<ProviderDescriptor>> {
    Json(state.resolver.descriptors())
}
