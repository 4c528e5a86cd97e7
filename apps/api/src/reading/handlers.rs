//! Axum route handlers for the Reading API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::errors::AppError;
use crate::reading::service::{generate_reading, ReadingRequest, ReadingResponse};
use crate::state::AppState;

/// POST /api/v1/readings
///
/// Body: `{ "cardIds": [past, present, future], "prompt": "..." }`.
/// Malformed JSON is reported in the same `{ "message" }` shape as other errors.
pub async fn handle_create_reading(
    State(state): State<AppState>,
    payload: Result<Json<ReadingRequest>, JsonRejection>,
) -> Result<Json<ReadingResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    let response = generate_reading(state.cards.as_ref(), &state.llm, &request).await?;

    Ok(Json(response))
}
