use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::models::card::CardRow;
use crate::state::AppState;

/// GET /  and  GET /api/v1/cards
///
/// The full catalog, shuffled on every request.
pub async fn handle_list_cards(
    State(state): State<AppState>,
) -> Result<Json<Vec<CardRow>>, AppError> {
    let cards = state.cards.list_shuffled().await?;
    Ok(Json(cards))
}
