//! Card CRUD handlers
//!
//! Writes go through `CardService`, which clears the search cache after each commit.

use crate::{models::CardInput, state::AppState, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

pub async fn get_card(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let card = state.card_service.get(id).await?;
    Ok(Json(card))
}

pub async fn create_card(
    State(state): State<AppState>,
    Json(input): Json<CardInput>,
) -> Result<impl IntoResponse> {
    let card = state.card_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(card)))
}

pub async fn update_card(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<CardInput>,
) -> Result<impl IntoResponse> {
    let card = state.card_service.update(id, input).await?;
    Ok(Json(card))
}

pub async fn delete_card(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.card_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
