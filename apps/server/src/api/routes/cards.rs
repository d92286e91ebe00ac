//! Card API Routes

use crate::api::handlers::{cards, search};
use crate::state::AppState;
use axum::{routing::get, Router};

/// Routes nested under `/api/cards`.
///
/// The static `/search` segment takes precedence over `/:id`.
pub fn card_routes() -> Router<AppState> {
    Router::new()
        .route("/search", get(search::search_cards))
        .route("/", axum::routing::post(cards::create_card))
        .route(
            "/:id",
            get(cards::get_card)
                .put(cards::update_card)
                .delete(cards::delete_card),
        )
}
