//! Participant listing for clients that render outside a session.

use axum::extract::State;
use axum::response::Json;

use crate::state::AppState;
use crate::store::Participant;

/// `GET /api/people`: every participant in id order, without passwords.
pub async fn list_people(State(state): State<AppState>) -> Json<Vec<Participant>> {
    Json(state.store.snapshot().values().cloned().collect())
}
