//! REST API handlers for menu and cart operations
//!
//! Each session owns one store. These endpoints are the presentation
//! boundary: they read snapshots and route user actions into the store.

use super::{helpers::*, models::*, state::SharedState};
use crate::error::AppError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

/// Creates routes for session, menu and cart operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/sessions", post(open_session))
        .route("/sessions/:id", get(show_session).delete(close_session))
        .route("/sessions/:id/menu/reload", post(reload_menu))
        .route("/sessions/:id/cart/items", post(add_to_cart))
        .route("/sessions/:id/cart/qty", post(change_qty))
}

fn session_response(
    session_id: String,
    snapshot: StoreSnapshot,
    menu_error: Option<String>,
) -> SessionResponse {
    SessionResponse {
        session_id,
        total_display: format_price(snapshot.cart_total),
        snapshot,
        menu_error,
    }
}

/// Endpoint: POST /sessions
/// Opens a session and loads its menu. A failed load still opens the session
/// with an empty menu and reports the error.
async fn open_session(State(state): State<SharedState>) -> impl IntoResponse {
    let (session_id, snapshot, error) = state.open_session().await;

    (
        StatusCode::CREATED,
        Json(session_response(
            session_id,
            snapshot,
            error.map(|e| e.to_string()),
        )),
    )
}

/// Endpoint: GET /sessions/:id
async fn show_session(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let store = state.session(&session_id)?;
    let snapshot = store.lock().await.snapshot();

    Ok(Json(session_response(session_id, snapshot, None)))
}

/// Endpoint: DELETE /sessions/:id
async fn close_session(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.close_session(&session_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Endpoint: POST /sessions/:id/menu/reload
/// Replaces the menu. On failure the previous menu stays and the error is returned.
/// Answers 404 when the session is closed before the fetch completes.
async fn reload_menu(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let snapshot = state.reload_menu(&session_id).await?;

    Ok(Json(session_response(session_id, snapshot, None)))
}

/// Endpoint: POST /sessions/:id/cart/items
/// Adds one unit of a menu item to the cart.
async fn add_to_cart(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
    Json(payload): Json<AddToCartInput>,
) -> Result<Json<SessionResponse>, AppError> {
    let shared = state.session(&session_id)?;
    let mut store = shared.lock().await;

    let item = store
        .menu_item(&payload.item_id)
        .cloned()
        .ok_or(AppError::UnknownMenuItem(payload.item_id))?;
    let snapshot = store.add_to_cart(&item);

    Ok(Json(session_response(session_id, snapshot, None)))
}

/// Endpoint: POST /sessions/:id/cart/qty
/// Changes the quantity of a cart line; reaching zero removes it.
async fn change_qty(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
    Json(payload): Json<ChangeQtyInput>,
) -> Result<Json<SessionResponse>, AppError> {
    let store = state.session(&session_id)?;
    let snapshot = store
        .lock()
        .await
        .change_qty(&payload.item_id, payload.delta);

    Ok(Json(session_response(session_id, snapshot, None)))
}
