//! Remote cart API routes.
//!
//! The visitor's anonymous id comes from their session and is created on the
//! first request that needs it. Adds never fail at the HTTP level: a database
//! or session failure comes back as a destructive notification in a 200
//! response. The badge count never fails either.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{debug, instrument, warn};

use kiro_core::{CartRowId, Notification, ProductId, SoftRead};

use crate::error::Result;
use crate::middleware::visitor_session_id;
use crate::models::{CartLines, CartRow};
use crate::services::AddToCartOutcome;
use crate::state::AppState;

/// Badge count response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartCountResponse {
    pub count: i64,
    /// Whether the count is a fallback because the read failed.
    pub stale: bool,
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
}

/// Update quantity request body.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i64,
}

/// Response to a row deletion.
#[derive(Debug, Serialize)]
pub struct RemoveItemResponse {
    pub notification: Notification,
}

/// The visitor's cart lines and total.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartLines>> {
    let session_id = visitor_session_id(&session).await?;
    let lines = state.cart().cart_lines(session_id).await?;
    Ok(Json(lines))
}

/// Cart badge count.
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Json<CartCountResponse> {
    let read = match visitor_session_id(&session).await {
        Ok(session_id) => state.cart().fetch_cart_count(session_id).await,
        Err(e) => {
            debug!(error = %e, "Session unavailable, reporting an empty cart");
            SoftRead::Fallback(0)
        }
    };

    Json(CartCountResponse {
        stale: read.is_stale(),
        count: read.into_value(),
    })
}

/// Add one unit of a product.
#[instrument(skip(state, session))]
pub async fn add_item(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<AddItemRequest>,
) -> Json<AddToCartOutcome> {
    let outcome = match visitor_session_id(&session).await {
        Ok(session_id) => state.cart().add_to_cart(session_id, body.product_id).await,
        Err(e) => {
            warn!(error = %e, "Session unavailable, cannot add to cart");
            AddToCartOutcome {
                count: 0,
                notification: Notification::error("Failed to add to cart"),
            }
        }
    };
    Json(outcome)
}

/// Set a row's quantity.
#[instrument(skip(state, session))]
pub async fn update_item(
    State(state): State<AppState>,
    session: Session,
    Path(row_id): Path<CartRowId>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<CartRow>> {
    let session_id = visitor_session_id(&session).await?;
    let row = state
        .cart()
        .update_quantity(session_id, row_id, body.quantity)
        .await?;
    Ok(Json(row))
}

/// Delete a row.
#[instrument(skip(state, session))]
pub async fn remove_item(
    State(state): State<AppState>,
    session: Session,
    Path(row_id): Path<CartRowId>,
) -> Result<Json<RemoveItemResponse>> {
    let session_id = visitor_session_id(&session).await?;
    let notification = state.cart().remove_row(session_id, row_id).await?;
    Ok(Json(RemoveItemResponse { notification }))
}
