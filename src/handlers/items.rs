use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;

use crate::db::models::GroceryItem;
use crate::middleware::payload::JsonPayload;
use crate::{GroceryError, router::GroceryState};

/// GET /api/items
pub async fn get_items(
    State(state): State<GroceryState>,
) -> Result<Json<Vec<GroceryItem>>, GroceryError> {
    info!("GET /api/items");
    Ok(Json(state.ops.all().await?))
}

/// GET /api/items/{id}
pub async fn get_item(
    State(state): State<GroceryState>,
    Path(id): Path<i64>,
) -> Result<Json<GroceryItem>, GroceryError> {
    info!(id, "GET /api/items/{{id}}");
    Ok(Json(state.ops.get(&[("id", id)]).await?))
}

/// POST /api/items -> 201 with the stored item.
pub async fn post_item(
    State(state): State<GroceryState>,
    JsonPayload(body): JsonPayload,
) -> Result<(StatusCode, Json<GroceryItem>), GroceryError> {
    info!("POST /api/items");
    let item = state.ops.create(&body).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PATCH /api/items/{id}
pub async fn patch_item(
    State(state): State<GroceryState>,
    Path(id): Path<i64>,
    JsonPayload(body): JsonPayload,
) -> Result<Json<GroceryItem>, GroceryError> {
    info!(id, "PATCH /api/items/{{id}}");
    Ok(Json(state.ops.patch(&[("id", id)], &body).await?))
}

/// DELETE /api/items/{id}
pub async fn delete_item(
    State(state): State<GroceryState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, GroceryError> {
    info!(id, "DELETE /api/items/{{id}}");
    state.ops.delete::<GroceryItem>(&[("id", id)]).await?;
    Ok(StatusCode::NO_CONTENT)
}
