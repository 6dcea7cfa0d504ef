use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;

use crate::db::models::{List, ListItem};
use crate::middleware::payload::JsonPayload;
use crate::{GroceryError, router::GroceryState};

/// GET /api/lists
pub async fn get_lists(State(state): State<GroceryState>) -> Result<Json<Vec<List>>, GroceryError> {
    info!("GET /api/lists");
    Ok(Json(state.ops.all().await?))
}

/// GET /api/lists/{id}
pub async fn get_list(
    State(state): State<GroceryState>,
    Path(id): Path<i64>,
) -> Result<Json<List>, GroceryError> {
    info!(id, "GET /api/lists/{{id}}");
    Ok(Json(state.ops.get(&[("id", id)]).await?))
}

/// POST /api/lists -> 201 with the stored list.
pub async fn post_list(
    State(state): State<GroceryState>,
    JsonPayload(body): JsonPayload,
) -> Result<(StatusCode, Json<List>), GroceryError> {
    info!("POST /api/lists");
    let list = state.ops.create(&body).await?;
    Ok((StatusCode::CREATED, Json(list)))
}

/// PATCH /api/lists/{id}
pub async fn patch_list(
    State(state): State<GroceryState>,
    Path(id): Path<i64>,
    JsonPayload(body): JsonPayload,
) -> Result<Json<List>, GroceryError> {
    info!(id, "PATCH /api/lists/{{id}}");
    Ok(Json(state.ops.patch(&[("id", id)], &body).await?))
}

/// DELETE /api/lists/{id}; the list's items go with it.
pub async fn delete_list(
    State(state): State<GroceryState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, GroceryError> {
    info!(id, "DELETE /api/lists/{{id}}");
    state.ops.delete::<List>(&[("id", id)]).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/lists/{id}/items
pub async fn get_list_items(
    State(state): State<GroceryState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ListItem>>, GroceryError> {
    info!(id, "GET /api/lists/{{id}}/items");
    Ok(Json(state.ops.items_on_list(id).await?))
}

/// GET /api/lists/{id}/{grocery_item_id}
pub async fn get_list_item(
    State(state): State<GroceryState>,
    Path((id, grocery_item_id)): Path<(i64, i64)>,
) -> Result<Json<ListItem>, GroceryError> {
    info!(id, grocery_item_id, "GET /api/lists/{{id}}/{{grocery_item_id}}");
    let key = [("on_list", id), ("grocery_item_id", grocery_item_id)];
    Ok(Json(state.ops.get(&key).await?))
}

/// PATCH /api/lists/{id}/{grocery_item_id}
pub async fn patch_list_item(
    State(state): State<GroceryState>,
    Path((id, grocery_item_id)): Path<(i64, i64)>,
    JsonPayload(body): JsonPayload,
) -> Result<Json<ListItem>, GroceryError> {
    info!(id, grocery_item_id, "PATCH /api/lists/{{id}}/{{grocery_item_id}}");
    let key = [("on_list", id), ("grocery_item_id", grocery_item_id)];
    Ok(Json(state.ops.patch(&key, &body).await?))
}
