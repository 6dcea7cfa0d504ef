use axum::{Router, extract::DefaultBodyLimit, routing::get};

use crate::handlers::{items, lists};
use crate::service::EntityOps;

#[derive(Clone)]
pub struct GroceryState {
    pub ops: EntityOps,
    pub body_limit: usize,
}

impl GroceryState {
    pub fn new(ops: EntityOps, body_limit: usize) -> Self {
        Self { ops, body_limit }
    }
}

pub fn grocery_router(state: GroceryState) -> Router {
    let body_limit = state.body_limit;
    Router::new()
        .route("/api/lists", get(lists::get_lists).post(lists::post_list))
        .route(
            "/api/lists/{id}",
            get(lists::get_list)
                .patch(lists::patch_list)
                .delete(lists::delete_list),
        )
        .route("/api/lists/{id}/items", get(lists::get_list_items))
        .route(
            "/api/lists/{id}/{grocery_item_id}",
            get(lists::get_list_item).patch(lists::patch_list_item),
        )
        .route("/api/items", get(items::get_items).post(items::post_item))
        .route(
            "/api/items/{id}",
            get(items::get_item)
                .patch(items::patch_item)
                .delete(items::delete_item),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
