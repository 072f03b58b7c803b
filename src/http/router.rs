//! Route table for the HTTP API.
//!
//! Each collection gets the same four routes, bound to its own store:
//! `GET|POST /<c>`, `GET /<c>/random` and `GET /<c>/:id`. Unlisted methods
//! answer 405.

use std::sync::Arc;

use axum::{Router, routing::get};
use serde::de::DeserializeOwned;

use super::admin::handle_admin;
use super::handlers::{handle_create, handle_get, handle_list, handle_random};
use super::state::AppState;
use crate::model::Entity;
use crate::store::Store;

fn collection_routes<T>(store: Arc<Store<T>>) -> Router
where
    T: Entity + DeserializeOwned,
{
    let base = format!("/{}", T::COLLECTION);
    Router::new()
        .route(&base, get(handle_list::<T>).post(handle_create::<T>))
        .route(&format!("{}/random", base), get(handle_random::<T>))
        .route(&format!("{}/:id", base), get(handle_get::<T>))
        .with_state(store)
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(collection_routes(state.users))
        .merge(collection_routes(state.posts))
        .route("/admin", get(handle_admin).with_state(state.admin))
}
