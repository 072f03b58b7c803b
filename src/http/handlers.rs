use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::error::ApiError;
use crate::model::Entity;
use crate::store::Store;

/// Canonical location of one entity
pub fn location<T: Entity>(id: &str) -> String {
    format!("/{}/{}", T::COLLECTION, id)
}

pub async fn handle_list<T: Entity>(State(store): State<Arc<Store<T>>>) -> Json<Vec<T::View>> {
    let views: Vec<T::View> = store.list_all().iter().map(Entity::view).collect();
    debug!(collection = T::COLLECTION, count = views.len(), "list");
    Json(views)
}

pub async fn handle_get<T: Entity>(
    State(store): State<Arc<Store<T>>>,
    Path(id): Path<String>,
) -> Result<Json<T::View>, ApiError> {
    match store.get(&id) {
        Some(entity) => Ok(Json(entity.view())),
        None => {
            debug!(collection = T::COLLECTION, %id, "not found");
            Err(ApiError::NotFound {
                collection: T::COLLECTION,
                id,
            })
        }
    }
}

/// Redirect to a randomly chosen entity
pub async fn handle_random<T: Entity>(
    State(store): State<Arc<Store<T>>>,
) -> Result<Response, ApiError> {
    let id = store.random_id().ok_or(ApiError::EmptyCollection {
        collection: T::COLLECTION,
    })?;

    Ok((StatusCode::FOUND, [(header::LOCATION, location::<T>(&id))]).into_response())
}

pub async fn handle_create<T>(
    State(store): State<Arc<Store<T>>>,
    headers: HeaderMap,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<Response, ApiError>
where
    T: Entity + DeserializeOwned,
{
    // Decoding happens here, before the store lock is taken.
    let Json(entity) = payload.map_err(|rejection| {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        ApiError::from_json_rejection(rejection, content_type)
    })?;

    let (id, view) = store.insert_with(entity, Entity::view);
    info!(collection = T::COLLECTION, %id, "created");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location::<T>(&id))],
        Json(view),
    )
        .into_response())
}
