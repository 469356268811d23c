use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use models::profile::{self, ProfileInput};
use serde_json::Value as JsonValue;
use service::params::parse_list_params;
use tracing::info;

use crate::{errors::JsonApiError, state::ServerState};

#[utoipa::path(
    post, path = "/profiles", tag = "profiles",
    request_body = crate::openapi::ProfileInputDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::ProfileDoc),
        (status = 409, description = "Owner does not exist")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    Json(input): Json<ProfileInput>,
) -> Result<(StatusCode, Json<profile::Model>), JsonApiError> {
    let created = state.profiles.create_profile(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/profiles", tag = "profiles",
    params(crate::openapi::ListParamsDoc),
    responses(
        (status = 200, description = "Matching records"),
        (status = 400, description = "Unknown field or relation")
    )
)]
pub async fn list(
    State(state): State<ServerState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<JsonValue>>, JsonApiError> {
    let options = parse_list_params::<profile::Entity>(&params)?;
    let records = state.profiles.find_many_profiles(options).await?;
    info!(count = records.len(), "list profiles");
    Ok(Json(records))
}

#[utoipa::path(
    get, path = "/profiles/{id}", tag = "profiles",
    params(("id" = i32, Path, description = "Profile id")),
    responses(
        (status = 200, description = "Found", body = crate::openapi::ProfileDoc),
        (status = 404, description = "No such profile")
    )
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<profile::Model>, JsonApiError> {
    state.profiles.find_profile(id).await?.map(Json).ok_or_else(|| JsonApiError::not_found("profile", id))
}

#[utoipa::path(
    patch, path = "/profiles/{id}", tag = "profiles",
    params(("id" = i32, Path, description = "Profile id")),
    request_body = crate::openapi::ProfileInputDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::ProfileDoc),
        (status = 404, description = "No such profile")
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(input): Json<ProfileInput>,
) -> Result<Json<profile::Model>, JsonApiError> {
    state.profiles.update_profile(id, input).await?.map(Json).ok_or_else(|| JsonApiError::not_found("profile", id))
}

#[utoipa::path(
    delete, path = "/profiles/{id}", tag = "profiles",
    params(("id" = i32, Path, description = "Profile id")),
    responses((status = 204, description = "Deleted or already absent"))
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    state.profiles.delete_profile(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
