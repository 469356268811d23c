use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use models::user::{self, UserInput};
use serde_json::Value as JsonValue;
use service::params::parse_list_params;
use tracing::info;

use crate::{errors::JsonApiError, state::ServerState};

#[utoipa::path(
    post, path = "/users", tag = "users",
    request_body = crate::openapi::UserInputDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::UserDoc),
        (status = 409, description = "Email already taken"),
        (status = 500, description = "Create Failed")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    Json(input): Json<UserInput>,
) -> Result<(StatusCode, Json<user::Model>), JsonApiError> {
    let created = state.users.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/users", tag = "users",
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
    let options = parse_list_params::<user::Entity>(&params)?;
    let records = state.users.find_many_users(options).await?;
    info!(count = records.len(), "list users");
    Ok(Json(records))
}

#[utoipa::path(
    get, path = "/users/{id}", tag = "users",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "Found", body = crate::openapi::UserDoc),
        (status = 404, description = "No such user")
    )
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<user::Model>, JsonApiError> {
    state.users.find_user(id).await?.map(Json).ok_or_else(|| JsonApiError::not_found("user", id))
}

#[utoipa::path(
    patch, path = "/users/{id}", tag = "users",
    params(("id" = i32, Path, description = "User id")),
    request_body = crate::openapi::UserInputDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::UserDoc),
        (status = 404, description = "No such user"),
        (status = 409, description = "Email already taken")
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(input): Json<UserInput>,
) -> Result<Json<user::Model>, JsonApiError> {
    state.users.update_user(id, input).await?.map(Json).ok_or_else(|| JsonApiError::not_found("user", id))
}

#[utoipa::path(
    delete, path = "/users/{id}", tag = "users",
    params(("id" = i32, Path, description = "User id")),
    responses((status = 204, description = "Deleted or already absent"))
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    state.users.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
