//! User management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        user::{CreateUser, SetPermissions, UserWithPermissions},
        PageQuery,
    },
    AppState,
};

use super::{AuthenticatedUser, JsonBody, PaginatedResponse, UserPage};

/// List users with their current loan count
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "One page of users", body = UserPage),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Superuser required")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<UserPage>> {
    claims.require_superuser()?;

    let (users, total) = state.services.users.list_users(&query).await?;
    Ok(Json(PaginatedResponse::new(
        users,
        total,
        &query,
        state.services.catalog.page_size(),
    )))
}

/// Get user details by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User details", body = UserWithPermissions),
        (status = 403, description = "Superuser required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<UserWithPermissions>> {
    claims.require_superuser()?;

    let user = state.services.users.get_with_permissions(id).await?;
    Ok(Json(user))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = UserWithPermissions),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Superuser required"),
        (status = 409, description = "Username already exists")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    body: AppResult<JsonBody<CreateUser>>,
) -> AppResult<(StatusCode, Json<UserWithPermissions>)> {
    claims.require_superuser()?;
    let JsonBody(user) = body?;

    let created = state.services.users.create_user(user).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace the permissions of a user
#[utoipa::path(
    put,
    path = "/users/{id}/permissions",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body = SetPermissions,
    responses(
        (status = 200, description = "Permissions updated", body = UserWithPermissions),
        (status = 403, description = "Superuser required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn set_user_permissions(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    body: AppResult<JsonBody<SetPermissions>>,
) -> AppResult<Json<UserWithPermissions>> {
    claims.require_superuser()?;
    let JsonBody(request) = body?;

    let user = state
        .services
        .users
        .set_permissions(id, &request.permissions)
        .await?;
    Ok(Json(user))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Cannot delete your own account"),
        (status = 403, description = "Superuser required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_superuser()?;

    state.services.users.delete_user(id, claims.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
