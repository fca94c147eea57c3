//! Genre and language endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::{
        taxonomy::{CreateNamed, Genre, Language},
        user::Permission,
    },
    AppState,
};

use super::{AuthenticatedUser, JsonBody};

/// List all genres
#[utoipa::path(
    get,
    path = "/genres",
    tag = "genres",
    responses(
        (status = 200, description = "All genres", body = Vec<Genre>)
    )
)]
pub async fn list_genres(State(state): State<AppState>) -> AppResult<Json<Vec<Genre>>> {
    Ok(Json(state.services.catalog.list_genres().await?))
}

/// Create a genre
#[utoipa::path(
    post,
    path = "/genres",
    tag = "genres",
    security(("bearer_auth" = [])),
    request_body = CreateNamed,
    responses(
        (status = 201, description = "Genre created", body = Genre),
        (status = 403, description = "Permission add_genre required"),
        (status = 409, description = "Genre already exists")
    )
)]
pub async fn create_genre(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    body: AppResult<JsonBody<CreateNamed>>,
) -> AppResult<(StatusCode, Json<Genre>)> {
    claims.require(Permission::AddGenre)?;
    let JsonBody(request) = body?;

    let genre = state.services.catalog.create_genre(request).await?;
    Ok((StatusCode::CREATED, Json(genre)))
}

/// List all languages
#[utoipa::path(
    get,
    path = "/languages",
    tag = "languages",
    responses(
        (status = 200, description = "All languages", body = Vec<Language>)
    )
)]
pub async fn list_languages(State(state): State<AppState>) -> AppResult<Json<Vec<Language>>> {
    Ok(Json(state.services.catalog.list_languages().await?))
}

/// Create a language
#[utoipa::path(
    post,
    path = "/languages",
    tag = "languages",
    security(("bearer_auth" = [])),
    request_body = CreateNamed,
    responses(
        (status = 201, description = "Language created", body = Language),
        (status = 403, description = "Permission add_language required"),
        (status = 409, description = "Language already exists")
    )
)]
pub async fn create_language(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    body: AppResult<JsonBody<CreateNamed>>,
) -> AppResult<(StatusCode, Json<Language>)> {
    claims.require(Permission::AddLanguage)?;
    let JsonBody(request) = body?;

    let language = state.services.catalog.create_language(request).await?;
    Ok((StatusCode::CREATED, Json(language)))
}
