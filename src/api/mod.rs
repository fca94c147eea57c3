//! API handlers for the catalog REST endpoints

pub mod auth;
pub mod authors;
pub mod books;
pub mod catalog;
pub mod health;
pub mod loans;
pub mod openapi;
pub mod router;
pub mod taxonomy;
pub mod users;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppError,
    models::{
        author::Author, book::BookShort, book_instance::LoanedInstance, user::UserClaims,
        user::UserShort,
    },
    AppState,
};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Login required".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// JSON request body whose rejection is an [`AppError`] with a JSON error body.
///
/// Handlers that check permissions take `AppResult<JsonBody<T>>` and unwrap it
/// after the check, so a bad body never hides a 403 or 404.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        }
    }
}

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
#[aliases(
    BookPage = PaginatedResponse<BookShort>,
    AuthorPage = PaginatedResponse<Author>,
    LoanPage = PaginatedResponse<LoanedInstance>,
    UserPage = PaginatedResponse<UserShort>
)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// Entries on this page
    pub items: Vec<T>,
    /// Total number of entries
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Entries per page
    pub per_page: i64,
    /// Whether a page follows this one
    pub has_next: bool,
}

impl<T> PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub fn new(items: Vec<T>, total: i64, query: &crate::models::PageQuery, default_per_page: i64) -> Self {
        let (page, per_page, _) = query.resolve(default_per_page);
        Self {
            items,
            total,
            page,
            per_page,
            has_next: page * per_page < total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PageQuery;

    #[test]
    fn test_paginated_response_has_next() {
        let query = PageQuery {
            page: Some(2),
            per_page: None,
        };
        let page: PaginatedResponse<Author> = PaginatedResponse::new(Vec::new(), 25, &query, 10);
        assert_eq!(page.page, 2);
        assert_eq!(page.per_page, 10);
        assert!(page.has_next);

        let last = PageQuery {
            page: Some(3),
            per_page: None,
        };
        let page: PaginatedResponse<Author> = PaginatedResponse::new(Vec::new(), 25, &last, 10);
        assert!(!page.has_next);
    }
}
