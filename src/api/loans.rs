//! Book instance and loan endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        book_instance::{BookInstance, CreateBookInstance, LoanedInstance, UpdateBookInstance},
        renewal::{RenewBookForm, RenewalPage},
        user::Permission,
        PageQuery,
    },
    AppState,
};

use super::{AuthenticatedUser, JsonBody, LoanPage, PaginatedResponse};

/// Add a copy of a book
#[utoipa::path(
    post,
    path = "/books/{id}/instances",
    tag = "instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = CreateBookInstance,
    responses(
        (status = 201, description = "Instance created", body = BookInstance),
        (status = 400, description = "Invalid status or missing loan fields"),
        (status = 403, description = "Permission add_bookinstance required"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn create_instance(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
    body: AppResult<JsonBody<CreateBookInstance>>,
) -> AppResult<(StatusCode, Json<BookInstance>)> {
    claims.require(Permission::AddBookInstance)?;
    let JsonBody(request) = body?;

    let instance = state.services.loans.create_instance(book_id, request).await?;
    Ok((StatusCode::CREATED, Json(instance)))
}

/// Get a copy with its book title and borrower
#[utoipa::path(
    get,
    path = "/instances/{id}",
    tag = "instances",
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Book instance", body = LoanedInstance),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn get_instance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<LoanedInstance>> {
    let instance = state.services.loans.get_instance(id).await?;
    Ok(Json(instance))
}

/// Change status, borrower or due date of a copy
#[utoipa::path(
    put,
    path = "/instances/{id}",
    tag = "instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    request_body = UpdateBookInstance,
    responses(
        (status = 200, description = "Instance updated", body = BookInstance),
        (status = 403, description = "Permission change_bookinstance required"),
        (status = 404, description = "Book instance not found"),
        (status = 422, description = "Status transition not allowed")
    )
)]
pub async fn update_instance(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    body: AppResult<JsonBody<UpdateBookInstance>>,
) -> AppResult<Json<BookInstance>> {
    claims.require(Permission::ChangeBookInstance)?;
    let JsonBody(update) = body?;

    let instance = state.services.loans.update_instance(id, update).await?;
    Ok(Json(instance))
}

/// Mark a copy on loan as returned
#[utoipa::path(
    post,
    path = "/instances/{id}/return",
    tag = "instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Copy back on the shelf", body = BookInstance),
        (status = 403, description = "Librarian permission required"),
        (status = 404, description = "Book instance not found"),
        (status = 422, description = "Copy is not on loan")
    )
)]
pub async fn return_instance(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookInstance>> {
    claims.require_librarian()?;

    let instance = state.services.loans.mark_returned(id).await?;
    Ok(Json(instance))
}

/// Renewal form for a copy, proposing a date three weeks from today
#[utoipa::path(
    get,
    path = "/instances/{id}/renew",
    tag = "instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Copy and initial form", body = RenewalPage),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Librarian permission required"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renewal_form(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RenewalPage>> {
    claims.require_librarian()?;

    let page = state.services.loans.renewal_page(id).await?;
    Ok(Json(page))
}

/// Renew a copy: set a new due date within the next four weeks
#[utoipa::path(
    post,
    path = "/instances/{id}/renew",
    tag = "instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    request_body = RenewBookForm,
    responses(
        (status = 200, description = "Due date updated", body = LoanedInstance),
        (status = 400, description = "Renewal date out of range", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Librarian permission required"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renew_instance(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    body: AppResult<JsonBody<RenewBookForm>>,
) -> AppResult<Json<LoanedInstance>> {
    claims.require_librarian()?;

    let form = match body {
        Ok(JsonBody(form)) => form,
        Err(_) => {
            // Unknown copies are reported before the form error
            state.services.loans.get_instance(id).await?;
            return Err(RenewBookForm::not_a_date().into());
        }
    };

    let instance = state.services.loans.renew(id, form).await?;
    Ok(Json(instance))
}

/// Copies on loan to the current user
#[utoipa::path(
    get,
    path = "/borrowed/mine",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Copies borrowed by the current user", body = LoanPage),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_borrowed(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<LoanPage>> {
    let (loans, total) = state
        .services
        .loans
        .borrowed_by(claims.user_id, &query)
        .await?;
    Ok(Json(PaginatedResponse::new(
        loans,
        total,
        &query,
        state.services.loans.page_size(),
    )))
}

/// All copies on loan
#[utoipa::path(
    get,
    path = "/borrowed",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Every copy on loan", body = LoanPage),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Librarian permission required")
    )
)]
pub async fn all_borrowed(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<LoanPage>> {
    claims.require_librarian()?;

    let (loans, total) = state.services.loans.all_borrowed(&query).await?;
    Ok(Json(PaginatedResponse::new(
        loans,
        total,
        &query,
        state.services.loans.page_size(),
    )))
}
