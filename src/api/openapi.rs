//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, books, catalog, health, loans, taxonomy, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog API",
        version = "0.3.0",
        description = "Local library catalog REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Catalog
        catalog::summary,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::author_form,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Genres and languages
        taxonomy::list_genres,
        taxonomy::create_genre,
        taxonomy::list_languages,
        taxonomy::create_language,
        // Instances and loans
        loans::create_instance,
        loans::get_instance,
        loans::update_instance,
        loans::return_instance,
        loans::renewal_form,
        loans::renew_instance,
        loans::my_borrowed,
        loans::all_borrowed,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::set_user_permissions,
        users::delete_user,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::MeResponse,
            // Catalog
            crate::services::catalog::CatalogSummary,
            // Books
            crate::models::book::Book,
            crate::models::book::BookShort,
            crate::models::book::BookDetails,
            crate::models::book::BookForm,
            crate::api::BookPage,
            // Authors
            crate::models::author::Author,
            crate::models::author::AuthorDetails,
            crate::models::author::AuthorForm,
            crate::models::author::AuthorFormInitial,
            crate::api::AuthorPage,
            // Genres and languages
            crate::models::taxonomy::Genre,
            crate::models::taxonomy::Language,
            crate::models::taxonomy::CreateNamed,
            // Instances and loans
            crate::models::book_instance::LoanStatus,
            crate::models::book_instance::BookInstance,
            crate::models::book_instance::LoanedInstance,
            crate::models::book_instance::CreateBookInstance,
            crate::models::book_instance::UpdateBookInstance,
            crate::models::renewal::RenewBookForm,
            crate::models::renewal::RenewalPage,
            crate::api::LoanPage,
            // Users
            crate::models::user::Permission,
            crate::models::user::User,
            crate::models::user::UserShort,
            crate::models::user::UserWithPermissions,
            crate::models::user::CreateUser,
            crate::models::user::SetPermissions,
            crate::api::UserPage,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "catalog", description = "Home page counts"),
        (name = "books", description = "Book management"),
        (name = "authors", description = "Author management"),
        (name = "genres", description = "Genres"),
        (name = "languages", description = "Languages"),
        (name = "instances", description = "Book copies, returns and renewals"),
        (name = "loans", description = "Borrowed copies"),
        (name = "users", description = "User and permission management")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
