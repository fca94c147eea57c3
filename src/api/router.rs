//! Application router

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{api, AppState};

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/login", post(api::auth::login))
        .route("/auth/me", get(api::auth::me))
        // Home page
        .route("/catalog/summary", get(api::catalog::summary))
        // Books
        .route(
            "/books",
            get(api::books::list_books).post(api::books::create_book),
        )
        .route(
            "/books/:id",
            get(api::books::get_book)
                .put(api::books::update_book)
                .delete(api::books::delete_book),
        )
        .route("/books/:id/instances", post(api::loans::create_instance))
        // Authors
        .route(
            "/authors",
            get(api::authors::list_authors).post(api::authors::create_author),
        )
        .route("/authors/new", get(api::authors::author_form))
        .route(
            "/authors/:id",
            get(api::authors::get_author)
                .put(api::authors::update_author)
                .delete(api::authors::delete_author),
        )
        // Genres and languages
        .route(
            "/genres",
            get(api::taxonomy::list_genres).post(api::taxonomy::create_genre),
        )
        .route(
            "/languages",
            get(api::taxonomy::list_languages).post(api::taxonomy::create_language),
        )
        // Book instances
        .route(
            "/instances/:id",
            get(api::loans::get_instance).put(api::loans::update_instance),
        )
        .route("/instances/:id/return", post(api::loans::return_instance))
        .route(
            "/instances/:id/renew",
            get(api::loans::renewal_form).post(api::loans::renew_instance),
        )
        // Loans
        .route("/borrowed", get(api::loans::all_borrowed))
        .route("/borrowed/mine", get(api::loans::my_borrowed))
        // Users
        .route(
            "/users",
            get(api::users::list_users).post(api::users::create_user),
        )
        .route(
            "/users/:id",
            get(api::users::get_user).delete(api::users::delete_user),
        )
        .route("/users/:id/permissions", put(api::users::set_user_permissions))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
