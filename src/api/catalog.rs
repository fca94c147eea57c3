//! Home page summary endpoint

use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{error::AppResult, services::catalog::CatalogSummary, AppState};

pub const VISITOR_COOKIE: &str = "visitor";

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SummaryQuery {
    /// Also count books whose title contains this text (case-insensitive)
    pub title_contains: Option<String>,
}

/// Catalog counts and the caller's visit count
#[utoipa::path(
    get,
    path = "/catalog/summary",
    tag = "catalog",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Catalog summary", body = CatalogSummary)
    )
)]
pub async fn summary(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<SummaryQuery>,
) -> AppResult<(CookieJar, Json<CatalogSummary>)> {
    let (visitor_id, jar) = visitor(jar);

    let summary = state
        .services
        .catalog
        .summary(&visitor_id, query.title_contains.as_deref())
        .await?;

    Ok((jar, Json(summary)))
}

/// Visitor id from the cookie, issuing a new one when absent or malformed
fn visitor(jar: CookieJar) -> (String, CookieJar) {
    if let Some(id) = jar
        .get(VISITOR_COOKIE)
        .and_then(|c| Uuid::parse_str(c.value()).ok())
    {
        return (id.to_string(), jar);
    }

    let id = Uuid::new_v4().to_string();
    let cookie = Cookie::build((VISITOR_COOKIE, id.clone()))
        .path("/")
        .http_only(true);
    (id, jar.add(cookie))
}
