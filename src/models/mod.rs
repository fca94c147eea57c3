//! Data models for the catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod renewal;
pub mod taxonomy;
pub mod user;

use serde::Deserialize;
use utoipa::IntoParams;

pub use author::Author;
pub use book::Book;
pub use book_instance::{BookInstance, LoanStatus};
pub use taxonomy::{Genre, Language};
pub use user::{Permission, User};

/// Page selection for list endpoints
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page number, starting at 1
    pub page: Option<i64>,
    /// Entries per page (defaults to the configured page size)
    pub per_page: Option<i64>,
}

impl PageQuery {
    /// Resolve `(page, per_page, offset)` with sane bounds
    pub fn resolve(&self, default_per_page: i64) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(default_per_page).clamp(1, 100);
        (page, per_page, (page - 1) * per_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults() {
        assert_eq!(PageQuery::default().resolve(10), (1, 10, 0));
    }

    #[test]
    fn test_page_offset_and_bounds() {
        let q = PageQuery {
            page: Some(3),
            per_page: None,
        };
        assert_eq!(q.resolve(10), (3, 10, 20));

        let q = PageQuery {
            page: Some(0),
            per_page: Some(1000),
        };
        assert_eq!(q.resolve(10), (1, 100, 0));
    }
}
