//! Catalog management service: books, authors, genres and languages

use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorDetails, AuthorForm},
        book::{Book, BookDetails, BookForm, BookShort},
        book_instance::LoanStatus,
        taxonomy::{display_genres, CreateNamed, Genre, Language},
        PageQuery,
    },
    repository::Repository,
    services::redis::RedisService,
};

/// Home page figures
#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogSummary {
    pub num_books: i64,
    pub num_instances: i64,
    pub num_instances_available: i64,
    pub num_authors: i64,
    pub num_genres: i64,
    /// Books whose title contains the requested fragment, when one was given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_books_matching: Option<i64>,
    /// Visits by this visitor before the current one
    pub num_visits: i64,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    redis: RedisService,
    page_size: i64,
}

impl CatalogService {
    pub fn new(repository: Repository, redis: RedisService, page_size: i64) -> Self {
        Self {
            repository,
            redis,
            page_size,
        }
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Counts shown on the home page, recording the visit
    pub async fn summary(
        &self,
        visitor_id: &str,
        title_contains: Option<&str>,
    ) -> AppResult<CatalogSummary> {
        let num_books_matching = match title_contains.map(str::trim).filter(|s| !s.is_empty()) {
            Some(fragment) => Some(self.repository.books.count_title_contains(fragment).await?),
            None => None,
        };

        let num_visits = match self.redis.record_visit(visitor_id).await {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!("Visit counter unavailable: {}", e);
                0
            }
        };

        Ok(CatalogSummary {
            num_books: self.repository.books.count().await?,
            num_instances: self.repository.instances.count().await?,
            num_instances_available: self
                .repository
                .instances
                .count_by_status(LoanStatus::Available)
                .await?,
            num_authors: self.repository.authors.count().await?,
            num_genres: self.repository.taxonomy.count_genres().await?,
            num_books_matching,
            num_visits,
        })
    }

    // =========================================================================
    // BOOKS
    // =========================================================================

    pub async fn list_books(&self, page: &PageQuery) -> AppResult<(Vec<BookShort>, i64)> {
        let (_, per_page, offset) = page.resolve(self.page_size);
        self.repository.books.list(offset, per_page).await
    }

    /// Book with author, language, genres and copies
    pub async fn get_book(&self, id: i32) -> AppResult<BookDetails> {
        let book = self.repository.books.get_by_id(id).await?;
        self.book_details(book).await
    }

    pub async fn create_book(&self, form: BookForm) -> AppResult<BookDetails> {
        form.validate()?;
        let form = form.normalized();

        if self.repository.books.isbn_exists(&form.isbn, None).await? {
            return Err(AppError::Conflict(format!(
                "Book with ISBN {} already exists",
                form.isbn
            )));
        }
        self.check_book_references(&form).await?;

        let book = self.repository.books.create(&form).await?;
        tracing::info!("Created book id={} isbn={}", book.id, book.isbn);
        self.book_details(book).await
    }

    pub async fn update_book(&self, id: i32, form: BookForm) -> AppResult<BookDetails> {
        form.validate()?;
        let form = form.normalized();

        self.repository.books.get_by_id(id).await?;

        if self.repository.books.isbn_exists(&form.isbn, Some(id)).await? {
            return Err(AppError::Conflict(format!(
                "Book with ISBN {} already exists",
                form.isbn
            )));
        }
        self.check_book_references(&form).await?;

        let book = self.repository.books.update(id, &form).await?;
        tracing::info!("Updated book id={}", id);
        self.book_details(book).await
    }

    /// Delete a book that has no copies left
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.get_by_id(id).await?;

        let copies = self.repository.instances.count_for_book(id).await?;
        if copies > 0 {
            return Err(AppError::Protected(format!(
                "Book {} still has {} instance(s)",
                id, copies
            )));
        }

        self.repository.books.delete(id).await?;
        tracing::info!("Deleted book id={}", id);
        Ok(())
    }

    async fn book_details(&self, book: Book) -> AppResult<BookDetails> {
        let author = match book.author_id {
            Some(author_id) => Some(self.repository.authors.get_by_id(author_id).await?),
            None => None,
        };
        let language = match book.language_id {
            Some(language_id) => Some(self.repository.taxonomy.get_language(language_id).await?),
            None => None,
        };
        let genres = self.repository.books.genres_of(book.id).await?;
        let instances = self.repository.instances.list_for_book(book.id).await?;

        Ok(BookDetails {
            genre_display: display_genres(&genres),
            book,
            author,
            language,
            genres,
            instances,
        })
    }

    /// Referenced author, language and genres must exist
    async fn check_book_references(&self, form: &BookForm) -> AppResult<()> {
        if let Some(author_id) = form.author_id {
            if !self.repository.authors.exists(author_id).await? {
                return Err(AppError::BadRequest(format!("Unknown author id {}", author_id)));
            }
        }

        if let Some(language_id) = form.language_id {
            if !self.repository.taxonomy.language_exists(language_id).await? {
                return Err(AppError::BadRequest(format!(
                    "Unknown language id {}",
                    language_id
                )));
            }
        }

        if !form.genre_ids.is_empty() {
            let found = self
                .repository
                .taxonomy
                .existing_genre_ids(&form.genre_ids)
                .await?;
            let missing = missing_ids(&form.genre_ids, &found);
            if !missing.is_empty() {
                return Err(AppError::BadRequest(format!("Unknown genre ids {:?}", missing)));
            }
        }

        Ok(())
    }

    // =========================================================================
    // AUTHORS
    // =========================================================================

    pub async fn list_authors(&self, page: &PageQuery) -> AppResult<(Vec<Author>, i64)> {
        let (_, per_page, offset) = page.resolve(self.page_size);
        self.repository.authors.list(offset, per_page).await
    }

    pub async fn get_author(&self, id: i32) -> AppResult<AuthorDetails> {
        let author = self.repository.authors.get_by_id(id).await?;
        let books = self.repository.books.list_by_author(id).await?;
        Ok(AuthorDetails {
            name: author.display_name(),
            author,
            books,
        })
    }

    pub async fn create_author(&self, form: AuthorForm) -> AppResult<Author> {
        form.validate()?;
        let author = self.repository.authors.create(&form).await?;
        tracing::info!("Created author id={} ({})", author.id, author.display_name());
        Ok(author)
    }

    pub async fn update_author(&self, id: i32, form: AuthorForm) -> AppResult<Author> {
        form.validate()?;
        let author = self.repository.authors.update(id, &form).await?;
        tracing::info!("Updated author id={}", id);
        Ok(author)
    }

    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await?;
        tracing::info!("Deleted author id={}", id);
        Ok(())
    }

    // =========================================================================
    // GENRES & LANGUAGES
    // =========================================================================

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.taxonomy.list_genres().await
    }

    pub async fn create_genre(&self, request: CreateNamed) -> AppResult<Genre> {
        request.validate()?;
        let name = request.normalized();
        if self.repository.taxonomy.genre_name_exists(name).await? {
            return Err(AppError::Conflict(format!("Genre '{}' already exists", name)));
        }
        let genre = self.repository.taxonomy.create_genre(name).await?;
        tracing::info!("Created genre id={} ({})", genre.id, genre.name);
        Ok(genre)
    }

    pub async fn list_languages(&self) -> AppResult<Vec<Language>> {
        self.repository.taxonomy.list_languages().await
    }

    pub async fn create_language(&self, request: CreateNamed) -> AppResult<Language> {
        request.validate()?;
        let name = request.normalized();
        if self.repository.taxonomy.language_name_exists(name).await? {
            return Err(AppError::Conflict(format!("Language '{}' already exists", name)));
        }
        let language = self.repository.taxonomy.create_language(name).await?;
        tracing::info!("Created language id={} ({})", language.id, language.name);
        Ok(language)
    }
}

/// Requested ids absent from `found`, in request order
fn missing_ids(requested: &[i32], found: &[i32]) -> Vec<i32> {
    requested
        .iter()
        .copied()
        .filter(|id| !found.contains(id))
        .collect()
}
