//! Business logic services

pub mod catalog;
pub mod clock;
pub mod loans;
pub mod redis;
pub mod users;

use std::sync::Arc;

use crate::{
    config::{AuthConfig, CatalogConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub users: users::UsersService,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        catalog_config: &CatalogConfig,
        redis_service: redis::RedisService,
        clock: Arc<dyn clock::Clock>,
    ) -> Self {
        let page_size = catalog_config.page_size;
        Self {
            catalog: catalog::CatalogService::new(repository.clone(), redis_service, page_size),
            loans: loans::LoansService::new(repository.clone(), clock, page_size),
            users: users::UsersService::new(repository.clone(), auth_config, page_size),
            repository,
        }
    }
}
