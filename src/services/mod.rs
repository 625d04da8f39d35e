//! Business logic services

pub mod catalog;
pub mod covers;
pub mod lending;
pub mod users;

use crate::{
    config::{AuthConfig, UploadsConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub catalog: catalog::CatalogService,
    pub lending: lending::LendingService,
    pub covers: covers::CoverStore,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, uploads_config: UploadsConfig) -> Self {
        Self {
            users: users::UsersService::new(repository.clone(), auth_config),
            catalog: catalog::CatalogService::new(repository.clone()),
            lending: lending::LendingService::new(repository),
            covers: covers::CoverStore::new(uploads_config.dir),
        }
    }
}
