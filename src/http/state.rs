//! Shared state handed to the router.

use std::sync::Arc;

use crate::config::{Config, ConfigError};
use crate::model::{Entity, Post, User};
use crate::store::{IdGenerator, Store};
use tracing::info;

use super::admin::AdminPortal;

/// The two entity stores plus the admin portal, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<Store<User>>,
    pub posts: Arc<Store<Post>>,
    pub admin: AdminPortal,
}

impl AppState {
    #[cfg(test)]
    pub fn new(admin_password: impl Into<String>) -> Self {
        Self {
            users: Arc::new(Store::new()),
            posts: Arc::new(Store::new()),
            admin: AdminPortal::new(admin_password),
        }
    }

    /// Build state from a configuration, failing if the admin password is
    /// missing. Each store gets its own generator.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let admin = AdminPortal::new(config.admin_password()?);
        let ids = |collection: &str| {
            let ids = Arc::new(IdGenerator::new(config.ids.strategy, config.ids.start));
            info!(collection, strategy = ?ids.strategy(), start = config.ids.start, "id generator ready");
            ids
        };

        Ok(Self {
            users: Arc::new(Store::with_generator(ids(User::COLLECTION))),
            posts: Arc::new(Store::with_generator(ids(Post::COLLECTION))),
            admin,
        })
    }
}
