//! Task manager: a REST API for per-user task lists behind bearer-token
//! authentication, plus the client-side services a front end binds to.

use std::sync::Arc;

use sqlx::SqlitePool;

pub mod authentication;
pub mod client;
pub mod config;
pub mod crud_ops;
pub mod entities;
pub mod error;
pub mod routes;
pub mod store;
pub mod users;

use authentication::TokenKeys;
use store::{SqliteStore, TaskStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub tokens: Arc<TokenKeys>,
}

impl AppState {
    pub fn new(users: Arc<dyn UserStore>, tasks: Arc<dyn TaskStore>, tokens: TokenKeys) -> Self {
        Self {
            users,
            tasks,
            tokens: Arc::new(tokens),
        }
    }

    /// Both stores backed by the same sqlite pool.
    pub fn sqlite(pool: SqlitePool, tokens: TokenKeys) -> Self {
        let store = Arc::new(SqliteStore::new(pool));
        Self::new(store.clone(), store, tokens)
    }
}
