//! Client-side half of the task manager.
//!
//! These are the services a single-page front end binds its views to: the
//! signed-in user and the task list are held in `tokio::sync::watch`
//! channels so a view can subscribe and re-render whenever a network
//! response lands. The bearer token is kept in a [`TokenStore`] and attached
//! to every request made through [`ApiClient`].

mod api;
mod auth;
mod navigation;
mod tasks;

pub use api::{ApiClient, FileTokenStore, MemoryTokenStore, TokenStore};
pub use auth::{validate_display_name, AuthService, Profile};
pub use navigation::{resolve, Route};
pub use tasks::TaskService;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The API answered with an error status and a `{"message"}` body.
    #[error("{message} ({status})")]
    Api {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("token storage failed: {0}")]
    Storage(#[from] std::io::Error),

    /// Rejected before any request was sent.
    #[error("{0}")]
    Invalid(&'static str),
}

impl ClientError {
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(error) => error.status(),
            _ => None,
        }
    }
}
