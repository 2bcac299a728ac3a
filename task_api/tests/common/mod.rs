#![allow(dead_code)]

use std::sync::Arc;

use chrono::Duration;
use reqwest::{Response, StatusCode};
use serde_json::{json, Value};
use task_api::{
    authentication::TokenKeys,
    routes,
    store::{self, SqliteStore},
    AppState,
};
use tokio::net::TcpListener;

pub const SECRET: &str = "test-secret";

pub fn keys() -> TokenKeys {
    TokenKeys::new(SECRET.as_bytes(), Duration::days(30))
}

/// Serves `state` on an ephemeral port and returns the base URL.
pub async fn serve(state: AppState) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, routes::create_router(state))
            .await
            .unwrap();
    });

    format!("http://{address}")
}

pub struct TestApp {
    pub base_url: String,
    pub store: Arc<SqliteStore>,
    pub http: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let store = Arc::new(SqliteStore::new(store::connect_in_memory().await.unwrap()));
        Self::spawn_with(store.clone(), |state| state).await
    }

    /// Spawns against a fresh database, letting the caller swap parts of the state.
    pub async fn spawn_with(
        store: Arc<SqliteStore>,
        customize: impl FnOnce(AppState) -> AppState,
    ) -> Self {
        let state = customize(AppState::new(store.clone(), store.clone(), keys()));

        Self {
            base_url: serve(state).await,
            store,
            http: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Response {
        self.http
            .post(self.url("/api/users/register"))
            .json(&json!({ "name": name, "email": email, "password": password }))
            .send()
            .await
            .unwrap()
    }

    pub async fn login(&self, email: &str, password: &str) -> Response {
        self.http
            .post(self.url("/api/users/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .unwrap()
    }

    /// Registers then logs in, returning `(token, user id)`.
    pub async fn sign_up(&self, name: &str, email: &str) -> (String, i64) {
        let response = self.register(name, email, "password123").await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body: Value = self.login(email, "password123").await.json().await.unwrap();
        (
            body["token"].as_str().unwrap().to_string(),
            body["_id"].as_i64().unwrap(),
        )
    }

    pub async fn create_task(&self, token: &str, body: Value) -> Response {
        self.http
            .post(self.url("/api/tasks"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    pub async fn list_tasks(&self, token: &str) -> Response {
        self.http
            .get(self.url("/api/tasks"))
            .bearer_auth(token)
            .send()
            .await
            .unwrap()
    }
}

pub fn task_body() -> Value {
    json!({ "title": "Test Task", "description": "A task for testing" })
}

pub async fn message(response: Response) -> String {
    let body: Value = response.json().await.unwrap();
    body["message"].as_str().unwrap_or_default().to_string()
}
