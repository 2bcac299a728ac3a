use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{authentication::require_auth, crud_ops, users, AppState};

pub const HEALTH_MESSAGE: &str = "Task Manager API is running!";

async fn health() -> &'static str {
    HEALTH_MESSAGE
}

pub fn create_router(state: AppState) -> Router {
    let auth = middleware::from_fn_with_state(state.clone(), require_auth);

    let user_routes = Router::new()
        .route("/profile", put(users::update_profile))
        .route_layer(auth.clone())
        .route("/", post(users::register))
        .route("/register", post(users::register))
        .route("/login", post(users::login));

    let task_routes = Router::new()
        .route("/", get(crud_ops::get_tasks).post(crud_ops::create_task))
        .route(
            "/{id}",
            put(crud_ops::update_task)
                .patch(crud_ops::patch_task)
                .delete(crud_ops::delete_task),
        )
        .route_layer(auth);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health))
        .nest("/api/users", user_routes)
        .nest("/api/tasks", task_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
