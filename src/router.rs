use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::middleware::authorize::authorize;
use crate::state::AppState;
use axum::{
    Json, Router,
    extract::Path,
    middleware,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

/// Demo API protected by the authorization gate.
pub fn init_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/users", post(create_user))
        .route(
            "/users/{id}",
            get(show_user).put(update_user).delete(delete_user),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), authorize))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}

async fn index() -> Json<Value> {
    Json(json!({ "message": "ok" }))
}

async fn create_user() -> Json<Value> {
    Json(json!({ "message": "user created" }))
}

async fn show_user(Path(id): Path<String>) -> Json<Value> {
    Json(json!({ "id": id }))
}

async fn update_user(Path(id): Path<String>) -> Json<Value> {
    Json(json!({ "id": id, "message": "user updated" }))
}

async fn delete_user(Path(id): Path<String>) -> Json<Value> {
    Json(json!({ "id": id, "message": "user deleted" }))
}
