use axum::{
    routing::{get, post},
    Router,
};
use std::time::Duration;

use crate::{
    handlers::{
        health_check,
        questions::{create_question, get_question},
        root,
    },
    middleware::apply_middleware,
    store::SharedStore,
};

/// Build the router with every endpoint and the middleware stack
pub fn create_router(store: SharedStore, request_timeout: Duration) -> Router {
    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        // Both spellings reach the same handler
        .route("/questions/", post(create_question))
        .route("/questions", post(create_question))
        .route("/getQuestion/:question_id", get(get_question))
        .with_state(store);

    apply_middleware(router, request_timeout)
}
