use super::handlers::{
    clear_messages, healthcheck, list_messages, receive_default_webhook, receive_webhook,
    run_actions, save_message,
};
use super::state::AppState;
use axum::{
    Router,
    http::Method,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/webhook", post(receive_default_webhook))
        .route("/webhook/:path", post(receive_webhook))
        .route(
            "/scopes/:scope/messages",
            get(list_messages).post(save_message).delete(clear_messages),
        )
        .route("/scopes/:scope/actions", post(run_actions))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
