//! In-memory stand-in for a Drone CI server.
//!
//! Serves the `/api` endpoints used by `drone-client` from seeded data,
//! optionally enforces a bearer token, and records every request so tests
//! can check the method, path, query and headers that reached the wire.

pub mod handlers;
pub mod models;
pub mod state;

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tokio::net::TcpListener;

use handlers::*;

pub use models::{Build, FeedEntry, LogLine, Message, RegistryView, Repo, SecretView, Token, User};
pub use state::{AppState, RecordedRequest};

/// Router over a fresh seeded state that accepts any token.
pub fn app() -> Router {
    router(AppState::default())
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/user", get(get_self))
        .route("/user/token", post(issue_token))
        .route("/user/repos", get(list_repos).post(synchronize))
        .route("/user/feed", get(build_feed))
        .route(
            "/repos/{owner}/{repo}",
            get(get_repo)
                .post(activate_repo)
                .patch(update_repo)
                .delete(delete_repo),
        )
        .route("/repos/{owner}/{repo}/sign", post(sign))
        .route("/repos/{owner}/{repo}/builds", get(list_builds))
        .route(
            "/repos/{owner}/{repo}/builds/{number}",
            get(get_build).delete(cancel_build),
        )
        .route(
            "/repos/{owner}/{repo}/builds/{number}/approve/{stage}",
            post(approve_build),
        )
        .route(
            "/repos/{owner}/{repo}/builds/{number}/decline/{stage}",
            post(decline_build),
        )
        .route(
            "/repos/{owner}/{repo}/builds/{number}/logs/{stage}/{step}",
            get(get_logs),
        )
        .route(
            "/repos/{owner}/{repo}/secrets",
            get(list_secrets).post(create_secret),
        )
        .route(
            "/repos/{owner}/{repo}/secrets/{name}",
            patch(update_secret).delete(delete_secret),
        )
        .route(
            "/repos/{owner}/{repo}/registry",
            get(list_registries).post(create_registry),
        )
        .route("/repos/{owner}/{repo}/registry/{address}", delete(delete_registry));

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(state.clone(), authorize))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, router(state)).await
}
