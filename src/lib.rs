pub mod auth;
pub mod config;
pub mod err;
pub mod models;
pub mod password;
pub mod status;
pub mod store;
pub mod token;
pub mod valid;
pub mod works;

use std::sync::Arc;

use axum::handler::Handler;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;

pub use crate::err::Error;
use crate::store::Store;
use crate::token::TokenService;

pub type Payload<T> = Result<Json<T>, Error>;

pub fn proceeds<V>(value: V) -> Payload<V>
where
    V: Serialize,
{
    Ok(Json(value))
}

/// Shared handles every handler reaches through an `Extension`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/", get(status::root))
        .route(
            "/api/status",
            get(status::list_status_checks).post(status::create_status_check),
        )
        .route("/api/register", post(auth::register_student))
        .route("/api/token", post(auth::login_student))
        .route("/api/works", get(works::list_works).post(works::create_work))
        .route(
            "/api/works/:id",
            get(works::get_work)
                .put(works::update_work)
                .delete(works::delete_work),
        )
        .fallback(err::handler404.into_service())
        .layer(Extension(state))
        .layer(CorsLayer::very_permissive())
}
