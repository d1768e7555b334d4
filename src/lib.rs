use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub mod codegen;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;

use codegen::CodeGenerator;
use config::AppConfig;

// ── Shared application state ───────────────────────────────────────────────

pub struct AppState {
    pub db: sqlx::SqlitePool,
    pub config: AppConfig,
    pub generator: CodeGenerator,
}

impl AppState {
    /// State with an OS-seeded code generator sized from `config`.
    pub fn new(db: sqlx::SqlitePool, config: AppConfig) -> Self {
        let generator = CodeGenerator::from_entropy(config.code_length, config.max_attempts);
        Self::with_generator(db, config, generator)
    }

    /// State with a caller-supplied code generator, e.g. a seeded one in tests.
    pub fn with_generator(
        db: sqlx::SqlitePool,
        config: AppConfig,
        generator: CodeGenerator,
    ) -> Self {
        Self {
            db,
            config,
            generator,
        }
    }
}

// ── Router ─────────────────────────────────────────────────────────────────

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::links::index).post(handlers::not_found))
        .route(
            "/index.html",
            get(handlers::links::index).post(handlers::not_found),
        )
        .route(
            "/shorten",
            get(handlers::redirect::redirect).post(handlers::links::shorten),
        )
        // Short-link redirect; static routes above take priority
        .route(
            "/:code",
            get(handlers::redirect::redirect).post(handlers::not_found),
        )
        .fallback(handlers::fallback)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
