use askama::Template;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

// ── Store / generator errors ───────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StoreError {
    /// The primary key already holds this code. The generator checks for
    /// collisions first, so this only happens on a check-then-insert race.
    #[error("short code '{0}' already exists")]
    DuplicateKey(String),

    #[error("storage unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("no free short code found after {attempts} attempt(s)")]
    Exhausted { attempts: u32 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

// ── HTTP-facing errors ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid request")]
    InvalidRequest,

    #[error("short link not found")]
    NotFound,

    /// A stored URL that cannot be written into a `Location` header.
    #[error("stored URL for '{0}' is not a valid Location header")]
    BadLocation(String),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Template)]
#[template(path = "not_found.html")]
struct NotFoundTemplate {}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    title: &'static str,
    message: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::InvalidRequest => (
                StatusCode::BAD_REQUEST,
                ErrorTemplate {
                    title: "Bad Request",
                    message: "Invalid request",
                },
            )
                .into_response(),
            AppError::NotFound => (StatusCode::NOT_FOUND, NotFoundTemplate {}).into_response(),
            AppError::BadLocation(code) => {
                tracing::error!("Cannot redirect '{}': stored URL is not a valid header value", code);
                internal_error()
            }
            AppError::Generate(e) => {
                tracing::error!("Short code generation failed: {:?}", e);
                internal_error()
            }
            AppError::Store(e) => {
                tracing::error!("Store error: {:?}", e);
                internal_error()
            }
        }
    }
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorTemplate {
            title: "Internal Server Error",
            message: "Something went wrong. Please try again.",
        },
    )
        .into_response()
}
