pub mod links;
pub mod redirect;

use crate::{error::AppError, AppState};
use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// POST to anything other than /shorten.
pub async fn not_found() -> AppError {
    AppError::NotFound
}

/// Paths no route matched, e.g. `/a/b`. GET treats the whole path as a code
/// (so it 404s unless such a code was stored); POST is a 404 as elsewhere.
pub async fn fallback(state: State<Arc<AppState>>, method: Method, uri: Uri) -> Response {
    match method {
        Method::GET | Method::HEAD => redirect::redirect(state, uri).await.into_response(),
        Method::POST => AppError::NotFound.into_response(),
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}
