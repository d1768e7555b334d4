use crate::{db::LinkStore, error::AppError, AppState};
use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// GET /:code
///
/// The code is the raw request path with every leading slash stripped; the
/// query string is ignored. A hit answers 302 with the stored URL copied
/// byte-for-byte into `Location`.
pub async fn redirect(
    State(state): State<Arc<AppState>>,
    uri: Uri,
) -> Result<Response, AppError> {
    let code = uri.path().trim_start_matches('/');

    let long_url = state.db.lookup(code).await?.ok_or(AppError::NotFound)?;

    // `Redirect::to` answers 303 and panics on values that are not visible
    // ASCII, so the header is built by hand.
    let location = HeaderValue::from_bytes(long_url.as_bytes())
        .map_err(|_| AppError::BadLocation(code.to_owned()))?;

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}
