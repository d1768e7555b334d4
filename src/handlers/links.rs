use crate::{
    codegen::CodeGenerator,
    db::LinkStore,
    error::{AppError, StoreError},
    models::ShortLink,
    AppState,
};
use askama::Template;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

// ── Template structs ───────────────────────────────────────────────────────

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {}

#[derive(Template)]
#[template(path = "created.html")]
struct CreatedTemplate {
    long_url: String,
    code: String,
    short_url: String,
}

// ── Handlers ───────────────────────────────────────────────────────────────

/// GET / and GET /index.html
pub async fn index() -> Response {
    IndexTemplate {}.into_response()
}

/// POST /shorten
///
/// Stores the submitted URL verbatim under a fresh code and answers 201 with
/// the short link. The body is decoded as a form whatever its Content-Type;
/// the first non-empty `long_url` wins. Without one the answer is 400 and
/// nothing is stored.
pub async fn shorten(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let long_url = form_field(&body, "long_url").ok_or(AppError::InvalidRequest)?;

    // The URL must survive being sent back as a Location header.
    if HeaderValue::from_bytes(long_url.as_bytes()).is_err() {
        return Err(AppError::InvalidRequest);
    }

    let link = create_link(&state.generator, &state.db, &long_url).await?;

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| format!("localhost:{}", state.config.port));

    let page = CreatedTemplate {
        short_url: format!("http://{}/{}", host, link.code),
        code: link.code,
        long_url: link.long_url,
    };

    Ok((StatusCode::CREATED, page).into_response())
}

// ── Private helpers ────────────────────────────────────────────────────────

/// First non-empty value of `key` in a URL-encoded body.
fn form_field(body: &[u8], key: &str) -> Option<String> {
    form_urlencoded::parse(body)
        .find(|(k, v)| k == key && !v.is_empty())
        .map(|(_, v)| v.into_owned())
}

/// Generate a code and insert the link. A primary-key clash between the
/// generator's check and the insert gets one retry with a fresh code.
async fn create_link<S>(
    generator: &CodeGenerator,
    store: &S,
    long_url: &str,
) -> Result<ShortLink, AppError>
where
    S: LinkStore + ?Sized,
{
    let mut retried = false;

    loop {
        let code = generator.generate(store).await?;

        match store.insert(&code, long_url).await {
            Ok(link) => return Ok(link),
            Err(StoreError::DuplicateKey(code)) if !retried => {
                tracing::warn!("Short code '{}' was taken before insert, retrying", code);
                retried = true;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use rand::{rngs::StdRng, SeedableRng};
    use std::sync::Mutex;

    /// Store whose existence check always passes but whose first `clashes`
    /// inserts lose the race to another writer.
    struct RacingStore {
        clashes: Mutex<u32>,
        inserts: Mutex<u32>,
    }

    impl RacingStore {
        fn new(clashes: u32) -> Self {
            Self {
                clashes: Mutex::new(clashes),
                inserts: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl LinkStore for RacingStore {
        async fn exists(&self, _code: &str) -> Result<bool, StoreError> {
            Ok(false)
        }

        async fn insert(&self, code: &str, long_url: &str) -> Result<ShortLink, StoreError> {
            *self.inserts.lock().unwrap() += 1;
            let mut clashes = self.clashes.lock().unwrap();
            if *clashes > 0 {
                *clashes -= 1;
                return Err(StoreError::DuplicateKey(code.to_owned()));
            }
            Ok(ShortLink {
                code: code.to_owned(),
                long_url: long_url.to_owned(),
                created_at: Utc::now(),
            })
        }

        async fn lookup(&self, _code: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }
    }

    fn generator() -> CodeGenerator {
        CodeGenerator::new(6, 10, StdRng::seed_from_u64(5))
    }

    #[tokio::test]
    async fn single_insert_clash_is_retried() {
        let store = RacingStore::new(1);
        let link = create_link(&generator(), &store, "https://example.com")
            .await
            .unwrap();
        assert_eq!(link.long_url, "https://example.com");
        assert_eq!(*store.inserts.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn second_insert_clash_gives_up() {
        let store = RacingStore::new(2);
        let err = create_link(&generator(), &store, "https://example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Store(StoreError::DuplicateKey(_))));
        assert_eq!(*store.inserts.lock().unwrap(), 2);
    }

    #[test]
    fn form_field_takes_first_non_empty_value() {
        assert_eq!(
            form_field(b"long_url=https%3A%2F%2Fa.com&long_url=https%3A%2F%2Fb.com", "long_url")
                .as_deref(),
            Some("https://a.com")
        );
        assert_eq!(
            form_field(b"long_url=&long_url=x", "long_url").as_deref(),
            Some("x")
        );
        assert_eq!(form_field(b"a+b=1&long_url=c+d", "long_url").as_deref(), Some("c d"));
        assert_eq!(form_field(b"long_url=", "long_url"), None);
        assert_eq!(form_field(b"", "long_url"), None);
        assert_eq!(form_field(b"other=1", "long_url"), None);
    }
}
