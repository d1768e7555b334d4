use chrono::{DateTime, Utc};

/// A shortened link record from the `urls` table.
///
/// Rows are only ever inserted; there is no update or delete path.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ShortLink {
    pub code: String,
    pub long_url: String,
    pub created_at: DateTime<Utc>,
}
