use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Comment row joined with its author's username.
/// Serializes as `{id, text, author, post, created}`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub author: String,
    pub post: i64,
    pub created: DateTime<Utc>,
    #[serde(skip)]
    pub author_id: i64,
}

pub(crate) const SELECT_COMMENTS: &str = r#"
    SELECT c.id, c.text, u.username AS author, c.post_id AS post, c.created, c.author_id
    FROM comments c
    JOIN users u ON u.id = c.author_id
"#;
