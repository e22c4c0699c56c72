use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Post row joined with its author's username.
/// Serializes as `{id, text, author, pub_date, image, group}`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub author: String,
    pub pub_date: DateTime<Utc>,
    pub image: Option<String>,
    pub group: Option<i64>,
    #[serde(skip)]
    pub author_id: i64,
}

pub(crate) const SELECT_POSTS: &str = r#"
    SELECT p.id, p.text, u.username AS author, p.pub_date, p.image,
           p.group_id AS "group", p.author_id
    FROM posts p
    JOIN users u ON u.id = p.author_id
"#;
