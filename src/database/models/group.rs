use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Read-only community a post may belong to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}
