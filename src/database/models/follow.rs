use serde::Serialize;
use sqlx::FromRow;

/// Directed follow edge, serialized with usernames on both ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Follow {
    #[serde(skip)]
    pub id: i64,
    pub user: String,
    pub following: String,
}

pub(crate) const SELECT_FOLLOWS: &str = r#"
    SELECT f.id, u.username AS user, t.username AS following
    FROM follows f
    JOIN users u ON u.id = f.user_id
    JOIN users t ON t.id = f.following_id
"#;
