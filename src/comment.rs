use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::user::Author;

string_id!(CommentId);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub body: String,
    pub is_admin_reply: bool,
    #[serde(default)]
    pub author: Author,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Debug)]
pub struct CreateComment<'a> {
    pub body: &'a str,
}
