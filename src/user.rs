use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

string_id!(UserId);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Serialize, Debug)]
pub(crate) struct Login<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize, Debug)]
pub(crate) struct Register<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub password: &'a str,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthorProfile {
    pub id: UserId,
    pub name: String,
    /// Only present on post detail authors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

/// The author of a post or comment.
///
/// The server sends `null` once the authoring account has been deleted; that
/// is decoded here so callers never check for a missing author themselves.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(from = "Option<AuthorProfile>", into = "Option<AuthorProfile>")]
pub enum Author {
    Known(AuthorProfile),
    Deleted,
}

impl Author {
    pub fn profile(&self) -> Option<&AuthorProfile> {
        match self {
            Author::Known(profile) => Some(profile),
            Author::Deleted => None,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Author::Known(profile) => profile.name.as_str(),
            Author::Deleted => "Deleted user",
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, Author::Deleted)
    }
}

impl Default for Author {
    fn default() -> Self {
        Author::Deleted
    }
}

impl From<Option<AuthorProfile>> for Author {
    fn from(profile: Option<AuthorProfile>) -> Self {
        profile.map(Author::Known).unwrap_or(Author::Deleted)
    }
}

impl From<Author> for Option<AuthorProfile> {
    fn from(author: Author) -> Self {
        match author {
            Author::Known(profile) => Some(profile),
            Author::Deleted => None,
        }
    }
}
