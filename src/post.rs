use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::board::BoardId;
use crate::tag::Tag;
use crate::user::Author;

use std::fmt;

string_id!(PostId);

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Open,
    Planned,
    InProgress,
    Done,
    Closed,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Open => "open",
            PostStatus::Planned => "planned",
            PostStatus::InProgress => "in_progress",
            PostStatus::Done => "done",
            PostStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-side ordering of a post listing.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PostSort {
    /// Most votes first, newest breaking ties.
    Votes,
    Recent,
    Oldest,
}

impl PostSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostSort::Votes => "votes",
            PostSort::Recent => "recent",
            PostSort::Oldest => "oldest",
        }
    }
}

/// A post as it appears in a board listing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PostSummary {
    pub id: PostId,
    pub title: String,
    pub description_preview: Option<String>,
    pub status: PostStatus,
    pub vote_count: u32,
    pub comment_count: u32,
    pub pinned: bool,
    pub author_name: Option<String>,
    pub has_voted: bool,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub created_at: Option<DateTime<Utc>>,
}

/// The full representation of a single post.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub board_id: BoardId,
    pub title: String,
    pub description: Option<String>,
    pub status: PostStatus,
    pub vote_count: u32,
    pub comment_count: u32,
    pub pinned: bool,
    #[serde(default)]
    pub author: Author,
    pub has_voted: bool,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteResult {
    pub voted: bool,
    pub vote_count: u32,
}

#[derive(Serialize, Debug)]
pub struct CreatePost<'a> {
    pub title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
}

#[derive(Serialize, Debug)]
pub struct UpdateStatus {
    pub status: PostStatus,
}
