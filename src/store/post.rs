//! Posts, votes and comments for the board being browsed.
//!
//! A post can be cached twice: as a summary in the board listing and as the
//! detail of the post currently open. Vote counts, comment counts and status
//! are copied into both, and every mutation below writes the server's answer
//! to whichever of the two copies holds the post.

use serde_json::json;
use url::form_urlencoded;

use std::sync::Mutex;

use crate::api::{path, Api};
use crate::board::BoardId;
use crate::client::{Error, Result};
use crate::comment::{Comment, CommentId, CreateComment};
use crate::observable::{lock, Publisher, Subscription};
use crate::post::{
    CreatePost, Post, PostId, PostSort, PostStatus, PostSummary, UpdateStatus, VoteResult,
};
use crate::store::LoadingGuard;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostEvent {
    Loading(bool),
    PostsReplaced,
    CurrentPostReplaced,
    CommentsReplaced,
    CommentAdded(CommentId),
    CommentRemoved(CommentId),
    /// Counters or status of a cached post changed.
    PostUpdated(PostId),
    Cleared,
}

#[derive(Debug, Default)]
struct PostState {
    posts: Vec<PostSummary>,
    current_post: Option<Post>,
    comments: Vec<Comment>,
    loading: bool,
}

/// Fields shared by both cached forms of a post.
trait Projection {
    fn id(&self) -> &PostId;
    fn apply_vote(&mut self, vote: VoteResult);
    fn comment_added(&mut self);
    fn comment_removed(&mut self);
    fn set_status(&mut self, status: PostStatus);
}

macro_rules! impl_projection {
    ($ty:ty) => {
        impl Projection for $ty {
            fn id(&self) -> &PostId {
                &self.id
            }

            fn apply_vote(&mut self, vote: VoteResult) {
                self.has_voted = vote.voted;
                self.vote_count = vote.vote_count;
            }

            fn comment_added(&mut self) {
                self.comment_count += 1;
            }

            fn comment_removed(&mut self) {
                self.comment_count = self.comment_count.saturating_sub(1);
            }

            fn set_status(&mut self, status: PostStatus) {
                self.status = status;
            }
        }
    };
}

impl_projection!(PostSummary);
impl_projection!(Post);

#[derive(Debug)]
pub struct PostStore {
    api: Api,
    state: Mutex<PostState>,
    events: Publisher<PostEvent>,
}

impl PostStore {
    pub fn new(api: Api) -> Self {
        PostStore {
            api,
            state: Mutex::new(PostState::default()),
            events: Publisher::new(),
        }
    }

    /// The board listing, in server order.
    pub fn posts(&self) -> Vec<PostSummary> {
        lock(&self.state).posts.clone()
    }

    pub fn current_post(&self) -> Option<Post> {
        lock(&self.state).current_post.clone()
    }

    /// Comments of the current post, in server order.
    pub fn comments(&self) -> Vec<Comment> {
        lock(&self.state).comments.clone()
    }

    pub fn loading(&self) -> bool {
        lock(&self.state).loading
    }

    /// Replaces the listing with the posts of a board.
    ///
    /// The old listing is dropped before the request goes out.
    pub async fn fetch_posts(
        &self,
        board_id: &BoardId,
        sort: Option<PostSort>,
        status: Option<PostStatus>,
    ) -> Result<()> {
        let path = posts_path(board_id, sort, status);
        let _loading = LoadingGuard::start(|on| self.set_loading(on));
        self.replace_posts(Vec::new());

        let posts: Vec<PostSummary> = self.api.get(&path).await?.unwrap_or_default();
        self.replace_posts(posts);
        Ok(())
    }

    pub async fn fetch_post(&self, board_id: &BoardId, post_id: &PostId) -> Result<()> {
        self.load_current(&path(&["boards", board_id.as_str(), "posts", post_id.as_str()]))
            .await
    }

    /// Like `fetch_post`, for when the post's board is not known yet.
    pub async fn fetch_post_direct(&self, post_id: &PostId) -> Result<()> {
        self.load_current(&path(&["posts", post_id.as_str()])).await
    }

    /// Creates a post. The listing is left alone; callers refetch it.
    pub async fn create_post(
        &self,
        board_id: &BoardId,
        title: &str,
        description: Option<&str>,
    ) -> Result<Post> {
        self.api
            .post(
                &path(&["boards", board_id.as_str(), "posts"]),
                &CreatePost { title, description },
            )
            .await?
            .ok_or(Error::CreationFailed)
    }

    pub async fn toggle_vote(&self, post_id: &PostId) -> Result<VoteResult> {
        let vote: VoteResult = self
            .api
            .post(&path(&["posts", post_id.as_str(), "vote"]), &json!({}))
            .await?
            .ok_or(Error::VoteFailed)?;

        self.patch(post_id, |post| post.apply_vote(vote));
        Ok(vote)
    }

    pub async fn fetch_comments(&self, post_id: &PostId) -> Result<()> {
        let comments: Vec<Comment> = self
            .api
            .get(&path(&["posts", post_id.as_str(), "comments"]))
            .await?
            .unwrap_or_default();
        lock(&self.state).comments = comments;
        self.events.notify(&PostEvent::CommentsReplaced);
        Ok(())
    }

    pub async fn add_comment(&self, post_id: &PostId, body: &str) -> Result<Comment> {
        let comment: Comment = self
            .api
            .post(
                &path(&["posts", post_id.as_str(), "comments"]),
                &CreateComment { body },
            )
            .await?
            .ok_or(Error::CommentFailed)?;

        lock(&self.state).comments.push(comment.clone());
        self.events
            .notify(&PostEvent::CommentAdded(comment.id.clone()));
        self.patch(post_id, |post| post.comment_added());
        Ok(comment)
    }

    /// Deletes a comment of `post_id`. Comment counts never drop below zero,
    /// even when the cached count was already behind the server.
    pub async fn delete_comment(&self, comment_id: &CommentId, post_id: &PostId) -> Result<()> {
        self.api
            .delete(&path(&["comments", comment_id.as_str()]))
            .await?;

        let removed = {
            let mut state = lock(&self.state);
            let before = state.comments.len();
            state.comments.retain(|comment| &comment.id != comment_id);
            state.comments.len() != before
        };
        if removed {
            self.events
                .notify(&PostEvent::CommentRemoved(comment_id.clone()));
        }
        self.patch(post_id, |post| post.comment_removed());
        Ok(())
    }

    /// Changes a post's status and copies the status the server reports
    /// back, which is not necessarily the one requested.
    pub async fn update_status(
        &self,
        board_id: &BoardId,
        post_id: &PostId,
        status: PostStatus,
    ) -> Result<Post> {
        let updated: Post = self
            .api
            .put(
                &path(&["boards", board_id.as_str(), "posts", post_id.as_str(), "status"]),
                &UpdateStatus { status },
            )
            .await?
            .ok_or(Error::StatusUpdateFailed)?;

        let confirmed = updated.status;
        self.patch(post_id, |post| post.set_status(confirmed));
        Ok(updated)
    }

    /// Empties all three caches.
    pub fn clear(&self) {
        {
            let mut state = lock(&self.state);
            state.posts.clear();
            state.current_post = None;
            state.comments.clear();
        }
        self.events.notify(&PostEvent::Cleared);
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&PostEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.events.unsubscribe(subscription)
    }

    async fn load_current(&self, path: &str) -> Result<()> {
        let _loading = LoadingGuard::start(|on| self.set_loading(on));
        let post: Option<Post> = self.api.get(path).await?;
        lock(&self.state).current_post = post;
        self.events.notify(&PostEvent::CurrentPostReplaced);
        Ok(())
    }

    fn replace_posts(&self, posts: Vec<PostSummary>) {
        lock(&self.state).posts = posts;
        self.events.notify(&PostEvent::PostsReplaced);
    }

    /// Applies `update` to the listing entry and the current post, where
    /// either holds `post_id`. Posts that aren't cached are skipped.
    fn patch<F>(&self, post_id: &PostId, update: F)
    where
        F: Fn(&mut dyn Projection),
    {
        let touched = {
            let mut state = lock(&self.state);
            let mut touched = false;
            if let Some(summary) = state.posts.iter_mut().find(|post| post.id() == post_id) {
                update(summary as &mut dyn Projection);
                touched = true;
            }
            if let Some(current) = state
                .current_post
                .as_mut()
                .filter(|post| post.id() == post_id)
            {
                update(current as &mut dyn Projection);
                touched = true;
            }
            touched
        };
        if touched {
            self.events.notify(&PostEvent::PostUpdated(post_id.clone()));
        }
    }

    fn set_loading(&self, on: bool) {
        lock(&self.state).loading = on;
        self.events.notify(&PostEvent::Loading(on));
    }
}

fn posts_path(board_id: &BoardId, sort: Option<PostSort>, status: Option<PostStatus>) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    if let Some(sort) = sort {
        query.append_pair("sort", sort.as_str());
    }
    if let Some(status) = status {
        query.append_pair("status", status.as_str());
    }
    let query = query.finish();

    let listing = path(&["boards", board_id.as_str(), "posts"]);
    if query.is_empty() {
        listing
    } else {
        format!("{}?{}", listing, query)
    }
}
