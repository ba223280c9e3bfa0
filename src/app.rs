use serde::{Deserialize, Serialize};

use std::sync::Arc;

use crate::api::Api;
use crate::client::{Client, Error, Result, Transport};
use crate::config::Config;
use crate::observable::Subscription;
use crate::organization::OrgId;
use crate::store::{BoardStore, OrgStore, PostStore, SessionEvent, SessionStore};
use crate::user::{AuthResponse, Login, Register, User};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Health {
    pub status: String,
    pub database: String,
}

/// One application context: the session plus every store, built once and
/// shared by reference with whatever needs them.
///
/// Signing out, whether requested or forced by an expired token, empties
/// the org, board and post caches.
#[derive(Debug)]
pub struct App {
    api: Api,
    session: Arc<SessionStore>,
    orgs: Arc<OrgStore>,
    boards: Arc<BoardStore>,
    posts: Arc<PostStore>,
    sign_out_hook: Subscription,
}

impl App {
    pub fn new(config: &Config) -> Result<Self> {
        let session = Arc::new(SessionStore::new());
        let client = Client::new(config.url.clone(), session.clone())?;
        Ok(App::with_transport(Arc::new(client), session))
    }

    pub fn with_transport(transport: Arc<dyn Transport>, session: Arc<SessionStore>) -> Self {
        let api = Api::new(transport);
        let orgs = Arc::new(OrgStore::new(api.clone()));
        let boards = Arc::new(BoardStore::new(api.clone()));
        let posts = Arc::new(PostStore::new(api.clone()));

        let sign_out_hook = {
            let (orgs, boards, posts) = (orgs.clone(), boards.clone(), posts.clone());
            session.subscribe(move |event| {
                if *event == SessionEvent::SignedOut {
                    orgs.clear();
                    boards.clear();
                    posts.clear();
                }
            })
        };

        App {
            api,
            session,
            orgs,
            boards,
            posts,
            sign_out_hook,
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn orgs(&self) -> &Arc<OrgStore> {
        &self.orgs
    }

    pub fn boards(&self) -> &Arc<BoardStore> {
        &self.boards
    }

    pub fn posts(&self) -> &Arc<PostStore> {
        &self.posts
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let auth: AuthResponse = self
            .api
            .post_unguarded("/auth/login", &Login { email, password })
            .await?
            .ok_or(Error::AuthFailed)?;
        self.session.set_auth(auth.token, auth.user.clone());
        Ok(auth.user)
    }

    pub async fn register(&self, email: &str, name: &str, password: &str) -> Result<User> {
        let auth: AuthResponse = self
            .api
            .post_unguarded(
                "/auth/register",
                &Register {
                    email,
                    name,
                    password,
                },
            )
            .await?
            .ok_or(Error::AuthFailed)?;
        self.session.set_auth(auth.token, auth.user.clone());
        Ok(auth.user)
    }

    /// The user the session token belongs to, according to the server.
    pub async fn me(&self) -> Result<Option<User>> {
        self.api.get("/auth/me").await
    }

    pub async fn health(&self) -> Result<Option<Health>> {
        self.api.get("/health").await
    }

    pub fn logout(&self) {
        self.session.logout();
    }

    /// Makes another organization current and drops the board and post
    /// caches that belonged to the previous one.
    pub fn switch_org(&self, org_id: &OrgId) -> bool {
        if !self.orgs.select(org_id) {
            return false;
        }
        self.boards.clear();
        self.posts.clear();
        true
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.session.unsubscribe(self.sign_out_hook);
    }
}
