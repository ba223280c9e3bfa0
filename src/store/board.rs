use std::sync::Mutex;

use crate::api::{path, Api};
use crate::board::{Board, CreateBoard};
use crate::client::{Error, Result};
use crate::observable::{lock, Publisher, Subscription};
use crate::organization::OrgId;
use crate::store::LoadingGuard;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    Loading(bool),
    BoardsReplaced,
    CurrentBoardReplaced,
    BoardAdded(String),
    BoardRemoved(String),
    Cleared,
}

#[derive(Debug, Default)]
struct BoardState {
    boards: Vec<Board>,
    current_board: Option<Board>,
    loading: bool,
}

/// Boards of the current organization.
#[derive(Debug)]
pub struct BoardStore {
    api: Api,
    state: Mutex<BoardState>,
    events: Publisher<BoardEvent>,
}

impl BoardStore {
    pub fn new(api: Api) -> Self {
        BoardStore {
            api,
            state: Mutex::new(BoardState::default()),
            events: Publisher::new(),
        }
    }

    pub fn boards(&self) -> Vec<Board> {
        lock(&self.state).boards.clone()
    }

    pub fn current_board(&self) -> Option<Board> {
        lock(&self.state).current_board.clone()
    }

    pub fn loading(&self) -> bool {
        lock(&self.state).loading
    }

    pub async fn fetch_boards(&self, org_id: &OrgId) -> Result<()> {
        let _loading = LoadingGuard::start(|on| self.set_loading(on));
        let boards: Vec<Board> = self
            .api
            .get(&path(&["orgs", org_id.as_str(), "boards"]))
            .await?
            .unwrap_or_default();
        lock(&self.state).boards = boards;
        self.events.notify(&BoardEvent::BoardsReplaced);
        Ok(())
    }

    pub async fn fetch_board(&self, org_id: &OrgId, slug: &str) -> Result<()> {
        let _loading = LoadingGuard::start(|on| self.set_loading(on));
        let board: Option<Board> = self
            .api
            .get(&path(&["orgs", org_id.as_str(), "boards", slug]))
            .await?;
        lock(&self.state).current_board = board;
        self.events.notify(&BoardEvent::CurrentBoardReplaced);
        Ok(())
    }

    /// Creates a board and appends it to the cached list.
    pub async fn create_board(
        &self,
        org_id: &OrgId,
        name: &str,
        description: Option<&str>,
    ) -> Result<Board> {
        let board: Board = self
            .api
            .post(
                &path(&["orgs", org_id.as_str(), "boards"]),
                &CreateBoard { name, description },
            )
            .await?
            .ok_or(Error::BoardCreationFailed)?;
        lock(&self.state).boards.push(board.clone());
        self.events.notify(&BoardEvent::BoardAdded(board.slug.clone()));
        Ok(board)
    }

    pub async fn delete_board(&self, org_id: &OrgId, slug: &str) -> Result<()> {
        self.api
            .delete(&path(&["orgs", org_id.as_str(), "boards", slug]))
            .await?;
        lock(&self.state).boards.retain(|board| board.slug != slug);
        self.events.notify(&BoardEvent::BoardRemoved(slug.to_string()));
        Ok(())
    }

    pub fn clear(&self) {
        {
            let mut state = lock(&self.state);
            state.boards.clear();
            state.current_board = None;
        }
        self.events.notify(&BoardEvent::Cleared);
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&BoardEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.events.unsubscribe(subscription)
    }

    fn set_loading(&self, on: bool) {
        lock(&self.state).loading = on;
        self.events.notify(&BoardEvent::Loading(on));
    }
}
