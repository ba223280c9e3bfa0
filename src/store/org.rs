use std::sync::Mutex;

use crate::api::Api;
use crate::client::Result;
use crate::observable::{lock, Publisher, Subscription};
use crate::organization::{OrgId, Organization};
use crate::store::LoadingGuard;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrgEvent {
    Loading(bool),
    OrgsReplaced,
    CurrentChanged,
    Cleared,
}

#[derive(Debug, Default)]
struct OrgState {
    orgs: Vec<Organization>,
    current: Option<Organization>,
    loading: bool,
}

/// The organizations the user belongs to and the one being browsed.
#[derive(Debug)]
pub struct OrgStore {
    api: Api,
    state: Mutex<OrgState>,
    events: Publisher<OrgEvent>,
}

impl OrgStore {
    pub fn new(api: Api) -> Self {
        OrgStore {
            api,
            state: Mutex::new(OrgState::default()),
            events: Publisher::new(),
        }
    }

    pub fn orgs(&self) -> Vec<Organization> {
        lock(&self.state).orgs.clone()
    }

    pub fn current(&self) -> Option<Organization> {
        lock(&self.state).current.clone()
    }

    pub fn loading(&self) -> bool {
        lock(&self.state).loading
    }

    /// Fetches the caller's organizations and makes the first one current.
    pub async fn fetch_orgs(&self) -> Result<()> {
        let _loading = LoadingGuard::start(|on| self.set_loading(on));
        let orgs: Vec<Organization> = self.api.get("/orgs").await?.unwrap_or_default();
        {
            let mut state = lock(&self.state);
            state.current = orgs.first().cloned();
            state.orgs = orgs;
        }
        self.events.notify(&OrgEvent::OrgsReplaced);
        self.events.notify(&OrgEvent::CurrentChanged);
        Ok(())
    }

    /// Makes an already fetched organization current.
    pub fn select(&self, org_id: &OrgId) -> bool {
        let found = {
            let mut state = lock(&self.state);
            match state.orgs.iter().find(|org| &org.id == org_id).cloned() {
                Some(org) => {
                    state.current = Some(org);
                    true
                }
                None => false,
            }
        };
        if found {
            self.events.notify(&OrgEvent::CurrentChanged);
        }
        found
    }

    pub fn clear(&self) {
        {
            let mut state = lock(&self.state);
            state.orgs.clear();
            state.current = None;
        }
        self.events.notify(&OrgEvent::Cleared);
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&OrgEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.events.unsubscribe(subscription)
    }

    fn set_loading(&self, on: bool) {
        lock(&self.state).loading = on;
        self.events.notify(&OrgEvent::Loading(on));
    }
}
