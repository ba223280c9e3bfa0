use tracing::debug;

use std::sync::Mutex;

use crate::observable::{lock, Publisher, Subscription};
use crate::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn,
    SignedOut,
}

#[derive(Debug, Default)]
struct Session {
    token: Option<String>,
    user: Option<User>,
}

impl Session {
    fn is_signed_in(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }
}

/// The signed-in user and the bearer token sent with every request.
#[derive(Debug, Default)]
pub struct SessionStore {
    state: Mutex<Session>,
    events: Publisher<SessionEvent>,
}

impl SessionStore {
    pub fn new() -> Self {
        SessionStore::default()
    }

    pub fn token(&self) -> Option<String> {
        lock(&self.state).token.clone()
    }

    pub fn user(&self) -> Option<User> {
        lock(&self.state).user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        lock(&self.state).is_signed_in()
    }

    pub fn set_auth(&self, token: impl Into<String>, user: User) {
        {
            let mut session = lock(&self.state);
            session.token = Some(token.into());
            session.user = Some(user);
        }
        self.events.notify(&SessionEvent::SignedIn);
    }

    /// Clears the session. Subscribers are told even if nobody was signed
    /// in, so anything keyed to the session can drop its caches.
    pub fn logout(&self) {
        {
            let mut session = lock(&self.state);
            session.token = None;
            session.user = None;
        }
        self.events.notify(&SessionEvent::SignedOut);
    }

    /// Rebuilds a session from previously persisted values.
    ///
    /// A user record that no longer parses leaves the store signed out.
    /// Ending a live session this way is reported as `SignedOut`.
    pub fn restore(&self, token: Option<String>, user_json: Option<&str>) {
        let next = match user_json.map(serde_json::from_str::<User>) {
            Some(Ok(user)) => Session {
                token,
                user: Some(user),
            },
            Some(Err(err)) => {
                debug!(error = %err, "discarding malformed persisted user");
                Session::default()
            }
            None => Session { token, user: None },
        };

        let (was_signed_in, signed_in) = {
            let mut session = lock(&self.state);
            let was_signed_in = session.is_signed_in();
            *session = next;
            (was_signed_in, session.is_signed_in())
        };

        match (was_signed_in, signed_in) {
            (_, true) => self.events.notify(&SessionEvent::SignedIn),
            (true, false) => self.events.notify(&SessionEvent::SignedOut),
            (false, false) => {}
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.events.unsubscribe(subscription)
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.subscriber_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::UserId;
    use std::sync::Arc;

    fn alice() -> User {
        User {
            id: UserId::new("u1"),
            email: "alice@example.com".to_string(),
            name: "Alice".to_string(),
            avatar_url: None,
            created_at: None,
        }
    }

    #[test]
    fn authenticated_needs_token_and_user() {
        let session = SessionStore::new();
        assert!(!session.is_authenticated());

        session.set_auth("token", alice());
        assert!(session.is_authenticated());
        assert_eq!(session.token().as_deref(), Some("token"));

        session.logout();
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
    }

    #[test]
    fn logout_notifies_subscribers() {
        let session = SessionStore::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        let seen = events.clone();
        session.subscribe(move |event| seen.lock().unwrap().push(*event));

        session.set_auth("token", alice());
        session.logout();

        assert_eq!(
            *events.lock().unwrap(),
            vec![SessionEvent::SignedIn, SessionEvent::SignedOut]
        );
    }

    #[test]
    fn restore_valid_session() {
        let session = SessionStore::new();
        let json = serde_json::to_string(&alice()).unwrap();

        session.restore(Some("token".to_string()), Some(&json));

        assert!(session.is_authenticated());
        assert_eq!(session.user(), Some(alice()));
    }

    #[test]
    fn restore_over_live_session_signs_out() {
        let session = SessionStore::new();
        session.set_auth("token", alice());
        let events = Arc::new(Mutex::new(Vec::new()));
        let seen = events.clone();
        session.subscribe(move |event| seen.lock().unwrap().push(*event));

        session.restore(Some("t".to_string()), Some("{bad"));
        session.restore(None, None);

        assert!(!session.is_authenticated());
        assert_eq!(*events.lock().unwrap(), vec![SessionEvent::SignedOut]);
    }

    #[test]
    fn restore_malformed_user_resets() {
        let session = SessionStore::new();
        session.set_auth("stale", alice());

        session.restore(Some("token".to_string()), Some("{not json"));

        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
    }
}
