//! Client-side caches of server entities.
//!
//! Every store mutates its state only after the server has answered, then
//! publishes an event describing the change.

pub mod board;
pub mod org;
pub mod post;
pub mod session;

pub use self::board::{BoardEvent, BoardStore};
pub use self::org::{OrgEvent, OrgStore};
pub use self::post::{PostEvent, PostStore};
pub use self::session::{SessionEvent, SessionStore};

/// Holds a store's loading flag up for the lifetime of a fetch.
///
/// The flag is lowered on drop, so it returns to `false` whether the fetch
/// succeeds, fails, or its future is dropped mid-request.
pub(crate) struct LoadingGuard<F>
where
    F: Fn(bool),
{
    set: F,
}

impl<F> LoadingGuard<F>
where
    F: Fn(bool),
{
    pub(crate) fn start(set: F) -> Self {
        set(true);
        LoadingGuard { set }
    }
}

impl<F> Drop for LoadingGuard<F>
where
    F: Fn(bool),
{
    fn drop(&mut self) {
        (self.set)(false);
    }
}
