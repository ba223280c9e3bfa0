//! Change notification for the stores.
//!
//! Views subscribe a listener and receive every event a store publishes
//! after it has finished mutating its state. Listeners run in the order they
//! subscribed, on the task that caused the change, with no store lock held,
//! so a listener may read back the store it is observing.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Subscription(u64);

struct Registry<E> {
    next_id: u64,
    listeners: BTreeMap<u64, Listener<E>>,
}

pub struct Publisher<E> {
    registry: Mutex<Registry<E>>,
}

impl<E> Publisher<E> {
    pub fn new() -> Self {
        Publisher {
            registry: Mutex::new(Registry {
                next_id: 0,
                listeners: BTreeMap::new(),
            }),
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let mut registry = lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.insert(id, Arc::new(listener));
        Subscription(id)
    }

    /// Returns false if the subscription was already removed.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        lock(&self.registry)
            .listeners
            .remove(&subscription.0)
            .is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.registry).listeners.len()
    }

    pub fn notify(&self, event: &E) {
        let listeners: Vec<Listener<E>> = lock(&self.registry).listeners.values().cloned().collect();
        for listener in listeners {
            listener(event);
        }
    }
}

impl<E> Default for Publisher<E> {
    fn default() -> Self {
        Publisher::new()
    }
}

impl<E> fmt::Debug for Publisher<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Publisher({} subscribers)", self.subscriber_count())
    }
}

/// Store state is only ever touched in short synchronous sections, so a
/// poisoned lock still holds consistent data.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listeners_run_in_subscription_order() {
        let publisher = Publisher::<u32>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let seen = seen.clone();
            publisher.subscribe(move |event: &u32| seen.lock().unwrap().push((name, *event)));
        }
        publisher.notify(&7);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![("first", 7), ("second", 7), ("third", 7)]
        );
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let publisher = Publisher::<()>::new();
        let count = Arc::new(Mutex::new(0));

        let counter = count.clone();
        let subscription = publisher.subscribe(move |_| *counter.lock().unwrap() += 1);
        publisher.notify(&());
        assert!(publisher.unsubscribe(subscription));
        assert!(!publisher.unsubscribe(subscription));
        publisher.notify(&());

        assert_eq!(*count.lock().unwrap(), 1);
        assert_eq!(publisher.subscriber_count(), 0);
    }

    #[test]
    fn listener_may_subscribe_during_notify() {
        let publisher = Arc::new(Publisher::<()>::new());
        let inner = publisher.clone();
        publisher.subscribe(move |_| {
            inner.subscribe(|_| {});
        });

        publisher.notify(&());
        assert_eq!(publisher.subscriber_count(), 2);
    }
}
