//! # zone_event - Synchronous Listener Lists
//!
//! Immediate-dispatch observer lists for simulation callbacks:
//! - Explicit subscribe / unsubscribe with stable subscriber ids
//! - Unsubscribing takes effect even inside a dispatch that is already running
//! - Callbacks may subscribe or unsubscribe listeners while being dispatched
//!
//! Unlike a queued event bus, [`Listeners::emit`] runs every handler before
//! it returns. Nothing is buffered between simulation steps.

use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Trait for events
pub trait Event: Send + Sync + 'static {}

// Blanket implementation
impl<T: Send + Sync + 'static> Event for T {}

/// Event handler function type
pub type EventHandler<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Subscriber ID
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub u64);

struct Subscriber<E> {
    id: SubscriberId,
    /// Cleared on unsubscribe so snapshots taken by a running dispatch skip it
    live: Arc<AtomicBool>,
    handler: EventHandler<E>,
}

struct ListenerTable<E> {
    next_id: u64,
    subscribers: Vec<Subscriber<E>>,
}

/// A shared list of handlers for one event type.
///
/// Cloning a `Listeners` yields another handle to the same list, so an
/// emitter can keep one handle while observers subscribe through another.
pub struct Listeners<E: Event> {
    table: Arc<Mutex<ListenerTable<E>>>,
}

impl<E: Event> Listeners<E> {
    /// Create an empty listener list
    pub fn new() -> Self {
        Self {
            table: Arc::new(Mutex::new(ListenerTable {
                next_id: 1,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Register a handler and return its id
    pub fn subscribe<F>(&self, handler: F) -> SubscriberId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let mut table = self.table.lock();
        let id = SubscriberId(table.next_id);
        table.next_id += 1;
        table.subscribers.push(Subscriber {
            id,
            live: Arc::new(AtomicBool::new(true)),
            handler: Arc::new(handler),
        });
        id
    }

    /// Remove a handler.
    ///
    /// Returns `false` if the id was not subscribed. Once this returns the
    /// handler is never called again, including by a dispatch in progress.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut table = self.table.lock();
        match table.subscribers.iter().position(|s| s.id == id) {
            Some(index) => {
                let subscriber = table.subscribers.remove(index);
                subscriber.live.store(false, Ordering::Release);
                true
            }
            None => false,
        }
    }

    /// Deliver an event to every live handler, in subscription order.
    ///
    /// Returns the number of handlers that were called. Handlers subscribed
    /// during this dispatch first receive the next event.
    pub fn emit(&self, event: &E) -> usize {
        let snapshot: Vec<(Arc<AtomicBool>, EventHandler<E>)> = {
            let table = self.table.lock();
            if table.subscribers.is_empty() {
                return 0;
            }
            table
                .subscribers
                .iter()
                .map(|s| (Arc::clone(&s.live), Arc::clone(&s.handler)))
                .collect()
        };

        let mut delivered = 0;
        for (live, handler) in snapshot {
            if live.load(Ordering::Acquire) {
                handler(event);
                delivered += 1;
            }
        }
        delivered
    }

    /// Check whether an id is currently subscribed
    pub fn contains(&self, id: SubscriberId) -> bool {
        self.table.lock().subscribers.iter().any(|s| s.id == id)
    }

    /// Number of subscribed handlers
    pub fn len(&self) -> usize {
        self.table.lock().subscribers.len()
    }

    /// Check if no handler is subscribed
    pub fn is_empty(&self) -> bool {
        self.table.lock().subscribers.is_empty()
    }

    /// Remove every handler
    pub fn clear(&self) {
        let mut table = self.table.lock();
        for subscriber in table.subscribers.drain(..) {
            subscriber.live.store(false, Ordering::Release);
        }
    }
}

impl<E: Event> Clone for Listeners<E> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
        }
    }
}

impl<E: Event> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("subscribers", &self.len())
            .finish()
    }
}

/// Prelude
pub mod prelude {
    pub use crate::{Event, EventHandler, Listeners, SubscriberId};
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    struct TestEvent(i32);

    #[test]
    fn test_emit_reaches_all_subscribers() {
        let listeners: Listeners<TestEvent> = Listeners::new();
        let counter = Arc::new(AtomicU32::new(0));

        for _ in 0..3 {
            let counter = counter.clone();
            listeners.subscribe(move |e: &TestEvent| {
                counter.fetch_add(e.0 as u32, Ordering::SeqCst);
            });
        }

        assert_eq!(listeners.emit(&TestEvent(2)), 3);
        assert_eq!(counter.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn test_unsubscribe() {
        let listeners: Listeners<TestEvent> = Listeners::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let id = listeners.subscribe(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        listeners.emit(&TestEvent(0));
        assert!(listeners.unsubscribe(id));
        assert!(!listeners.unsubscribe(id));
        assert_eq!(listeners.emit(&TestEvent(0)), 0);

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_unsubscribe_during_dispatch() {
        let listeners: Listeners<TestEvent> = Listeners::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        let victim = Arc::new(Mutex::new(None::<SubscriberId>));

        let handle = listeners.clone();
        let victim_clone = victim.clone();
        let order1 = order.clone();
        listeners.subscribe(move |_| {
            order1.lock().push("first");
            if let Some(id) = *victim_clone.lock() {
                handle.unsubscribe(id);
            }
        });

        let order2 = order.clone();
        let second = listeners.subscribe(move |_| {
            order2.lock().push("second");
        });
        *victim.lock() = Some(second);

        assert_eq!(listeners.emit(&TestEvent(0)), 1);
        assert_eq!(*order.lock(), vec!["first"]);
        assert_eq!(listeners.len(), 1);
    }

    #[test]
    fn test_subscribe_during_dispatch_waits_for_next_event() {
        let listeners: Listeners<TestEvent> = Listeners::new();
        let counter = Arc::new(AtomicU32::new(0));

        let handle = listeners.clone();
        let counter_clone = counter.clone();
        listeners.subscribe(move |_| {
            let counter = counter_clone.clone();
            handle.subscribe(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        });

        listeners.emit(&TestEvent(0));
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        listeners.emit(&TestEvent(0));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clear() {
        let listeners: Listeners<TestEvent> = Listeners::new();
        let a = listeners.subscribe(|_| {});
        listeners.subscribe(|_| {});

        listeners.clear();
        assert!(!listeners.contains(a));
        assert_eq!(listeners.emit(&TestEvent(1)), 0);
    }
}
