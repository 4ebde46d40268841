//! Synchronous publish/subscribe notification bus.
//!
//! [`Bus<E>`] delivers every published event to each subscriber in
//! subscription order, on the publishing thread, before `publish` returns.
//! The registry uses one bus for its own [`Event`](crate::Event)s and reads
//! each archive's [`ArchiveEvent`](crate::ArchiveEvent) bus through an
//! [`Inbox`].
//!
//! # Example
//!
//! ```rust
//! use arcmgr::Bus;
//!
//! let mut bus: Bus<u32> = Bus::new();
//! let inbox = bus.subscribe_inbox().1;
//!
//! bus.publish(1);
//! bus.set_muted(true);
//! bus.publish(2);
//! bus.set_muted(false);
//! bus.publish(3);
//!
//! assert_eq!(inbox.drain(), vec![1, 3]);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Token identifying one subscription on a [`Bus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Callback<E> = Box<dyn FnMut(&E)>;

/// A list of subscribers that receive published events.
pub struct Bus<E> {
    subscribers: Vec<(SubscriberId, Callback<E>)>,
    next_id: u64,
    muted: bool,
}

impl<E> Default for Bus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Bus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bus")
            .field("subscribers", &self.subscribers.len())
            .field("muted", &self.muted)
            .finish()
    }
}

impl<E> Bus<E> {
    /// Creates a bus with no subscribers.
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 0,
            muted: false,
        }
    }

    /// Registers a callback invoked for every published event.
    pub fn subscribe(&mut self, callback: impl FnMut(&E) + 'static) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Removes a subscription. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Removes every subscription.
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }

    /// Returns the number of subscribers.
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Returns `true` if nobody is subscribed.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Suppresses (or resumes) delivery. Events published while muted are
    /// dropped, not queued.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Returns `true` while delivery is suppressed.
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Delivers an event to every subscriber.
    pub fn publish(&mut self, event: E) {
        if self.muted {
            return;
        }
        for (_, callback) in &mut self.subscribers {
            callback(&event);
        }
    }
}

impl<E: Clone + 'static> Bus<E> {
    /// Subscribes a queue that collects clones of every delivered event.
    pub fn subscribe_inbox(&mut self) -> (SubscriberId, Inbox<E>) {
        let inbox = Inbox::default();
        let sink = inbox.clone();
        let id = self.subscribe(move |event: &E| sink.push(event.clone()));
        (id, inbox)
    }
}

/// A shared queue filled by a bus subscription.
///
/// Clones share the same queue.
#[derive(Debug)]
pub struct Inbox<E>(Rc<RefCell<Vec<E>>>);

impl<E> Clone for Inbox<E> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<E> Default for Inbox<E> {
    fn default() -> Self {
        Self(Rc::new(RefCell::new(Vec::new())))
    }
}

impl<E> Inbox<E> {
    fn push(&self, event: E) {
        self.0.borrow_mut().push(event);
    }

    /// Takes every queued event, oldest first.
    pub fn drain(&self) -> Vec<E> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    /// Returns the number of queued events.
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Returns `true` if no events are queued.
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

impl<E: Clone> Inbox<E> {
    /// Returns a copy of the queued events without removing them.
    pub fn snapshot(&self) -> Vec<E> {
        self.0.borrow().clone()
    }
}
