//! # crater_event - Event Channels
//!
//! Synchronous, single-threaded-friendly event plumbing:
//! - `EventChannel`: a FIFO queue of one event type
//! - `Multicast`: fans each broadcast out to every subscriber's channel
//! - `Subscription`: the receiving end a subscriber drains
//!
//! Delivery is queued, never re-entrant: broadcasting only pushes into
//! channels, and subscribers drain them when they choose to.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Trait for events
pub trait Event: Send + Sync + 'static {}

// Blanket implementation
impl<T: Send + Sync + 'static> Event for T {}

/// Subscriber ID
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub u64);

/// Channel for single-type events
pub struct EventChannel<E: Event> {
    queue: Mutex<VecDeque<E>>,
}

impl<E: Event> EventChannel<E> {
    /// Create a new channel
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }

    /// Send an event
    pub fn send(&self, event: E) {
        self.queue.lock().push_back(event);
    }

    /// Receive the oldest event
    pub fn receive(&self) -> Option<E> {
        self.queue.lock().pop_front()
    }

    /// Drain all events in arrival order
    pub fn drain(&self) -> Vec<E> {
        self.queue.lock().drain(..).collect()
    }

    /// Drop all pending events, returning how many were dropped
    pub fn clear(&self) -> usize {
        let mut queue = self.queue.lock();
        let count = queue.len();
        queue.clear();
        count
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Get pending count
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }
}

impl<E: Event> Default for EventChannel<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> std::fmt::Debug for EventChannel<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventChannel")
            .field("pending", &self.len())
            .finish()
    }
}

/// Receiving end of a multicast subscription
pub struct Subscription<E: Event> {
    id: SubscriberId,
    channel: Arc<EventChannel<E>>,
}

impl<E: Event> Subscription<E> {
    /// Subscriber id, used to unsubscribe
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Take every pending event
    pub fn drain(&self) -> Vec<E> {
        self.channel.drain()
    }

    /// Take the oldest pending event
    pub fn receive(&self) -> Option<E> {
        self.channel.receive()
    }

    /// Check whether events are waiting
    pub fn has_pending(&self) -> bool {
        !self.channel.is_empty()
    }

    /// Pending event count
    pub fn pending_count(&self) -> usize {
        self.channel.len()
    }
}

impl<E: Event> Clone for Subscription<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            channel: Arc::clone(&self.channel),
        }
    }
}

impl<E: Event> std::fmt::Debug for Subscription<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("pending", &self.channel.len())
            .finish()
    }
}

/// Multicast delegate: every broadcast is cloned into each subscriber's channel
pub struct Multicast<E: Event + Clone> {
    subscribers: Vec<(SubscriberId, Arc<EventChannel<E>>)>,
    next_subscriber_id: u64,
}

impl<E: Event + Clone> Multicast<E> {
    /// Create a multicast with no subscribers
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            next_subscriber_id: 1,
        }
    }

    /// Add a subscriber
    pub fn subscribe(&mut self) -> Subscription<E> {
        let id = SubscriberId(self.next_subscriber_id);
        self.next_subscriber_id += 1;

        let channel = Arc::new(EventChannel::new());
        self.subscribers.push((id, Arc::clone(&channel)));

        Subscription { id, channel }
    }

    /// Remove a subscriber. Returns false if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    /// Send an event to every subscriber
    pub fn broadcast(&self, event: E) {
        let Some(((_, last), rest)) = self.subscribers.split_last() else {
            return;
        };
        for (_, channel) in rest {
            channel.send(event.clone());
        }
        last.send(event);
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Check whether a subscriber is registered
    pub fn is_subscribed(&self, id: SubscriberId) -> bool {
        self.subscribers.iter().any(|(sub_id, _)| *sub_id == id)
    }
}

impl<E: Event + Clone> Default for Multicast<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event + Clone> std::fmt::Debug for Multicast<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Multicast")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

/// Prelude
pub mod prelude {
    pub use crate::{Event, EventChannel, Multicast, SubscriberId, Subscription};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct TestEvent(i32);

    #[test]
    fn test_event_channel() {
        let channel: EventChannel<TestEvent> = EventChannel::new();

        channel.send(TestEvent(1));
        channel.send(TestEvent(2));
        channel.send(TestEvent(3));

        assert_eq!(channel.len(), 3);
        assert_eq!(channel.receive(), Some(TestEvent(1)));

        let events = channel.drain();
        assert_eq!(events, vec![TestEvent(2), TestEvent(3)]);
        assert!(channel.is_empty());
    }

    #[test]
    fn test_multicast_fan_out() {
        let mut multicast = Multicast::new();
        let a = multicast.subscribe();
        let b = multicast.subscribe();

        multicast.broadcast(TestEvent(42));

        assert_eq!(a.drain(), vec![TestEvent(42)]);
        assert_eq!(b.drain(), vec![TestEvent(42)]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut multicast = Multicast::new();
        let a = multicast.subscribe();
        let b = multicast.subscribe();

        assert!(multicast.unsubscribe(a.id()));
        assert!(!multicast.unsubscribe(a.id()));
        multicast.broadcast(TestEvent(1));

        assert!(!a.has_pending());
        assert_eq!(b.pending_count(), 1);
        assert_eq!(multicast.subscriber_count(), 1);
    }

    #[test]
    fn test_broadcast_without_subscribers() {
        let multicast: Multicast<TestEvent> = Multicast::new();
        multicast.broadcast(TestEvent(0));
        assert_eq!(multicast.subscriber_count(), 0);
    }
}
