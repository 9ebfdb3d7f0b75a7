//! Channel-backed observer lists.
//!
//! Each subscriber owns the receiving end of its own unbounded channel.
//! Dropping a [`Subscription`] detaches it; the sender side is pruned on
//! the next notify.

use crossbeam_channel::{Receiver, Sender, TryIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Receiving handle returned by [`Subscribers::subscribe`].
pub struct Subscription<T> {
    id: SubscriptionId,
    rx: Receiver<T>,
}

impl<T> Subscription<T> {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn try_recv(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Drain everything delivered so far.
    pub fn try_iter(&self) -> TryIter<'_, T> {
        self.rx.try_iter()
    }

    /// Drain and keep only the most recent message.
    pub fn latest(&self) -> Option<T> {
        self.rx.try_iter().last()
    }
}

#[derive(Debug)]
pub struct Subscribers<T> {
    next_id: u64,
    senders: Vec<(SubscriptionId, Sender<T>)>,
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            senders: Vec::new(),
        }
    }
}

impl<T: Clone> Subscribers<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Subscription<T> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.senders.push((id, tx));
        Subscription { id, rx }
    }

    /// Returns false if the id was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.senders.len();
        self.senders.retain(|(existing, _)| *existing != id);
        self.senders.len() != before
    }

    /// Deliver one message to every live subscriber.
    pub fn notify(&mut self, message: T) {
        self.senders
            .retain(|(_, tx)| tx.send(message.clone()).is_ok());
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }

    pub fn clear(&mut self) {
        self.senders.clear();
    }
}
