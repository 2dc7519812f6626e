//! Change fan-out
//!
//! Every subscriber owns the receiving half of an unbounded channel.
//! Dropping the subscription closes it; closed senders are pruned on the
//! next broadcast.

use std::cell::RefCell;

use smol::channel::{self, Receiver, Sender, TryRecvError};

/// Broadcasts values to live subscribers
#[derive(Debug)]
pub struct Notifier<T> {
    senders: RefCell<Vec<Sender<T>>>,
}

impl<T: Clone> Notifier<T> {
    pub fn new() -> Self {
        Self {
            senders: RefCell::new(Vec::new()),
        }
    }
    
    pub fn subscribe(&self) -> Subscription<T> {
        let (tx, rx) = channel::unbounded();
        self.senders.borrow_mut().push(tx);
        Subscription { rx }
    }
    
    /// Send to every live subscriber, returns how many received it
    pub fn broadcast(&self, value: &T) -> usize {
        let mut senders = self.senders.borrow_mut();
        senders.retain(|tx| tx.try_send(value.clone()).is_ok());
        senders.len()
    }
    
    pub fn subscriber_count(&self) -> usize {
        let mut senders = self.senders.borrow_mut();
        senders.retain(|tx| !tx.is_closed());
        senders.len()
    }
}

impl<T: Clone> Default for Notifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving end of a [`Notifier`]; unsubscribes on drop
#[derive(Debug)]
pub struct Subscription<T> {
    rx: Receiver<T>,
}

impl<T> Subscription<T> {
    /// Next queued value without waiting
    pub fn try_next(&self) -> Option<T> {
        match self.rx.try_recv() {
            Ok(value) => Some(value),
            Err(TryRecvError::Empty | TryRecvError::Closed) => None,
        }
    }
    
    /// Wait for the next value; `None` once the source is gone
    pub async fn next(&self) -> Option<T> {
        self.rx.recv().await.ok()
    }
    
    /// Drain everything queued so far
    pub fn drain(&self) -> Vec<T> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
    
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}
