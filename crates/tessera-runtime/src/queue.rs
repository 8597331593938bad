//! Bounded multi-producer multi-consumer queue.

use std::fmt;

use parking_lot::{Condvar, Mutex};
use thiserror::Error;

#[derive(Error, PartialEq, Eq)]
pub enum SendError<T> {
    #[error("queue is shut down")]
    Shutdown(T),
}

impl<T> SendError<T> {
    pub fn into_inner(self) -> T {
        match self {
            SendError::Shutdown(item) => item,
        }
    }
}

impl<T> fmt::Debug for SendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Shutdown(..)")
    }
}

#[derive(Error, PartialEq, Eq)]
pub enum TrySendError<T> {
    #[error("queue is full")]
    Full(T),
    #[error("queue is shut down")]
    Shutdown(T),
}

impl<T> TrySendError<T> {
    pub fn into_inner(self) -> T {
        match self {
            TrySendError::Full(item) | TrySendError::Shutdown(item) => item,
        }
    }
}

impl<T> fmt::Debug for TrySendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrySendError::Full(_) => f.write_str("Full(..)"),
            TrySendError::Shutdown(_) => f.write_str("Shutdown(..)"),
        }
    }
}

#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
pub enum TryRecvError {
    #[error("queue is empty")]
    Empty,
    #[error("queue is shut down and drained")]
    Closed,
}

struct Ring<T> {
    slots: Box<[Option<T>]>,
    head: usize,
    len: usize,
    shutdown: bool,
}

impl<T> Ring<T> {
    fn push(&mut self, item: T) {
        let cap = self.slots.len();
        let tail = (self.head + self.len) % cap;
        debug_assert!(self.slots[tail].is_none());
        self.slots[tail] = Some(item);
        self.len += 1;
    }

    fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let item = self.slots[self.head].take();
        self.head = (self.head + 1) % self.slots.len();
        self.len -= 1;
        item
    }

    fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }
}

/// Fixed-capacity FIFO shared between threads. Items queued before
/// [`WorkQueue::shutdown`] remain deliverable.
pub struct WorkQueue<T> {
    ring: Mutex<Ring<T>>,
    not_empty: Condvar,
    not_full: Condvar,
}

impl<T> WorkQueue<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            ring: Mutex::new(Ring {
                slots: (0..capacity).map(|_| None).collect(),
                head: 0,
                len: 0,
                shutdown: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        }
    }

    /// Blocks while the queue is full.
    pub fn send(&self, item: T) -> Result<(), SendError<T>> {
        let mut ring = self.ring.lock();
        loop {
            if ring.shutdown {
                return Err(SendError::Shutdown(item));
            }
            if !ring.is_full() {
                ring.push(item);
                drop(ring);
                self.not_empty.notify_one();
                return Ok(());
            }
            self.not_full.wait(&mut ring);
        }
    }

    pub fn try_send(&self, item: T) -> Result<(), TrySendError<T>> {
        let mut ring = self.ring.lock();
        if ring.shutdown {
            return Err(TrySendError::Shutdown(item));
        }
        if ring.is_full() {
            return Err(TrySendError::Full(item));
        }
        ring.push(item);
        drop(ring);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Blocks while the queue is empty. `None` once shut down and drained.
    pub fn recv(&self) -> Option<T> {
        let mut ring = self.ring.lock();
        loop {
            if let Some(item) = ring.pop() {
                drop(ring);
                self.not_full.notify_one();
                return Some(item);
            }
            if ring.shutdown {
                return None;
            }
            self.not_empty.wait(&mut ring);
        }
    }

    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        let mut ring = self.ring.lock();
        match ring.pop() {
            Some(item) => {
                drop(ring);
                self.not_full.notify_one();
                Ok(item)
            }
            None if ring.shutdown => Err(TryRecvError::Closed),
            None => Err(TryRecvError::Empty),
        }
    }

    /// Rejects further sends and wakes every waiter.
    pub fn shutdown(&self) {
        let mut ring = self.ring.lock();
        if ring.shutdown {
            return;
        }
        ring.shutdown = true;
        drop(ring);
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    pub fn is_shutdown(&self) -> bool {
        self.ring.lock().shutdown
    }

    pub fn len(&self) -> usize {
        self.ring.lock().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.ring.lock().slots.len()
    }
}
