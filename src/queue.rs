use crate::{Anomaly, SignalConfig, SignalEvent};

use parking_lot::Mutex;
use std::{collections::VecDeque, num::NonZero};
use tokio::sync::Notify;
use tracing::warn;

#[derive(Debug)]
struct Inner {
    events: VecDeque<SignalEvent>,
    closed: bool,
    overflowed: u64,
}

/// Bounded multi-producer event queue with a drop-oldest policy.
///
/// Producers never wait: when the queue is full the oldest unconsumed
/// event is discarded and reported as [`Anomaly::EventOverflow`].
/// Consumers await events with [`recv`](Self::recv).
///
/// Share it between tasks behind an [`Arc`](std::sync::Arc).
///
/// # Example
///
/// ```
/// use quantedge_signals::EventQueue;
/// use std::num::NonZero;
///
/// let queue = EventQueue::new(NonZero::new(16).unwrap());
/// assert!(queue.is_empty());
/// queue.close();
/// assert!(queue.is_closed());
/// ```
#[derive(Debug)]
pub struct EventQueue {
    inner: Mutex<Inner>,
    notify: Notify,
    capacity: usize,
}

impl EventQueue {
    #[must_use]
    pub fn new(capacity: NonZero<usize>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                events: VecDeque::with_capacity(capacity.get()),
                closed: false,
                overflowed: 0,
            }),
            notify: Notify::new(),
            capacity: capacity.get(),
        }
    }

    /// Queue sized by [`SignalConfig::event_buffer_capacity`].
    #[must_use]
    pub fn from_config(config: &SignalConfig) -> Self {
        Self::new(config.event_buffer_capacity())
    }

    /// Enqueues `event`. Returns the overflow anomaly if the oldest event
    /// had to be dropped to make room.
    ///
    /// Events pushed after [`close`](Self::close) are discarded silently.
    pub fn push(&self, event: SignalEvent) -> Option<Anomaly> {
        let anomaly = {
            let mut inner = self.inner.lock();
            if inner.closed {
                return None;
            }

            let dropped = if inner.events.len() >= self.capacity {
                inner.overflowed += 1;
                inner.events.pop_front()
            } else {
                None
            };
            inner.events.push_back(event);

            dropped.map(|dropped| Anomaly::EventOverflow {
                dropped: Box::new(dropped),
            })
        };

        self.notify.notify_one();

        if let Some(anomaly) = &anomaly {
            warn!(%anomaly, capacity = self.capacity, "event queue overflow");
        }

        anomaly
    }

    /// Pops the oldest event without waiting.
    #[must_use]
    pub fn try_recv(&self) -> Option<SignalEvent> {
        self.inner.lock().events.pop_front()
    }

    /// Waits for the next event. Returns `None` once the queue is closed
    /// and drained.
    pub async fn recv(&self) -> Option<SignalEvent> {
        loop {
            let notified = self.notify.notified();

            {
                let mut inner = self.inner.lock();
                if let Some(event) = inner.events.pop_front() {
                    return Some(event);
                }
                if inner.closed {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Stops accepting events and wakes every waiting consumer. Queued
    /// events can still be received.
    pub fn close(&self) {
        self.inner.lock().closed = true;
        self.notify.notify_waiters();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().events.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of events dropped to overflow so far.
    #[must_use]
    pub fn overflowed(&self) -> u64 {
        self.inner.lock().overflowed
    }
}
