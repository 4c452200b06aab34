// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Event queues for the realtime and async dispatch contexts.
//!
//! # Flow
//!
//! ```text
//! set() on any thread
//!        ↓
//! [realtime EventDispatcher]   polled by process_realtime_events()
//!        ↓ apply + notify realtime observers
//!        ↓ relay (same Arc<Event>)
//! [async EventDispatcher]      drained by the dispatcher thread
//!        ↓ notify async observers
//!      drop
//! ```
//!
//! # Wakeups
//!
//! `notify()` is sticky: it sets a pending flag under the wakeup mutex and
//! `wait()` only blocks while that flag is clear. A notification that lands
//! before the consumer reaches `wait()` is therefore never lost.
//!
//! The wakeup mutex is never held while events are processed, so the
//! realtime thread only contends with the consumer for the few instructions
//! it takes to flip the flag.

use super::event::Event;
use paramsync_api::Affinity;
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// FIFO queue of pending events for one dispatch context.
pub struct EventDispatcher {
    affinity: Affinity,
    /// Events waiting for the next `process()` call.
    queue: Mutex<Vec<Arc<Event>>>,
    /// Batch currently being processed. Swapped with `queue` so both
    /// buffers keep their capacity between cycles.
    batch: Mutex<Vec<Arc<Event>>>,
    /// Where processed events go next (realtime mode only).
    relay: Option<Arc<EventDispatcher>>,
    killed: AtomicBool,
    /// Set by `notify()`, cleared when `wait()` returns.
    wakeup: Mutex<bool>,
    condvar: Condvar,
}

impl EventDispatcher {
    fn with_affinity(affinity: Affinity, relay: Option<Arc<EventDispatcher>>) -> Self {
        Self {
            affinity,
            queue: Mutex::new(Vec::new()),
            batch: Mutex::new(Vec::new()),
            relay,
            killed: AtomicBool::new(false),
            wakeup: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    /// Create a dispatcher whose consumer blocks in `wait()`.
    pub fn asynchronous() -> Self {
        Self::with_affinity(Affinity::Async, None)
    }

    /// Create a polled dispatcher that relays processed events to `relay`.
    pub fn realtime(relay: Arc<EventDispatcher>) -> Self {
        debug_assert_eq!(relay.affinity(), Affinity::Async);
        Self::with_affinity(Affinity::Realtime, Some(relay))
    }

    pub fn affinity(&self) -> Affinity {
        self.affinity
    }

    /// Append an event. Safe from any thread; never waits on the consumer
    /// beyond the queue push itself.
    pub fn add(&self, event: Arc<Event>) {
        self.queue.lock().push(event);
    }

    /// Number of events waiting for the next `process()` call.
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Wake the consumer, or make its next `wait()` return immediately.
    pub fn notify(&self) {
        let mut pending = self.wakeup.lock();
        *pending = true;
        self.condvar.notify_one();
    }

    /// Block until `notify()` or `kill()` is called.
    ///
    /// Returns at once if a notification is already pending or the
    /// dispatcher has been killed. Only meaningful for async dispatchers;
    /// realtime dispatchers are polled.
    pub fn wait(&self) {
        debug_assert_eq!(self.affinity, Affinity::Async, "realtime dispatchers never wait");
        let mut pending = self.wakeup.lock();
        while !*pending && !self.is_killed() {
            self.condvar.wait(&mut pending);
        }
        *pending = false;
    }

    /// Detach every queued event and handle it in enqueue order.
    ///
    /// Realtime: apply, notify realtime observers, relay to the async
    /// dispatcher. Async: notify async observers, then drop the event.
    /// Events added while this runs (including by observers) are left for
    /// the next call. Returns the number of events handled.
    ///
    /// Once the relay target has been killed, processed events are dropped
    /// instead of relayed, since nothing will drain them.
    ///
    /// # Panics
    ///
    /// Observer panics propagate. The event being handled keeps whatever was
    /// already applied, and the rest of the detached batch is discarded. The
    /// queue itself stays usable.
    pub fn process(&self) -> usize {
        let mut batch = self.batch.lock();
        std::mem::swap(&mut *self.queue.lock(), &mut *batch);

        let count = batch.len();
        match (self.affinity, &self.relay) {
            (Affinity::Realtime, relay) => {
                for event in batch.drain(..) {
                    event.apply();
                    event.notify(Affinity::Realtime);
                    if let Some(relay) = relay.as_ref().filter(|r| !r.is_killed()) {
                        relay.add(event);
                        relay.notify();
                    }
                }
            }
            (Affinity::Async, _) => {
                for event in batch.drain(..) {
                    event.notify(Affinity::Async);
                }
            }
        }
        count
    }

    /// Mark the dispatcher dead and wake any waiting consumer. Idempotent.
    pub fn kill(&self) {
        self.killed.store(true, Ordering::Release);
        let _guard = self.wakeup.lock();
        self.condvar.notify_all();
    }

    pub fn is_killed(&self) -> bool {
        self.killed.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("affinity", &self.affinity)
            .field("pending", &self.pending())
            .field("killed", &self.is_killed())
            .finish()
    }
}
