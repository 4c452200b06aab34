// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Atomic value cell for parameter storage.
//!
//! The realtime thread writes a parameter's value while observers on other
//! threads read it. Storing the `f64` bit pattern in an `AtomicU64` lets both
//! sides proceed without locking and without torn reads.
//!
//! # Usage
//!
//! ```
//! use paramsync_api::AtomicF64;
//!
//! let gain = AtomicF64::new(1.0);
//!
//! // Realtime thread applies the new value
//! gain.publish(0.5);
//!
//! // GUI thread reads it back
//! assert_eq!(gain.observe(), 0.5);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// An `f64` stored as its bit pattern.
///
/// `publish`/`observe` pair up as release/acquire so a reader that sees a
/// value also sees everything the writer did before publishing it. `get` and
/// `set` are relaxed, for cells nobody synchronizes through.
#[derive(Debug)]
pub struct AtomicF64(AtomicU64);

impl AtomicF64 {
    /// Create a cell holding `value`.
    pub const fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    /// Relaxed load.
    #[inline]
    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    /// Relaxed store.
    #[inline]
    pub fn set(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }

    /// Store `value` with release ordering.
    #[inline]
    pub fn publish(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Release);
    }

    /// Load with acquire ordering.
    #[inline]
    pub fn observe(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Acquire))
    }
}
