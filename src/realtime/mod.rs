// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Cross-thread event dispatch for parameter changes.
//!
//! A change requested on any thread becomes an [`Event`]. The realtime
//! [`EventDispatcher`] is polled by the audio thread, which applies the
//! change and notifies realtime observers. The event is then relayed to the
//! async dispatcher, drained by an [`EventDispatcherThread`], which notifies
//! everyone else.
//!
//! # Real-Time Safety
//!
//! On the audio thread, processing:
//! - Never waits on the dispatcher thread
//! - Only takes locks held for a push or a buffer swap
//! - Reuses queue buffers between cycles instead of allocating
//!
//! Observer callbacks run inline and are responsible for their own cost.

pub mod dispatcher;
pub mod dispatcher_thread;
pub mod event;

pub use dispatcher::EventDispatcher;
pub use dispatcher_thread::EventDispatcherThread;
pub use event::{Event, EventPayload};
