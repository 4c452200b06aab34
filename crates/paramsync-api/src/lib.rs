// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! paramsync parameter API
//!
//! Parameter and observer types shared between a parameter set and the code
//! that hosts it. A [`Parameter`] owns its value and an ordered list of
//! [`ParameterObserver`]s; each observer declares an [`Affinity`] that tells
//! a concurrent parameter set which thread it must be called on.
//!
//! # Example Observer
//!
//! ```
//! use paramsync_api::*;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! struct MeterRefresh {
//!     updates: AtomicUsize,
//! }
//!
//! impl ParameterObserver for MeterRefresh {
//!     fn affinity(&self) -> Affinity {
//!         Affinity::Async
//!     }
//!
//!     fn on_parameter_updated(&self, _parameter: &Parameter) {
//!         self.updates.fetch_add(1, Ordering::Relaxed);
//!     }
//! }
//!
//! let gain = Parameter::decibel("Gain", -60.0, 12.0, 0.0);
//! let observer = Arc::new(MeterRefresh { updates: AtomicUsize::new(0) });
//! gain.add_observer(observer.clone());
//!
//! gain.set_value(-3.0, None);
//! assert_eq!(observer.updates.load(Ordering::Relaxed), 1);
//! ```

#![warn(missing_docs)]

pub mod atomic;
pub mod observer;
pub mod parameter;
pub mod scale;

pub use atomic::AtomicF64;
pub use observer::{same_observer, Affinity, ObserverRef, ParameterObserver};
pub use parameter::{make_safe_name, Parameter, ParameterKind};
pub use scale::{db_to_gain, denormalize, normalize, ParameterCurve};
