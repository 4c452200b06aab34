// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! paramsync - thread-safe parameter sets for audio plugins.
//!
//! Parameters may be changed from any thread but are only ever mutated on
//! the realtime (audio) thread. Observers declare whether they want to hear
//! about changes on the realtime thread or on a background thread, and each
//! one is called exactly once per change, never for changes it sent itself.
//!
//! See [`ConcurrentParameterSet`] for the entry point.

pub mod concurrent;
pub mod config;
pub mod error;
pub mod parameter_set;
pub mod realtime;

pub use concurrent::{ConcurrentParameterSet, EventScheduler, ParameterRef};
pub use config::{ConfigError, DispatcherConfig};
pub use error::ParamSetError;
pub use parameter_set::ParameterSet;

pub use paramsync_api::{
    Affinity, ObserverRef, Parameter, ParameterCurve, ParameterKind, ParameterObserver,
};
