// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parameter set that can be written from any thread.
//!
//! # Architecture
//!
//! ```text
//! [GUI / host / other threads]
//!          ↓ set(), set_scaled(), set_data()
//! [EventScheduler] → realtime EventDispatcher
//!                          ↓ process_realtime_events() on the audio thread
//!                    apply + realtime observers
//!                          ↓ relay
//!                    async EventDispatcher
//!                          ↓ EventDispatcherThread
//!                    async observers
//! ```
//!
//! # Usage
//!
//! ```
//! use paramsync::{ConcurrentParameterSet, Parameter};
//!
//! let mut set = ConcurrentParameterSet::new()?;
//! let gain = set.add(Parameter::decibel("Gain", -60.0, 12.0, 0.0)).unwrap();
//!
//! // GUI thread requests a change
//! set.set("Gain", -6.0, None);
//!
//! // Audio callback, once per buffer
//! set.process_realtime_events();
//! assert_eq!(gain.value(), -6.0);
//! # Ok::<(), paramsync::ParamSetError>(())
//! ```

use crate::config::DispatcherConfig;
use crate::error::ParamSetError;
use crate::parameter_set::ParameterSet;
use crate::realtime::{Event, EventDispatcher, EventDispatcherThread};
use paramsync_api::{ObserverRef, Parameter};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Routing policy for newly created events.
pub trait EventScheduler {
    /// Queue an event for its first (realtime) pass.
    fn schedule_event(&self, event: Event);
}

/// How a `set*` call names its target parameter.
#[derive(Debug, Clone, Copy)]
pub enum ParameterRef<'a> {
    /// A parameter handle returned by `add`.
    Handle(&'a Arc<Parameter>),
    /// A parameter name; punctuation and spaces are ignored.
    Name(&'a str),
    /// Position in the set.
    Index(usize),
}

impl<'a> From<&'a Arc<Parameter>> for ParameterRef<'a> {
    fn from(parameter: &'a Arc<Parameter>) -> Self {
        ParameterRef::Handle(parameter)
    }
}

impl<'a> From<&'a str> for ParameterRef<'a> {
    fn from(name: &'a str) -> Self {
        ParameterRef::Name(name)
    }
}

impl<'a> From<&'a String> for ParameterRef<'a> {
    fn from(name: &'a String) -> Self {
        ParameterRef::Name(name)
    }
}

impl From<usize> for ParameterRef<'_> {
    fn from(index: usize) -> Self {
        ParameterRef::Index(index)
    }
}

/// A parameter set whose values are only ever mutated on the realtime
/// thread.
///
/// `set`, `set_scaled` and `set_data` may be called from any thread; they
/// queue the change and return. The host calls
/// [`process_realtime_events`](Self::process_realtime_events) once per audio
/// buffer to apply queued changes and notify realtime observers. Async
/// observers are notified afterwards on a dedicated background thread.
///
/// Adding or clearing parameters needs `&mut self`, so the container can
/// never change underneath a running dispatch. Register observers before
/// sharing the set; registration during dispatch is up to the caller to
/// synchronize.
///
/// Dropping the set stops the background thread before any parameter is
/// released. Changes still waiting in the async queue at that point are
/// discarded.
///
/// A panicking async observer ends the background thread. From then on
/// realtime processing continues as before, but changes are no longer
/// queued for async observers; see
/// [`is_dispatcher_running`](Self::is_dispatcher_running).
pub struct ConcurrentParameterSet {
    parameters: ParameterSet,
    realtime_dispatcher: EventDispatcher,
    async_dispatcher: Arc<EventDispatcher>,
    dispatcher_thread: EventDispatcherThread,
}

impl ConcurrentParameterSet {
    /// Create an empty set with the default dispatcher configuration.
    pub fn new() -> Result<Self, ParamSetError> {
        Self::with_config(&DispatcherConfig::default())
    }

    /// Create an empty set, loading the dispatcher configuration from a
    /// TOML file.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, ParamSetError> {
        let config = DispatcherConfig::load(path)?;
        Self::with_config(&config)
    }

    /// Create an empty set and start its dispatcher thread.
    pub fn with_config(config: &DispatcherConfig) -> Result<Self, ParamSetError> {
        let async_dispatcher = Arc::new(EventDispatcher::asynchronous());
        let realtime_dispatcher = EventDispatcher::realtime(Arc::clone(&async_dispatcher));
        let dispatcher_thread =
            EventDispatcherThread::spawn(Arc::clone(&async_dispatcher), config)?;

        Ok(Self {
            parameters: ParameterSet::new(),
            realtime_dispatcher,
            async_dispatcher,
            dispatcher_thread,
        })
    }

    /// Add a parameter. Returns `None` if the name is already taken.
    pub fn add(&mut self, parameter: Parameter) -> Option<Arc<Parameter>> {
        self.parameters.add(parameter)
    }

    /// Remove every parameter.
    ///
    /// Changes already queued keep their parameter alive until they have
    /// been delivered.
    pub fn clear(&mut self) {
        self.parameters.clear();
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Parameter>> {
        self.parameters.get(name)
    }

    pub fn get_index(&self, index: usize) -> Option<&Arc<Parameter>> {
        self.parameters.get_index(index)
    }

    pub fn size(&self) -> usize {
        self.parameters.size()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Parameter>> {
        self.parameters.iter()
    }

    /// The underlying container.
    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    /// Queue a new value for a parameter.
    ///
    /// The value is applied on the next
    /// [`process_realtime_events`](Self::process_realtime_events). `sender`
    /// is not notified about its own change. Unknown names and indices are
    /// ignored.
    pub fn set<'a>(
        &self,
        target: impl Into<ParameterRef<'a>>,
        value: f64,
        sender: Option<&ObserverRef>,
    ) {
        if let Some(parameter) = self.resolve(target.into()) {
            self.schedule_event(Event::value(Arc::clone(parameter), value, sender.cloned()));
        }
    }

    /// Queue a new 0.0-1.0 scaled value for a parameter.
    pub fn set_scaled<'a>(
        &self,
        target: impl Into<ParameterRef<'a>>,
        value: f64,
        sender: Option<&ObserverRef>,
    ) {
        if let Some(parameter) = self.resolve(target.into()) {
            self.schedule_event(Event::scaled(Arc::clone(parameter), value, sender.cloned()));
        }
    }

    /// Queue new data for a blob or text parameter.
    ///
    /// Ignored for numeric parameters.
    pub fn set_data<'a>(
        &self,
        target: impl Into<ParameterRef<'a>>,
        data: &[u8],
        sender: Option<&ObserverRef>,
    ) {
        let Some(parameter) = self.resolve(target.into()) else {
            return;
        };
        if !parameter.is_data_capable() {
            debug!("Ignoring data for numeric parameter '{}'", parameter.name());
            return;
        }
        self.schedule_event(Event::data(Arc::clone(parameter), data.to_vec(), sender.cloned()));
    }

    /// Apply queued changes and notify realtime observers.
    ///
    /// Call this from the audio thread once per processing cycle. It never
    /// waits on the background thread. Returns the number of changes applied.
    ///
    /// If a realtime observer panics, the panic propagates and the changes
    /// still pending in this cycle are discarded. Later calls work normally.
    pub fn process_realtime_events(&self) -> usize {
        self.realtime_dispatcher.process()
    }

    /// Number of changes waiting for the next realtime cycle.
    pub fn pending_realtime_events(&self) -> usize {
        self.realtime_dispatcher.pending()
    }

    /// Number of applied changes waiting to reach async observers.
    pub fn pending_async_events(&self) -> usize {
        self.async_dispatcher.pending()
    }

    /// Whether the background thread serving async observers is alive.
    pub fn is_dispatcher_running(&self) -> bool {
        self.dispatcher_thread.is_running()
    }

    fn resolve<'a>(&'a self, target: ParameterRef<'a>) -> Option<&'a Arc<Parameter>> {
        let parameter = match target {
            ParameterRef::Handle(parameter) => Some(parameter),
            ParameterRef::Name(name) => self.parameters.get(name),
            ParameterRef::Index(index) => self.parameters.get_index(index),
        };
        if parameter.is_none() {
            debug!("Ignoring change for unknown parameter {:?}", target);
        }
        parameter
    }
}

impl EventScheduler for ConcurrentParameterSet {
    /// Every externally requested change starts on the realtime dispatcher;
    /// the async dispatcher only ever receives relayed events.
    fn schedule_event(&self, event: Event) {
        self.realtime_dispatcher.add(Arc::new(event));
    }
}

impl Drop for ConcurrentParameterSet {
    fn drop(&mut self) {
        self.dispatcher_thread.shutdown();
    }
}

impl std::fmt::Debug for ConcurrentParameterSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrentParameterSet")
            .field("parameters", &self.parameters.size())
            .field("realtime_dispatcher", &self.realtime_dispatcher)
            .field("async_dispatcher", &self.async_dispatcher)
            .field("dispatcher_thread", &self.dispatcher_thread.name())
            .finish()
    }
}
