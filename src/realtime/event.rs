// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parameter change requests passed between dispatchers.

use paramsync_api::{Affinity, ObserverRef, Parameter};
use std::sync::Arc;

/// New value carried by an [`Event`].
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    /// Value in the parameter's own domain.
    Value(f64),
    /// Value in the 0.0-1.0 scaled domain.
    Scaled(f64),
    /// Replacement data for blob and text parameters.
    Data(Vec<u8>),
}

/// A single request to change one parameter.
///
/// An event is consumed in two passes: the realtime dispatcher applies it
/// and notifies realtime observers, then hands the same event to the async
/// dispatcher, which notifies async observers. The payload is applied once.
pub struct Event {
    parameter: Arc<Parameter>,
    payload: EventPayload,
    /// Observer that originated the change; it is skipped in both passes.
    sender: Option<ObserverRef>,
}

impl Event {
    pub fn new(parameter: Arc<Parameter>, payload: EventPayload, sender: Option<ObserverRef>) -> Self {
        Self {
            parameter,
            payload,
            sender,
        }
    }

    pub fn value(parameter: Arc<Parameter>, value: f64, sender: Option<ObserverRef>) -> Self {
        Self::new(parameter, EventPayload::Value(value), sender)
    }

    pub fn scaled(parameter: Arc<Parameter>, value: f64, sender: Option<ObserverRef>) -> Self {
        Self::new(parameter, EventPayload::Scaled(value), sender)
    }

    pub fn data(parameter: Arc<Parameter>, data: Vec<u8>, sender: Option<ObserverRef>) -> Self {
        Self::new(parameter, EventPayload::Data(data), sender)
    }

    pub fn parameter(&self) -> &Arc<Parameter> {
        &self.parameter
    }

    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    pub fn sender(&self) -> Option<&ObserverRef> {
        self.sender.as_ref()
    }

    /// Write the payload into the parameter. Realtime pass only.
    pub(crate) fn apply(&self) {
        match &self.payload {
            EventPayload::Value(value) => self.parameter.apply_value(*value),
            EventPayload::Scaled(value) => self.parameter.apply_scaled_value(*value),
            EventPayload::Data(data) => self.parameter.apply_data(data),
        }
    }

    /// Notify the parameter's observers registered for `affinity`.
    pub(crate) fn notify(&self, affinity: Affinity) {
        self.parameter
            .notify_observers(self.sender.as_ref(), affinity);
    }
}

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("parameter", &self.parameter.name())
            .field("payload", &self.payload)
            .field("has_sender", &self.sender.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paramsync_api::ParameterObserver;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter {
        affinity: Affinity,
        count: AtomicUsize,
    }

    impl ParameterObserver for Counter {
        fn affinity(&self) -> Affinity {
            self.affinity
        }

        fn on_parameter_updated(&self, _parameter: &Parameter) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn counter(affinity: Affinity) -> Arc<Counter> {
        Arc::new(Counter {
            affinity,
            count: AtomicUsize::new(0),
        })
    }

    #[test]
    fn test_apply_each_payload() {
        let cutoff = Arc::new(Parameter::float("cutoff", 0.0, 100.0, 0.0));
        Event::value(Arc::clone(&cutoff), 40.0, None).apply();
        assert_eq!(cutoff.value(), 40.0);

        Event::scaled(Arc::clone(&cutoff), 0.25, None).apply();
        assert_eq!(cutoff.value(), 25.0);

        let state = Arc::new(Parameter::blob("state", Vec::new()));
        Event::data(Arc::clone(&state), vec![9, 8, 7], None).apply();
        assert_eq!(state.data(), vec![9, 8, 7]);
    }

    #[test]
    fn test_apply_does_not_notify() {
        let p = Arc::new(Parameter::boolean("test", false));
        let rt = counter(Affinity::Realtime);
        p.add_observer(rt.clone());

        Event::value(Arc::clone(&p), 1.0, None).apply();
        assert!(p.bool_value());
        assert_eq!(rt.count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_notify_skips_sender_and_other_affinity() {
        let p = Arc::new(Parameter::boolean("test", false));
        let rt = counter(Affinity::Realtime);
        let gui = counter(Affinity::Async);
        let gui_ref: ObserverRef = gui.clone();
        p.add_observer(rt.clone());
        p.add_observer(gui_ref.clone());

        let event = Event::value(Arc::clone(&p), 1.0, Some(gui_ref));
        event.notify(Affinity::Realtime);
        event.notify(Affinity::Async);

        assert_eq!(rt.count.load(Ordering::SeqCst), 1);
        assert_eq!(gui.count.load(Ordering::SeqCst), 0);
    }
}
