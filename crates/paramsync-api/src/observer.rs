// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parameter observers and their dispatch affinity.

use crate::parameter::Parameter;
use arc_swap::ArcSwap;
use std::sync::Arc;

/// The dispatch context an observer expects to be called on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Affinity {
    /// Called on the realtime thread, right after the value is applied.
    Realtime,
    /// Called on the background dispatcher thread, after the realtime pass.
    Async,
}

impl Affinity {
    /// Whether this is the realtime context.
    #[inline]
    pub fn is_realtime(self) -> bool {
        matches!(self, Affinity::Realtime)
    }
}

/// Receives notifications when a parameter's value changes.
///
/// Implementations must not block inside `on_parameter_updated`, and a
/// realtime observer must not call back into `set` for the same parameter.
/// The affinity is expected to stay fixed for the lifetime of the observer.
pub trait ParameterObserver: Send + Sync {
    /// Which dispatch context this observer is invoked on.
    fn affinity(&self) -> Affinity;

    /// Called once per applied change, on the thread matching `affinity`.
    fn on_parameter_updated(&self, parameter: &Parameter);
}

/// Shared handle to a registered observer.
pub type ObserverRef = Arc<dyn ParameterObserver>;

/// Returns true if both handles point at the same observer instance.
///
/// Only the data pointer is compared; vtable pointers for the same type can
/// differ between codegen units.
#[inline]
pub fn same_observer(a: &ObserverRef, b: &ObserverRef) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

/// Ordered observer list with lock-free reads.
///
/// Readers (the dispatch passes) load a snapshot without locking. Writers
/// replace the whole list, so registration never blocks a notification pass
/// that is already running; that pass simply finishes on the old snapshot.
pub(crate) struct ObserverList {
    inner: ArcSwap<Vec<ObserverRef>>,
}

impl ObserverList {
    pub(crate) fn new() -> Self {
        Self {
            inner: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Append an observer. Returns false if it is already registered.
    pub(crate) fn add(&self, observer: ObserverRef) -> bool {
        let mut added = false;
        self.inner.rcu(|current| {
            if current.iter().any(|o| same_observer(o, &observer)) {
                added = false;
                return Arc::clone(current);
            }
            added = true;
            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().cloned());
            next.push(Arc::clone(&observer));
            Arc::new(next)
        });
        added
    }

    /// Remove an observer. Returns false if it was not registered.
    pub(crate) fn remove(&self, observer: &ObserverRef) -> bool {
        let mut removed = false;
        self.inner.rcu(|current| {
            removed = current.iter().any(|o| same_observer(o, observer));
            let next: Vec<ObserverRef> = current
                .iter()
                .filter(|o| !same_observer(o, observer))
                .cloned()
                .collect();
            Arc::new(next)
        });
        removed
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.load().len()
    }

    /// Invoke every observer matching `affinity`, skipping `sender`.
    ///
    /// Observers are visited in registration order.
    pub(crate) fn notify(
        &self,
        parameter: &Parameter,
        sender: Option<&ObserverRef>,
        affinity: Affinity,
    ) {
        let observers = self.inner.load();
        for observer in observers.iter() {
            if observer.affinity() != affinity {
                continue;
            }
            if let Some(sender) = sender {
                if same_observer(observer, sender) {
                    continue;
                }
            }
            observer.on_parameter_updated(parameter);
        }
    }

    /// Invoke every observer except `sender`, regardless of affinity.
    pub(crate) fn notify_all(&self, parameter: &Parameter, sender: Option<&ObserverRef>) {
        let observers = self.inner.load();
        for observer in observers.iter() {
            if sender.is_some_and(|s| same_observer(observer, s)) {
                continue;
            }
            observer.on_parameter_updated(parameter);
        }
    }
}

impl Default for ObserverList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverList")
            .field("len", &self.len())
            .finish()
    }
}
