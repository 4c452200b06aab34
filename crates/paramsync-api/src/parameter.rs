// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parameter values, kinds and the apply/notify surface used by dispatchers.

use crate::atomic::AtomicF64;
use crate::observer::{Affinity, ObserverList, ObserverRef};
use crate::scale::{db_to_gain, denormalize, normalize, ParameterCurve};
use parking_lot::RwLock;
use tracing::trace;

/// The value domain of a parameter.
///
/// The set of kinds is closed so every apply path is matched exhaustively.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterKind {
    /// On/off switch stored as 0.0 or 1.0.
    Boolean,
    /// Continuous value in `min..=max`.
    Float {
        /// Minimum value.
        min: f64,
        /// Maximum value.
        max: f64,
        /// Mapping used for the scaled domain.
        curve: ParameterCurve,
    },
    /// Whole numbers in `min..=max`.
    Integer {
        /// Minimum value.
        min: i64,
        /// Maximum value.
        max: i64,
    },
    /// Gain in decibels, scaled linearly in dB.
    Decibel {
        /// Minimum gain in dB.
        min_db: f64,
        /// Maximum gain in dB.
        max_db: f64,
    },
    /// Opaque bytes. Numeric setters are ignored.
    Blob,
    /// UTF-8 text. Numeric setters are ignored.
    Text,
}

impl ParameterKind {
    /// Whether this kind stores data rather than a number.
    #[inline]
    pub fn is_data(&self) -> bool {
        matches!(self, ParameterKind::Blob | ParameterKind::Text)
    }

    /// Map a raw value into this kind's domain, or `None` if it has no
    /// numeric value.
    fn coerce(&self, value: f64) -> Option<f64> {
        match *self {
            ParameterKind::Boolean => Some(if value > 0.5 { 1.0 } else { 0.0 }),
            ParameterKind::Float { min, max, .. } => Some(clamp_to_range(value, min, max)),
            ParameterKind::Integer { min, max } => {
                Some(clamp_to_range(value.round(), min as f64, max as f64))
            }
            ParameterKind::Decibel { min_db, max_db } => {
                Some(clamp_to_range(value, min_db, max_db))
            }
            ParameterKind::Blob | ParameterKind::Text => None,
        }
    }

    fn to_scaled(&self, value: f64) -> f64 {
        match *self {
            ParameterKind::Boolean => value,
            ParameterKind::Float { min, max, curve } => normalize(value, min, max, curve),
            ParameterKind::Integer { min, max } => {
                normalize(value, min as f64, max as f64, ParameterCurve::Linear)
            }
            ParameterKind::Decibel { min_db, max_db } => {
                normalize(value, min_db, max_db, ParameterCurve::Linear)
            }
            ParameterKind::Blob | ParameterKind::Text => 0.0,
        }
    }

    fn from_scaled(&self, scaled: f64) -> Option<f64> {
        match *self {
            ParameterKind::Boolean => self.coerce(scaled),
            ParameterKind::Float { min, max, curve } => Some(denormalize(scaled, min, max, curve)),
            ParameterKind::Integer { min, max } => {
                let raw = denormalize(scaled, min as f64, max as f64, ParameterCurve::Linear);
                self.coerce(raw)
            }
            ParameterKind::Decibel { min_db, max_db } => {
                Some(denormalize(scaled, min_db, max_db, ParameterCurve::Linear))
            }
            ParameterKind::Blob | ParameterKind::Text => None,
        }
    }
}

/// Clamp without `f64::clamp`'s `min <= max` assertion. Bounds are taken in
/// either order.
fn clamp_to_range(value: f64, a: f64, b: f64) -> f64 {
    value.max(a.min(b)).min(a.max(b))
}

/// Return `(low, high)` regardless of argument order.
fn ordered<T: PartialOrd>(a: T, b: T) -> (T, T) {
    if b < a {
        (b, a)
    } else {
        (a, b)
    }
}

/// Strip everything but ASCII letters and digits from a parameter name.
///
/// Hosts frequently use parameter names as identifiers, so lookups are done
/// on this form.
pub fn make_safe_name(name: &str) -> String {
    name.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// A named, observable parameter.
///
/// The numeric value lives in an atomic cell and the data payload behind a
/// read/write lock, so observers on any thread can read the parameter while
/// the realtime thread owns mutation.
///
/// # Mutation
///
/// `apply_*` changes the value without notifying anyone; it is the step a
/// dispatcher runs on the realtime thread. `set_*` applies and then notifies
/// every observer on the calling thread, which is only appropriate for hosts
/// that use a single thread for everything.
pub struct Parameter {
    name: String,
    safe_name: String,
    unit: String,
    kind: ParameterKind,
    default_value: f64,
    value: AtomicF64,
    data: RwLock<Vec<u8>>,
    observers: ObserverList,
}

impl Parameter {
    fn with_kind(name: &str, kind: ParameterKind, default_value: f64) -> Self {
        let default_value = kind.coerce(default_value).unwrap_or(0.0);
        Self {
            name: name.to_string(),
            safe_name: make_safe_name(name),
            unit: String::new(),
            kind,
            default_value,
            value: AtomicF64::new(default_value),
            data: RwLock::new(Vec::new()),
            observers: ObserverList::new(),
        }
    }

    /// Create a boolean parameter.
    pub fn boolean(name: &str, default: bool) -> Self {
        Self::with_kind(name, ParameterKind::Boolean, if default { 1.0 } else { 0.0 })
    }

    /// Create a linear floating point parameter.
    ///
    /// Bounds given in reverse order are swapped.
    pub fn float(name: &str, min: f64, max: f64, default: f64) -> Self {
        let (min, max) = ordered(min, max);
        Self::with_kind(
            name,
            ParameterKind::Float {
                min,
                max,
                curve: ParameterCurve::Linear,
            },
            default,
        )
    }

    /// Create a floating point parameter with logarithmic scaling, e.g. a
    /// frequency.
    pub fn logarithmic(name: &str, min: f64, max: f64, default: f64) -> Self {
        let (min, max) = ordered(min, max);
        Self::with_kind(
            name,
            ParameterKind::Float {
                min,
                max,
                curve: ParameterCurve::Logarithmic,
            },
            default,
        )
    }

    /// Create an integer parameter.
    pub fn integer(name: &str, min: i64, max: i64, default: i64) -> Self {
        let (min, max) = ordered(min, max);
        Self::with_kind(name, ParameterKind::Integer { min, max }, default as f64)
    }

    /// Create a gain parameter in decibels.
    pub fn decibel(name: &str, min_db: f64, max_db: f64, default_db: f64) -> Self {
        let (min_db, max_db) = ordered(min_db, max_db);
        Self::with_kind(name, ParameterKind::Decibel { min_db, max_db }, default_db)
            .with_unit("dB")
    }

    /// Create a blob parameter with optional initial contents.
    pub fn blob(name: &str, data: Vec<u8>) -> Self {
        let parameter = Self::with_kind(name, ParameterKind::Blob, 0.0);
        *parameter.data.write() = data;
        parameter
    }

    /// Create a text parameter.
    pub fn text(name: &str, text: &str) -> Self {
        let parameter = Self::with_kind(name, ParameterKind::Text, 0.0);
        *parameter.data.write() = text.as_bytes().to_vec();
        parameter
    }

    /// Builder: set unit label.
    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = unit.to_string();
        self
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name reduced to ASCII letters and digits.
    pub fn safe_name(&self) -> &str {
        &self.safe_name
    }

    /// Unit label (may be empty).
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Value domain.
    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    /// Whether `apply_data` has any effect on this parameter.
    pub fn is_data_capable(&self) -> bool {
        self.kind.is_data()
    }

    /// Value the parameter was created with.
    pub fn default_value(&self) -> f64 {
        self.default_value
    }

    /// Current value in the parameter's own domain.
    #[inline]
    pub fn value(&self) -> f64 {
        self.value.observe()
    }

    /// Current value as a boolean (anything above 0.5 is true).
    #[inline]
    pub fn bool_value(&self) -> bool {
        self.value() > 0.5
    }

    /// Linear amplitude for a decibel parameter, with the bottom of the range
    /// treated as silence. `None` for other kinds.
    pub fn gain(&self) -> Option<f64> {
        match self.kind {
            ParameterKind::Decibel { min_db, .. } => Some(db_to_gain(self.value(), min_db)),
            _ => None,
        }
    }

    /// Current value mapped to 0.0-1.0.
    pub fn scaled_value(&self) -> f64 {
        self.kind.to_scaled(self.value())
    }

    /// Copy of the data payload.
    pub fn data(&self) -> Vec<u8> {
        self.data.read().clone()
    }

    /// Size of the data payload in bytes.
    pub fn data_size(&self) -> usize {
        self.data.read().len()
    }

    /// Text payload, with invalid UTF-8 replaced.
    pub fn text_value(&self) -> String {
        String::from_utf8_lossy(&self.data.read()).into_owned()
    }

    /// Human readable value, including the unit when one is set.
    pub fn display_text(&self) -> String {
        let text = match self.kind {
            ParameterKind::Boolean => self.bool_value().to_string(),
            ParameterKind::Float { .. } => format!("{:.2}", self.value()),
            ParameterKind::Integer { .. } => format!("{}", self.value() as i64),
            ParameterKind::Decibel { .. } => format!("{:.1}", self.value()),
            ParameterKind::Blob => {
                return if self.data_size() > 0 {
                    "(Data)".to_string()
                } else {
                    "(Null)".to_string()
                };
            }
            ParameterKind::Text => return self.text_value(),
        };
        if self.unit.is_empty() {
            text
        } else {
            format!("{} {}", text, self.unit)
        }
    }

    /// Store a value without notifying observers.
    ///
    /// Only the realtime apply step should call this while a concurrent
    /// parameter set owns the parameter. Ignored for data kinds.
    pub fn apply_value(&self, value: f64) {
        match self.kind.coerce(value) {
            Some(coerced) => self.value.publish(coerced),
            None => trace!("Ignoring numeric value for data parameter '{}'", self.name),
        }
    }

    /// Store a 0.0-1.0 scaled value without notifying observers.
    pub fn apply_scaled_value(&self, scaled: f64) {
        match self.kind.from_scaled(scaled) {
            Some(value) => self.value.publish(value),
            None => trace!("Ignoring scaled value for data parameter '{}'", self.name),
        }
    }

    /// Replace the data payload without notifying observers.
    ///
    /// Ignored for numeric kinds, and for blobs when `data` is empty. The
    /// existing buffer is reused when it has enough capacity.
    pub fn apply_data(&self, data: &[u8]) {
        match self.kind {
            ParameterKind::Blob if data.is_empty() => {}
            ParameterKind::Blob | ParameterKind::Text => {
                let mut current = self.data.write();
                current.clear();
                current.extend_from_slice(data);
            }
            _ => trace!("Ignoring data for numeric parameter '{}'", self.name),
        }
    }

    /// Apply a value and notify every observer except `sender` on the
    /// calling thread.
    pub fn set_value(&self, value: f64, sender: Option<&ObserverRef>) {
        self.apply_value(value);
        self.observers.notify_all(self, sender);
    }

    /// Apply a scaled value and notify every observer except `sender`.
    pub fn set_scaled_value(&self, scaled: f64, sender: Option<&ObserverRef>) {
        self.apply_scaled_value(scaled);
        self.observers.notify_all(self, sender);
    }

    /// Apply data and notify every observer except `sender`.
    pub fn set_data(&self, data: &[u8], sender: Option<&ObserverRef>) {
        self.apply_data(data);
        self.observers.notify_all(self, sender);
    }

    /// Register an observer. Returns false if it was already registered.
    pub fn add_observer(&self, observer: ObserverRef) -> bool {
        self.observers.add(observer)
    }

    /// Unregister an observer. Returns false if it was not registered.
    pub fn remove_observer(&self, observer: &ObserverRef) -> bool {
        self.observers.remove(observer)
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Notify observers with the given affinity, skipping `sender`.
    pub fn notify_observers(&self, sender: Option<&ObserverRef>, affinity: Affinity) {
        self.observers.notify(self, sender, affinity);
    }
}

impl std::fmt::Debug for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("value", &self.value())
            .field("observers", &self.observers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::ParameterObserver;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Recorder {
        affinity: Affinity,
        label: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
        count: AtomicUsize,
    }

    impl Recorder {
        fn new(affinity: Affinity, label: &'static str, log: &Arc<Mutex<Vec<&'static str>>>) -> Arc<Self> {
            Arc::new(Self {
                affinity,
                label,
                log: Arc::clone(log),
                count: AtomicUsize::new(0),
            })
        }
    }

    impl ParameterObserver for Recorder {
        fn affinity(&self) -> Affinity {
            self.affinity
        }

        fn on_parameter_updated(&self, _parameter: &Parameter) {
            self.count.fetch_add(1, Ordering::SeqCst);
            self.log.lock().push(self.label);
        }
    }

    #[test]
    fn test_safe_name() {
        assert_eq!(make_safe_name("Cutoff Freq (Hz)"), "CutoffFreqHz");
        assert_eq!(make_safe_name("gain"), "gain");
    }

    #[test]
    fn test_boolean_parameter() {
        let p = Parameter::boolean("bypass", false);
        assert!(!p.bool_value());
        p.apply_value(0.7);
        assert!(p.bool_value());
        assert_eq!(p.value(), 1.0);
        assert_eq!(p.display_text(), "true");
        p.apply_scaled_value(0.2);
        assert!(!p.bool_value());
    }

    #[test]
    fn test_float_parameter_clamps_and_scales() {
        let p = Parameter::float("mix", 0.0, 50.0, 10.0).with_unit("%");
        assert_eq!(p.default_value(), 10.0);
        p.apply_value(80.0);
        assert_eq!(p.value(), 50.0);
        p.apply_scaled_value(0.5);
        assert!((p.value() - 25.0).abs() < 1e-9);
        assert!((p.scaled_value() - 0.5).abs() < 1e-9);
        assert_eq!(p.display_text(), "25.00 %");
    }

    #[test]
    fn test_integer_parameter_rounds() {
        let p = Parameter::integer("voices", 1, 16, 4);
        p.apply_value(7.6);
        assert_eq!(p.value(), 8.0);
        p.apply_scaled_value(1.0);
        assert_eq!(p.value(), 16.0);
        assert_eq!(p.display_text(), "16");
    }

    #[test]
    fn test_decibel_gain() {
        let p = Parameter::decibel("gain", -60.0, 12.0, 0.0);
        assert_eq!(p.gain(), Some(1.0));
        p.apply_value(-100.0);
        assert_eq!(p.gain(), Some(0.0));
        assert_eq!(Parameter::boolean("bypass", false).gain(), None);
    }

    #[test]
    fn test_reversed_bounds_are_swapped() {
        let p = Parameter::float("x", 1.0, 0.0, 0.5);
        assert_eq!(
            p.kind(),
            ParameterKind::Float {
                min: 0.0,
                max: 1.0,
                curve: ParameterCurve::Linear
            }
        );
        assert_eq!(p.value(), 0.5);
        p.apply_value(2.0);
        assert_eq!(p.value(), 1.0);

        let p = Parameter::integer("y", 5, 1, 3);
        assert_eq!(p.kind(), ParameterKind::Integer { min: 1, max: 5 });
        assert_eq!(p.value(), 3.0);
        p.apply_scaled_value(0.0);
        assert_eq!(p.value(), 1.0);

        let p = Parameter::decibel("gain", 12.0, -60.0, 20.0);
        assert_eq!(p.value(), 12.0);
        let p = Parameter::logarithmic("freq", 20000.0, 20.0, 10.0);
        assert_eq!(p.value(), 20.0);
    }

    #[test]
    fn test_decibel_parameter() {
        let p = Parameter::decibel("gain", -60.0, 12.0, 0.0);
        assert_eq!(p.unit(), "dB");
        p.apply_value(-6.0);
        assert_eq!(p.display_text(), "-6.0 dB");
    }

    #[test]
    fn test_blob_ignores_numeric_and_empty_data() {
        let p = Parameter::blob("state", Vec::new());
        assert!(p.is_data_capable());
        assert_eq!(p.display_text(), "(Null)");

        p.apply_value(1.0);
        assert_eq!(p.value(), 0.0);

        p.apply_data(&[1, 2, 3]);
        assert_eq!(p.data(), vec![1, 2, 3]);
        assert_eq!(p.display_text(), "(Data)");

        p.apply_data(&[]);
        assert_eq!(p.data_size(), 3);
    }

    #[test]
    fn test_text_parameter() {
        let p = Parameter::text("preset", "Init");
        assert_eq!(p.display_text(), "Init");
        p.apply_data(b"Lead");
        assert_eq!(p.text_value(), "Lead");
    }

    #[test]
    fn test_numeric_ignores_data() {
        let p = Parameter::float("cutoff", 0.0, 1.0, 0.5);
        assert!(!p.is_data_capable());
        p.apply_data(b"ignored");
        assert_eq!(p.data_size(), 0);
    }

    #[test]
    fn test_notify_filters_affinity_and_sender() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let rt = Recorder::new(Affinity::Realtime, "rt", &log);
        let gui = Recorder::new(Affinity::Async, "gui", &log);
        let rt2 = Recorder::new(Affinity::Realtime, "rt2", &log);

        let p = Parameter::boolean("test", false);
        let rt_ref: ObserverRef = rt.clone();
        let gui_ref: ObserverRef = gui.clone();
        let rt2_ref: ObserverRef = rt2.clone();
        assert!(p.add_observer(rt_ref.clone()));
        assert!(p.add_observer(gui_ref.clone()));
        assert!(p.add_observer(rt2_ref.clone()));
        assert!(!p.add_observer(rt_ref.clone()));
        assert_eq!(p.observer_count(), 3);

        p.notify_observers(None, Affinity::Realtime);
        assert_eq!(*log.lock(), vec!["rt", "rt2"]);

        p.notify_observers(Some(&rt_ref), Affinity::Realtime);
        assert_eq!(rt.count.load(Ordering::SeqCst), 1);
        assert_eq!(rt2.count.load(Ordering::SeqCst), 2);

        p.notify_observers(None, Affinity::Async);
        assert_eq!(gui.count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_set_value_notifies_everyone_but_sender() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let rt = Recorder::new(Affinity::Realtime, "rt", &log);
        let gui = Recorder::new(Affinity::Async, "gui", &log);

        let p = Parameter::float("cutoff", 0.0, 1.0, 0.0);
        let rt_ref: ObserverRef = rt.clone();
        let gui_ref: ObserverRef = gui.clone();
        p.add_observer(rt_ref);
        p.add_observer(gui_ref.clone());

        p.set_value(0.3, Some(&gui_ref));
        assert!((p.value() - 0.3).abs() < 1e-9);
        assert_eq!(rt.count.load(Ordering::SeqCst), 1);
        assert_eq!(gui.count.load(Ordering::SeqCst), 0);

        // Unchanged values still notify
        p.set_value(0.3, None);
        assert_eq!(rt.count.load(Ordering::SeqCst), 2);
        assert_eq!(gui.count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remove_observer() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let rt = Recorder::new(Affinity::Realtime, "rt", &log);
        let rt_ref: ObserverRef = rt.clone();

        let p = Parameter::boolean("test", false);
        p.add_observer(rt_ref.clone());
        assert!(p.remove_observer(&rt_ref));
        assert!(!p.remove_observer(&rt_ref));

        p.notify_observers(None, Affinity::Realtime);
        assert_eq!(rt.count.load(Ordering::SeqCst), 0);
    }
}
