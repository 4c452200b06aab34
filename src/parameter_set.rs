// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Ordered collection of parameters, addressable by name or index.

use paramsync_api::{make_safe_name, Parameter};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Parameters in insertion order, with a lookup table keyed by safe name.
#[derive(Debug, Default)]
pub struct ParameterSet {
    parameters: Vec<Arc<Parameter>>,
    by_name: HashMap<String, usize>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter to the set.
    ///
    /// Returns `None` if a parameter with the same safe name is already
    /// present; the set is left unchanged in that case.
    pub fn add(&mut self, parameter: Parameter) -> Option<Arc<Parameter>> {
        if self.by_name.contains_key(parameter.safe_name()) {
            warn!("Parameter '{}' is already in the set", parameter.name());
            return None;
        }

        let parameter = Arc::new(parameter);
        self.by_name
            .insert(parameter.safe_name().to_string(), self.parameters.len());
        self.parameters.push(Arc::clone(&parameter));
        Some(parameter)
    }

    /// Look up a parameter by name. Punctuation and spaces are ignored.
    pub fn get(&self, name: &str) -> Option<&Arc<Parameter>> {
        self.by_name
            .get(&make_safe_name(name))
            .map(|&index| &self.parameters[index])
    }

    /// Look up a parameter by index.
    pub fn get_index(&self, index: usize) -> Option<&Arc<Parameter>> {
        self.parameters.get(index)
    }

    /// Position of a parameter in the set.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(&make_safe_name(name)).copied()
    }

    pub fn size(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Remove every parameter.
    pub fn clear(&mut self) {
        self.parameters.clear();
        self.by_name.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Parameter>> {
        self.parameters.iter()
    }
}

impl std::ops::Index<usize> for ParameterSet {
    type Output = Parameter;

    fn index(&self, index: usize) -> &Parameter {
        &self.parameters[index]
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = &'a Arc<Parameter>;
    type IntoIter = std::slice::Iter<'a, Arc<Parameter>>;

    fn into_iter(self) -> Self::IntoIter {
        self.parameters.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set() {
        let set = ParameterSet::new();
        assert_eq!(set.size(), 0);
        assert!(set.is_empty());
        assert!(set.get("anything").is_none());
        assert!(set.get_index(0).is_none());
    }

    #[test]
    fn test_add_and_lookup() {
        let mut set = ParameterSet::new();
        let cutoff = set.add(Parameter::float("Cutoff Freq", 20.0, 20000.0, 1000.0)).unwrap();
        let bypass = set.add(Parameter::boolean("bypass", false)).unwrap();

        assert_eq!(set.size(), 2);
        assert!(Arc::ptr_eq(set.get("Cutoff Freq").unwrap(), &cutoff));
        assert!(Arc::ptr_eq(set.get("CutoffFreq").unwrap(), &cutoff));
        assert!(Arc::ptr_eq(set.get_index(1).unwrap(), &bypass));
        assert_eq!(set.index_of("bypass"), Some(1));
        assert_eq!(set[0].name(), "Cutoff Freq");
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut set = ParameterSet::new();
        assert!(set.add(Parameter::boolean("test", false)).is_some());
        assert!(set.add(Parameter::boolean("test", true)).is_none());
        // Same safe name counts as a duplicate
        assert!(set.add(Parameter::boolean("te st", true)).is_none());
        assert_eq!(set.size(), 1);
        assert!(!set.get("test").unwrap().bool_value());
    }

    #[test]
    fn test_clear() {
        let mut set = ParameterSet::new();
        set.add(Parameter::boolean("a", false));
        set.add(Parameter::boolean("b", false));
        set.clear();
        assert!(set.is_empty());
        assert!(set.get("a").is_none());
        assert!(set.add(Parameter::boolean("a", true)).is_some());
    }

    #[test]
    fn test_iteration_order() {
        let mut set = ParameterSet::new();
        for name in ["one", "two", "three"] {
            set.add(Parameter::boolean(name, false));
        }
        let names: Vec<&str> = set.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["one", "two", "three"]);
    }
}
