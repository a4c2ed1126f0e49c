//! Fact store: predicate name -> set of ground argument tuples
//!
//! Seeded with EDB facts, grown monotonically during evaluation. Tuple
//! order is immaterial to semantics; derived facts are never retracted.

use std::collections::{HashMap, HashSet};

use crate::model::CaseFacts;

/// Set of ground facts, grouped by predicate
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FactStore {
    map: HashMap<String, HashSet<Vec<String>>>,
}

impl FactStore {
    /// Create an empty store
    pub fn new() -> Self {
        FactStore {
            map: HashMap::new(),
        }
    }

    /// Seed a store from a case-facts document, coercing scalar args to
    /// their string form.
    pub fn from_case(case: &CaseFacts) -> Self {
        let mut store = FactStore::new();
        for fact in &case.facts {
            store.insert(&fact.pred, fact.arg_strings());
        }
        store
    }

    /// Insert a ground tuple; returns true when the tuple is new
    pub fn insert(&mut self, pred: &str, tuple: Vec<String>) -> bool {
        self.map.entry(pred.to_string()).or_default().insert(tuple)
    }

    /// Check membership of a ground tuple
    pub fn contains(&self, pred: &str, tuple: &[String]) -> bool {
        self.map.get(pred).is_some_and(|set| set.contains(tuple))
    }

    /// Tuples recorded for a predicate, if any
    pub fn tuples(&self, pred: &str) -> Option<&HashSet<Vec<String>>> {
        self.map.get(pred)
    }

    /// Predicates with at least one tuple
    pub fn predicates(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(|k| k.as_str())
    }

    /// Total number of tuples across all predicates
    pub fn len(&self) -> usize {
        self.map.values().map(|set| set.len()).sum()
    }

    /// True when no predicate holds any tuple
    pub fn is_empty(&self) -> bool {
        self.map.values().all(|set| set.is_empty())
    }

    /// Union another store into this one
    pub fn extend(&mut self, other: &FactStore) {
        for (pred, tuples) in &other.map {
            let set = self.map.entry(pred.clone()).or_default();
            for tuple in tuples {
                set.insert(tuple.clone());
            }
        }
    }

    /// Facts present here but not in `other` - extracting the IDB from a
    /// fully evaluated store given the seeded EDB.
    pub fn difference(&self, other: &FactStore) -> FactStore {
        let mut result = FactStore::new();
        for (pred, tuples) in &self.map {
            for tuple in tuples {
                if !other.contains(pred, tuple) {
                    result.insert(pred, tuple.clone());
                }
            }
        }
        result
    }

    /// Does every fact of `other` appear here?
    pub fn contains_all(&self, other: &FactStore) -> bool {
        other
            .map
            .iter()
            .all(|(pred, tuples)| tuples.iter().all(|t| self.contains(pred, t)))
    }
}
