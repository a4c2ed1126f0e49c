//! Substitutions and unification
//!
//! A substitution maps variable names to terms. Lookups walk binding
//! chains (variable-to-variable links are possible mid-unification) with a
//! cycle guard, so backtracking branches can clone cheaply and diverge.

use std::collections::hash_map;
use std::collections::{HashMap, HashSet};

use crate::model::Term;

/// Variable bindings produced by body matching and goal queries
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bindings {
    map: HashMap<String, Term>,
}

impl Bindings {
    /// Create empty bindings
    pub fn new() -> Self {
        Bindings {
            map: HashMap::new(),
        }
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Number of bound variables
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Get the direct binding of a variable (name without the `?` sigil)
    pub fn get(&self, var: &str) -> Option<&Term> {
        self.map.get(var)
    }

    /// Bind a variable to a term
    pub fn bind(&mut self, var: &str, term: Term) {
        self.map.insert(var.to_string(), term);
    }

    /// Resolve a term through the binding chain. Variable-to-variable
    /// links are followed until a constant or an unbound variable is
    /// reached; a seen-set guards against cycles.
    pub fn walk(&self, term: &Term) -> Term {
        let mut current = term.clone();
        let mut seen: HashSet<String> = HashSet::new();
        while let Term::Var(name) = &current {
            if !seen.insert(name.clone()) {
                break;
            }
            match self.map.get(name) {
                Some(next) => current = next.clone(),
                None => break,
            }
        }
        current
    }

    /// Apply the substitution to a slice of terms
    pub fn apply(&self, args: &[Term]) -> Vec<Term> {
        args.iter().map(|a| self.walk(a)).collect()
    }

    /// Iterate over the direct bindings
    pub fn iter(&self) -> hash_map::Iter<'_, String, Term> {
        self.map.iter()
    }
}

/// Unify two term slices under existing bindings.
///
/// Variable-to-variable, variable-to-constant and equal-constant pairs
/// succeed; differing constants fail. Returns the extended bindings or
/// None on clash. Symmetric in its two slices.
pub fn unify(left: &[Term], right: &[Term], bindings: &Bindings) -> Option<Bindings> {
    if left.len() != right.len() {
        return None;
    }
    let mut result = bindings.clone();
    for (l, r) in left.iter().zip(right.iter()) {
        let l = result.walk(l);
        let r = result.walk(r);
        if l == r {
            continue;
        }
        match (l, r) {
            (Term::Var(name), term) | (term, Term::Var(name)) => result.bind(&name, term),
            _ => return None, // constant clash
        }
    }
    Some(result)
}

/// Unify a term pattern against a ground fact tuple.
pub fn unify_ground(pattern: &[Term], tuple: &[String], bindings: &Bindings) -> Option<Bindings> {
    if pattern.len() != tuple.len() {
        return None;
    }
    let mut result = bindings.clone();
    for (p, value) in pattern.iter().zip(tuple.iter()) {
        match result.walk(p) {
            Term::Const(c) => {
                if &c != value {
                    return None;
                }
            }
            Term::Var(name) => result.bind(&name, Term::Const(value.clone())),
        }
    }
    Some(result)
}

/// Extract constant values from substituted terms; None if any variable
/// remains.
pub fn ground_values(terms: &[Term]) -> Option<Vec<String>> {
    terms
        .iter()
        .map(|t| t.const_value().map(|s| s.to_string()))
        .collect()
}
