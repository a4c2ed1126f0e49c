//! Bottom-up stratified evaluator
//!
//! Construction expands named conditions, reorders bodies for safety and
//! computes strata; failures there are fatal for the evaluation call.
//! Evaluation then saturates each stratum in ascending order: every rule
//! of the stratum is matched against the current fact store until no new
//! head tuple appears. NAF on lower-stratum predicates is well-defined
//! because lower strata are fully saturated first. The fact store only
//! ever grows.

use std::collections::HashMap;

use crate::error::{EngineError, Result};
use crate::model::{Atom, Rule, Term};

use super::builtins::{eval_builtin, is_builtin};
use super::expand::{expand_conditions, ConditionSet};
use super::facts::FactStore;
use super::reorder::reorder_rules;
use super::strata::compute_strata;
use super::subst::{ground_values, unify_ground, Bindings};

/// Hard cap on fixed-point rounds within one stratum; exceeding it means
/// a runaway program and fails the evaluation.
pub const MAX_FIXPOINT_ITERATIONS: usize = 100_000;

/// Stratified Datalog evaluator with NAF and builtin comparisons
pub struct Evaluator {
    rules: Vec<Rule>,
    strata: HashMap<String, usize>,
    facts: FactStore,
}

impl Evaluator {
    /// Build an evaluator over validated rules, EDB facts and condition
    /// definitions. Fails when the rule set is not stratifiable.
    pub fn new(rules: Vec<Rule>, facts: FactStore, conditions: &ConditionSet) -> Result<Self> {
        let expanded = expand_conditions(&rules, conditions);
        let reordered = reorder_rules(expanded);
        let strata = compute_strata(&reordered)?;

        Ok(Evaluator {
            rules: reordered,
            strata,
            facts,
        })
    }

    /// Per-predicate stratum numbers
    pub fn strata(&self) -> &HashMap<String, usize> {
        &self.strata
    }

    /// The current fact store (EDB plus whatever has been derived)
    pub fn facts(&self) -> &FactStore {
        &self.facts
    }

    /// Run bottom-up evaluation to the least model: strata in ascending
    /// order, fixed point within each. Returns the saturated fact store.
    pub fn evaluate(&mut self) -> Result<&FactStore> {
        let max_stratum = self.strata.values().copied().max().unwrap_or(0);

        for stratum in 0..=max_stratum {
            let rule_indices: Vec<usize> = (0..self.rules.len())
                .filter(|&i| {
                    let head = &self.rules[i].head.pred;
                    self.strata.get(head).copied().unwrap_or(0) == stratum
                })
                .collect();

            if rule_indices.is_empty() {
                continue;
            }
            self.saturate_stratum(stratum, &rule_indices)?;
        }

        Ok(&self.facts)
    }

    /// Fixed point for one stratum
    fn saturate_stratum(&mut self, stratum: usize, rule_indices: &[usize]) -> Result<()> {
        let mut iterations = 0usize;
        let mut derived = 0usize;

        loop {
            iterations += 1;
            if iterations > MAX_FIXPOINT_ITERATIONS {
                tracing::error!(
                    "Fixed-point overrun in stratum {stratum} after {MAX_FIXPOINT_ITERATIONS} rounds"
                );
                return Err(EngineError::FixedPointOverrun {
                    stratum,
                    iterations: MAX_FIXPOINT_ITERATIONS,
                });
            }

            let mut changed = false;
            for &i in rule_indices {
                let matches = match_body(&self.rules[i].body, &self.facts, &Bindings::new());
                if matches.is_empty() {
                    continue;
                }
                let head = self.rules[i].head.clone();
                for bindings in matches {
                    let grounded = bindings.apply(&head.args);
                    let Some(tuple) = ground_values(&grounded) else {
                        continue; // head not ground - skip
                    };
                    if self.facts.insert(&head.pred, tuple) {
                        changed = true;
                        derived += 1;
                    }
                }
            }

            if !changed {
                break;
            }
        }

        tracing::debug!(
            "Stratum {stratum} saturated after {iterations} round(s), {derived} new fact(s)"
        );
        Ok(())
    }

    /// Answer a goal: unify the argument pattern against every tuple of
    /// the predicate. An empty result means the goal is false under the
    /// closed-world reading of the derived model.
    pub fn query(&self, pred: &str, args: &[Term]) -> Vec<Bindings> {
        let Some(tuples) = self.facts.tuples(pred) else {
            return Vec::new();
        };
        let empty = Bindings::new();
        tuples
            .iter()
            .filter_map(|tuple| unify_ground(args, tuple, &empty))
            .collect()
    }
}

/// All substitutions extending `bindings` under which the body holds in
/// `facts`, processing atoms left to right.
fn match_body(body: &[Atom], facts: &FactStore, bindings: &Bindings) -> Vec<Bindings> {
    let Some((atom, rest)) = body.split_first() else {
        return vec![bindings.clone()];
    };

    // Builtin: requires ground arguments; unresolved variables prune
    if is_builtin(&atom.pred) {
        let substituted = bindings.apply(&atom.args);
        let Some(values) = ground_values(&substituted) else {
            return Vec::new();
        };
        let holds = eval_builtin(&atom.pred, &values);
        if holds != atom.negated {
            return match_body(rest, facts, bindings);
        }
        return Vec::new();
    }

    // NAF: grounded tuple must be absent. Residual variables prune the
    // branch (the validator and reordering make that unreachable for
    // well-formed rules).
    if atom.negated {
        let substituted = bindings.apply(&atom.args);
        let Some(values) = ground_values(&substituted) else {
            return Vec::new();
        };
        if !facts.contains(&atom.pred, &values) {
            return match_body(rest, facts, bindings);
        }
        return Vec::new();
    }

    // Positive atom: branch over matching fact tuples
    let Some(tuples) = facts.tuples(&atom.pred) else {
        return Vec::new();
    };
    let mut results = Vec::new();
    for tuple in tuples {
        if let Some(extended) = unify_ground(&atom.args, tuple, bindings) {
            results.extend(match_body(rest, facts, &extended));
        }
    }
    results
}
