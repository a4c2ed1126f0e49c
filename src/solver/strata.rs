//! Stratification of the predicate dependency graph
//!
//! Assigns each predicate a stratum number satisfying
//!   stratum[p] >= stratum[q]  when p depends positively on q,
//!   stratum[p] >  stratum[q]  when p depends negatively on q (NAF),
//! by iterating the constraints to a fixed point. Builtins do not
//! participate. A program whose constraints keep tightening past a
//! polynomial bound has a cycle through negation and is rejected with the
//! offending predicates named.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use crate::error::{EngineError, Result};
use crate::model::Rule;

use super::builtins::is_builtin;

/// Per-predicate positive/negative dependencies of a rule set
struct DependencyGraph {
    preds: BTreeSet<String>,
    pos_deps: HashMap<String, HashSet<String>>,
    neg_deps: HashMap<String, HashSet<String>>,
}

impl DependencyGraph {
    fn build(rules: &[Rule]) -> Self {
        let mut preds: BTreeSet<String> = BTreeSet::new();
        let mut pos_deps: HashMap<String, HashSet<String>> = HashMap::new();
        let mut neg_deps: HashMap<String, HashSet<String>> = HashMap::new();

        for rule in rules {
            let head = rule.head.pred.clone();
            preds.insert(head.clone());
            pos_deps.entry(head.clone()).or_default();
            neg_deps.entry(head.clone()).or_default();

            for atom in &rule.body {
                if is_builtin(&atom.pred) {
                    continue;
                }
                preds.insert(atom.pred.clone());
                if atom.negated {
                    neg_deps
                        .entry(head.clone())
                        .or_default()
                        .insert(atom.pred.clone());
                } else {
                    pos_deps
                        .entry(head.clone())
                        .or_default()
                        .insert(atom.pred.clone());
                }
            }
        }

        DependencyGraph {
            preds,
            pos_deps,
            neg_deps,
        }
    }

    /// Predicates reachable from `start` over positive and negative edges
    fn reachable(&self, start: &str) -> HashSet<String> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(start);
        while let Some(pred) = queue.pop_front() {
            for deps in [self.pos_deps.get(pred), self.neg_deps.get(pred)] {
                let Some(deps) = deps else { continue };
                for dep in deps {
                    if seen.insert(dep.clone()) {
                        queue.push_back(dep);
                    }
                }
            }
        }
        seen
    }

    /// Predicates lying on a cycle that traverses a negative edge: both
    /// ends of every negative edge p -> q where p is reachable back from q.
    fn negative_cycle_preds(&self) -> Vec<String> {
        let mut cycle: BTreeSet<String> = BTreeSet::new();
        for (p, deps) in &self.neg_deps {
            for q in deps {
                if self.reachable(q).contains(p) {
                    cycle.insert(p.clone());
                    cycle.insert(q.clone());
                }
            }
        }
        cycle.into_iter().collect()
    }
}

/// Compute the stratum number of every predicate used in the rule set.
///
/// Fails with [`EngineError::NotStratifiable`] when the constraints do not
/// converge within the polynomial bound.
pub fn compute_strata(rules: &[Rule]) -> Result<HashMap<String, usize>> {
    let graph = DependencyGraph::build(rules);
    let n = graph.preds.len();

    let mut stratum: HashMap<String, usize> =
        graph.preds.iter().map(|p| (p.clone(), 0)).collect();

    let max_iter = n * n + n + 2;
    let mut iters = 0usize;
    let mut changed = true;

    while changed && iters < max_iter {
        changed = false;
        iters += 1;
        for p in &graph.preds {
            if let Some(deps) = graph.pos_deps.get(p) {
                for dep in deps {
                    let dep_s = stratum.get(dep).copied().unwrap_or(0);
                    if stratum[p] < dep_s {
                        stratum.insert(p.clone(), dep_s);
                        changed = true;
                    }
                }
            }
            if let Some(deps) = graph.neg_deps.get(p) {
                for dep in deps {
                    let needed = stratum.get(dep).copied().unwrap_or(0) + 1;
                    if stratum[p] < needed {
                        stratum.insert(p.clone(), needed);
                        changed = true;
                    }
                }
            }
        }
    }

    if iters >= max_iter {
        let preds = graph.negative_cycle_preds();
        tracing::warn!(
            "Stratification failed: negation cycle through {}",
            preds.join(", ")
        );
        return Err(EngineError::NotStratifiable { preds });
    }

    tracing::debug!(
        "Stratification: {} predicate(s), {} stratum(s)",
        stratum.len(),
        stratum.values().copied().max().map_or(0, |m| m + 1)
    );

    Ok(stratum)
}
