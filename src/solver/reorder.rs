//! Safety-driven body reordering
//!
//! Produces an equivalent body with all positive non-builtin atoms first,
//! then builtins, then negated atoms, preserving relative order inside
//! each group. Combined with the validator's guarantees this ensures NAF
//! safety and builtin groundedness at evaluation time.

use crate::model::{Atom, Rule};

use super::builtins::is_builtin;

/// Stable three-way partition of a rule body
pub fn reorder_body(body: &[Atom]) -> Vec<Atom> {
    let mut positives: Vec<Atom> = Vec::new();
    let mut builtins: Vec<Atom> = Vec::new();
    let mut negated: Vec<Atom> = Vec::new();

    for atom in body {
        if is_builtin(&atom.pred) {
            builtins.push(atom.clone());
        } else if atom.negated {
            negated.push(atom.clone());
        } else {
            positives.push(atom.clone());
        }
    }

    positives.extend(builtins);
    positives.extend(negated);
    positives
}

/// Reorder every rule body in place
pub fn reorder_rules(mut rules: Vec<Rule>) -> Vec<Rule> {
    for rule in &mut rules {
        rule.body = reorder_body(&rule.body);
    }
    rules
}
