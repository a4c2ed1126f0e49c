//! Inlining of `meets_condition(E, cond_id)` body atoms
//!
//! Each such atom is replaced by a freshened copy of the condition's
//! required facts: the condition's entity variable (first variable in
//! atom order) becomes the caller's entity argument, every other variable
//! gets a unique per-call suffix so repeated expansions of one condition
//! inside one rule cannot collide. Unknown condition ids are left in place
//! and simply never match (solver-side inert).

use std::collections::HashMap;

use crate::model::{Atom, ConditionDefinition, Rule, Term};

/// Predicate whose body occurrences are inlined
const MEETS_CONDITION: &str = "meets_condition";

/// Conditions keyed by id, reduced to their required facts
#[derive(Clone, Debug, Default)]
pub struct ConditionSet {
    map: HashMap<String, Vec<Atom>>,
}

impl ConditionSet {
    pub fn new() -> Self {
        ConditionSet {
            map: HashMap::new(),
        }
    }

    /// Build the set from full condition definitions. Only required facts
    /// participate in expansion; optional facts stay on the definition.
    pub fn from_definitions(definitions: &[ConditionDefinition]) -> Self {
        let mut set = ConditionSet::new();
        for def in definitions {
            set.insert(&def.id, def.required_facts.clone());
        }
        set
    }

    pub fn insert(&mut self, condition_id: &str, required_facts: Vec<Atom>) {
        self.map.insert(condition_id.to_string(), required_facts);
    }

    pub fn get(&self, condition_id: &str) -> Option<&Vec<Atom>> {
        self.map.get(condition_id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// First variable name appearing in the atoms, in left-to-right atom-order
/// traversal - the condition's entity variable.
fn first_var(atoms: &[Atom]) -> Option<String> {
    for atom in atoms {
        for arg in &atom.args {
            if let Term::Var(name) = arg {
                return Some(name.clone());
            }
        }
    }
    None
}

/// Copy the atoms with the entity variable replaced by the caller's
/// argument and all other variables suffixed with a per-call marker.
fn freshen(atoms: &[Atom], entity_var: &str, replacement: &Term, counter: usize) -> Vec<Atom> {
    atoms
        .iter()
        .map(|atom| {
            let args = atom
                .args
                .iter()
                .map(|arg| match arg {
                    Term::Var(name) if name == entity_var => replacement.clone(),
                    Term::Var(name) => Term::Var(format!("{name}_mc{counter}")),
                    constant => constant.clone(),
                })
                .collect();
            Atom {
                pred: atom.pred.clone(),
                args,
                negated: atom.negated,
            }
        })
        .collect()
}

/// Replace `meets_condition(E, cond_id)` atoms in every rule body by the
/// condition's freshened required facts. Head, id, provenance and
/// assumptions ride through untouched.
pub fn expand_conditions(rules: &[Rule], conditions: &ConditionSet) -> Vec<Rule> {
    let mut counter = 0usize;
    let mut expanded_atoms = 0usize;

    let expanded: Vec<Rule> = rules
        .iter()
        .map(|rule| {
            let mut new_body: Vec<Atom> = Vec::with_capacity(rule.body.len());
            for atom in &rule.body {
                if atom.pred == MEETS_CONDITION && atom.args.len() == 2 {
                    let entity_arg = &atom.args[0];
                    let cond_id = condition_id_of(&atom.args[1]);
                    if let Some(required) = cond_id.and_then(|id| conditions.get(id)) {
                        let call = counter;
                        counter += 1;
                        expanded_atoms += 1;
                        match first_var(required) {
                            Some(entity_var) => {
                                new_body.extend(freshen(required, &entity_var, entity_arg, call));
                            }
                            None => new_body.extend(required.iter().cloned()),
                        }
                        continue;
                    }
                }
                new_body.push(atom.clone());
            }

            let mut rule = rule.clone();
            rule.body = new_body;
            rule
        })
        .collect();

    if expanded_atoms > 0 {
        tracing::debug!(
            "Expanded {} meets_condition atom(s) across {} rule(s)",
            expanded_atoms,
            rules.len()
        );
    }

    expanded
}

/// The condition id referenced by the second argument, with surrounding
/// quotes stripped. Variables reference no condition.
fn condition_id_of(arg: &Term) -> Option<&str> {
    arg.const_value()
        .map(|s| s.trim_matches(|c| c == '"' || c == '\''))
}
