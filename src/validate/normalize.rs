//! Rule normalization: defaults + quote trimming
//!
//! Deserialization already fills the wire defaults (`negated = false`,
//! empty `constraints`/`assumptions`); normalization completes the job on
//! the typed value by trimming the provenance quote. It never alters
//! predicate names, argument order or any truth-affecting field, and it is
//! idempotent: `normalize_rule(normalize_rule(r)) == normalize_rule(r)`.

use crate::model::Rule;

/// Return a value-equal copy of the rule with defaults settled and the
/// provenance quote trimmed.
pub fn normalize_rule(rule: &Rule) -> Rule {
    let mut rule = rule.clone();
    if let Some(prov) = rule.provenance.as_mut() {
        prov.quote = prov.quote.trim().to_string();
    }
    rule
}
