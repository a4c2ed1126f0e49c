//! Persistence contract and in-memory implementation
//!
//! The evaluator never reaches into storage; it consumes loaded values
//! only. [`Store`] is the collaborator boundary: four retrieval operations
//! and three ingestion operations whose keys define idempotence - rules by
//! `(fragment_id, rule_id)`, conditions by `id`, predicate specs by
//! `name/arity`. [`MemoryStore`] backs tests and embedded use.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{EngineError, Result};
use crate::manifest::{Manifest, ManifestPolicy, PredicateSpec};
use crate::model::{CaseFacts, ConditionDefinition, Rule};

/// Retrieval and ingestion operations of the rule/condition/manifest store
pub trait Store {
    // === RETRIEVAL ===

    /// Load rules, optionally filtered by domain and by fragment id
    fn load_rules(&self, domain: Option<&str>, fragment_id: Option<&str>) -> Result<Vec<Rule>>;

    /// Load all condition definitions (conditions are global)
    fn load_conditions(&self) -> Result<Vec<ConditionDefinition>>;

    /// Load the predicate catalog and policy
    fn load_manifest(&self) -> Result<Manifest>;

    /// Load the EDB facts recorded for a case
    fn load_case_facts(&self, case_id: &str) -> Result<CaseFacts>;

    // === INGESTION ===

    /// Insert or replace predicate specs, keyed by "name/arity"
    fn upsert_predicates(&mut self, specs: Vec<PredicateSpec>) -> Result<usize>;

    /// Insert or replace rules of a domain, keyed by `(fragment_id, rule_id)`
    fn upsert_rules(&mut self, domain: &str, rules: Vec<Rule>) -> Result<usize>;

    /// Insert or replace condition definitions, keyed by condition id
    fn upsert_conditions(&mut self, conditions: Vec<ConditionDefinition>) -> Result<usize>;
}

/// Rule record as held by the in-memory store; domain is a store-level
/// attribute, not part of the rule wire format.
#[derive(Clone, Debug)]
struct StoredRule {
    domain: String,
    rule: Rule,
}

/// In-memory [`Store`] implementation
#[derive(Default)]
pub struct MemoryStore {
    predicates: HashMap<String, PredicateSpec>,
    policy: ManifestPolicy,
    rules: HashMap<(String, String), StoredRule>,
    conditions: HashMap<String, ConditionDefinition>,
    cases: HashMap<String, CaseFacts>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Replace the manifest policy block
    pub fn set_policy(&mut self, policy: ManifestPolicy) {
        self.policy = policy;
    }

    /// Record the EDB facts of a case, keyed by its case id
    pub fn insert_case(&mut self, case: CaseFacts) {
        self.cases.insert(case.case_id.clone(), case);
    }
}

impl Store for MemoryStore {
    fn load_rules(&self, domain: Option<&str>, fragment_id: Option<&str>) -> Result<Vec<Rule>> {
        let mut rules: Vec<&StoredRule> = self
            .rules
            .values()
            .filter(|stored| domain.is_none_or(|d| stored.domain == d))
            .filter(|stored| fragment_id.is_none_or(|f| stored.rule.fragment_id == f))
            .collect();
        // Deterministic load order
        rules.sort_by(|a, b| {
            (&a.rule.fragment_id, &a.rule.id).cmp(&(&b.rule.fragment_id, &b.rule.id))
        });
        Ok(rules.into_iter().map(|stored| stored.rule.clone()).collect())
    }

    fn load_conditions(&self) -> Result<Vec<ConditionDefinition>> {
        let mut conditions: Vec<ConditionDefinition> = self.conditions.values().cloned().collect();
        conditions.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(conditions)
    }

    fn load_manifest(&self) -> Result<Manifest> {
        let mut predicates: Vec<PredicateSpec> = self.predicates.values().cloned().collect();
        predicates.sort_by(|a, b| a.name.cmp(&b.name).then(a.arity.cmp(&b.arity)));
        Ok(Manifest {
            predicates,
            policy: self.policy.clone(),
        })
    }

    fn load_case_facts(&self, case_id: &str) -> Result<CaseFacts> {
        self.cases
            .get(case_id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(format!("case '{case_id}'")))
    }

    fn upsert_predicates(&mut self, specs: Vec<PredicateSpec>) -> Result<usize> {
        let count = specs.len();
        for spec in specs {
            self.predicates.insert(spec.canonical_pred(), spec);
        }
        Ok(count)
    }

    fn upsert_rules(&mut self, domain: &str, rules: Vec<Rule>) -> Result<usize> {
        let count = rules.len();
        for rule in rules {
            let key = (rule.fragment_id.clone(), rule.id.clone());
            self.rules.insert(
                key,
                StoredRule {
                    domain: domain.to_string(),
                    rule,
                },
            );
        }
        Ok(count)
    }

    fn upsert_conditions(&mut self, conditions: Vec<ConditionDefinition>) -> Result<usize> {
        let count = conditions.len();
        for condition in conditions {
            self.conditions.insert(condition.id.clone(), condition);
        }
        Ok(count)
    }
}

/// Load a case-facts document from a JSON file
pub fn load_facts_json(path: impl AsRef<Path>) -> Result<CaseFacts> {
    let json = std::fs::read_to_string(path)?;
    Ok(CaseFacts::from_json(&json)?)
}
