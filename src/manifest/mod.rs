//! Predicate manifest: catalog of predicate specs plus the whitelist policy
//!
//! The manifest is loaded once and indexed for the validator: lookups by
//! name and by `name/arity`, closed-world membership, `allowed_in` defaults
//! derived from the predicate's IO role. The index is immutable after
//! construction.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Data-flow direction of a predicate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredicateIo {
    /// Supplied as an EDB fact
    Input,
    /// Produced by rules
    Derived,
    /// May be either; use with care
    Both,
}

/// Role of a predicate in the domain model
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredicateKind {
    /// Business facts / entities
    Domain,
    /// Condition satisfaction (meets_condition-like)
    Condition,
    /// Approvals, refusals, eligibility
    Decision,
    /// UI visibility and availability
    Ui,
    /// Violations and audit trails
    Audit,
    /// Built-in comparisons
    Builtin,
}

/// Where a predicate may appear in a rule
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedIn {
    #[serde(default = "default_true")]
    pub head: bool,
    #[serde(default = "default_true")]
    pub body: bool,
    #[serde(default)]
    pub negated_body: bool,
}

fn default_true() -> bool {
    true
}

/// Enumeration constraint for one argument of a predicate
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueDomain {
    /// 1-based index of the enumerated argument
    pub enum_arg_index: usize,
    pub allowed_values: Vec<String>,
}

/// Full predicate specification from the manifest
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PredicateSpec {
    /// Name without arity, pattern `^[a-z][a-z0-9_]*$`
    pub name: String,
    pub arity: usize,
    /// Convenience form "name/arity"; derived from name+arity when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pred: Option<String>,
    /// Argument type tags, in order; `len(signature) == arity`
    #[serde(default)]
    pub signature: Vec<String>,
    #[serde(default = "default_io")]
    pub io: PredicateIo,
    #[serde(default = "default_kind")]
    pub kind: PredicateKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meaning_pl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_in: Option<AllowedIn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_domain: Option<ValueDomain>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn default_io() -> PredicateIo {
    PredicateIo::Input
}

fn default_kind() -> PredicateKind {
    PredicateKind::Domain
}

impl PredicateSpec {
    /// Canonical identifier: "name/arity"
    pub fn canonical_pred(&self) -> String {
        match &self.pred {
            Some(p) => p.clone(),
            None => format!("{}/{}", self.name, self.arity),
        }
    }
}

/// Whitelist policy mode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WhitelistMode {
    /// Unknown predicates are validation errors
    AllowOnlyListed,
    /// Unknown predicates pass with a warning; arity and allowed_in
    /// checks cannot run for them
    AllowUnlisted,
}

/// Policy block of the manifest
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ManifestPolicy {
    #[serde(default = "default_whitelist_mode")]
    pub whitelist_mode: WhitelistMode,
    /// Predicates ("name/arity") admitted to NAF under closed-world
    #[serde(default)]
    pub naf_closed_world_predicates: Vec<String>,
}

fn default_whitelist_mode() -> WhitelistMode {
    WhitelistMode::AllowOnlyListed
}

impl Default for ManifestPolicy {
    fn default() -> Self {
        ManifestPolicy {
            whitelist_mode: WhitelistMode::AllowOnlyListed,
            naf_closed_world_predicates: Vec::new(),
        }
    }
}

/// The manifest document: predicate catalog + policy
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub predicates: Vec<PredicateSpec>,
    #[serde(default)]
    pub policy: ManifestPolicy,
}

/// Flattened manifest entry, ready for validator lookups
#[derive(Clone, Debug)]
pub struct PredEntry {
    pub name: String,
    pub arity: usize,
    /// Canonical "name/arity"
    pub pred: String,
    pub io: PredicateIo,
    pub kind: PredicateKind,
    pub allowed_in_head: bool,
    pub allowed_in_body: bool,
    pub allowed_in_negated_body: bool,
    /// 1-based enum argument index (None without a value domain)
    pub enum_arg_index: Option<usize>,
    pub allowed_values: Option<HashSet<String>>,
}

/// Default `allowed_in` flags for a predicate without an explicit block.
///
/// input facts are never derived by rules, so head=false; derived and both
/// may head rules; only `both` may be negated by default.
fn default_allowed_in(io: PredicateIo) -> (bool, bool, bool) {
    match io {
        PredicateIo::Input => (false, true, false),
        PredicateIo::Derived => (true, true, false),
        PredicateIo::Both => (true, true, true),
    }
}

/// Immutable index over the manifest, keyed by name and by "name/arity"
pub struct ManifestIndex {
    whitelist_mode: WhitelistMode,
    naf_closed_world: HashSet<String>,
    by_name: HashMap<String, PredEntry>,
    by_pred: HashMap<String, PredEntry>,
}

impl ManifestIndex {
    /// Build the index from a parsed manifest
    pub fn new(manifest: &Manifest) -> Self {
        let mut by_name = HashMap::new();
        let mut by_pred = HashMap::new();

        for spec in &manifest.predicates {
            let entry = Self::build_entry(spec);
            by_pred.insert(entry.pred.clone(), entry.clone());
            by_name.insert(entry.name.clone(), entry);
        }

        tracing::debug!(
            "Manifest index built: {} predicates, {} closed-world",
            by_name.len(),
            manifest.policy.naf_closed_world_predicates.len()
        );

        ManifestIndex {
            whitelist_mode: manifest.policy.whitelist_mode,
            naf_closed_world: manifest
                .policy
                .naf_closed_world_predicates
                .iter()
                .cloned()
                .collect(),
            by_name,
            by_pred,
        }
    }

    /// Load and index a manifest from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(json)?;
        Ok(Self::new(&manifest))
    }

    /// Load and index a manifest from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn build_entry(spec: &PredicateSpec) -> PredEntry {
        let (head, body, negated_body) = match spec.allowed_in {
            Some(ai) => (ai.head, ai.body, ai.negated_body),
            None => default_allowed_in(spec.io),
        };

        let (enum_arg_index, allowed_values) = match &spec.value_domain {
            Some(vd) => (
                Some(vd.enum_arg_index),
                Some(vd.allowed_values.iter().cloned().collect()),
            ),
            None => (None, None),
        };

        PredEntry {
            name: spec.name.clone(),
            arity: spec.arity,
            pred: spec.canonical_pred(),
            io: spec.io,
            kind: spec.kind,
            allowed_in_head: head,
            allowed_in_body: body,
            allowed_in_negated_body: negated_body,
            enum_arg_index,
            allowed_values,
        }
    }

    /// Look up an entry by predicate name (without arity)
    pub fn lookup_by_name(&self, name: &str) -> Option<&PredEntry> {
        self.by_name.get(name)
    }

    /// Look up an entry by "name/arity"
    pub fn lookup_by_pred(&self, pred_with_arity: &str) -> Option<&PredEntry> {
        self.by_pred.get(pred_with_arity)
    }

    /// Is the predicate ("name/arity") on the closed-world list?
    pub fn is_naf_closed_world(&self, pred_with_arity: &str) -> bool {
        self.naf_closed_world.contains(pred_with_arity)
    }

    pub fn whitelist_mode(&self) -> WhitelistMode {
        self.whitelist_mode
    }
}
