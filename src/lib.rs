//! lexlog - stratified Datalog inference engine for regulatory rule bases
//!
//! # Architecture
//!
//! - **Model**: terms, atoms, Horn rules and condition definitions as pure
//!   data, serde-mapped to the wire formats
//! - **Manifest**: predicate catalog + whitelist policy, indexed for
//!   validator lookups
//! - **Validation**: six-stage pipeline (schema, predicates/arity, enums,
//!   safety, provenance, assumptions) with stable error codes
//! - **Solver**: condition inlining, safety-driven body reordering,
//!   stratification, bottom-up fixed point per stratum, goal queries
//! - **Store**: persistence contract trait + in-memory implementation
//!
//! # Usage example
//!
//! ```
//! use lexlog::{Atom, ConditionSet, Evaluator, FactStore, Rule, Term};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rules = vec![
//!     Rule::new(
//!         "R-reach-base",
//!         Atom::new("reach", vec![Term::var("X"), Term::var("Y")]),
//!         vec![Atom::new("edge", vec![Term::var("X"), Term::var("Y")])],
//!     ),
//!     Rule::new(
//!         "R-reach-step",
//!         Atom::new("reach", vec![Term::var("X"), Term::var("Z")]),
//!         vec![
//!             Atom::new("edge", vec![Term::var("X"), Term::var("Y")]),
//!             Atom::new("reach", vec![Term::var("Y"), Term::var("Z")]),
//!         ],
//!     ),
//! ];
//!
//! let mut facts = FactStore::new();
//! facts.insert("edge", vec!["a".into(), "b".into()]);
//! facts.insert("edge", vec!["b".into(), "c".into()]);
//!
//! let mut evaluator = Evaluator::new(rules, facts, &ConditionSet::new())?;
//! evaluator.evaluate()?;
//!
//! let answers = evaluator.query("reach", &[Term::constant("a"), Term::var("Z")]);
//! assert_eq!(answers.len(), 2); // ?Z in {b, c}
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod manifest;
pub mod model;
pub mod solver;
pub mod store;
pub mod validate;

pub use error::{EngineError, Result};
pub use manifest::{Manifest, ManifestIndex, PredicateSpec, WhitelistMode};
pub use model::{Atom, CaseFacts, ConditionDefinition, Provenance, Rule, ScopedAssumption, Term};
pub use solver::{parse_goal, Bindings, ConditionSet, Evaluator, FactStore};
pub use store::{load_facts_json, MemoryStore, Store};
pub use validate::{ErrorCode, RuleValidator, ValidationError, ValidationReport};
