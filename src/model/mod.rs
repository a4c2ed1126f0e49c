//! Core data model: terms, atoms, rules, conditions, case facts
//!
//! These are the wire types exchanged with the extractor and the persistence
//! layer. Variables are spelled `?Name` on the wire; everything else is a
//! constant. Atoms carry an explicit `negated` flag (negation-as-failure).

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A term - variable (`?X` on the wire) or constant
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Term {
    /// Variable; the name is stored without the `?` sigil
    Var(String),
    /// Constant (string literal, e.g. "confirmed" or "ord-1")
    Const(String),
}

impl Term {
    /// Create a variable term (name without the `?` sigil)
    pub fn var(name: &str) -> Self {
        Term::Var(name.to_string())
    }

    /// Create a constant term
    pub fn constant(value: &str) -> Self {
        Term::Const(value.to_string())
    }

    /// Parse a wire token: `?`-prefixed strings are variables
    pub fn from_token(token: &str) -> Self {
        match token.strip_prefix('?') {
            Some(name) => Term::Var(name.to_string()),
            None => Term::Const(token.to_string()),
        }
    }

    /// Check if this term is a variable
    pub fn is_var(&self) -> bool {
        matches!(self, Term::Var(_))
    }

    /// Check if this term is a constant
    pub fn is_const(&self) -> bool {
        matches!(self, Term::Const(_))
    }

    /// Get variable name (without sigil) if this is a variable
    pub fn var_name(&self) -> Option<&str> {
        match self {
            Term::Var(name) => Some(name),
            _ => None,
        }
    }

    /// Get constant value if this is a constant
    pub fn const_value(&self) -> Option<&str> {
        match self {
            Term::Const(value) => Some(value),
            _ => None,
        }
    }

    /// Wire form: `?Name` for variables, the value itself for constants
    pub fn token(&self) -> String {
        match self {
            Term::Var(name) => format!("?{name}"),
            Term::Const(value) => value.clone(),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Var(name) => write!(f, "?{name}"),
            Term::Const(value) => f.write_str(value),
        }
    }
}

impl Serialize for Term {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.token())
    }
}

impl<'de> Deserialize<'de> for Term {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Ok(Term::from_token(&token))
    }
}

/// An atom: `pred(arg1, arg2, ...)`, optionally negated (NAF)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Atom {
    /// Predicate name without arity, pattern `^[a-z][a-z0-9_]*$`
    pub pred: String,
    /// Ordered arguments
    #[serde(default)]
    pub args: Vec<Term>,
    /// `true` means `not pred(args)` under negation-as-failure
    #[serde(default)]
    pub negated: bool,
}

impl Atom {
    /// Create a positive atom
    pub fn new(pred: &str, args: Vec<Term>) -> Self {
        Atom {
            pred: pred.to_string(),
            args,
            negated: false,
        }
    }

    /// Create a negated atom (NAF)
    pub fn negative(pred: &str, args: Vec<Term>) -> Self {
        Atom {
            pred: pred.to_string(),
            args,
            negated: true,
        }
    }

    /// Get arity (number of arguments)
    pub fn arity(&self) -> usize {
        self.args.len()
    }

    /// Get all variable names (without sigil) in this atom
    pub fn variables(&self) -> HashSet<String> {
        self.args
            .iter()
            .filter_map(|t| t.var_name().map(|s| s.to_string()))
            .collect()
    }

    /// Check if atom is ground (no variables)
    pub fn is_ground(&self) -> bool {
        self.args.iter().all(|t| !t.is_var())
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("not ")?;
        }
        f.write_str(&self.pred)?;
        if !self.args.is_empty() {
            write!(f, "(")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Document source trace: unit identifiers plus a verbatim quote
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Document unit identifiers, e.g. `["3.1(b)"]`
    pub unit: Vec<String>,
    /// Short verbatim fragment (no paraphrase), max 400 chars
    pub quote: String,
}

/// Category of a scoped assumption
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssumptionType {
    DataContract,
    DataSemantics,
    Enumeration,
    ClosedWorld,
    ExternalComputation,
    ConflictResolution,
    MissingPredicate,
}

/// What a scoped assumption refers to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssumptionAbout {
    /// Predicate with arity, e.g. "delivery_status/2"
    pub pred: String,
    /// 0-based index into the rule body (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atom_index: Option<usize>,
    /// 1-based argument index within the atom (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arg_index: Option<usize>,
    /// Concrete constant value (optional)
    #[serde(default, rename = "const", skip_serializing_if = "Option::is_none")]
    pub constant: Option<String>,
}

/// A typed, locally-attached hidden premise of a rule or condition
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopedAssumption {
    pub about: AssumptionAbout,
    #[serde(rename = "type")]
    pub kind: AssumptionType,
    pub text: String,
}

/// A Horn rule: `head :- body.` An empty body makes the rule a fact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Rule identifier, pattern `^[A-Za-z][A-Za-z0-9_\-]*$`
    pub id: String,
    /// Document fragment the rule was extracted from
    #[serde(default)]
    pub fragment_id: String,
    /// Head atom (conclusion); must be non-negated
    pub head: Atom,
    /// Body atoms (premises)
    #[serde(default)]
    pub body: Vec<Atom>,
    /// Non-Horn constraints; preferred empty
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
    #[serde(default)]
    pub assumptions: Vec<ScopedAssumption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Rule {
    /// Create a rule with empty ancillary fields
    pub fn new(id: &str, head: Atom, body: Vec<Atom>) -> Self {
        Rule {
            id: id.to_string(),
            fragment_id: String::new(),
            head,
            body,
            constraints: Vec::new(),
            provenance: None,
            assumptions: Vec::new(),
            notes: None,
        }
    }

    /// True when the body is empty - the rule is an unconditional fact
    pub fn is_fact(&self) -> bool {
        self.body.is_empty()
    }

    /// Body atoms without negation
    pub fn positive_body_atoms(&self) -> impl Iterator<Item = &Atom> {
        self.body.iter().filter(|a| !a.negated)
    }

    /// Body atoms with `negated = true` (NAF)
    pub fn negated_body_atoms(&self) -> impl Iterator<Item = &Atom> {
        self.body.iter().filter(|a| a.negated)
    }

    /// Get all variables in the rule (head + body)
    pub fn all_variables(&self) -> HashSet<String> {
        let mut vars = self.head.variables();
        for atom in &self.body {
            vars.extend(atom.variables());
        }
        vars
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.id.is_empty() {
            write!(f, "[{}] ", self.id)?;
        }
        write!(f, "{}", self.head)?;
        if !self.body.is_empty() {
            f.write_str(" :- ")?;
            for (i, atom) in self.body.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{atom}")?;
            }
        }
        f.write_str(".")
    }
}

/// A named condition: required facts plus optional context facts
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionDefinition {
    /// Condition identifier, pattern `^[a-z][a-z0-9_]*$`
    pub id: String,
    /// Human description of the condition
    #[serde(default)]
    pub meaning_pl: String,
    /// Atoms that MUST hold for the condition to be met
    #[serde(default)]
    pub required_facts: Vec<Atom>,
    /// Atoms that may hold; never expanded into required semantics
    #[serde(default)]
    pub optional_facts: Vec<Atom>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
    #[serde(default)]
    pub assumptions: Vec<ScopedAssumption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ConditionDefinition {
    /// All atoms: required + optional
    pub fn all_facts(&self) -> impl Iterator<Item = &Atom> {
        self.required_facts.iter().chain(self.optional_facts.iter())
    }
}

/// One EDB fact as it appears in the case-facts file. Args may be JSON
/// scalars; they are coerced to strings when seeding the fact store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FactInput {
    pub pred: String,
    #[serde(default)]
    pub args: Vec<serde_json::Value>,
}

impl FactInput {
    /// Coerce each argument to its string form (the solver works on strings)
    pub fn arg_strings(&self) -> Vec<String> {
        self.args.iter().map(scalar_to_string).collect()
    }
}

fn scalar_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// The extensional database for one case
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaseFacts {
    #[serde(default)]
    pub case_id: String,
    #[serde(default = "default_domain")]
    pub domain: String,
    #[serde(default)]
    pub facts: Vec<FactInput>,
}

fn default_domain() -> String {
    "generic".to_string()
}

impl CaseFacts {
    /// Parse a case-facts JSON document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests;
