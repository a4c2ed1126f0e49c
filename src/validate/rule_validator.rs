//! Rule validator: six-stage pipeline A-F
//!
//! Stage A checks the raw JSON structure and short-circuits the rest on
//! failure. Stages B-F run on the normalized typed rule:
//!   B - predicates and arity (whitelist, arity, allowed_in)
//!   C - enumerated argument values
//!   D - Datalog safety (range restriction, NAF safety, variable naming)
//!   E - provenance (unit, quote, quote-in-source)
//!   F - scoped assumptions (references + closed-world enforcement)
//!
//! The validator never fails as an operation: it always returns a
//! `ValidationReport`.

use std::collections::BTreeSet;
use std::collections::HashSet;
use std::sync::OnceLock;

use regex_lite::Regex;
use serde_json::{json, Value};

use crate::manifest::{ManifestIndex, PredEntry, WhitelistMode};
use crate::model::{AssumptionType, Atom, Rule, ScopedAssumption, Term};

use super::normalize::normalize_rule;
use super::report::{ErrorCode, ValidationError, ValidationReport};
use super::schema::check_rule_schema;

/// Error cap: further stages are skipped once this many errors accumulated
const MAX_ERRORS: usize = 20;

/// Valid variable token: ?X, ?Offer1, ?BidPrice, ...
fn var_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\?[A-Za-z][A-Za-z0-9_]*$").unwrap())
}

/// Collapse every whitespace run to a single space, for quote comparison
fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Validator for Horn rules against a predicate manifest
pub struct RuleValidator<'a> {
    index: &'a ManifestIndex,
}

impl<'a> RuleValidator<'a> {
    pub fn new(index: &'a ManifestIndex) -> Self {
        RuleValidator { index }
    }

    /// Validate a raw rule JSON document (stages A-F).
    ///
    /// `source_text` is the full document fragment the rule was extracted
    /// from; when given, the provenance quote must occur in it.
    pub fn validate_json(&self, rule_json: &Value, source_text: Option<&str>) -> ValidationReport {
        let mut errors: Vec<ValidationError> = Vec::new();
        let warnings: Vec<String> = Vec::new();

        // A - structural schema; fail fast, later stages assume shape
        check_rule_schema(rule_json, &mut errors);
        if !errors.is_empty() {
            return ValidationReport::schema_failure(errors, warnings);
        }

        let rule: Rule = match serde_json::from_value(rule_json.clone()) {
            Ok(rule) => rule,
            Err(e) => {
                errors.push(ValidationError::new(
                    ErrorCode::SchemaViolation,
                    "/",
                    format!("rule does not deserialize: {e}"),
                    "Fix the rule JSON so it matches the rule schema.".to_string(),
                ));
                return ValidationReport::schema_failure(errors, warnings);
            }
        };

        self.validate(&rule, source_text)
    }

    /// Validate an already-typed rule (stages B-F; the typed value is
    /// structurally sound by construction).
    pub fn validate(&self, rule: &Rule, source_text: Option<&str>) -> ValidationReport {
        let mut errors: Vec<ValidationError> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();

        let rule = normalize_rule(rule);

        // B - predicates and arity
        self.stage_predicates(&rule, &mut errors, &mut warnings);

        // C - enum values
        if errors.len() < MAX_ERRORS {
            self.stage_enums(&rule, &mut errors);
        }

        // D - safety
        if errors.len() < MAX_ERRORS {
            self.stage_safety(&rule, &mut errors, &mut warnings);
        }

        // E - provenance
        if errors.len() < MAX_ERRORS {
            self.stage_provenance(&rule, &mut errors, source_text);
        }

        // F - assumptions
        if errors.len() < MAX_ERRORS {
            self.stage_assumptions(&rule, &mut errors);
        }

        tracing::debug!(
            "Validated rule '{}': {} error(s), {} warning(s)",
            rule.id,
            errors.len(),
            warnings.len()
        );

        ValidationReport {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            normalized_rule: Some(rule),
        }
    }

    // ------------------------------------------------------------------
    // Stage B - predicates and arity (head + body)
    // ------------------------------------------------------------------

    fn stage_predicates(
        &self,
        rule: &Rule,
        errors: &mut Vec<ValidationError>,
        warnings: &mut Vec<String>,
    ) {
        self.check_atom(&rule.head, "/head", true, errors, warnings);
        for (i, atom) in rule.body.iter().enumerate() {
            self.check_atom(atom, &format!("/body/{i}"), false, errors, warnings);
        }
    }

    fn check_atom(
        &self,
        atom: &Atom,
        path: &str,
        in_head: bool,
        errors: &mut Vec<ValidationError>,
        warnings: &mut Vec<String>,
    ) {
        let Some(entry) = self.index.lookup_by_name(&atom.pred) else {
            match self.index.whitelist_mode() {
                WhitelistMode::AllowUnlisted => {
                    warnings.push(format!(
                        "predicate '{}' is not in the manifest; admitted under \
                         allow_unlisted, arity and allowed_in checks skipped",
                        atom.pred
                    ));
                }
                WhitelistMode::AllowOnlyListed => {
                    errors.push(
                        ValidationError::new(
                            ErrorCode::PredUnknown,
                            &format!("{path}/pred"),
                            format!("predicate '{}' does not exist in the manifest", atom.pred),
                            format!(
                                "Use a predicate from the manifest or add '{}' to it.",
                                atom.pred
                            ),
                        )
                        .with_details(json!({ "pred": atom.pred })),
                    );
                }
            }
            return; // nothing more to check without an entry
        };

        if atom.args.len() != entry.arity {
            errors.push(
                ValidationError::new(
                    ErrorCode::ArityMismatch,
                    &format!("{path}/args"),
                    format!(
                        "predicate '{}' requires {} arg(s), got {}",
                        atom.pred,
                        entry.arity,
                        atom.args.len()
                    ),
                    format!(
                        "Provide exactly {} argument(s) for '{}'.",
                        entry.arity, atom.pred
                    ),
                )
                .with_details(json!({ "expected": entry.arity, "actual": atom.args.len() })),
            );
        }

        if in_head {
            if !entry.allowed_in_head {
                errors.push(
                    ValidationError::new(
                        ErrorCode::PredNotAllowedInHead,
                        &format!("{path}/pred"),
                        format!(
                            "predicate '{}' (io={:?}) may not head a rule",
                            atom.pred, entry.io
                        ),
                        "Head predicates must be derived or both; change the predicate \
                         or set allowed_in.head=true in the manifest."
                            .to_string(),
                    )
                    .with_details(json!({ "pred": atom.pred, "io": entry.io })),
                );
            }
        } else if atom.negated {
            if !entry.allowed_in_negated_body && !self.index.is_naf_closed_world(&entry.pred) {
                errors.push(
                    ValidationError::new(
                        ErrorCode::NegationNotAllowedForPred,
                        &format!("{path}/pred"),
                        format!(
                            "NAF negation of '{}' is not allowed: \
                             allowed_in.negated_body=false and the predicate is not \
                             in naf_closed_world",
                            atom.pred
                        ),
                        format!(
                            "Add '{}' to policy.naf_closed_world_predicates or set \
                             allowed_in.negated_body=true in the manifest.",
                            entry.pred
                        ),
                    )
                    .with_details(json!({ "pred": entry.pred })),
                );
            }
        } else if !entry.allowed_in_body {
            errors.push(
                ValidationError::new(
                    ErrorCode::PredNotAllowedInBody,
                    &format!("{path}/pred"),
                    format!("predicate '{}' may not appear in a rule body", atom.pred),
                    format!("Check allowed_in.body for '{}' in the manifest.", atom.pred),
                )
                .with_details(json!({ "pred": atom.pred })),
            );
        }
    }

    // ------------------------------------------------------------------
    // Stage C - enumerated argument values
    // ------------------------------------------------------------------

    fn stage_enums(&self, rule: &Rule, errors: &mut Vec<ValidationError>) {
        self.check_enum_args(&rule.head, "/head", errors);
        for (i, atom) in rule.body.iter().enumerate() {
            self.check_enum_args(atom, &format!("/body/{i}"), errors);
        }
    }

    fn check_enum_args(&self, atom: &Atom, path: &str, errors: &mut Vec<ValidationError>) {
        let Some(entry) = self.index.lookup_by_name(&atom.pred) else {
            return;
        };
        let (Some(enum_arg_index), Some(allowed)) = (entry.enum_arg_index, &entry.allowed_values)
        else {
            return;
        };

        let k = enum_arg_index - 1; // 1-based in the manifest
        let Some(Term::Const(value)) = atom.args.get(k) else {
            return; // variables are accepted at the enum position
        };

        if !allowed.contains(value) {
            let mut sorted: Vec<&String> = allowed.iter().collect();
            sorted.sort();
            errors.push(
                ValidationError::new(
                    ErrorCode::EnumValueInvalid,
                    &format!("{path}/args/{k}"),
                    format!(
                        "value '{}' is not allowed for predicate '{}' (argument {})",
                        value,
                        atom.pred,
                        k + 1
                    ),
                    format!(
                        "Use one of: {}.",
                        sorted
                            .iter()
                            .map(|s| s.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                )
                .with_details(json!({ "allowed": sorted, "got": value })),
            );
        }
    }

    // ------------------------------------------------------------------
    // Stage D - safety (range restriction + NAF safety + naming)
    // ------------------------------------------------------------------

    fn stage_safety(
        &self,
        rule: &Rule,
        errors: &mut Vec<ValidationError>,
        warnings: &mut Vec<String>,
    ) {
        // Variables bound by positive body atoms
        let pos_vars: HashSet<String> = rule
            .positive_body_atoms()
            .flat_map(|a| a.variables())
            .collect();

        // Range restriction: head variables must be bound
        for arg in &rule.head.args {
            if let Term::Var(name) = arg {
                if !pos_vars.contains(name) {
                    errors.push(
                        ValidationError::new(
                            ErrorCode::VarUnboundHead,
                            "/head/args",
                            format!(
                                "head variable '?{name}' is not bound by any positive body atom"
                            ),
                            format!(
                                "Add a positive body atom that grounds the variable '?{name}'."
                            ),
                        )
                        .with_details(json!({ "var": format!("?{name}") })),
                    );
                }
            }
        }

        // NAF safety: negated-atom variables must be bound positively
        for (i, atom) in rule.body.iter().enumerate() {
            if !atom.negated {
                continue;
            }
            for arg in &atom.args {
                if let Term::Var(name) = arg {
                    if !pos_vars.contains(name) {
                        errors.push(
                            ValidationError::new(
                                ErrorCode::VarUnboundNegated,
                                &format!("/body/{i}"),
                                format!(
                                    "variable '?{name}' in negated atom body[{i}] is not \
                                     bound by the positive body"
                                ),
                                format!(
                                    "Add a positive atom that grounds '?{name}' before the \
                                     negated body[{i}]."
                                ),
                            )
                            .with_details(json!({ "var": format!("?{name}"), "atom_index": i })),
                        );
                    }
                }
            }
        }

        // Variable naming
        let head_path = "/head".to_string();
        let atoms = std::iter::once((&rule.head, head_path)).chain(
            rule.body
                .iter()
                .enumerate()
                .map(|(i, a)| (a, format!("/body/{i}"))),
        );
        for (atom, apath) in atoms {
            for arg in &atom.args {
                if arg.is_var() && !var_re().is_match(&arg.token()) {
                    errors.push(
                        ValidationError::new(
                            ErrorCode::VarNaming,
                            &format!("{apath}/args"),
                            format!(
                                "variable '{}' does not match ^\\?[A-Za-z][A-Za-z0-9_]*$",
                                arg.token()
                            ),
                            format!(
                                "Rename '{}' to a valid variable, e.g. '?X' or '?Offer1'.",
                                arg.token()
                            ),
                        )
                        .with_details(json!({ "var": arg.token() })),
                    );
                }
            }
        }

        // Non-Horn constraints are tolerated but discouraged
        if !rule.constraints.is_empty() {
            warnings.push(format!(
                "rule carries {} non-Horn constraint(s); preferred value is an empty list",
                rule.constraints.len()
            ));
        }
    }

    // ------------------------------------------------------------------
    // Stage E - provenance
    // ------------------------------------------------------------------

    fn stage_provenance(
        &self,
        rule: &Rule,
        errors: &mut Vec<ValidationError>,
        source_text: Option<&str>,
    ) {
        let Some(prov) = &rule.provenance else {
            return;
        };

        if prov.unit.is_empty() {
            errors.push(ValidationError::new(
                ErrorCode::ProvenanceEmptyUnit,
                "/provenance/unit",
                "provenance.unit is empty - no document unit identifier".to_string(),
                "Provide a section or paragraph identifier, e.g. [\"3.1(b)\"].".to_string(),
            ));
        }

        if prov.quote.trim().is_empty() {
            errors.push(ValidationError::new(
                ErrorCode::ProvenanceEmptyQuote,
                "/provenance/quote",
                "provenance.quote is empty - no source quote".to_string(),
                "Paste a short verbatim fragment of the document (max 400 chars).".to_string(),
            ));
        } else if let Some(source) = source_text {
            if !normalize_ws(source).contains(&normalize_ws(&prov.quote)) {
                let preview: String = prov.quote.chars().take(100).collect();
                errors.push(
                    ValidationError::new(
                        ErrorCode::QuoteNotInSource,
                        "/provenance/quote",
                        "quote not found in the source text (after whitespace \
                         normalization)"
                            .to_string(),
                        "Use a verbatim fragment of the source text as the quote.".to_string(),
                    )
                    .with_details(json!({ "quote_preview": preview })),
                );
            }
        }
    }

    // ------------------------------------------------------------------
    // Stage F - scoped assumptions
    // ------------------------------------------------------------------

    fn stage_assumptions(&self, rule: &Rule, errors: &mut Vec<ValidationError>) {
        // Closed-world predicates used under negation require a matching
        // closed_world assumption.
        let mut negated_cw: BTreeSet<String> = BTreeSet::new();
        for atom in rule.negated_body_atoms() {
            if let Some(entry) = self.index.lookup_by_name(&atom.pred) {
                if self.index.is_naf_closed_world(&entry.pred) {
                    negated_cw.insert(entry.pred.clone());
                }
            }
        }

        let mut cw_covered: HashSet<&str> = HashSet::new();
        for (a_idx, assumption) in rule.assumptions.iter().enumerate() {
            if assumption.kind == AssumptionType::ClosedWorld {
                cw_covered.insert(assumption.about.pred.as_str());
            }
            self.check_assumption(assumption, a_idx, &rule.body, errors);
        }

        for pred in &negated_cw {
            if !cw_covered.contains(pred.as_str()) {
                errors.push(
                    ValidationError::new(
                        ErrorCode::AssumptionRequiredClosedWorld,
                        "/assumptions",
                        format!(
                            "predicate '{pred}' is used under NAF and belongs to \
                             naf_closed_world - an assumption of type 'closed_world' \
                             is required"
                        ),
                        format!(
                            "Add to assumptions: {{\"about\": {{\"pred\": \"{pred}\"}}, \
                             \"type\": \"closed_world\", \"text\": \"...\"}}."
                        ),
                    )
                    .with_details(json!({ "pred": pred })),
                );
            }
        }
    }

    fn check_assumption(
        &self,
        assumption: &ScopedAssumption,
        a_idx: usize,
        body: &[Atom],
        errors: &mut Vec<ValidationError>,
    ) {
        let about = &assumption.about;

        // Prefer a "name/arity" match, fall back to the bare name
        let entry: Option<&PredEntry> = self.index.lookup_by_pred(&about.pred).or_else(|| {
            let name = about.pred.split('/').next().unwrap_or(&about.pred);
            self.index.lookup_by_name(name)
        });

        let Some(entry) = entry else {
            errors.push(
                ValidationError::new(
                    ErrorCode::AssumptionPredInvalid,
                    &format!("/assumptions/{a_idx}/about/pred"),
                    format!(
                        "predicate '{}' in the assumption does not exist in the manifest",
                        about.pred
                    ),
                    "Use the 'name/arity' form (e.g. 'delivery_status/2') and make sure \
                     the predicate is in the manifest."
                        .to_string(),
                )
                .with_details(json!({ "pred": about.pred })),
            );
            return;
        };

        let Some(atom_index) = about.atom_index else {
            return;
        };

        if atom_index >= body.len() {
            errors.push(
                ValidationError::new(
                    ErrorCode::AssumptionBadAtomIndex,
                    &format!("/assumptions/{a_idx}/about/atom_index"),
                    format!(
                        "atom_index={} is outside the rule body (body has {} atom(s), \
                         indices 0..{})",
                        atom_index,
                        body.len(),
                        body.len().saturating_sub(1)
                    ),
                    format!(
                        "Use atom_index in the range 0..{}.",
                        body.len().saturating_sub(1)
                    ),
                )
                .with_details(json!({ "atom_index": atom_index, "body_len": body.len() })),
            );
            return; // remaining checks need a valid atom_index
        }

        let Some(arg_index) = about.arg_index else {
            return;
        };

        if arg_index < 1 || arg_index > entry.arity {
            errors.push(
                ValidationError::new(
                    ErrorCode::AssumptionBadArgIndex,
                    &format!("/assumptions/{a_idx}/about/arg_index"),
                    format!(
                        "arg_index={} is out of range for '{}' (arity={}, allowed: 1..{})",
                        arg_index, entry.pred, entry.arity, entry.arity
                    ),
                    format!("Use arg_index in the range 1..{}.", entry.arity),
                )
                .with_details(json!({ "arg_index": arg_index, "arity": entry.arity })),
            );
        } else if let Some(expected) = &about.constant {
            let k = arg_index - 1; // 1-based on the wire
            if let Some(Term::Const(actual)) = body[atom_index].args.get(k) {
                if actual != expected {
                    errors.push(
                        ValidationError::new(
                            ErrorCode::AssumptionConstMismatch,
                            &format!("/assumptions/{a_idx}/about/const"),
                            format!(
                                "const='{expected}' does not match \
                                 body[{atom_index}].args[{k}]='{actual}'"
                            ),
                            format!(
                                "Change const to '{actual}' or fix atom_index/arg_index."
                            ),
                        )
                        .with_details(json!({ "expected": actual, "got": expected })),
                    );
                }
            }
        }
    }
}
