//! Validation report: stable error codes, error records, report value
//!
//! Validation never uses the error channel - the validator returns a
//! `ValidationReport` and callers decide per rule whether to drop, fix or
//! escalate (codes and `expected_fix` strings are machine-actionable).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::Rule;

/// Stable error codes exposed on the validation boundary (stages A-F)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // A - structural schema
    SchemaViolation,

    // B - predicates and arity
    PredUnknown,
    ArityMismatch,
    PredNotAllowedInHead,
    PredNotAllowedInBody,
    NegationNotAllowedForPred,

    // C - arguments / enums
    VarNaming,
    EnumValueInvalid,

    // D - safety (range restriction + NAF safety)
    VarUnboundHead,
    VarUnboundNegated,
    ConstraintsNotEmpty,

    // E - provenance
    ProvenanceEmptyUnit,
    ProvenanceEmptyQuote,
    QuoteNotInSource,

    // F - scoped assumptions
    AssumptionPredInvalid,
    AssumptionBadAtomIndex,
    AssumptionBadArgIndex,
    AssumptionConstMismatch,
    AssumptionRequiredClosedWorld,
}

impl ErrorCode {
    /// The stable wire string of this code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::SchemaViolation => "SCHEMA_VIOLATION",
            ErrorCode::PredUnknown => "PRED_UNKNOWN",
            ErrorCode::ArityMismatch => "ARITY_MISMATCH",
            ErrorCode::PredNotAllowedInHead => "PRED_NOT_ALLOWED_IN_HEAD",
            ErrorCode::PredNotAllowedInBody => "PRED_NOT_ALLOWED_IN_BODY",
            ErrorCode::NegationNotAllowedForPred => "NEGATION_NOT_ALLOWED_FOR_PRED",
            ErrorCode::VarNaming => "VAR_NAMING",
            ErrorCode::EnumValueInvalid => "ENUM_VALUE_INVALID",
            ErrorCode::VarUnboundHead => "VAR_UNBOUND_HEAD",
            ErrorCode::VarUnboundNegated => "VAR_UNBOUND_NEGATED",
            ErrorCode::ConstraintsNotEmpty => "CONSTRAINTS_NOT_EMPTY",
            ErrorCode::ProvenanceEmptyUnit => "PROVENANCE_EMPTY_UNIT",
            ErrorCode::ProvenanceEmptyQuote => "PROVENANCE_EMPTY_QUOTE",
            ErrorCode::QuoteNotInSource => "QUOTE_NOT_IN_SOURCE",
            ErrorCode::AssumptionPredInvalid => "ASSUMPTION_PRED_INVALID",
            ErrorCode::AssumptionBadAtomIndex => "ASSUMPTION_BAD_ATOM_INDEX",
            ErrorCode::AssumptionBadArgIndex => "ASSUMPTION_BAD_ARG_INDEX",
            ErrorCode::AssumptionConstMismatch => "ASSUMPTION_CONST_MISMATCH",
            ErrorCode::AssumptionRequiredClosedWorld => "ASSUMPTION_REQUIRED_CLOSED_WORLD",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation finding
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationError {
    /// Stable code identifying the error class
    pub code: ErrorCode,
    /// JSON-Pointer-style path locating the offence, e.g. "/body/0/pred"
    pub path: String,
    /// Human-readable description
    pub message: String,
    /// Short mechanical fix instruction
    pub expected_fix: String,
    /// Extra machine-readable data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ValidationError {
    pub fn new(code: ErrorCode, path: &str, message: String, expected_fix: String) -> Self {
        ValidationError {
            code,
            path: path.to_string(),
            message,
            expected_fix,
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Result of validating one rule
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True when there are no errors (warnings do not count)
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<String>,
    /// Rule with defaults filled in; None when stage A failed
    pub normalized_rule: Option<Rule>,
}

impl ValidationReport {
    /// A failed report carrying only stage-A errors
    pub(crate) fn schema_failure(errors: Vec<ValidationError>, warnings: Vec<String>) -> Self {
        ValidationReport {
            is_valid: false,
            errors,
            warnings,
            normalized_rule: None,
        }
    }
}
