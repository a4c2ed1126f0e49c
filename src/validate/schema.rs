//! Stage A: structural check of the rule JSON
//!
//! Walks the raw `serde_json::Value` and reports every structural offence
//! as `SCHEMA_VIOLATION` with a JSON-Pointer path. Any failure here aborts
//! stages B-F: the later stages assume a well-shaped rule.

use std::sync::OnceLock;

use regex_lite::Regex;
use serde_json::Value;

use super::report::{ErrorCode, ValidationError};

const MAX_QUOTE_LEN: usize = 400;

const ASSUMPTION_TYPES: &[&str] = &[
    "data_contract",
    "data_semantics",
    "enumeration",
    "closed_world",
    "external_computation",
    "conflict_resolution",
    "missing_predicate",
];

fn rule_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_\-]*$").unwrap())
}

fn pred_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z][a-z0-9_]*$").unwrap())
}

fn violation(path: &str, message: String) -> ValidationError {
    ValidationError::new(
        ErrorCode::SchemaViolation,
        path,
        message,
        format!("Fix the schema violation at {path}."),
    )
}

/// Run the structural check, appending findings to `errors`.
pub fn check_rule_schema(rule_json: &Value, errors: &mut Vec<ValidationError>) {
    let Some(obj) = rule_json.as_object() else {
        errors.push(violation("/", "rule must be a JSON object".to_string()));
        return;
    };

    // id
    match obj.get("id") {
        Some(Value::String(id)) if rule_id_re().is_match(id) => {}
        Some(Value::String(id)) => {
            errors.push(violation(
                "/id",
                format!("rule id '{id}' does not match ^[A-Za-z][A-Za-z0-9_\\-]*$"),
            ));
        }
        Some(_) => errors.push(violation("/id", "id must be a string".to_string())),
        None => errors.push(violation("/", "missing required field 'id'".to_string())),
    }

    // head
    match obj.get("head") {
        Some(head) => {
            check_atom_schema(head, "/head", errors);
            if let Some(negated) = head.get("negated").and_then(Value::as_bool) {
                if negated {
                    errors.push(violation(
                        "/head/negated",
                        "rule head must not be negated".to_string(),
                    ));
                }
            }
        }
        None => errors.push(violation("/", "missing required field 'head'".to_string())),
    }

    // body
    match obj.get("body") {
        Some(Value::Array(body)) => {
            for (i, atom) in body.iter().enumerate() {
                check_atom_schema(atom, &format!("/body/{i}"), errors);
            }
        }
        Some(_) => errors.push(violation("/body", "body must be an array".to_string())),
        None => errors.push(violation("/", "missing required field 'body'".to_string())),
    }

    // constraints
    if let Some(constraints) = obj.get("constraints") {
        match constraints.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    if !item.is_string() {
                        errors.push(violation(
                            &format!("/constraints/{i}"),
                            "constraint must be a string".to_string(),
                        ));
                    }
                }
            }
            None => errors.push(violation(
                "/constraints",
                "constraints must be an array of strings".to_string(),
            )),
        }
    }

    // provenance
    if let Some(prov) = obj.get("provenance") {
        check_provenance_schema(prov, errors);
    }

    // assumptions
    if let Some(assumptions) = obj.get("assumptions") {
        match assumptions.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    check_assumption_schema(item, &format!("/assumptions/{i}"), errors);
                }
            }
            None => errors.push(violation(
                "/assumptions",
                "assumptions must be an array".to_string(),
            )),
        }
    }

    // notes
    if let Some(notes) = obj.get("notes") {
        if !notes.is_string() && !notes.is_null() {
            errors.push(violation("/notes", "notes must be a string".to_string()));
        }
    }
}

fn check_atom_schema(atom: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    let Some(obj) = atom.as_object() else {
        errors.push(violation(path, "atom must be a JSON object".to_string()));
        return;
    };

    match obj.get("pred") {
        Some(Value::String(pred)) if pred_re().is_match(pred) => {}
        Some(Value::String(pred)) => {
            errors.push(violation(
                &format!("{path}/pred"),
                format!("predicate name '{pred}' does not match ^[a-z][a-z0-9_]*$"),
            ));
        }
        Some(_) => errors.push(violation(
            &format!("{path}/pred"),
            "pred must be a string".to_string(),
        )),
        None => errors.push(violation(
            path,
            "missing required field 'pred'".to_string(),
        )),
    }

    match obj.get("args") {
        Some(Value::Array(args)) => {
            for (i, arg) in args.iter().enumerate() {
                if !arg.is_string() {
                    errors.push(violation(
                        &format!("{path}/args/{i}"),
                        "argument must be a string".to_string(),
                    ));
                }
            }
        }
        Some(_) => errors.push(violation(
            &format!("{path}/args"),
            "args must be an array of strings".to_string(),
        )),
        None => errors.push(violation(
            path,
            "missing required field 'args'".to_string(),
        )),
    }

    if let Some(negated) = obj.get("negated") {
        if !negated.is_boolean() {
            errors.push(violation(
                &format!("{path}/negated"),
                "negated must be a boolean".to_string(),
            ));
        }
    }
}

fn check_provenance_schema(prov: &Value, errors: &mut Vec<ValidationError>) {
    let Some(obj) = prov.as_object() else {
        errors.push(violation(
            "/provenance",
            "provenance must be a JSON object".to_string(),
        ));
        return;
    };

    match obj.get("unit") {
        Some(Value::Array(unit)) => {
            for (i, u) in unit.iter().enumerate() {
                if !u.is_string() {
                    errors.push(violation(
                        &format!("/provenance/unit/{i}"),
                        "unit entry must be a string".to_string(),
                    ));
                }
            }
        }
        Some(_) => errors.push(violation(
            "/provenance/unit",
            "unit must be an array of strings".to_string(),
        )),
        None => errors.push(violation(
            "/provenance",
            "missing required field 'unit'".to_string(),
        )),
    }

    match obj.get("quote") {
        Some(Value::String(quote)) => {
            if quote.chars().count() > MAX_QUOTE_LEN {
                errors.push(violation(
                    "/provenance/quote",
                    format!("quote exceeds {MAX_QUOTE_LEN} characters"),
                ));
            }
        }
        Some(_) => errors.push(violation(
            "/provenance/quote",
            "quote must be a string".to_string(),
        )),
        None => errors.push(violation(
            "/provenance",
            "missing required field 'quote'".to_string(),
        )),
    }
}

fn check_assumption_schema(assumption: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    let Some(obj) = assumption.as_object() else {
        errors.push(violation(path, "assumption must be a JSON object".to_string()));
        return;
    };

    match obj.get("about") {
        Some(Value::Object(about)) => {
            match about.get("pred") {
                Some(Value::String(_)) => {}
                Some(_) => errors.push(violation(
                    &format!("{path}/about/pred"),
                    "about.pred must be a string".to_string(),
                )),
                None => errors.push(violation(
                    &format!("{path}/about"),
                    "missing required field 'pred'".to_string(),
                )),
            }
            if let Some(atom_index) = about.get("atom_index") {
                if atom_index.as_u64().is_none() {
                    errors.push(violation(
                        &format!("{path}/about/atom_index"),
                        "atom_index must be a non-negative integer".to_string(),
                    ));
                }
            }
            if let Some(arg_index) = about.get("arg_index") {
                if arg_index.as_u64().map_or(true, |v| v < 1) {
                    errors.push(violation(
                        &format!("{path}/about/arg_index"),
                        "arg_index must be an integer >= 1".to_string(),
                    ));
                }
            }
            if let Some(constant) = about.get("const") {
                if !constant.is_string() {
                    errors.push(violation(
                        &format!("{path}/about/const"),
                        "const must be a string".to_string(),
                    ));
                }
            }
        }
        Some(_) => errors.push(violation(
            &format!("{path}/about"),
            "about must be a JSON object".to_string(),
        )),
        None => errors.push(violation(
            path,
            "missing required field 'about'".to_string(),
        )),
    }

    match obj.get("type") {
        Some(Value::String(kind)) if ASSUMPTION_TYPES.contains(&kind.as_str()) => {}
        Some(Value::String(kind)) => errors.push(violation(
            &format!("{path}/type"),
            format!(
                "unknown assumption type '{kind}' (expected one of: {})",
                ASSUMPTION_TYPES.join(", ")
            ),
        )),
        Some(_) => errors.push(violation(
            &format!("{path}/type"),
            "type must be a string".to_string(),
        )),
        None => errors.push(violation(
            path,
            "missing required field 'type'".to_string(),
        )),
    }

    match obj.get("text") {
        Some(Value::String(_)) => {}
        Some(_) => errors.push(violation(
            &format!("{path}/text"),
            "text must be a string".to_string(),
        )),
        None => errors.push(violation(
            path,
            "missing required field 'text'".to_string(),
        )),
    }
}
