//! Textual goal parser
//!
//! Accepts `pred` or `pred(arg, ...)` where each arg is a `?Var` or a
//! constant token, optionally in single or double quotes. A missing
//! parenthesized list means zero arguments.

use std::fmt;
use std::sync::OnceLock;

use regex_lite::Regex;

use crate::model::Term;

/// Goal parse failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalParseError {
    pub message: String,
}

impl GoalParseError {
    fn new(message: String) -> Self {
        GoalParseError { message }
    }
}

impl fmt::Display for GoalParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Goal parse error: {}", self.message)
    }
}

impl std::error::Error for GoalParseError {}

fn goal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([a-z][a-z0-9_]*)\s*(?:\(([^)]*)\))?\s*$").unwrap())
}

/// Parse a goal string into predicate name and argument terms.
///
/// ```
/// use lexlog::solver::parse_goal;
/// use lexlog::model::Term;
///
/// let (pred, args) = parse_goal("reach(a, ?Z)").unwrap();
/// assert_eq!(pred, "reach");
/// assert_eq!(args, vec![Term::constant("a"), Term::var("Z")]);
/// ```
pub fn parse_goal(goal: &str) -> Result<(String, Vec<Term>), GoalParseError> {
    let trimmed = goal.trim();
    let captures = goal_re()
        .captures(trimmed)
        .ok_or_else(|| GoalParseError::new(format!("invalid goal format: '{goal}'")))?;

    let pred = captures[1].to_string();
    let raw_args = captures.get(2).map(|m| m.as_str().trim()).unwrap_or("");

    if raw_args.is_empty() {
        return Ok((pred, Vec::new()));
    }

    let mut args = Vec::new();
    for raw in raw_args.split(',') {
        let token = raw.trim().trim_matches(|c| c == '"' || c == '\'');
        if token.is_empty() {
            return Err(GoalParseError::new(format!(
                "empty argument in goal: '{goal}'"
            )));
        }
        args.push(Term::from_token(token));
    }

    Ok((pred, args))
}
