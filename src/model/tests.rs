//! Tests for the data model and its wire formats

use super::*;

mod term_tests {
    use super::*;

    #[test]
    fn test_from_token() {
        assert_eq!(Term::from_token("?X"), Term::var("X"));
        assert_eq!(Term::from_token("confirmed"), Term::constant("confirmed"));
        assert_eq!(Term::from_token("?Offer1"), Term::var("Offer1"));
    }

    #[test]
    fn test_token_round_trip() {
        for token in ["?X", "?BidPrice", "ord-1", "150", "active"] {
            assert_eq!(Term::from_token(token).token(), token);
        }
    }

    #[test]
    fn test_var_accessors() {
        let term = Term::var("X");
        assert!(term.is_var());
        assert!(!term.is_const());
        assert_eq!(term.var_name(), Some("X"));
        assert_eq!(term.const_value(), None);
    }

    #[test]
    fn test_const_accessors() {
        let term = Term::constant("ord-1");
        assert!(term.is_const());
        assert_eq!(term.const_value(), Some("ord-1"));
        assert_eq!(term.var_name(), None);
    }

    #[test]
    fn test_serde_wire_format() {
        let term: Term = serde_json::from_str("\"?X\"").unwrap();
        assert_eq!(term, Term::var("X"));
        assert_eq!(serde_json::to_string(&term).unwrap(), "\"?X\"");

        let term: Term = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(term, Term::constant("pending"));
    }
}

mod atom_tests {
    use super::*;

    #[test]
    fn test_atom_creation() {
        let atom = Atom::new("edge", vec![Term::var("X"), Term::constant("b")]);
        assert_eq!(atom.pred, "edge");
        assert_eq!(atom.arity(), 2);
        assert!(!atom.negated);
    }

    #[test]
    fn test_atom_variables() {
        let atom = Atom::new(
            "order_amount",
            vec![Term::var("O"), Term::var("A"), Term::constant("x")],
        );
        let vars = atom.variables();
        assert_eq!(vars.len(), 2);
        assert!(vars.contains("O"));
        assert!(vars.contains("A"));
    }

    #[test]
    fn test_ground_atom() {
        let ground = Atom::new("edge", vec![Term::constant("a"), Term::constant("b")]);
        assert!(ground.is_ground());

        let open = Atom::new("edge", vec![Term::var("X"), Term::constant("b")]);
        assert!(!open.is_ground());
    }

    #[test]
    fn test_negated_defaults_to_false_on_the_wire() {
        let atom: Atom =
            serde_json::from_str(r#"{"pred": "married", "args": ["?X"]}"#).unwrap();
        assert!(!atom.negated);

        let atom: Atom =
            serde_json::from_str(r#"{"pred": "married", "args": ["?X"], "negated": true}"#)
                .unwrap();
        assert!(atom.negated);
    }

    #[test]
    fn test_display() {
        let atom = Atom::new("edge", vec![Term::var("X"), Term::constant("b")]);
        assert_eq!(atom.to_string(), "edge(?X, b)");

        let naf = Atom::negative("married", vec![Term::var("X")]);
        assert_eq!(naf.to_string(), "not married(?X)");

        let nullary = Atom::new("is_valid", vec![]);
        assert_eq!(nullary.to_string(), "is_valid");
    }
}

mod rule_tests {
    use super::*;

    #[test]
    fn test_fact_rule() {
        let rule = Rule::new("R-f", Atom::new("person", vec![Term::constant("a")]), vec![]);
        assert!(rule.is_fact());
    }

    #[test]
    fn test_body_partitions() {
        let rule = Rule::new(
            "R-single",
            Atom::new("single", vec![Term::var("X")]),
            vec![
                Atom::new("person", vec![Term::var("X")]),
                Atom::negative("married", vec![Term::var("X")]),
            ],
        );
        assert_eq!(rule.positive_body_atoms().count(), 1);
        assert_eq!(rule.negated_body_atoms().count(), 1);
        assert_eq!(rule.all_variables().len(), 1);
    }

    #[test]
    fn test_wire_defaults() {
        let rule: Rule = serde_json::from_str(
            r#"{
                "id": "R-1",
                "head": {"pred": "single", "args": ["?X"]},
                "body": [{"pred": "person", "args": ["?X"]}]
            }"#,
        )
        .unwrap();
        assert_eq!(rule.fragment_id, "");
        assert!(rule.constraints.is_empty());
        assert!(rule.assumptions.is_empty());
        assert!(rule.provenance.is_none());
    }

    #[test]
    fn test_display() {
        let rule = Rule::new(
            "R-single",
            Atom::new("single", vec![Term::var("X")]),
            vec![
                Atom::new("person", vec![Term::var("X")]),
                Atom::negative("married", vec![Term::var("X")]),
            ],
        );
        assert_eq!(
            rule.to_string(),
            "[R-single] single(?X) :- person(?X), not married(?X)."
        );
    }
}

mod condition_tests {
    use super::*;

    #[test]
    fn test_all_facts_order() {
        let cond: ConditionDefinition = serde_json::from_str(
            r#"{
                "id": "buyer_active",
                "meaning_pl": "buyer account is active",
                "required_facts": [
                    {"pred": "account_status", "args": ["?U", "active"]}
                ],
                "optional_facts": [
                    {"pred": "verified", "args": ["?U"]}
                ]
            }"#,
        )
        .unwrap();
        let all: Vec<&Atom> = cond.all_facts().collect();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].pred, "account_status");
        assert_eq!(all[1].pred, "verified");
    }
}

mod case_facts_tests {
    use super::*;

    #[test]
    fn test_scalar_args_coerce_to_strings() {
        let case = CaseFacts::from_json(
            r#"{
                "case_id": "case-001",
                "domain": "event",
                "facts": [
                    {"pred": "order_amount", "args": ["ord-1", 150]},
                    {"pred": "verified", "args": [true]}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(case.facts[0].arg_strings(), vec!["ord-1", "150"]);
        assert_eq!(case.facts[1].arg_strings(), vec!["true"]);
    }

    #[test]
    fn test_domain_defaults_to_generic() {
        let case = CaseFacts::from_json(r#"{"case_id": "c", "facts": []}"#).unwrap();
        assert_eq!(case.domain, "generic");
    }
}
