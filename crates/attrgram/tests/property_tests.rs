//! Property-based tests for grammar construction and analysis
//!
//! Grammars are generated over a small alphabet so that recursion, nullable
//! symbols and duplicates all turn up regularly.

use attrgram::{Attribute, Grammar, GrammarError, Symbol};
use proptest::prelude::*;

const NONTERMINALS: &[&str] = &["S", "A", "B", "C", "D"];
const TERMINALS: &[&str] = &["a", "b", "c", "+", "("];

fn symbol() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        proptest::sample::select(NONTERMINALS),
        proptest::sample::select(TERMINALS),
    ]
}

fn rule() -> impl Strategy<Value = (&'static str, Vec<&'static str>)> {
    (
        proptest::sample::select(NONTERMINALS),
        proptest::collection::vec(symbol(), 0..4),
    )
}

fn build(rules: &[(&'static str, Vec<&'static str>)]) -> Grammar<usize> {
    let mut g = Grammar::new();
    for (i, (lhs, rhs)) in rules.iter().enumerate() {
        let attribute = Attribute::construct("node", 0..rhs.len());
        // duplicates are expected and simply skipped
        let _ = g.declare_rule(*lhs, rhs.iter().copied(), None, attribute, i);
    }
    g
}

proptest! {
    #[test]
    fn terminals_and_nonterminals_partition_symbols(rules in proptest::collection::vec(rule(), 0..12)) {
        let g = build(&rules);
        let terminals = g.apparent_terminals();
        let nonterminals: Vec<&Symbol> = g.nonterminals().collect();

        for n in &nonterminals {
            prop_assert!(!terminals.contains(*n));
        }
        prop_assert_eq!(terminals.len() + nonterminals.len(), g.symbols().len());
    }

    #[test]
    fn attributes_stay_within_bounds(
        rhs in proptest::collection::vec(symbol(), 0..5),
        places in proptest::collection::vec(0usize..6, 0..4),
    ) {
        let mut g: Grammar = Grammar::new();
        let fits = places.iter().all(|&p| p < rhs.len());
        let result = g.declare_rule("S", rhs.iter().copied(), None, Attribute::construct("f", places), ());
        match result {
            Ok(id) => {
                prop_assert!(fits);
                let rule = g.rule(id).unwrap();
                prop_assert!(rule.attribute.positions().iter().all(|&p| p < rule.rhs.len()));
            }
            Err(GrammarError::AttributeOutOfBounds { len, .. }) => {
                prop_assert!(!fits);
                prop_assert_eq!(len, rhs.len());
                prop_assert_eq!(g.rule_count(), 0);
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    #[test]
    fn duplicates_rejected_whatever_the_attribute(
        (lhs, rhs) in rule(),
        position in 0usize..4,
    ) {
        let mut g = Grammar::new();
        g.declare_rule(lhs, rhs.iter().copied(), None, Attribute::construct("first", []), 0)
            .unwrap();
        let attribute = if position < rhs.len() {
            Attribute::rename(position)
        } else {
            Attribute::construct("second", [])
        };
        let again = g.declare_rule(lhs, rhs.iter().copied(), None, attribute, 1);
        let is_duplicate = matches!(again, Err(GrammarError::DuplicateRule { .. }));
        prop_assert!(is_duplicate);
        prop_assert_eq!(g.rule_count(), 1);
    }

    #[test]
    fn first_sets_are_idempotent(rules in proptest::collection::vec(rule(), 0..12)) {
        let g = build(&rules);
        prop_assert_eq!(g.find_first_and_epsilon(), g.find_first_and_epsilon());
    }

    #[test]
    fn first_sets_contain_only_terminals(rules in proptest::collection::vec(rule(), 0..12)) {
        let g = build(&rules);
        let sets = g.find_first_and_epsilon();
        for (symbol, first) in &sets.first {
            for terminal in first {
                prop_assert!(g.is_terminal(terminal), "{} in FIRST({})", terminal, symbol);
            }
        }
        for symbol in &sets.epsilon {
            prop_assert!(g.is_nonterminal(symbol));
        }
    }

    #[test]
    fn first_sets_cover_leading_terminals(rules in proptest::collection::vec(rule(), 1..12)) {
        let g = build(&rules);
        let sets = g.find_first_and_epsilon();
        for rule in g.rules() {
            let (body, _) = sets.first_of_sequence(&rule.rhs);
            let lhs = sets.first_of(&rule.lhs).unwrap();
            for terminal in &body {
                prop_assert!(lhs.contains(terminal));
            }
        }
    }

    #[test]
    fn validation_is_deterministic(rules in proptest::collection::vec(rule(), 0..12)) {
        let mut g = build(&rules);
        g.add_start("S");
        prop_assert_eq!(g.validate(), g.validate());
    }
}
