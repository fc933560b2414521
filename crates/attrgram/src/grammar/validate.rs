//! # Grammar Validation
//!
//! Whole-grammar checks that table construction relies on. Each check reports
//! the first kind of fault it finds, naming every symbol implicated in it.
//!
//! [`Grammar::validate`] runs them in a fixed order and stops at the first
//! failure:
//!
//! 1. [`Grammar::assert_no_bogons`]
//! 2. [`Grammar::assert_well_founded`]
//! 3. [`Grammar::assert_no_orphans`]
//! 4. [`Grammar::assert_no_rename_loops`]
//! 5. [`Grammar::assert_no_epsilon_loops`]

use crate::error::{GrammarError, Result};
use crate::grammar::{FirstSets, Grammar, Rule, Symbol, SymbolMap, SymbolSet, symbol_map, symbol_set};
use crate::graph::{strongly_connected_components, transitive_closure};
use std::collections::BTreeSet;

/// Options relaxing [`Grammar::validate_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationOptions {
    /// Log unreachable symbols as a warning instead of failing.
    ///
    /// Handy while a grammar is still being written.
    pub allow_unreachable: bool,
}

impl ValidationOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn allow_unreachable(mut self, allow: bool) -> Self {
        self.allow_unreachable = allow;
        self
    }
}

impl<O> Grammar<O> {
    /// Check every whole-grammar invariant, failing on the first violation.
    ///
    /// Call this once construction is complete and before handing the grammar
    /// to table construction.
    ///
    /// # Errors
    ///
    /// The first fault raised by the checks listed in the [module docs](self).
    pub fn validate(&self) -> Result<()> {
        self.validate_with(&ValidationOptions::default())
    }

    /// [`Grammar::validate`] with some checks relaxed.
    ///
    /// # Errors
    ///
    /// As [`Grammar::validate`], less whatever `options` relaxes.
    pub fn validate_with(&self, options: &ValidationOptions) -> Result<()> {
        tracing::debug!(
            symbols = self.symbols().len(),
            rules = self.rule_count(),
            start = self.start_symbols().len(),
            "validating grammar"
        );
        self.assert_no_bogons()?;
        self.assert_well_founded()?;
        match self.assert_no_orphans() {
            Err(GrammarError::UnreachableSymbols(symbols)) if options.allow_unreachable => {
                tracing::warn!(
                    symbols = %format_symbols(&symbols),
                    "ignoring unreachable symbols"
                );
            }
            result => result?,
        }
        self.assert_no_rename_loops()?;
        self.assert_no_epsilon_loops()?;
        tracing::debug!("grammar is valid");
        Ok(())
    }

    /// Bogus symbols only anchor precedence levels; no rule may produce one.
    ///
    /// # Errors
    ///
    /// [`GrammarError::RuleProducesBogusToken`] citing the first offending rule.
    pub fn assert_no_bogons(&self) -> Result<()> {
        let bogons: SymbolSet = self.precedence_table().bogus_symbols().cloned().collect();
        tracing::debug!(bogons = bogons.len(), "checking for bogus symbols");
        if bogons.is_empty() {
            return Ok(());
        }
        match self
            .rules()
            .iter()
            .position(|rule| rule.rhs.iter().any(|symbol| bogons.contains(symbol)))
        {
            Some(id) => Err(GrammarError::RuleProducesBogusToken(id)),
            None => Ok(()),
        }
    }

    /// Every non-terminal must be able to derive some finite string of terminals.
    ///
    /// Terminals are well-founded, and so is the left-hand side of any rule whose
    /// right-hand side is entirely well-founded. Rules are swept repeatedly until
    /// a sweep settles nothing new. Examples of ill-founded grammars:
    ///
    /// ```text
    /// S -> x S
    /// A -> B y ;  B -> A x
    /// ```
    ///
    /// # Errors
    ///
    /// [`GrammarError::IllFoundedSymbols`] naming the left-hand sides still
    /// unsettled when progress stops.
    pub fn assert_well_founded(&self) -> Result<()> {
        let mut well_founded = self.apparent_terminals();
        let mut pending: Vec<&Rule<O>> = self.rules().iter().collect();
        let mut sweeps = 0usize;

        while !pending.is_empty() {
            sweeps += 1;
            let mut blocked = Vec::new();
            for rule in &pending {
                if well_founded.contains(&rule.lhs) {
                    continue;
                }
                if rule.rhs.iter().all(|symbol| well_founded.contains(symbol)) {
                    well_founded.insert(rule.lhs.clone());
                } else {
                    blocked.push(*rule);
                }
            }
            if blocked.len() == pending.len() {
                let stuck: BTreeSet<Symbol> = blocked.iter().map(|rule| rule.lhs.clone()).collect();
                tracing::debug!(sweeps, stuck = stuck.len(), "well-foundedness check failed");
                return Err(GrammarError::IllFoundedSymbols(stuck));
            }
            pending = blocked;
        }

        tracing::debug!(sweeps, "grammar is well-founded");
        Ok(())
    }

    /// Every symbol must be reachable from some start symbol.
    ///
    /// Symbols that only appear in precedence declarations are not part of the
    /// symbol universe and are never reported.
    ///
    /// # Errors
    ///
    /// [`GrammarError::UnreachableSymbols`] naming every symbol outside the
    /// closure of the start set.
    pub fn assert_no_orphans(&self) -> Result<()> {
        let mut produces: SymbolMap<SymbolSet> = symbol_map();
        for rule in self.rules() {
            produces
                .entry(rule.lhs.clone())
                .or_insert_with(symbol_set)
                .extend(rule.rhs.iter().cloned());
        }

        let reachable = transitive_closure(self.start_symbols().iter().cloned(), |symbol| {
            produces.get(symbol).into_iter().flatten().cloned()
        });
        let unreachable: BTreeSet<Symbol> = self
            .symbols()
            .iter()
            .filter(|symbol| !reachable.contains(*symbol))
            .cloned()
            .collect();

        tracing::debug!(
            reachable = reachable.len(),
            unreachable = unreachable.len(),
            "checked reachability"
        );
        if unreachable.is_empty() {
            Ok(())
        } else {
            Err(GrammarError::UnreachableSymbols(unreachable))
        }
    }

    /// No symbol may be replaced by itself through a chain of rename rules.
    ///
    /// Only rules for which [`Rule::is_rename`] holds take part.
    ///
    /// # Errors
    ///
    /// [`GrammarError::RenamingLoop`] naming every symbol on a renaming cycle.
    pub fn assert_no_rename_loops(&self) -> Result<()> {
        let mut broken = BTreeSet::new();
        let mut renames: SymbolMap<SymbolSet> = symbol_map();

        for rule in self.rules().iter().filter(|rule| rule.is_rename()) {
            let [target] = rule.rhs.as_slice() else {
                continue;
            };
            if *target == rule.lhs {
                broken.insert(rule.lhs.clone());
            } else {
                renames
                    .entry(rule.lhs.clone())
                    .or_insert_with(symbol_set)
                    .insert(target.clone());
            }
        }
        collect_cycles(&renames, &mut broken);

        tracing::debug!(
            renames = renames.len(),
            broken = broken.len(),
            "checked rename loops"
        );
        if broken.is_empty() {
            Ok(())
        } else {
            Err(GrammarError::RenamingLoop(broken))
        }
    }

    /// No non-terminal may regenerate itself through nullable symbols alone.
    ///
    /// Epsilon left self-recursion, where a rule's leading nullable symbol is its
    /// own left-hand side and more symbols follow, is allowed. Every other
    /// nullable cycle is rejected.
    ///
    /// A unit rule `A -> X` makes `A` depend on `X` whether or not `X` is
    /// nullable, so `A -> A` and unit cycles through constructing rules are
    /// caught here even though [`Grammar::assert_no_rename_loops`] ignores them.
    ///
    /// # Errors
    ///
    /// [`GrammarError::EpsilonLoop`] naming the symbols involved.
    pub fn assert_no_epsilon_loops(&self) -> Result<()> {
        self.assert_no_epsilon_loops_with(&self.find_first_and_epsilon())
    }

    /// [`Grammar::assert_no_epsilon_loops`] reusing previously computed
    /// [`FirstSets`].
    ///
    /// # Errors
    ///
    /// [`GrammarError::EpsilonLoop`] naming the symbols involved.
    pub fn assert_no_epsilon_loops_with(&self, sets: &FirstSets) -> Result<()> {
        let mut broken = BTreeSet::new();
        let mut reaches: SymbolMap<SymbolSet> = symbol_map();

        for rule in self.rules() {
            let prefix: &[Symbol] = match rule.rhs.as_slice() {
                // a unit body regenerates its symbol with nothing else consumed
                unit @ [_] => unit,
                body => {
                    let nullable = body
                        .iter()
                        .take_while(|symbol| sets.is_nullable(symbol))
                        .count();
                    match &body[..nullable] {
                        [first, rest @ ..] if *first == rule.lhs => rest,
                        prefix => prefix,
                    }
                }
            };
            if prefix.is_empty() {
                continue;
            }
            if prefix.contains(&rule.lhs) {
                broken.insert(rule.lhs.clone());
            }
            reaches
                .entry(rule.lhs.clone())
                .or_insert_with(symbol_set)
                .extend(prefix.iter().cloned());
        }
        collect_cycles(&reaches, &mut broken);

        tracing::debug!(
            nullable = sets.epsilon.len(),
            broken = broken.len(),
            "checked epsilon loops"
        );
        if broken.is_empty() {
            Ok(())
        } else {
            Err(GrammarError::EpsilonLoop(broken))
        }
    }
}

/// Add the members of every multi-symbol strongly connected component to `broken`.
fn collect_cycles(graph: &SymbolMap<SymbolSet>, broken: &mut BTreeSet<Symbol>) {
    for component in strongly_connected_components(graph) {
        if component.len() > 1 {
            broken.extend(component);
        }
    }
}

fn format_symbols(symbols: &BTreeSet<Symbol>) -> String {
    symbols
        .iter()
        .map(Symbol::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Associativity, Attribute};

    fn set(names: &[&str]) -> BTreeSet<Symbol> {
        names.iter().map(|&n| Symbol::from(n)).collect()
    }

    fn rename(g: &mut Grammar, lhs: &str, target: &str) {
        g.declare_rule(lhs, [target], None, Attribute::rename(0), ())
            .unwrap();
    }

    fn construct(g: &mut Grammar, lhs: &str, rhs: &[&str]) {
        let places = 0..rhs.len();
        g.declare_rule(lhs, rhs.iter().copied(), None, Attribute::construct("node", places), ())
            .unwrap();
    }

    #[test]
    fn test_options_builder() {
        assert!(!ValidationOptions::default().allow_unreachable);
        assert!(ValidationOptions::new().allow_unreachable(true).allow_unreachable);
    }

    #[test]
    fn test_empty_grammar_is_valid() {
        let g: Grammar = Grammar::new();
        assert_eq!(g.validate(), Ok(()));
    }

    #[test]
    fn test_bogons() {
        let mut g = Grammar::new();
        g.declare_precedence_level(Associativity::Bogus, ["$error_anchor"])
            .unwrap();
        construct(&mut g, "S", &["a"]);
        assert_eq!(g.assert_no_bogons(), Ok(()));

        construct(&mut g, "S", &["a", "$error_anchor"]);
        assert_eq!(g.assert_no_bogons(), Err(GrammarError::RuleProducesBogusToken(1)));
    }

    #[test]
    fn test_ill_founded_self_recursion() {
        let mut g = Grammar::new();
        construct(&mut g, "S", &["x", "S"]);
        assert_eq!(
            g.assert_well_founded(),
            Err(GrammarError::IllFoundedSymbols(set(&["S"])))
        );
    }

    #[test]
    fn test_well_founded_needs_several_sweeps() {
        let mut g = Grammar::new();
        // declared so that each sweep settles only one more symbol
        construct(&mut g, "A", &["B", "a"]);
        construct(&mut g, "B", &["C", "b"]);
        construct(&mut g, "C", &["c"]);
        assert_eq!(g.assert_well_founded(), Ok(()));
    }

    #[test]
    fn test_orphans() {
        let mut g = Grammar::new();
        construct(&mut g, "S", &["a"]);
        construct(&mut g, "T", &["b"]);
        g.add_start("S");
        assert_eq!(
            g.assert_no_orphans(),
            Err(GrammarError::UnreachableSymbols(set(&["T", "b"])))
        );
        g.add_start("T");
        assert_eq!(g.assert_no_orphans(), Ok(()));
    }

    #[test]
    fn test_precedence_only_symbols_are_not_orphans() {
        let mut g = Grammar::new();
        g.declare_precedence_level(Associativity::Left, ["+"]).unwrap();
        construct(&mut g, "S", &["a"]);
        g.add_start("S");
        assert_eq!(g.assert_no_orphans(), Ok(()));
    }

    #[test]
    fn test_allow_unreachable() {
        let mut g = Grammar::new();
        construct(&mut g, "S", &["a"]);
        construct(&mut g, "T", &["b"]);
        g.add_start("S");
        assert!(matches!(g.validate(), Err(GrammarError::UnreachableSymbols(_))));
        let options = ValidationOptions::new().allow_unreachable(true);
        assert_eq!(g.validate_with(&options), Ok(()));
    }

    #[test]
    fn test_rename_self_loop() {
        let mut g = Grammar::new();
        rename(&mut g, "A", "A");
        assert_eq!(
            g.assert_no_rename_loops(),
            Err(GrammarError::RenamingLoop(set(&["A"])))
        );
    }

    #[test]
    fn test_rename_cycle() {
        let mut g = Grammar::new();
        rename(&mut g, "S", "A");
        rename(&mut g, "A", "B");
        rename(&mut g, "B", "S");
        rename(&mut g, "B", "x");
        assert_eq!(
            g.assert_no_rename_loops(),
            Err(GrammarError::RenamingLoop(set(&["A", "B", "S"])))
        );
    }

    #[test]
    fn test_wrapping_unit_cycle_is_an_epsilon_loop() {
        let mut g = Grammar::new();
        construct(&mut g, "S", &["A"]);
        construct(&mut g, "A", &["S"]);
        construct(&mut g, "S", &["x"]);
        assert_eq!(g.assert_no_rename_loops(), Ok(()));
        assert_eq!(
            g.assert_no_epsilon_loops(),
            Err(GrammarError::EpsilonLoop(set(&["A", "S"])))
        );
    }

    #[test]
    fn test_wrapping_self_unit_rule() {
        let mut g = Grammar::new();
        construct(&mut g, "A", &[]);
        construct(&mut g, "A", &["A"]);
        assert_eq!(g.assert_no_rename_loops(), Ok(()));
        assert_eq!(
            g.assert_no_epsilon_loops(),
            Err(GrammarError::EpsilonLoop(set(&["A"])))
        );

        // not nullable, still a cycle
        let mut g = Grammar::new();
        construct(&mut g, "B", &["b"]);
        construct(&mut g, "B", &["B"]);
        assert_eq!(
            g.assert_no_epsilon_loops(),
            Err(GrammarError::EpsilonLoop(set(&["B"])))
        );
    }

    #[test]
    fn test_unit_chain_without_cycle() {
        let mut g = Grammar::new();
        construct(&mut g, "S", &["A"]);
        construct(&mut g, "A", &["B"]);
        construct(&mut g, "B", &["b"]);
        assert_eq!(g.assert_no_epsilon_loops(), Ok(()));
    }

    #[test]
    fn test_epsilon_left_self_recursion_is_allowed() {
        let mut g = Grammar::new();
        construct(&mut g, "L", &[]);
        construct(&mut g, "L", &["L", "x"]);
        construct(&mut g, "L", &["L", "M"]);
        construct(&mut g, "M", &[]);
        assert_eq!(g.assert_no_epsilon_loops(), Ok(()));
    }

    #[test]
    fn test_epsilon_self_loop_after_prefix() {
        let mut g = Grammar::new();
        construct(&mut g, "A", &[]);
        construct(&mut g, "A", &["A", "A"]);
        assert_eq!(
            g.assert_no_epsilon_loops(),
            Err(GrammarError::EpsilonLoop(set(&["A"])))
        );
    }

    #[test]
    fn test_epsilon_mutual_loop() {
        let mut g = Grammar::new();
        construct(&mut g, "A", &[]);
        construct(&mut g, "A", &["B"]);
        construct(&mut g, "B", &["A"]);
        assert_eq!(
            g.assert_no_epsilon_loops(),
            Err(GrammarError::EpsilonLoop(set(&["A", "B"])))
        );
    }

    #[test]
    fn test_epsilon_loop_stops_at_non_nullable() {
        let mut g = Grammar::new();
        construct(&mut g, "A", &[]);
        construct(&mut g, "A", &["x", "B"]);
        construct(&mut g, "B", &["A"]);
        construct(&mut g, "B", &["b"]);
        assert_eq!(g.assert_no_epsilon_loops(), Ok(()));
    }

    #[test]
    fn test_stage_order() {
        // ill-founded and unreachable: well-foundedness is reported first
        let mut g = Grammar::new();
        construct(&mut g, "S", &["x"]);
        construct(&mut g, "A", &["B", "y"]);
        construct(&mut g, "B", &["A", "x"]);
        g.add_start("S");
        assert_eq!(
            g.validate(),
            Err(GrammarError::IllFoundedSymbols(set(&["A", "B"])))
        );
    }
}
