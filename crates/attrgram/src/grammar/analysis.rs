//! # FIRST Sets and Nullability
//!
//! [`Grammar::find_first_and_epsilon`] answers two questions at once:
//!
//! - Which terminals can a derivation from symbol `X` begin with?
//! - Which symbols can derive the empty string?
//!
//! The computation never iterates to a fixed point. A worklist settles
//! nullability and the direct "may begin with" relation, parking the rest of a
//! rule until the symbol it is waiting on turns out nullable. Left recursion
//! then shows up as cycles in that relation, which a single pass over its
//! strongly connected components folds away.

use crate::grammar::{Grammar, RuleId, Symbol, SymbolMap, SymbolSet, symbol_map, symbol_set};
use crate::graph::strongly_connected_components;

/// FIRST sets and the nullable set of a grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstSets {
    /// Terminals that can begin a derivation, for every symbol.
    /// A terminal's FIRST set is the terminal itself.
    pub first: SymbolMap<SymbolSet>,
    /// Symbols that can derive the empty string.
    pub epsilon: SymbolSet,
}

impl FirstSets {
    /// FIRST set of a symbol. `None` for a symbol the grammar never mentions.
    #[must_use]
    pub fn first_of(&self, symbol: &str) -> Option<&SymbolSet> {
        self.first.get(symbol)
    }

    #[must_use]
    pub fn is_nullable(&self, symbol: &str) -> bool {
        self.epsilon.contains(symbol)
    }

    /// FIRST set of a symbol string, and whether the whole string is nullable.
    ///
    /// An unknown symbol is taken to be a terminal.
    #[must_use]
    pub fn first_of_sequence(&self, symbols: &[Symbol]) -> (SymbolSet, bool) {
        let mut first = symbol_set();
        for symbol in symbols {
            match self.first.get(symbol) {
                Some(set) => first.extend(set.iter().cloned()),
                None => {
                    first.insert(symbol.clone());
                }
            }
            if !self.epsilon.contains(symbol) {
                return (first, false);
            }
        }
        (first, true)
    }
}

impl<O> Grammar<O> {
    /// Compute the FIRST set of every symbol and the set of nullable symbols.
    ///
    /// Pure and repeatable: recomputing on an unchanged grammar gives equal
    /// results, so callers are free to compute once and reuse.
    #[must_use]
    pub fn find_first_and_epsilon(&self) -> FirstSets {
        let mut epsilon = symbol_set();
        let mut first: SymbolMap<SymbolSet> = self
            .symbols()
            .iter()
            .map(|symbol| {
                let mut seed = symbol_set();
                seed.insert(symbol.clone());
                (symbol.clone(), seed)
            })
            .collect();

        // (rule, position): nothing before `position` blocks the rule any more
        let mut work: Vec<(RuleId, usize)> = (0..self.rule_count()).map(|id| (id, 0)).collect();
        let mut hangar: SymbolMap<Vec<(RuleId, usize)>> = symbol_map();

        while let Some((id, position)) = work.pop() {
            let Some(rule) = self.rule(id) else {
                continue;
            };
            match rule.rhs.get(position) {
                None => {
                    epsilon.insert(rule.lhs.clone());
                    if let Some(waiting) = hangar.remove(&rule.lhs) {
                        work.extend(waiting);
                    }
                }
                Some(symbol) => {
                    if let Some(set) = first.get_mut(&rule.lhs) {
                        set.insert(symbol.clone());
                    }
                    if epsilon.contains(symbol) {
                        work.push((id, position + 1));
                    } else {
                        hangar
                            .entry(symbol.clone())
                            .or_default()
                            .push((id, position + 1));
                    }
                }
            }
        }

        let components = strongly_connected_components(&first);
        tracing::debug!(
            symbols = first.len(),
            components = components.len(),
            nullable = epsilon.len(),
            "computed direct FIRST relation"
        );

        // Components arrive callees first, so everything a component depends on
        // outside itself is already final.
        for component in components {
            let mut shared = symbol_set();
            for member in &component {
                let Some(direct) = first.get(member) else {
                    continue;
                };
                for symbol in direct {
                    if let Some(set) = first.get(symbol) {
                        shared.extend(set.iter().cloned());
                    }
                }
            }
            shared.retain(|symbol| !self.is_nonterminal(symbol));
            for member in component {
                first.insert(member, shared.clone());
            }
        }

        FirstSets { first, epsilon }
    }
}
