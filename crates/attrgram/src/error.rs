//! # Error Types
//!
//! Every fault this crate reports is a [`GrammarError`].
//!
//! ## Overview
//!
//! Faults fall into two groups:
//!
//! - **Declaration faults**: raised by [`Grammar::declare_rule`] and
//!   [`Grammar::declare_precedence_level`] at the call that caused them, so the
//!   blame lands on the responsible declaration.
//! - **Validation faults**: raised by [`Grammar::validate`] once construction is
//!   complete. Validation stops at the first failing check.
//!
//! None of these are transient. The grammar has to be corrected and rebuilt.
//!
//! ## Diagnostics Support
//!
//! When the `diagnostics` feature is enabled, errors integrate with [`miette`]
//! and carry a stable `grammar::*` code per variant.
//!
//! [`Grammar::declare_rule`]: crate::grammar::Grammar::declare_rule
//! [`Grammar::declare_precedence_level`]: crate::grammar::Grammar::declare_precedence_level
//! [`Grammar::validate`]: crate::grammar::Grammar::validate

use crate::grammar::{Associativity, RuleId, Symbol};
use std::collections::BTreeSet;
use thiserror::Error;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

/// Result alias used throughout the crate.
pub type Result<T, E = GrammarError> = std::result::Result<T, E>;

/// A fault in the construction or structure of a grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum GrammarError {
    #[error("Non-terminal '{0}' cannot have a precedence level")]
    #[cfg_attr(
        feature = "diagnostics",
        diagnostic(
            code(grammar::nonterminal_precedence),
            help("precedence levels apply to terminals only")
        )
    )]
    NonTerminalsCannotHavePrecedence(Symbol),

    #[error("Precedence declared twice for '{0}'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::precedence_twice)))]
    PrecedenceDeclaredTwice(Symbol),

    /// `existing` is the id of the rule already declared with this body.
    #[error("Duplicate rule: {lhs} -> {} (already declared as rule {existing})", format_sequence(.rhs))]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::duplicate_rule)))]
    DuplicateRule {
        lhs: Symbol,
        rhs: Vec<Symbol>,
        existing: RuleId,
    },

    #[error("Attribute of a rule for '{lhs}' refers to position {position}, but the right-hand side has {len} symbol(s)")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::attribute_bounds)))]
    AttributeOutOfBounds {
        lhs: Symbol,
        position: usize,
        len: usize,
    },

    #[error("{0:?} precedence level declared without any symbols")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::empty_level)))]
    EmptyPrecedenceLevel(Associativity),

    #[error("Rule {rule} takes its precedence from '{symbol}', which has no precedence level")]
    #[cfg_attr(
        feature = "diagnostics",
        diagnostic(
            code(grammar::undeclared_anchor),
            help("declare a precedence level containing the anchor symbol")
        )
    )]
    UndeclaredPrecedenceAnchor { rule: RuleId, symbol: Symbol },

    #[error("No rule with id {0}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::unknown_rule)))]
    UnknownRule(RuleId),

    #[error("Grammar has no start symbol")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::missing_start)))]
    MissingStartSymbol,

    #[error("Bogus precedence level reached while resolving '{symbol}' against rule {rule}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::bogus_conflict)))]
    BogusPrecedenceConflict { symbol: Symbol, rule: RuleId },

    #[error("Rule {0} produces a bogus token")]
    #[cfg_attr(
        feature = "diagnostics",
        diagnostic(
            code(grammar::bogus_token),
            help("bogus symbols only anchor precedence levels and may not appear in a rule body")
        )
    )]
    RuleProducesBogusToken(RuleId),

    #[error("Ill-founded symbols: {}", format_set(.0))]
    #[cfg_attr(
        feature = "diagnostics",
        diagnostic(
            code(grammar::ill_founded),
            help("every non-terminal needs an alternative that eventually derives only terminals")
        )
    )]
    IllFoundedSymbols(BTreeSet<Symbol>),

    #[error("Unreachable symbols: {}", format_set(.0))]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::unreachable)))]
    UnreachableSymbols(BTreeSet<Symbol>),

    #[error("Renaming loop among: {}", format_set(.0))]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::renaming_loop)))]
    RenamingLoop(BTreeSet<Symbol>),

    #[error("Epsilon loop among: {}", format_set(.0))]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::epsilon_loop)))]
    EpsilonLoop(BTreeSet<Symbol>),
}

impl GrammarError {
    /// Whether this fault comes from [`Grammar::validate`](crate::grammar::Grammar::validate)
    /// rather than from a single declaration.
    #[must_use]
    pub const fn is_validation_fault(&self) -> bool {
        matches!(
            self,
            Self::RuleProducesBogusToken(_)
                | Self::IllFoundedSymbols(_)
                | Self::UnreachableSymbols(_)
                | Self::RenamingLoop(_)
                | Self::EpsilonLoop(_)
        )
    }

    /// The symbols implicated by this fault, if it names any.
    #[must_use]
    pub fn symbols(&self) -> Vec<&Symbol> {
        match self {
            Self::NonTerminalsCannotHavePrecedence(symbol)
            | Self::PrecedenceDeclaredTwice(symbol)
            | Self::UndeclaredPrecedenceAnchor { symbol, .. }
            | Self::BogusPrecedenceConflict { symbol, .. } => vec![symbol],
            Self::DuplicateRule { lhs, .. } | Self::AttributeOutOfBounds { lhs, .. } => vec![lhs],
            Self::IllFoundedSymbols(set)
            | Self::UnreachableSymbols(set)
            | Self::RenamingLoop(set)
            | Self::EpsilonLoop(set) => set.iter().collect(),
            Self::EmptyPrecedenceLevel(_)
            | Self::UnknownRule(_)
            | Self::MissingStartSymbol
            | Self::RuleProducesBogusToken(_) => Vec::new(),
        }
    }
}

fn format_set(symbols: &BTreeSet<Symbol>) -> String {
    symbols
        .iter()
        .map(Symbol::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_sequence(symbols: &[Symbol]) -> String {
    if symbols.is_empty() {
        return "ε".to_string();
    }
    symbols
        .iter()
        .map(Symbol::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}
