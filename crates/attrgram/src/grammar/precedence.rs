//! # Operator Precedence
//!
//! Precedence levels and the shift/reduce policy derived from them.
//!
//! Levels are numbered in declaration order and a later level binds tighter,
//! the same convention Bison and Lemon use. With
//!
//! ```text
//! %left '+' '-'
//! %left '*' '/'
//! ```
//!
//! `*` outranks `+` because its level was declared second.

use crate::error::{GrammarError, Result};
use crate::grammar::{Symbol, SymbolMap, symbol_map};

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Associativity tag of a precedence level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Associativity {
    Left,
    Right,
    NonAssoc,
    /// The level exists only to be referenced as an explicit rule anchor.
    /// Its symbols must never appear in a rule body.
    Bogus,
}

/// What table construction should do about a shift/reduce conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Shift,
    Reduce,
    /// The operators do not associate; the input is an error at this point.
    Error,
}

impl Associativity {
    /// The conflict resolution this tag stands for.
    ///
    /// Returns `None` for [`Associativity::Bogus`], which never takes part in
    /// conflict resolution.
    #[must_use]
    pub const fn resolution(self) -> Option<Resolution> {
        match self {
            Self::Left => Some(Resolution::Reduce),
            Self::Right => Some(Resolution::Shift),
            Self::NonAssoc => Some(Resolution::Error),
            Self::Bogus => None,
        }
    }
}

/// Index of a precedence level. Higher binds tighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct PrecedenceLevel(pub usize);

impl PrecedenceLevel {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Declared precedence levels and the terminals assigned to them.
#[derive(Debug, Clone)]
pub struct PrecedenceTable {
    levels: Vec<Associativity>,
    token_level: SymbolMap<PrecedenceLevel>,
}

impl Default for PrecedenceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PrecedenceTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            levels: Vec::new(),
            token_level: symbol_map(),
        }
    }

    /// Allocate a new level above every existing one and assign `symbols` to it.
    ///
    /// Nothing is recorded unless every symbol is accepted. Callers are
    /// responsible for rejecting non-terminals first.
    pub(crate) fn declare(
        &mut self,
        associativity: Associativity,
        symbols: Vec<Symbol>,
    ) -> Result<PrecedenceLevel> {
        if symbols.is_empty() {
            return Err(GrammarError::EmptyPrecedenceLevel(associativity));
        }
        for (i, symbol) in symbols.iter().enumerate() {
            if self.token_level.contains_key(symbol) || symbols[..i].contains(symbol) {
                return Err(GrammarError::PrecedenceDeclaredTwice(symbol.clone()));
            }
        }

        let level = PrecedenceLevel(self.levels.len());
        self.levels.push(associativity);
        for symbol in symbols {
            self.token_level.insert(symbol, level);
        }
        Ok(level)
    }

    /// The level a symbol was assigned to, if any.
    #[must_use]
    pub fn level_of(&self, symbol: &str) -> Option<PrecedenceLevel> {
        self.token_level.get(symbol).copied()
    }

    /// The associativity tag of a level.
    #[must_use]
    pub fn associativity(&self, level: PrecedenceLevel) -> Option<Associativity> {
        self.levels.get(level.0).copied()
    }

    /// Number of declared levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Symbols whose level is tagged [`Associativity::Bogus`].
    pub fn bogus_symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.token_level
            .iter()
            .filter(|&(_, &level)| self.associativity(level) == Some(Associativity::Bogus))
            .map(|(symbol, _)| symbol)
    }

    /// First symbol of `rhs` that has a declared level.
    ///
    /// This deliberately skips leading terminals that carry no precedence, so the
    /// inferred anchor is the operator actually involved in the ambiguity.
    #[must_use]
    pub fn infer_precedence_symbol<'a>(&self, rhs: &'a [Symbol]) -> Option<&'a Symbol> {
        rhs.iter().find(|symbol| self.token_level.contains_key(*symbol))
    }

    /// Compare a rule's level with a lookahead's level.
    ///
    /// A lookahead that binds tighter than the rule wins the shift (`Right`);
    /// a looser one loses to the reduction (`Left`); at equal levels the level's
    /// own tag decides.
    pub(crate) fn compare(
        &self,
        rule_level: PrecedenceLevel,
        symbol_level: PrecedenceLevel,
    ) -> Option<Associativity> {
        match rule_level.cmp(&symbol_level) {
            std::cmp::Ordering::Less => Some(Associativity::Right),
            std::cmp::Ordering::Greater => Some(Associativity::Left),
            std::cmp::Ordering::Equal => self.associativity(rule_level),
        }
    }
}
