//! # Grammar Module
//!
//! An attributed context-free grammar with operator precedence declarations.
//!
//! ## Overview
//!
//! A [`Grammar`] is built up incrementally and then validated once:
//!
//! - **Rules**: [`Grammar::declare_rule`] appends a production together with its
//!   attribute descriptor, optional precedence anchor and provenance token.
//! - **Precedence**: [`Grammar::declare_precedence_level`] opens a new level that
//!   binds tighter than every level declared before it.
//! - **Start symbols**: [`Grammar::add_start`] lists one or more entry points
//!   sharing the same rules.
//! - **Validation**: [`Grammar::validate`] checks the whole-grammar invariants
//!   table construction depends on and reports the first violation.
//!
//! Symbols are plain names. A symbol is a non-terminal exactly when it is the
//! left-hand side of some rule; every other symbol is (apparently) a terminal.
//!
//! ## Usage
//!
//! ```rust
//! use attrgram::grammar::{Associativity, Attribute, Grammar};
//!
//! let mut grammar: Grammar<u32> = Grammar::new();
//! grammar.declare_precedence_level(Associativity::Left, ["+"])?;
//! grammar.declare_precedence_level(Associativity::Left, ["*"])?;
//!
//! let add = grammar.declare_rule("E", ["E", "+", "E"], None, Attribute::construct("add", [0, 2]), 1)?;
//! grammar.declare_rule("E", ["E", "*", "E"], None, Attribute::construct("mul", [0, 2]), 2)?;
//! grammar.declare_rule("E", ["num"], None, Attribute::rename(0), 3)?;
//! grammar.add_start("E");
//! grammar.validate()?;
//!
//! // `*` was declared later, so it binds tighter than `+`: shift.
//! assert_eq!(grammar.decide_shift_reduce("*", add)?, Some(Associativity::Right));
//! # Ok::<(), attrgram::GrammarError>(())
//! ```

pub mod analysis;
pub mod cfg;
pub mod display;
pub mod precedence;
pub mod rule;
pub mod validate;

pub use analysis::FirstSets;
pub use cfg::Grammar;
pub use precedence::{Associativity, PrecedenceLevel, PrecedenceTable, Resolution};
pub use rule::{Attribute, Rule};
pub use validate::ValidationOptions;

use hashbrown::{HashMap, HashSet};

/// A grammar symbol, identified by its name.
pub type Symbol = compact_str::CompactString;

/// Index of a rule in declaration order.
///
/// In the augmented view returned by [`Grammar::augmented_rules`], ids past the
/// last real rule denote the implicit accept rules, one per start symbol.
pub type RuleId = usize;

/// Set of symbols.
pub type SymbolSet = HashSet<Symbol, ahash::RandomState>;

/// Map keyed by symbol.
pub type SymbolMap<V> = HashMap<Symbol, V, ahash::RandomState>;

pub(crate) fn symbol_set() -> SymbolSet {
    HashSet::with_hasher(ahash::RandomState::new())
}

pub(crate) fn symbol_map<V>() -> SymbolMap<V> {
    HashMap::with_hasher(ahash::RandomState::new())
}
