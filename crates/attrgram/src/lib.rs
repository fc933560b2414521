//! # Attrgram
//!
//! The grammar-modeling core of an LR parser generator.
//!
//! ## Overview
//!
//! Attrgram represents an attributed context-free grammar and guards the
//! structural invariants that deterministic table construction depends on:
//!
//! - **Rules**: productions with an attribute-synthesis descriptor, an optional
//!   precedence anchor and an opaque provenance token
//! - **Precedence**: ordered levels of left, right, non-associative and bogus
//!   operators, and the shift/reduce policy derived from them
//! - **Analysis**: FIRST sets and nullability
//! - **Validation**: bogus symbols, well-foundedness, reachability, rename
//!   loops and epsilon loops
//!
//! Building the parse tables themselves is left to the caller, which consumes
//! [`Grammar::augmented_rules`], [`Grammar::initial`],
//! [`Grammar::apparent_terminals`] and [`Grammar::decide_shift_reduce`].
//!
//! ## Quick Start
//!
//! ```rust
//! use attrgram::{Associativity, Attribute, Grammar, GrammarError};
//!
//! let mut grammar: Grammar<&str> = Grammar::new();
//! grammar.declare_precedence_level(Associativity::Left, ["+", "-"])?;
//! grammar.declare_precedence_level(Associativity::Right, ["^"])?;
//!
//! grammar.declare_rule("Expr", ["Expr", "+", "Expr"], None, Attribute::construct("add", [0, 2]), "line 1")?;
//! grammar.declare_rule("Expr", ["Expr", "^", "Expr"], None, Attribute::construct("pow", [0, 2]), "line 2")?;
//! grammar.declare_rule("Expr", ["(", "Expr", ")"], None, Attribute::rename(1), "line 3")?;
//! grammar.declare_rule("Expr", ["num"], None, Attribute::rename(0), "line 4")?;
//! grammar.add_start("Expr");
//!
//! grammar.validate()?;
//!
//! let first = grammar.find_first_and_epsilon();
//! assert!(first.first_of("Expr").is_some_and(|set| set.contains("num")));
//!
//! // Declaring the same production twice is rejected, whatever its attribute.
//! let again = grammar.declare_rule("Expr", ["num"], None, Attribute::construct("lit", [0]), "line 5");
//! assert!(matches!(again, Err(GrammarError::DuplicateRule { .. })));
//! # Ok::<(), GrammarError>(())
//! ```
//!
//! ## Features
//!
//! - `diagnostics`: derive `miette::Diagnostic` for [`GrammarError`]
//! - `serialize`: serde support for rules, attributes and precedence types
//!
//! ## Logging
//!
//! Attrgram reports what it does through [`tracing`] and never installs a
//! subscriber of its own.

pub mod error;
pub mod grammar;
pub mod graph;

pub use error::{GrammarError, Result};
pub use grammar::{
    Associativity, Attribute, FirstSets, Grammar, PrecedenceLevel, PrecedenceTable, Resolution,
    Rule, RuleId, Symbol, SymbolMap, SymbolSet, ValidationOptions,
};
