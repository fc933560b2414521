use crate::error::{GrammarError, Result};
use crate::grammar::Symbol;
use smallvec::SmallVec;
use std::fmt;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// How a rule synthesizes its semantic value from its right-hand side.
///
/// Positions index into the rule's right-hand side and are checked against it
/// when the rule is declared. Constructor tags are not interpreted here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Attribute {
    /// The value at this position, passed through unchanged.
    ///
    /// Used for renaming and bracketing rules such as `Expr -> ( Expr )`.
    Rename(usize),
    /// A named constructor applied to the values at `places`, in order.
    Construct {
        tag: Symbol,
        places: SmallVec<[usize; 4]>,
    },
}

impl Attribute {
    /// A passthrough of the value at `position`.
    #[must_use]
    pub const fn rename(position: usize) -> Self {
        Self::Rename(position)
    }

    /// A constructor applied to the values at `places`.
    #[must_use]
    pub fn construct(tag: impl Into<Symbol>, places: impl IntoIterator<Item = usize>) -> Self {
        Self::Construct {
            tag: tag.into(),
            places: places.into_iter().collect(),
        }
    }

    /// Every right-hand-side position this descriptor reads.
    #[must_use]
    pub fn positions(&self) -> &[usize] {
        match self {
            Self::Rename(position) => std::slice::from_ref(position),
            Self::Construct { places, .. } => places,
        }
    }

    /// Check every referenced position against a right-hand side of `len` symbols.
    pub(crate) fn check_bounds(&self, lhs: &Symbol, len: usize) -> Result<()> {
        match self.positions().iter().find(|&&position| position >= len) {
            Some(&position) => Err(GrammarError::AttributeOutOfBounds {
                lhs: lhs.clone(),
                position,
                len,
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rename(position) => write!(f, "${position}"),
            Self::Construct { tag, places } => {
                write!(f, "{tag}(")?;
                for (i, place) in places.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "${place}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Production rule
///
/// `O` is an application-defined provenance token (a source line, a span, a
/// label). The grammar stores it and hands it back; it never looks inside.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Rule<O = ()> {
    pub lhs: Symbol,
    pub rhs: Vec<Symbol>,
    /// Explicit precedence anchor, overriding inference from the right-hand side
    pub precedence: Option<Symbol>,
    pub attribute: Attribute,
    pub origin: O,
}

impl<O> Rule<O> {
    /// Whether this is a unit rule that only renames its single right-hand symbol.
    ///
    /// Table construction may eliminate such rules entirely.
    #[must_use]
    pub fn is_rename(&self) -> bool {
        self.rhs.len() == 1 && matches!(self.attribute, Attribute::Rename(0))
    }

    /// Whether the right-hand side is empty.
    #[must_use]
    pub fn is_epsilon(&self) -> bool {
        self.rhs.is_empty()
    }
}
