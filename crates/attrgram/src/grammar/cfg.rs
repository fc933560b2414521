use crate::error::{GrammarError, Result};
use crate::grammar::{
    Associativity, Attribute, PrecedenceLevel, PrecedenceTable, Rule, RuleId, Symbol, SymbolMap,
    SymbolSet, symbol_map, symbol_set,
};
use smallvec::SmallVec;
use std::ops::Range;

/// Attributed context-free grammar with operator precedence declarations.
///
/// Several start symbols may share one set of rules. Table construction treats
/// each of them as the body of its own implicit accept rule, so a single set of
/// tables can parse every language (or sub-phrase) the start symbols denote.
///
/// Unresolved conflicts follow the usual deterministic-parser convention:
/// prefer the shift on a shift/reduce conflict and the earliest declared rule
/// on a reduce/reduce conflict. Precedence declarations refine the former via
/// [`Grammar::decide_shift_reduce`].
///
/// The provenance type `O` is carried through untouched.
#[derive(Debug, Clone)]
pub struct Grammar<O = ()> {
    symbols: SymbolSet,
    start: Vec<Symbol>,
    rules: Vec<Rule<O>>,
    rules_by_lhs: SymbolMap<SmallVec<[RuleId; 4]>>,
    precedence: PrecedenceTable,
}

impl<O> Default for Grammar<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> Grammar<O> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            symbols: symbol_set(),
            start: Vec::new(),
            rules: Vec::new(),
            rules_by_lhs: symbol_map(),
            precedence: PrecedenceTable::new(),
        }
    }

    /// Declare the production `lhs -> rhs`.
    ///
    /// `precedence` names the symbol whose precedence level this rule takes when
    /// it is involved in a shift/reduce conflict. Without it the level is
    /// inferred from `rhs`, see [`Grammar::infer_precedence_symbol`].
    ///
    /// Returns the new rule's id. A failed declaration changes nothing.
    ///
    /// # Errors
    ///
    /// - [`GrammarError::NonTerminalsCannotHavePrecedence`] if `lhs` already has a
    ///   precedence level.
    /// - [`GrammarError::AttributeOutOfBounds`] if `attribute` refers past the end
    ///   of `rhs`.
    /// - [`GrammarError::DuplicateRule`] if `lhs -> rhs` was already declared,
    ///   whatever its attribute or origin. The error carries the earlier rule's
    ///   id, through which its origin can be recovered.
    pub fn declare_rule<L, I, S>(
        &mut self,
        lhs: L,
        rhs: I,
        precedence: Option<Symbol>,
        attribute: Attribute,
        origin: O,
    ) -> Result<RuleId>
    where
        L: Into<Symbol>,
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        let lhs = lhs.into();
        let rhs: Vec<Symbol> = rhs.into_iter().map(Into::into).collect();

        if self.precedence.level_of(&lhs).is_some() {
            return Err(GrammarError::NonTerminalsCannotHavePrecedence(lhs));
        }
        attribute.check_bounds(&lhs, rhs.len())?;
        if let Some(ids) = self.rules_by_lhs.get(&lhs)
            && let Some(&existing) = ids.iter().find(|&&id| self.rules[id].rhs == rhs)
        {
            return Err(GrammarError::DuplicateRule { lhs, rhs, existing });
        }

        let id = self.rules.len();
        tracing::trace!(rule = id, lhs = %lhs, arity = rhs.len(), "declaring rule");

        self.symbols.insert(lhs.clone());
        self.symbols.extend(rhs.iter().cloned());
        self.rules_by_lhs.entry(lhs.clone()).or_default().push(id);
        self.rules.push(Rule {
            lhs,
            rhs,
            precedence,
            attribute,
            origin,
        });
        Ok(id)
    }

    /// Open a new precedence level, binding tighter than all earlier levels, and
    /// assign `symbols` to it.
    ///
    /// Note the direction: like Bison and Lemon, the *last* declared level has
    /// the *highest* precedence.
    ///
    /// # Errors
    ///
    /// - [`GrammarError::EmptyPrecedenceLevel`] if `symbols` is empty.
    /// - [`GrammarError::NonTerminalsCannotHavePrecedence`] if a symbol already has
    ///   production rules.
    /// - [`GrammarError::PrecedenceDeclaredTwice`] if a symbol already has a level.
    pub fn declare_precedence_level<I, S>(
        &mut self,
        associativity: Associativity,
        symbols: I,
    ) -> Result<PrecedenceLevel>
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        let symbols: Vec<Symbol> = symbols.into_iter().map(Into::into).collect();
        if let Some(symbol) = symbols.iter().find(|s| self.rules_by_lhs.contains_key(*s)) {
            return Err(GrammarError::NonTerminalsCannotHavePrecedence(symbol.clone()));
        }
        let level = self.precedence.declare(associativity, symbols)?;
        tracing::trace!(level = level.index(), ?associativity, "declared precedence level");
        Ok(level)
    }

    /// Add an entry point. Listing the same symbol twice has no effect.
    pub fn add_start(&mut self, symbol: impl Into<Symbol>) {
        let symbol = symbol.into();
        if !self.start.contains(&symbol) {
            self.start.push(symbol);
        }
    }

    /// The entry points, in the order they were added.
    #[must_use]
    pub fn start_symbols(&self) -> &[Symbol] {
        &self.start
    }

    /// Every rule's right-hand side, followed by one `[start]` body per start
    /// symbol.
    ///
    /// The trailing entries are the implicit accept rules of the augmented
    /// grammar. They have no left-hand side of their own, so the accept symbol
    /// never shows up in a GOTO table. Their ids are [`Grammar::initial`].
    ///
    /// # Errors
    ///
    /// [`GrammarError::MissingStartSymbol`] if no start symbol was added.
    pub fn augmented_rules(&self) -> Result<Vec<&[Symbol]>> {
        if self.start.is_empty() {
            return Err(GrammarError::MissingStartSymbol);
        }
        Ok(self
            .rules
            .iter()
            .map(|rule| rule.rhs.as_slice())
            .chain(self.start.iter().map(std::slice::from_ref))
            .collect())
    }

    /// Ids of the accept rules in [`Grammar::augmented_rules`], in start-symbol order.
    #[must_use]
    pub fn initial(&self) -> Range<RuleId> {
        let first = self.rules.len();
        first..first + self.start.len()
    }

    /// Symbols mentioned anywhere that have no production rules.
    #[must_use]
    pub fn apparent_terminals(&self) -> SymbolSet {
        self.symbols
            .iter()
            .filter(|symbol| !self.rules_by_lhs.contains_key(*symbol))
            .cloned()
            .collect()
    }

    /// Symbols that own at least one rule.
    pub fn nonterminals(&self) -> impl Iterator<Item = &Symbol> {
        self.rules_by_lhs.keys()
    }

    /// Every symbol mentioned by a rule, on either side.
    #[must_use]
    pub const fn symbols(&self) -> &SymbolSet {
        &self.symbols
    }

    #[must_use]
    pub fn is_nonterminal(&self, symbol: &str) -> bool {
        self.rules_by_lhs.contains_key(symbol)
    }

    #[must_use]
    pub fn is_terminal(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol) && !self.is_nonterminal(symbol)
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule<O>] {
        &self.rules
    }

    #[must_use]
    pub fn rule(&self, id: RuleId) -> Option<&Rule<O>> {
        self.rules.get(id)
    }

    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Ids of the rules for `lhs`, in declaration order.
    #[must_use]
    pub fn rules_for(&self, lhs: &str) -> &[RuleId] {
        self.rules_by_lhs
            .get(lhs)
            .map(SmallVec::as_slice)
            .unwrap_or_default()
    }

    #[must_use]
    pub const fn precedence_table(&self) -> &PrecedenceTable {
        &self.precedence
    }

    #[must_use]
    pub fn precedence_of(&self, symbol: &str) -> Option<PrecedenceLevel> {
        self.precedence.level_of(symbol)
    }

    #[must_use]
    pub fn associativity(&self, level: PrecedenceLevel) -> Option<Associativity> {
        self.precedence.associativity(level)
    }

    #[must_use]
    pub fn level_count(&self) -> usize {
        self.precedence.len()
    }

    /// The symbol a rule without an explicit anchor takes its precedence from:
    /// the first symbol of `rhs` that has a declared level.
    ///
    /// Unlike Bison this is not simply the first terminal. A leading terminal
    /// without precedence (a keyword, a bracket) is skipped in favour of the
    /// operator that actually drives the conflict.
    #[must_use]
    pub fn infer_precedence_symbol<'a>(&self, rhs: &'a [Symbol]) -> Option<&'a Symbol> {
        self.precedence.infer_precedence_symbol(rhs)
    }

    /// The precedence level of a rule: that of its explicit anchor if it has one,
    /// otherwise that of the inferred anchor. `None` when neither exists.
    ///
    /// # Errors
    ///
    /// - [`GrammarError::UnknownRule`] if `id` is not a rule of this grammar.
    /// - [`GrammarError::UndeclaredPrecedenceAnchor`] if the explicit anchor has
    ///   no precedence level.
    pub fn rule_precedence(&self, id: RuleId) -> Result<Option<PrecedenceLevel>> {
        let rule = self.rules.get(id).ok_or(GrammarError::UnknownRule(id))?;
        match &rule.precedence {
            Some(anchor) => self.precedence.level_of(anchor).map(Some).ok_or_else(|| {
                GrammarError::UndeclaredPrecedenceAnchor {
                    rule: id,
                    symbol: anchor.clone(),
                }
            }),
            None => Ok(self
                .precedence
                .infer_precedence_symbol(&rule.rhs)
                .and_then(|symbol| self.precedence.level_of(symbol))),
        }
    }

    /// Resolve a shift/reduce conflict between shifting `lookahead` and reducing
    /// by rule `id`.
    ///
    /// Returns `None` when either side lacks a precedence level; the caller then
    /// falls back to its default policy. Otherwise the answer is an
    /// associativity tag, see [`Associativity::resolution`]:
    ///
    /// - the lookahead binds tighter than the rule: [`Associativity::Right`] (shift)
    /// - the rule binds tighter than the lookahead: [`Associativity::Left`] (reduce)
    /// - same level: that level's own tag, where [`Associativity::NonAssoc`]
    ///   marks a genuine error in the input
    ///
    /// # Errors
    ///
    /// - [`GrammarError::BogusPrecedenceConflict`] if both meet on a bogus level,
    ///   which a validated grammar cannot produce.
    /// - Any error of [`Grammar::rule_precedence`], whether or not `lookahead`
    ///   has a level.
    pub fn decide_shift_reduce(&self, lookahead: &str, id: RuleId) -> Result<Option<Associativity>> {
        // rule first, so a bad id or anchor is reported for every lookahead
        let Some(rule_level) = self.rule_precedence(id)? else {
            return Ok(None);
        };
        let Some(symbol_level) = self.precedence.level_of(lookahead) else {
            return Ok(None);
        };
        match self.precedence.compare(rule_level, symbol_level) {
            Some(Associativity::Bogus) => Err(GrammarError::BogusPrecedenceConflict {
                symbol: lookahead.into(),
                rule: id,
            }),
            decision => Ok(decision),
        }
    }
}
