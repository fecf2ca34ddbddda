//! # Grammar Definition
//!
//! Context-free grammar storage: productions, derived symbol classification,
//! and the augmentation step that precedes automaton construction.
//!
//! Terminal vs. nonterminal status is derived, never declared: a symbol is a
//! nonterminal iff it appears as the left-hand side of some production. The
//! first production added fixes the start symbol.

mod analysis;

pub use analysis::SymbolSets;

use std::fmt;

use compact_str::CompactString;
use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;

/// A grammar symbol. Plain identifier text; classification is derived from
/// the production set.
pub type Symbol = CompactString;

/// The epsilon marker used inside FIRST sets. Never a symbol in productions.
pub const EPSILON: &str = "";

/// The end-of-input sentinel appended by tokenizers.
pub const END_MARKER: &str = "$";

/// A single production `lhs -> rhs`. An empty `rhs` is an epsilon
/// production.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub lhs: Symbol,
    pub rhs: SmallVec<[Symbol; 4]>,
}

impl Production {
    #[must_use]
    pub fn new(lhs: impl Into<Symbol>, rhs: impl IntoIterator<Item = Symbol>) -> Self {
        Self {
            lhs: lhs.into(),
            rhs: rhs.into_iter().collect(),
        }
    }

    /// True for `A -> ε`.
    #[must_use]
    pub fn is_epsilon(&self) -> bool {
        self.rhs.is_empty()
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ->", self.lhs)?;
        for sym in &self.rhs {
            write!(f, " {sym}")?;
        }
        Ok(())
    }
}

/// Production store with derived symbol classification.
///
/// Productions accumulate until the automaton is built; afterwards the list
/// is frozen except for the synthesized augmented production at index 0.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    productions: Vec<Production>,
    by_lhs: HashMap<Symbol, SmallVec<[usize; 4]>, ahash::RandomState>,
    nonterminals: HashSet<Symbol, ahash::RandomState>,
    start: Option<Symbol>,
    augmented: bool,
}

impl Grammar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a production. The first call fixes the start symbol. A symbol
    /// previously seen only on right-hand sides is reclassified nonterminal
    /// when it first appears as an LHS.
    pub fn add_production(&mut self, lhs: &str, rhs: &[&str]) {
        let lhs: Symbol = lhs.into();
        if self.start.is_none() {
            self.start = Some(lhs.clone());
        }
        self.nonterminals.insert(lhs.clone());
        let index = self.productions.len();
        self.by_lhs.entry(lhs.clone()).or_default().push(index);
        self.productions.push(Production::new(
            lhs,
            rhs.iter().map(|s| Symbol::from(*s)),
        ));
    }

    /// The user-declared start symbol (LHS of the first production added).
    #[must_use]
    pub fn start_symbol(&self) -> Option<&Symbol> {
        self.start.as_ref()
    }

    /// The synthesized start symbol `S'`.
    #[must_use]
    pub fn augmented_start(&self) -> Option<Symbol> {
        self.start.as_ref().map(|s| {
            let mut aug = s.clone();
            aug.push('\'');
            aug
        })
    }

    #[must_use]
    pub fn is_nonterminal(&self, symbol: &str) -> bool {
        self.nonterminals.contains(symbol)
    }

    #[must_use]
    pub fn is_terminal(&self, symbol: &str) -> bool {
        !symbol.is_empty() && !self.nonterminals.contains(symbol)
    }

    #[must_use]
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    #[must_use]
    pub fn production(&self, index: usize) -> &Production {
        &self.productions[index]
    }

    #[must_use]
    pub fn production_count(&self) -> usize {
        self.productions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.productions.is_empty()
    }

    /// Indices of all productions with the given LHS, in insertion order.
    #[must_use]
    pub fn production_indices_for(&self, lhs: &str) -> &[usize] {
        self.by_lhs.get(lhs).map_or(&[], |v| v.as_slice())
    }

    /// All productions with the given LHS, in insertion order.
    pub fn productions_for<'g>(&'g self, lhs: &str) -> impl Iterator<Item = &'g Production> {
        self.production_indices_for(lhs)
            .iter()
            .map(|&i| &self.productions[i])
    }

    /// Every distinct symbol mentioned by the grammar, plus the end marker.
    #[must_use]
    pub fn symbols(&self) -> HashSet<Symbol, ahash::RandomState> {
        let mut out: HashSet<Symbol, ahash::RandomState> = HashSet::default();
        for prod in &self.productions {
            out.insert(prod.lhs.clone());
            for sym in &prod.rhs {
                out.insert(sym.clone());
            }
        }
        out.insert(Symbol::from(END_MARKER));
        out
    }

    /// True once `augment` has run.
    #[must_use]
    pub fn is_augmented(&self) -> bool {
        self.augmented
    }

    /// Prepend the augmented production `S' -> S` at index 0. Idempotent.
    ///
    /// Existing production indices shift up by one; the LHS index is rebuilt
    /// to match.
    pub(crate) fn augment(&mut self) {
        if self.augmented {
            return;
        }
        let Some(start) = self.start.clone() else {
            return;
        };
        let aug = self.augmented_start().expect("start symbol present");
        self.productions
            .insert(0, Production::new(aug.clone(), [start]));
        self.nonterminals.insert(aug);
        self.by_lhs.clear();
        for (index, prod) in self.productions.iter().enumerate() {
            self.by_lhs.entry(prod.lhs.clone()).or_default().push(index);
        }
        self.augmented = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arithmetic() -> Grammar {
        let mut g = Grammar::new();
        g.add_production("E", &["E", "+", "T"]);
        g.add_production("E", &["T"]);
        g.add_production("T", &["T", "*", "F"]);
        g.add_production("T", &["F"]);
        g.add_production("F", &["(", "E", ")"]);
        g.add_production("F", &["num"]);
        g
    }

    #[test]
    fn first_production_fixes_start() {
        let g = arithmetic();
        assert_eq!(g.start_symbol().map(Symbol::as_str), Some("E"));
        assert_eq!(g.augmented_start().as_deref(), Some("E'"));
    }

    #[test]
    fn classification_is_derived() {
        let g = arithmetic();
        assert!(g.is_nonterminal("E"));
        assert!(g.is_nonterminal("F"));
        assert!(g.is_terminal("num"));
        assert!(g.is_terminal("+"));
        assert!(!g.is_terminal(EPSILON));
    }

    #[test]
    fn lhs_appearance_reclassifies() {
        let mut g = Grammar::new();
        g.add_production("S", &["x"]);
        assert!(g.is_terminal("x"));
        g.add_production("x", &["y"]);
        assert!(g.is_nonterminal("x"));
    }

    #[test]
    fn productions_for_preserves_insertion_order() {
        let g = arithmetic();
        let rhs: Vec<_> = g.productions_for("E").map(|p| p.rhs.len()).collect();
        assert_eq!(rhs, vec![3, 1]);
    }

    #[test]
    fn augment_prepends_at_index_zero() {
        let mut g = arithmetic();
        let before = g.production_count();
        g.augment();
        g.augment();
        assert_eq!(g.production_count(), before + 1);
        assert_eq!(g.production(0).lhs.as_str(), "E'");
        assert_eq!(g.production(0).rhs.as_slice(), ["E"]);
        // index map rebuilt after the shift
        assert_eq!(g.production_indices_for("E"), &[1, 2]);
    }

    #[test]
    fn epsilon_production() {
        let mut g = Grammar::new();
        g.add_production("A", &[]);
        assert!(g.production(0).is_epsilon());
        assert_eq!(format!("{}", g.production(0)), "A ->");
    }
}
