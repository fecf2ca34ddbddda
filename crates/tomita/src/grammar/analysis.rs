//! FIRST/FOLLOW set computation.
//!
//! Both sets are computed by bounded fixed-point iteration over the
//! production list. A grammar that fails to settle within the configured
//! ceiling is rejected with a [`GrammarError`] so the caller can diagnose it
//! instead of looping forever on a pathological input.

use std::collections::BTreeSet;

use hashbrown::{HashMap, HashSet};

use crate::error::GrammarError;
use crate::grammar::{EPSILON, END_MARKER, Grammar, Symbol};

type SymbolSet = HashSet<Symbol, ahash::RandomState>;

/// FIRST and FOLLOW sets for every symbol of a grammar.
///
/// Invariants maintained:
/// - `FIRST(t) = {t}` for every terminal `t`
/// - for every production `A -> α`, `FIRST(α) \ {ε} ⊆ FIRST(A)`
/// - `$ ∈ FOLLOW(S)` for the start symbol `S`
#[derive(Debug, Clone, Default)]
pub struct SymbolSets {
    first: HashMap<Symbol, SymbolSet, ahash::RandomState>,
    follow: HashMap<Symbol, SymbolSet, ahash::RandomState>,
}

impl SymbolSets {
    /// Compute both sets for `grammar`, bounding each fixed point at
    /// `limit` passes.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::FirstSetDiverged`] or
    /// [`GrammarError::FollowSetDiverged`] if a fixed point fails to settle
    /// within `limit` passes.
    pub fn compute(grammar: &Grammar, limit: usize) -> Result<Self, GrammarError> {
        let mut sets = Self::default();
        sets.compute_first(grammar, limit)?;
        sets.compute_follow(grammar, limit)?;
        Ok(sets)
    }

    /// FIRST set of a symbol. Terminals map to themselves.
    #[must_use]
    pub fn first(&self, symbol: &str) -> Option<&SymbolSet> {
        self.first.get(symbol)
    }

    /// FOLLOW set of a nonterminal.
    #[must_use]
    pub fn follow(&self, symbol: &str) -> Option<&SymbolSet> {
        self.follow.get(symbol)
    }

    /// True if the symbol can derive the empty string.
    #[must_use]
    pub fn is_nullable(&self, symbol: &str) -> bool {
        self.first
            .get(symbol)
            .is_some_and(|set| set.contains(EPSILON))
    }

    /// FOLLOW set as an ordered set, for lookahead storage.
    pub(crate) fn follow_ordered(&self, symbol: &str) -> BTreeSet<Symbol> {
        self.follow
            .get(symbol)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// `FIRST(seq cont)`: the union of FIRST over `seq` while prefixes stay
    /// nullable, substituting `cont` when the whole sequence is nullable.
    /// Epsilon never appears in the result.
    pub(crate) fn first_of_sequence(
        &self,
        seq: &[Symbol],
        cont: &BTreeSet<Symbol>,
    ) -> BTreeSet<Symbol> {
        let mut out = BTreeSet::new();
        for sym in seq {
            let mut nullable = false;
            if let Some(set) = self.first.get(sym.as_str()) {
                for t in set {
                    if t != EPSILON {
                        out.insert(t.clone());
                    } else {
                        nullable = true;
                    }
                }
            } else {
                // Unknown symbols behave as terminals.
                out.insert(sym.clone());
            }
            if !nullable {
                return out;
            }
        }
        out.extend(cont.iter().cloned());
        out
    }

    fn compute_first(&mut self, grammar: &Grammar, limit: usize) -> Result<(), GrammarError> {
        // Terminals (and the end marker) seed themselves; nonterminals start
        // empty.
        for sym in grammar.symbols() {
            if grammar.is_nonterminal(&sym) {
                self.first.entry(sym).or_default();
            } else {
                let mut set = SymbolSet::default();
                set.insert(sym.clone());
                self.first.insert(sym, set);
            }
        }

        let mut passes = 0;
        loop {
            passes += 1;
            if passes > limit {
                return Err(GrammarError::FirstSetDiverged { iterations: limit });
            }
            let mut changed = false;
            for prod in grammar.productions() {
                let mut all_nullable = true;
                let mut additions: Vec<Symbol> = Vec::new();
                for sym in &prod.rhs {
                    let set = self.first.get(sym.as_str());
                    let mut nullable = false;
                    if let Some(set) = set {
                        for t in set {
                            if t == EPSILON {
                                nullable = true;
                            } else {
                                additions.push(t.clone());
                            }
                        }
                    }
                    if !nullable {
                        all_nullable = false;
                        break;
                    }
                }
                if all_nullable {
                    additions.push(Symbol::from(EPSILON));
                }
                let target = self.first.entry(prod.lhs.clone()).or_default();
                for sym in additions {
                    changed |= target.insert(sym);
                }
            }
            if !changed {
                return Ok(());
            }
        }
    }

    fn compute_follow(&mut self, grammar: &Grammar, limit: usize) -> Result<(), GrammarError> {
        for prod in grammar.productions() {
            self.follow.entry(prod.lhs.clone()).or_default();
        }
        if let Some(start) = grammar.start_symbol() {
            self.follow
                .entry(start.clone())
                .or_default()
                .insert(Symbol::from(END_MARKER));
        }
        if let Some(aug) = grammar.augmented_start() {
            if grammar.is_nonterminal(&aug) {
                self.follow
                    .entry(aug)
                    .or_default()
                    .insert(Symbol::from(END_MARKER));
            }
        }

        let mut passes = 0;
        loop {
            passes += 1;
            if passes > limit {
                return Err(GrammarError::FollowSetDiverged { iterations: limit });
            }
            let mut changed = false;
            for prod in grammar.productions() {
                for (i, sym) in prod.rhs.iter().enumerate() {
                    if !grammar.is_nonterminal(sym) {
                        continue;
                    }
                    let tail = &prod.rhs[i + 1..];
                    let (tail_first, tail_nullable) = self.first_of_slice(tail);
                    let mut additions: Vec<Symbol> = tail_first;
                    if tail_nullable {
                        if let Some(lhs_follow) = self.follow.get(prod.lhs.as_str()) {
                            additions.extend(lhs_follow.iter().cloned());
                        }
                    }
                    let target = self.follow.entry(sym.clone()).or_default();
                    for t in additions {
                        changed |= target.insert(t);
                    }
                }
            }
            if !changed {
                return Ok(());
            }
        }
    }

    /// FIRST of a symbol slice: the non-epsilon symbols, plus whether the
    /// whole slice is nullable.
    fn first_of_slice(&self, slice: &[Symbol]) -> (Vec<Symbol>, bool) {
        let mut out = Vec::new();
        for sym in slice {
            let mut nullable = false;
            if let Some(set) = self.first.get(sym.as_str()) {
                for t in set {
                    if t == EPSILON {
                        nullable = true;
                    } else {
                        out.push(t.clone());
                    }
                }
            } else {
                out.push(sym.clone());
            }
            if !nullable {
                return (out, false);
            }
        }
        (out, true)
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
    fn first_of_terminals_is_identity() {
        let g = arithmetic();
        let sets = SymbolSets::compute(&g, 100).unwrap();
        assert!(sets.first("num").unwrap().contains("num"));
        assert!(sets.first("+").unwrap().contains("+"));
    }

    #[test]
    fn first_propagates_through_unit_chains() {
        let g = arithmetic();
        let sets = SymbolSets::compute(&g, 100).unwrap();
        let first_e = sets.first("E").unwrap();
        assert!(first_e.contains("num"));
        assert!(first_e.contains("("));
        assert!(!first_e.contains("+"));
    }

    #[test]
    fn follow_has_end_marker_for_start() {
        let g = arithmetic();
        let sets = SymbolSets::compute(&g, 100).unwrap();
        assert!(sets.follow("E").unwrap().contains(END_MARKER));
        // E is followed by ')' through F -> ( E )
        assert!(sets.follow("E").unwrap().contains(")"));
        // T inherits FOLLOW(E) through E -> T
        assert!(sets.follow("T").unwrap().contains("+"));
        assert!(sets.follow("T").unwrap().contains(END_MARKER));
    }

    #[test]
    fn nullable_symbols_contribute_epsilon() {
        let mut g = Grammar::new();
        g.add_production("S", &["A", "b"]);
        g.add_production("A", &[]);
        g.add_production("A", &["a"]);
        let sets = SymbolSets::compute(&g, 100).unwrap();
        assert!(sets.is_nullable("A"));
        assert!(!sets.is_nullable("S"));
        // FIRST(S) sees through the nullable A
        assert!(sets.first("S").unwrap().contains("b"));
        assert!(sets.first("S").unwrap().contains("a"));
        // FOLLOW(A) = FIRST(b)
        assert!(sets.follow("A").unwrap().contains("b"));
    }

    #[test]
    fn first_of_sequence_substitutes_continuation() {
        let mut g = Grammar::new();
        g.add_production("S", &["A", "B"]);
        g.add_production("A", &[]);
        g.add_production("B", &["b"]);
        let sets = SymbolSets::compute(&g, 100).unwrap();

        let cont: BTreeSet<Symbol> = [Symbol::from(END_MARKER)].into_iter().collect();
        let seq = [Symbol::from("A")];
        let la = sets.first_of_sequence(&seq, &cont);
        // A is nullable, so the continuation shows through
        assert!(la.contains(END_MARKER));

        let seq = [Symbol::from("A"), Symbol::from("B")];
        let la = sets.first_of_sequence(&seq, &cont);
        assert!(la.contains("b"));
        assert!(!la.contains(END_MARKER));
        assert!(!la.contains(EPSILON));
    }

    #[test]
    fn every_production_first_is_subset_of_lhs_first() {
        let g = arithmetic();
        let sets = SymbolSets::compute(&g, 100).unwrap();
        let empty = BTreeSet::new();
        for prod in g.productions() {
            let rhs_first = sets.first_of_sequence(&prod.rhs, &empty);
            let lhs_first = sets.first(&prod.lhs).unwrap();
            for t in &rhs_first {
                assert!(
                    lhs_first.contains(t.as_str()),
                    "FIRST({}) missing '{t}' from {prod}",
                    prod.lhs
                );
            }
        }
    }
}
