//! Automaton states: deduplicated item sets plus outgoing transitions.

use hashbrown::HashMap;

use crate::automaton::Item;
use crate::grammar::{Grammar, Symbol};

/// One state of the LR(1) automaton.
///
/// Identity is the item set, lookaheads included; the automaton guarantees
/// no two states share a canonical key. Transitions map a symbol to the id
/// of the target state. Ids, not references, so the state pool stays an
/// arena without ownership cycles.
#[derive(Debug, Clone, Default)]
pub struct State {
    items: Vec<Item>,
    pub transitions: HashMap<Symbol, usize, ahash::RandomState>,
}

impl State {
    #[must_use]
    pub fn from_items(items: Vec<Item>) -> Self {
        let mut state = Self::default();
        for item in items {
            state.add_item(item);
        }
        state
    }

    /// Wrap an item list that is already deduplicated by core. Used by the
    /// closure computation, which maintains its own core index.
    pub(crate) fn from_parts(items: Vec<Item>) -> Self {
        Self {
            items,
            transitions: HashMap::default(),
        }
    }

    /// Insert an item, merging lookaheads into an existing item with the
    /// same core. Returns true if the item set changed.
    pub fn add_item(&mut self, item: Item) -> bool {
        if let Some(existing) = self.items.iter_mut().find(|i| i.core() == item.core()) {
            let before = existing.lookaheads.len();
            existing.lookaheads.extend(item.lookaheads);
            existing.lookaheads.len() != before
        } else {
            self.items.push(item);
            true
        }
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub(crate) fn items_mut(&mut self) -> &mut [Item] {
        &mut self.items
    }

    /// Items whose dot sits immediately before `symbol`.
    pub fn items_before<'s>(
        &'s self,
        grammar: &'s Grammar,
        symbol: &'s str,
    ) -> impl Iterator<Item = &'s Item> {
        self.items
            .iter()
            .filter(move |item| item.next_symbol(grammar).is_some_and(|s| s == symbol))
    }

    /// Items with the dot at the end of their production.
    pub fn complete_items<'s>(&'s self, grammar: &'s Grammar) -> impl Iterator<Item = &'s Item> {
        self.items.iter().filter(|item| item.is_complete(grammar))
    }

    /// Distinct next-symbols across all items, in first-seen order. The
    /// ordering keeps state numbering deterministic.
    #[must_use]
    pub fn next_symbols(&self, grammar: &Grammar) -> Vec<Symbol> {
        let mut out: Vec<Symbol> = Vec::new();
        for item in &self.items {
            if let Some(sym) = item.next_symbol(grammar) {
                if !out.iter().any(|s| s == sym) {
                    out.push(sym.clone());
                }
            }
        }
        out
    }

    /// Sorted concatenation of item keys; the automaton's dedup key.
    #[must_use]
    pub fn canonical_key(&self) -> String {
        let mut keys: Vec<String> = self.items.iter().map(Item::key).collect();
        keys.sort_unstable();
        keys.join("|")
    }
}
