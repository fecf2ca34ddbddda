//! # LR(1) Automaton Construction
//!
//! Canonical LR(1) state-graph construction: item-set closure with lookahead
//! propagation, GOTO transitions, and worklist-driven state allocation with
//! canonical-key deduplication.
//!
//! States with equal cores but different lookaheads are kept distinct
//! (canonical LR(1), not LALR). The GLR runtime tolerates residual lookahead
//! imprecision, so closure does not have to be perfect, but the
//! unit-terminal repair below is still required: the plain `FIRST(β L)`
//! fixed point under-approximates lookaheads for productions whose whole
//! right-hand side is a single terminal, and those items get their lookahead
//! set widened to FOLLOW of the left-hand side after closure.

mod item;
mod state;

pub use item::Item;
pub use state::State;

use std::collections::BTreeSet;

use hashbrown::HashMap;

use crate::config::EngineConfig;
use crate::error::{BuildError, BuildWarning};
use crate::event::{EventSink, ParseEvent};
use crate::grammar::{END_MARKER, Grammar, Symbol, SymbolSets};

/// The canonical LR(1) state graph for a grammar.
///
/// States are stored in an id-indexed arena; transitions refer to targets by
/// id. State 0 is the start state, seeded from `S' -> • S {$}`.
#[derive(Debug, Clone)]
pub struct Automaton {
    states: Vec<State>,
    sets: SymbolSets,
}

impl Automaton {
    /// Build the automaton for an augmented grammar.
    ///
    /// Returns the automaton plus any iteration-ceiling warnings. The
    /// grammar must already carry the augmented production at index 0.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::EmptyGrammar`] for a grammar with no
    /// productions, or a wrapped [`GrammarError`](crate::error::GrammarError)
    /// if FIRST/FOLLOW computation diverges.
    pub fn build(
        grammar: &Grammar,
        config: &EngineConfig,
        sink: &mut dyn EventSink,
    ) -> Result<(Self, Vec<BuildWarning>), BuildError> {
        if grammar.is_empty() {
            return Err(BuildError::EmptyGrammar);
        }
        debug_assert!(grammar.is_augmented(), "grammar must be augmented first");

        let sets = SymbolSets::compute(grammar, config.first_follow_limit)?;
        let mut warnings = Vec::new();
        let mut states: Vec<State> = Vec::new();
        let mut key_map: HashMap<String, usize, ahash::RandomState> = HashMap::default();

        let initial_lookahead: BTreeSet<Symbol> = [Symbol::from(END_MARKER)].into_iter().collect();
        let seed = vec![Item::new(0, 0, initial_lookahead)];
        let start = build_state(grammar, &sets, seed, 0, config, &mut warnings, sink);
        key_map.insert(start.canonical_key(), 0);
        sink.handle(&ParseEvent::StateAdded {
            id: 0,
            items: start.items().len(),
        });
        states.push(start);

        let mut worklist: Vec<usize> = vec![0];
        let mut iterations = 0;
        while let Some(id) = worklist.pop() {
            iterations += 1;
            if iterations > config.build_limit {
                warnings.push(BuildWarning::BuildIterationCap {
                    iterations: config.build_limit,
                    states: states.len(),
                });
                sink.handle(&ParseEvent::BuildCapped {
                    iterations: config.build_limit,
                    states: states.len(),
                });
                break;
            }

            let symbols = states[id].next_symbols(grammar);
            for symbol in symbols {
                let moved: Vec<Item> = states[id]
                    .items_before(grammar, &symbol)
                    .map(Item::advanced)
                    .collect();
                let candidate_id = states.len();
                let target =
                    build_state(grammar, &sets, moved, candidate_id, config, &mut warnings, sink);
                let key = target.canonical_key();
                let target_id = if let Some(&existing) = key_map.get(&key) {
                    existing
                } else {
                    key_map.insert(key, candidate_id);
                    sink.handle(&ParseEvent::StateAdded {
                        id: candidate_id,
                        items: target.items().len(),
                    });
                    states.push(target);
                    worklist.push(candidate_id);
                    candidate_id
                };
                states[id].transitions.insert(symbol, target_id);
            }
        }

        Ok((Self { states, sets }, warnings))
    }

    #[must_use]
    pub fn state(&self, id: usize) -> &State {
        &self.states[id]
    }

    #[must_use]
    pub fn states(&self) -> &[State] {
        &self.states
    }

    #[must_use]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn sets(&self) -> &SymbolSets {
        &self.sets
    }

    /// Closure (with the unit-terminal repair applied) of an arbitrary seed
    /// set, computed against this automaton's symbol sets. Exposed for
    /// equivalence checks in tests.
    #[must_use]
    pub fn closure_of(&self, grammar: &Grammar, seed: Vec<Item>) -> State {
        let config = EngineConfig::default();
        let mut warnings = Vec::new();
        let mut sink = crate::event::NullSink;
        build_state(grammar, &self.sets, seed, usize::MAX, &config, &mut warnings, &mut sink)
    }
}

/// Closure plus unit-terminal lookahead repair for one state.
fn build_state(
    grammar: &Grammar,
    sets: &SymbolSets,
    seed: Vec<Item>,
    state_id: usize,
    config: &EngineConfig,
    warnings: &mut Vec<BuildWarning>,
    sink: &mut dyn EventSink,
) -> State {
    let mut state = closure(grammar, sets, seed, state_id, config, warnings, sink);
    repair_terminal_lookaheads(grammar, sets, &mut state, state_id, sink);
    state
}

/// Fixed-point closure: for every item `A -> α • B β {L}` with nonterminal
/// B, add `B -> • γ {FIRST(β L)}` for each production `B -> γ`, merging
/// lookaheads into items that share a core.
fn closure(
    grammar: &Grammar,
    sets: &SymbolSets,
    seed: Vec<Item>,
    state_id: usize,
    config: &EngineConfig,
    warnings: &mut Vec<BuildWarning>,
    sink: &mut dyn EventSink,
) -> State {
    // Items are merged by core through a local index so each pass stays
    // linear in the item count.
    let mut items: Vec<Item> = Vec::new();
    let mut index: HashMap<(usize, usize), usize, ahash::RandomState> = HashMap::default();
    for item in seed {
        merge_item(&mut items, &mut index, item);
    }

    let mut passes = 0;
    loop {
        passes += 1;
        if passes > config.closure_limit {
            warnings.push(BuildWarning::ClosureIterationCap {
                state: state_id,
                passes: config.closure_limit,
            });
            sink.handle(&ParseEvent::ClosureCapped {
                state: state_id,
                passes: config.closure_limit,
            });
            break;
        }

        let mut changed = false;
        let mut additions: Vec<Item> = Vec::new();
        for item in &items {
            let Some(next) = item.next_symbol(grammar) else {
                continue;
            };
            if !grammar.is_nonterminal(next) {
                continue;
            }
            let lookahead = sets.first_of_sequence(item.tail(grammar), &item.lookaheads);
            for &pidx in grammar.production_indices_for(next) {
                additions.push(Item::new(pidx, 0, lookahead.clone()));
            }
        }
        for item in additions {
            changed |= merge_item(&mut items, &mut index, item);
        }
        if !changed {
            break;
        }
    }
    State::from_parts(items)
}

/// Insert an item into the closure's working set, merging lookaheads on an
/// existing core. Returns true if anything changed.
fn merge_item(
    items: &mut Vec<Item>,
    index: &mut HashMap<(usize, usize), usize, ahash::RandomState>,
    item: Item,
) -> bool {
    use hashbrown::hash_map::Entry;
    match index.entry(item.core()) {
        Entry::Occupied(slot) => {
            let existing = &mut items[*slot.get()];
            let before = existing.lookaheads.len();
            existing.lookaheads.extend(item.lookaheads);
            existing.lookaheads.len() != before
        }
        Entry::Vacant(slot) => {
            slot.insert(items.len());
            items.push(item);
            true
        }
    }
}

/// Widen the lookaheads of every complete `A -> t •` item (single-terminal
/// right-hand side) to FOLLOW(A). The closure fixed point under-approximates
/// exactly these items.
fn repair_terminal_lookaheads(
    grammar: &Grammar,
    sets: &SymbolSets,
    state: &mut State,
    state_id: usize,
    sink: &mut dyn EventSink,
) {
    let mut repaired: Vec<usize> = Vec::new();
    for (idx, item) in state.items().iter().enumerate() {
        if !item.is_complete(grammar) {
            continue;
        }
        let prod = grammar.production(item.production);
        if prod.rhs.len() == 1 && grammar.is_terminal(&prod.rhs[0]) {
            repaired.push(idx);
        }
    }
    for idx in repaired {
        let production = state.items()[idx].production;
        let lhs = grammar.production(production).lhs.clone();
        let follow = sets.follow_ordered(&lhs);
        let item = &mut state.items_mut()[idx];
        if item.lookaheads != follow {
            item.lookaheads = follow;
            sink.handle(&ParseEvent::LookaheadRepaired {
                state: state_id,
                production,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::NullSink;

    fn build(grammar: &mut Grammar) -> (Automaton, Vec<BuildWarning>) {
        grammar.augment();
        let config = EngineConfig::default();
        let mut sink = NullSink;
        Automaton::build(grammar, &config, &mut sink).unwrap()
    }

    fn simple_grammar() -> Grammar {
        let mut g = Grammar::new();
        g.add_production("S", &["a", "S"]);
        g.add_production("S", &["a"]);
        g
    }

    #[test]
    fn empty_grammar_is_rejected() {
        let grammar = Grammar::new();
        let config = EngineConfig::default();
        let mut sink = NullSink;
        let err = Automaton::build(&grammar, &config, &mut sink).unwrap_err();
        assert!(matches!(err, BuildError::EmptyGrammar));
    }

    #[test]
    fn start_state_contains_augmented_item() {
        let mut g = simple_grammar();
        let (automaton, warnings) = build(&mut g);
        assert!(warnings.is_empty());
        let start = automaton.state(0);
        assert!(
            start
                .items()
                .iter()
                .any(|item| item.production == 0 && item.dot == 0)
        );
        // closure pulled in both S productions
        assert!(start.items().len() >= 3);
    }

    #[test]
    fn transitions_reach_every_state() {
        let mut g = simple_grammar();
        let (automaton, _) = build(&mut g);
        let mut reached = vec![false; automaton.state_count()];
        reached[0] = true;
        let mut worklist = vec![0];
        while let Some(id) = worklist.pop() {
            for &target in automaton.state(id).transitions.values() {
                if !reached[target] {
                    reached[target] = true;
                    worklist.push(target);
                }
            }
        }
        assert!(reached.iter().all(|&r| r), "unreachable states allocated");
    }

    #[test]
    fn canonical_keys_are_unique() {
        let mut g = Grammar::new();
        g.add_production("E", &["E", "+", "T"]);
        g.add_production("E", &["T"]);
        g.add_production("T", &["T", "*", "F"]);
        g.add_production("T", &["F"]);
        g.add_production("F", &["(", "E", ")"]);
        g.add_production("F", &["num"]);
        let (automaton, _) = build(&mut g);

        let mut keys: Vec<String> = automaton
            .states()
            .iter()
            .map(State::canonical_key)
            .collect();
        let total = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), total);
    }

    #[test]
    fn transition_targets_equal_goto_closure() {
        let mut g = simple_grammar();
        let (automaton, _) = build(&mut g);
        for state in automaton.states() {
            for (symbol, &target) in &state.transitions {
                let moved: Vec<Item> = state
                    .items_before(&g, symbol)
                    .map(Item::advanced)
                    .collect();
                let expected = automaton.closure_of(&g, moved);
                assert_eq!(
                    expected.canonical_key(),
                    automaton.state(target).canonical_key()
                );
            }
        }
    }

    #[test]
    fn unit_terminal_items_carry_follow_lookaheads() {
        let mut g = Grammar::new();
        g.add_production("E", &["E", "+", "T"]);
        g.add_production("E", &["T"]);
        g.add_production("T", &["T", "*", "F"]);
        g.add_production("T", &["F"]);
        g.add_production("F", &["(", "E", ")"]);
        g.add_production("F", &["num"]);
        let (automaton, _) = build(&mut g);

        // Every complete F -> num • item must carry exactly FOLLOW(F),
        // which includes ')' via F -> ( E ).
        let mut found = false;
        for state in automaton.states() {
            for item in state.items() {
                let prod = g.production(item.production);
                if prod.lhs == "F" && prod.rhs.as_slice() == ["num"] && item.is_complete(&g) {
                    assert_eq!(item.lookaheads, automaton.sets().follow_ordered("F"));
                    assert!(item.lookaheads.contains("+"));
                    assert!(item.lookaheads.contains("*"));
                    assert!(item.lookaheads.contains(")"));
                    assert!(item.lookaheads.contains("$"));
                    found = true;
                }
            }
        }
        assert!(found, "no complete unit-terminal item in any state");
    }
}
