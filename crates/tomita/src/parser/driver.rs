//! The GLR driver loop.
//!
//! Per input token: a cascading reduction phase, a shift phase, merge of
//! equivalent successors, and, when nothing can shift, panic-mode
//! recovery. Reductions run before shifts so that pending reductions settle
//! against the same token; this is what lets right-recursive rules finish
//! at end of input.

use std::sync::Arc;

use smallvec::{SmallVec, smallvec};

use crate::automaton::Automaton;
use crate::config::EngineConfig;
use crate::error::ParseError;
use crate::event::{EventSink, ParseEvent};
use crate::grammar::{END_MARKER, Grammar};
use crate::lexer::Token;
use crate::parser::graph::GraphStack;
use crate::parser::recovery::{self, Recovery};
use crate::parser::stack::{Frame, ParseStack};
use crate::tree::{ParseTree, SourcePos};

/// Run the GLR parse over a token stream ending in `$`.
///
/// Returns the accepted trees, or the fallback partial trees if nothing
/// accepted, in active-set traversal order.
pub(crate) fn run(
    grammar: &Grammar,
    automaton: &Automaton,
    tokens: &[Token],
    config: &EngineConfig,
    sink: &mut dyn EventSink,
) -> Result<Vec<ParseTree>, ParseError> {
    if tokens.last().is_none_or(|t| t.symbol != END_MARKER) {
        return Err(ParseError::MissingEndMarker);
    }

    let mut active = GraphStack::single(ParseStack::with_initial_state(0));
    let mut cursor = 0;
    while cursor < tokens.len() {
        let token = &tokens[cursor];
        sink.handle(&ParseEvent::TokenStarted {
            index: cursor,
            symbol: token.symbol.clone(),
        });

        reduce_phase(grammar, automaton, &mut active, token, cursor, config, sink);

        if token.symbol == END_MARKER {
            break;
        }

        let next_active = shift_phase(automaton, &active, token, cursor, sink);
        if next_active.is_empty() {
            match recovery::attempt(automaton, &active, tokens, cursor, config, sink) {
                Recovery::Resync { stack, cursor: k } => {
                    active = GraphStack::single(stack);
                    cursor = k;
                }
                Recovery::SkipToken => {
                    cursor += 1;
                }
            }
            continue;
        }

        active = next_active;
        cursor += 1;
    }

    collect_results(grammar, automaton, &active, cursor, tokens, sink)
}

/// Reduce every stack against the current token, cascading: stacks produced
/// by a reduction are visited later in the same phase. A stack whose
/// signature already exists is merged instead of appended, which terminates
/// cycles of unit productions.
fn reduce_phase(
    grammar: &Grammar,
    automaton: &Automaton,
    active: &mut GraphStack,
    token: &Token,
    cursor: usize,
    config: &EngineConfig,
    sink: &mut dyn EventSink,
) {
    let mut visited = 0;
    let mut index = 0;
    while index < active.len() {
        visited += 1;
        if visited > config.reduction_limit {
            sink.handle(&ParseEvent::ReductionCapped { index: cursor });
            break;
        }

        let stack = active.get(index).fork();
        let Some(top) = stack.top_state() else {
            index += 1;
            continue;
        };

        // Snapshot the reductions first; pushing into `active` must not
        // alias the state borrow.
        let reductions: Vec<(usize, bool)> = automaton
            .state(top)
            .complete_items(grammar)
            .filter(|item| item.production != 0)
            .map(|item| {
                let in_lookahead = item.lookaheads.contains(token.symbol.as_str())
                    || item.lookaheads.contains(END_MARKER);
                (item.production, in_lookahead)
            })
            .collect();

        for (production, in_lookahead) in reductions {
            let prod = grammar.production(production);
            if !in_lookahead {
                // Permitted anyway: closure lookaheads under-approximate for
                // ambiguous and recursive grammars. A wrong reduction yields
                // a stack that cannot shift and is pruned naturally.
                sink.handle(&ParseEvent::LookaheadRelaxed {
                    production,
                    symbol: token.symbol.clone(),
                });
            }
            let rhs_len = prod.rhs.len();
            if stack.len() <= rhs_len {
                continue;
            }

            let mut fork = stack.fork();
            let popped = fork.pop(rhs_len);
            let below = fork.top_state().expect("bottom frame remains after pop");
            let Some(&target) = automaton.state(below).transitions.get(prod.lhs.as_str()) else {
                continue;
            };

            // A popped frame may pack several alternative subtrees from
            // earlier merges. All alternatives in a frame cover the same
            // tokens, so every combination across the popped frames is a
            // distinct derivation of the same span; build one node per
            // combination and pack them into the new frame.
            let mut combos: Vec<Vec<Arc<ParseTree>>> = vec![Vec::with_capacity(rhs_len)];
            for frame in popped.iter().rev() {
                let mut grown = Vec::with_capacity(combos.len() * frame.nodes.len().max(1));
                if frame.nodes.is_empty() {
                    let placeholder = Arc::new(ParseTree::Error {
                        value: compact_str::CompactString::new(""),
                    });
                    for combo in &combos {
                        let mut next = combo.clone();
                        next.push(placeholder.clone());
                        grown.push(next);
                    }
                } else {
                    for combo in &combos {
                        for node in &frame.nodes {
                            let mut next = combo.clone();
                            next.push(node.clone());
                            grown.push(next);
                        }
                    }
                }
                combos = grown;
            }

            let mut nodes: SmallVec<[Arc<ParseTree>; 1]> = SmallVec::new();
            for children in combos {
                let node = Arc::new(ParseTree::nonterminal(prod.lhs.clone(), children));
                if !nodes.iter().any(|n| **n == *node) {
                    nodes.push(node);
                }
            }

            // The new frame spans from the bottom-most popped frame; an
            // epsilon reduction spans nothing at the current position.
            let start = popped.last().map_or(cursor, |frame| frame.start);
            fork.push(Frame::new(target, nodes, start));
            sink.handle(&ParseEvent::Reduced {
                production,
                lhs: prod.lhs.clone(),
            });
            active.push(fork);
        }

        index += 1;
    }
}

/// Shift the current token on every stack whose top state has a transition
/// for it.
fn shift_phase(
    automaton: &Automaton,
    active: &GraphStack,
    token: &Token,
    cursor: usize,
    sink: &mut dyn EventSink,
) -> GraphStack {
    let mut next_active = GraphStack::new();
    for stack in active.iter() {
        let Some(top) = stack.top_state() else {
            continue;
        };
        let Some(&target) = automaton.state(top).transitions.get(token.symbol.as_str()) else {
            continue;
        };
        let mut fork = stack.fork();
        let node = Arc::new(ParseTree::terminal(
            token.value.clone(),
            Some(SourcePos::new(token.line, token.column)),
        ));
        fork.push(Frame::new(target, smallvec![node], cursor));
        sink.handle(&ParseEvent::Shifted {
            symbol: token.symbol.clone(),
            state: target,
        });
        next_active.push(fork);
    }
    next_active
}

/// A stack accepts iff its top state holds the augmented item `S' -> S •`.
/// Accepting stacks contribute every packed alternative; otherwise any stack
/// of depth two or more with a node contributes a fallback partial tree.
fn collect_results(
    grammar: &Grammar,
    automaton: &Automaton,
    active: &GraphStack,
    cursor: usize,
    tokens: &[Token],
    sink: &mut dyn EventSink,
) -> Result<Vec<ParseTree>, ParseError> {
    let mut primary: Vec<ParseTree> = Vec::new();
    let mut fallback: Vec<ParseTree> = Vec::new();
    for stack in active.iter() {
        let Some(top) = stack.top_state() else {
            continue;
        };
        let accepts = automaton
            .state(top)
            .complete_items(grammar)
            .any(|item| item.production == 0);
        let Some(frame) = stack.top() else {
            continue;
        };
        if accepts {
            for node in &frame.nodes {
                primary.push(ParseTree::clone(node));
            }
        } else if stack.len() >= 2 {
            // Same full iteration as the accept branch: a merged top frame
            // carries every surviving alternative.
            for node in &frame.nodes {
                fallback.push(ParseTree::clone(node));
            }
        }
    }

    if !primary.is_empty() {
        sink.handle(&ParseEvent::Accepted {
            trees: primary.len(),
        });
        return Ok(primary);
    }
    if !fallback.is_empty() {
        return Ok(fallback);
    }
    let position = cursor.min(tokens.len().saturating_sub(1));
    Err(ParseError::NoViableParse {
        position,
        symbol: tokens
            .get(position)
            .map(|t| t.symbol.clone())
            .unwrap_or_default(),
    })
}
