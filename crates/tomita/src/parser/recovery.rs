//! Panic-mode error recovery.
//!
//! Triggered when no stack can shift the current token. The parser scans
//! forward for a synchronizing token, then tries to pop each active stack
//! back to a state that can shift it, keeping the candidate that pops the
//! least. If no synchronizing position works, the offending token is
//! dropped and the stacks pass through unchanged.

use crate::automaton::Automaton;
use crate::config::EngineConfig;
use crate::event::{EventSink, ParseEvent};
use crate::lexer::Token;
use crate::parser::graph::GraphStack;
use crate::parser::stack::ParseStack;

/// Outcome of a recovery attempt.
#[derive(Debug)]
pub(crate) enum Recovery {
    /// Resume from `stack` with the cursor moved to `cursor`, so the
    /// synchronizing token at that position is processed next.
    Resync { stack: ParseStack, cursor: usize },
    /// No synchronizing position worked; drop the current token.
    SkipToken,
}

pub(crate) fn attempt(
    automaton: &Automaton,
    active: &GraphStack,
    tokens: &[Token],
    cursor: usize,
    config: &EngineConfig,
    sink: &mut dyn EventSink,
) -> Recovery {
    sink.handle(&ParseEvent::RecoveryStarted { index: cursor });

    for (offset, token) in tokens[cursor..].iter().enumerate() {
        if !config.is_sync_token(&token.symbol) {
            continue;
        }
        if let Some(stack) = best_candidate(automaton, active, &token.symbol) {
            let position = cursor + offset;
            sink.handle(&ParseEvent::RecoverySynchronized {
                index: position,
                symbol: token.symbol.clone(),
                depth: stack.len(),
            });
            return Recovery::Resync {
                stack,
                cursor: position,
            };
        }
    }

    sink.handle(&ParseEvent::TokenDropped {
        index: cursor,
        symbol: tokens
            .get(cursor)
            .map(|t| t.symbol.clone())
            .unwrap_or_default(),
    });
    Recovery::SkipToken
}

/// Pop each stack until its top state can shift `symbol`; among the stacks
/// that succeed, keep the one with the most frames remaining. Ties go to the
/// earliest stack in active order so recovery stays deterministic.
fn best_candidate(automaton: &Automaton, active: &GraphStack, symbol: &str) -> Option<ParseStack> {
    let mut best: Option<ParseStack> = None;
    for stack in active.iter() {
        let mut candidate = stack.fork();
        loop {
            let Some(top) = candidate.top_state() else {
                break;
            };
            if automaton.state(top).transitions.contains_key(symbol) {
                if best.as_ref().is_none_or(|b| candidate.len() > b.len()) {
                    best = Some(candidate);
                }
                break;
            }
            candidate.pop(1);
        }
    }
    best
}
