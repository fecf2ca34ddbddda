//! Diagnostic events emitted during construction and parsing.
//!
//! The engine's verbose mode installs a [`StderrSink`]; everything else is
//! routed through [`NullSink`]. No observable parsing behavior depends on
//! which sink is installed.

use std::fmt;

use crate::grammar::Symbol;

/// A construction or parsing event, for debugging and tracing.
#[derive(Debug, Clone)]
pub enum ParseEvent {
    /// A new automaton state was allocated.
    StateAdded { id: usize, items: usize },
    /// An item-set closure hit its pass ceiling.
    ClosureCapped { state: usize, passes: usize },
    /// The state-graph worklist hit its iteration ceiling.
    BuildCapped { iterations: usize, states: usize },
    /// A unit-terminal item's lookaheads were widened to FOLLOW of its LHS.
    LookaheadRepaired { state: usize, production: usize },
    /// The driver moved to the next input token.
    TokenStarted { index: usize, symbol: Symbol },
    /// A stack shifted the current token.
    Shifted { symbol: Symbol, state: usize },
    /// A stack reduced by a production.
    Reduced { production: usize, lhs: Symbol },
    /// A reduction was permitted although the token is outside the item's
    /// lookahead set.
    LookaheadRelaxed { production: usize, symbol: Symbol },
    /// A token's reduction phase hit the visit ceiling.
    ReductionCapped { index: usize },
    /// No stack could shift; recovery started.
    RecoveryStarted { index: usize },
    /// Recovery found a stack that accepts a synchronizing token.
    RecoverySynchronized { index: usize, symbol: Symbol, depth: usize },
    /// Recovery gave up on the current token and dropped it.
    TokenDropped { index: usize, symbol: Symbol },
    /// End of input: the number of accepting parse trees.
    Accepted { trees: usize },
}

impl fmt::Display for ParseEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StateAdded { id, items } => write!(f, "state {id} added ({items} items)"),
            Self::ClosureCapped { state, passes } => {
                write!(f, "closure capped at {passes} passes in state {state}")
            }
            Self::BuildCapped { iterations, states } => {
                write!(f, "build capped after {iterations} iterations, {states} states")
            }
            Self::LookaheadRepaired { state, production } => {
                write!(f, "state {state}: lookahead repair on production {production}")
            }
            Self::TokenStarted { index, symbol } => write!(f, "token {index}: '{symbol}'"),
            Self::Shifted { symbol, state } => write!(f, "shift '{symbol}' -> state {state}"),
            Self::Reduced { production, lhs } => {
                write!(f, "reduce by production {production} ({lhs})")
            }
            Self::LookaheadRelaxed { production, symbol } => {
                write!(f, "relaxed reduce by production {production} on '{symbol}'")
            }
            Self::ReductionCapped { index } => {
                write!(f, "reduction phase capped at token {index}")
            }
            Self::RecoveryStarted { index } => write!(f, "recovery started at token {index}"),
            Self::RecoverySynchronized { index, symbol, depth } => {
                write!(f, "recovery synchronized on '{symbol}' at token {index} (stack depth {depth})")
            }
            Self::TokenDropped { index, symbol } => {
                write!(f, "recovery dropped token {index} ('{symbol}')")
            }
            Self::Accepted { trees } => write!(f, "accepted with {trees} tree(s)"),
        }
    }
}

/// Receiver for [`ParseEvent`]s.
pub trait EventSink {
    fn handle(&mut self, event: &ParseEvent);
}

/// A sink that discards every event.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn handle(&mut self, _event: &ParseEvent) {}
}

/// A sink that prints every event to stderr. Installed by verbose mode.
#[derive(Debug, Default)]
pub struct StderrSink;

impl EventSink for StderrSink {
    fn handle(&mut self, event: &ParseEvent) {
        eprintln!("[tomita] {event}");
    }
}

/// A sink that records events for inspection in tests.
#[derive(Debug, Default)]
pub struct CollectSink {
    pub events: Vec<ParseEvent>,
}

impl EventSink for CollectSink {
    fn handle(&mut self, event: &ParseEvent) {
        self.events.push(event.clone());
    }
}
