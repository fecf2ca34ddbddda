//! Engine tuning knobs.

use crate::grammar::Symbol;

/// Synchronizing tokens used by panic-mode recovery when nothing else is
/// configured.
pub const DEFAULT_SYNC_TOKENS: &[&str] = &[";", "end", "else", "elseif", "until", "$", ")", "}", "]"];

/// Configuration for grammar analysis, automaton construction, and the GLR
/// driver.
///
/// The iteration ceilings are safety nets against pathological grammars
/// (e.g. cycles of nullable productions). Hitting one produces a
/// [`BuildWarning`](crate::error::BuildWarning) or a
/// [`ParseEvent`](crate::event::ParseEvent) rather than silent truncation;
/// it is never a normal termination condition.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum fixed-point passes for FIRST and for FOLLOW computation.
    pub first_follow_limit: usize,
    /// Maximum fixed-point passes per item-set closure.
    pub closure_limit: usize,
    /// Maximum worklist iterations during state-graph construction.
    pub build_limit: usize,
    /// Maximum stacks visited in one token's reduction phase.
    pub reduction_limit: usize,
    /// Tokens that panic-mode recovery synchronizes on.
    pub sync_tokens: Vec<Symbol>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            first_follow_limit: 100,
            closure_limit: 200,
            build_limit: 10_000,
            reduction_limit: 4_096,
            sync_tokens: DEFAULT_SYNC_TOKENS.iter().map(|s| Symbol::from(*s)).collect(),
        }
    }
}

impl EngineConfig {
    /// True if `symbol` is in the recovery synchronization set.
    #[must_use]
    pub fn is_sync_token(&self, symbol: &str) -> bool {
        self.sync_tokens.iter().any(|s| s == symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ceilings_meet_minimums() {
        let config = EngineConfig::default();
        assert!(config.first_follow_limit >= 100);
        assert!(config.closure_limit >= 200);
        assert!(config.build_limit >= 1000);
    }

    #[test]
    fn default_sync_tokens_include_end_marker() {
        let config = EngineConfig::default();
        assert!(config.is_sync_token("$"));
        assert!(config.is_sync_token(";"));
        assert!(!config.is_sync_token("+"));
    }
}
