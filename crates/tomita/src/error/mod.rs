//! # Error Types
//!
//! Error and warning types for grammar analysis, automaton construction,
//! tokenization, and parsing.
//!
//! ## Error Types
//!
//! - [`GrammarError`]: FIRST/FOLLOW computation failed to converge
//! - [`BuildError`]: the automaton could not be constructed
//! - [`TokenizerError`]: the scanner hit input it cannot match
//! - [`ParseError`]: no viable parse survived, even after recovery
//! - [`BuildWarning`]: an iteration ceiling was hit during construction
//!
//! Errors from [`build`](crate::GlrEngine::build) are fatal to that engine
//! instance: the automaton is left unbuilt. Errors from
//! [`parse`](crate::GlrEngine::parse) are not; the same instance may parse
//! further inputs.
//!
//! ## Diagnostics Support
//!
//! When the `diagnostics` feature is enabled, errors integrate with
//! [`miette`] for rich error reporting.

use thiserror::Error;

use crate::grammar::Symbol;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

/// Errors from FIRST/FOLLOW set computation.
///
/// Both fixed points are bounded; a grammar that fails to settle within the
/// configured ceiling is rejected rather than silently truncated.
#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum GrammarError {
    #[error("FIRST sets did not converge after {iterations} iterations")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::first_diverged)))]
    FirstSetDiverged { iterations: usize },

    #[error("FOLLOW sets did not converge after {iterations} iterations")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::follow_diverged)))]
    FollowSetDiverged { iterations: usize },
}

/// Errors from automaton construction.
#[derive(Debug, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum BuildError {
    #[error("grammar has no productions")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(build::empty_grammar)))]
    EmptyGrammar,

    #[error(transparent)]
    #[cfg_attr(feature = "diagnostics", diagnostic(transparent))]
    Grammar(#[from] GrammarError),
}

/// Errors raised by the scanner on unmatched input.
#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum TokenizerError {
    #[error("unexpected character '{ch}' at line {line}, column {column}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(tokenizer::unexpected_char)))]
    UnexpectedChar { ch: char, line: u32, column: u32 },

    #[error("unterminated string literal starting at line {line}, column {column}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(tokenizer::unterminated_string)))]
    UnterminatedString { line: u32, column: u32 },
}

/// Errors from the GLR driver.
#[derive(Debug, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum ParseError {
    #[error(transparent)]
    #[cfg_attr(feature = "diagnostics", diagnostic(transparent))]
    Tokenizer(#[from] TokenizerError),

    #[error(transparent)]
    #[cfg_attr(feature = "diagnostics", diagnostic(transparent))]
    Build(#[from] BuildError),

    /// Every stack died and recovery produced nothing acceptable.
    #[error("no viable parse at token {position} ('{symbol}')")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parser::no_viable_parse)))]
    NoViableParse { position: usize, symbol: Symbol },

    /// The token stream must end with the `$` sentinel.
    #[error("token stream does not end with the '$' marker")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parser::missing_end_marker)))]
    MissingEndMarker,
}

/// Non-fatal construction diagnostics.
///
/// A warning means an iteration ceiling was reached and the build completed
/// with whatever had been accumulated. Any grammar that triggers one should
/// be treated as suspect.
#[derive(Debug, Clone, Error)]
pub enum BuildWarning {
    #[error("closure fixed point capped after {passes} passes while building state {state}")]
    ClosureIterationCap { state: usize, passes: usize },

    #[error("automaton construction capped after {iterations} iterations ({states} states built)")]
    BuildIterationCap { iterations: usize, states: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grammar_error_display() {
        let err = GrammarError::FirstSetDiverged { iterations: 100 };
        assert!(format!("{err}").contains("FIRST"));
        assert!(format!("{err}").contains("100"));
    }

    #[test]
    fn build_error_wraps_grammar_error() {
        let err: BuildError = GrammarError::FollowSetDiverged { iterations: 100 }.into();
        assert!(format!("{err}").contains("FOLLOW"));
    }

    #[test]
    fn tokenizer_error_carries_position() {
        let err = TokenizerError::UnexpectedChar {
            ch: '@',
            line: 3,
            column: 7,
        };
        let text = format!("{err}");
        assert!(text.contains('@'));
        assert!(text.contains("line 3"));
    }

    #[test]
    fn parse_error_from_tokenizer_error() {
        let lex = TokenizerError::UnterminatedString { line: 1, column: 5 };
        let err: ParseError = lex.into();
        assert!(matches!(err, ParseError::Tokenizer(_)));
    }

    #[test]
    fn build_warning_display() {
        let warning = BuildWarning::BuildIterationCap {
            iterations: 1000,
            states: 412,
        };
        assert!(format!("{warning}").contains("412"));
    }
}
