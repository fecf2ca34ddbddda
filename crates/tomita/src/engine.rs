//! The engine facade.
//!
//! [`GlrEngine`] assembles the pieces: it accumulates productions, owns the
//! scanner and configuration, builds the automaton once, and drives the GLR
//! runtime over tokenized input.

use crate::automaton::Automaton;
use crate::config::EngineConfig;
use crate::error::{BuildError, BuildWarning, ParseError};
use crate::event::{EventSink, NullSink, StderrSink};
use crate::grammar::Grammar;
use crate::lexer::{Scanner, Token};
use crate::parser;
use crate::tree::ParseTree;

/// A GLR parsing engine for one grammar.
///
/// Productions accumulate until [`build`](Self::build) runs; the first
/// production added fixes the start symbol. `build` is idempotent, and
/// [`parse`](Self::parse) builds on demand. Adding a production after a
/// build discards the automaton so the next parse rebuilds against the
/// current grammar.
///
/// # Examples
///
/// ```rust,no_run
/// use tomita::GlrEngine;
///
/// let mut engine = GlrEngine::new();
/// engine.add_production("E", &["E", "+", "E"]);
/// engine.add_production("E", &["num"]);
///
/// let trees = engine.parse("1 + 2 + 3").expect("well-formed input");
/// // The grammar is ambiguous, so both groupings come back.
/// assert!(trees.len() >= 2);
/// ```
#[derive(Debug)]
pub struct GlrEngine {
    grammar: Grammar,
    scanner: Scanner,
    config: EngineConfig,
    automaton: Option<Automaton>,
    warnings: Vec<BuildWarning>,
    verbose: bool,
}

impl Default for GlrEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GlrEngine {
    /// An engine with the default scanner and configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_scanner(Scanner::new())
    }

    #[must_use]
    pub fn with_scanner(scanner: Scanner) -> Self {
        Self {
            grammar: Grammar::new(),
            scanner,
            config: EngineConfig::default(),
            automaton: None,
            warnings: Vec::new(),
            verbose: false,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Enable or disable diagnostic output on stderr. No other observable
    /// behavior depends on this flag.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    #[must_use]
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Append a production; the first call fixes the start symbol. An empty
    /// `rhs` is an epsilon production.
    pub fn add_production(&mut self, lhs: &str, rhs: &[&str]) -> &mut Self {
        self.grammar.add_production(lhs, rhs);
        self.automaton = None;
        self
    }

    #[must_use]
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The automaton, if built.
    #[must_use]
    pub fn automaton(&self) -> Option<&Automaton> {
        self.automaton.as_ref()
    }

    /// Warnings accumulated by the last successful build.
    #[must_use]
    pub fn build_warnings(&self) -> &[BuildWarning] {
        &self.warnings
    }

    /// Compute FIRST/FOLLOW and the automaton. Idempotent: a second call on
    /// a built engine is a no-op.
    ///
    /// # Errors
    ///
    /// Build errors are fatal to the automaton: it is left unbuilt, never
    /// half-built. See [`BuildError`].
    pub fn build(&mut self) -> Result<(), BuildError> {
        if self.automaton.is_some() {
            return Ok(());
        }
        self.grammar.augment();
        let mut sink = self.make_sink();
        let (automaton, warnings) = Automaton::build(&self.grammar, &self.config, sink.as_mut())?;
        self.automaton = Some(automaton);
        self.warnings = warnings;
        Ok(())
    }

    /// Tokenize `input` and parse it, building the automaton first if
    /// needed. Returns one tree per accepted parse; for an ambiguous
    /// grammar there may be several.
    ///
    /// # Errors
    ///
    /// Parse errors are not fatal to the engine; the same instance may
    /// parse further inputs. See [`ParseError`].
    pub fn parse(&mut self, input: &str) -> Result<Vec<ParseTree>, ParseError> {
        let tokens = self.scanner.tokenize(input)?;
        self.parse_tokens(&tokens)
    }

    /// Parse an already-tokenized stream. The stream must end with the `$`
    /// sentinel.
    ///
    /// # Errors
    ///
    /// See [`ParseError`].
    pub fn parse_tokens(&mut self, tokens: &[Token]) -> Result<Vec<ParseTree>, ParseError> {
        self.build()?;
        let automaton = self.automaton.as_ref().expect("built above");
        let mut sink = self.make_sink();
        parser::run(&self.grammar, automaton, tokens, &self.config, sink.as_mut())
    }

    fn make_sink(&self) -> Box<dyn EventSink> {
        if self.verbose {
            Box::new(StderrSink)
        } else {
            Box::new(NullSink)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn math_engine() -> GlrEngine {
        let mut engine = GlrEngine::new();
        engine.add_production("E", &["E", "+", "T"]);
        engine.add_production("E", &["T"]);
        engine.add_production("T", &["T", "*", "F"]);
        engine.add_production("T", &["F"]);
        engine.add_production("F", &["(", "E", ")"]);
        engine.add_production("F", &["num"]);
        engine
    }

    #[test]
    fn build_is_idempotent() {
        let mut engine = math_engine();
        engine.build().unwrap();
        let states = engine.automaton().unwrap().state_count();
        engine.build().unwrap();
        assert_eq!(engine.automaton().unwrap().state_count(), states);
    }

    #[test]
    fn build_rejects_empty_grammar() {
        let mut engine = GlrEngine::new();
        assert!(matches!(engine.build(), Err(BuildError::EmptyGrammar)));
        assert!(engine.automaton().is_none());
    }

    #[test]
    fn parse_builds_on_demand() {
        let mut engine = math_engine();
        let trees = engine.parse("1 + 2").unwrap();
        assert_eq!(trees.len(), 1);
        assert!(engine.automaton().is_some());
    }

    #[test]
    fn parse_errors_are_not_fatal() {
        let mut engine = math_engine();
        assert!(engine.parse("+ +").is_err());
        let trees = engine.parse("1 * 2").unwrap();
        assert_eq!(trees.len(), 1);
    }

    #[test]
    fn adding_a_production_invalidates_the_automaton() {
        let mut engine = math_engine();
        engine.build().unwrap();
        engine.add_production("F", &["id"]);
        assert!(engine.automaton().is_none());
        engine.build().unwrap();
    }

    #[test]
    fn tokenizer_errors_propagate() {
        let mut engine = math_engine();
        let err = engine.parse("1 @ 2").unwrap_err();
        assert!(matches!(err, ParseError::Tokenizer(_)));
    }
}
