//! # Tomita
//!
//! A Generalized LR (GLR) parsing engine. Feed it a context-free grammar
//! (ambiguous and non-LR(1) grammars included) and it builds a canonical
//! LR(1) recognizer, then parses token streams by exploring every viable
//! parse in parallel, returning one tree per surviving interpretation.
//!
//! ## Overview
//!
//! Four subsystems cooperate:
//!
//! - **Grammar analysis** ([`grammar`]): production storage with derived
//!   terminal/nonterminal classification, plus bounded FIRST/FOLLOW
//!   fixed-point computation.
//! - **Automaton construction** ([`automaton`]): canonical LR(1) item-set
//!   closure with lookahead propagation, GOTO transitions, and state
//!   deduplication by canonical key.
//! - **GLR runtime** ([`parser`]): parallel parse stacks with Arc-shared
//!   tails, processed in lock-step per token: reductions cascade and fork
//!   on conflicts, equivalent stacks merge, dead stacks disappear.
//! - **Panic-mode recovery**: when nothing can shift, the driver
//!   synchronizes on tokens like `;` or `end` by popping as little stack as
//!   possible.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tomita::GlrEngine;
//!
//! // An ambiguous expression grammar a deterministic LR parser would
//! // reject outright.
//! let mut engine = GlrEngine::new();
//! engine.add_production("E", &["E", "+", "E"]);
//! engine.add_production("E", &["E", "*", "E"]);
//! engine.add_production("E", &["num"]);
//!
//! let trees = engine.parse("1 + 2 * 3").expect("parses");
//! // Both operator groupings survive:
//! assert!(trees.len() >= 2);
//! for tree in &trees {
//!     println!("{tree}");
//! }
//!
//! // Reconstruct source text from any tree's leaves.
//! assert_eq!(trees[0].render(), "1 + 2 * 3");
//! ```
//!
//! Predefined grammar bundles (arithmetic, a Lua subset, and friends) live
//! in [`grammars`].
//!
//! ## Modules
//!
//! - [`grammar`] - Grammar definition and FIRST/FOLLOW analysis
//! - [`automaton`] - Canonical LR(1) state-graph construction
//! - [`parser`] - The GLR runtime (stacks, graph stack, driver)
//! - [`lexer`] - The tokenizer contract and table-driven scanner
//! - [`tree`] - Parse trees, printing, and source rendering
//! - [`error`] - Error and warning taxonomy
//! - [`event`] - Diagnostic events (verbose mode)
//! - [`grammars`] - Predefined grammar bundles

pub mod automaton;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod grammar;
pub mod grammars;
pub mod lexer;
pub mod parser;
pub mod tree;

// Re-export commonly used types
pub use config::EngineConfig;
pub use engine::GlrEngine;
pub use error::{BuildError, BuildWarning, GrammarError, ParseError, TokenizerError};
pub use event::{EventSink, NullSink, ParseEvent, StderrSink};
pub use grammar::{END_MARKER, EPSILON, Grammar, Production, Symbol, SymbolSets};
pub use grammars::GrammarKind;
pub use lexer::{Scanner, Token};
pub use tree::{ParseTree, SourcePos};
