//! Parse trees.
//!
//! The engine materializes one tree per accepted parse. Nodes are shared
//! behind `Arc` internally so that forking a parse stack never copies
//! subtrees; the shapes here mirror that.

use std::fmt;
use std::sync::Arc;

use compact_str::CompactString;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::grammar::Symbol;

/// A 1-based line/column position in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct SourcePos {
    pub line: u32,
    pub column: u32,
}

impl SourcePos {
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A node of a parse tree.
///
/// `Error` is a reserved placeholder inserted when a reduction pops a frame
/// with no attached node; it only arises from recovery-seeded frames.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum ParseTree {
    Terminal {
        value: CompactString,
        position: Option<SourcePos>,
    },
    Nonterminal {
        symbol: Symbol,
        children: Vec<Arc<ParseTree>>,
    },
    Error {
        value: CompactString,
    },
}

impl ParseTree {
    #[must_use]
    pub fn terminal(value: impl Into<CompactString>, position: Option<SourcePos>) -> Self {
        Self::Terminal {
            value: value.into(),
            position,
        }
    }

    #[must_use]
    pub fn nonterminal(symbol: impl Into<Symbol>, children: Vec<Arc<ParseTree>>) -> Self {
        Self::Nonterminal {
            symbol: symbol.into(),
            children,
        }
    }

    /// The nonterminal symbol at this node, if any.
    #[must_use]
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Self::Nonterminal { symbol, .. } => Some(symbol),
            _ => None,
        }
    }

    /// Child nodes; empty for leaves.
    #[must_use]
    pub fn children(&self) -> &[Arc<ParseTree>] {
        match self {
            Self::Nonterminal { children, .. } => children,
            _ => &[],
        }
    }

    /// Terminal leaf values in left-to-right order. Error placeholders
    /// contribute their (possibly empty) value.
    #[must_use]
    pub fn leaves(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'t>(&'t self, out: &mut Vec<&'t str>) {
        match self {
            Self::Terminal { value, .. } | Self::Error { value } => out.push(value),
            Self::Nonterminal { children, .. } => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    /// Reconstruct source text from the leaf values.
    ///
    /// Spacing heuristics: no space before `,`, `;`, or closing brackets; no
    /// space after opening brackets; no space around `.` and `:`; a space
    /// everywhere else, which covers alphanumeric runs and the
    /// alphanumeric/operator boundary.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut prev: Option<&str> = None;
        for leaf in self.leaves() {
            if leaf.is_empty() {
                continue;
            }
            if let Some(prev) = prev {
                if needs_space(prev, leaf) {
                    out.push(' ');
                }
            }
            out.push_str(leaf);
            prev = Some(leaf);
        }
        out
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        for _ in 0..depth {
            f.write_str("  ")?;
        }
        match self {
            Self::Terminal { value, .. } => writeln!(f, "{value}"),
            Self::Error { value } => writeln!(f, "<error:{value}>"),
            Self::Nonterminal { symbol, children } => {
                writeln!(f, "{symbol}")?;
                for child in children {
                    child.fmt_indented(f, depth + 1)?;
                }
                Ok(())
            }
        }
    }
}

/// Indented symbol-per-line form, the CLI's default output.
impl fmt::Display for ParseTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

fn needs_space(prev: &str, next: &str) -> bool {
    const TIGHT_BEFORE: &[&str] = &[",", ";", ")", "]", "}"];
    const TIGHT_AFTER: &[&str] = &["(", "["];
    const TIGHT_BOTH: &[&str] = &[".", ":"];
    if TIGHT_BEFORE.contains(&next) || TIGHT_AFTER.contains(&prev) {
        return false;
    }
    if TIGHT_BOTH.contains(&prev) || TIGHT_BOTH.contains(&next) {
        return false;
    }
    true
}
