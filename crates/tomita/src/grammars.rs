//! Predefined grammar bundles.
//!
//! Each bundle returns a [`GlrEngine`] pre-loaded with productions and a
//! scanner whose token symbols match the grammar's terminals. The bundles
//! double as the CLI's grammar registry.

use std::str::FromStr;

use crate::engine::GlrEngine;
use crate::lexer::Scanner;

/// The grammars the CLI can select by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarKind {
    Lua,
    Math,
    Simple,
    Programming,
}

impl GrammarKind {
    pub const ALL: &'static [Self] = &[Self::Lua, Self::Math, Self::Simple, Self::Programming];

    /// Build the engine for this grammar.
    #[must_use]
    pub fn engine(self) -> GlrEngine {
        match self {
            Self::Lua => lua(),
            Self::Math => math(),
            Self::Simple => simple(),
            Self::Programming => programming(),
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Lua => "lua",
            Self::Math => "math",
            Self::Simple => "simple",
            Self::Programming => "programming",
        }
    }
}

impl FromStr for GrammarKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lua" => Ok(Self::Lua),
            "math" => Ok(Self::Math),
            "simple" => Ok(Self::Simple),
            "programming" => Ok(Self::Programming),
            other => Err(format!(
                "unknown grammar '{other}'; expected one of: lua, math, simple, programming"
            )),
        }
    }
}

/// The arithmetic expression grammar: left-recursive, unambiguous, with the
/// usual E/T/F precedence layering.
#[must_use]
pub fn math() -> GlrEngine {
    let mut engine = GlrEngine::new();
    engine.add_production("E", &["E", "+", "T"]);
    engine.add_production("E", &["E", "-", "T"]);
    engine.add_production("E", &["T"]);
    engine.add_production("T", &["T", "*", "F"]);
    engine.add_production("T", &["T", "/", "F"]);
    engine.add_production("T", &["F"]);
    engine.add_production("F", &["(", "E", ")"]);
    engine.add_production("F", &["num"]);
    engine
}

/// The smallest interesting grammar: `S -> a S | a`.
#[must_use]
pub fn simple() -> GlrEngine {
    let mut engine = GlrEngine::with_scanner(Scanner::new().keywords(&["a"]));
    engine.add_production("S", &["a", "S"]);
    engine.add_production("S", &["a"]);
    engine
}

/// A Lua-subset grammar: chunks of statements with `local` declarations,
/// assignment, control flow, function statements, calls, and an
/// (ambiguous) binary-operator expression layer.
#[must_use]
pub fn lua() -> GlrEngine {
    let scanner = Scanner::new()
        .keywords(&[
            "local", "if", "then", "else", "elseif", "end", "while", "do", "repeat", "until",
            "function", "return", "nil", "true", "false", "and", "or", "not",
        ])
        .ident_symbol("name")
        .line_comment("--");
    let mut engine = GlrEngine::with_scanner(scanner);

    engine.add_production("chunk", &["block"]);
    engine.add_production("block", &["statlist"]);
    engine.add_production("statlist", &["statlist", "stat"]);
    engine.add_production("statlist", &["stat"]);

    engine.add_production("stat", &["local", "namelist", "=", "explist"]);
    engine.add_production("stat", &["varlist", "=", "explist"]);
    engine.add_production("stat", &["functioncall"]);
    engine.add_production("stat", &["if", "exp", "then", "block", "end"]);
    engine.add_production("stat", &["if", "exp", "then", "block", "else", "block", "end"]);
    engine.add_production("stat", &["if", "exp", "then", "block", "elseifseq", "end"]);
    engine.add_production(
        "stat",
        &["if", "exp", "then", "block", "elseifseq", "else", "block", "end"],
    );
    engine.add_production("stat", &["while", "exp", "do", "block", "end"]);
    engine.add_production("stat", &["repeat", "block", "until", "exp"]);
    engine.add_production("stat", &["function", "name", "funcbody"]);
    engine.add_production("stat", &["return", "explist"]);
    engine.add_production("stat", &["return"]);

    engine.add_production("elseifseq", &["elseifseq", "elseif", "exp", "then", "block"]);
    engine.add_production("elseifseq", &["elseif", "exp", "then", "block"]);

    engine.add_production("namelist", &["namelist", ",", "name"]);
    engine.add_production("namelist", &["name"]);
    engine.add_production("varlist", &["varlist", ",", "var"]);
    engine.add_production("varlist", &["var"]);

    engine.add_production("var", &["name"]);
    engine.add_production("var", &["prefixexp", ".", "name"]);
    engine.add_production("var", &["prefixexp", "[", "exp", "]"]);
    engine.add_production("prefixexp", &["var"]);
    engine.add_production("prefixexp", &["functioncall"]);
    engine.add_production("prefixexp", &["(", "exp", ")"]);
    engine.add_production("functioncall", &["prefixexp", "(", "arglist", ")"]);
    engine.add_production("arglist", &["explist"]);
    engine.add_production("arglist", &[]);

    engine.add_production("funcbody", &["(", "parlist", ")", "block", "end"]);
    engine.add_production("funcbody", &["(", "parlist", ")", "end"]);
    engine.add_production("parlist", &["namelist"]);
    engine.add_production("parlist", &[]);

    engine.add_production("explist", &["explist", ",", "exp"]);
    engine.add_production("explist", &["exp"]);

    engine.add_production("exp", &["nil"]);
    engine.add_production("exp", &["true"]);
    engine.add_production("exp", &["false"]);
    engine.add_production("exp", &["num"]);
    engine.add_production("exp", &["string"]);
    engine.add_production("exp", &["prefixexp"]);
    engine.add_production("exp", &["exp", "binop", "exp"]);
    engine.add_production("exp", &["unop", "exp"]);

    for op in ["+", "-", "*", "/", "..", "==", "~=", "<", ">", "<=", ">=", "and", "or"] {
        engine.add_production("binop", &[op]);
    }
    for op in ["-", "not", "#"] {
        engine.add_production("unop", &[op]);
    }

    engine
}

/// A generic statement-oriented language: declarations, assignment,
/// `if`/`while` with parenthesized conditions, and braced blocks.
#[must_use]
pub fn programming() -> GlrEngine {
    let scanner = Scanner::new()
        .keywords(&["let", "if", "else", "while"])
        .line_comment("//");
    let mut engine = GlrEngine::with_scanner(scanner);

    engine.add_production("program", &["stmtlist"]);
    engine.add_production("stmtlist", &["stmtlist", "stmt"]);
    engine.add_production("stmtlist", &["stmt"]);

    engine.add_production("stmt", &["let", "id", "=", "exp", ";"]);
    engine.add_production("stmt", &["id", "=", "exp", ";"]);
    engine.add_production("stmt", &["if", "(", "exp", ")", "block"]);
    engine.add_production("stmt", &["if", "(", "exp", ")", "block", "else", "block"]);
    engine.add_production("stmt", &["while", "(", "exp", ")", "block"]);
    engine.add_production("stmt", &["block"]);

    engine.add_production("block", &["{", "stmtlist", "}"]);
    engine.add_production("block", &["{", "}"]);

    engine.add_production("exp", &["exp", "binop", "exp"]);
    engine.add_production("exp", &["(", "exp", ")"]);
    engine.add_production("exp", &["id"]);
    engine.add_production("exp", &["num"]);
    engine.add_production("exp", &["string"]);

    for op in ["+", "-", "*", "/", "<", ">", "==", "!="] {
        engine.add_production("binop", &[op]);
    }

    engine
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_from_str() {
        for kind in GrammarKind::ALL {
            assert_eq!(kind.name().parse::<GrammarKind>().unwrap(), *kind);
        }
        assert!("pascal".parse::<GrammarKind>().is_err());
    }

    #[test]
    fn math_parses_unambiguously() {
        let mut engine = math();
        let trees = engine.parse("1 + 2 * 3").unwrap();
        assert_eq!(trees.len(), 1);
    }

    #[test]
    fn simple_grammar_accepts_repeated_a() {
        let mut engine = simple();
        let trees = engine.parse("a a a").unwrap();
        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].leaves(), vec!["a", "a", "a"]);
    }

    #[test]
    fn programming_parses_declaration() {
        let mut engine = programming();
        let trees = engine.parse("let x = 1 + 2;").unwrap();
        assert!(!trees.is_empty());
        assert_eq!(trees[0].symbol(), Some("program"));
    }
}
