//! # Tokenization
//!
//! The tokenizer contract and the table-driven scanner that backs the
//! predefined grammars.
//!
//! A tokenizer is any `&str -> Vec<Token>` function whose output ends with
//! the `$` sentinel; whitespace and comments are the tokenizer's problem,
//! never the parser's. [`Scanner`] covers the usual case: a keyword table,
//! a longest-match operator table, number/identifier/string rules, and
//! line-comment filtering, with 1-based line/column tracking throughout.

use compact_str::CompactString;
use hashbrown::HashSet;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::error::TokenizerError;
use crate::grammar::{END_MARKER, Symbol};

/// One input token: the grammar symbol it matches, the matched text, and
/// its source position.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Token {
    pub symbol: Symbol,
    pub value: CompactString,
    pub line: u32,
    pub column: u32,
}

impl Token {
    #[must_use]
    pub fn new(
        symbol: impl Into<Symbol>,
        value: impl Into<CompactString>,
        line: u32,
        column: u32,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            value: value.into(),
            line,
            column,
        }
    }

    /// The `$` sentinel every token stream must end with.
    #[must_use]
    pub fn end_marker(line: u32, column: u32) -> Self {
        Self::new(END_MARKER, END_MARKER, line, column)
    }

    #[must_use]
    pub fn is_end_marker(&self) -> bool {
        self.symbol == END_MARKER
    }
}

/// A configurable scanner.
///
/// Identifiers that appear in the keyword table tokenize as themselves
/// (symbol = lexeme); all other identifiers get `ident_symbol`. Operators
/// match longest-first. Numbers are decimal with an optional fraction.
#[derive(Debug, Clone)]
pub struct Scanner {
    keywords: HashSet<CompactString, ahash::RandomState>,
    operators: Vec<CompactString>,
    line_comments: Vec<CompactString>,
    ident_symbol: Symbol,
    number_symbol: Symbol,
    string_symbol: Symbol,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    #[must_use]
    pub fn new() -> Self {
        Self {
            keywords: HashSet::default(),
            operators: Vec::new(),
            line_comments: Vec::new(),
            ident_symbol: Symbol::from("id"),
            number_symbol: Symbol::from("num"),
            string_symbol: Symbol::from("string"),
        }
        .operators(&[
            "==", "~=", "!=", "<=", ">=", "..", "+", "-", "*", "/", "%", "(", ")", "{", "}", "[",
            "]", "=", "<", ">", ",", ";", ".", ":", "#",
        ])
    }

    #[must_use]
    pub fn keywords(mut self, words: &[&str]) -> Self {
        self.keywords = words.iter().map(|w| CompactString::from(*w)).collect();
        self
    }

    /// Replace the operator table. Longer operators win over their
    /// prefixes regardless of the order given here.
    #[must_use]
    pub fn operators(mut self, ops: &[&str]) -> Self {
        self.operators = ops.iter().map(|o| CompactString::from(*o)).collect();
        self.operators.sort_by(|a, b| b.len().cmp(&a.len()));
        self
    }

    #[must_use]
    pub fn line_comment(mut self, prefix: &str) -> Self {
        self.line_comments.push(CompactString::from(prefix));
        self
    }

    #[must_use]
    pub fn ident_symbol(mut self, symbol: &str) -> Self {
        self.ident_symbol = Symbol::from(symbol);
        self
    }

    #[must_use]
    pub fn number_symbol(mut self, symbol: &str) -> Self {
        self.number_symbol = Symbol::from(symbol);
        self
    }

    #[must_use]
    pub fn string_symbol(mut self, symbol: &str) -> Self {
        self.string_symbol = Symbol::from(symbol);
        self
    }

    /// Tokenize `input`, appending the `$` sentinel.
    ///
    /// # Errors
    ///
    /// Returns [`TokenizerError::UnexpectedChar`] on input no rule matches
    /// and [`TokenizerError::UnterminatedString`] for a string literal with
    /// no closing quote.
    pub fn tokenize(&self, input: &str) -> Result<Vec<Token>, TokenizerError> {
        let mut tokens = Vec::new();
        let mut pos = 0;
        let mut line: u32 = 1;
        let mut column: u32 = 1;

        while pos < input.len() {
            let rest = &input[pos..];
            let ch = rest.chars().next().expect("pos is a char boundary");

            if ch == '\n' {
                pos += 1;
                line += 1;
                column = 1;
                continue;
            }
            if ch.is_whitespace() {
                pos += ch.len_utf8();
                column += 1;
                continue;
            }

            if self
                .line_comments
                .iter()
                .any(|p| rest.starts_with(p.as_str()))
            {
                let len = rest.find('\n').unwrap_or(rest.len());
                column += rest[..len].chars().count() as u32;
                pos += len;
                continue;
            }

            if ch.is_ascii_digit() {
                let len = Self::number_len(rest);
                tokens.push(Token::new(
                    self.number_symbol.clone(),
                    &rest[..len],
                    line,
                    column,
                ));
                pos += len;
                column += len as u32;
                continue;
            }

            if ch.is_alphabetic() || ch == '_' {
                let len = rest
                    .find(|c: char| !c.is_alphanumeric() && c != '_')
                    .unwrap_or(rest.len());
                let word = &rest[..len];
                let symbol = if self.keywords.contains(word) {
                    Symbol::from(word)
                } else {
                    self.ident_symbol.clone()
                };
                tokens.push(Token::new(symbol, word, line, column));
                pos += len;
                column += word.chars().count() as u32;
                continue;
            }

            if ch == '"' || ch == '\'' {
                let len = Self::string_len(rest, ch).ok_or(TokenizerError::UnterminatedString {
                    line,
                    column,
                })?;
                tokens.push(Token::new(
                    self.string_symbol.clone(),
                    &rest[..len],
                    line,
                    column,
                ));
                pos += len;
                column += rest[..len].chars().count() as u32;
                continue;
            }

            if let Some(op) = self
                .operators
                .iter()
                .find(|op| rest.starts_with(op.as_str()))
            {
                tokens.push(Token::new(op.clone(), op.clone(), line, column));
                pos += op.len();
                column += op.chars().count() as u32;
                continue;
            }

            return Err(TokenizerError::UnexpectedChar { ch, line, column });
        }

        tokens.push(Token::end_marker(line, column));
        Ok(tokens)
    }

    /// Byte length of a decimal number with optional fraction.
    fn number_len(rest: &str) -> usize {
        let mut len = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let tail = &rest[len..];
        if tail.starts_with('.') && tail[1..].starts_with(|c: char| c.is_ascii_digit()) {
            let frac = tail[1..]
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(tail.len() - 1);
            len += 1 + frac;
        }
        len
    }

    /// Byte length of a quoted string including both quotes, honoring
    /// backslash escapes. None if unterminated.
    fn string_len(rest: &str, quote: char) -> Option<usize> {
        let mut chars = rest.char_indices().skip(1);
        while let Some((i, c)) = chars.next() {
            if c == '\\' {
                chars.next();
            } else if c == quote {
                return Some(i + c.len_utf8());
            } else if c == '\n' {
                return None;
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_and_operators() {
        let scanner = Scanner::new();
        let tokens = scanner.tokenize("1 + 2 * 3").unwrap();
        let symbols: Vec<_> = tokens.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["num", "+", "num", "*", "num", "$"]);
        assert_eq!(tokens[0].value, "1");
        assert_eq!(tokens[4].value, "3");
    }

    #[test]
    fn end_marker_is_always_appended() {
        let scanner = Scanner::new();
        let tokens = scanner.tokenize("").unwrap();
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_end_marker());
    }

    #[test]
    fn keywords_tokenize_as_themselves() {
        let scanner = Scanner::new().keywords(&["local"]).ident_symbol("name");
        let tokens = scanner.tokenize("local x").unwrap();
        assert_eq!(tokens[0].symbol, "local");
        assert_eq!(tokens[1].symbol, "name");
        assert_eq!(tokens[1].value, "x");
    }

    #[test]
    fn longest_operator_wins() {
        let scanner = Scanner::new();
        let tokens = scanner.tokenize("a==b").unwrap();
        assert_eq!(tokens[1].symbol, "==");
    }

    #[test]
    fn line_and_column_are_one_based() {
        let scanner = Scanner::new();
        let tokens = scanner.tokenize("1\n  22").unwrap();
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column), (2, 3));
    }

    #[test]
    fn comments_are_filtered() {
        let scanner = Scanner::new().line_comment("--");
        let tokens = scanner.tokenize("1 -- ignored\n2").unwrap();
        let values: Vec<_> = tokens.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, vec!["1", "2", "$"]);
    }

    #[test]
    fn strings_keep_their_quotes() {
        let scanner = Scanner::new();
        let tokens = scanner.tokenize("\"hi there\"").unwrap();
        assert_eq!(tokens[0].symbol, "string");
        assert_eq!(tokens[0].value, "\"hi there\"");
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let scanner = Scanner::new();
        let err = scanner.tokenize("'oops").unwrap_err();
        assert!(matches!(err, TokenizerError::UnterminatedString { .. }));
    }

    #[test]
    fn unexpected_char_is_an_error() {
        let scanner = Scanner::new();
        let err = scanner.tokenize("a @ b").unwrap_err();
        assert!(matches!(
            err,
            TokenizerError::UnexpectedChar { ch: '@', line: 1, column: 3 }
        ));
    }

    #[test]
    fn fractional_numbers() {
        let scanner = Scanner::new();
        let tokens = scanner.tokenize("3.14 1.x").unwrap();
        assert_eq!(tokens[0].value, "3.14");
        // "1.x" is a number, a dot, then an identifier
        assert_eq!(tokens[1].value, "1");
        assert_eq!(tokens[2].symbol, ".");
    }
}
