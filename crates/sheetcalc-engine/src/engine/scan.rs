//! Formula scanner.
//!
//! Splits formula text into tokens in one eager pass. Cell references are
//! resolved against the base cell while scanning, so a malformed reference is
//! reported here rather than by the parser.

use regex::Regex;
use std::sync::OnceLock;

use super::ast::Op;
use super::cell_ref::{CellRef, Position};
use super::error::ParseError;

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Num(f64),
    Fn(Op),
    Ref(CellRef),
    /// One of `+ - * / ( ) ,`.
    Punct(char),
    Eof,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
}

const PUNCTUATION: &str = "+-*/(),";

fn number_re() -> &'static Regex {
    static NUMBER_RE: OnceLock<Regex> = OnceLock::new();
    NUMBER_RE.get_or_init(|| {
        Regex::new(r"^[0-9]+(\.[0-9]+)?([eE][-+]?[0-9]+)?").expect("number regex must compile")
    })
}

fn word_re() -> &'static Regex {
    static WORD_RE: OnceLock<Regex> = OnceLock::new();
    WORD_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_$]+").expect("word regex must compile"))
}

/// Scan `text` into tokens, always terminated by [`TokenKind::Eof`].
pub fn scan(text: &str, base: Position) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut offset = 0;

    loop {
        let rest = &text[offset..];
        let trimmed = rest.trim_start();
        offset += rest.len() - trimmed.len();
        let Some(c) = trimmed.chars().next() else {
            break;
        };

        let token = if c.is_ascii_digit() {
            let lexeme = number_re()
                .find(trimmed)
                .map(|m| m.as_str())
                .unwrap_or_default();
            let value = lexeme
                .parse::<f64>()
                .map_err(|_| ParseError::BadNumber(lexeme.to_string()))?;
            Token {
                kind: TokenKind::Num(value),
                lexeme: lexeme.to_string(),
            }
        } else if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
            let lexeme = word_re()
                .find(trimmed)
                .map(|m| m.as_str())
                .unwrap_or_default();
            let kind = match Op::from_function_name(lexeme) {
                Some(op) => TokenKind::Fn(op),
                None => TokenKind::Ref(CellRef::parse(lexeme, base)?),
            };
            Token {
                kind,
                lexeme: lexeme.to_string(),
            }
        } else if PUNCTUATION.contains(c) {
            Token {
                kind: TokenKind::Punct(c),
                lexeme: c.to_string(),
            }
        } else {
            return Err(ParseError::UnexpectedChar { ch: c, offset });
        };

        offset += token.lexeme.len();
        tokens.push(token);
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        lexeme: "<EOF>".to_string(),
    });
    Ok(tokens)
}
