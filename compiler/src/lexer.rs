//! Splits a pattern into structural, quantifier and literal-run tokens.
use std::ops::Range;

use parcel::prelude::v1::*;

use crate::ParseErr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// One or more consecutive literal characters, escapes included.
    LiteralRun,
    LParen,
    RParen,
    LBracket,
    RBracket,
    /// `?`
    Opt,
    /// `*`
    Star,
    /// `+`
    Plus,
}

impl TokenKind {
    fn from_structural(c: char) -> Option<Self> {
        match c {
            '(' => Some(Self::LParen),
            ')' => Some(Self::RParen),
            '[' => Some(Self::LBracket),
            ']' => Some(Self::RBracket),
            '?' => Some(Self::Opt),
            '*' => Some(Self::Star),
            '+' => Some(Self::Plus),
            _ => None,
        }
    }

    pub fn is_quantifier(&self) -> bool {
        matches!(self, Self::Opt | Self::Star | Self::Plus)
    }
}

/// A span of the pattern, `offset` and `len` are measured in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
    pub len: usize,
}

impl Token {
    pub fn new(kind: TokenKind, offset: usize, len: usize) -> Self {
        Self { kind, offset, len }
    }

    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// A single character of a literal run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Literal {
    /// The offset of the character, or of its escaping backslash.
    pub offset: usize,
    pub value: char,
    pub escaped: bool,
}

impl Literal {
    pub fn is_unescaped(&self, c: char) -> bool {
        !self.escaped && self.value == c
    }
}

/// Iterates the characters of a span of the pattern, folding each backslash
/// into the character it escapes. A trailing backslash is yielded unescaped.
pub struct Literals<'a> {
    chars: std::str::CharIndices<'a>,
    base: usize,
}

impl Iterator for Literals<'_> {
    type Item = Literal;

    fn next(&mut self) -> Option<Self::Item> {
        let (pos, value) = self.chars.next()?;
        let offset = self.base + pos;

        if value != '\\' {
            return Some(Literal {
                offset,
                value,
                escaped: false,
            });
        }

        match self.chars.next() {
            Some((_, escaped)) => Some(Literal {
                offset,
                value: escaped,
                escaped: true,
            }),
            None => Some(Literal {
                offset,
                value,
                escaped: false,
            }),
        }
    }
}

/// Returns the literal characters of `span` within `pattern`.
pub fn literals(pattern: &str, span: Range<usize>) -> Literals<'_> {
    let start = span.start;
    Literals {
        chars: pattern.get(span).unwrap_or_default().char_indices(),
        base: start,
    }
}

/// Splits a pattern into its tokens.
///
/// # Example
///
/// ```
/// use tiny_regex_compiler::lexer::{tokenize, Token, TokenKind};
///
/// assert_eq!(
///     Ok(vec![
///         Token::new(TokenKind::LiteralRun, 0, 2),
///         Token::new(TokenKind::Plus, 2, 1),
///     ]),
///     tokenize("ab+")
/// );
/// ```
pub fn tokenize(pattern: &str) -> Result<Vec<Token>, ParseErr> {
    let input: Vec<(usize, char)> = pattern.char_indices().collect();

    match tokens().parse(&input[..]) {
        Ok(MatchStatus::Match {
            remainder, inner, ..
        }) if remainder.is_empty() => Ok(inner),
        Ok(MatchStatus::NoMatch(remainder)) if remainder.is_empty() => Ok(vec![]),
        Ok(MatchStatus::Match { remainder, .. }) | Ok(MatchStatus::NoMatch(remainder)) => {
            Err(ParseErr::syntax(
                remainder
                    .first()
                    .map_or(pattern.len(), |(offset, _)| *offset),
            ))
        }
        Err(_) => Err(ParseErr::syntax(0)),
    }
}

fn tokens<'a>() -> impl Parser<'a, &'a [(usize, char)], Vec<Token>> {
    parcel::zero_or_more(token())
}

fn token<'a>() -> impl Parser<'a, &'a [(usize, char)], Token> {
    parcel::or(structural(), || literal_run())
}

fn structural<'a>() -> impl Parser<'a, &'a [(usize, char)], Token> {
    move |input: &'a [(usize, char)]| match input.first() {
        Some(&(offset, c)) => match TokenKind::from_structural(c) {
            Some(kind) => Ok(MatchStatus::Match {
                span: offset..offset + 1,
                remainder: &input[1..],
                inner: Token::new(kind, offset, 1),
            }),
            None => Ok(MatchStatus::NoMatch(input)),
        },
        None => Ok(MatchStatus::NoMatch(input)),
    }
}

fn literal_run<'a>() -> impl Parser<'a, &'a [(usize, char)], Token> {
    parcel::one_or_more(literal()).map(|spans: Vec<Range<usize>>| {
        let start = spans.first().map_or(0, |span| span.start);
        let end = spans.last().map_or(start, |span| span.end);

        Token::new(TokenKind::LiteralRun, start, end - start)
    })
}

/// Matches a single literal character, or a backslash and the character it
/// escapes, returning the byte span it covers.
fn literal<'a>() -> impl Parser<'a, &'a [(usize, char)], Range<usize>> {
    move |input: &'a [(usize, char)]| match input {
        [(escape_pos, '\\'), (escaped_pos, escaped), ..] => {
            let span = *escape_pos..*escaped_pos + escaped.len_utf8();
            Ok(MatchStatus::Match {
                span: span.clone(),
                remainder: &input[2..],
                inner: span,
            })
        }
        [(pos, c), ..] if TokenKind::from_structural(*c).is_none() => {
            let span = *pos..*pos + c.len_utf8();
            Ok(MatchStatus::Match {
                span: span.clone(),
                remainder: &input[1..],
                inner: span,
            })
        }
        _ => Ok(MatchStatus::NoMatch(input)),
    }
}
