//! Associates each quantifier token with the atom it applies to, validating
//! group and set structure along the way.
use std::collections::HashSet;

use log::trace;

use crate::lexer::{literals, Token, TokenKind};
use crate::{Config, ParseErr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    ZeroOrOne,
    ZeroOrMore,
    OneOrMore,
    LazyZeroOrMore,
    LazyOneOrMore,
}

impl Quantifier {
    fn from_token_kind(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Opt => Some(Self::ZeroOrOne),
            TokenKind::Star => Some(Self::ZeroOrMore),
            TokenKind::Plus => Some(Self::OneOrMore),
            _ => None,
        }
    }

    /// Returns the lazy form of a greedy repetition, if one exists.
    fn lazy(self) -> Option<Self> {
        match self {
            Self::ZeroOrMore => Some(Self::LazyZeroOrMore),
            Self::OneOrMore => Some(Self::LazyOneOrMore),
            _ => None,
        }
    }
}

/// A quantifier bound to an atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suffix {
    /// The index of the quantifier token.
    pub token: usize,
    pub quantifier: Quantifier,
}

/// Maps an atom's token index (a literal run, a `[` or a `(`) to its suffix.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SuffixMap(Vec<Option<Suffix>>);

impl SuffixMap {
    fn with_len(len: usize) -> Result<Self, ParseErr> {
        let mut suffixes = Vec::new();
        suffixes
            .try_reserve_exact(len)
            .map_err(|_| ParseErr::out_of_memory(0))?;
        suffixes.resize(len, None);

        Ok(Self(suffixes))
    }

    pub fn get(&self, atom: usize) -> Option<&Suffix> {
        self.0.get(atom).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, atom: usize) -> Option<&mut Suffix> {
        self.0.get_mut(atom).and_then(Option::as_mut)
    }

    fn insert(&mut self, atom: usize, suffix: Suffix) {
        if let Some(slot) = self.0.get_mut(atom) {
            *slot = Some(suffix);
        }
    }
}

/// A point that begins a branch of an alternation scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchPoint {
    /// The start of the pattern.
    Pattern,
    /// The first position after the `(` token at the given index.
    Group(usize),
    /// The first position after the `|` at the given pattern offset.
    Bar(usize),
}

/// The outcome of suffix resolution.
#[derive(Debug, Default)]
pub struct Resolution {
    pub suffixes: SuffixMap,
    alternated: HashSet<BranchPoint>,
}

impl Resolution {
    /// Returns true when the branch beginning at `point` is followed by
    /// another `|` in the same scope.
    pub fn is_alternated(&self, point: BranchPoint) -> bool {
        self.alternated.contains(&point)
    }
}

/// Returns the index of the `]` closing the set opened at `open`.
pub(crate) fn set_close(tokens: &[Token], open: usize) -> Option<usize> {
    tokens
        .iter()
        .enumerate()
        .skip(open + 1)
        .find(|(_, token)| token.kind == TokenKind::RBracket)
        .map(|(idx, _)| idx)
}

/// Walks the token stream once, binding every quantifier to the atom it
/// follows.
pub fn resolve(pattern: &str, tokens: &[Token], config: &Config) -> Result<Resolution, ParseErr> {
    let mut suffixes = SuffixMap::with_len(tokens.len())?;
    let mut alternated = HashSet::new();

    // open groups, paired with the branch point they interrupted.
    let mut groups: Vec<(usize, BranchPoint)> = Vec::new();
    let mut branch = BranchPoint::Pattern;

    let mut atom: Option<usize> = None;
    // the atom whose suffix was recorded by the previous token.
    let mut quantified: Option<usize> = None;

    let mut idx = 0;
    while let Some(token) = tokens.get(idx) {
        if token.kind.is_quantifier() {
            let lazy = quantified
                .filter(|_| token.kind == TokenKind::Opt)
                .and_then(|target| {
                    let lazy = suffixes.get(target)?.quantifier.lazy()?;
                    Some((target, lazy))
                });

            if let Some((target, lazy)) = lazy {
                if let Some(suffix) = suffixes.get_mut(target) {
                    suffix.quantifier = lazy;
                }
                quantified = None;
            } else if let Some((target, quantifier)) =
                atom.zip(Quantifier::from_token_kind(token.kind))
            {
                suffixes.insert(
                    target,
                    Suffix {
                        token: idx,
                        quantifier,
                    },
                );
                atom = None;
                quantified = Some(target);
            } else {
                return Err(ParseErr::syntax(token.offset));
            }

            idx += 1;
            continue;
        }

        quantified = None;
        match token.kind {
            TokenKind::LParen => {
                if groups.len() >= config.max_nesting_depth() {
                    return Err(ParseErr::stack_overflow(token.offset));
                }
                groups.push((idx, branch));
                branch = BranchPoint::Group(idx);
                atom = None;
            }
            TokenKind::RParen => {
                let (open, outer) = groups
                    .pop()
                    .ok_or_else(|| ParseErr::syntax(token.offset))?;
                branch = outer;
                atom = Some(open);
            }
            TokenKind::LBracket => {
                let close = set_close(tokens, idx).ok_or_else(|| ParseErr::syntax(token.offset))?;
                if close == idx + 1 {
                    return Err(ParseErr::syntax(token.offset));
                }
                atom = Some(idx);
                idx = close;
            }
            TokenKind::RBracket => return Err(ParseErr::syntax(token.offset)),
            TokenKind::LiteralRun => {
                let mut last_is_bar = false;
                for literal in literals(pattern, token.offset..token.end()) {
                    last_is_bar = literal.is_unescaped('|');
                    if last_is_bar {
                        alternated.insert(branch);
                        branch = BranchPoint::Bar(literal.offset);
                    }
                }
                atom = (!last_is_bar).then_some(idx);
            }
            TokenKind::Opt | TokenKind::Star | TokenKind::Plus => {}
        }

        idx += 1;
    }

    if let Some(&(open, _)) = groups.last() {
        let offset = tokens.get(open).map_or(0, |token| token.offset);
        return Err(ParseErr::syntax(offset));
    }

    trace!("resolved {} alternation scopes", alternated.len());
    Ok(Resolution {
        suffixes,
        alternated,
    })
}
