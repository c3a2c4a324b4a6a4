//! Lowers a resolved token stream into a runtime program.
//!
//! Emission is a single forward pass. Groups and alternations are emitted as
//! placeholders ahead of their contents and patched once the end of their
//! scope is known, and quantifiers are placed ahead of the atom they repeat.
//!
//! # Example
//!
//! ```
//! use tiny_regex_compiler::compile;
//! use tiny_regex_runtime::*;
//!
//! assert_eq!(
//!     Ok(Instructions::default().with_opcodes(vec![
//!         Opcode::OneOrMore(InstRepeat::new(InstIndex::from(2))),
//!         Opcode::Consume(InstConsume::new('a')),
//!         Opcode::Consume(InstConsume::new('b')),
//!         Opcode::Match,
//!     ])),
//!     compile("ab+")
//! );
//! ```
use log::debug;
use tiny_regex_runtime::*;

use crate::lexer::{literals, tokenize, Literal, Token, TokenKind};
use crate::suffix::{resolve, set_close, BranchPoint, Quantifier, Resolution};
use crate::{Config, ParseErr};

/// Compiles a pattern with the default [Config].
pub fn compile(pattern: &str) -> Result<Instructions, ParseErr> {
    compile_with_config(pattern, &Config::default())
}

/// Compiles a pattern, enforcing the nesting and recursion limits of the
/// supplied [Config].
pub fn compile_with_config(pattern: &str, config: &Config) -> Result<Instructions, ParseErr> {
    debug!("compiling with flags {:#x}", config.flags().bits());
    let tokens = tokenize(pattern)?;
    debug!("tokenized pattern into {} tokens", tokens.len());

    let resolution = resolve(pattern, &tokens, config)?;

    let mut emitter = Emitter::new(pattern, &tokens, &resolution, config)?;
    emitter.open_scope(BranchPoint::Pattern)?;

    let mut idx = 0;
    while let Some(token) = tokens.get(idx) {
        match token.kind {
            TokenKind::LiteralRun => emitter.literal_run(idx, token)?,
            TokenKind::LParen => emitter.open_group(idx, token)?,
            TokenKind::RParen => emitter.close_group(token)?,
            TokenKind::LBracket => {
                let close = set_close(&tokens, idx).ok_or_else(|| ParseErr::syntax(token.offset))?;
                let close_offset = tokens.get(close).map_or(pattern.len(), |close| close.offset);

                emitter.set(idx, token, close_offset)?;
                idx = close;
            }
            // quantifiers are emitted alongside the atom they are bound to.
            TokenKind::RBracket | TokenKind::Opt | TokenKind::Star | TokenKind::Plus => {}
        }

        idx += 1;
    }

    let program = emitter.finish()?;
    debug!("compiled program:\n{}", program);

    Ok(program)
}

fn quantifier_opcode(quantifier: Quantifier, body: InstIndex) -> Opcode {
    let repeat = InstRepeat::new(body);

    match quantifier {
        Quantifier::ZeroOrOne => Opcode::ZeroOrOne(repeat),
        Quantifier::ZeroOrMore => Opcode::ZeroOrMore(repeat),
        Quantifier::OneOrMore => Opcode::OneOrMore(repeat),
        Quantifier::LazyZeroOrMore => Opcode::LazyZeroOrMore(repeat),
        Quantifier::LazyOneOrMore => Opcode::LazyOneOrMore(repeat),
    }
}

/// Placeholder operand for instructions patched once their scope closes.
fn unpatched() -> InstIndex {
    InstIndex::from(0)
}

struct Emitter<'a> {
    pattern: &'a str,
    tokens: &'a [Token],
    resolution: &'a Resolution,
    max_depth: usize,

    ops: Vec<Opcode>,
    sets: Vec<CharacterSet>,
    /// VM recursion depth accumulated by the instructions emitted so far.
    depth: usize,
    /// The `Or` in the current scope awaiting its alternate.
    pending_or: Option<usize>,
    /// Open groups, paired with the enclosing scope's pending `Or`.
    scopes: Vec<(usize, Option<usize>)>,
}

impl<'a> Emitter<'a> {
    fn new(
        pattern: &'a str,
        tokens: &'a [Token],
        resolution: &'a Resolution,
        config: &Config,
    ) -> Result<Self, ParseErr> {
        let mut ops = Vec::new();
        ops.try_reserve_exact(pattern.len() + 1)
            .map_err(|_| ParseErr::out_of_memory(0))?;

        Ok(Self {
            pattern,
            tokens,
            resolution,
            max_depth: config.max_recursion_depth().min(MAX_RECURSION_LIMIT),
            ops,
            sets: vec![],
            depth: 0,
            pending_or: None,
            scopes: vec![],
        })
    }

    fn index(&self, idx: usize, offset: usize) -> Result<InstIndex, ParseErr> {
        InstIndex::try_from(idx).map_err(|_| ParseErr::out_of_memory(offset))
    }

    /// Charges the recursion an instruction adds to the VM. Groups,
    /// alternations and lazy repetitions hold their depth for the rest of the
    /// match, as does a greedy repetition of a group. A greedy repetition of
    /// a single instruction only needs one level while its unit runs.
    fn charge(
        &mut self,
        opcode: &Opcode,
        over_group: bool,
        offset: usize,
    ) -> Result<(), ParseErr> {
        let transient = match opcode {
            Opcode::ZeroOrOne(_) | Opcode::ZeroOrMore(_) | Opcode::OneOrMore(_)
                if !over_group =>
            {
                1
            }
            structural if structural.is_structural() => {
                self.depth += 1;
                0
            }
            _ => 0,
        };

        if self.depth + transient > self.max_depth {
            return Err(ParseErr::stack_overflow(offset));
        }

        Ok(())
    }

    fn push(&mut self, opcode: Opcode, offset: usize) -> Result<usize, ParseErr> {
        self.emit(opcode, false, offset)
    }

    fn emit(&mut self, opcode: Opcode, over_group: bool, offset: usize) -> Result<usize, ParseErr> {
        debug_assert!(self.ops.len() <= self.pattern.len());
        self.charge(&opcode, over_group, offset)?;

        let idx = self.ops.len();
        self.ops.push(opcode);
        Ok(idx)
    }

    fn insert(&mut self, at: usize, opcode: Opcode, offset: usize) -> Result<(), ParseErr> {
        debug_assert!(self.ops.len() <= self.pattern.len());
        self.charge(&opcode, false, offset)?;

        self.ops.insert(at, opcode);
        Ok(())
    }

    fn patch(&mut self, at: usize, opcode: Opcode) {
        if let Some(slot) = self.ops.get_mut(at) {
            *slot = opcode;
        }
    }

    /// Emits the quantifier bound to the atom at token `atom` ahead of an
    /// atom about to be pushed.
    fn quantify_next(
        &mut self,
        atom: usize,
        over_group: bool,
        offset: usize,
    ) -> Result<(), ParseErr> {
        if let Some(suffix) = self.resolution.suffixes.get(atom).copied() {
            let body = self.index(self.ops.len() + 1, offset)?;
            let offset = self.token_offset(suffix.token);
            self.emit(quantifier_opcode(suffix.quantifier, body), over_group, offset)?;
        }

        Ok(())
    }

    fn token_offset(&self, token: usize) -> usize {
        self.tokens.get(token).map_or(0, |token| token.offset)
    }

    fn open_scope(&mut self, point: BranchPoint) -> Result<(), ParseErr> {
        if self.resolution.is_alternated(point) {
            let offset = match point {
                BranchPoint::Group(token) => self.token_offset(token),
                BranchPoint::Bar(offset) => offset,
                BranchPoint::Pattern => 0,
            };
            let or = self.push(Opcode::Or(InstOr::new(unpatched())), offset)?;
            self.pending_or = Some(or);
        }

        Ok(())
    }

    /// Closes the current branch at an `|` and opens the next.
    fn alternate(&mut self, offset: usize) -> Result<(), ParseErr> {
        let alternate = self.index(self.ops.len(), offset)?;
        if let Some(or) = self.pending_or.take() {
            self.patch(or, Opcode::Or(InstOr::new(alternate)));
        }

        self.open_scope(BranchPoint::Bar(offset))
    }

    fn literal_run(&mut self, idx: usize, token: &Token) -> Result<(), ParseErr> {
        // the first instruction following the run's last `|`.
        let mut segment = self.ops.len();

        for literal in literals(self.pattern, token.offset..token.end()) {
            let opcode = match literal {
                Literal {
                    escaped: true,
                    value,
                    ..
                } => Opcode::Consume(InstConsume::new(value)),
                Literal { value: '.', .. } => Opcode::Any,
                Literal { value: '^', .. } => Opcode::Begin,
                Literal { value: '$', .. } => Opcode::End,
                Literal {
                    value: '|', offset, ..
                } => {
                    self.alternate(offset)?;
                    segment = self.ops.len();
                    continue;
                }
                Literal {
                    value: '\\',
                    offset,
                    ..
                } => return Err(ParseErr::syntax(offset)),
                Literal { value, .. } => Opcode::Consume(InstConsume::new(value)),
            };

            self.push(opcode, literal.offset)?;
        }

        if let Some(suffix) = self.resolution.suffixes.get(idx).copied() {
            let offset = self.token_offset(suffix.token);
            let body = self.index(self.ops.len(), offset)?;
            self.insert(segment, quantifier_opcode(suffix.quantifier, body), offset)?;
        }

        Ok(())
    }

    fn open_group(&mut self, idx: usize, token: &Token) -> Result<(), ParseErr> {
        self.quantify_next(idx, true, token.offset)?;

        let group = self.push(Opcode::Group(InstGroup::new(unpatched())), token.offset)?;
        self.scopes.push((group, self.pending_or.take()));

        self.open_scope(BranchPoint::Group(idx))
    }

    fn close_group(&mut self, token: &Token) -> Result<(), ParseErr> {
        let (group, outer_or) = self
            .scopes
            .pop()
            .ok_or_else(|| ParseErr::syntax(token.offset))?;

        let end = self.index(self.ops.len(), token.offset)?;
        self.patch(group, Opcode::Group(InstGroup::new(end)));
        self.pending_or = outer_or;

        Ok(())
    }

    fn set(&mut self, idx: usize, token: &Token, close: usize) -> Result<(), ParseErr> {
        let mut members: Vec<char> = vec![];
        for Literal { value, .. } in literals(self.pattern, token.end()..close) {
            if !members.contains(&value) {
                members.push(value);
            }
        }
        let set = CharacterSet::new(members);

        let set_idx = match self.sets.iter().position(|existing| *existing == set) {
            Some(set_idx) => set_idx,
            None => {
                self.sets.push(set);
                self.sets.len() - 1
            }
        };

        self.quantify_next(idx, false, token.offset)?;
        self.push(
            Opcode::ConsumeSet(InstConsumeSet::member_of(set_idx)),
            token.offset,
        )?;

        Ok(())
    }

    fn finish(mut self) -> Result<Instructions, ParseErr> {
        self.push(Opcode::Match, self.pattern.len())?;

        Ok(Instructions::new(self.sets, self.ops).with_recursion_limit(self.max_depth))
    }
}
