//! Provides the instruction set and the evaluating virtual machine for
//! compiled patterns.
//!
//! A program is a single contiguous sequence of [Instruction]s terminated by
//! a [Opcode::Match] sentinel. Structural opcodes (groups, alternations and
//! quantifiers) reference other instructions in the same program by
//! [InstIndex], never by address, so a program can be freely moved, shared
//! between threads or serialized.
//!
//! # Example
//!
//! ```rust
//! use tiny_regex_runtime::*;
//!
//! // approximate to `(ab)*`
//! let prog = Instructions::default().with_opcodes(vec![
//!     Opcode::ZeroOrMore(InstRepeat::new(InstIndex::from(1))),
//!     Opcode::Group(InstGroup::new(InstIndex::from(4))),
//!     Opcode::Consume(InstConsume::new('a')),
//!     Opcode::Consume(InstConsume::new('b')),
//!     Opcode::Match,
//! ]);
//!
//! // two full repetitions are consumed, the trailing `a` is not.
//! assert_eq!(Some(4), run(&prog, "ababa", 0));
//!
//! // zero repetitions are a valid match, so a search succeeds immediately.
//! assert_eq!(Some((0, 0, "xab")), search(&prog, "xab"));
//! ```
use log::trace;
use std::fmt::Display;

pub mod bytecode;

/// The default bound on the recursion depth the VM reaches while evaluating a
/// single match attempt. Groups, alternations and quantifiers each descend one
/// level.
pub const DEFAULT_RECURSION_LIMIT: usize = 512;

/// The largest recursion limit the VM honors. Programs carrying a higher
/// limit are evaluated with this one instead, keeping evaluation within the
/// native stack.
pub const MAX_RECURSION_LIMIT: usize = 1024;

/// A compiled, immutable program.
#[derive(Debug, PartialEq)]
pub struct Instructions {
    sets: Vec<CharacterSet>,
    program: Vec<Instruction>,
    recursion_limit: usize,
}

impl Default for Instructions {
    fn default() -> Self {
        Self {
            sets: vec![],
            program: vec![],
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }
}

impl Instructions {
    #[must_use]
    pub fn new(sets: Vec<CharacterSet>, program: Vec<Opcode>) -> Self {
        Self::default().with_sets(sets).with_opcodes(program)
    }

    pub fn with_opcodes(self, program: Vec<Opcode>) -> Self {
        Self {
            program: program
                .into_iter()
                .enumerate()
                .map(|(id, opcode)| Instruction::new(id, opcode))
                .collect(),
            ..self
        }
    }

    pub fn with_sets(self, sets: Vec<CharacterSet>) -> Self {
        Self { sets, ..self }
    }

    /// Bounds the recursion depth the VM will reach before treating an
    /// attempt as failed. Limits above [MAX_RECURSION_LIMIT] are clamped at
    /// evaluation.
    pub fn with_recursion_limit(self, recursion_limit: usize) -> Self {
        Self {
            recursion_limit,
            ..self
        }
    }

    pub fn sets(&self) -> &[CharacterSet] {
        &self.sets
    }

    pub fn recursion_limit(&self) -> usize {
        self.recursion_limit
    }

    pub fn len(&self) -> usize {
        self.program.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Display for Instructions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for inst in self.program.iter() {
            writeln!(f, "{:04}: {}", inst.id, inst.opcode)?
        }

        Ok(())
    }
}

impl AsRef<[Instruction]> for Instructions {
    fn as_ref(&self) -> &[Instruction] {
        &self.program
    }
}

#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct InstIndex(u32);

impl InstIndex {
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for InstIndex {
    fn from(ptr: u32) -> Self {
        Self(ptr)
    }
}

impl TryFrom<usize> for InstIndex {
    type Error = std::num::TryFromIntError;

    fn try_from(ptr: usize) -> Result<Self, Self::Error> {
        u32::try_from(ptr).map(Self)
    }
}

#[derive(Debug, PartialEq)]
pub struct Instruction {
    id: usize,
    opcode: Opcode,
}

impl Instruction {
    #[must_use]
    pub fn new(id: usize, opcode: Opcode) -> Self {
        Self { id, opcode }
    }

    pub fn opcode(&self) -> &Opcode {
        &self.opcode
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}: {}", self.id, self.opcode)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Opcode {
    Any,
    Consume(InstConsume),
    ConsumeSet(InstConsumeSet),
    Begin,
    End,
    ZeroOrOne(InstRepeat),
    ZeroOrMore(InstRepeat),
    OneOrMore(InstRepeat),
    LazyZeroOrMore(InstRepeat),
    LazyOneOrMore(InstRepeat),
    Or(InstOr),
    Group(InstGroup),
    Match,
}

impl Opcode {
    /// Returns true for opcodes that reference other instructions and
    /// therefore nest evaluation.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Opcode::ZeroOrOne(_)
                | Opcode::ZeroOrMore(_)
                | Opcode::OneOrMore(_)
                | Opcode::LazyZeroOrMore(_)
                | Opcode::LazyOneOrMore(_)
                | Opcode::Or(_)
                | Opcode::Group(_)
        )
    }
}

impl Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Opcode::Any => write!(f, "Any"),
            Opcode::Consume(i) => Display::fmt(&i, f),
            Opcode::ConsumeSet(i) => Display::fmt(&i, f),
            Opcode::Begin => write!(f, "Begin"),
            Opcode::End => write!(f, "End"),
            Opcode::ZeroOrOne(i) => write!(f, "ZeroOrOne: {}", i),
            Opcode::ZeroOrMore(i) => write!(f, "ZeroOrMore: {}", i),
            Opcode::OneOrMore(i) => write!(f, "OneOrMore: {}", i),
            Opcode::LazyZeroOrMore(i) => write!(f, "LazyZeroOrMore: {}", i),
            Opcode::LazyOneOrMore(i) => write!(f, "LazyOneOrMore: {}", i),
            Opcode::Or(i) => Display::fmt(&i, f),
            Opcode::Group(i) => Display::fmt(&i, f),
            Opcode::Match => write!(f, "Match"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstConsume {
    pub value: char,
}

impl InstConsume {
    #[must_use]
    pub fn new(value: char) -> Self {
        Self { value }
    }
}

impl Display for InstConsume {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Consume: {:?}", self.value)
    }
}

/// Represents an explicitly enumerated set of characters, i.e. `[xyz]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterSet {
    members: Vec<char>,
}

impl CharacterSet {
    pub fn new(members: Vec<char>) -> Self {
        Self { members }
    }

    pub fn members(&self) -> &[char] {
        &self.members
    }

    pub fn in_set(&self, value: char) -> bool {
        self.members.contains(&value)
    }
}

impl From<&str> for CharacterSet {
    fn from(src: &str) -> Self {
        Self::new(src.chars().collect())
    }
}

/// ConsumeSet matches a single character that is a member of the program's
/// set at `idx`.
#[derive(Debug, Clone, PartialEq)]
pub struct InstConsumeSet {
    pub idx: usize,
}

impl InstConsumeSet {
    pub fn new(idx: usize) -> Self {
        Self::member_of(idx)
    }

    pub fn member_of(idx: usize) -> Self {
        Self { idx }
    }
}

impl Display for InstConsumeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ConsumeSet: {{{:04}}}", self.idx)
    }
}

/// The operand shared by every quantifier opcode. `body` is the first
/// instruction of the quantified unit. Any instructions between the
/// quantifier and its body form a lead that is matched exactly once before
/// the repetition begins.
#[derive(Debug, Clone, PartialEq)]
pub struct InstRepeat {
    pub body: InstIndex,
}

impl InstRepeat {
    #[must_use]
    pub fn new(body: InstIndex) -> Self {
        Self { body }
    }
}

impl Display for InstRepeat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:04})", self.body.as_u32())
    }
}

/// Splits evaluation into a left branch running from the following
/// instruction up to `alternate`, and a right branch running from
/// `alternate` to the end of the enclosing group or program.
#[derive(Debug, Clone, PartialEq)]
pub struct InstOr {
    pub alternate: InstIndex,
}

impl InstOr {
    #[must_use]
    pub fn new(alternate: InstIndex) -> Self {
        Self { alternate }
    }
}

impl Display for InstOr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Or: ({:04})", self.alternate.as_u32())
    }
}

/// Treats the instructions from the following one up to (not including)
/// `end` as a single unit.
#[derive(Debug, Clone, PartialEq)]
pub struct InstGroup {
    pub end: InstIndex,
}

impl InstGroup {
    #[must_use]
    pub fn new(end: InstIndex) -> Self {
        Self { end }
    }
}

impl Display for InstGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Group: ({:04})", self.end.as_u32())
    }
}

/// What remains to be matched once the current scope of instructions is
/// satisfied.
#[derive(Debug, Clone, Copy)]
enum Continuation<'c> {
    /// Nothing follows, the current position is the result.
    Halt,
    /// Resume at `pc` in a scope ending at `end`, then continue with `next`.
    Resume {
        pc: usize,
        end: usize,
        next: &'c Continuation<'c>,
    },
}

struct Evaluator<'p, 's> {
    sets: &'p [CharacterSet],
    program: &'p [Instruction],
    input: &'s str,
    /// The offset the top-level attempt began at, used by `Begin`.
    origin: usize,
    recursion_limit: usize,
}

impl<'p, 's> Evaluator<'p, 's> {
    fn new(program: &'p Instructions, input: &'s str, origin: usize) -> Self {
        Self {
            sets: &program.sets,
            program: program.as_ref(),
            input,
            origin,
            recursion_limit: program.recursion_limit.min(MAX_RECURSION_LIMIT),
        }
    }

    fn opcode(&self, pc: usize) -> Option<&'p Opcode> {
        self.program.get(pc).map(|inst| &inst.opcode)
    }

    fn get_at(&self, sp: usize) -> Option<char> {
        self.input.get(sp..).and_then(|rest| rest.chars().next())
    }

    /// Evaluates a single non-branching instruction, returning the advanced
    /// input position.
    fn step(&self, opcode: &Opcode, sp: usize) -> Option<usize> {
        match opcode {
            Opcode::Consume(InstConsume { value }) => self
                .get_at(sp)
                .filter(|c| c == value)
                .map(|c| sp + c.len_utf8()),
            Opcode::Any => self
                .get_at(sp)
                .filter(|c| *c != '\n')
                .map(|c| sp + c.len_utf8()),
            Opcode::ConsumeSet(InstConsumeSet { idx }) => {
                let set = self.sets.get(*idx)?;
                self.get_at(sp)
                    .filter(|c| set.in_set(*c))
                    .map(|c| sp + c.len_utf8())
            }
            Opcode::Begin => (sp == self.origin).then_some(sp),
            Opcode::End => (sp == self.input.len()).then_some(sp),
            _ => None,
        }
    }

    /// Returns one past the last instruction of the unit starting at `body`.
    fn unit_end(&self, body: usize) -> Option<usize> {
        match self.opcode(body)? {
            Opcode::Group(InstGroup { end }) if end.as_usize() > body => Some(end.as_usize()),
            Opcode::Consume(_)
            | Opcode::Any
            | Opcode::ConsumeSet(_)
            | Opcode::Begin
            | Opcode::End => Some(body + 1),
            _ => None,
        }
    }

    fn resume(&self, cont: &Continuation<'_>, sp: usize, depth: usize) -> Option<usize> {
        match *cont {
            Continuation::Halt => Some(sp),
            Continuation::Resume { pc, end, next } => self.evaluate(pc, end, sp, next, depth),
        }
    }

    /// Matches a single quantified unit in isolation.
    fn unit(&self, body: usize, unit_end: usize, sp: usize, depth: usize) -> Option<usize> {
        self.evaluate(body, unit_end, sp, &Continuation::Halt, depth + 1)
    }

    /// Consumes as many repetitions of a unit as will match, stopping at the
    /// first failed or zero-width repetition.
    fn greedy(&self, body: usize, unit_end: usize, mut sp: usize, depth: usize) -> usize {
        while let Some(next) = self.unit(body, unit_end, sp, depth) {
            if next == sp {
                break;
            }
            sp = next;
        }

        sp
    }

    /// Tries the continuation before each further repetition of the unit.
    fn lazy(
        &self,
        (body, unit_end): (usize, usize),
        end: usize,
        mut sp: usize,
        cont: &Continuation<'_>,
        depth: usize,
    ) -> Option<usize> {
        loop {
            if let Some(matched) = self.evaluate(unit_end, end, sp, cont, depth + 1) {
                return Some(matched);
            }

            match self.unit(body, unit_end, sp, depth) {
                Some(next) if next > sp => sp = next,
                _ => return None,
            }
        }
    }

    /// Evaluates the instructions in `pc..end` from input position `sp`,
    /// followed by `cont`. Returns the input position at which the whole
    /// continuation was satisfied.
    fn evaluate(
        &self,
        mut pc: usize,
        end: usize,
        mut sp: usize,
        cont: &Continuation<'_>,
        depth: usize,
    ) -> Option<usize> {
        if depth > self.recursion_limit {
            return None;
        }

        while pc < end {
            let opcode = self.opcode(pc)?;

            match opcode {
                Opcode::Match => return self.resume(cont, sp, depth),

                Opcode::Group(InstGroup { end: group_end }) => {
                    let group_end = group_end.as_usize();
                    if group_end <= pc || group_end > end {
                        return None;
                    }

                    let after = Continuation::Resume {
                        pc: group_end,
                        end,
                        next: cont,
                    };
                    return self.evaluate(pc + 1, group_end, sp, &after, depth + 1);
                }

                Opcode::Or(InstOr { alternate }) => {
                    let alternate = alternate.as_usize();
                    if alternate <= pc || alternate > end {
                        return None;
                    }

                    return self
                        .evaluate(pc + 1, alternate, sp, cont, depth + 1)
                        .or_else(|| self.evaluate(alternate, end, sp, cont, depth + 1));
                }

                Opcode::ZeroOrOne(InstRepeat { body })
                | Opcode::ZeroOrMore(InstRepeat { body })
                | Opcode::OneOrMore(InstRepeat { body })
                | Opcode::LazyZeroOrMore(InstRepeat { body })
                | Opcode::LazyOneOrMore(InstRepeat { body }) => {
                    let body = body.as_usize();
                    if body <= pc {
                        return None;
                    }
                    let unit_end = self.unit_end(body).filter(|unit_end| *unit_end <= end)?;

                    for lead in (pc + 1)..body {
                        sp = self.step(self.opcode(lead)?, sp)?;
                    }

                    sp = match opcode {
                        Opcode::ZeroOrOne(_) => self.unit(body, unit_end, sp, depth).unwrap_or(sp),
                        Opcode::ZeroOrMore(_) => self.greedy(body, unit_end, sp, depth),
                        Opcode::OneOrMore(_) => {
                            let first = self.unit(body, unit_end, sp, depth)?;
                            self.greedy(body, unit_end, first, depth)
                        }
                        Opcode::LazyZeroOrMore(_) => {
                            return self.lazy((body, unit_end), end, sp, cont, depth)
                        }
                        _ => {
                            let first = self.unit(body, unit_end, sp, depth)?;
                            return self.lazy((body, unit_end), end, first, cont, depth);
                        }
                    };
                    pc = unit_end;
                }

                simple => {
                    sp = self.step(simple, sp)?;
                    pc += 1;
                }
            }
        }

        self.resume(cont, sp, depth)
    }
}

/// Executes a given program against an input, anchored at `start`. On a
/// match, the number of bytes consumed from `start` is returned.
///
/// # Example
///
/// ```
/// use tiny_regex_runtime::*;
///
/// // approximate to `ac?$`
/// let prog = Instructions::default().with_opcodes(vec![
///     Opcode::Consume(InstConsume::new('a')),
///     Opcode::ZeroOrOne(InstRepeat::new(InstIndex::from(2))),
///     Opcode::Consume(InstConsume::new('c')),
///     Opcode::End,
///     Opcode::Match,
/// ]);
///
/// assert_eq!(Some(2), run(&prog, "ac", 0));
/// assert_eq!(Some(1), run(&prog, "a", 0));
/// assert_eq!(None, run(&prog, "acc", 0));
/// ```
pub fn run(program: &Instructions, input: &str, start: usize) -> Option<usize> {
    if !input.is_char_boundary(start) {
        return None;
    }

    Evaluator::new(program, input, start)
        .evaluate(0, program.len(), start, &Continuation::Halt, 0)
        .and_then(|end| end.checked_sub(start))
}

/// Scans the input for the first offset at which `program` matches,
/// returning that offset, the match length and the remainder of the input
/// following the match.
///
/// # Example
///
/// ```
/// use tiny_regex_runtime::*;
///
/// let prog = Instructions::default().with_opcodes(vec![
///     Opcode::Consume(InstConsume::new('a')),
///     Opcode::Match,
/// ]);
///
/// assert_eq!(Some((1, 1, "bc")), search(&prog, "babc"));
/// assert_eq!(None, search(&prog, "b"));
/// ```
pub fn search<'a>(program: &Instructions, input: &'a str) -> Option<(usize, usize, &'a str)> {
    (0..=input.len())
        .filter(|offset| input.is_char_boundary(*offset))
        .find_map(|offset| {
            let len = run(program, input, offset)?;
            trace!("matched {} bytes at offset {}", len, offset);

            input
                .get(offset + len..)
                .map(|remainder| (offset, len, remainder))
        })
}
