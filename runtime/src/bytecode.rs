//! Provides utilities for deserializing a binary representation of the
//! bytecode.
//!
//! All values are little-endian. A program is laid out as a 16-byte header,
//! followed by each character set and finally each instruction.
//!
//! | field             | width |
//! |-------------------|-------|
//! | magic number      | u16   |
//! | version           | u16   |
//! | set count         | u32   |
//! | instruction count | u32   |
//! | recursion limit   | u32   |
//!
//! A set is a u32 member count followed by a u32 codepoint per member. An
//! instruction is a u32 opcode variant followed by a u32 operand.
use thiserror::Error;

use crate::*;

/// Leading bytes of every encoded program.
pub const MAGIC_NUMBER: u16 = 0xF0F0;
/// The revision of the layout described above.
pub const VERSION: u16 = 1;
pub const HEADER_LEN: usize = 16;
pub const INSTRUCTION_LEN: usize = 8;

/// Attempts to convert a binary representation of the instruction set into its
/// corresponding internal representation.
///
/// # Example
/// ```
/// use tiny_regex_runtime::{Opcode, Instructions, bytecode};
///
/// let bin = vec![
///     240, 240, 1, 0, 0, 0, 0, 0, 2, 0, 0, 0, 0, 2, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 13, 0,
///     0, 0, 0, 0, 0, 0,
/// ];
/// let expected_output = Instructions::new(vec![], vec![Opcode::Any, Opcode::Match]);
/// let decoded_program = bytecode::from_binary(bin);
///
/// assert_eq!(
///     Ok(expected_output),
///     decoded_program
/// );
/// ```
pub fn from_binary<B: AsRef<[u8]>>(bin: B) -> Result<Instructions, BytecodeDeserializationError> {
    Instructions::from_bytecode(bin)
}

/// Represents all error types that may _expectedly_ occur during
/// deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BytecodeDeserializationErrorKind {
    /// The magic number doesn't match.
    #[error("invalid header")]
    InvalidHeader,
    #[error("unsupported bytecode version")]
    UnsupportedVersion,
    /// The input ends before the header, a set or an instruction is complete.
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    /// Represents fallibility of character conversions from a u32 -> char.
    #[error("unable to encode value as character")]
    CharacterEncodingError,
    #[error("unable to convert value to ptr sized value")]
    IntegerConversionToUsize,
    /// Represents a deserialization error for an undefined opcode.
    #[error("unknown opcode")]
    InvalidOpcode,
    /// A valid opcode has been provided but with an operand referencing a
    /// set or instruction outside the program.
    #[error("invalid operand")]
    InvalidOperand,
    #[error("trailing bytes after the last instruction")]
    TrailingBytes,
    /// The program does not end in exactly one `Match` instruction.
    #[error("program is not terminated by a single match")]
    MissingSentinel,
    /// The encoded recursion limit is above [crate::MAX_RECURSION_LIMIT].
    #[error("recursion limit exceeds the supported maximum")]
    RecursionLimitExceeded,
}

/// Represents all error types that may _expectedly_ occur during
/// deserialization. Including the error kind and any optional
/// enriching data.
#[derive(Debug, PartialEq, Eq, Error)]
#[error("{kind}{}", .data.as_ref().map(|data| format!(": {}", data)).unwrap_or_default())]
pub struct BytecodeDeserializationError {
    /// The type of triggered error.
    kind: BytecodeDeserializationErrorKind,
    /// Additional error data.
    data: Option<String>,
}

impl BytecodeDeserializationError {
    /// Instantiates a new error.
    pub fn new(kind: BytecodeDeserializationErrorKind) -> Self {
        Self { kind, data: None }
    }

    /// Associates additional data with the error, returning the modified error.
    pub fn with_data(mut self, data: String) -> Self {
        self.data = Some(data);
        self
    }

    pub fn kind(&self) -> BytecodeDeserializationErrorKind {
        self.kind
    }
}

impl From<BytecodeDeserializationErrorKind> for BytecodeDeserializationError {
    fn from(kind: BytecodeDeserializationErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Represents a conversion trait from a given opcodes binary little-endian
/// representation into it's intermediary state.
pub trait FromBytecode<B: AsRef<[u8]>> {
    // The output type of a successful match.
    type Output;
    // An alternate error type.
    type Error;

    fn from_bytecode(bin: B) -> Result<Self::Output, Self::Error>;
}

/// The numeric tag identifying each opcode in its binary form.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpcodeVariant {
    Any = 1,
    Consume,
    ConsumeSet,
    Begin,
    End,
    ZeroOrOne,
    ZeroOrMore,
    OneOrMore,
    LazyZeroOrMore,
    LazyOneOrMore,
    Or,
    Group,
    Match,
}

impl OpcodeVariant {
    pub fn of(opcode: &Opcode) -> Self {
        match opcode {
            Opcode::Any => Self::Any,
            Opcode::Consume(_) => Self::Consume,
            Opcode::ConsumeSet(_) => Self::ConsumeSet,
            Opcode::Begin => Self::Begin,
            Opcode::End => Self::End,
            Opcode::ZeroOrOne(_) => Self::ZeroOrOne,
            Opcode::ZeroOrMore(_) => Self::ZeroOrMore,
            Opcode::OneOrMore(_) => Self::OneOrMore,
            Opcode::LazyZeroOrMore(_) => Self::LazyZeroOrMore,
            Opcode::LazyOneOrMore(_) => Self::LazyOneOrMore,
            Opcode::Or(_) => Self::Or,
            Opcode::Group(_) => Self::Group,
            Opcode::Match => Self::Match,
        }
    }
}

impl TryFrom<u32> for OpcodeVariant {
    type Error = BytecodeDeserializationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        let variant = match value {
            1 => Self::Any,
            2 => Self::Consume,
            3 => Self::ConsumeSet,
            4 => Self::Begin,
            5 => Self::End,
            6 => Self::ZeroOrOne,
            7 => Self::ZeroOrMore,
            8 => Self::OneOrMore,
            9 => Self::LazyZeroOrMore,
            10 => Self::LazyOneOrMore,
            11 => Self::Or,
            12 => Self::Group,
            13 => Self::Match,
            _ => {
                return Err(
                    BytecodeDeserializationError::new(BytecodeDeserializationErrorKind::InvalidOpcode)
                        .with_data(value.to_string()),
                )
            }
        };

        Ok(variant)
    }
}

/// A cursor over the encoded program.
struct Reader<'a> {
    bytes: &'a [u8],
    cursor: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, cursor: 0 }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], BytecodeDeserializationError> {
        let chunk: [u8; N] = self
            .bytes
            .get(self.cursor..self.cursor + N)
            .and_then(|chunk| chunk.try_into().ok())
            .ok_or(BytecodeDeserializationErrorKind::UnexpectedEndOfInput)?;
        self.cursor += N;

        Ok(chunk)
    }

    fn u16(&mut self) -> Result<u16, BytecodeDeserializationError> {
        self.take().map(u16::from_le_bytes)
    }

    fn u32(&mut self) -> Result<u32, BytecodeDeserializationError> {
        self.take().map(u32::from_le_bytes)
    }

    fn usize(&mut self) -> Result<usize, BytecodeDeserializationError> {
        let val = self.u32()?;
        usize::try_from(val).map_err(|_| {
            BytecodeDeserializationError::new(
                BytecodeDeserializationErrorKind::IntegerConversionToUsize,
            )
            .with_data(val.to_string())
        })
    }

    fn char(&mut self) -> Result<char, BytecodeDeserializationError> {
        let val = self.u32()?;
        char::from_u32(val).ok_or_else(|| {
            BytecodeDeserializationError::new(
                BytecodeDeserializationErrorKind::CharacterEncodingError,
            )
            .with_data(val.to_string())
        })
    }

    fn set(&mut self) -> Result<CharacterSet, BytecodeDeserializationError> {
        let member_cnt = self.usize()?;
        let members = (0..member_cnt)
            .map(|_| self.char())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CharacterSet::new(members))
    }

    fn opcode(
        &mut self,
        set_cnt: usize,
        inst_cnt: usize,
    ) -> Result<Opcode, BytecodeDeserializationError> {
        let inst_bytes = self.take::<INSTRUCTION_LEN>()?;
        let mut fields = Reader::new(&inst_bytes);
        let variant = OpcodeVariant::try_from(fields.u32()?)?;
        let operand = fields.u32()?;

        let invalid_operand = || {
            BytecodeDeserializationError::new(BytecodeDeserializationErrorKind::InvalidOperand)
                .with_data(operand.to_string())
        };
        // an index one past the last instruction is a valid group or
        // alternation end.
        let index = || {
            usize::try_from(operand)
                .ok()
                .filter(|idx| *idx <= inst_cnt)
                .map(|_| InstIndex::from(operand))
                .ok_or_else(invalid_operand)
        };

        let opcode = match variant {
            OpcodeVariant::Any => Opcode::Any,
            OpcodeVariant::Consume => {
                let value = char::from_u32(operand).ok_or_else(|| {
                    BytecodeDeserializationError::new(
                        BytecodeDeserializationErrorKind::CharacterEncodingError,
                    )
                    .with_data(operand.to_string())
                })?;
                Opcode::Consume(InstConsume::new(value))
            }
            OpcodeVariant::ConsumeSet => {
                let idx = usize::try_from(operand)
                    .ok()
                    .filter(|idx| *idx < set_cnt)
                    .ok_or_else(invalid_operand)?;
                Opcode::ConsumeSet(InstConsumeSet::new(idx))
            }
            OpcodeVariant::Begin => Opcode::Begin,
            OpcodeVariant::End => Opcode::End,
            OpcodeVariant::ZeroOrOne => Opcode::ZeroOrOne(InstRepeat::new(index()?)),
            OpcodeVariant::ZeroOrMore => Opcode::ZeroOrMore(InstRepeat::new(index()?)),
            OpcodeVariant::OneOrMore => Opcode::OneOrMore(InstRepeat::new(index()?)),
            OpcodeVariant::LazyZeroOrMore => Opcode::LazyZeroOrMore(InstRepeat::new(index()?)),
            OpcodeVariant::LazyOneOrMore => Opcode::LazyOneOrMore(InstRepeat::new(index()?)),
            OpcodeVariant::Or => Opcode::Or(InstOr::new(index()?)),
            OpcodeVariant::Group => Opcode::Group(InstGroup::new(index()?)),
            OpcodeVariant::Match => Opcode::Match,
        };

        Ok(opcode)
    }

    fn is_exhausted(&self) -> bool {
        self.cursor == self.bytes.len()
    }
}

impl<B: AsRef<[u8]>> FromBytecode<B> for Instructions {
    type Output = Self;

    type Error = BytecodeDeserializationError;

    fn from_bytecode(bin: B) -> Result<Self::Output, Self::Error> {
        let mut reader = Reader::new(bin.as_ref());
        let header_bytes = reader.take::<HEADER_LEN>()?;
        let mut header = Reader::new(&header_bytes);

        if header.u16()? != MAGIC_NUMBER {
            return Err(BytecodeDeserializationErrorKind::InvalidHeader.into());
        }

        let version = header.u16()?;
        if version != VERSION {
            return Err(
                BytecodeDeserializationError::new(
                    BytecodeDeserializationErrorKind::UnsupportedVersion,
                )
                .with_data(version.to_string()),
            );
        }

        let set_cnt = header.usize()?;
        let inst_cnt = header.usize()?;
        let recursion_limit = header.usize()?;
        if recursion_limit > MAX_RECURSION_LIMIT {
            return Err(BytecodeDeserializationError::new(
                BytecodeDeserializationErrorKind::RecursionLimitExceeded,
            )
            .with_data(recursion_limit.to_string()));
        }

        let sets = (0..set_cnt)
            .map(|_| reader.set())
            .collect::<Result<Vec<_>, _>>()?;
        let insts = (0..inst_cnt)
            .map(|_| reader.opcode(set_cnt, inst_cnt))
            .collect::<Result<Vec<_>, _>>()?;

        if !reader.is_exhausted() {
            return Err(BytecodeDeserializationErrorKind::TrailingBytes.into());
        }

        let sentinels = insts
            .iter()
            .filter(|opcode| matches!(opcode, Opcode::Match))
            .count();
        if sentinels != 1 || !matches!(insts.last(), Some(Opcode::Match)) {
            return Err(BytecodeDeserializationErrorKind::MissingSentinel.into());
        }

        Ok(Instructions::new(sets, insts).with_recursion_limit(recursion_limit))
    }
}
