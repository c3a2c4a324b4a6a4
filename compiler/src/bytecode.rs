//! Provides the traits and functions for converting a runtime program to its
//! corresponding binary representation.
use thiserror::Error;
use tiny_regex_runtime::bytecode::{OpcodeVariant, MAGIC_NUMBER, VERSION};
use tiny_regex_runtime::*;

/// Converts a compiled program into the binary layout understood by
/// [tiny_regex_runtime::bytecode::from_binary].
///
/// # Example
///
/// ```
/// use tiny_regex_compiler::to_binary;
/// use tiny_regex_runtime::{Instructions, Opcode};
///
/// let input = Instructions::new(vec![], vec![Opcode::Any, Opcode::Match]);
/// let expected_output = vec![
///     240, 240, 1, 0, 0, 0, 0, 0, 2, 0, 0, 0, 0, 2, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 13, 0,
///     0, 0, 0, 0, 0, 0,
/// ];
///
/// assert_eq!(Ok(expected_output), to_binary(&input));
/// ```
pub fn to_binary(insts: &Instructions) -> Result<Vec<u8>, BytecodeSerializationError> {
    insts.to_bytecode()
}

/// A program that cannot be represented in the binary layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BytecodeSerializationError {
    /// A count, index or limit does not fit in 32 bits.
    #[error("{0} overflows a 32-bit integer")]
    IntegerOverflow(&'static str),
}

fn as_u32(value: usize, field: &'static str) -> Result<u32, BytecodeSerializationError> {
    u32::try_from(value).map_err(|_| BytecodeSerializationError::IntegerOverflow(field))
}

/// Merges two arrays. `M` must be exactly twice `N`, a shorter output panics
/// and a longer one is left zero-padded.
fn merge_arrays<const N: usize, const M: usize>(first: [u8; N], second: [u8; N]) -> [u8; M] {
    let mut output_arr = [0; M];

    for (idx, val) in first.into_iter().chain(second).enumerate() {
        output_arr[idx] = val;
    }

    output_arr
}

/// Represents a conversion trait to a given type's binary little-endian
/// representation.
pub trait ToBytecode {
    // the bytecode representable type.
    type Output;

    fn to_bytecode(&self) -> Self::Output;
}

impl ToBytecode for Instructions {
    type Output = Result<Vec<u8>, BytecodeSerializationError>;

    fn to_bytecode(&self) -> Self::Output {
        let set_cnt = as_u32(self.sets().len(), "set count")?;
        let inst_cnt = as_u32(self.len(), "instruction count")?;
        let recursion_limit = as_u32(self.recursion_limit(), "recursion limit")?;

        let lower_32_bits: [u8; 4] = merge_arrays(MAGIC_NUMBER.to_le_bytes(), VERSION.to_le_bytes());
        let lower_64_bits: [u8; 8] = merge_arrays(lower_32_bits, set_cnt.to_le_bytes());
        let upper_64_bits: [u8; 8] =
            merge_arrays(inst_cnt.to_le_bytes(), recursion_limit.to_le_bytes());
        let header: [u8; 16] = merge_arrays(lower_64_bits, upper_64_bits);

        let mut bytes = header.to_vec();
        for set in self.sets() {
            bytes.extend(set.to_bytecode()?);
        }
        for inst in self.as_ref() {
            bytes.extend(inst.opcode().to_bytecode()?);
        }

        Ok(bytes)
    }
}

impl ToBytecode for CharacterSet {
    type Output = Result<Vec<u8>, BytecodeSerializationError>;

    fn to_bytecode(&self) -> Self::Output {
        let member_cnt = as_u32(self.members().len(), "set member count")?;

        Ok(member_cnt
            .to_le_bytes()
            .into_iter()
            .chain(
                self.members()
                    .iter()
                    .flat_map(|member| u32::from(*member).to_le_bytes()),
            )
            .collect())
    }
}

impl ToBytecode for Opcode {
    type Output = Result<[u8; 8], BytecodeSerializationError>;

    fn to_bytecode(&self) -> Self::Output {
        let operand = match self {
            Opcode::Any | Opcode::Begin | Opcode::End | Opcode::Match => 0,
            Opcode::Consume(InstConsume { value }) => u32::from(*value),
            Opcode::ConsumeSet(InstConsumeSet { idx }) => as_u32(*idx, "set index")?,
            Opcode::ZeroOrOne(InstRepeat { body })
            | Opcode::ZeroOrMore(InstRepeat { body })
            | Opcode::OneOrMore(InstRepeat { body })
            | Opcode::LazyZeroOrMore(InstRepeat { body })
            | Opcode::LazyOneOrMore(InstRepeat { body }) => body.as_u32(),
            Opcode::Or(InstOr { alternate }) => alternate.as_u32(),
            Opcode::Group(InstGroup { end }) => end.as_u32(),
        };
        let variant = OpcodeVariant::of(self) as u32;

        Ok(merge_arrays(variant.to_le_bytes(), operand.to_le_bytes()))
    }
}
