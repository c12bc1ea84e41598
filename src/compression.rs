mod decompress;
pub use decompress::{DecompressError, Decompressed, Decompressor};

mod reader;
pub use reader::BlockReader;

mod sink;
pub use sink::{OutOfWindow, OutputSink};

/// A single decoded opcode together with its operands.
///
/// Counts are the number of times the operation emits its unit, already
/// including the format's off-by-one adjustments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation<'a> {
    /// `1ccccc dd` + `dddddddd`: replay output from `distance` bytes back
    BackReference { count: usize, distance: u16 },
    /// `011ccccc`: emit `fixed` before each of `values`
    AlternatingRun { fixed: u8, values: &'a [u8] },
    /// `001ccccc`
    ByteRun { count: usize, value: u8 },
    /// `010ccccc`
    PairRun { count: usize, pair: [u8; 2] },
    /// `000ccccc`
    Literal(&'a [u8]),
}

/// Window offset encoded by a back-reference: the low 10 bits of the
/// opcode/operand pair read as a big-endian word, plus one.
pub const fn back_reference_distance(op: u8, operand: u8) -> u16 {
    (u16::from_be_bytes([op, operand]) & 0x03ff) + 1
}

impl<'a> Operation<'a> {
    /// Classifies the opcode under the reader's cursor and consumes its
    /// operands. The cursor is left on the last byte belonging to the
    /// operation.
    pub fn decode(reader: &mut BlockReader<'a>) -> Result<Self, DecompressError> {
        let op = reader.peek()?;

        let operation = match (op & 0x80 != 0, op & 0x40 != 0, op & 0x20 != 0) {
            (true, _, _) => Self::decode_back_reference(op, reader)?,
            (false, true, true) => Self::decode_alternating_run(op, reader)?,
            (false, false, true) => Self::ByteRun {
                count: run_count(op),
                value: reader.operand()?,
            },
            (false, true, false) => {
                let pair = reader.take(2)?;
                Self::PairRun {
                    count: run_count(op),
                    pair: [pair[0], pair[1]],
                }
            }
            (false, false, false) => Self::Literal(reader.take((op & 0x1f) as usize + 1)?),
        };

        Ok(operation)
    }

    fn decode_back_reference(
        op: u8,
        reader: &mut BlockReader<'a>,
    ) -> Result<Self, DecompressError> {
        let count = ((op >> 2) & 0x1f) as usize + 2;
        let operand = reader.operand()?;

        Ok(Self::BackReference {
            count,
            distance: back_reference_distance(op, operand),
        })
    }

    fn decode_alternating_run(
        op: u8,
        reader: &mut BlockReader<'a>,
    ) -> Result<Self, DecompressError> {
        let fixed = reader.operand()?;
        let values = reader.take(run_count(op))?;

        Ok(Self::AlternatingRun { fixed, values })
    }

    /// Number of bytes the operation appends to the output.
    pub fn output_len(&self) -> usize {
        match self {
            Self::BackReference { count, .. } => *count,
            Self::AlternatingRun { values, .. } => values.len() * 2,
            Self::ByteRun { count, .. } => *count,
            Self::PairRun { count, .. } => count * 2,
            Self::Literal(values) => values.len(),
        }
    }
}

/// Repetitions for the run families: the 5-bit field plus one, and the
/// emitting loop runs once more than that.
const fn run_count(op: u8) -> usize {
    (op & 0x1f) as usize + 2
}
