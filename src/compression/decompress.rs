use super::{BlockReader, Operation, OutputSink};
use crate::tile::TILE_SIZE;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Decompressor<'a> {
    reader: BlockReader<'a>,
    declared_size: u16,
    dst: OutputSink,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecompressError {
    #[error("Block address {address:#08x} is outside of the ROM ({rom_len:#x} bytes)")]
    AddressOutOfRange { address: usize, rom_len: usize },
    #[error("Block at {address:#08x} is truncated at offset {cursor:#x}")]
    Truncated { address: usize, cursor: usize },
    #[error(
        "Block at {address:#08x} references {distance} bytes back at offset {cursor:#x}, \
         but only {available} bytes were decompressed"
    )]
    InvalidDistance {
        address: usize,
        cursor: usize,
        distance: u16,
        available: usize,
    },
}

impl DecompressError {
    pub fn address(&self) -> usize {
        match self {
            Self::AddressOutOfRange { address, .. }
            | Self::Truncated { address, .. }
            | Self::InvalidDistance { address, .. } => *address,
        }
    }
}

/// The result of decompressing a single block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decompressed {
    pub address: usize,
    pub declared_size: u16,
    /// bytes consumed from the block, header included
    pub bytes_read: usize,
    pub data: Vec<u8>,
}

impl<'a> Decompressor<'a> {
    /// Prepares decompression of the block whose size header is at `address`.
    pub fn new(src: &'a [u8], address: usize) -> Result<Self, DecompressError> {
        let (reader, declared_size) = BlockReader::open(src, address)?;

        Ok(Self {
            reader,
            declared_size,
            dst: OutputSink::new(),
        })
    }

    pub fn declared_size(&self) -> u16 {
        self.declared_size
    }

    pub fn decompress(mut self) -> Result<Decompressed, DecompressError> {
        while self.reader.cursor() <= self.declared_size as usize && !self.reader.is_exhausted() {
            let operation = Operation::decode(&mut self.reader)?;
            log::trace!(
                "{:#08x}+{:#06x}: {:?} ({} bytes)",
                self.reader.address(),
                self.reader.cursor(),
                operation,
                operation.output_len()
            );

            self.execute(operation)?;
            self.reader.advance();
        }

        self.check_sizes();

        Ok(Decompressed {
            address: self.reader.address(),
            declared_size: self.declared_size,
            bytes_read: self.reader.cursor(),
            data: self.dst.into_bytes(),
        })
    }

    fn execute(&mut self, operation: Operation) -> Result<(), DecompressError> {
        match operation {
            Operation::BackReference { count, distance } => self.copy_back(count, distance)?,
            Operation::AlternatingRun { fixed, values } => {
                for &value in values {
                    self.dst.append(fixed);
                    self.dst.append(value);
                }
            }
            Operation::ByteRun { count, value } => self.dst.append_repeated(value, count),
            Operation::PairRun { count, pair } => {
                for _ in 0..count {
                    self.dst.extend_from_slice(&pair);
                }
            }
            Operation::Literal(values) => self.dst.extend_from_slice(values),
        }

        Ok(())
    }

    fn copy_back(&mut self, count: usize, distance: u16) -> Result<(), DecompressError> {
        let available = self.dst.len();
        let error = DecompressError::InvalidDistance {
            address: self.reader.address(),
            cursor: self.reader.cursor(),
            distance,
            available,
        };

        let offset = available.checked_sub(distance as usize).ok_or_else(|| error.clone())?;
        self.dst.copy_from(offset, count).map_err(|_| error)
    }

    fn check_sizes(&self) {
        let address = self.reader.address();
        let expected_end = self.declared_size as usize + 1;

        if self.reader.cursor() != expected_end {
            log::warn!(
                "Block at {:#08x} stopped at offset {:#x} but declares {:#x} bytes, \
                 the address might be wrong",
                address,
                self.reader.cursor(),
                self.declared_size
            );
        }

        if self.dst.is_empty() {
            log::warn!("Block at {:#08x} decompressed to nothing", address);
        } else if self.dst.len() % TILE_SIZE != 0 {
            log::warn!(
                "Block at {:#08x} decompressed to {:#x} bytes, which is not a whole number of tiles",
                address,
                self.dst.len()
            );
        }
    }
}
