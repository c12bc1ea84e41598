use super::DecompressError;

/// Offset of the first opcode, right after the big-endian size header.
pub const HEADER_LEN: usize = 2;

/// Checked view over a single compressed block.
///
/// All positions are relative to the block's start address. The readable
/// window ends at whichever comes first: the inclusive declared size or the
/// end of the ROM.
#[derive(Debug, Clone)]
pub struct BlockReader<'a> {
    src: &'a [u8],
    address: usize,
    cursor: usize,
}

impl<'a> BlockReader<'a> {
    /// Reads the size header at `address` and returns a reader positioned on
    /// the first opcode, together with the declared size.
    pub fn open(rom: &'a [u8], address: usize) -> Result<(Self, u16), DecompressError> {
        let header = rom
            .get(address..)
            .and_then(|block| block.get(..HEADER_LEN))
            .ok_or(DecompressError::AddressOutOfRange {
                address,
                rom_len: rom.len(),
            })?;
        let declared_size = u16::from_be_bytes([header[0], header[1]]);

        let end = address
            .saturating_add(declared_size as usize + 1)
            .min(rom.len());

        let reader = Self {
            src: &rom[address..end],
            address,
            cursor: HEADER_LEN,
        };

        Ok((reader, declared_size))
    }

    pub fn address(&self) -> usize {
        self.address
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of bytes visible to the opcode stream, header included.
    pub fn limit(&self) -> usize {
        self.src.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.src.len()
    }

    pub fn peek(&self) -> Result<u8, DecompressError> {
        self.src
            .get(self.cursor)
            .copied()
            .ok_or(DecompressError::Truncated {
                address: self.address,
                cursor: self.cursor,
            })
    }

    pub fn advance(&mut self) {
        self.cursor += 1;
    }

    /// Moves onto the next byte and returns it.
    pub fn operand(&mut self) -> Result<u8, DecompressError> {
        self.advance();
        self.peek()
    }

    /// Returns the `count` bytes following the cursor, leaving the cursor on
    /// the last of them.
    pub fn take(&mut self, count: usize) -> Result<&'a [u8], DecompressError> {
        let start = self.cursor + 1;
        let end = start + count;

        let bytes = self
            .src
            .get(start..end)
            .ok_or(DecompressError::Truncated {
                address: self.address,
                cursor: self.src.len().max(start),
            })?;

        self.cursor = end - 1;
        Ok(bytes)
    }
}
