use std::{fs, io, path::Path};
use thiserror::Error;

use crate::{DecompressError, Decompressed, Decompressor};

mod map;
pub use map::{parse_address, parse_address_list, BlockEntry, BlockListError, RomMap, RomMetadata};

/// A ROM image held in memory. It is never mutated, so blocks can be
/// decompressed from it on any number of threads at once.
#[derive(Debug, Clone)]
pub struct Rom {
    data: Vec<u8>,
    crc: u32,
}

#[derive(Error, Debug)]
pub enum RomError {
    #[error("Failed to read ROM file")]
    Read(#[from] io::Error),
    #[error("ROM file is empty")]
    Empty,
}

impl Rom {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RomError> {
        let data = fs::read(path.as_ref())?;
        if data.is_empty() {
            return Err(RomError::Empty);
        }

        Ok(Self::from_bytes(data))
    }

    pub fn from_bytes(data: Vec<u8>) -> Self {
        let crc = crc32fast::hash(&data);
        Self { data, crc }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn crc(&self) -> u32 {
        self.crc
    }

    pub fn decompress(&self, address: usize) -> Result<Decompressed, DecompressError> {
        Decompressor::new(&self.data, address)?.decompress()
    }

    /// Raw, uncompressed bytes at `address`, if the ROM is long enough.
    pub fn slice(&self, address: usize, len: usize) -> Option<&[u8]> {
        self.data.get(address..address.checked_add(len)?)
    }
}
