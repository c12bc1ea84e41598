use serde::Deserialize;
use thiserror::Error;

use super::Rom;

/// A compressed block to extract, as supplied by an address list or ROM map.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlockEntry {
    pub address: usize,
    #[serde(default, rename = "name")]
    pub label: Option<String>,
}

impl BlockEntry {
    pub fn new(address: usize) -> Self {
        Self {
            address,
            label: None,
        }
    }

    pub fn with_label(address: usize, label: impl Into<String>) -> Self {
        Self {
            address,
            label: Some(label.into()),
        }
    }
}

#[derive(Error, Debug)]
pub enum BlockListError {
    #[error("Invalid block address '{text}' on line {line}")]
    InvalidAddress { line: usize, text: String },
    #[error("Failed to parse ROM map")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct RomMap {
    #[serde(default)]
    pub supported_roms: Vec<RomMetadata>,

    #[serde(default, rename = "block")]
    pub blocks: Vec<BlockEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RomMetadata {
    pub name: String,
    pub crc: u32,
}

impl RomMap {
    pub fn parse(map: &str) -> Result<RomMap, BlockListError> {
        Ok(toml::de::from_str(map)?)
    }

    pub fn metadata_for(&self, rom: &Rom) -> Option<&RomMetadata> {
        self.supported_roms
            .iter()
            .find(|rom_type| rom_type.crc == rom.crc())
    }

    /// Maps that don't list any ROMs apply to every ROM.
    pub fn is_compatible_with(&self, rom: &Rom) -> bool {
        self.supported_roms.is_empty() || self.metadata_for(rom).is_some()
    }
}

/// Parses a plain-text address list: one hexadecimal address per line,
/// optionally prefixed with `0x` or `$` and followed by a label.
/// Blank lines and `#` comments are skipped.
pub fn parse_address_list(list: &str) -> Result<Vec<BlockEntry>, BlockListError> {
    let mut entries = Vec::new();

    for (index, line) in list.lines().enumerate() {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }

        let (address, label) = match line.split_once(char::is_whitespace) {
            Some((address, label)) => (address, Some(label.trim())),
            None => (line, None),
        };

        let address = parse_address(address).ok_or_else(|| BlockListError::InvalidAddress {
            line: index + 1,
            text: address.to_string(),
        })?;

        entries.push(BlockEntry {
            address,
            label: label.map(str::to_string),
        });
    }

    Ok(entries)
}

/// Parses a hexadecimal address with an optional `0x` or `$` prefix.
pub fn parse_address(text: &str) -> Option<usize> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .or_else(|| text.strip_prefix('$'))
        .unwrap_or(text);

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    usize::from_str_radix(digits, 16).ok()
}
