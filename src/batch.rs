use indicatif::ProgressBar;
use rayon::prelude::*;
use std::{collections::HashSet, path::PathBuf};
use thiserror::Error;

use crate::{
    block_file_stem, BlockEntry, DecompressError, Decompressed, ExportError, Exporter, Rom,
};

#[derive(Error, Debug)]
pub enum BlockFailure {
    #[error(transparent)]
    Decompress(#[from] DecompressError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

#[derive(Debug, Clone)]
pub struct BlockSummary {
    pub declared_size: u16,
    pub bytes_read: usize,
    pub decompressed_len: usize,
    pub files: Vec<PathBuf>,
}

#[derive(Debug)]
pub struct BlockOutcome {
    pub entry: BlockEntry,
    pub result: Result<BlockSummary, BlockFailure>,
}

/// Per-block outcomes of a batch, in the order the blocks were given.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<BlockOutcome>,
    /// entries that would have overwritten an earlier block's file
    pub skipped: Vec<BlockEntry>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&BlockEntry, &BlockFailure)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|err| (&o.entry, err)))
    }
}

/// Decompresses every block in parallel. Blocks fail independently.
pub fn decompress_blocks(
    rom: &Rom,
    blocks: &[BlockEntry],
) -> Vec<Result<Decompressed, DecompressError>> {
    blocks
        .par_iter()
        .map(|entry| rom.decompress(entry.address))
        .collect()
}

/// Decompresses and writes every block in parallel. A failing block is
/// logged and recorded; the remaining blocks are still processed.
///
/// Blocks that would be written to the same file as an earlier one are
/// skipped.
pub fn unpack_blocks(
    rom: &Rom,
    blocks: &[BlockEntry],
    exporter: &Exporter,
    progress: &ProgressBar,
) -> BatchReport {
    let mut seen = HashSet::new();
    let (blocks, skipped): (Vec<_>, Vec<_>) = blocks
        .iter()
        .partition(|entry| seen.insert(block_file_stem(entry)));

    for entry in &skipped {
        log::warn!("Skipping duplicate block at {:#08x}", entry.address);
    }

    let outcomes = blocks
        .par_iter()
        .map(|&entry| {
            let result = unpack_block(rom, entry, exporter);
            progress.inc(1);

            match &result {
                Ok(summary) => log::info!(
                    "{}: address {:#08x}, size {:#06x}, decompressed {:#x} bytes",
                    entry.label.as_deref().unwrap_or("tiles"),
                    entry.address,
                    summary.declared_size,
                    summary.decompressed_len
                ),
                Err(err) => log::error!("{:#08x}: {}", entry.address, err),
            }

            BlockOutcome {
                entry: entry.clone(),
                result,
            }
        })
        .collect();

    BatchReport {
        outcomes,
        skipped: skipped.into_iter().cloned().collect(),
    }
}

fn unpack_block(
    rom: &Rom,
    entry: &BlockEntry,
    exporter: &Exporter,
) -> Result<BlockSummary, BlockFailure> {
    let block = rom.decompress(entry.address)?;
    let files = exporter.write(entry, &block)?;

    Ok(BlockSummary {
        declared_size: block.declared_size,
        bytes_read: block.bytes_read,
        decompressed_len: block.data.len(),
        files,
    })
}
