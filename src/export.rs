use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::{BlockEntry, Decompressed, Palette, TileSheet, BW_PALETTE};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write {}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("Failed to remove {}", path.display())]
    Clean { path: PathBuf, source: io::Error },
    #[error("Failed to encode tile preview")]
    Image(#[from] image::ImageError),
}

/// Writes decompressed blocks into a directory.
#[derive(Debug, Clone)]
pub struct Exporter {
    out_dir: PathBuf,
    preview: Option<Palette>,
}

/// File name (without extension) for a block: its label, or `tiles`,
/// followed by the address as six hex digits.
pub fn block_file_stem(entry: &BlockEntry) -> String {
    let label = entry
        .label
        .as_deref()
        .map(|label| {
            label
                .chars()
                .map(|c| match c {
                    'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
                    _ => '_',
                })
                .collect::<String>()
        })
        .filter(|label| !label.is_empty())
        .unwrap_or_else(|| "tiles".to_string());

    format!("{}_{:06X}", label, entry.address)
}

/// Whether `name` looks like a file written by [`Exporter::write`]: a
/// sanitised label, an underscore, at least six uppercase hex digits and a
/// `.bin` or `.png` extension.
pub fn is_block_file_name(name: &str) -> bool {
    let Some(stem) = name
        .strip_suffix(".bin")
        .or_else(|| name.strip_suffix(".png"))
    else {
        return false;
    };
    let Some((label, address)) = stem.rsplit_once('_') else {
        return false;
    };

    !label.is_empty()
        && label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        && address.len() >= 6
        && address
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
}

fn clean_error(path: &Path) -> impl FnOnce(io::Error) -> ExportError {
    let path = path.to_path_buf();
    move |source| ExportError::Clean { path, source }
}

impl Exporter {
    pub fn new<P: Into<PathBuf>>(out_dir: P) -> Self {
        Self {
            out_dir: out_dir.into(),
            preview: None,
        }
    }

    /// Also render blocks that contain whole tiles as PNG sheets.
    pub fn with_preview(mut self, palette: Option<Palette>) -> Self {
        self.preview = Some(palette.unwrap_or(BW_PALETTE));
        self
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Removes block files left by earlier runs. Anything else in the output
    /// directory, such as the address list itself, is kept.
    pub fn clean(&self) -> Result<Vec<PathBuf>, ExportError> {
        if !self.out_dir.exists() {
            return Ok(Vec::new());
        }

        let mut removed = Vec::new();
        for entry in fs::read_dir(&self.out_dir).map_err(clean_error(&self.out_dir))? {
            let entry = entry.map_err(clean_error(&self.out_dir))?;
            let path = entry.path();

            let is_block_file = entry.file_type().map_err(clean_error(&path))?.is_file()
                && entry.file_name().to_str().is_some_and(is_block_file_name);
            if !is_block_file {
                continue;
            }

            fs::remove_file(&path).map_err(clean_error(&path))?;
            log::debug!("Removed {}", path.display());
            removed.push(path);
        }

        Ok(removed)
    }

    /// Writes the block's bytes, and its preview if enabled. Existing files
    /// are overwritten. Returns the paths written.
    pub fn write(
        &self,
        entry: &BlockEntry,
        block: &Decompressed,
    ) -> Result<Vec<PathBuf>, ExportError> {
        let stem = block_file_stem(entry);
        let mut written = Vec::new();

        let path = self.out_dir.join(format!("{}.bin", stem));
        fs::write(&path, &block.data).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        written.push(path);

        if let Some(palette) = &self.preview {
            match TileSheet::try_from_slice(&block.data) {
                Some(sheet) => {
                    let path = self.out_dir.join(format!("{}.png", stem));
                    sheet.to_image(palette).save(&path)?;
                    written.push(path);
                }
                None => log::warn!(
                    "Skipping preview for {}: {:#x} bytes is not a whole number of tiles",
                    stem,
                    block.data.len()
                ),
            }
        }

        Ok(written)
    }
}
