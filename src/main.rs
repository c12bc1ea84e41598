use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use epsilon::{parse_address, parse_address_list, BlockEntry, Exporter, Palette, Rom, RomMap};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Address list used by the original asset pipeline when none is given.
const DEFAULT_ADDRESS_LIST: &str = "data/tiles_addrs.txt";

#[derive(Parser, Debug)]
struct Arguments {
    /// Increase log verbosity (-v for debug, -vv for every decoded operation)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decompress every listed block of a ROM into separate files
    Unpack {
        rom: PathBuf,

        #[command(flatten)]
        source: BlockSource,

        #[command(flatten)]
        args: UnpackArgs,
    },

    /// Decompress a single block and print a hex dump of the result
    Inspect {
        rom: PathBuf,

        /// Address of the block's size header, in hex
        #[arg(value_parser = parse_hex)]
        address: usize,
    },
}

#[derive(Args, Debug, Clone)]
#[group(multiple = false)]
struct BlockSource {
    /// Plain-text list with one hex block address (and optional label) per line
    #[arg(short, long)]
    addresses: Option<PathBuf>,

    /// TOML ROM map listing the blocks, optionally restricted to known ROM checksums
    #[arg(short = 'm', long)]
    rom_map: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct UnpackArgs {
    /// The output directory to write the decompressed blocks to
    #[arg(short, long, default_value = "data")]
    out_dir: PathBuf,

    /// Remove block files left in the output directory by earlier runs
    #[arg(long)]
    force: bool,

    /// Also export blocks containing whole tiles as PNG sheets
    #[arg(long)]
    png: bool,

    /// ROM offset (hex) of a 16 colour palette to render PNG sheets with
    #[arg(long, value_parser = parse_hex, requires = "png")]
    palette: Option<usize>,
}

fn parse_hex(text: &str) -> Result<usize, String> {
    parse_address(text).ok_or_else(|| format!("'{}' is not a hex address", text))
}

impl BlockSource {
    fn load(&self, rom: &Rom) -> anyhow::Result<Vec<BlockEntry>> {
        if let Some(map_path) = &self.rom_map {
            let map = RomMap::parse(
                &fs::read_to_string(map_path)
                    .with_context(|| format!("Failed to read ROM map {}", map_path.display()))?,
            )?;

            match map.metadata_for(rom) {
                Some(metadata) => log::info!("Loaded ROM: '{}'", metadata.name),
                None if map.is_compatible_with(rom) => {}
                None => log::warn!(
                    "ROM map is not compatible with the supplied ROM (CRC {:#010x}). Continuing anyway.",
                    rom.crc()
                ),
            }

            return Ok(map.blocks);
        }

        let list_path = self
            .addresses
            .clone()
            .unwrap_or_else(|| DEFAULT_ADDRESS_LIST.into());
        let list = fs::read_to_string(&list_path)
            .with_context(|| format!("Failed to read address list {}", list_path.display()))?;

        Ok(parse_address_list(&list)?)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Arguments::parse();

    let mut clog = colog::default_builder();
    clog.filter(
        None,
        match args.verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        },
    );
    clog.init();

    match args.command {
        Commands::Unpack { rom, source, args } => {
            let rom = open_rom(&rom)?;
            let blocks = source.load(&rom)?;
            unpack(&rom, &blocks, args)?;
        }
        Commands::Inspect { rom, address } => {
            let rom = open_rom(&rom)?;
            inspect(&rom, address)?;
        }
    }

    Ok(())
}

fn open_rom(path: &Path) -> anyhow::Result<Rom> {
    let rom =
        Rom::open(path).with_context(|| format!("Failed to open ROM {}", path.display()))?;
    log::debug!(
        "Loaded {} ({:#x} bytes, CRC {:#010x})",
        path.display(),
        rom.data().len(),
        rom.crc()
    );

    Ok(rom)
}

fn unpack(rom: &Rom, blocks: &[BlockEntry], args: UnpackArgs) -> anyhow::Result<()> {
    use indicatif::ProgressBar;

    log::info!("Unpacking {} blocks...", blocks.len());

    let mut exporter = Exporter::new(&args.out_dir);
    if args.force {
        let removed = exporter
            .clean()
            .with_context(|| "Failed to clean up old output files")?;
        log::info!("Removed {} old block files", removed.len());
    }
    fs::create_dir_all(&args.out_dir).with_context(|| "Failed to create output directory")?;

    if args.png {
        let palette = match args.palette {
            Some(offset) => Some(
                rom.slice(offset, epsilon::PALETTE_SIZE)
                    .and_then(Palette::from_slice)
                    .with_context(|| format!("No palette at ROM offset {:#x}", offset))?,
            ),
            None => None,
        };
        exporter = exporter.with_preview(palette);
    }

    let progress = ProgressBar::new(blocks.len() as u64);
    let report = epsilon::unpack_blocks(rom, blocks, &exporter, &progress);
    progress.finish_and_clear();

    if report.failed() > 0 || !report.skipped.is_empty() {
        log::warn!(
            "Done! Unpacked {} blocks, {} failed, {} skipped as duplicates",
            report.succeeded(),
            report.failed(),
            report.skipped.len()
        );
    } else {
        log::info!("Done! Unpacked {} blocks", report.succeeded());
    }

    Ok(())
}

fn inspect(rom: &Rom, address: usize) -> anyhow::Result<()> {
    let block = rom
        .decompress(address)
        .with_context(|| format!("Failed to decompress block at {:#x}", address))?;

    println!(
        "Address: {:#08x}, size: {:#06x}, read: {:#x}, decompressed: {:#x}",
        block.address,
        block.declared_size,
        block.bytes_read,
        block.data.len()
    );

    for line in hex_dump(&block.data) {
        println!("{}", line);
    }

    Ok(())
}

/// 16 bytes per line, prefixed with their offset, with a wider gap after
/// the eighth byte.
fn hex_dump(data: &[u8]) -> Vec<String> {
    let hex = |bytes: &[u8]| {
        bytes
            .iter()
            .map(|byte| format!("{:02X}", byte))
            .collect::<Vec<_>>()
            .join(" ")
    };

    data.chunks(16)
        .enumerate()
        .map(|(row, chunk)| {
            let (left, right) = chunk.split_at(chunk.len().min(8));
            if right.is_empty() {
                format!("{:06X}  {}", row * 16, hex(left))
            } else {
                format!("{:06X}  {}   {}", row * 16, hex(left), hex(right))
            }
        })
        .collect()
}
