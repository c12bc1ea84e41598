mod compression;
pub use compression::{
    back_reference_distance, BlockReader, DecompressError, Decompressed, Decompressor, OutOfWindow,
    Operation, OutputSink,
};

mod batch;
pub use batch::{
    decompress_blocks, unpack_blocks, BatchReport, BlockFailure, BlockOutcome, BlockSummary,
};

mod export;
pub use export::{block_file_stem, is_block_file_name, ExportError, Exporter};

mod palette;
pub use palette::{ColorIndex, Palette, BW_PALETTE, PALETTE_SIZE};

mod rom;
pub use rom::{
    parse_address, parse_address_list, BlockEntry, BlockListError, Rom, RomError, RomMap,
    RomMetadata,
};

mod tile;
pub use tile::{Tile, TileSheet, TILE_SIZE};
