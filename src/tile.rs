use crate::palette::{ColorIndex, Palette};
use image::{GenericImage, Rgba, RgbaImage};

/// Bytes per 8x8 tile at 4 bits per pixel.
pub const TILE_SIZE: usize = 32;

/// Tiles per row when laying out a sheet.
pub const SHEET_WIDTH: u32 = 16;

#[derive(Debug, Clone)]
pub struct Tile([ColorIndex; 64]);

#[derive(Debug, Clone)]
pub struct TileSheet(Vec<Tile>);

impl TileSheet {
    /// Splits decompressed data into tiles. Fails unless the data is a
    /// non-empty whole number of tiles.
    pub fn try_from_slice(data: &[u8]) -> Option<Self> {
        if data.is_empty() || data.len() % TILE_SIZE != 0 {
            return None;
        }

        let tiles = data.chunks_exact(TILE_SIZE).map(Tile::from_slice).collect();

        Some(TileSheet(tiles))
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.0
    }

    pub fn to_image(&self, palette: &Palette) -> RgbaImage {
        let columns = (self.0.len() as u32).min(SHEET_WIDTH);
        let rows = (self.0.len() as u32).div_ceil(SHEET_WIDTH);

        let mut image = RgbaImage::new(columns * 8, rows * 8);
        for (i, tile) in self.0.iter().enumerate() {
            let x = (i as u32 % SHEET_WIDTH) * 8;
            let y = (i as u32 / SHEET_WIDTH) * 8;

            image
                .copy_from(&tile.with_palette(palette), x, y)
                .expect("tile lies within the sheet");
        }

        image
    }
}

impl Tile {
    pub fn data(&self) -> &[ColorIndex] {
        &self.0
    }

    /// Packed pixels, two per byte with the left pixel in the high nibble.
    pub fn from_slice(data: &[u8]) -> Self {
        assert!(data.len() == TILE_SIZE, "Tile data must be 32 bytes long");

        let mut tile = [ColorIndex::new(0); 64];
        for (i, byte) in data.iter().enumerate() {
            tile[i * 2] = ColorIndex::new(byte >> 4);
            tile[i * 2 + 1] = ColorIndex::new(byte & 0x0f);
        }

        Tile(tile)
    }

    pub fn with_palette(&self, palette: &Palette) -> RgbaImage {
        RgbaImage::from_fn(8, 8, |x, y| {
            let color_index = self.0[(y * 8 + x) as usize];

            if color_index.is_transparent() {
                Rgba([0, 0, 0, 0])
            } else {
                let color = palette.get(color_index);
                Rgba([color[0], color[1], color[2], 255])
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BW_PALETTE;

    #[test]
    fn unpacks_nibbles_left_to_right() {
        let mut data = [0u8; TILE_SIZE];
        data[0] = 0x1f;
        data[31] = 0x20;

        let tile = Tile::from_slice(&data);
        assert_eq!(tile.data()[0].as_u8(), 0x1);
        assert_eq!(tile.data()[1].as_u8(), 0xf);
        assert_eq!(tile.data()[62].as_u8(), 0x2);
        assert_eq!(tile.data()[63].as_u8(), 0x0);
    }

    #[test]
    fn sheet_requires_whole_tiles() {
        assert!(TileSheet::try_from_slice(&[]).is_none());
        assert!(TileSheet::try_from_slice(&[0; 33]).is_none());
        assert_eq!(TileSheet::try_from_slice(&[0; 64]).unwrap().tiles().len(), 2);
    }

    #[test]
    fn sheet_layout() {
        let sheet = TileSheet::try_from_slice(&[0x11; TILE_SIZE * 20]).unwrap();
        let image = sheet.to_image(&BW_PALETTE);
        assert_eq!(image.dimensions(), (128, 16));

        let sheet = TileSheet::try_from_slice(&[0xf0; TILE_SIZE * 3]).unwrap();
        let image = sheet.to_image(&BW_PALETTE);
        assert_eq!(image.dimensions(), (24, 8));
        assert_eq!(image.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
        assert_eq!(image.get_pixel(1, 0), &Rgba([0, 0, 0, 0]));
    }
}
