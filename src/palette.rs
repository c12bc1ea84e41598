use image::Rgb;

/// Size of a palette in Mega Drive colour RAM.
pub const PALETTE_SIZE: usize = 32;

#[derive(Debug, Clone)]
pub struct Palette([Rgb<u8>; 16]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorIndex(u8);

/// Evenly spaced grays, used when no palette is known for a block.
pub const BW_PALETTE: Palette = {
    let mut colors = [Rgb([0, 0, 0]); 16];
    let mut i = 0;
    while i < 16 {
        let level = (i * 17) as u8;
        colors[i] = Rgb([level, level, level]);
        i += 1;
    }
    Palette(colors)
};

impl ColorIndex {
    pub const fn new(index: u8) -> Self {
        assert!(index < 16, "ColorIndex must be less than 16");

        ColorIndex(index)
    }

    pub const fn as_u8(&self) -> u8 {
        self.0
    }

    pub const fn is_transparent(&self) -> bool {
        self.0 == 0
    }
}

impl Palette {
    /// Convert 16 big-endian CRAM words (`0000BBB0GGG0RRR0`) into a palette.
    pub fn from_slice(data: &[u8]) -> Option<Self> {
        if data.len() != PALETTE_SIZE {
            return None;
        }

        let mut palette = [Rgb([0, 0, 0]); 16];
        for (i, color) in data.chunks_exact(2).enumerate() {
            let word = u16::from_be_bytes([color[0], color[1]]);
            let channel = |shift: u16| (((word >> shift) & 0x0e) as u8) << 4;

            palette[i] = Rgb([channel(0), channel(4), channel(8)]);
        }

        Some(Palette(palette))
    }

    pub const fn get(&self, index: ColorIndex) -> Rgb<u8> {
        self.0[index.0 as usize]
    }
}
