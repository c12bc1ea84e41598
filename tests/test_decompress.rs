use epsilon::{DecompressError, Decompressed, Decompressor, Rom};
use std::fs;

fn load_rom() -> anyhow::Result<Rom> {
    Ok(Rom::open("tests/data/synthetic.bin")?)
}

/// Builds a block whose declared size ends exactly on its last byte,
/// followed by filler that would decode as a back-reference if read.
fn block(body: &[u8]) -> Vec<u8> {
    let mut data = ((body.len() + 1) as u16).to_be_bytes().to_vec();
    data.extend_from_slice(body);
    data.extend_from_slice(&[0xff; 4]);
    data
}

fn decode(body: &[u8]) -> Result<Vec<u8>, DecompressError> {
    Ok(Decompressor::new(&block(body), 0)?.decompress()?.data)
}

#[test]
fn test_decompress() -> anyhow::Result<()> {
    let rom = load_rom()?;

    for entry in fs::read_dir("tests/decompress_data")? {
        let entry = entry?;
        let name = entry.file_name().into_string().unwrap();

        let (name, offset) = name
            .split_once('_')
            .expect("Failed to split filename into name and offset");
        let offset =
            usize::from_str_radix(offset, 16).expect("Failed to parse offset from filename");

        let expected = fs::read(entry.path())?;
        let result = rom.decompress(offset)?;

        assert_eq!(
            expected, result.data,
            "Decompressed data does not match for {} at offset {:#x}",
            name, offset
        );
    }

    Ok(())
}

#[test]
fn literal_run() {
    assert_eq!(
        decode(&[0x03, 0x11, 0x22, 0x33, 0x44]).unwrap(),
        [0x11, 0x22, 0x33, 0x44]
    );
}

#[test]
fn byte_run() {
    assert_eq!(decode(&[0x21, 0xaa]).unwrap(), [0xaa, 0xaa, 0xaa]);
    assert_eq!(decode(&[0x3f, 0x01]).unwrap(), [0x01; 33]);
}

#[test]
fn pair_run() {
    assert_eq!(
        decode(&[0x41, 0xbb, 0xcc]).unwrap(),
        [0xbb, 0xcc, 0xbb, 0xcc, 0xbb, 0xcc]
    );
}

#[test]
fn alternating_run() {
    assert_eq!(
        decode(&[0x61, 0x00, 0x01, 0x02, 0x03]).unwrap(),
        [0x00, 0x01, 0x00, 0x02, 0x00, 0x03]
    );
}

#[test]
fn back_reference_overlaps_itself() {
    // distance 3, six bytes
    let data = decode(&[0x02, 0x01, 0x02, 0x03, 0x90, 0x02]).unwrap();
    assert_eq!(data, [0x01, 0x02, 0x03, 0x01, 0x02, 0x03, 0x01, 0x02, 0x03]);
}

#[test]
fn back_reference_uses_high_distance_bits() {
    let body = [
        vec![0x25, 0x55],       // 7 x 0x55
        vec![0x01, 0x77, 0x88], // marker at 7..9
        [0x3f, 0x00].repeat(7), // 231 zeros
        vec![0x36, 0x00],       // 24 zeros
        vec![0x81, 0x00],       // 2 bytes from 257 back
    ]
    .concat();

    let data = decode(&body).unwrap();
    assert_eq!(data.len(), 266);
    assert_eq!(&data[264..], &[0x77, 0x88]);
}

#[test]
fn back_reference_before_output_start() {
    assert_eq!(
        decode(&[0x00, 0x42, 0x84, 0x01]),
        Err(DecompressError::InvalidDistance {
            address: 0,
            cursor: 5,
            distance: 2,
            available: 1,
        })
    );
}

#[test]
fn decoding_is_deterministic() -> anyhow::Result<()> {
    let rom = load_rom()?;

    assert_eq!(rom.decompress(0x80)?, rom.decompress(0x80)?);
    Ok(())
}

#[test]
fn stops_at_declared_size() {
    let result = Decompressor::new(&block(&[0x21, 0xaa]), 0)
        .unwrap()
        .decompress()
        .unwrap();

    assert_eq!(
        result,
        Decompressed {
            address: 0,
            declared_size: 3,
            bytes_read: 4,
            data: vec![0xaa; 3],
        }
    );
}

#[test]
fn declared_size_one_byte_short() {
    let mut data = block(&[0x21, 0xaa]);
    data[1] = 2;

    assert_eq!(
        Decompressor::new(&data, 0).unwrap().decompress(),
        Err(DecompressError::Truncated {
            address: 0,
            cursor: 3
        })
    );
}

#[test]
fn rom_ends_before_declared_size() {
    // the stream is complete, only the header overstates it
    let data = [0x01, 0x00, 0x41, 0x12, 0x34];
    let result = Decompressor::new(&data, 0).unwrap().decompress().unwrap();

    assert_eq!(result.declared_size, 0x100);
    assert_eq!(result.bytes_read, 5);
    assert_eq!(result.data, [0x12, 0x34, 0x12, 0x34, 0x12, 0x34]);
}

#[test]
fn rom_ends_inside_operation() -> anyhow::Result<()> {
    let rom = load_rom()?;

    assert_eq!(
        rom.decompress(0x1f0),
        Err(DecompressError::Truncated {
            address: 0x1f0,
            cursor: 0x10
        })
    );
    Ok(())
}

#[test]
fn address_outside_rom() -> anyhow::Result<()> {
    let rom = load_rom()?;

    assert_eq!(
        rom.decompress(0x1ff),
        Err(DecompressError::AddressOutOfRange {
            address: 0x1ff,
            rom_len: 0x200
        })
    );
    assert_eq!(rom.decompress(0x1000).unwrap_err().address(), 0x1000);
    Ok(())
}

#[test]
fn empty_block() {
    let result = Decompressor::new(&[0x00, 0x01, 0xff], 0)
        .unwrap()
        .decompress()
        .unwrap();

    assert!(result.data.is_empty());
    assert_eq!(result.bytes_read, 2);
}
