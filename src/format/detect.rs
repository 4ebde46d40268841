//! Structural format detectors.
//!
//! Each detector inspects a seekable probe and answers whether the bytes look
//! like its format. Detectors never fail: truncated, unreadable or
//! adversarial input simply yields `false`. They always rewind the probe
//! before returning so the next detector in the table starts at offset 0.

use std::io::{self, Read, Seek, SeekFrom};

use super::magic;

/// A seekable byte source a detector can inspect.
pub trait Probe: Read + Seek {}

impl<T: Read + Seek> Probe for T {}

/// Size of one tar header block.
pub const TAR_BLOCK: usize = 512;

fn probe_len(probe: &mut dyn Probe) -> io::Result<u64> {
    let len = probe.seek(SeekFrom::End(0))?;
    probe.seek(SeekFrom::Start(0))?;
    Ok(len)
}

fn read_at(probe: &mut dyn Probe, offset: u64, buf: &mut [u8]) -> io::Result<()> {
    probe.seek(SeekFrom::Start(offset))?;
    probe.read_exact(buf)
}

fn le_i32(bytes: &[u8]) -> i64 {
    i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as i64
}

/// Runs `check`, rewinds the probe and maps any I/O error to `false`.
fn run(probe: &mut dyn Probe, check: impl FnOnce(&mut dyn Probe) -> io::Result<bool>) -> bool {
    let result = check(&mut *probe).unwrap_or(false);
    let _ = probe.seek(SeekFrom::Start(0));
    result
}

/// Checks a `magic, count, offset` header whose directory holds
/// `entry_size`-byte records.
fn lump_directory(
    probe: &mut dyn Probe,
    magics: &[&[u8; 4]],
    entry_size: i64,
) -> io::Result<bool> {
    let len = probe_len(probe)?;
    if len < 12 {
        return Ok(false);
    }
    let mut header = [0u8; 12];
    read_at(probe, 0, &mut header)?;
    if !magics.iter().any(|m| header[..4] == m[..]) {
        return Ok(false);
    }
    let count = le_i32(&header[4..8]);
    let offset = le_i32(&header[8..12]);
    if count < 0 || offset < 0 {
        return Ok(false);
    }
    Ok(offset + entry_size * count <= len as i64)
}

/// Doom WAD: `IWAD`/`PWAD`, then lump count and directory offset; the
/// directory of 16-byte entries must fit in the file.
pub fn is_wad(probe: &mut dyn Probe) -> bool {
    run(probe, |p| lump_directory(p, &[magic::IWAD, magic::PWAD], 16))
}

/// Zip: a local file header or an empty archive's end record.
pub fn is_zip(probe: &mut dyn Probe) -> bool {
    run(probe, |p| {
        let mut sig = [0u8; 4];
        read_at(p, 0, &mut sig)?;
        Ok(&sig == magic::ZIP_LOCAL || &sig == magic::ZIP_EMPTY)
    })
}

/// Quake PAK: `PACK`, directory offset and size; the directory is made of
/// 64-byte entries and must fit in the file.
pub fn is_pak(probe: &mut dyn Probe) -> bool {
    run(probe, |p| {
        let len = probe_len(p)?;
        if len < 12 {
            return Ok(false);
        }
        let mut header = [0u8; 12];
        read_at(p, 0, &mut header)?;
        if &header[..4] != magic::PACK {
            return Ok(false);
        }
        let offset = le_i32(&header[4..8]);
        let size = le_i32(&header[8..12]);
        Ok(offset >= 0 && size >= 0 && size % 64 == 0 && offset + size <= len as i64)
    })
}

/// Build GRP: `KenSilverman`, a file count, and 16-byte entries.
pub fn is_grp(probe: &mut dyn Probe) -> bool {
    run(probe, |p| {
        let len = probe_len(p)?;
        if len < 16 {
            return Ok(false);
        }
        let mut header = [0u8; 16];
        read_at(p, 0, &mut header)?;
        if &header[..12] != magic::KEN_SILVERMAN {
            return Ok(false);
        }
        let count = u32::from_le_bytes([header[12], header[13], header[14], header[15]]) as u64;
        Ok(16 + 16 * count <= len)
    })
}

/// Quake WAD2 / Half-Life WAD3: like a Doom WAD with 32-byte entries.
pub fn is_wad2(probe: &mut dyn Probe) -> bool {
    run(probe, |p| lump_directory(p, &[magic::WAD2, magic::WAD3], 32))
}

/// gzip: member header with the deflate method.
pub fn is_gzip(probe: &mut dyn Probe) -> bool {
    run(probe, |p| {
        let mut sig = [0u8; 3];
        read_at(p, 0, &mut sig)?;
        Ok(&sig == magic::GZIP)
    })
}

/// bzip2: `BZh` followed by a block size digit `1`-`9`.
pub fn is_bzip2(probe: &mut dyn Probe) -> bool {
    run(probe, |p| {
        let mut sig = [0u8; 4];
        read_at(p, 0, &mut sig)?;
        Ok(&sig[..3] == magic::BZIP2 && (b'1'..=b'9').contains(&sig[3]))
    })
}

/// Tar: a full header block carrying `ustar` at offset 257, or an old-style
/// header whose checksum field matches its contents.
pub fn is_tar(probe: &mut dyn Probe) -> bool {
    run(probe, |p| {
        let mut block = [0u8; TAR_BLOCK];
        read_at(p, 0, &mut block)?;
        if block.iter().all(|&b| b == 0) {
            return Ok(false);
        }
        if &block[257..262] == magic::USTAR {
            return Ok(true);
        }
        Ok(parse_octal(&block[148..156]) == Some(header_checksum(&block)))
    })
}

/// Parses a NUL/space terminated octal number field.
pub fn parse_octal(field: &[u8]) -> Option<u64> {
    let text = field
        .iter()
        .skip_while(|&&b| b == b' ')
        .take_while(|&&b| b != 0 && b != b' ');
    let mut value: u64 = 0;
    let mut digits = 0;
    for &b in text {
        if !(b'0'..=b'7').contains(&b) {
            return None;
        }
        value = value.checked_mul(8)?.checked_add(u64::from(b - b'0'))?;
        digits += 1;
    }
    (digits > 0).then_some(value)
}

/// Sums a tar header block with its checksum field read as spaces.
pub fn header_checksum(block: &[u8; TAR_BLOCK]) -> u64 {
    block
        .iter()
        .enumerate()
        .map(|(i, &b)| if (148..156).contains(&i) { u64::from(b' ') } else { u64::from(b) })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn lump_header(magic: &[u8], count: i32, offset: i32) -> Vec<u8> {
        let mut data = magic.to_vec();
        data.extend_from_slice(&count.to_le_bytes());
        data.extend_from_slice(&offset.to_le_bytes());
        data
    }

    fn check(detector: fn(&mut dyn Probe) -> bool, data: &[u8]) -> bool {
        let mut cursor = Cursor::new(data);
        let result = detector(&mut cursor);
        assert_eq!(cursor.position(), 0, "probe not rewound");
        result
    }

    #[test]
    fn test_wad_directory_bounds() {
        let mut data = lump_header(b"IWAD", 1, 12);
        assert!(!check(is_wad, &data));
        data.extend_from_slice(&[0u8; 16]);
        assert!(check(is_wad, &data));
    }

    #[test]
    fn test_wad_negative_fields() {
        assert!(!check(is_wad, &lump_header(b"PWAD", -1, 12)));
        assert!(!check(is_wad, &lump_header(b"PWAD", 0, -4)));
    }

    #[test]
    fn test_wad_too_short() {
        assert!(!check(is_wad, b"PWAD"));
        assert!(!check(is_wad, b""));
    }

    #[test]
    fn test_zip_signatures() {
        assert!(check(is_zip, b"PK\x03\x04rest"));
        assert!(check(is_zip, b"PK\x05\x06"));
        assert!(!check(is_zip, b"PK\x01\x02"));
        assert!(!check(is_zip, b"PK"));
    }

    #[test]
    fn test_pak_directory_multiple_of_64() {
        let mut data = lump_header(b"PACK", 12, 64);
        data.extend_from_slice(&[0u8; 64]);
        assert!(check(is_pak, &data));

        let bad = lump_header(b"PACK", 12, 63);
        assert!(!check(is_pak, &bad));
    }

    #[test]
    fn test_grp() {
        let mut data = b"KenSilverman".to_vec();
        data.extend_from_slice(&1u32.to_le_bytes());
        assert!(!check(is_grp, &data));
        data.extend_from_slice(&[0u8; 16]);
        assert!(check(is_grp, &data));
    }

    #[test]
    fn test_wad2() {
        let mut data = lump_header(b"WAD3", 1, 12);
        data.extend_from_slice(&[0u8; 32]);
        assert!(check(is_wad2, &data));
        assert!(!check(is_wad, &data));
    }

    #[test]
    fn test_gzip_and_bzip2() {
        assert!(check(is_gzip, &[0x1F, 0x8B, 0x08, 0x00]));
        assert!(!check(is_gzip, &[0x1F, 0x8B, 0x07]));
        assert!(check(is_bzip2, b"BZh9"));
        assert!(!check(is_bzip2, b"BZh0"));
        assert!(!check(is_bzip2, b"BZh"));
    }

    #[test]
    fn test_tar_ustar_and_checksum() {
        let mut block = [0u8; TAR_BLOCK];
        block[..5].copy_from_slice(b"a.txt");
        block[257..262].copy_from_slice(b"ustar");
        assert!(check(is_tar, &block));

        let mut old = [0u8; TAR_BLOCK];
        old[..5].copy_from_slice(b"a.txt");
        let sum = header_checksum(&old);
        let field = format!("{:06o}\0 ", sum);
        old[148..156].copy_from_slice(field.as_bytes());
        assert!(check(is_tar, &old));

        old[0] = b'b';
        assert!(!check(is_tar, &old));
        assert!(!check(is_tar, &[0u8; TAR_BLOCK]));
        assert!(!check(is_tar, &[1u8; 100]));
    }

    #[test]
    fn test_parse_octal() {
        assert_eq!(parse_octal(b"0000644\0"), Some(0o644));
        assert_eq!(parse_octal(b"  17 \0"), Some(0o17));
        assert_eq!(parse_octal(b"\0\0\0"), None);
        assert_eq!(parse_octal(b"89"), None);
    }
}
