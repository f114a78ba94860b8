//! Minimal pixel-density reader for PNG, JPEG and TIFF files.
//!
//! The `image` crate decodes pixels but drops physical resolution, so the
//! few bytes that carry it are read here directly:
//!
//! - PNG: `pHYs` chunk (pixels per meter, unit byte 1)
//! - JPEG: JFIF APP0 density, falling back to the EXIF APP1 TIFF block
//! - TIFF: IFD tags 282/283 (X/YResolution, RATIONAL) + 296 (ResolutionUnit)
//!
//! Only the vertical density is returned: it is the one that turns pixel
//! height into run length. Files that only record an aspect ratio (unit 0 /
//! "no absolute unit") yield `None`.

use crate::types::{LengthUnit, Resolution};

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const JFIF_HEADER: &[u8] = b"JFIF\0";
const EXIF_HEADER: &[u8] = b"Exif\0\0";

const TAG_Y_RESOLUTION: u16 = 283;
const TAG_RESOLUTION_UNIT: u16 = 296;

/// Read the vertical pixel density from encoded image bytes, dispatching on
/// the file signature. Returns `None` when the format is unknown or carries
/// no absolute density.
pub fn read_resolution(bytes: &[u8]) -> Option<Resolution> {
    if bytes.starts_with(PNG_SIGNATURE) {
        read_png_phys(bytes)
    } else if bytes.starts_with(&[0xFF, 0xD8]) {
        read_jpeg_density(bytes)
    } else if bytes.starts_with(b"II") || bytes.starts_with(b"MM") {
        read_tiff_resolution(bytes)
    } else {
        None
    }
}

fn positive(value: f64, unit: LengthUnit) -> Option<Resolution> {
    (value.is_finite() && value > 0.0).then(|| Resolution::new(value, unit))
}

// ---------------------------------------------------------------------------
// PNG: pHYs chunk
// ---------------------------------------------------------------------------

/// Walk PNG chunks until `pHYs` (must precede the first `IDAT`).
///
/// Chunk layout: length (u32 BE) + type (4) + data + CRC (4).
/// pHYs data: x ppu (u32 BE), y ppu (u32 BE), unit (1 = meter).
fn read_png_phys(data: &[u8]) -> Option<Resolution> {
    let mut pos = PNG_SIGNATURE.len();

    while pos + 8 <= data.len() {
        let length =
            u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]) as usize;
        let kind = &data[pos + 4..pos + 8];
        let body = pos + 8;

        if body + length > data.len() || kind == b"IDAT" || kind == b"IEND" {
            break;
        }

        if kind == b"pHYs" && length >= 9 {
            let y = u32::from_be_bytes([
                data[body + 4],
                data[body + 5],
                data[body + 6],
                data[body + 7],
            ]);
            return match data[body + 8] {
                1 => positive(y as f64, LengthUnit::Meter),
                _ => None,
            };
        }

        pos = body + length + 4;
    }
    None
}

// ---------------------------------------------------------------------------
// JPEG: JFIF APP0, then EXIF APP1
// ---------------------------------------------------------------------------

/// Scan JPEG marker segments up to start-of-scan.
///
/// JFIF density wins when it has an absolute unit; otherwise the EXIF block
/// (a complete TIFF structure after `Exif\0\0`) is consulted.
fn read_jpeg_density(data: &[u8]) -> Option<Resolution> {
    let mut exif = None;
    let mut pos = 2;

    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            pos += 1;
            continue;
        }
        let marker = data[pos + 1];
        // SOS (0xDA) means entropy-coded data starts; EOI ends the file
        if marker == 0xDA || marker == 0xD9 {
            break;
        }
        // Markers without a length field
        if marker == 0x01 || marker == 0xFF || (0xD0..=0xD7).contains(&marker) {
            pos += if marker == 0xFF { 1 } else { 2 };
            continue;
        }

        let seg_len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        let seg_start = pos + 4;
        let seg_end = (pos + 2 + seg_len).min(data.len());
        if seg_len < 2 || seg_start > seg_end {
            break;
        }
        let segment = &data[seg_start..seg_end];

        match marker {
            0xE0 => {
                if let Some(res) = jfif_density(segment) {
                    return Some(res);
                }
            }
            0xE1 if exif.is_none() && segment.starts_with(EXIF_HEADER) => {
                exif = Some(&segment[EXIF_HEADER.len()..]);
            }
            _ => {}
        }

        pos = seg_end;
    }

    exif.and_then(read_tiff_resolution)
}

/// JFIF APP0 body: "JFIF\0", version (2), units (1), Xdensity (u16 BE),
/// Ydensity (u16 BE). Units: 0 = aspect only, 1 = per inch, 2 = per cm.
fn jfif_density(segment: &[u8]) -> Option<Resolution> {
    if !segment.starts_with(JFIF_HEADER) || segment.len() < 12 {
        return None;
    }
    let units = segment[7];
    let y_density = u16::from_be_bytes([segment[10], segment[11]]) as f64;
    match units {
        1 => positive(y_density, LengthUnit::Inch),
        2 => positive(y_density, LengthUnit::Centimeter),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// TIFF: YResolution + ResolutionUnit from IFD0
// ---------------------------------------------------------------------------

/// Read YResolution and ResolutionUnit from the first IFD.
///
/// ResolutionUnit: 1 = none, 2 = inch (the TIFF default when the tag is
/// absent), 3 = centimeter.
fn read_tiff_resolution(data: &[u8]) -> Option<Resolution> {
    if data.len() < 8 {
        return None;
    }

    let big_endian = match &data[0..2] {
        b"MM" => true,
        b"II" => false,
        _ => return None,
    };

    let read_u16 = |offset: usize| -> Option<u16> {
        let b = data.get(offset..offset + 2)?;
        Some(if big_endian {
            u16::from_be_bytes([b[0], b[1]])
        } else {
            u16::from_le_bytes([b[0], b[1]])
        })
    };

    let read_u32 = |offset: usize| -> Option<u32> {
        let b = data.get(offset..offset + 4)?;
        Some(if big_endian {
            u32::from_be_bytes([b[0], b[1], b[2], b[3]])
        } else {
            u32::from_le_bytes([b[0], b[1], b[2], b[3]])
        })
    };

    // TIFF magic (42)
    if read_u16(2)? != 42 {
        return None;
    }

    let ifd_offset = read_u32(4)? as usize;
    let entry_count = read_u16(ifd_offset)? as usize;
    let entries_start = ifd_offset + 2;

    let mut y_resolution = None;
    let mut unit = 2u16;

    for i in 0..entry_count {
        let entry = entries_start + i * 12;
        let tag = read_u16(entry)?;
        let typ = read_u16(entry + 2)?;

        match tag {
            // RATIONAL (5): value field holds an offset to numerator + denominator
            TAG_Y_RESOLUTION if typ == 5 => {
                let value_offset = read_u32(entry + 8)? as usize;
                let numerator = read_u32(value_offset)?;
                let denominator = read_u32(value_offset + 4)?;
                if denominator != 0 {
                    y_resolution = Some(numerator as f64 / denominator as f64);
                }
            }
            // SHORT (3): value stored inline in the first two bytes
            TAG_RESOLUTION_UNIT if typ == 3 => {
                unit = read_u16(entry + 8)?;
            }
            _ => {}
        }
    }

    let value = y_resolution?;
    match unit {
        2 => positive(value, LengthUnit::Inch),
        3 => positive(value, LengthUnit::Centimeter),
        _ => None,
    }
}
