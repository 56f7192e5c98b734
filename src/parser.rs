use crate::boxes::{BoxHeader, FourCC, SizeKind};
use byteorder::{BigEndian, ReadBytesExt};
use std::io::{Read, Seek};

#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid size {size} for box `{typ}` at offset {offset}")]
    InvalidSize { typ: FourCC, offset: u64, size: u64 },
    #[error("box header at offset {offset} does not fit before region end {limit}")]
    HeaderOverrun { offset: u64, limit: u64 },
    #[error("box `{typ}` at offset {offset} ends past its region end {limit}")]
    Overrun { typ: FourCC, offset: u64, limit: u64 },
    #[error("unsupported `{typ}` version {version}")]
    UnsupportedVersion { typ: FourCC, version: u8 },
    #[error("`{typ}` payload too short: need {need} bytes, have {have}")]
    Truncated { typ: FourCC, need: u64, have: u64 },
}

pub type Result<T> = std::result::Result<T, ParseError>;

const COMPACT_HEADER: u64 = 8;
const LARGE_HEADER: u64 = 16;

/// Read the header of the box at the current position.
///
/// `region_end` is the end of the enclosing region (parent payload or file).
/// A header is rejected if it, or the box it declares, would reach past it.
pub fn read_box_header<R: Read + Seek>(r: &mut R, region_end: u64) -> Result<BoxHeader> {
    let start = r.stream_position()?;
    let available = region_end.saturating_sub(start);
    if available < COMPACT_HEADER {
        return Err(ParseError::HeaderOverrun { offset: start, limit: region_end });
    }

    let size32 = r.read_u32::<BigEndian>()?;
    let mut typ = [0u8; 4];
    r.read_exact(&mut typ)?;
    let typ = FourCC(typ);

    let (size, header_size, size_kind) = match size32 {
        0 => (available, COMPACT_HEADER, SizeKind::ToEnd),
        1 => {
            if available < LARGE_HEADER {
                return Err(ParseError::HeaderOverrun { offset: start, limit: region_end });
            }
            (r.read_u64::<BigEndian>()?, LARGE_HEADER, SizeKind::Large)
        }
        n => (n as u64, COMPACT_HEADER, SizeKind::Compact),
    };

    if size < header_size {
        return Err(ParseError::InvalidSize { typ, offset: start, size });
    }
    if size > available {
        return Err(ParseError::Overrun { typ, offset: start, limit: region_end });
    }

    Ok(BoxHeader { size, typ, header_size, start, size_kind })
}
