//! Field layouts of the FullBox payloads the walker reads.
//!
//! Offsets are derived from named field widths rather than written as
//! literals, so the version 0 / version 1 split lives in one place:
//! [`FullBoxVersion::time_field_len`].

use crate::boxes::{BoxHeader, FourCC};
use crate::parser::{ParseError, Result};
use byteorder::{BigEndian, ReadBytesExt};
use std::io::{Read, Seek, SeekFrom};

/// version (1 byte) + flags (3 bytes)
pub const VERSION_AND_FLAGS_LEN: u64 = 4;

/// Header version of a FullBox whose time fields widen in version 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullBoxVersion {
    V0,
    V1,
}

impl FullBoxVersion {
    pub fn from_byte(typ: FourCC, version: u8) -> Result<Self> {
        match version {
            0 => Ok(FullBoxVersion::V0),
            1 => Ok(FullBoxVersion::V1),
            _ => Err(ParseError::UnsupportedVersion { typ, version }),
        }
    }

    /// Width of creation_time, modification_time and duration.
    pub const fn time_field_len(self) -> u64 {
        match self {
            FullBoxVersion::V0 => 4,
            FullBoxVersion::V1 => 8,
        }
    }
}

/// `tkhd`: track header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TkhdLayout {
    pub version: FullBoxVersion,
}

impl TkhdLayout {
    const TRACK_ID_LEN: u64 = 4;
    const RESERVED_AFTER_ID_LEN: u64 = 4;
    const RESERVED_AFTER_DURATION_LEN: u64 = 8;
    // layer, alternate_group, volume, reserved: 2 bytes each
    const LAYER_GROUP_VOLUME_LEN: u64 = 8;
    const MATRIX_LEN: u64 = 36;
    const DIMENSIONS_LEN: u64 = 8;

    pub const fn new(version: FullBoxVersion) -> Self {
        Self { version }
    }

    /// Offset of the 16.16 width, from payload start. Height follows at +4.
    pub const fn dimensions_offset(&self) -> u64 {
        let t = self.version.time_field_len();
        VERSION_AND_FLAGS_LEN
            + t // creation_time
            + t // modification_time
            + Self::TRACK_ID_LEN
            + Self::RESERVED_AFTER_ID_LEN
            + t // duration
            + Self::RESERVED_AFTER_DURATION_LEN
            + Self::LAYER_GROUP_VOLUME_LEN
            + Self::MATRIX_LEN
    }

    pub const fn min_len(&self) -> u64 {
        self.dimensions_offset() + Self::DIMENSIONS_LEN
    }
}

/// `mdhd`: media header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MdhdLayout {
    pub version: FullBoxVersion,
}

impl MdhdLayout {
    const TIMESCALE_LEN: u64 = 4;

    pub const fn new(version: FullBoxVersion) -> Self {
        Self { version }
    }

    pub const fn timescale_offset(&self) -> u64 {
        VERSION_AND_FLAGS_LEN + 2 * self.version.time_field_len()
    }

    pub const fn min_len(&self) -> u64 {
        self.timescale_offset() + Self::TIMESCALE_LEN
    }
}

/// `stts`: decoding time to sample. Only the first entry is ever read.
pub struct SttsLayout;

impl SttsLayout {
    pub const ENTRY_COUNT_OFFSET: u64 = VERSION_AND_FLAGS_LEN;
    pub const FIRST_ENTRY_OFFSET: u64 = Self::ENTRY_COUNT_OFFSET + 4;
    // sample_count (4) + sample_delta (4)
    pub const ENTRY_LEN: u64 = 8;
}

/// `hdlr`: handler reference.
pub struct HdlrLayout;

impl HdlrLayout {
    // skips pre_defined
    pub const HANDLER_TYPE_OFFSET: u64 = VERSION_AND_FLAGS_LEN + 4;
    pub const MIN_LEN: u64 = Self::HANDLER_TYPE_OFFSET + 4;
}

/// Integral part of a 16.16 fixed-point number.
pub const fn fixed_16_16_integer(raw: u32) -> u32 {
    raw >> 16
}

fn require_len(hdr: &BoxHeader, need: u64) -> Result<()> {
    let have = hdr.payload_size();
    if have < need {
        return Err(ParseError::Truncated { typ: hdr.typ, need, have });
    }
    Ok(())
}

fn read_version<R: Read + Seek>(r: &mut R, hdr: &BoxHeader) -> Result<FullBoxVersion> {
    require_len(hdr, VERSION_AND_FLAGS_LEN)?;
    r.seek(SeekFrom::Start(hdr.payload_offset()))?;
    FullBoxVersion::from_byte(hdr.typ, r.read_u8()?)
}

/// Integral (width, height) of a `tkhd` box.
pub fn read_tkhd_dimensions<R: Read + Seek>(r: &mut R, hdr: &BoxHeader) -> Result<(u32, u32)> {
    let layout = TkhdLayout::new(read_version(r, hdr)?);
    require_len(hdr, layout.min_len())?;
    r.seek(SeekFrom::Start(hdr.payload_offset() + layout.dimensions_offset()))?;
    let width = r.read_u32::<BigEndian>()?;
    let height = r.read_u32::<BigEndian>()?;
    Ok((fixed_16_16_integer(width), fixed_16_16_integer(height)))
}

pub fn read_mdhd_timescale<R: Read + Seek>(r: &mut R, hdr: &BoxHeader) -> Result<u32> {
    let layout = MdhdLayout::new(read_version(r, hdr)?);
    require_len(hdr, layout.min_len())?;
    r.seek(SeekFrom::Start(hdr.payload_offset() + layout.timescale_offset()))?;
    Ok(r.read_u32::<BigEndian>()?)
}

/// `sample_delta` of the first `stts` entry, or `None` for an empty table.
pub fn read_first_sample_delta<R: Read + Seek>(r: &mut R, hdr: &BoxHeader) -> Result<Option<u32>> {
    require_len(hdr, SttsLayout::FIRST_ENTRY_OFFSET)?;
    r.seek(SeekFrom::Start(hdr.payload_offset() + SttsLayout::ENTRY_COUNT_OFFSET))?;
    let entry_count = r.read_u32::<BigEndian>()?;
    if entry_count == 0 {
        return Ok(None);
    }
    require_len(hdr, SttsLayout::FIRST_ENTRY_OFFSET + SttsLayout::ENTRY_LEN)?;
    let _sample_count = r.read_u32::<BigEndian>()?;
    Ok(Some(r.read_u32::<BigEndian>()?))
}

pub fn read_handler_type<R: Read + Seek>(r: &mut R, hdr: &BoxHeader) -> Result<FourCC> {
    require_len(hdr, HdlrLayout::MIN_LEN)?;
    r.seek(SeekFrom::Start(hdr.payload_offset() + HdlrLayout::HANDLER_TYPE_OFFSET))?;
    let mut typ = [0u8; 4];
    r.read_exact(&mut typ)?;
    Ok(FourCC(typ))
}
