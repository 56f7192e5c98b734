use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    pub fn from_str(s: &str) -> Option<Self> {
        let b = s.as_bytes();
        if b.len() == 4 {
            Some(FourCC([b[0], b[1], b[2], b[3]]))
        } else { None }
    }
    pub fn as_str_lossy(&self) -> String {
        self.0.iter().map(|&c| if (32..=126).contains(&c) { c as char } else { '.' })
            .collect()
    }
}
impl fmt::Debug for FourCC { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str_lossy()) } }
impl fmt::Display for FourCC { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str_lossy()) } }

/// How the size of a box was encoded on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeKind {
    /// 32-bit size field.
    Compact,
    /// `size == 1`, followed by a 64-bit size.
    Large,
    /// `size == 0`, the box runs to the end of its enclosing region.
    ToEnd,
}

/// A box header with the size variant already normalized.
///
/// `size` is always the real total size (header included), even for
/// [`SizeKind::ToEnd`] boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxHeader {
    pub size: u64,
    pub typ: FourCC,
    pub header_size: u64, // 8 or 16
    pub start: u64,       // offset of the header
    pub size_kind: SizeKind,
}

impl BoxHeader {
    pub fn payload_offset(&self) -> u64 {
        self.start + self.header_size
    }

    pub fn payload_size(&self) -> u64 {
        self.size - self.header_size
    }

    pub fn end(&self) -> u64 {
        self.start + self.size
    }
}
