use crate::boxes::FourCC;

/// Typed view over the boxes the metadata walker understands.
///
/// Anything not in this list becomes `KnownBox::Other(fourcc)` and is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownBox {
    // containers
    Moov,
    Trak,
    Mdia,
    Minf,
    Stbl,

    // leaves with fields we decode
    Tkhd,
    Mdhd,
    Hdlr,
    Stts,

    Other(FourCC),
}

impl From<FourCC> for KnownBox {
    fn from(cc: FourCC) -> Self {
        match &cc.0 {
            b"moov" => KnownBox::Moov,
            b"trak" => KnownBox::Trak,
            b"mdia" => KnownBox::Mdia,
            b"minf" => KnownBox::Minf,
            b"stbl" => KnownBox::Stbl,
            b"tkhd" => KnownBox::Tkhd,
            b"mdhd" => KnownBox::Mdhd,
            b"hdlr" => KnownBox::Hdlr,
            b"stts" => KnownBox::Stts,
            _ => KnownBox::Other(cc),
        }
    }
}

impl KnownBox {
    pub fn full_name(&self) -> &'static str {
        match self {
            KnownBox::Moov => "Movie Box",
            KnownBox::Trak => "Track Box",
            KnownBox::Mdia => "Media Box",
            KnownBox::Minf => "Media Information Box",
            KnownBox::Stbl => "Sample Table Box",
            KnownBox::Tkhd => "Track Header Box",
            KnownBox::Mdhd => "Media Header Box",
            KnownBox::Hdlr => "Handler Reference Box",
            KnownBox::Stts => "Decoding Time to Sample Box",
            KnownBox::Other(_) => "Unknown Box",
        }
    }

    /// Only these five are descended into. Other ISO containers
    /// (`edts`, `udta`, `moof`, ...) are skipped whole.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            KnownBox::Moov | KnownBox::Trak | KnownBox::Mdia | KnownBox::Minf | KnownBox::Stbl
        )
    }
}
