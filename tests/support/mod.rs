//! Byte-level builders for small but well-formed MP4 fixtures.
#![allow(dead_code)]

pub fn boxed(typ: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(&((payload.len() + 8) as u32).to_be_bytes());
    v.extend_from_slice(typ);
    v.extend_from_slice(payload);
    v
}

/// `size == 1` with the real size in a trailing 64-bit field.
pub fn large_boxed(typ: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(&1u32.to_be_bytes());
    v.extend_from_slice(typ);
    v.extend_from_slice(&((payload.len() + 16) as u64).to_be_bytes());
    v.extend_from_slice(payload);
    v
}

/// `size == 0`: runs to the end of whatever encloses it.
pub fn to_end_boxed(typ: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(&0u32.to_be_bytes());
    v.extend_from_slice(typ);
    v.extend_from_slice(payload);
    v
}

fn time_len(version: u8) -> usize {
    if version == 1 { 8 } else { 4 }
}

pub fn tkhd_with_raw(version: u8, raw_width: u32, raw_height: u32) -> Vec<u8> {
    let t = time_len(version);
    let mut p = vec![version, 0, 0, 7];
    p.extend(vec![0u8; 2 * t]); // creation, modification
    p.extend_from_slice(&1u32.to_be_bytes()); // track_id
    p.extend_from_slice(&[0u8; 4]); // reserved
    p.extend(vec![0u8; t]); // duration
    p.extend_from_slice(&[0u8; 8]); // reserved
    p.extend_from_slice(&[0u8; 8]); // layer, alternate_group, volume, reserved
    p.extend_from_slice(&[0u8; 36]); // matrix
    p.extend_from_slice(&raw_width.to_be_bytes());
    p.extend_from_slice(&raw_height.to_be_bytes());
    boxed(b"tkhd", &p)
}

pub fn tkhd(version: u8, width: u32, height: u32) -> Vec<u8> {
    tkhd_with_raw(version, width << 16, height << 16)
}

pub fn mdhd(version: u8, timescale: u32) -> Vec<u8> {
    let t = time_len(version);
    let mut p = vec![version, 0, 0, 0];
    p.extend(vec![0u8; 2 * t]);
    p.extend_from_slice(&timescale.to_be_bytes());
    p.extend(vec![0u8; t]); // duration
    p.extend_from_slice(&[0x55, 0xc4, 0, 0]); // language "und", pre_defined
    boxed(b"mdhd", &p)
}

pub fn hdlr(handler: &[u8; 4]) -> Vec<u8> {
    let mut p = vec![0u8; 4];
    p.extend_from_slice(&[0u8; 4]); // pre_defined
    p.extend_from_slice(handler);
    p.extend_from_slice(&[0u8; 12]);
    p.extend_from_slice(b"Handler\0");
    boxed(b"hdlr", &p)
}

pub fn stts(entries: &[(u32, u32)]) -> Vec<u8> {
    let mut p = vec![0u8; 4];
    p.extend_from_slice(&(entries.len() as u32).to_be_bytes());
    for (count, delta) in entries {
        p.extend_from_slice(&count.to_be_bytes());
        p.extend_from_slice(&delta.to_be_bytes());
    }
    boxed(b"stts", &p)
}

pub fn concat(parts: &[Vec<u8>]) -> Vec<u8> {
    parts.concat()
}

pub fn trak(handler: Option<&[u8; 4]>, width: u32, height: u32, timescale: u32, delta: u32) -> Vec<u8> {
    let stbl = boxed(b"stbl", &stts(&[(120, delta)]));
    let minf = boxed(b"minf", &stbl);
    let mut mdia = mdhd(0, timescale);
    if let Some(h) = handler {
        mdia.extend(hdlr(h));
    }
    mdia.extend(minf);
    boxed(b"trak", &concat(&[tkhd(0, width, height), boxed(b"mdia", &mdia)]))
}

pub fn video_trak(width: u32, height: u32, timescale: u32, delta: u32) -> Vec<u8> {
    trak(Some(b"vide"), width, height, timescale, delta)
}

pub fn ftyp() -> Vec<u8> {
    let mut p = Vec::new();
    p.extend_from_slice(b"isom");
    p.extend_from_slice(&512u32.to_be_bytes());
    p.extend_from_slice(b"isomavc1");
    boxed(b"ftyp", &p)
}

pub fn moov(traks: &[Vec<u8>]) -> Vec<u8> {
    let mvhd = boxed(b"mvhd", &[0u8; 100]);
    let mut payload = mvhd;
    for t in traks {
        payload.extend_from_slice(t);
    }
    boxed(b"moov", &payload)
}

pub fn mdat(len: usize) -> Vec<u8> {
    boxed(b"mdat", &vec![0xabu8; len])
}

/// ftyp, moov, mdat: a 1280x720 clip at 24000/1001.
pub fn faststart_clip() -> Vec<u8> {
    concat(&[ftyp(), moov(&[video_trak(1280, 720, 24000, 1001)]), mdat(256)])
}
