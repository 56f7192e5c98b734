use std::io::Cursor;
use takeexport::parser::ParseError;
use takeexport::walker::{RatePair, WalkOutcome, walk, walk_stream};

mod support;
use support::*;

fn walk_bytes(data: Vec<u8>) -> takeexport::WalkReport {
    walk_stream(&mut Cursor::new(data))
}

const NTSC_FILM: RatePair = RatePair { timescale: 24000, sample_delta: 1001 };

#[test]
fn faststart_file_yields_everything() {
    let report = walk_bytes(faststart_clip());
    assert!(report.error.is_none(), "{:?}", report.error);
    assert_eq!(
        report.outcome,
        WalkOutcome { width: Some(1280), height: Some(720), rate: Some(NTSC_FILM) }
    );
}

#[test]
fn moov_after_mdat_is_found() {
    let data = concat(&[ftyp(), mdat(4096), moov(&[video_trak(1920, 1080, 2400, 100)])]);
    let report = walk_bytes(data);
    assert!(report.error.is_none());
    assert_eq!(report.outcome.width, Some(1920));
    assert_eq!(report.outcome.rate, Some(RatePair { timescale: 2400, sample_delta: 100 }));
}

#[test]
fn large_mdat_before_moov_is_skipped_exactly() {
    let data = concat(&[
        ftyp(),
        large_boxed(b"mdat", &[0u8; 1000]),
        moov(&[video_trak(1280, 720, 24000, 1001)]),
    ]);
    let report = walk_bytes(data);
    assert!(report.error.is_none());
    assert!(report.outcome.is_complete());
}

#[test]
fn zero_size_mdat_at_end_consumes_remainder() {
    let data = concat(&[ftyp(), moov(&[video_trak(640, 480, 30000, 1001)]), to_end_boxed(b"mdat", &[1u8; 77])]);
    let report = walk_bytes(data);
    assert!(report.error.is_none());
    assert_eq!(report.outcome.width, Some(640));
}

#[test]
fn zero_size_box_inside_parent_stops_at_parent_end() {
    // a rate-less track keeps the walk going into the size-0 `free`,
    // which must end with `moov` so the top-level mdat is still seen
    let trak = boxed(b"trak", &tkhd(0, 1280, 720));
    let moov_payload = concat(&[trak, to_end_boxed(b"free", &[0u8; 5])]);
    let data = concat(&[ftyp(), boxed(b"moov", &moov_payload), mdat(16)]);
    let report = walk_bytes(data);
    assert!(report.error.is_none(), "{:?}", report.error);
    assert_eq!(report.outcome.width, Some(1280));
    assert_eq!(report.outcome.rate, None);
}

#[test]
fn tkhd_versions_decode_the_same_dimensions() {
    for version in [0u8, 1] {
        let trak = boxed(b"trak", &tkhd_with_raw(version, 0x0500_0000, 0x02D0_0000));
        let report = walk_bytes(moov(&[trak]));
        assert!(report.error.is_none(), "v{version}: {:?}", report.error);
        assert_eq!(report.outcome.width, Some(1280), "v{version}");
        assert_eq!(report.outcome.height, Some(720), "v{version}");
    }
}

#[test]
fn fractional_dimensions_are_truncated() {
    let trak = boxed(b"trak", &tkhd_with_raw(0, 0x0500_8000, 0x02D0_FFFF));
    let report = walk_bytes(moov(&[trak]));
    assert_eq!((report.outcome.width, report.outcome.height), (Some(1280), Some(720)));
}

#[test]
fn mdhd_version_one_timescale() {
    let mdia = boxed(b"mdia", &concat(&[mdhd(1, 90000), boxed(b"minf", &boxed(b"stbl", &stts(&[(10, 3000)])))]));
    let trak = boxed(b"trak", &concat(&[tkhd(1, 1280, 720), mdia]));
    let report = walk_bytes(moov(&[trak]));
    assert!(report.error.is_none());
    assert_eq!(report.outcome.rate, Some(RatePair { timescale: 90000, sample_delta: 3000 }));
}

#[test]
fn only_first_stts_entry_is_used() {
    let stbl = boxed(b"stbl", &stts(&[(100, 512), (1, 1024), (5, 256)]));
    let mdia = boxed(b"mdia", &concat(&[mdhd(0, 12800), boxed(b"minf", &stbl)]));
    let trak = boxed(b"trak", &concat(&[tkhd(0, 1280, 720), mdia]));
    let report = walk_bytes(moov(&[trak]));
    assert_eq!(report.outcome.rate, Some(RatePair { timescale: 12800, sample_delta: 512 }));
}

#[test]
fn audio_track_first_does_not_set_format() {
    let audio = trak(Some(b"soun"), 0, 0, 48000, 1024);
    let video = video_trak(1920, 1080, 25, 1);
    let report = walk_bytes(concat(&[ftyp(), moov(&[audio, video])]));
    assert!(report.error.is_none());
    assert_eq!(report.outcome.width, Some(1920));
    assert_eq!(report.outcome.rate, Some(RatePair { timescale: 25, sample_delta: 1 }));
}

#[test]
fn track_without_handler_is_accepted() {
    let report = walk_bytes(moov(&[trak(None, 1280, 720, 2500, 100)]));
    assert!(report.outcome.is_complete());
}

#[test]
fn first_track_wins() {
    let report = walk_bytes(moov(&[video_trak(1280, 720, 2400, 100), video_trak(3840, 2160, 6000, 100)]));
    assert_eq!(report.outcome.width, Some(1280));
    assert_eq!(report.outcome.rate, Some(RatePair { timescale: 2400, sample_delta: 100 }));
}

#[test]
fn walk_stops_once_complete() {
    // garbage after a complete track is never read
    let moov_payload = concat(&[video_trak(1280, 720, 24000, 1001), vec![0xff; 9]]);
    let report = walk_bytes(boxed(b"moov", &moov_payload));
    assert!(report.error.is_none());
    assert!(report.outcome.is_complete());
}

#[test]
fn unlisted_containers_are_not_descended() {
    // a tkhd hidden in `edts` must not be picked up
    let edts = boxed(b"edts", &tkhd(0, 111, 222));
    let trak = boxed(b"trak", &concat(&[edts, tkhd(0, 1280, 720)]));
    let report = walk_bytes(moov(&[trak]));
    assert_eq!(report.outcome.width, Some(1280));
}

#[test]
fn truncated_stts_keeps_dimensions() {
    // entry_count says 1 but the entry itself is missing
    let bad_stts = boxed(b"stts", &[0, 0, 0, 0, 0, 0, 0, 1]);
    let stbl = boxed(b"stbl", &bad_stts);
    let mdia = boxed(b"mdia", &concat(&[mdhd(0, 24000), boxed(b"minf", &stbl)]));
    let trak = boxed(b"trak", &concat(&[tkhd(0, 1280, 720), mdia]));
    let report = walk_bytes(moov(&[trak]));

    assert!(matches!(report.error, Some(ParseError::Truncated { .. })), "{:?}", report.error);
    assert_eq!(report.outcome.width, Some(1280));
    assert_eq!(report.outcome.height, Some(720));
    assert_eq!(report.outcome.rate, None);
}

#[test]
fn empty_stts_means_no_rate_but_no_error() {
    let stbl = boxed(b"stbl", &stts(&[]));
    let mdia = boxed(b"mdia", &concat(&[mdhd(0, 24000), boxed(b"minf", &stbl)]));
    let trak = boxed(b"trak", &concat(&[tkhd(0, 1280, 720), mdia]));
    let report = walk_bytes(moov(&[trak]));
    assert!(report.error.is_none());
    assert_eq!(report.outcome.rate, None);
}

#[test]
fn child_overrunning_parent_is_an_error() {
    // trak claims 64 bytes of payload but moov only holds 20
    let mut moov_payload = 72u32.to_be_bytes().to_vec();
    moov_payload.extend_from_slice(b"trak");
    moov_payload.extend_from_slice(&[0u8; 12]);
    let report = walk_bytes(boxed(b"moov", &moov_payload));
    assert!(matches!(report.error, Some(ParseError::Overrun { .. })));
    assert_eq!(report.outcome, WalkOutcome::default());
}

#[test]
fn short_form_size_below_eight_is_an_error() {
    let mut data = ftyp();
    data.extend_from_slice(&3u32.to_be_bytes());
    data.extend_from_slice(b"free");
    let report = walk_bytes(data);
    assert!(matches!(report.error, Some(ParseError::InvalidSize { size: 3, .. })));
}

#[test]
fn unsupported_version_is_an_error() {
    let trak = boxed(b"trak", &tkhd_with_raw(2, 0, 0));
    let report = walk_bytes(moov(&[trak]));
    assert!(matches!(report.error, Some(ParseError::UnsupportedVersion { version: 2, .. })));
}

#[test]
fn walk_honors_region_bounds() {
    // walk just the moov payload of a file, as a caller with known offsets would
    let data = concat(&[ftyp(), moov(&[video_trak(1280, 720, 24000, 1001)]), mdat(8)]);
    let moov_start = 24u64;
    let moov_len = u32::from_be_bytes(data[24..28].try_into().unwrap()) as u64;
    let report = walk(&mut Cursor::new(data), moov_start + 8, moov_len - 8);
    assert!(report.error.is_none());
    assert!(report.outcome.is_complete());
}
