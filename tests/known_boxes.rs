use takeexport::boxes::FourCC;
use takeexport::known_boxes::KnownBox;

#[test]
fn known_box_from_tkhd() {
    let kb = KnownBox::from(FourCC(*b"tkhd"));
    assert!(matches!(kb, KnownBox::Tkhd));
    assert_eq!(kb.full_name(), "Track Header Box");
}

#[test]
fn only_five_containers_are_descended() {
    for tag in [b"moov", b"trak", b"mdia", b"minf", b"stbl"] {
        assert!(KnownBox::from(FourCC(*tag)).is_container(), "{tag:?}");
    }
    for tag in [b"edts", b"udta", b"moof", b"meta", b"dinf", b"tkhd", b"mdat"] {
        assert!(!KnownBox::from(FourCC(*tag)).is_container(), "{tag:?}");
    }
}

#[test]
fn unknown_tags_keep_their_fourcc() {
    let cc = FourCC(*b"wide");
    assert_eq!(KnownBox::from(cc), KnownBox::Other(cc));
    assert_eq!(KnownBox::from(cc).full_name(), "Unknown Box");
}
