use bytes::Bytes;
use core_tags::{render_frames, render_legacy, PictureBlock, SourceTags, TagMapper, LEGACY_TAG_LEN};

fn full_source_tags() -> SourceTags {
    let mut tags = SourceTags::new();
    tags.insert("TITLE", "Integration Piece");
    tags.insert("ARTIST", "The Integrators");
    tags.insert("ALBUM", "Coverage");
    tags.insert("GENRE", "Jazz");
    tags.insert("DATE", "2021");
    tags.insert("DESCRIPTION", "a comment");
    tags.insert("COMPOSER", "I. Writer");
    tags.insert("TRACKNUMBER", "3");
    tags.insert("TRACKTOTAL", "12");
    tags.insert("DISCNUMBER", "1");
    tags.set_picture(PictureBlock {
        media_type: "image/jpeg".to_string(),
        picture_type: 3,
        description: "cover".to_string(),
        data: Bytes::from_static(&[0xFF, 0xD8, 0xFF, 0xE0]),
    });
    tags
}

#[test]
fn map_and_render_both_forms() {
    let tags = full_source_tags();
    let id3 = TagMapper::map(&tags, 180_000);

    let header = render_frames(&id3).expect("header render");
    assert_eq!(&header[0..3], b"ID3");
    // The raw picture bytes must appear in the rendered output unmodified.
    assert!(header
        .windows(4)
        .any(|w| w == [0xFF, 0xD8, 0xFF, 0xE0]));

    let trailer = render_legacy(&tags);
    assert_eq!(trailer.len(), LEGACY_TAG_LEN);
    assert_eq!(&trailer[0..3], b"TAG");
    assert_eq!(trailer[126], 3);
}

#[test]
fn rendering_is_deterministic() {
    let tags = full_source_tags();
    let a = render_frames(&TagMapper::map(&tags, 180_000)).unwrap();
    let b = render_frames(&TagMapper::map(&tags, 180_000)).unwrap();
    assert_eq!(a, b);
    assert_eq!(render_legacy(&tags), render_legacy(&tags));
}
