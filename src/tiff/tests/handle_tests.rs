//! Tests for the TIFF handle: header parsing, tag access and the
//! directory cursor

use std::io::Cursor;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::tiff::constants::tags;
use crate::tiff::errors::TiffError;
use crate::tiff::handle::TiffHandle;
use crate::tiff::tests::test_utils::{
    build_big_endian_image, build_single_ifd, build_u8_stack, page_pixel,
    single_ifd_payload_offset, TestEntry,
};

#[test]
fn opens_and_reads_dimensions() {
    let mut handle = TiffHandle::from_reader(Box::new(build_u8_stack(1, 6, 9))).unwrap();
    assert_eq!(handle.dimensions().unwrap(), (6, 9));
    assert_eq!(handle.current_directory(), 0);
}

#[test]
fn missing_tag_is_none_for_get_field() {
    let mut handle = TiffHandle::from_reader(Box::new(build_u8_stack(1, 4, 4))).unwrap();
    assert_eq!(handle.get_field(tags::SAMPLE_FORMAT).unwrap(), None);
}

#[test]
fn missing_tag_is_an_error_for_get_field_values() {
    let mut handle = TiffHandle::from_reader(Box::new(build_u8_stack(1, 4, 4))).unwrap();
    match handle.get_field_values(tags::SAMPLE_FORMAT) {
        Err(TiffError::TagNotFound(tag)) => assert_eq!(tag, tags::SAMPLE_FORMAT),
        other => panic!("expected TagNotFound, got {:?}", other),
    }
}

#[test]
fn cursor_walks_the_directory_chain() {
    let mut handle = TiffHandle::from_reader(Box::new(build_u8_stack(3, 4, 4))).unwrap();

    assert!(!handle.is_last_directory());
    handle.advance_directory().unwrap();
    assert_eq!(handle.current_directory(), 1);
    handle.advance_directory().unwrap();
    assert_eq!(handle.current_directory(), 2);
    assert!(handle.is_last_directory());

    match handle.advance_directory() {
        Err(TiffError::DirectoryOutOfRange { index: 3, .. }) => {}
        other => panic!("expected DirectoryOutOfRange, got {:?}", other),
    }
}

#[test]
fn seek_is_random_access_in_both_directions() {
    let mut handle = TiffHandle::from_reader(Box::new(build_u8_stack(5, 4, 4))).unwrap();

    handle.seek_directory(4).unwrap();
    assert_eq!(handle.current_directory(), 4);
    assert!(handle.is_last_directory());

    handle.seek_directory(1).unwrap();
    assert_eq!(handle.current_directory(), 1);
    assert!(!handle.is_last_directory());
}

#[test]
fn seek_past_chain_end_fails() {
    let mut handle = TiffHandle::from_reader(Box::new(build_u8_stack(2, 4, 4))).unwrap();
    match handle.seek_directory(2) {
        Err(TiffError::DirectoryOutOfRange { index: 2, length: 2 }) => {}
        other => panic!("expected DirectoryOutOfRange, got {:?}", other),
    }
    // a failed seek leaves the cursor where it was
    assert_eq!(handle.current_directory(), 0);
}

#[test]
fn read_strip_returns_page_bytes() {
    let mut handle = TiffHandle::from_reader(Box::new(build_u8_stack(2, 3, 5))).unwrap();
    handle.seek_directory(1).unwrap();

    assert_eq!(handle.strip_count().unwrap(), 1);
    let bytes = handle.read_strip(0).unwrap();
    assert_eq!(bytes.len(), 15);
    for (i, &b) in bytes.iter().enumerate() {
        assert_eq!(b, page_pixel(1, i));
    }
}

#[test]
fn rejects_invalid_byte_order_marker() {
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x4242).unwrap();
    buffer.write_u16::<LittleEndian>(42).unwrap();
    buffer.write_u32::<LittleEndian>(8).unwrap();

    match TiffHandle::from_reader(Box::new(Cursor::new(buffer))) {
        Err(TiffError::InvalidByteOrder(0x4242)) => {}
        other => panic!("expected InvalidByteOrder, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn rejects_big_tiff_version() {
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x4949).unwrap();
    buffer.write_u16::<LittleEndian>(43).unwrap();
    buffer.write_u16::<LittleEndian>(8).unwrap();
    buffer.write_u16::<LittleEndian>(0).unwrap();
    buffer.write_u64::<LittleEndian>(16).unwrap();

    match TiffHandle::from_reader(Box::new(Cursor::new(buffer))) {
        Err(TiffError::UnsupportedVersion(43)) => {}
        other => panic!("expected UnsupportedVersion, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn rejects_first_offset_outside_file() {
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x4949).unwrap();
    buffer.write_u16::<LittleEndian>(42).unwrap();
    buffer.write_u32::<LittleEndian>(4096).unwrap();

    match TiffHandle::from_reader(Box::new(Cursor::new(buffer))) {
        Err(TiffError::InvalidHeader) => {}
        other => panic!("expected InvalidHeader, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn missing_file_is_not_found() {
    match TiffHandle::open("/definitely/not/here.tif") {
        Err(TiffError::NotFound(_)) => {}
        other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn reads_big_endian_files() {
    let mut handle = TiffHandle::from_reader(Box::new(build_big_endian_image(7, 11))).unwrap();
    assert_eq!(handle.dimensions().unwrap(), (7, 11));
}

#[test]
fn decodes_inline_short_arrays_under_big_endian() {
    // two SHORT values packed into the 4-byte value field; reading them
    // through the pre-decoded offset integer would yield garbage
    let mut handle = TiffHandle::from_reader(Box::new(build_big_endian_image(4, 4))).unwrap();

    assert_eq!(handle.get_field(tags::BITS_PER_SAMPLE).unwrap(), Some(16));
    assert_eq!(
        handle.get_field_values(tags::BITS_PER_SAMPLE).unwrap(),
        vec![16, 16]
    );
}

#[test]
fn reads_external_value_arrays() {
    // BitsPerSample with three SHORT values cannot fit inline
    let payload_offset = single_ifd_payload_offset(3);
    let mut payload = Vec::new();
    payload.write_u16::<LittleEndian>(16).unwrap();
    payload.write_u16::<LittleEndian>(16).unwrap();
    payload.write_u16::<LittleEndian>(16).unwrap();

    let entries = [
        TestEntry::long(256, 4),
        TestEntry::long(257, 4),
        TestEntry {
            tag: 258,
            field_type: 3,
            count: 3,
            value: payload_offset.to_le_bytes(),
        },
    ];

    let cursor = build_single_ifd(&entries, &payload);
    let mut handle = TiffHandle::from_reader(Box::new(cursor)).unwrap();
    assert_eq!(
        handle.get_field_values(tags::BITS_PER_SAMPLE).unwrap(),
        vec![16, 16, 16]
    );
}
