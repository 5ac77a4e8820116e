//! End-to-end tests over real files on disk: write a stack with the
//! builder, read it back through the stack readers, and exercise the
//! folder adapter against an acquisition-style directory layout.

use std::fs::File;
use std::path::Path;

use tempfile::TempDir;

use stacktiff::stack::frame_file_name;
use stacktiff::{
    DecodedFrame, FolderReader, FrameLayout, FrameShape, SampleType, StackReader, TiffBuilder,
    TiffError,
};

fn gray_layout(height: usize, width: usize, dtype: SampleType) -> FrameLayout {
    FrameLayout {
        shape: FrameShape::Gray { height, width },
        dtype,
    }
}

/// Pixel buffer of consecutive u64 values, the pattern that exposes
/// truncation and reordering anywhere along the pipeline
fn arange_u64(count: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(count * 8);
    for i in 0..count as u64 {
        data.extend_from_slice(&i.to_ne_bytes());
    }
    data
}

#[test]
fn u64_frame_round_trips_exactly() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("arange.tif");

    let layout = gray_layout(100, 100, SampleType::U64);
    let data = arange_u64(10_000);

    let mut builder = TiffBuilder::new();
    builder.add_frame(layout, data.clone()).unwrap();
    builder.write(&path).unwrap();

    let mut reader = StackReader::open(&path).unwrap();
    assert_eq!(reader.length().unwrap(), 1);
    assert_eq!(reader.shape(), (100, 100));

    let frame = reader.get(0).unwrap();
    assert_eq!(frame.shape(), FrameShape::Gray { height: 100, width: 100 });
    assert_eq!(frame.dtype(), SampleType::U64);
    assert_eq!(frame.bytes(), &data[..]);

    let values = frame.as_u64().unwrap();
    assert_eq!(values.len(), 10_000);
    for (i, v) in values.iter().enumerate() {
        assert_eq!(*v, i as u64);
    }
}

#[test]
fn hundred_page_stack_navigates_correctly() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stack.tif");

    let layout = gray_layout(100, 512, SampleType::U16);
    let mut builder = TiffBuilder::new();
    for page in 0..100u16 {
        let mut data = Vec::with_capacity(layout.byte_len());
        for i in 0..100 * 512 {
            data.extend_from_slice(&(page.wrapping_mul(3).wrapping_add(i as u16)).to_ne_bytes());
        }
        builder.add_frame(layout, data).unwrap();
    }
    builder.write(&path).unwrap();

    let mut reader = StackReader::open(&path).unwrap();
    assert_eq!(reader.length().unwrap(), 100);
    assert_eq!(reader.shape(), (100, 512));

    let frame = reader.get(50).unwrap();
    assert_eq!(frame.shape(), FrameShape::Gray { height: 100, width: 512 });
    assert_eq!(frame.as_u16().unwrap()[0], 150);

    match reader.get(100) {
        Err(TiffError::DirectoryOutOfRange { index: 100, length: 100 }) => {}
        other => panic!("expected DirectoryOutOfRange, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn iteration_agrees_with_indexed_access() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("iter.tif");

    let layout = gray_layout(16, 16, SampleType::U8);
    let mut builder = TiffBuilder::new();
    for page in 0..12u8 {
        builder.add_frame(layout, vec![page; 256]).unwrap();
    }
    builder.write(&path).unwrap();

    let mut reader = StackReader::open(&path).unwrap();
    let iterated: Vec<DecodedFrame> = reader.frames().collect::<Result<_, _>>().unwrap();
    assert_eq!(iterated.len(), 12);

    for (i, frame) in iterated.iter().enumerate() {
        assert_eq!(*frame, reader.get(i).unwrap());
    }
}

#[test]
fn interleaved_frames_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("interleaved.tif");

    let layout = FrameLayout {
        shape: FrameShape::Interleaved { height: 20, width: 30, samples: 3 },
        dtype: SampleType::U8,
    };
    let data: Vec<u8> = (0..layout.byte_len()).map(|i| (i % 251) as u8).collect();

    let mut builder = TiffBuilder::new();
    builder.add_frame(layout, data.clone()).unwrap();
    builder.write(&path).unwrap();

    let mut reader = StackReader::open(&path).unwrap();
    let frame = reader.get(0).unwrap();
    assert_eq!(
        frame.shape(),
        FrameShape::Interleaved { height: 20, width: 30, samples: 3 }
    );
    assert_eq!(frame.bytes(), &data[..]);
}

#[test]
fn planar_frames_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("planar.tif");

    let layout = FrameLayout {
        shape: FrameShape::Planar { samples: 2, height: 20, width: 30 },
        dtype: SampleType::F32,
    };
    let mut data = Vec::with_capacity(layout.byte_len());
    for i in 0..layout.shape.sample_count() {
        data.extend_from_slice(&(i as f32 * 0.5).to_ne_bytes());
    }

    let mut builder = TiffBuilder::new();
    builder.add_frame(layout, data.clone()).unwrap();
    builder.write(&path).unwrap();

    let mut reader = StackReader::open(&path).unwrap();
    let frame = reader.get(0).unwrap();
    assert_eq!(
        frame.shape(),
        FrameShape::Planar { samples: 2, height: 20, width: 30 }
    );
    assert_eq!(frame.as_f32().unwrap()[3], 1.5);
    assert_eq!(frame.bytes(), &data[..]);
}

#[test]
fn multi_strip_files_read_back_whole() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("strips.tif");

    let layout = gray_layout(64, 48, SampleType::U16);
    let data: Vec<u8> = (0..layout.byte_len()).map(|i| (i % 241) as u8).collect();

    let mut builder = TiffBuilder::new().with_rows_per_strip(7);
    builder.add_frame(layout, data.clone()).unwrap();
    builder.write(&path).unwrap();

    let mut reader = StackReader::open(&path).unwrap();
    let frame = reader.get(0).unwrap();
    assert_eq!(frame.bytes(), &data[..]);
}

#[test]
fn missing_stack_file_is_not_found() {
    match StackReader::open("/no/such/stack.tif") {
        Err(TiffError::NotFound(_)) => {}
        other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
    }
}

/// Writes an acquisition-style folder: per-frame single-directory TIFFs
/// plus the .env descriptor the folder reader keys off
fn write_acquisition(dir: &Path, name: &str, channel: u32, frames: usize) {
    let layout = gray_layout(24, 32, SampleType::U16);
    for index in 0..frames {
        let mut data = Vec::with_capacity(layout.byte_len());
        for i in 0..24 * 32 {
            data.extend_from_slice(&((index * 100 + i % 50) as u16).to_ne_bytes());
        }

        let mut builder = TiffBuilder::new();
        builder.add_frame(layout, data).unwrap();
        builder.write(dir.join(frame_file_name(name, channel, index))).unwrap();
    }
    File::create(dir.join(format!("{}.env", name))).unwrap();
}

#[test]
fn folder_adapter_counts_and_reads_frames() {
    let dir = TempDir::new().unwrap();
    write_acquisition(dir.path(), "acq", 2, 50);

    let mut reader = FolderReader::open_from_acquisition(dir.path()).unwrap();
    assert_eq!(reader.acquisition_name(), "acq");
    assert_eq!(reader.channel(), 2);
    assert_eq!(reader.length(), 50);
    assert_eq!(reader.shape(), (24, 32));

    let frame = reader.get(49).unwrap();
    assert_eq!(frame.as_u16().unwrap()[0], 4900);

    match reader.get(50) {
        Err(TiffError::DirectoryOutOfRange { index: 50, length: 50 }) => {}
        other => panic!("expected DirectoryOutOfRange, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn folder_iteration_visits_every_frame_in_order() {
    let dir = TempDir::new().unwrap();
    write_acquisition(dir.path(), "scan", 1, 8);

    let mut reader = FolderReader::new(dir.path(), "scan", 1).unwrap();
    let frames: Vec<DecodedFrame> = reader.frames().collect::<Result<_, _>>().unwrap();
    assert_eq!(frames.len(), 8);

    for (index, frame) in frames.iter().enumerate() {
        assert_eq!(frame.as_u16().unwrap()[0], index as u16 * 100);
    }
}

#[test]
fn folder_reader_rejects_plain_files() {
    let dir = TempDir::new().unwrap();
    let file_path = dir.path().join("not_a_folder.tif");
    File::create(&file_path).unwrap();

    match FolderReader::open_from_acquisition(&file_path) {
        Err(TiffError::NotADirectory(_)) => {}
        other => panic!("expected NotADirectory, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn folder_reader_rejects_missing_paths() {
    match FolderReader::new("/no/such/folder", "acq", 1) {
        Err(TiffError::NotFound(_)) => {}
        other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn extracted_frame_round_trips_through_save() {
    let dir = TempDir::new().unwrap();
    let stack_path = dir.path().join("stack.tif");
    let frame_path = dir.path().join("frame.tif");

    let layout = gray_layout(10, 10, SampleType::I16);
    let mut data = Vec::with_capacity(layout.byte_len());
    for i in 0..100i16 {
        data.extend_from_slice(&(i - 50).to_ne_bytes());
    }

    let mut builder = TiffBuilder::new();
    builder.add_frame(layout, data).unwrap();
    builder.write(&stack_path).unwrap();

    let original = StackReader::open(&stack_path).unwrap().get(0).unwrap();
    stacktiff::save_frame(&frame_path, &original).unwrap();

    let reread = StackReader::open(&frame_path).unwrap().get(0).unwrap();
    assert_eq!(reread, original);
    assert_eq!(reread.as_i16().unwrap()[0], -50);
}
