#![cfg(feature = "derive")]

use std::io::Cursor;

use decant::{Decode, ErrorKind, Registry, SourceError, source::binary::BinarySource};

#[derive(Debug, PartialEq, Decode)]
struct Integers {
    int8: i8,
    int16: i16,
    int32: i32,
    int64: i64,

    uint8: u8,
    uint16: u16,
    uint32: u32,
    uint64: u64,
}

#[test]
fn decode_sized_integers() {
    let bytes: Vec<u8> = (0..=255).collect();
    let source = BinarySource::new(Cursor::new(bytes));

    let parsed: Integers = Registry::new().decode_new(&source).unwrap();
    assert_eq!(
        parsed,
        Integers {
            int8: 0,
            int16: 0x0201,
            int32: 0x06050403,
            int64: 0x0e0d0c0b0a090807,

            uint8: 0x0f,
            uint16: 0x1110,
            uint32: 0x15141312,
            uint64: 0x1d1c1b1a19181716,
        }
    );

    assert_eq!(source.position(), 30);
}

#[test]
fn decode_consecutive_values() {
    let bytes: Vec<u8> = (0..=255).collect();
    let source = BinarySource::new(Cursor::new(bytes));
    let registry = Registry::new();

    let first: [u8; 4] = registry.decode_new(&source).unwrap();
    let second: u16 = registry.decode_new(&source).unwrap();

    assert_eq!(first, [0, 1, 2, 3]);
    assert_eq!(second, 0x0504);
    assert_eq!(source.position(), 6);
}

#[derive(Debug, PartialEq, Decode)]
struct BitmapFileHeader {
    signature: [u8; 2],
    file_size: u32,
    reserved1: u16,
    reserved2: u16,
    pixel_array_offset: u32,
}

#[derive(Debug, PartialEq, Decode)]
struct BitmapInfoHeader {
    header_size: u32,
    width: i32,
    height: i32,
    planes: u16,
    bits_per_pixel: u16,
    compression: u32,
    image_size: u32,
    x_pixels_per_meter: i32,
    y_pixels_per_meter: i32,
    colors_used: u32,
    important_colors: u32,
}

#[derive(Debug, PartialEq, Decode)]
struct BitmapHeader {
    file: BitmapFileHeader,
    info: BitmapInfoHeader,
}

static BITMAP: [u8; 54] = [
    0x42, 0x4d, 0xc6, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x8a, 0x00, 0x00, 0x00, 0x7c, 0x00,
    0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0x05, 0x00, 0x00, 0x00, 0x01, 0x00, 0x18, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x3c, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

#[test]
fn decode_bitmap_header() {
    let source = BinarySource::new(&BITMAP[..]);
    let parsed: BitmapHeader = Registry::new().decode_new(&source).unwrap();

    assert_eq!(
        parsed,
        BitmapHeader {
            file: BitmapFileHeader {
                signature: *b"BM",
                file_size: 198,
                reserved1: 0,
                reserved2: 0,
                pixel_array_offset: 138,
            },
            info: BitmapInfoHeader {
                header_size: 124,
                width: 3,
                height: 5,
                planes: 1,
                bits_per_pixel: 24,
                compression: 0,
                image_size: 60,
                x_pixels_per_meter: 0,
                y_pixels_per_meter: 0,
                colors_used: 0,
                important_colors: 0,
            },
        }
    );

    assert_eq!(source.position(), BITMAP.len());
}

#[derive(Debug, PartialEq, Decode)]
struct Message {
    name: String,
    urgent: bool,
    weight: f32,
    ratio: f64,
}

#[test]
fn decode_strings_bools_and_floats() {
    let mut bytes = Vec::new();
    bytes.extend(5i32.to_le_bytes());
    bytes.extend(b"hello");
    bytes.push(1);
    bytes.extend(1.5f32.to_le_bytes());
    bytes.extend((-0.25f64).to_le_bytes());

    let source = BinarySource::new(&bytes[..]);
    let message: Message = Registry::new().decode_new(&source).unwrap();

    assert_eq!(
        message,
        Message {
            name: "hello".into(),
            urgent: true,
            weight: 1.5,
            ratio: -0.25,
        }
    );
    assert_eq!(source.position(), bytes.len());
}

#[test]
fn truncated_stream_fails() {
    let bytes: [u8; 3] = [0x01, 0x02, 0x03];
    let source = BinarySource::new(&bytes[..]);
    let err = Registry::new().decode_new::<Integers>(&source).unwrap_err();

    let ErrorKind::Scalar { source, .. } = err.kind() else {
        panic!("unexpected error: {err}");
    };
    assert!(matches!(source, SourceError::Io(_)));
    assert_eq!(err.path().count(), 1);
    assert_eq!(err.to_string().split('`').nth(1), Some("int32"));
}

#[test]
fn negative_string_length_fails() {
    let bytes = (-1i32).to_le_bytes();
    let source = BinarySource::new(&bytes[..]);
    let err = Registry::new().decode_new::<String>(&source).unwrap_err();

    assert!(matches!(
        err.kind(),
        ErrorKind::Scalar {
            source: SourceError::OutOfRange { .. },
            ..
        }
    ));
}

#[test]
fn failed_read_counts_consumed_bytes() {
    let bytes: [u8; 2] = [0x01, 0x02];
    let source = BinarySource::new(&bytes[..]);
    let err = Registry::new().decode_new::<u32>(&source).unwrap_err();

    assert!(matches!(
        err.kind(),
        ErrorKind::Scalar {
            source: SourceError::Io(_),
            ..
        }
    ));
    assert_eq!(source.position(), 2);
}

#[test]
fn string_shorter_than_its_length_fails() {
    let mut bytes = Vec::new();
    bytes.extend(i32::MAX.to_le_bytes());
    bytes.extend(b"abc");

    let source = BinarySource::new(&bytes[..]);
    let err = Registry::new().decode_new::<String>(&source).unwrap_err();

    assert!(matches!(
        err.kind(),
        ErrorKind::Scalar {
            source: SourceError::Io(_),
            ..
        }
    ));
    assert_eq!(source.position(), 7);
}

#[test]
fn remaining_bytes_stay_in_reader() {
    let bytes: Vec<u8> = (0..8).collect();
    let source = BinarySource::new(Cursor::new(bytes));

    let header: [u16; 2] = Registry::new().decode_new(&source).unwrap();
    assert_eq!(header, [0x0100, 0x0302]);

    let reader = source.into_inner();
    assert_eq!(reader.position(), 4);
    assert_eq!(&reader.get_ref()[4..], [4, 5, 6, 7]);
}
