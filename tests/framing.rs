//! Container framing through the public API.

use fasscope::{
    container::{ContainerKind, ContainerReader},
    Error, FormatError, Input,
};

fn frame(payload: &[u8], newline: &str) -> Vec<u8> {
    let mut data = format!("FAS4-FILE ; (c) test{newline}{}{newline}", payload.len()).into_bytes();
    data.extend_from_slice(payload);
    data
}

#[test]
fn framing_round_trip() {
    let payloads: [&[u8]; 5] = [
        b"",
        b"abcd",
        b"\r\n\r\n",
        &[0x00, 0xFF, 0x0A, 0x0D, 0x14],
        &[0x41; 4096],
    ];

    for payload in payloads {
        for newline in ["\n", "\r\n"] {
            let container = ContainerReader::default()
                .read(&frame(payload, newline))
                .unwrap();
            assert_eq!(container.kind(), ContainerKind::Framed);
            assert_eq!(container.declared_length(), payload.len());
            assert_eq!(container.payload(), payload);
        }
    }
}

#[test]
fn blank_line_before_size_is_tolerated() {
    let container = ContainerReader::default()
        .read(b"FAS4-FILE ; comment\r\n\r\n4\r\nabcd")
        .unwrap();
    assert_eq!(container.payload(), b"abcd");
}

#[test]
fn framing_failures() {
    let reader = ContainerReader::default();

    assert!(matches!(
        reader.read(b"no marker here"),
        Err(Error::Format(FormatError::MissingHeader))
    ));
    assert!(matches!(
        reader.read(b"FAS4-FILE ; comment\r\n"),
        Err(Error::Format(FormatError::MissingLength))
    ));
    assert!(matches!(
        reader.read(b"FAS4-FILE\r\nfour\r\nabcd"),
        Err(Error::Format(FormatError::MissingLength))
    ));
    assert!(matches!(
        reader.read(b"FAS4-FILE\r\n10\r\nabcd"),
        Err(Error::Format(FormatError::TruncatedPayload {
            declared: 10,
            available: 4
        }))
    ));
}

#[test]
fn legacy_payload_needs_no_envelope() {
    let mut data = b"FAS\0".to_vec();
    data.extend_from_slice(&1u32.to_le_bytes());
    let container = ContainerReader::default().read(&data).unwrap();
    assert_eq!(container.kind(), ContainerKind::Legacy);
    assert_eq!(container.payload(), data.as_slice());
}

#[test]
fn input_from_file() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&frame(b"abcd", "\r\n")).unwrap();
    file.flush().unwrap();

    let input = Input::from_file(file.path()).unwrap();
    let container = ContainerReader::default().read(input.data()).unwrap();
    assert_eq!(container.payload(), b"abcd");
}

#[test]
fn empty_file_is_rejected() {
    let file = tempfile::NamedTempFile::new().unwrap();
    assert!(matches!(Input::from_file(file.path()), Err(Error::Empty)));
}
