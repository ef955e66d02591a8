//! Round-trip tests: bodies produced by the encoder must parse back to the
//! original fields and files.

#![allow(clippy::unwrap_used)]

use formpack_multipart::{
    Boundary, Field, FileAttachment, encode, encode_checked, encode_with_boundary, parse,
};
use proptest::prelude::*;

fn sample_fields() -> Vec<Field> {
    vec![
        Field::new("mode", "read_simplified"),
        Field::new("merge", "true"),
        Field::new("instructions", "Keep the header row.\r\nSkip totals."),
    ]
}

fn sample_files() -> Vec<FileAttachment> {
    vec![
        FileAttachment::new("files", "invoice.pdf", vec![0x25, 0x50, 0x44, 0x46, 0x00, 0xff])
            .with_content_type("application/pdf"),
        FileAttachment::new("files", "café \"menu\".png", vec![0x89, b'P', b'N', b'G'])
            .with_content_type("image/png"),
        FileAttachment::new("files", "raw", Vec::new()),
    ]
}

#[test]
fn test_roundtrip_recovers_everything() {
    let fields = sample_fields();
    let files = sample_files();

    let body = encode(&fields, &files);
    let parts = parse(body.bytes().clone(), body.content_type()).unwrap();

    assert_eq!(parts.len(), fields.len() + files.len());

    for (part, field) in parts.iter().zip(&fields) {
        assert_eq!(part.name, field.name);
        assert!(!part.is_file());
        assert_eq!(part.text().unwrap(), field.value);
    }

    for (part, file) in parts[fields.len()..].iter().zip(&files) {
        assert_eq!(part.name, file.field_name);
        assert_eq!(part.filename.as_deref(), Some(file.filename.as_str()));
        assert_eq!(part.content_type.as_deref(), Some(file.content_type()));
        assert_eq!(part.data, file.data);
    }
}

#[test]
fn test_default_content_type_roundtrip() {
    let files = [FileAttachment::new("files", "blob.xlsx", vec![1, 2, 3])];
    let body = encode(&[], &files);
    let parts = parse(body.bytes().clone(), body.content_type()).unwrap();
    assert_eq!(
        parts[0].content_type.as_deref(),
        Some("application/octet-stream")
    );
}

#[test]
fn test_checked_roundtrip() {
    let fields = sample_fields();
    let files = sample_files();
    let body = encode_checked(&fields, &files).unwrap();
    let parts = parse(body.bytes().clone(), body.content_type()).unwrap();
    assert_eq!(parts.len(), 6);
}

#[test]
fn test_only_boundary_differs_between_calls() {
    let fields = sample_fields();
    let files = sample_files();

    let a = encode(&fields, &files);
    let b = encode(&fields, &files);
    assert_ne!(a.boundary(), b.boundary());

    // Re-encoding with the first call's boundary reproduces it exactly.
    let again = encode_with_boundary(&fields, &files, a.boundary().clone());
    assert_eq!(a.bytes(), again.bytes());
    assert_eq!(a.content_type(), again.content_type());
}

fn filename_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[ -~]{1,40}",
        "[a-zA-Z0-9éüß€漢字 '\"\\\\._-]{1,20}",
    ]
}

proptest! {
    #[test]
    fn prop_roundtrip(
        values in proptest::collection::vec("[a-zA-Z0-9 .,:;!?éü\r\n]{0,64}", 0..4),
        payloads in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..512), 1..4),
        filename in filename_strategy(),
    ) {
        let fields: Vec<Field> = values
            .iter()
            .enumerate()
            .map(|(i, v)| Field::new(format!("field{i}"), v.clone()))
            .collect();
        let files: Vec<FileAttachment> = payloads
            .into_iter()
            .map(|data| FileAttachment::new("files", filename.clone(), data))
            .collect();

        let body = encode(&fields, &files);
        let parts = parse(body.bytes().clone(), body.content_type()).unwrap();

        prop_assert_eq!(parts.len(), fields.len() + files.len());
        for (part, field) in parts.iter().zip(&fields) {
            prop_assert_eq!(part.text().unwrap(), field.value.as_str());
        }
        for (part, file) in parts[fields.len()..].iter().zip(&files) {
            prop_assert_eq!(part.filename.as_deref(), Some(file.filename.as_str()));
            prop_assert_eq!(&part.data, &file.data);
        }
    }

    #[test]
    fn prop_deterministic_for_fixed_boundary(
        value in "[ -~]{0,64}",
        data in proptest::collection::vec(any::<u8>(), 0..256),
    ) {
        let fields = [Field::new("instructions", value)];
        let files = [FileAttachment::new("files", "data.csv", data)];
        let boundary = Boundary::new("fixedBoundary42").unwrap();

        let a = encode_with_boundary(&fields, &files, boundary.clone());
        let b = encode_with_boundary(&fields, &files, boundary);
        prop_assert_eq!(a, b);
    }
}
