//! End-to-end tests for the command line front end.

#![allow(clippy::unwrap_used)]

use std::path::Path;

use clap::Parser;
use formpack::{Cli, prepare, run};

fn cli(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("formpack").chain(args.iter().copied())).unwrap()
}

fn write(dir: &Path, name: &str, contents: &[u8]) -> String {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_prepare_encodes_files_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write(dir.path(), "rates.csv", b"a,b\n");
    let pdf = write(dir.path(), "scan.pdf", b"%PDF-1.7");

    let args = [csv.as_str(), pdf.as_str(), "--mode", "read", "--merge"];
    let prepared = prepare(&cli(&args)).unwrap();
    let parts =
        formpack_multipart::parse(prepared.body.clone(), prepared.content_type().unwrap())
            .unwrap();

    let summary: Vec<_> = parts
        .iter()
        .map(|p| (p.name.as_str(), p.filename.as_deref()))
        .collect();
    assert_eq!(
        summary,
        [
            ("mode", None),
            ("merge", None),
            ("files", Some("rates.csv")),
            ("files", Some("scan.pdf")),
        ]
    );
    assert_eq!(parts[3].content_type.as_deref(), Some("application/pdf"));
}

#[test]
fn test_single_item_selection() {
    let dir = tempfile::tempdir().unwrap();
    let first = write(dir.path(), "one.png", b"1");
    let second = write(dir.path(), "two.png", b"2");

    let prepared = prepare(&cli(&[first.as_str(), second.as_str(), "--item", "1"])).unwrap();
    let parts =
        formpack_multipart::parse(prepared.body.clone(), prepared.content_type().unwrap())
            .unwrap();

    assert_eq!(parts.len(), 2);
    assert_eq!(parts[1].filename.as_deref(), Some("two.png"));
}

#[test]
fn test_policy_file_restricts_types() {
    let dir = tempfile::tempdir().unwrap();
    let policy = write(dir.path(), "policy.json", br#"{"allowed_types": ["csv"]}"#);
    let png = write(dir.path(), "photo.png", b"png");

    let err = prepare(&cli(&[png.as_str(), "--policy", policy.as_str()])).unwrap_err();
    let err = err.downcast::<formpack_core::Error>().unwrap();
    assert!(matches!(err, formpack_core::Error::UnsupportedFileType { .. }));
}

#[test]
fn test_table_requires_spreadsheet() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write(dir.path(), "rates.csv", b"a,b\n");

    let err = prepare(&cli(&[csv.as_str(), "--table-id", "tb_1"])).unwrap_err();
    assert!(err.to_string().contains("spreadsheet_id"));
}

#[test]
fn test_run_writes_body_to_output() {
    let dir = tempfile::tempdir().unwrap();
    let xlsx = write(dir.path(), "book.xlsx", b"PK\x03\x04");
    let output = dir.path().join("body.bin");

    let args = [xlsx.as_str(), "--scan-boundary", "-o", output.to_str().unwrap()];
    run(&cli(&args)).unwrap();

    let body = std::fs::read(&output).unwrap();
    assert!(body.starts_with(b"------FormpackBoundary"));
    assert!(body.ends_with(b"--\r\n"));
}
