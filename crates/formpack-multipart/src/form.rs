//! multipart/form-data body generation.

use crate::boundary::Boundary;
use crate::content_type::{ContentType, DEFAULT_FILE_CONTENT_TYPE};
use crate::encoding::{encode_filename, escape_quoted};
use crate::error::{Error, Result};
use bytes::{BufMut, Bytes, BytesMut};

const CRLF: &[u8] = b"\r\n";

/// Number of boundaries [`encode_checked`] tries before giving up.
pub const MAX_BOUNDARY_ATTEMPTS: usize = 8;

/// A named text field.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Field {
    /// Field name.
    pub name: String,
    /// Field value, embedded verbatim as UTF-8.
    pub value: String,
}

impl Field {
    /// Creates a new field.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A binary file attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttachment {
    /// Form field name the file is sent under.
    pub field_name: String,
    /// Original filename.
    pub filename: String,
    /// MIME type; `application/octet-stream` when absent.
    pub content_type: Option<String>,
    /// File contents.
    pub data: Bytes,
}

impl FileAttachment {
    /// Creates a new attachment without an explicit content type.
    #[must_use]
    pub fn new(
        field_name: impl Into<String>,
        filename: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            filename: filename.into(),
            content_type: None,
            data: data.into(),
        }
    }

    /// Sets the content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Returns the effective content type.
    #[must_use]
    pub fn content_type(&self) -> &str {
        self.content_type
            .as_deref()
            .unwrap_or(DEFAULT_FILE_CONTENT_TYPE)
    }

    /// Returns the size of the contents in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Checks whether the file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// An encoded multipart/form-data body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    bytes: Bytes,
    content_type: String,
    boundary: Boundary,
}

impl EncodedBody {
    /// Returns the body bytes.
    #[must_use]
    pub const fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Returns the matching `Content-Type` header value.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Returns the boundary the body was encoded with.
    #[must_use]
    pub const fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    /// Consumes the body, returning bytes and content type.
    #[must_use]
    pub fn into_parts(self) -> (Bytes, String) {
        (self.bytes, self.content_type)
    }
}

/// Encodes fields and files with a freshly generated boundary.
///
/// Fields are written first, then files, each in input order. Payloads are
/// not scanned for the boundary; see [`encode_checked`] for that.
#[must_use]
pub fn encode(fields: &[Field], files: &[FileAttachment]) -> EncodedBody {
    encode_with_boundary(fields, files, Boundary::generate())
}

/// Encodes fields and files with a caller-chosen boundary.
///
/// Output is byte-for-byte deterministic for a given boundary and input.
#[must_use]
pub fn encode_with_boundary(
    fields: &[Field],
    files: &[FileAttachment],
    boundary: Boundary,
) -> EncodedBody {
    let delimiter = boundary.delimiter();
    let mut buf = BytesMut::with_capacity(estimate_len(fields, files, delimiter.len()));

    for field in fields {
        put_line(&mut buf, &delimiter);
        put_line(
            &mut buf,
            &format!(
                "Content-Disposition: form-data; name=\"{}\"",
                escape_quoted(&field.name)
            ),
        );
        buf.put_slice(CRLF);
        buf.put_slice(field.value.as_bytes());
        buf.put_slice(CRLF);
    }

    for file in files {
        put_line(&mut buf, &delimiter);
        put_line(
            &mut buf,
            &format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"",
                escape_quoted(&file.field_name),
                encode_filename(&file.filename)
            ),
        );
        put_line(&mut buf, &format!("Content-Type: {}", file.content_type()));
        buf.put_slice(CRLF);
        buf.put_slice(&file.data);
        buf.put_slice(CRLF);
    }

    put_line(&mut buf, &format!("{delimiter}--"));

    EncodedBody {
        bytes: buf.freeze(),
        content_type: ContentType::multipart_form_data(&boundary).to_string(),
        boundary,
    }
}

/// Encodes like [`encode`], but regenerates the boundary while it occurs in
/// any field value or file payload.
///
/// # Errors
///
/// Returns [`Error::BoundaryCollision`] if every one of
/// [`MAX_BOUNDARY_ATTEMPTS`] boundaries collided.
pub fn encode_checked(fields: &[Field], files: &[FileAttachment]) -> Result<EncodedBody> {
    for _ in 0..MAX_BOUNDARY_ATTEMPTS {
        let boundary = Boundary::generate();
        let collides = fields.iter().any(|f| boundary.occurs_in(f.value.as_bytes()))
            || files.iter().any(|f| boundary.occurs_in(&f.data));
        if !collides {
            return Ok(encode_with_boundary(fields, files, boundary));
        }
    }

    Err(Error::BoundaryCollision {
        attempts: MAX_BOUNDARY_ATTEMPTS,
    })
}

fn put_line(buf: &mut BytesMut, line: &str) {
    buf.put_slice(line.as_bytes());
    buf.put_slice(CRLF);
}

/// Rough capacity hint so large files are copied once.
fn estimate_len(fields: &[Field], files: &[FileAttachment], delimiter_len: usize) -> usize {
    const PART_OVERHEAD: usize = 128;
    let fields_len: usize = fields
        .iter()
        .map(|f| f.name.len() + f.value.len() + delimiter_len + PART_OVERHEAD)
        .sum();
    let files_len: usize = files
        .iter()
        .map(|f| {
            f.field_name.len() + f.filename.len() * 3 + f.data.len() + delimiter_len + PART_OVERHEAD
        })
        .sum();
    fields_len + files_len + delimiter_len + 4
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::similar_names)]
mod tests {
    use super::*;

    fn fixed() -> Boundary {
        Boundary::new("XBOUNDARYX").unwrap()
    }

    #[test]
    fn test_empty_body_is_closing_delimiter() {
        let body = encode_with_boundary(&[], &[], fixed());
        assert_eq!(body.bytes().as_ref(), b"--XBOUNDARYX--\r\n");
        assert_eq!(
            body.content_type(),
            "multipart/form-data; boundary=XBOUNDARYX"
        );
    }

    #[test]
    fn test_exact_layout() {
        let fields = [Field::new("mode", "create"), Field::new("merge", "true")];
        let files = [
            FileAttachment::new("files", "a.png", &b"PNGDATA"[..]).with_content_type("image/png"),
            FileAttachment::new("files", "b.bin", &b"raw"[..]),
        ];

        let body = encode_with_boundary(&fields, &files, fixed());
        let expected = concat!(
            "--XBOUNDARYX\r\n",
            "Content-Disposition: form-data; name=\"mode\"\r\n",
            "\r\n",
            "create\r\n",
            "--XBOUNDARYX\r\n",
            "Content-Disposition: form-data; name=\"merge\"\r\n",
            "\r\n",
            "true\r\n",
            "--XBOUNDARYX\r\n",
            "Content-Disposition: form-data; name=\"files\"; filename=\"a.png\"\r\n",
            "Content-Type: image/png\r\n",
            "\r\n",
            "PNGDATA\r\n",
            "--XBOUNDARYX\r\n",
            "Content-Disposition: form-data; name=\"files\"; filename=\"b.bin\"\r\n",
            "Content-Type: application/octet-stream\r\n",
            "\r\n",
            "raw\r\n",
            "--XBOUNDARYX--\r\n",
        );

        assert_eq!(body.bytes().as_ref(), expected.as_bytes());
    }

    #[test]
    fn test_name_and_filename_escaping() {
        let fields = [Field::new("we\"ird\\name", "v")];
        let files = [FileAttachment::new("f\"", "q\"uo\\te.csv", &b"x"[..])];
        let body = encode_with_boundary(&fields, &files, fixed());
        let text = String::from_utf8(body.bytes().to_vec()).unwrap();
        assert!(text.contains("name=\"we\\\"ird\\\\name\"\r\n"));
        assert!(text.contains("name=\"f\\\"\"; filename=\"q\\\"uo\\\\te.csv\"\r\n"));
    }

    #[test]
    fn test_non_ascii_filename() {
        let files = [FileAttachment::new("files", "café.png", &b"x"[..])];
        let body = encode_with_boundary(&[], &files, fixed());
        let text = String::from_utf8(body.bytes().to_vec()).unwrap();
        assert!(text.contains("filename=\"UTF-8''caf%C3%A9.png\"\r\n"));
    }

    #[test]
    fn test_deterministic_with_fixed_boundary() {
        let fields = [Field::new("instructions", "merge all sheets")];
        let files = [FileAttachment::new("files", "t.csv", &b"a,b\n1,2\n"[..])];
        let a = encode_with_boundary(&fields, &files, fixed());
        let b = encode_with_boundary(&fields, &files, fixed());
        assert_eq!(a, b);
    }

    #[test]
    fn test_fresh_boundary_per_call() {
        let files = [FileAttachment::new("files", "t.csv", &b"x"[..])];
        let a = encode(&[], &files);
        let b = encode(&[], &files);
        assert_ne!(a.boundary(), b.boundary());
        assert_ne!(a.content_type(), b.content_type());
    }

    #[test]
    fn test_content_type_matches_body() {
        let body = encode(&[Field::new("mode", "read")], &[]);
        let boundary = body.boundary().as_str().to_string();
        assert_eq!(
            body.content_type(),
            format!("multipart/form-data; boundary={boundary}")
        );
        assert!(body.bytes().starts_with(format!("--{boundary}\r\n").as_bytes()));
        assert!(body.bytes().ends_with(format!("--{boundary}--\r\n").as_bytes()));
    }

    #[test]
    fn test_encode_checked_succeeds() {
        let files = [FileAttachment::new("files", "t.csv", &b"----FormpackBoundary"[..])];
        let body = encode_checked(&[], &files).unwrap();
        assert!(!body.boundary().occurs_in(&files[0].data));
    }

    #[test]
    fn test_into_parts() {
        let body = encode_with_boundary(&[], &[], fixed());
        let (bytes, content_type) = body.into_parts();
        assert_eq!(bytes.len(), b"--XBOUNDARYX--\r\n".len());
        assert!(content_type.ends_with("XBOUNDARYX"));
    }
}
