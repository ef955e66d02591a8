//! multipart/form-data body parsing.
//!
//! The parser accepts what [`encode`](crate::encode) produces and any other
//! conforming body with CRLF line endings. It buffers nothing beyond the
//! input slice; part data is returned as cheap slices of the input.

use crate::content_type::ContentType;
use crate::error::{Error, Result};
use crate::header::{ContentDisposition, Headers};
use bytes::Bytes;

/// A part recovered from a multipart/form-data body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPart {
    /// Form field name.
    pub name: String,
    /// Decoded filename for file parts.
    pub filename: Option<String>,
    /// Part content type, if sent.
    pub content_type: Option<String>,
    /// Raw part contents.
    pub data: Bytes,
}

impl ParsedPart {
    /// Checks whether the part carries a file.
    #[must_use]
    pub const fn is_file(&self) -> bool {
        self.filename.is_some()
    }

    /// Returns the contents as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the contents are not valid UTF-8.
    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.data)
            .map_err(|e| Error::InvalidEncoding(format!("Part {} is not UTF-8: {e}", self.name)))
    }
}

/// Parses a body using the boundary from its `Content-Type` header value.
///
/// # Errors
///
/// Returns an error if the content type is not multipart/form-data, has no
/// boundary, or the body is malformed.
pub fn parse(body: impl Into<Bytes>, content_type: &str) -> Result<Vec<ParsedPart>> {
    let content_type = ContentType::parse(content_type)?;
    if !content_type.is_form_data() {
        return Err(Error::InvalidContentType(format!(
            "Expected multipart/form-data, got {}",
            content_type.essence()
        )));
    }
    let boundary = content_type.boundary().ok_or(Error::MissingBoundary)?;
    parse_with_boundary(body, boundary)
}

/// Parses a body delimited by `boundary`.
///
/// # Errors
///
/// Returns an error if delimiters, headers or the closing delimiter are
/// missing or malformed.
pub fn parse_with_boundary(body: impl Into<Bytes>, boundary: &str) -> Result<Vec<ParsedPart>> {
    let body: Bytes = body.into();
    let delimiter = format!("--{boundary}");
    let delimiter = delimiter.as_bytes();
    let mut body_delimiter = b"\r\n".to_vec();
    body_delimiter.extend_from_slice(delimiter);

    // Skip any preamble.
    let mut pos = if body.starts_with(delimiter) {
        0
    } else {
        find(&body, &body_delimiter, 0)
            .map(|p| p + 2)
            .ok_or_else(|| Error::InvalidMultipart("Opening delimiter not found".to_string()))?
    };

    let mut parts = Vec::new();

    loop {
        pos += delimiter.len();
        let rest = &body[pos..];

        if rest.starts_with(b"--") {
            return Ok(parts);
        }
        if !rest.starts_with(b"\r\n") {
            return Err(Error::InvalidMultipart(
                "Delimiter not followed by CRLF".to_string(),
            ));
        }
        pos += 2;

        let (header_text, data_start) = if body[pos..].starts_with(b"\r\n") {
            ("", pos + 2)
        } else {
            let header_end = find(&body, b"\r\n\r\n", pos)
                .ok_or_else(|| Error::InvalidMultipart("Unterminated part headers".to_string()))?;
            let text = std::str::from_utf8(&body[pos..header_end])
                .map_err(|e| Error::InvalidHeader(format!("Non UTF-8 header: {e}")))?;
            (text, header_end + 4)
        };

        let data_end = find(&body, &body_delimiter, data_start)
            .ok_or_else(|| Error::InvalidMultipart("Closing delimiter not found".to_string()))?;

        parts.push(build_part(header_text, body.slice(data_start..data_end))?);
        pos = data_end + 2;
    }
}

fn build_part(header_text: &str, data: Bytes) -> Result<ParsedPart> {
    let headers = Headers::parse(header_text)?;
    let disposition = headers
        .get("content-disposition")
        .ok_or_else(|| Error::InvalidHeader("Missing Content-Disposition".to_string()))
        .and_then(ContentDisposition::parse)?;
    let name = disposition
        .name
        .ok_or_else(|| Error::InvalidHeader("Content-Disposition without name".to_string()))?;

    Ok(ParsedPart {
        name,
        filename: disposition.filename,
        content_type: headers.get("content-type").map(str::to_string),
        data,
    })
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}
