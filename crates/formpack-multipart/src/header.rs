//! Part header handling.

use crate::encoding::{decode_filename, unescape_quoted};
use crate::error::{Error, Result};
use std::collections::HashMap;

/// Collection of part headers, keyed case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    headers: HashMap<String, Vec<String>>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header value.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_lowercase();
        let value = value.into();
        self.headers.entry(name).or_default().push(value);
    }

    /// Gets the first value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|v| v.first().map(String::as_str))
    }

    /// Parses a CRLF separated header block.
    ///
    /// Folded continuation lines (leading space or tab) are joined to the
    /// previous header.
    ///
    /// # Errors
    ///
    /// Returns an error if a line has no `:` separator.
    pub fn parse(text: &str) -> Result<Self> {
        let mut headers = Self::new();
        let mut current: Option<(String, String)> = None;

        for line in text.split("\r\n") {
            if line.is_empty() {
                break;
            }

            if line.starts_with(' ') || line.starts_with('\t') {
                if let Some((_, value)) = current.as_mut() {
                    value.push(' ');
                    value.push_str(line.trim());
                }
                continue;
            }

            if let Some((name, value)) = current.take() {
                headers.add(name, value);
            }

            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| Error::InvalidHeader(line.to_string()))?;
            current = Some((name.trim().to_string(), value.trim().to_string()));
        }

        if let Some((name, value)) = current {
            headers.add(name, value);
        }

        Ok(headers)
    }
}

/// Parsed `Content-Disposition: form-data` header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDisposition {
    /// Disposition type, normally `form-data`.
    pub disposition: String,
    /// Form field name.
    pub name: Option<String>,
    /// Decoded filename, for file parts.
    pub filename: Option<String>,
}

impl ContentDisposition {
    /// Parses a disposition header value.
    ///
    /// Quoted parameter values may contain `;` and backslash escapes. The
    /// filename is decoded from either quoted-string or RFC 2231 form, and a
    /// `filename*` parameter wins over a plain `filename`.
    ///
    /// # Errors
    ///
    /// Returns an error on unterminated quotes or a malformed filename.
    pub fn parse(value: &str) -> Result<Self> {
        let segments = split_parameters(value)?;
        let mut segments = segments.into_iter();

        let disposition = segments
            .next()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::InvalidHeader(format!("Empty disposition: {value}")))?;

        let mut name = None;
        let mut filename = None;
        let mut extended_filename = None;

        for segment in segments {
            let Some((key, raw)) = segment.split_once('=') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let raw = raw.trim();
            let unquoted = raw
                .strip_prefix('"')
                .and_then(|r| r.strip_suffix('"'))
                .unwrap_or(raw);

            match key.as_str() {
                "name" => name = Some(unescape_quoted(unquoted)),
                "filename" => filename = Some(decode_filename(unquoted)?),
                "filename*" => extended_filename = Some(decode_filename(unquoted)?),
                _ => {}
            }
        }

        Ok(Self {
            disposition,
            name,
            filename: extended_filename.or(filename),
        })
    }
}

/// Splits a header value on `;` outside quoted-strings.
fn split_parameters(value: &str) -> Result<Vec<String>> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = value.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' if in_quotes => {
                current.push(ch);
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            ';' if !in_quotes => segments.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }

    if in_quotes {
        return Err(Error::InvalidHeader(format!("Unterminated quote: {value}")));
    }
    segments.push(current);

    Ok(segments)
}
