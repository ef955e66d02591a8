//! Header parameter encoding utilities.
//!
//! Supports RFC 2388 quoted-string escaping and RFC 2231 extended parameter
//! encoding for filenames that cannot be sent as plain printable ASCII.

use crate::error::{Error, Result};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Charset marker prefixed to RFC 2231 encoded values.
pub const RFC2231_UTF8_PREFIX: &str = "UTF-8''";

/// Characters percent-encoded in RFC 2231 filenames.
///
/// Everything except `A-Z a-z 0-9 - _ . ! ~ * ( )`. The tick stays encoded
/// because it separates charset, language and value.
const FILENAME_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'(')
    .remove(b')');

/// Escapes a value for use inside a quoted-string.
///
/// Backslash becomes `\\` and double quote becomes `\"`. The surrounding
/// quotes are not added.
#[must_use]
pub fn escape_quoted(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch == '\\' || ch == '"' {
            result.push('\\');
        }
        result.push(ch);
    }
    result
}

/// Reverses [`escape_quoted`]: every `\x` becomes `x`.
#[must_use]
pub fn unescape_quoted(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(escaped) = chars.next() {
                result.push(escaped);
            }
        } else {
            result.push(ch);
        }
    }
    result
}

/// Checks whether a filename can be sent as an escaped quoted-string.
///
/// True when every character is printable ASCII (0x20-0x7E) and the name
/// does not itself look like an RFC 2231 value.
#[must_use]
pub fn is_quotable_filename(filename: &str) -> bool {
    filename.chars().all(|c| matches!(c, ' '..='~')) && !has_rfc2231_prefix(filename)
}

/// Encodes a filename for the `filename` parameter of a part header.
///
/// Printable ASCII is quoted-string escaped; anything else falls back to
/// RFC 2231 (`UTF-8''` followed by percent-encoded UTF-8).
///
/// A printable ASCII name that already starts with `UTF-8''` is also
/// percent-encoded (`UTF-8''UTF-8%27%27x.png`); quoted as-is, a parser would
/// decode it as an RFC 2231 value and recover a different name.
#[must_use]
pub fn encode_filename(filename: &str) -> String {
    if is_quotable_filename(filename) {
        escape_quoted(filename)
    } else {
        encode_rfc2231(filename)
    }
}

/// Decodes a `filename` parameter value produced by [`encode_filename`].
///
/// # Errors
///
/// Returns an error if an RFC 2231 value is malformed.
pub fn decode_filename(raw: &str) -> Result<String> {
    if has_rfc2231_prefix(raw) {
        decode_rfc2231(raw)
    } else {
        Ok(unescape_quoted(raw))
    }
}

/// Encodes text using RFC 2231 extended parameter encoding.
///
/// Format: `UTF-8''percent-encoded-text`
#[must_use]
pub fn encode_rfc2231(text: &str) -> String {
    let encoded = utf8_percent_encode(text, FILENAME_ENCODE_SET);
    format!("{RFC2231_UTF8_PREFIX}{encoded}")
}

/// Decodes an RFC 2231 extended parameter value.
///
/// Format: `charset'language'percent-encoded-text`. Only UTF-8 (and its
/// US-ASCII subset) is supported.
///
/// # Errors
///
/// Returns an error if the value is not in RFC 2231 form, names an
/// unsupported charset, or decodes to invalid UTF-8.
pub fn decode_rfc2231(value: &str) -> Result<String> {
    let mut parts = value.splitn(3, '\'');
    let (Some(charset), Some(_language), Some(encoded)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(Error::InvalidEncoding(format!(
            "Invalid RFC 2231 value: {value}"
        )));
    };

    if !charset.eq_ignore_ascii_case("utf-8") && !charset.eq_ignore_ascii_case("us-ascii") {
        return Err(Error::InvalidEncoding(format!(
            "Unsupported charset: {charset}"
        )));
    }

    percent_decode_str(encoded)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| Error::InvalidEncoding(format!("Invalid UTF-8 in RFC 2231 value: {e}")))
}

fn has_rfc2231_prefix(value: &str) -> bool {
    value
        .get(..RFC2231_UTF8_PREFIX.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(RFC2231_UTF8_PREFIX))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::manual_string_new, clippy::similar_names)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_quoted() {
        assert_eq!(escape_quoted("plain"), "plain");
        assert_eq!(escape_quoted("a\"b"), "a\\\"b");
        assert_eq!(escape_quoted("a\\b"), "a\\\\b");
        assert_eq!(escape_quoted("\\\""), "\\\\\\\"");
    }

    #[test]
    fn test_unescape_quoted() {
        assert_eq!(unescape_quoted("a\\\"b"), "a\"b");
        assert_eq!(unescape_quoted("a\\\\b"), "a\\b");
        assert_eq!(unescape_quoted(&escape_quoted("x\\\"y\"\\")), "x\\\"y\"\\");
    }

    #[test]
    fn test_quotable_filename() {
        assert!(is_quotable_filename("report.pdf"));
        assert!(is_quotable_filename("my \"quoted\" file.png"));
        assert!(is_quotable_filename("back\\slash.csv"));
        assert!(!is_quotable_filename("café.png"));
        assert!(!is_quotable_filename("tab\there.png"));
        assert!(!is_quotable_filename("UTF-8''sneaky.png"));
    }

    #[test]
    fn test_encode_filename_ascii() {
        assert_eq!(encode_filename("report.pdf"), "report.pdf");
        assert_eq!(encode_filename("a\"b\\c.png"), "a\\\"b\\\\c.png");
    }

    #[test]
    fn test_encode_filename_non_ascii() {
        assert_eq!(encode_filename("café.png"), "UTF-8''caf%C3%A9.png");
    }

    #[test]
    fn test_rfc2231_tick_is_encoded() {
        assert_eq!(encode_rfc2231("it's.csv"), "UTF-8''it%27s.csv");
    }

    #[test]
    fn test_rfc2231_keeps_unreserved() {
        assert_eq!(encode_rfc2231("a-b_c.d!e~f*(g)"), "UTF-8''a-b_c.d!e~f*(g)");
        assert_eq!(encode_rfc2231("a b"), "UTF-8''a%20b");
    }

    #[test]
    fn test_rfc2231_decode() {
        assert_eq!(decode_rfc2231("UTF-8''caf%C3%A9.png").unwrap(), "café.png");
        assert_eq!(decode_rfc2231("utf-8'en'%E2%82%AC.xlsx").unwrap(), "€.xlsx");
        assert!(decode_rfc2231("no-ticks").is_err());
        assert!(decode_rfc2231("latin1''caf%E9").is_err());
        assert!(decode_rfc2231("UTF-8''%FF").is_err());
    }

    #[test]
    fn test_decode_filename() {
        assert_eq!(decode_filename("UTF-8''caf%C3%A9.png").unwrap(), "café.png");
        assert_eq!(decode_filename("a\\\"b.png").unwrap(), "a\"b.png");
        let sneaky = "UTF-8''sneaky.png";
        assert_eq!(decode_filename(&encode_filename(sneaky)).unwrap(), sneaky);
    }

    #[test]
    fn test_encode_filename_with_charset_prefix() {
        assert_eq!(encode_filename("UTF-8''x.png"), "UTF-8''UTF-8%27%27x.png");
    }
}
