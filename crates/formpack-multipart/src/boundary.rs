//! Multipart boundary tokens.
//!
//! A boundary is chosen per body and must not occur inside any part. Tokens
//! combine a fixed prefix, a nanosecond timestamp and 64 random bits, which
//! makes a collision with real payloads vanishingly unlikely.

use crate::error::{Error, Result};
use chrono::Utc;
use rand::Rng;
use std::fmt;

/// Fixed prefix of every generated boundary.
pub const BOUNDARY_PREFIX: &str = "----FormpackBoundary";

/// Maximum boundary length allowed by RFC 2046.
const MAX_BOUNDARY_LENGTH: usize = 70;

/// A multipart boundary token (without the leading `--`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Boundary(String);

impl Boundary {
    /// Generates a fresh boundary.
    #[must_use]
    pub fn generate() -> Self {
        let now = Utc::now();
        let timestamp = now
            .timestamp_nanos_opt()
            .unwrap_or_else(|| now.timestamp_micros());
        let random: u64 = rand::thread_rng().r#gen();
        Self(format!("{BOUNDARY_PREFIX}{timestamp:x}{random:016x}"))
    }

    /// Wraps a caller-chosen token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty, longer than 70 characters,
    /// ends with a space, or contains characters outside the RFC 2046
    /// `bchars` set.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();

        if token.is_empty() || token.len() > MAX_BOUNDARY_LENGTH {
            return Err(Error::InvalidContentType(format!(
                "boundary must be 1-{MAX_BOUNDARY_LENGTH} characters, got {}",
                token.len()
            )));
        }
        if token.ends_with(' ') {
            return Err(Error::InvalidContentType(
                "boundary must not end with a space".to_string(),
            ));
        }
        if let Some(bad) = token.chars().find(|c| !is_bchar(*c)) {
            return Err(Error::InvalidContentType(format!(
                "invalid boundary character {bad:?}"
            )));
        }

        Ok(Self(token))
    }

    /// Returns the token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the delimiter line content (`--` followed by the token).
    #[must_use]
    pub fn delimiter(&self) -> String {
        format!("--{}", self.0)
    }

    /// Checks whether the token occurs anywhere in `data`.
    #[must_use]
    pub fn occurs_in(&self, data: &[u8]) -> bool {
        let needle = self.0.as_bytes();
        data.len() >= needle.len() && data.windows(needle.len()).any(|w| w == needle)
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Boundary {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// RFC 2046 `bchars`.
const fn is_bchar(c: char) -> bool {
    matches!(
        c,
        '0'..='9'
            | 'a'..='z'
            | 'A'..='Z'
            | '\''
            | '('
            | ')'
            | '+'
            | '_'
            | ','
            | '-'
            | '.'
            | '/'
            | ':'
            | '='
            | '?'
            | ' '
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::similar_names)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_has_prefix() {
        let boundary = Boundary::generate();
        assert!(boundary.as_str().starts_with(BOUNDARY_PREFIX));
        assert!(boundary.as_str().len() <= MAX_BOUNDARY_LENGTH);
    }

    #[test]
    fn test_generate_is_valid_token() {
        let boundary = Boundary::generate();
        assert!(Boundary::new(boundary.as_str()).is_ok());
    }

    #[test]
    fn test_generate_unique() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(Boundary::generate()), "duplicate boundary");
        }
    }

    #[test]
    fn test_new_rejects_invalid() {
        assert!(Boundary::new("").is_err());
        assert!(Boundary::new("a".repeat(71)).is_err());
        assert!(Boundary::new("trailing ").is_err());
        assert!(Boundary::new("semi;colon").is_err());
        assert!(Boundary::new("quo\"te").is_err());
    }

    #[test]
    fn test_new_accepts_bchars() {
        let boundary = Boundary::new("abc'()+_,-./:=? xyz").unwrap();
        assert_eq!(boundary.to_string(), "abc'()+_,-./:=? xyz");
    }

    #[test]
    fn test_delimiter() {
        let boundary = Boundary::new("XYZ").unwrap();
        assert_eq!(boundary.delimiter(), "--XYZ");
    }

    #[test]
    fn test_occurs_in() {
        let boundary = Boundary::new("XYZ").unwrap();
        assert!(boundary.occurs_in(b"abcXYZdef"));
        assert!(boundary.occurs_in(b"XYZ"));
        assert!(!boundary.occurs_in(b"XY"));
        assert!(!boundary.occurs_in(b""));
        assert!(!boundary.occurs_in(b"xyz"));
    }
}
