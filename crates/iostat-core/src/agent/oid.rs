//! Object identifiers.

use std::fmt;
use std::str::FromStr;

/// Dotted sequence of sub-identifiers, e.g. `1.3.6.1.3.1`.
///
/// Ordering is lexicographic by component; a prefix sorts before any longer
/// OID that extends it. This is the order GETNEXT walks in.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Oid(Vec<u32>);

impl Oid {
    pub fn new(parts: Vec<u32>) -> Self {
        Self(parts)
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a new OID with `suffix` appended.
    pub fn child(&self, suffix: &[u32]) -> Oid {
        let mut parts = Vec::with_capacity(self.0.len() + suffix.len());
        parts.extend_from_slice(&self.0);
        parts.extend_from_slice(suffix);
        Oid(parts)
    }

    /// True if `prefix` is a (non-strict) prefix of this OID.
    pub fn starts_with(&self, prefix: &Oid) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", part)?;
        }
        Ok(())
    }
}

/// Invalid dotted OID text.
#[derive(Debug, Clone, PartialEq)]
pub struct OidParseError {
    pub input: String,
    pub message: String,
}

impl fmt::Display for OidParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid OID '{}': {}", self.input, self.message)
    }
}

impl std::error::Error for OidParseError {}

impl FromStr for Oid {
    type Err = OidParseError;

    /// Parses `1.3.6.1` or `.1.3.6.1`. The empty string is the empty OID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |message: String| OidParseError {
            input: s.to_string(),
            message,
        };

        let trimmed = s.trim();
        let body = trimmed.strip_prefix('.').unwrap_or(trimmed);
        if body.is_empty() {
            return Ok(Oid::default());
        }

        body.split('.')
            .map(|part| {
                if part.is_empty() {
                    return Err(err("empty sub-identifier".to_string()));
                }
                part.parse::<u32>()
                    .map_err(|e| err(format!("sub-identifier '{}': {}", part, e)))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Oid)
    }
}
