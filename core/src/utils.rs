//! Utility functions and types.

use std::fmt::Debug;

/// Redact wraps a secret so that `{:?}` never prints it in full.
///
/// - Empty values are shown as `EMPTY`.
/// - Values shorter than 12 bytes are fully masked as `***`.
/// - Longer values keep their first and last three characters, which is
///   enough to tell two access keys apart in logs.
pub struct Redact<'a>(&'a str);

impl<'a> From<&'a str> for Redact<'a> {
    fn from(value: &'a str) -> Self {
        Redact(value)
    }
}

impl<'a> From<&'a String> for Redact<'a> {
    fn from(value: &'a String) -> Self {
        Redact(value.as_str())
    }
}

impl<'a> From<&'a Option<String>> for Redact<'a> {
    fn from(value: &'a Option<String>) -> Self {
        Redact(value.as_deref().unwrap_or_default())
    }
}

impl Debug for Redact<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let v = self.0;
        if v.is_empty() {
            return f.write_str("EMPTY");
        }
        if v.len() < 12 {
            return f.write_str("***");
        }

        // Secrets are ASCII in practice; fall back to a full mask otherwise.
        match (v.get(..3), v.get(v.len() - 3..)) {
            (Some(head), Some(tail)) => write!(f, "{head}***{tail}"),
            _ => f.write_str("***"),
        }
    }
}
