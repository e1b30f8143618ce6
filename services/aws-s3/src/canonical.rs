//! Canonical request construction for presigned urls.
//!
//! ```text
//! HTTPMethod\n
//! CanonicalURI\n
//! CanonicalQueryString\n
//! CanonicalHeaders\n
//! \n
//! SignedHeaders\n
//! HashedPayload
//! ```

use std::collections::HashSet;

use percent_encoding::{percent_decode_str, percent_encode, utf8_percent_encode};
use presign_core::hash::hex_sha256;

use crate::constants::{ALGORITHM, AWS_QUERY_ENCODE_SET, AWS_URI_ENCODE_SET};

/// Encode a url path for signing.
///
/// The path is decoded first so that segments the url parser already escaped
/// are not escaped twice: `%20` stays `%20`, never `%2520`, which is what S3
/// computes on its side. Separators stay literal.
pub(crate) fn canonical_path(path: &str) -> String {
    let decoded: Vec<u8> = percent_decode_str(path).collect();
    percent_encode(&decoded, &AWS_URI_ENCODE_SET).to_string()
}

/// Encode and sort query pairs for signing.
///
/// Pairs with an empty name are dropped and only the first occurrence of a
/// repeated name is kept. The result is sorted by encoded name, then by
/// encoded value.
pub(crate) fn canonical_query(pairs: &[(String, String)]) -> Vec<(String, String)> {
    let mut seen = HashSet::new();
    let mut encoded: Vec<(String, String)> = pairs
        .iter()
        .filter(|(k, _)| !k.is_empty())
        .filter(|(k, _)| seen.insert(k.as_str()))
        .map(|(k, v)| {
            (
                utf8_percent_encode(k, &AWS_QUERY_ENCODE_SET).to_string(),
                utf8_percent_encode(v, &AWS_QUERY_ENCODE_SET).to_string(),
            )
        })
        .collect();

    encoded.sort();
    encoded
}

/// Join already encoded pairs into `k1=v1&k2=v2`.
pub(crate) fn join_query(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Join header names with `;`.
pub(crate) fn signed_header_names(headers: &[(&str, String)]) -> String {
    headers
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(";")
}

/// Assemble the canonical request from its already canonical parts.
pub(crate) fn canonical_request(
    method: &str,
    path: &str,
    query: &str,
    headers: &[(&str, String)],
    payload_hash: &str,
) -> String {
    // 256 is specially chosen to avoid reallocation for most requests.
    let mut f = String::with_capacity(256);

    f.push_str(method);
    f.push('\n');
    f.push_str(path);
    f.push('\n');
    f.push_str(query);
    f.push('\n');
    for (name, value) in headers {
        f.push_str(name);
        f.push(':');
        f.push_str(value);
        f.push('\n');
    }
    f.push('\n');
    f.push_str(&signed_header_names(headers));
    f.push('\n');
    f.push_str(payload_hash);

    f
}

/// Build the string to sign.
///
/// ```text
/// AWS4-HMAC-SHA256
/// 20220313T072004Z
/// 20220313/<region>/<service>/aws4_request
/// <hashed_canonical_request>
/// ```
pub(crate) fn string_to_sign(timestamp: &str, scope: &str, canonical_request: &str) -> String {
    format!(
        "{ALGORITHM}\n{timestamp}\n{scope}\n{}",
        hex_sha256(canonical_request.as_bytes())
    )
}
