use std::fmt::{Debug, Formatter};
use std::time::Duration;

use http::{HeaderMap, HeaderName, HeaderValue};
use presign_core::utils::Redact;
use presign_core::{Error, Result};
use url::Url;

use crate::canonical::{
    canonical_path, canonical_query, canonical_request, join_query, signed_header_names,
};
use crate::constants::*;
use crate::Signer;

/// Options for presigning one object upload.
///
/// ```
/// use presign_aws_s3::SignOptions;
/// use std::time::Duration;
///
/// let opts = SignOptions::new("bucket-name", "testing/file.json")
///     .with_checksum("47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=")
///     .with_expires(Duration::from_secs(1000))
///     .with_public_read(true);
/// assert_eq!(opts.bucket, "bucket-name");
/// ```
#[derive(Clone, Default)]
pub struct SignOptions {
    /// The bucket to store the object in.
    pub bucket: String,
    /// The key of the object in the bucket, without leading slash.
    pub key: String,
    /// Base64 encoded SHA-256 of the payload.
    ///
    /// When set, the uploader must send the same value in `x-amz-checksum-sha256`.
    pub checksum: Option<String>,
    /// Validity window of the url, 86400 seconds if unset.
    pub expires: Option<Duration>,
    /// Session token of temporary credentials.
    pub session_token: Option<String>,
    /// Store the object with the `public-read` canned acl.
    pub public_read: bool,
    /// Payload size in bytes. Fractions are floored and zero is not signed.
    pub content_length: Option<f64>,
}

impl SignOptions {
    /// Create options for uploading `key` into `bucket`.
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            ..Default::default()
        }
    }

    /// Commit the upload to a base64 encoded SHA-256 checksum.
    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }

    /// Set the validity window of the url.
    pub fn with_expires(mut self, expires: Duration) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Sign with a temporary session token.
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Request the `public-read` canned acl.
    pub fn with_public_read(mut self, public_read: bool) -> Self {
        self.public_read = public_read;
        self
    }

    /// Commit the upload to a payload size.
    pub fn with_content_length(mut self, content_length: f64) -> Self {
        self.content_length = Some(content_length);
        self
    }

    /// Headers that the uploader must send along with the PUT.
    ///
    /// These carry exactly the values committed into the signature. `host` is
    /// left out since every http client derives it from the url.
    pub fn signed_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(checksum) = self.checksum() {
            headers.insert(
                HeaderName::from_static(X_AMZ_CHECKSUM_SHA256),
                HeaderValue::from_str(checksum)?,
            );
        }
        if let Some(length) = self.floored_content_length() {
            headers.insert(http::header::CONTENT_LENGTH, HeaderValue::from(length));
        }
        Ok(headers)
    }

    fn checksum(&self) -> Option<&str> {
        self.checksum.as_deref().filter(|v| !v.is_empty())
    }

    fn floored_content_length(&self) -> Option<i64> {
        self.content_length
            .map(f64::floor)
            .filter(|v| v.is_finite() && *v != 0.0)
            .map(|v| v as i64)
    }

    fn expires_secs(&self) -> u64 {
        self.expires
            .map(|v| v.as_secs())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_EXPIRES_SECS)
    }

    /// Canonical headers for this upload, ordered by header name.
    ///
    /// SigV4 requires canonical headers and signed header names sorted by
    /// lowercase name, so `content-length` comes before `host`.
    fn canonical_headers(&self, host: &str) -> Vec<(&'static str, String)> {
        let mut headers = vec![(HOST, host.to_string())];
        if let Some(checksum) = self.checksum() {
            headers.push((X_AMZ_CHECKSUM_SHA256, checksum.to_string()));
        }
        if let Some(length) = self.floored_content_length() {
            headers.push((CONTENT_LENGTH, length.to_string()));
        }

        headers.sort_by(|l, r| l.0.cmp(r.0));
        headers
    }
}

impl Debug for SignOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignOptions")
            .field("bucket", &self.bucket)
            .field("key", &self.key)
            .field("checksum", &self.checksum)
            .field("expires", &self.expires)
            .field("session_token", &Redact::from(&self.session_token))
            .field("public_read", &self.public_read)
            .field("content_length", &self.content_length)
            .finish()
    }
}

/// Everything one sign call needs, computed in order and handed from step to step.
#[derive(Debug)]
pub(crate) struct SigningContext {
    url: Url,
    /// Canonical (encoded) path.
    path: String,
    /// Canonical headers ordered by name.
    headers: Vec<(&'static str, String)>,
    /// Canonical (encoded and sorted) query pairs.
    query: Vec<(String, String)>,
}

impl SigningContext {
    /// Assemble the target url and canonicalize headers, query and path.
    pub(crate) fn build(signer: &Signer, opts: &SignOptions) -> Result<Self> {
        let url = Url::parse(&format!(
            "https://{}.{}.{}.{PROVIDER_DOMAIN}/{}",
            opts.bucket,
            signer.service(),
            signer.region(),
            opts.key
        ))?;
        let host = url
            .host_str()
            .ok_or_else(|| Error::request_invalid(format!("url {url} has no host")))?;

        let headers = opts.canonical_headers(host);

        let mut query: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        set_param(&mut query, X_AMZ_DATE, signer.timestamp().to_string());
        set_param(&mut query, X_AMZ_EXPIRES, opts.expires_secs().to_string());
        set_param(&mut query, X_AMZ_ALGORITHM, ALGORITHM.to_string());
        set_param(
            &mut query,
            X_AMZ_CREDENTIAL,
            format!(
                "{}/{}",
                signer.credential().access_key_id,
                signer.credential_scope()
            ),
        );
        set_param(&mut query, X_AMZ_SIGNED_HEADERS, signed_header_names(&headers));
        let token = opts
            .session_token
            .as_deref()
            .or(signer.credential().session_token.as_deref())
            .filter(|v| !v.is_empty());
        if let Some(token) = token {
            set_param(&mut query, X_AMZ_SECURITY_TOKEN, token.to_string());
        }
        if opts.public_read {
            set_param(&mut query, X_AMZ_ACL, PUBLIC_READ.to_string());
        }

        Ok(Self {
            path: canonical_path(url.path()),
            query: canonical_query(&query),
            headers,
            url,
        })
    }

    pub(crate) fn canonical_query_string(&self) -> String {
        join_query(&self.query)
    }

    pub(crate) fn canonical_request(&self) -> String {
        canonical_request(
            METHOD,
            &self.path,
            &self.canonical_query_string(),
            &self.headers,
            UNSIGNED_PAYLOAD,
        )
    }

    /// Write the signed path and query back into the url.
    ///
    /// The query on the wire is the canonical query followed by the signature.
    pub(crate) fn apply(mut self, signature: String) -> Url {
        self.query.retain(|(k, _)| k != X_AMZ_SIGNATURE);
        self.query.push((X_AMZ_SIGNATURE.to_string(), signature));

        self.url.set_path(&self.path);
        self.url.set_query(Some(&join_query(&self.query)));
        self.url
    }
}

/// Set `name` to `value`, replacing the first occurrence and dropping the rest.
fn set_param(query: &mut Vec<(String, String)>, name: &str, value: String) {
    let Some(idx) = query.iter().position(|(k, _)| k == name) else {
        query.push((name.to_string(), value));
        return;
    };

    query[idx].1 = value;
    let mut seen = false;
    query.retain(|(k, _)| {
        if k != name {
            return true;
        }
        let keep = !seen;
        seen = true;
        keep
    });
}
