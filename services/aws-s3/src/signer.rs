use log::debug;
use presign_core::hash::hex_hmac_sha256;
use presign_core::time::{format_date, format_iso8601, now, DateTime};
use presign_core::{Error, Result};
use url::Url;

use crate::canonical::string_to_sign;
use crate::constants::{SCOPE_TERMINATOR, SERVICE};
use crate::sign_request::SigningContext;
use crate::{Config, Credential, SignOptions, SigningKeyCache};

/// Signer that presigns S3 uploads with AWS SigV4.
///
/// The signing time is captured once when the signer is created: every url it
/// produces carries the same `X-Amz-Date`. Create a new signer to move the
/// validity window forward.
///
/// - [Authenticating requests: using query parameters](https://docs.aws.amazon.com/AmazonS3/latest/API/sigv4-query-string-auth.html)
#[derive(Debug, Clone)]
pub struct Signer {
    credential: Credential,
    region: String,
    service: String,

    time: DateTime,
    date: String,
    timestamp: String,
    scope: String,

    cache: SigningKeyCache,
}

impl Signer {
    /// Create a signer for `region` from a static key pair.
    pub fn new(access_key_id: &str, secret_access_key: &str, region: &str) -> Self {
        Self::from_credential(Credential::new(access_key_id, secret_access_key), region)
    }

    /// Create a signer for `region` from a credential.
    pub fn from_credential(credential: Credential, region: &str) -> Self {
        let time = now();
        let date = format_date(time);
        Self {
            scope: scope(&date, region, SERVICE),
            timestamp: format_iso8601(time),
            date,
            time,

            credential,
            region: region.to_string(),
            service: SERVICE.to_string(),

            cache: SigningKeyCache::new(),
        }
    }

    /// Create a signer from config, usually loaded by [`Config::from_env`].
    pub fn from_config(config: &Config) -> Result<Self> {
        let region = config
            .region
            .as_deref()
            .ok_or_else(|| Error::config_invalid("region is required"))?;
        let access_key_id = config
            .access_key_id
            .as_deref()
            .ok_or_else(|| Error::config_invalid("access_key_id is required"))?;
        let secret_access_key = config
            .secret_access_key
            .as_deref()
            .ok_or_else(|| Error::config_invalid("secret_access_key is required"))?;

        let mut credential = Credential::new(access_key_id, secret_access_key);
        credential.session_token = config.session_token.clone();

        Ok(Self::from_credential(credential, region))
    }

    /// Use an external signing key cache, possibly shared with other signers.
    pub fn with_cache(mut self, cache: SigningKeyCache) -> Self {
        self.cache = cache;
        self
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// Signers should take the current time on creation. Pin the time only
    /// for tests or to reproduce a url.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = time;
        self.date = format_date(time);
        self.timestamp = format_iso8601(time);
        self.scope = scope(&self.date, &self.region, &self.service);
        self
    }

    /// Region of the target bucket.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Service name used in the credential scope, always `s3`.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Signing time.
    pub fn time(&self) -> DateTime {
        self.time
    }

    /// Signing time in ISO 8601 basic form: `20220313T072004Z`.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Credential scope: `20220313/<region>/s3/aws4_request`.
    pub fn credential_scope(&self) -> &str {
        &self.scope
    }

    /// The signing key cache used by this signer.
    pub fn cache(&self) -> &SigningKeyCache {
        &self.cache
    }

    pub(crate) fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Presign a PUT of `opts.key` into `opts.bucket`.
    ///
    /// The returned url authorizes exactly one upload. If a checksum or a
    /// content length was given, the uploader must send the headers returned
    /// by [`SignOptions::signed_headers`].
    pub fn sign(&self, opts: &SignOptions) -> Result<Url> {
        debug!("presigning with credential scope: {}", self.scope);
        let ctx = SigningContext::build(self, opts)?;

        let creq = ctx.canonical_request();
        debug!("calculated canonical request: {creq}");

        let string_to_sign = string_to_sign(&self.timestamp, &self.scope, &creq);
        debug!("calculated string to sign: {string_to_sign}");

        let signing_key = self.cache.get_or_derive(
            &self.credential.secret_access_key,
            &self.date,
            &self.region,
            &self.service,
        );
        let signature = hex_hmac_sha256(&signing_key, string_to_sign.as_bytes());

        Ok(ctx.apply(signature))
    }
}

fn scope(date: &str, region: &str, service: &str) -> String {
    format!("{date}/{region}/{service}/{SCOPE_TERMINATOR}")
}
