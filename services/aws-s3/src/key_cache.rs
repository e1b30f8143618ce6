use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex};

use log::debug;
use presign_core::hash::hmac_sha256;

use crate::constants::SCOPE_TERMINATOR;

/// SigningKeyCache memoizes derived SigV4 signing keys.
///
/// Entries are keyed by `secret + date + region + service`, which covers every
/// input of the derivation, so entries never go stale and are never evicted.
///
/// Cloning is cheap and shares the underlying map: hand the same cache to
/// several [`Signer`](crate::Signer)s to reuse keys across them.
#[derive(Clone, Default)]
pub struct SigningKeyCache {
    keys: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl SigningKeyCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the signing key stored under `cache_key`.
    pub fn get(&self, cache_key: &str) -> Option<Vec<u8>> {
        self.keys
            .lock()
            .expect("lock poisoned")
            .get(cache_key)
            .cloned()
    }

    /// Store a signing key under `cache_key`, replacing any previous entry.
    pub fn insert(&self, cache_key: impl Into<String>, signing_key: Vec<u8>) {
        self.keys
            .lock()
            .expect("lock poisoned")
            .insert(cache_key.into(), signing_key);
    }

    /// Number of cached keys.
    pub fn len(&self) -> usize {
        self.keys.lock().expect("lock poisoned").len()
    }

    /// Returns true if no key has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the cached key for this scope, deriving and storing it on a miss.
    pub(crate) fn get_or_derive(
        &self,
        secret: &str,
        date: &str,
        region: &str,
        service: &str,
    ) -> Vec<u8> {
        let cache_key = cache_key(secret, date, region, service);

        let mut keys = self.keys.lock().expect("lock poisoned");
        if let Some(key) = keys.get(&cache_key) {
            debug!("signing key cache hit for {date}/{region}/{service}");
            return key.clone();
        }

        debug!("signing key cache miss for {date}/{region}/{service}");
        let key = derive_signing_key(secret, date, region, service);
        keys.insert(cache_key, key.clone());
        key
    }
}

impl Debug for SigningKeyCache {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeyCache")
            .field("len", &self.len())
            .finish()
    }
}

/// Build the composite cache key for a signing scope.
pub fn cache_key(secret: &str, date: &str, region: &str, service: &str) -> String {
    let mut key = String::with_capacity(secret.len() + date.len() + region.len() + service.len());
    key.push_str(secret);
    key.push_str(date);
    key.push_str(region);
    key.push_str(service);
    key
}

/// Derive the SigV4 signing key for `date/region/service/aws4_request`.
pub fn derive_signing_key(secret: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    // Sign secret
    let secret = format!("AWS4{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), date.as_bytes());
    // Sign region
    let sign_region = hmac_sha256(sign_date.as_slice(), region.as_bytes());
    // Sign service
    let sign_service = hmac_sha256(sign_region.as_slice(), service.as_bytes());
    // Sign request
    hmac_sha256(sign_service.as_slice(), SCOPE_TERMINATOR.as_bytes())
}
