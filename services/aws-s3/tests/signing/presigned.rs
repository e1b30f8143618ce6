use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use chrono::TimeZone;
use pretty_assertions::assert_eq;
use presign_aws_s3::{SignOptions, Signer, SigningKeyCache};
use url::Url;

fn signer() -> Signer {
    let time = chrono::Utc
        .with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
        .single()
        .expect("time must be valid");
    Signer::new("id", "secret", "eu-central-1").with_time(time)
}

fn query(url: &Url) -> HashMap<String, String> {
    url.query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

#[test]
fn test_presign_plain_upload() -> Result<()> {
    let url = signer().sign(&SignOptions::new("bucket-name", "testing/test-file.json"))?;

    assert_eq!(url.scheme(), "https");
    assert_eq!(
        url.host_str(),
        Some("bucket-name.s3.eu-central-1.amazonaws.com")
    );
    assert_eq!(url.path(), "/testing/test-file.json");

    let q = query(&url);
    assert_eq!(q["X-Amz-Algorithm"], "AWS4-HMAC-SHA256");
    assert_eq!(q["X-Amz-Credential"], "id/20240102/eu-central-1/s3/aws4_request");
    assert_eq!(q["X-Amz-Date"], "20240102T030405Z");
    assert_eq!(q["X-Amz-Expires"], "86400");
    assert_eq!(q["X-Amz-SignedHeaders"], "host");
    assert!(!q.contains_key("X-Amz-Security-Token"));
    assert!(!q.contains_key("x-amz-acl"));

    let signature = &q["X-Amz-Signature"];
    assert_eq!(signature.len(), 64);
    assert!(signature.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    Ok(())
}

#[test]
fn test_signature_is_last_parameter() -> Result<()> {
    let url = signer().sign(
        &SignOptions::new("bucket-name", "name")
            .with_checksum("sss")
            .with_public_read(true),
    )?;

    let (last, _) = url.query_pairs().last().expect("query must not be empty");
    assert_eq!(last, "X-Amz-Signature");
    Ok(())
}

#[test]
fn test_presign_with_every_option() -> Result<()> {
    let opts = SignOptions::new("bucket-name", "name")
        .with_checksum("47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=")
        .with_expires(Duration::from_secs(1000))
        .with_session_token("token_123")
        .with_public_read(true)
        .with_content_length(1024.213);
    let url = signer().sign(&opts)?;

    let q = query(&url);
    assert_eq!(q["X-Amz-Expires"], "1000");
    assert_eq!(q["X-Amz-Security-Token"], "token_123");
    assert_eq!(q["x-amz-acl"], "public-read");
    assert_eq!(
        q["X-Amz-SignedHeaders"],
        "content-length;host;x-amz-checksum-sha256"
    );

    let raw = url.query().expect("query must exist");
    assert!(raw.contains("X-Amz-SignedHeaders=content-length%3Bhost%3Bx-amz-checksum-sha256"));
    assert!(raw.contains("X-Amz-Credential=id%2F20240102%2Feu-central-1%2Fs3%2Faws4_request"));

    let headers = opts.signed_headers()?;
    assert_eq!(
        headers["x-amz-checksum-sha256"],
        "47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU="
    );
    assert_eq!(headers["content-length"], "1024");
    Ok(())
}

#[test]
fn test_empty_values_are_not_signed() -> Result<()> {
    let opts = SignOptions::new("bucket-name", "name")
        .with_checksum("")
        .with_session_token("")
        .with_content_length(0.0)
        .with_expires(Duration::ZERO);
    let url = signer().sign(&opts)?;

    let q = query(&url);
    assert_eq!(q["X-Amz-SignedHeaders"], "host");
    assert_eq!(q["X-Amz-Expires"], "86400");
    assert!(!q.contains_key("X-Amz-Security-Token"));
    assert!(opts.signed_headers()?.is_empty());
    Ok(())
}

#[test]
fn test_key_with_special_characters() -> Result<()> {
    let url = signer().sign(&SignOptions::new("bucket-name", "my dir/a+b=c.txt"))?;

    assert_eq!(url.path(), "/my%20dir/a%2Bb%3Dc.txt");
    Ok(())
}

#[test]
fn test_shared_cache_across_signers() -> Result<()> {
    let cache = SigningKeyCache::new();
    let opts = SignOptions::new("bucket-name", "name");

    let first = signer().with_cache(cache.clone()).sign(&opts)?;
    let second = signer().with_cache(cache.clone()).sign(&opts)?;

    assert_eq!(cache.len(), 1);
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_signers_for_different_regions() -> Result<()> {
    let cache = SigningKeyCache::new();
    let opts = SignOptions::new("bucket-name", "name");

    let eu = signer().with_cache(cache.clone()).sign(&opts)?;
    let time = chrono::Utc
        .with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
        .single()
        .expect("time must be valid");
    let us = Signer::new("id", "secret", "us-east-1")
        .with_time(time)
        .with_cache(cache.clone())
        .sign(&opts)?;

    assert_eq!(cache.len(), 2);
    assert_eq!(
        us.host_str(),
        Some("bucket-name.s3.us-east-1.amazonaws.com")
    );
    assert_ne!(query(&eu)["X-Amz-Signature"], query(&us)["X-Amz-Signature"]);
    Ok(())
}
