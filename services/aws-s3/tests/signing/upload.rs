use std::time::Duration;

use anyhow::Result;
use http::{HeaderMap, StatusCode};
use log::warn;
use presign_aws_s3::SignOptions;
use presign_core::hash::base64_sha256;

use super::{init_live_test, upload};

const BODY: &str = "Hello, World!";

#[tokio::test]
async fn test_upload_with_checksum() -> Result<()> {
    let Some(target) = init_live_test() else {
        warn!("PRESIGN_AWS_S3_TEST is not set, skipped");
        return Ok(());
    };

    let opts = SignOptions::new(&target.bucket, "presign/upload_with_checksum.txt")
        .with_checksum(base64_sha256(BODY.as_bytes()))
        .with_expires(Duration::from_secs(300));
    let url = target.signer.sign(&opts)?;

    let (status, body) = upload(url, opts.signed_headers()?, BODY).await?;
    assert_eq!(StatusCode::OK, status, "{body}");
    Ok(())
}

#[tokio::test]
async fn test_upload_with_content_length() -> Result<()> {
    let Some(target) = init_live_test() else {
        warn!("PRESIGN_AWS_S3_TEST is not set, skipped");
        return Ok(());
    };

    let opts = SignOptions::new(&target.bucket, "presign/upload_with_length.txt")
        .with_checksum(base64_sha256(BODY.as_bytes()))
        .with_content_length(BODY.len() as f64);
    let url = target.signer.sign(&opts)?;

    let (status, body) = upload(url, opts.signed_headers()?, BODY).await?;
    assert_eq!(StatusCode::OK, status, "{body}");
    Ok(())
}

#[tokio::test]
async fn test_upload_with_mismatched_content_length() -> Result<()> {
    let Some(target) = init_live_test() else {
        warn!("PRESIGN_AWS_S3_TEST is not set, skipped");
        return Ok(());
    };

    let opts = SignOptions::new(&target.bucket, "presign/upload_mismatched_length.txt")
        .with_content_length((BODY.len() + 5) as f64);
    let url = target.signer.sign(&opts)?;

    // reqwest sends the real body length, which differs from the signed one.
    let (status, body) = upload(url, HeaderMap::new(), BODY).await?;

    assert_eq!(StatusCode::FORBIDDEN, status);
    assert!(body.contains("SignatureDoesNotMatch"), "{body}");
    Ok(())
}

#[tokio::test]
async fn test_upload_with_tampered_checksum() -> Result<()> {
    let Some(target) = init_live_test() else {
        warn!("PRESIGN_AWS_S3_TEST is not set, skipped");
        return Ok(());
    };

    let opts = SignOptions::new(&target.bucket, "presign/upload_tampered.txt")
        .with_checksum(base64_sha256(BODY.as_bytes()));
    let url = target.signer.sign(&opts)?;

    let tampered = SignOptions::new(&target.bucket, "presign/upload_tampered.txt")
        .with_checksum(base64_sha256(b"Goodbye, World!"));
    let (status, body) = upload(url, tampered.signed_headers()?, BODY).await?;

    assert_eq!(StatusCode::FORBIDDEN, status);
    assert!(body.contains("SignatureDoesNotMatch"), "{body}");
    Ok(())
}

#[tokio::test]
async fn test_upload_with_expired_url() -> Result<()> {
    let Some(target) = init_live_test() else {
        warn!("PRESIGN_AWS_S3_TEST is not set, skipped");
        return Ok(());
    };

    let past = chrono::Utc::now() - chrono::TimeDelta::try_hours(1).expect("in bounds");
    let signer = target.signer.with_time(past);
    let opts = SignOptions::new(&target.bucket, "presign/upload_expired.txt")
        .with_expires(Duration::from_secs(1));
    let url = signer.sign(&opts)?;

    let (status, body) = upload(url, opts.signed_headers()?, BODY).await?;

    assert_eq!(StatusCode::FORBIDDEN, status);
    assert!(body.contains("Request has expired"), "{body}");
    Ok(())
}
