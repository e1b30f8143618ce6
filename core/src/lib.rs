//! Core components shared by the presign signers.
//!
//! This crate holds the pieces every signer needs but that are not tied to a
//! particular storage service:
//!
//! - [`Error`] and [`ErrorKind`]: the error type returned across the workspace
//! - [`hash`]: SHA-256 / HMAC-SHA256 helpers with hex and base64 output
//! - [`time`]: UTC timestamps and the compact formats used in credential scopes
//! - [`utils`]: helpers such as [`utils::Redact`] for printing secrets safely
//!
//! ## Example
//!
//! ```
//! use presign_core::hash::{base64_sha256, hex_hmac_sha256};
//!
//! // The value an uploader sends as `x-amz-checksum-sha256`.
//! let checksum = base64_sha256(br#"{"key":"value"}"#);
//! assert_eq!(checksum.len(), 44);
//!
//! let mac = hex_hmac_sha256(b"key", b"content");
//! assert_eq!(mac.len(), 64);
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod error;
pub use error::{Error, ErrorKind, Result};
