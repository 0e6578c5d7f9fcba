//! AWS SigV4 request signing.
//!
//! This crate computes [AWS Signature Version 4](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
//! signatures for outgoing HTTP requests. A signature can be attached to a request as an `Authorization` header, or
//! embedded in the query string of a presigned URL that can be used without any custom headers.
//!
//! The signer never performs network I/O. Requests are [http::Request] values; the body must already be in memory.
//! Streaming (chunked) payload signing is not supported.
//!
//! # Signing a request
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use http::Request;
//! use scratchstack_aws_signer::Signer;
//!
//! let signer = Signer::new("AKIDEXAMPLE", "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY", "us-east-1", "service");
//!
//! let request = Request::get("https://example.amazonaws.com/").body(()).unwrap();
//! let now = Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap();
//! let request = signer.sign_at(request, now).unwrap();
//!
//! assert_eq!(request.headers()["x-amz-date"], "20150830T123600Z");
//! assert_eq!(
//!     request.headers()["authorization"],
//!     "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request,\
//!      SignedHeaders=host;x-amz-content-sha256;x-amz-date,\
//!      Signature=726c5c4879a6b4ccbbd3b24edbd6b8826d34f87450fbbf4e85546fc7ba9c1642"
//! );
//! ```
//!
//! # Presigning a URL
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use http::Uri;
//! use scratchstack_aws_signer::Signer;
//!
//! let signer = Signer::new("AKIDEXAMPLE", "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY", "us-east-1", "service");
//! let uri = Uri::from_static("https://example.amazonaws.com/?Action=ListUsers&Version=2010-05-08");
//! let now = Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap();
//!
//! // Lifetimes above 7 days are clamped to 604800 seconds.
//! let url = signer.sign_uri_at(&uri, Some(999_999_999), now).unwrap();
//! assert!(url.contains("&X-Amz-Expires=604800&"));
//! assert!(url.contains("&X-Amz-Signature="));
//! ```
//!
//! # Temporary credentials
//! Use [Signer::builder] to supply a session token. It is sent as the `X-Amz-Security-Token` header (or query
//! parameter, when presigning) and is covered by the signature.
//!
//! # Logging
//! The canonical request and string to sign are logged at `trace` level through the [log] crate. Secret keys,
//! signing keys, and session tokens are never logged.
#![warn(missing_docs)]

mod augment;
mod body;
mod canonical;
mod chronoutil;
mod constants;
mod crypto;
mod error;
mod signer;
mod signing_key;

#[cfg(test)]
mod aws4;

pub use {
    body::SignableBody,
    canonical::{canonicalize_query_string, canonicalize_uri_path, is_rfc3986_unreserved},
    error::SigningError,
    signer::{Signer, SignerBuilder, SignerBuilderError},
};

#[cfg(any(doc, feature = "unstable"))]
pub use {
    canonical::CanonicalRequest,
    signing_key::{KDateKey, KRegionKey, KSecretKey, KServiceKey, KSigningKey},
};
