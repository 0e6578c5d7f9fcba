//! Common constants used throughout the crate.
//!
//! This is consolidated here so the entire crate is on the same page about these constant values.
//! If a value is spelled incorrectly, at least it can be fixed in one spot.
//!
//! Tests that are checking the content of a header or query string should not use these
//! constants; they should use hard-coded strings so the tests are also testing for misspellings.
//!
//! Please keep this file organized alphabetically.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

/// Algorithm for AWS SigV4
pub(crate) const AWS4_HMAC_SHA256: &str = "AWS4-HMAC-SHA256";

/// Prefix applied to the secret key before deriving `kDate`.
pub(crate) const AWS4_PREFIX: &[u8] = b"AWS4";

/// String included at the end of the AWS SigV4 credential scope
pub(crate) const AWS4_REQUEST: &str = "aws4_request";

/// Default port for `http` URIs.
pub(crate) const DEFAULT_HTTP_PORT: u16 = 80;

/// Default port for `https` URIs.
pub(crate) const DEFAULT_HTTPS_PORT: u16 = 443;

/// Header for `authorization`
pub(crate) const HDR_AUTHORIZATION: &str = "authorization";

/// Header for `date`
pub(crate) const HDR_DATE: &str = "date";

/// Header for `host`
pub(crate) const HDR_HOST: &str = "host";

/// Header for `x-amz-content-sha256`
pub(crate) const HDR_X_AMZ_CONTENT_SHA256: &str = "x-amz-content-sha256";

/// Header for delivering the alternate date
pub(crate) const HDR_X_AMZ_DATE: &str = "x-amz-date";

/// Header for delivering the session token
pub(crate) const HDR_X_AMZ_SECURITY_TOKEN: &str = "x-amz-security-token";

/// Compact ISO8601 format used for the string to sign.
pub(crate) const ISO8601_COMPACT_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Short date format used in the credential scope.
pub(crate) const ISO8601_DATE_FORMAT: &str = "%Y%m%d";

/// Longest lifetime of a presigned URL, in seconds (7 days).
pub(crate) const MAX_EXPIRES_SECONDS: u64 = 604_800;

/// Shortest lifetime of a presigned URL, in seconds.
pub(crate) const MIN_EXPIRES_SECONDS: u64 = 1;

/// Query parameter for the signature algorithm
pub(crate) const QP_X_AMZ_ALGORITHM: &str = "X-Amz-Algorithm";

/// Query parameter for delivering the access key
pub(crate) const QP_X_AMZ_CREDENTIAL: &str = "X-Amz-Credential";

/// Query parameter for delivering the date
pub(crate) const QP_X_AMZ_DATE: &str = "X-Amz-Date";

/// Query parameter for delivering the expiration time of a presigned URL
pub(crate) const QP_X_AMZ_EXPIRES: &str = "X-Amz-Expires";

/// Query parameter for delivering the session token
pub(crate) const QP_X_AMZ_SECURITY_TOKEN: &str = "X-Amz-Security-Token";

/// Query parameter for delivering the signature
pub(crate) const QP_X_AMZ_SIGNATURE: &str = "X-Amz-Signature";

/// Query parameter specifying the signed headers
pub(crate) const QP_X_AMZ_SIGNED_HEADERS: &str = "X-Amz-SignedHeaders";

/// The length of a SHA-256 digest in bytes.
pub(crate) const SHA256_OUTPUT_LEN: usize = 32;

/// Characters escaped by the AWS `UriEncode` routine: everything except the RFC 3986 unreserved
/// characters `A-Z`, `a-z`, `0-9`, `-`, `.`, `_`, and `~`. Applied to individual path segments
/// and to query keys and values, so `/` is escaped as well.
pub(crate) static URI_ESCAPE_SET: AsciiSet = NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Token used for `x-amz-content-sha256` when the payload is unsigned
pub(crate) const XACS_UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";
