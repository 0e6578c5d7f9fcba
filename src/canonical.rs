//! Canonicalization functionality for signature generation.
//!
//! This includes the URI path and query string normalization rules, header folding, and the assembly of an AWS SigV4
//! canonical request.
//!
//! **Stability of this module is not guaranteed except for items exposed at the crate root**.
//! The functions and types are subject to change in minor/patch versions. This is exposed for
//! testing purposes only.

use {
    crate::{
        constants::*,
        crypto::{sha256, sha256_hex},
        SigningError,
    },
    http::{
        header::{HeaderMap, HeaderValue},
        method::Method,
        request::Parts,
        uri::Uri,
    },
    log::trace,
    percent_encoding::{percent_decode_str, percent_encode},
    qualifier_attr::qualifiers,
    std::fmt::{Debug, Formatter, Result as FmtResult},
};

/// A canonicalized request for AWS SigV4.
///
/// This is mainly used internally for generating the canonical request for signing, but is
/// exposed for testing and debugging purposes.
///
/// **The stability of this struct is not guaranteed.** The fields and methods are subject to
/// change in minor/patch versions.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
#[derive(Clone)]
struct CanonicalRequest {
    /// The HTTP method for the request (e.g., "GET", "POST", etc.)
    request_method: String,

    /// The canonicalized path from the HTTP request. This is guaranteed to be ASCII.
    canonical_path: String,

    /// The canonicalized query string. This is guaranteed to be ASCII.
    canonical_query_string: String,

    /// The signed header names, lowercased and sorted.
    signed_headers: Vec<String>,

    /// The folded value for each signed header present in the request, in `signed_headers` order.
    ///
    /// The encoding of header values is Latin 1 (ISO 8859-1), so these are kept as bytes.
    canonical_headers: Vec<(String, Vec<u8>)>,

    /// The payload hash: the hex SHA-256 of the body, or `UNSIGNED-PAYLOAD`.
    payload_hash: String,
}

impl CanonicalRequest {
    /// Create a `CanonicalRequest` from the components of an HTTP request.
    ///
    /// If the URI carries an `X-Amz-SignedHeaders` query parameter, exactly those headers are signed. Otherwise,
    /// every header on the request except `authorization` is signed. A `host` header is synthesized from the URI if
    /// one is not present.

    #[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
    #[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
    fn new(
        method: &Method,
        uri: &Uri,
        headers: &HeaderMap<HeaderValue>,
        payload_hash: impl Into<String>,
    ) -> Result<Self, SigningError> {
        let query = uri.query().unwrap_or("");
        let signed_headers = match query_parameter(query, QP_X_AMZ_SIGNED_HEADERS) {
            Some(names) => parse_signed_headers(&names),
            None => request_header_names(headers),
        };

        let mut canonical_headers = Vec::with_capacity(signed_headers.len());
        for name in &signed_headers {
            if let Some(value) = fold_header_values(headers, name) {
                canonical_headers.push((name.clone(), value));
            } else if name == HDR_HOST {
                let host = host_from_uri(uri)
                    .ok_or_else(|| SigningError::MissingHost(format!("Request URI has no host: {}", uri)))?;
                trace!("Synthesized host header from URI: {}", host);
                canonical_headers.push((name.clone(), host.into_bytes()));
            }
        }

        Ok(Self {
            request_method: method.as_str().to_ascii_uppercase(),
            canonical_path: canonicalize_uri_path(uri.path()),
            canonical_query_string: canonicalize_query_string(query),
            signed_headers,
            canonical_headers,
            payload_hash: payload_hash.into(),
        })
    }

    /// Create a `CanonicalRequest` from HTTP request [Parts]. The payload hash is taken from the
    /// `x-amz-content-sha256` header; if absent, the payload is `UNSIGNED-PAYLOAD`.

    #[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
    #[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
    fn from_request_parts(parts: &Parts) -> Result<Self, SigningError> {
        Self::new(&parts.method, &parts.uri, &parts.headers, payload_hash(&parts.headers))
    }

    /// Retrieve the HTTP request method.

    #[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
    #[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
    #[inline(always)]
    fn request_method(&self) -> &str {
        &self.request_method
    }

    /// Retrieve the canonicalized URI path from the request.

    #[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
    #[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
    #[inline(always)]
    fn canonical_path(&self) -> &str {
        &self.canonical_path
    }

    /// Retrieve the canonical query string from the request.

    #[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
    #[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
    #[inline(always)]
    fn canonical_query_string(&self) -> &str {
        &self.canonical_query_string
    }

    /// Retrieve the signed header names, lowercased and sorted.

    #[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
    #[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
    #[inline(always)]
    fn signed_headers(&self) -> &[String] {
        &self.signed_headers
    }

    /// Retrieve the signed headers as the `;`-delimited string used in the canonical request and authorization.

    #[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
    #[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
    fn signed_headers_string(&self) -> String {
        self.signed_headers().join(";")
    }

    /// Retrieve the payload hash.

    #[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
    #[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
    #[inline(always)]
    fn payload_hash(&self) -> &str {
        &self.payload_hash
    }

    /// Get the [canonical request to hash](https://docs.aws.amazon.com/general/latest/gr/sigv4-create-canonical-request.html)
    /// for the request.

    #[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
    #[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
    fn canonical_request(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(1024);
        result.extend(self.request_method.as_bytes());
        result.push(b'\n');
        result.extend(self.canonical_path.as_bytes());
        result.push(b'\n');
        result.extend(self.canonical_query_string.as_bytes());
        result.push(b'\n');

        for (name, value) in &self.canonical_headers {
            result.extend(name.as_bytes());
            result.push(b':');
            result.extend(value);
            result.push(b'\n');
        }

        result.push(b'\n');
        result.extend(self.signed_headers_string().as_bytes());
        result.push(b'\n');
        result.extend(self.payload_hash.as_bytes());

        trace!("Canonical request:\n{}", String::from_utf8_lossy(&result));

        result
    }

    /// Get the SHA-256 hash of the [canonical request](https://docs.aws.amazon.com/general/latest/gr/sigv4-create-canonical-request.html).

    #[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
    #[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
    fn canonical_request_sha256(&self) -> [u8; SHA256_OUTPUT_LEN] {
        sha256(&self.canonical_request())
    }
}

impl Debug for CanonicalRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let headers: Vec<String> = self
            .canonical_headers
            .iter()
            .map(|(name, value)| format!("{}: {}", name, String::from_utf8_lossy(value)))
            .collect();

        f.debug_struct("CanonicalRequest")
            .field("request_method", &self.request_method)
            .field("canonical_path", &self.canonical_path)
            .field("canonical_query_string", &self.canonical_query_string)
            .field("signed_headers", &self.signed_headers)
            .field("canonical_headers", &headers)
            .field("payload_hash", &self.payload_hash)
            .finish()
    }
}

/// Normalizes the specified URI path: redundant slashes and `.` segments are removed, `..` segments remove the
/// preceding segment, and each remaining segment is percent-encoded with the AWS `UriEncode` rules.
///
/// A `..` at the root is ignored rather than rejected. A trailing slash on the input is preserved. The result always
/// begins with `/` and normalizing a normalized path returns it unchanged.
pub fn canonicalize_uri_path(uri_path: &str) -> String {
    let mut segments: Vec<String> = Vec::new();

    for segment in uri_path.split('/') {
        let decoded: Vec<u8> = percent_decode_str(segment).collect();
        match decoded.as_slice() {
            b"" | b"." => (),
            b".." => {
                segments.pop();
            }
            _ => segments.push(uri_escape(&decoded)),
        }
    }

    let mut result = String::with_capacity(uri_path.len() + 1);
    result.push('/');
    result.push_str(&segments.join("/"));

    if uri_path.ends_with('/') && !result.ends_with('/') {
        result.push('/');
    }

    result
}

/// Canonicalize a raw query string: each key and value is percent-decoded and re-encoded, then the parameters are
/// stably sorted by key and then by value (byte-wise) and joined with `&`. `X-Amz-Signature` is omitted.
pub fn canonicalize_query_string(query_string: &str) -> String {
    query_string_to_normalized_pairs(query_string)
        .into_iter()
        .filter(|(key, _)| key != QP_X_AMZ_SIGNATURE)
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&")
}

/// Indicates whether the specified byte is RFC3986 unreserved -- i.e., can be represented without being
/// percent-encoded, e.g. '?' -> '%3F'.
#[inline(always)]
pub fn is_rfc3986_unreserved(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'.' || c == b'_' || c == b'~'
}

/// Split a query string into normalized key/value pairs, sorted by key and then value.
///
/// Empty components (`a=1&&b=2`) are skipped; a component without `=` has an empty value. Duplicate keys are kept.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn query_string_to_normalized_pairs(query_string: &str) -> Vec<(String, String)> {
    let mut result: Vec<(String, String)> = query_string
        .split('&')
        .filter(|component| !component.is_empty())
        .map(|component| {
            let (key, value) = component.split_once('=').unwrap_or((component, ""));
            (normalize_query_string_element(key), normalize_query_string_element(value))
        })
        .collect();

    // Stable, byte-wise ordering on (key, value).
    result.sort();
    result
}

/// Return the percent-decoded value of the first query parameter named `name`, if any.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn query_parameter(query_string: &str, name: &str) -> Option<String> {
    query_string.split('&').filter(|component| !component.is_empty()).find_map(|component| {
        let (key, value) = component.split_once('=').unwrap_or((component, ""));
        if percent_decode_str(key).decode_utf8_lossy() == name {
            Some(percent_decode_str(value).decode_utf8_lossy().into_owned())
        } else {
            None
        }
    })
}

/// Normalize a single element (key or value from key=value) of a query string.
fn normalize_query_string_element(element: &str) -> String {
    let decoded: Vec<u8> = percent_decode_str(element).collect();
    uri_escape(&decoded)
}

/// Percent-encode everything outside of the RFC 3986 unreserved set, using uppercase hex digits.
pub(crate) fn uri_escape(bytes: &[u8]) -> String {
    percent_encode(bytes, &URI_ESCAPE_SET).to_string()
}

/// Parse a `;`-delimited signed header list into lowercase, sorted, unique names.
fn parse_signed_headers(names: &str) -> Vec<String> {
    let mut result: Vec<String> =
        names.split(';').map(|name| name.trim().to_ascii_lowercase()).filter(|name| !name.is_empty()).collect();
    result.sort();
    result.dedup();
    result
}

/// Return the lowercase, sorted, unique header names on the request, excluding `authorization` and including `host`.
fn request_header_names(headers: &HeaderMap<HeaderValue>) -> Vec<String> {
    let mut result: Vec<String> =
        headers.keys().map(|name| name.as_str().to_string()).filter(|name| name != HDR_AUTHORIZATION).collect();

    if !headers.contains_key(HDR_HOST) {
        result.push(HDR_HOST.to_string());
    }

    result.sort();
    result.dedup();
    result
}

/// Fold all values for the given header into a single canonical value. Each value is trimmed of leading and
/// trailing whitespace; the values are then sorted byte-wise and joined with `,`.
///
/// Returns `None` if the header is not present.
fn fold_header_values(headers: &HeaderMap<HeaderValue>, name: &str) -> Option<Vec<u8>> {
    let mut values: Vec<&[u8]> = headers.get_all(name).iter().map(|value| value.as_bytes().trim_ascii()).collect();
    if values.is_empty() {
        return None;
    }

    values.sort();
    Some(values.join(&b','))
}

/// Build the `host` header value from the URI authority, omitting the port if it is the scheme's default.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn host_from_uri(uri: &Uri) -> Option<String> {
    let host = uri.host()?;
    let default_port = match uri.scheme_str() {
        Some("http") => Some(DEFAULT_HTTP_PORT),
        Some("https") => Some(DEFAULT_HTTPS_PORT),
        _ => None,
    };

    match uri.port_u16() {
        Some(port) if Some(port) != default_port => Some(format!("{}:{}", host, port)),
        _ => Some(host.to_string()),
    }
}

/// Returns the payload hash for the request: the `x-amz-content-sha256` header value if present, otherwise
/// `UNSIGNED-PAYLOAD`.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn payload_hash(headers: &HeaderMap<HeaderValue>) -> String {
    match headers.get(HDR_X_AMZ_CONTENT_SHA256) {
        Some(value) => String::from_utf8_lossy(value.as_bytes().trim_ascii()).into_owned(),
        None => XACS_UNSIGNED_PAYLOAD.to_string(),
    }
}

/// Returns the hex SHA-256 of a request body.
#[inline]
pub(crate) fn body_sha256(body: &[u8]) -> String {
    sha256_hex(body)
}
