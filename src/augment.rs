//! Filling in the fields a request must carry before it can be canonicalized and signed.
//!
//! Caller-supplied values are never overwritten; only missing fields are added.

use {
    crate::{
        body::SignableBody,
        canonical::{body_sha256, query_parameter, uri_escape},
        chronoutil::{format_iso8601_compact, ParseSigV4Timestamp},
        constants::*,
        SigningError,
    },
    chrono::{DateTime, SubsecRound, Utc},
    http::{
        header::{HeaderMap, HeaderName, HeaderValue},
        method::Method,
        request::Request,
        uri::{PathAndQuery, Uri},
        Error as HttpError,
    },
    log::debug,
};

/// Error message: `"Date must be in ISO-8601 'basic format' or RFC 1123 format. Got '...'."`
const MSG_MALFORMED_DATE: &str = "Date must be in ISO-8601 'basic format' or RFC 1123 format.";

/// Resolve the request timestamp from the `X-Amz-Date` header, then the `X-Amz-Date` query parameter, then the
/// `Date` header.
///
/// Returns `Ok(None)` if none of them is present.
pub(crate) fn request_timestamp(
    headers: &HeaderMap<HeaderValue>,
    uri: &Uri,
) -> Result<Option<DateTime<Utc>>, SigningError> {
    if let Some(value) = headers.get(HDR_X_AMZ_DATE) {
        return parse_timestamp(&String::from_utf8_lossy(value.as_bytes())).map(Some);
    }

    if let Some(value) = query_parameter(uri.query().unwrap_or(""), QP_X_AMZ_DATE) {
        return parse_timestamp(&value).map(Some);
    }

    match headers.get(HDR_DATE) {
        Some(value) => parse_timestamp(&String::from_utf8_lossy(value.as_bytes())).map(Some),
        None => Ok(None),
    }
}

/// Parse a timestamp in either of the formats accepted for `X-Amz-Date` or `Date`.
pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, SigningError> {
    match DateTime::<Utc>::parse_from_sigv4(value) {
        Ok(timestamp) => Ok(timestamp),
        Err(e) => {
            debug!("Failed to parse timestamp {:?}: {}", value, e);
            Err(SigningError::MalformedDate(format!("{} Got '{}'.", MSG_MALFORMED_DATE, value)))
        }
    }
}

/// Add the headers required for header-based signing to the request.
///
/// * The request timestamp is taken from the `X-Amz-Date` header, the `X-Amz-Date` query parameter, or the `Date`
///   header. If none is present, `now` (truncated to whole seconds) is used.
/// * If the `X-Amz-Date` header is missing, it is set from the resolved timestamp.
/// * If `X-Amz-Content-Sha256` is missing, it is set to the hex SHA-256 of the body.
/// * If a session token is supplied and `X-Amz-Security-Token` is missing, it is added.
///
/// The resolved timestamp is returned; the string to sign and credential scope must use this same value.
pub(crate) fn augment_request<B: SignableBody>(
    request: &mut Request<B>,
    session_token: Option<&str>,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, SigningError> {
    let timestamp = match request_timestamp(request.headers(), request.uri())? {
        Some(timestamp) => {
            debug!("Using request timestamp {}", format_iso8601_compact(&timestamp));
            timestamp
        }
        None => now.trunc_subsecs(0),
    };

    if !request.headers().contains_key(HDR_X_AMZ_DATE) {
        let value = format_iso8601_compact(&timestamp);
        debug!("Adding {}: {}", HDR_X_AMZ_DATE, value);
        request.headers_mut().insert(HeaderName::from_static(HDR_X_AMZ_DATE), HeaderValue::from_str(&value)?);
    }

    if !request.headers().contains_key(HDR_X_AMZ_CONTENT_SHA256) {
        let hash = body_sha256(request.body().body_bytes());
        debug!("Adding {}: {}", HDR_X_AMZ_CONTENT_SHA256, hash);
        request.headers_mut().insert(HeaderName::from_static(HDR_X_AMZ_CONTENT_SHA256), HeaderValue::from_str(&hash)?);
    }

    if let Some(token) = session_token {
        if !request.headers().contains_key(HDR_X_AMZ_SECURITY_TOKEN) {
            debug!("Adding {} header", HDR_X_AMZ_SECURITY_TOKEN);
            let mut value = HeaderValue::from_str(token)?;
            value.set_sensitive(true);
            request.headers_mut().insert(HeaderName::from_static(HDR_X_AMZ_SECURITY_TOKEN), value);
        }
    }

    Ok(timestamp)
}

/// The values to fill into a presigned URL's query string.
pub(crate) struct PresignParameters<'a> {
    /// Produces the `X-Amz-Credential` value for the resolved timestamp.
    pub(crate) credential: &'a dyn Fn(&DateTime<Utc>) -> String,

    /// Requested lifetime of the URL in seconds; clamped to the allowed range.
    pub(crate) expires_in: Option<u64>,

    /// Session token to embed, if any.
    pub(crate) session_token: Option<&'a str>,

    /// The fallback timestamp if the URI does not carry `X-Amz-Date`.
    pub(crate) now: DateTime<Utc>,
}

/// Clamp a requested URL lifetime to `[1, 604800]` seconds, defaulting to the maximum.
#[inline]
pub(crate) fn clamp_expires(expires_in: Option<u64>) -> u64 {
    expires_in.unwrap_or(MAX_EXPIRES_SECONDS).clamp(MIN_EXPIRES_SECONDS, MAX_EXPIRES_SECONDS)
}

/// Build a `GET` request for the URI with every query parameter needed for presigning present.
///
/// Missing `X-Amz-Date`, `X-Amz-Algorithm`, `X-Amz-Credential`, `X-Amz-Expires`, `X-Amz-SignedHeaders` (always `host`),
/// and `X-Amz-Security-Token` parameters are appended to the existing query string; parameters already on the URI are
/// left untouched. The caller's URI is not modified.
///
/// Returns the new request along with the resolved timestamp.
pub(crate) fn presign_request(
    uri: &Uri,
    params: &PresignParameters<'_>,
) -> Result<(Request<()>, DateTime<Utc>), SigningError> {
    let original_query = uri.query().unwrap_or("");
    let mut query = original_query.to_string();

    let timestamp = match query_parameter(original_query, QP_X_AMZ_DATE) {
        Some(value) => parse_timestamp(&value)?,
        None => {
            let timestamp = params.now.trunc_subsecs(0);
            append_parameter(&mut query, QP_X_AMZ_DATE, &format_iso8601_compact(&timestamp));
            timestamp
        }
    };

    if query_parameter(original_query, QP_X_AMZ_ALGORITHM).is_none() {
        append_parameter(&mut query, QP_X_AMZ_ALGORITHM, AWS4_HMAC_SHA256);
    }

    if query_parameter(original_query, QP_X_AMZ_CREDENTIAL).is_none() {
        append_parameter(&mut query, QP_X_AMZ_CREDENTIAL, &(params.credential)(&timestamp));
    }

    if query_parameter(original_query, QP_X_AMZ_EXPIRES).is_none() {
        let expires = clamp_expires(params.expires_in);
        if params.expires_in.is_some_and(|requested| requested != expires) {
            debug!("Requested expiration {:?} clamped to {}", params.expires_in, expires);
        }
        append_parameter(&mut query, QP_X_AMZ_EXPIRES, &expires.to_string());
    }

    if query_parameter(original_query, QP_X_AMZ_SIGNED_HEADERS).is_none() {
        append_parameter(&mut query, QP_X_AMZ_SIGNED_HEADERS, HDR_HOST);
    }

    if let Some(token) = params.session_token {
        if query_parameter(original_query, QP_X_AMZ_SECURITY_TOKEN).is_none() {
            append_parameter(&mut query, QP_X_AMZ_SECURITY_TOKEN, token);
        }
    }

    let path_and_query = PathAndQuery::try_from(format!("{}?{}", uri.path(), query)).map_err(HttpError::from)?;
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query);
    let presign_uri = Uri::from_parts(parts).map_err(HttpError::from)?;

    let request = Request::builder().method(Method::GET).uri(presign_uri).body(())?;
    Ok((request, timestamp))
}

/// Append `name=value` to a raw query string, escaping the value.
fn append_parameter(query: &mut String, name: &str, value: &str) {
    if !query.is_empty() {
        query.push('&');
    }

    query.push_str(name);
    query.push('=');
    query.push_str(&uri_escape(value.as_bytes()));
}
