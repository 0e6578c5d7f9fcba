//! The AWS SigV4 request signer.
//!
//! A [Signer] holds an immutable credential tuple and produces either an `Authorization` header for a request
//! ([Signer::sign]) or a presigned URL ([Signer::sign_uri]).

use {
    crate::{
        augment::{augment_request, presign_request, PresignParameters},
        body::SignableBody,
        canonical::CanonicalRequest,
        chronoutil::{format_iso8601_compact, format_iso8601_date},
        constants::*,
        signing_key::KSecretKey,
        SigningError,
    },
    chrono::{DateTime, Utc},
    derive_builder::Builder,
    http::{
        header::{HeaderName, HeaderValue},
        request::Request,
        uri::Uri,
    },
    log::{debug, trace},
    std::fmt::{Debug, Formatter, Result as FmtResult},
};

/// Signs HTTP requests and presigns URLs using AWS SigV4.
///
/// A `Signer` is immutable once constructed and may be shared across threads.
#[derive(Builder, Clone)]
#[builder(derive(Debug))]
pub struct Signer {
    /// The access key id, e.g. `AKIDEXAMPLE`.
    #[builder(setter(into))]
    access_key_id: String,

    /// The secret key, held with the `AWS4` prefix applied.
    #[builder(setter(custom))]
    secret_key: KSecretKey,

    /// The region the requests are scoped to, e.g. `us-east-1`.
    #[builder(setter(into))]
    region: String,

    /// The service the requests are scoped to, e.g. `s3`.
    #[builder(setter(into))]
    service: String,

    /// The optional session token for temporary credentials.
    #[builder(setter(into, strip_option), default)]
    session_token: Option<String>,
}

impl Signer {
    /// Create a new `Signer` from long-term credentials.
    pub fn new(
        access_key_id: impl Into<String>,
        secret_key: impl AsRef<str>,
        region: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_key: KSecretKey::from(secret_key.as_ref()),
            region: region.into(),
            service: service.into(),
            session_token: None,
        }
    }

    /// Create a [SignerBuilder] to construct a `Signer`, e.g. one carrying a session token.
    #[inline]
    pub fn builder() -> SignerBuilder {
        SignerBuilder::default()
    }

    /// Retrieve the access key id.
    #[inline]
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Retrieve the region.
    #[inline]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Retrieve the service.
    #[inline]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Retrieve the session token, if any.
    #[inline]
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    /// Return the credential scope for the given timestamp: `YYYYMMDD/region/service/aws4_request`.
    pub fn credential_scope(&self, timestamp: &DateTime<Utc>) -> String {
        format!("{}/{}/{}/{}", format_iso8601_date(timestamp), self.region, self.service, AWS4_REQUEST)
    }

    /// Return the credential for the given timestamp: `access_key_id/YYYYMMDD/region/service/aws4_request`.
    pub(crate) fn credential(&self, timestamp: &DateTime<Utc>) -> String {
        format!("{}/{}", self.access_key_id, self.credential_scope(timestamp))
    }

    /// Return the string to sign for a canonical request at the given timestamp.
    pub(crate) fn string_to_sign(&self, canonical_request: &CanonicalRequest, timestamp: &DateTime<Utc>) -> Vec<u8> {
        let hashed_canonical_request = hex::encode(canonical_request.canonical_request_sha256());
        let timestamp_str = format_iso8601_compact(timestamp);
        let cscope = self.credential_scope(timestamp);

        let mut result = Vec::with_capacity(
            AWS4_HMAC_SHA256.len() + 1 + timestamp_str.len() + 1 + cscope.len() + 1 + hashed_canonical_request.len(),
        );
        result.extend(AWS4_HMAC_SHA256.as_bytes());
        result.push(b'\n');
        result.extend(timestamp_str.as_bytes());
        result.push(b'\n');
        result.extend(cscope.as_bytes());
        result.push(b'\n');
        result.extend(hashed_canonical_request.as_bytes());

        trace!("String to sign:\n{}", String::from_utf8_lossy(&result));
        result
    }

    /// Compute the hex signature of a canonical request at the given timestamp.
    pub(crate) fn calculate_signature(
        &self,
        canonical_request: &CanonicalRequest,
        timestamp: &DateTime<Utc>,
    ) -> String {
        let string_to_sign = self.string_to_sign(canonical_request, timestamp);
        let signing_key = self.secret_key.to_ksigning(timestamp.date_naive(), &self.region, &self.service);
        signing_key.sign(&string_to_sign)
    }

    /// Return the `Authorization` header value for a canonical request at the given timestamp.
    pub(crate) fn authorization(&self, canonical_request: &CanonicalRequest, timestamp: &DateTime<Utc>) -> String {
        format!(
            "{} Credential={},SignedHeaders={},Signature={}",
            AWS4_HMAC_SHA256,
            self.credential(timestamp),
            canonical_request.signed_headers_string(),
            self.calculate_signature(canonical_request, timestamp)
        )
    }

    /// Sign a request, using the current time if the request carries no `X-Amz-Date` or `Date` header and no
    /// `X-Amz-Date` query parameter.
    ///
    /// See [Signer::sign_at].
    pub fn sign<B: SignableBody>(&self, request: Request<B>) -> Result<Request<B>, SigningError> {
        self.sign_at(request, Utc::now())
    }

    /// Sign a request, returning it with an `Authorization` header attached.
    ///
    /// Before signing, missing fields are filled in:
    /// * The timestamp is taken from the `X-Amz-Date` header, the `X-Amz-Date` query parameter, or the `Date` header,
    ///   falling back to `now`. `X-Amz-Date` is set from it if missing.
    /// * `X-Amz-Content-Sha256` is set to the hex SHA-256 of the body.
    /// * `X-Amz-Security-Token` is set if this signer carries a session token.
    ///
    /// Every header on the request except `Authorization` is signed. Any existing `Authorization` header is replaced.
    pub fn sign_at<B: SignableBody>(
        &self,
        mut request: Request<B>,
        now: DateTime<Utc>,
    ) -> Result<Request<B>, SigningError> {
        let timestamp = augment_request(&mut request, self.session_token(), now)?;

        let (parts, body) = request.into_parts();
        let canonical_request = CanonicalRequest::from_request_parts(&parts)?;
        let mut request = Request::from_parts(parts, body);

        let authorization = self.authorization(&canonical_request, &timestamp);
        debug!(
            "Signed {} {} with credential {}, payload hash {}",
            canonical_request.request_method(),
            canonical_request.canonical_path(),
            self.credential(&timestamp),
            canonical_request.payload_hash()
        );

        let mut value = HeaderValue::from_str(&authorization)?;
        value.set_sensitive(true);
        request.headers_mut().insert(HeaderName::from_static(HDR_AUTHORIZATION), value);
        Ok(request)
    }

    /// Presign a URL for a `GET` request, valid for `expires_in` seconds from now.
    ///
    /// See [Signer::sign_uri_at].
    pub fn sign_uri(&self, uri: &Uri, expires_in: Option<u64>) -> Result<String, SigningError> {
        self.sign_uri_at(uri, expires_in, Utc::now())
    }

    /// Presign a URL for a `GET` request.
    ///
    /// `expires_in` is the lifetime of the URL in seconds. It defaults to 604800 (7 days) and is clamped to the range
    /// `[1, 604800]`. If the URI already carries an `X-Amz-Date` parameter, that timestamp is used instead of `now`;
    /// other `X-Amz-*` parameters already present are also kept.
    ///
    /// The returned URL has the canonical query string followed by `X-Amz-Signature`. The input URI is not modified.
    pub fn sign_uri_at(&self, uri: &Uri, expires_in: Option<u64>, now: DateTime<Utc>) -> Result<String, SigningError> {
        let credential = |timestamp: &DateTime<Utc>| self.credential(timestamp);
        let params = PresignParameters {
            credential: &credential,
            expires_in,
            session_token: self.session_token(),
            now,
        };

        let (request, timestamp) = presign_request(uri, &params)?;
        let (parts, _) = request.into_parts();
        let canonical_request = CanonicalRequest::from_request_parts(&parts)?;
        let signature = self.calculate_signature(&canonical_request, &timestamp);

        let presigned_uri = &parts.uri;
        let mut result = String::with_capacity(256);
        if let Some(scheme) = presigned_uri.scheme_str() {
            result.push_str(scheme);
            result.push_str("://");
        }

        if let Some(authority) = presigned_uri.authority() {
            result.push_str(authority.as_str());
        }

        result.push_str(presigned_uri.path());
        result.push('?');
        result.push_str(canonical_request.canonical_query_string());
        result.push('&');
        result.push_str(QP_X_AMZ_SIGNATURE);
        result.push('=');
        result.push_str(&signature);

        debug!("Presigned {} with credential {}", canonical_request.canonical_path(), self.credential(&timestamp));
        Ok(result)
    }
}

impl Debug for Signer {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Signer")
            .field("access_key_id", &self.access_key_id)
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .field("service", &self.service)
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl SignerBuilder {
    /// Set the secret key.
    pub fn secret_key(&mut self, secret_key: impl AsRef<str>) -> &mut Self {
        self.secret_key = Some(KSecretKey::from(secret_key.as_ref()));
        self
    }

    /// Retrieve the access key id set on this builder.
    pub fn get_access_key_id(&self) -> Option<&str> {
        self.access_key_id.as_deref()
    }

    /// Retrieve the session token set on this builder.
    pub fn get_session_token(&self) -> Option<&str> {
        self.session_token.as_ref()?.as_deref()
    }
}
