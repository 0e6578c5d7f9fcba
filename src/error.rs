use {
    http::{header::InvalidHeaderValue, Error as HttpError},
    std::{
        error::Error,
        fmt::{Display, Formatter, Result as FmtResult},
    },
};

/// Error returned when an AWS SigV4 signature cannot be computed for a request.
#[derive(Debug)]
#[non_exhaustive]
pub enum SigningError {
    /// A computed header value could not be represented as an HTTP header value. This happens when the access key
    /// or session token contains characters that are not valid in a header.
    InvalidHeaderValue(InvalidHeaderValue),

    /// The presigned URI could not be rebuilt from its components.
    InvalidUri(HttpError),

    /// The `X-Amz-Date` or `Date` value could not be parsed. Sample message:
    /// `Date must be in ISO-8601 'basic format' or RFC 1123 format. Got 'yesterday'.`
    MalformedDate(/* message */ String),

    /// The request URI has no host and the request carries no `Host` header, so the `host` signed header cannot be
    /// produced. Signing requires an absolute URI.
    MissingHost(/* message */ String),
}

impl Display for SigningError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::InvalidHeaderValue(ref e) => write!(f, "Invalid header value: {}", e),
            Self::InvalidUri(ref e) => write!(f, "Invalid URI: {}", e),
            Self::MalformedDate(msg) => f.write_str(msg),
            Self::MissingHost(msg) => f.write_str(msg),
        }
    }
}

impl Error for SigningError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidHeaderValue(ref e) => Some(e),
            Self::InvalidUri(ref e) => Some(e),
            _ => None,
        }
    }
}

impl From<InvalidHeaderValue> for SigningError {
    fn from(e: InvalidHeaderValue) -> SigningError {
        SigningError::InvalidHeaderValue(e)
    }
}

impl From<HttpError> for SigningError {
    fn from(e: HttpError) -> SigningError {
        SigningError::InvalidUri(e)
    }
}
