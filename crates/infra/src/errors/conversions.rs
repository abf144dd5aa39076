//! Conversions from external infrastructure errors into domain errors.

use b24rest_domain::RestError;
use reqwest::{Error as HttpError, StatusCode};
use thiserror::Error;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct InfraError(pub RestError);

impl From<InfraError> for RestError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<RestError> for InfraError {
    fn from(value: RestError) -> Self {
        Self(value)
    }
}

/* -------------------------------------------------------------------------- */
/* HTTP status → RestError */
/* -------------------------------------------------------------------------- */

/// Domain error for an HTTP failure status that carried no JSON envelope.
pub fn status_error(status: StatusCode) -> RestError {
    let code = status.as_u16();
    let message = format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

    match code {
        401 | 403 => RestError::Auth(message),
        429 => RestError::Network(message),
        400..=499 => RestError::InvalidInput(message),
        _ => RestError::Network(message),
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → RestError */
/* -------------------------------------------------------------------------- */

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        if value.is_timeout() {
            return Self(RestError::Network("HTTP request timed out".into()));
        }

        if value.is_connect() {
            return Self(RestError::Network("HTTP connection failure".into()));
        }

        if let Some(status) = value.status() {
            return Self(status_error(status));
        }

        if value.is_decode() {
            return Self(RestError::InvalidResponse(format!("undecodable HTTP body: {value}")));
        }

        Self(RestError::Network(value.to_string()))
    }
}
