//! The error type shared by the reconciliation engine, the digest engine, and the stores.
//!
//! Errors name the endpoint, method, and host involved in a failure so that it can be diagnosed
//! from the message alone. They never carry plaintext passwords or salts.

use thiserror::Error;

/// Everything that can go wrong while reconciling a resource or computing a digest.
#[derive(Debug, Error)]
pub enum Error {
    /// The server could not be reached, e.g. a connection or TLS failure.
    #[error("could not reach {host}: {message}")]
    Transport { host: String, message: String },

    /// The server rejected the configured credentials.
    #[error("authentication failed for user {username}")]
    Authentication { username: String },

    /// The credentials were accepted, but the user may not perform this request.
    #[error("access denied: {method} {endpoint}")]
    Authorization { method: String, endpoint: String },

    /// The server has no resource at this endpoint.
    ///
    /// [Reconciler](crate::reconcile::Reconciler) treats this as "resource absent" on its initial
    /// lookup when permitted to. Everywhere else it is fatal.
    #[error("not found: {method} {endpoint}")]
    NotFound { method: String, endpoint: String },

    /// The server could not understand the request (HTTP 400).
    #[error("malformed request: {method} {endpoint}")]
    MalformedRequest { method: String, endpoint: String },

    /// The endpoint does not support the request method (HTTP 405).
    #[error("method not allowed: {method} {endpoint}")]
    MethodNotAllowed { method: String, endpoint: String },

    /// The server failed while handling the request (HTTP 5xx).
    #[error("server error {status}: {method} {endpoint}")]
    Server {
        method: String,
        endpoint: String,
        status: u16,
    },

    /// The server answered with a non-success status that has no more specific variant.
    #[error("unexpected status {status}: {method} {endpoint}")]
    UnexpectedStatus {
        method: String,
        endpoint: String,
        status: u16,
    },

    /// The server's response body could not be interpreted as a resource record.
    #[error("invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },

    /// A digest was requested with a mode that doesn't exist.
    #[error("unsupported digest mode: {0:?} (expected \"plain-md5\" or \"salted\")")]
    UnsupportedDigestMode(String),

    /// A duty schedule entry had an impossible time.
    #[error("invalid duty schedule: {0}")]
    InvalidSchedule(String),

    /// A record could not be written in the wire format.
    #[error("could not serialize record: {0}")]
    Serialization(String),
}

impl Error {
    /// Returns whether this is an [Error::NotFound].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

/// Result type for reconciliation and digest operations.
pub type Result<T> = std::result::Result<T, Error>;
