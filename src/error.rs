//! The error type shared by every fallible operation of this crate

use thiserror::Error;

/// Everything that can go wrong when talking to the remote task store, or
/// when rejecting a payload before it is sent.
///
/// Callers usually only need to branch on [`Error::Unauthorized`]: any other
/// variant is logged and the operation is abandoned (no automatic retry).
#[derive(Debug, Error)]
pub enum Error {
    /// A network or transport failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store rejected the credentials (HTTP 401). This always triggers the logout path.
    #[error("the task store rejected the session credentials")]
    Unauthorized,

    /// The store answered with a status code this crate does not expect
    #[error("unexpected HTTP status code {0}")]
    UnexpectedStatus(u16),

    /// The store answered with a body this crate cannot decode
    #[error("unable to decode the server response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A reminder was requested with a malformed destination address.
    /// This is rejected locally, before any network call.
    #[error("invalid email address: {0:?}")]
    InvalidEmail(String),

    /// A locally rejected payload (e.g. a task with an empty title)
    #[error("invalid task data: {0}")]
    InvalidTask(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
