//! The session token cell, shared between the tracker and the HTTP client
//!
//! Token issuance belongs to the external auth service; the engine's only contract is
//! "authenticated iff a token is present", and "unauthenticated response from any call
//! implies the token is cleared".

use std::sync::{Arc, Mutex};

/// A cloneable handle to the session token.
///
/// All clones share the same cell, so a logout triggered by one collaborator (e.g. a 401
/// observed by the HTTP client's caller) is immediately visible to the others.
#[derive(Clone, Debug, Default)]
pub struct Session {
    token: Arc<Mutex<Option<String>>>,
}

impl Session {
    /// Create a session with no token (unauthenticated)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session that is already authenticated
    pub fn with_token<S: ToString>(token: S) -> Self {
        let session = Self::new();
        session.login(token);
        session
    }

    /// Store the token produced by the external auth flow
    pub fn login<S: ToString>(&self, token: S) {
        *self.token.lock().unwrap() = Some(token.to_string());
    }

    /// Clear the token. Idempotent.
    pub fn logout(&self) {
        *self.token.lock().unwrap() = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.lock().unwrap().is_some()
    }

    /// The current token, if any
    pub fn token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }
}
