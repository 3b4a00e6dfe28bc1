//! The live editor session, seen only through read queries
//!
//! The harness never owns the session. Everything the core learns about it
//! goes through [`RemoteStateSource`], which the surrounding harness backs
//! with whatever browser-automation transport it uses.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// A query the remote session refused or could not answer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("remote query failed: {message}")]
pub struct RemoteError {
    pub message: String,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The session as a trait object, the source type step probes run against
pub type Remote = dyn RemoteStateSource;

/// Read access to the live session under test
#[async_trait]
pub trait RemoteStateSource: Send + Sync {
    /// Run `script` in the page with `args` bound to `arguments` and return
    /// whatever it returns, as JSON
    async fn execute(&self, script: &str, args: &[Value]) -> Result<Value, RemoteError>;

    /// Handles of every window (or tab) the session currently has open
    async fn window_handles(&self) -> Result<Vec<String>, RemoteError>;
}
