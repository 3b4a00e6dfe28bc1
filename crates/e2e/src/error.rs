//! Error types for step execution

use serde_json::Value;
use thiserror::Error;
use wedtest_common::{FlagMismatch, RemoteError, Timeout};

#[derive(Error, Debug)]
pub enum E2eError {
    #[error(transparent)]
    Harness(#[from] wedtest_common::Error),

    #[error(transparent)]
    Timeout(#[from] Timeout),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Unexpected value for {what}: {value}")]
    UnexpectedValue { what: String, value: Value },

    #[error("Capability flags differ from reference for {browser}: {}", join_mismatches(.mismatches))]
    CapabilityMismatch {
        browser: String,
        mismatches: Vec<FlagMismatch>,
    },

    #[error("Control command {command:?} rejected: {reply}")]
    ControlRejected { command: String, reply: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn join_mismatches(mismatches: &[FlagMismatch]) -> String {
    mismatches
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type E2eResult<T> = Result<T, E2eError>;
