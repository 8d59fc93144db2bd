//! Editing session error types.

use thiserror::Error;

/// Errors that can occur while driving the remote editor.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("session init failed: {0}")]
    SessionInit(String),

    #[error("login failed: {0}")]
    Auth(String),

    #[error("navigation timed out: {0}")]
    NavigationTimeout(String),

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("element {0} not interactable within {1}ms")]
    ElementNotInteractable(String, u64),

    #[error("could not read editor body: {0}")]
    Snapshot(String),

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("target text not found in the current body")]
    TargetNotFound,

    #[error("save failed: {0}")]
    SaveFailed(String),

    #[error("CDP error: {0}")]
    Cdp(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<chromiumoxide::error::CdpError> for EditorError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        EditorError::Cdp(err.to_string())
    }
}
