use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    /// The request could not complete or the server answered with a non-success status.
    Network,
    /// The response body did not match the expected shape.
    Decode,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind:?} error for {url}: {message}")]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub url: String,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FetchErrorKind, url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn network(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Network, url, message)
    }

    pub fn decode(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Decode, url, message)
    }

    pub fn is_decode(&self) -> bool {
        self.kind == FetchErrorKind::Decode
    }
}
