//! Client for the generic record store.
//!
//! The store is a collection-per-resource CRUD service speaking JSON (users,
//! employees). It has no business logic; everything here is one request, one
//! response. Nothing is retried and nothing is cached.

mod client;

use reqwest::{Method, StatusCode};
use thiserror::Error;

pub use client::{Collection, RecordStoreClient, StoreConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};

/// Shared result type for record store calls.
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid record store address `{0}`")]
    InvalidBaseUrl(String),
    #[error("record id `{0}` cannot be used in a request path")]
    InvalidId(String),
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("{method} {path} timed out")]
    Timeout { method: Method, path: String },
    #[error("{method} {path} failed: {source}")]
    Transport {
        method: Method,
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} {path} returned {status}")]
    Status {
        method: Method,
        path: String,
        status: StatusCode,
    },
    #[error("unexpected response body from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidBaseUrl(_) | ApiError::Client(_) => "CONFIG",
            ApiError::InvalidId(_) => "INVALID_ID",
            ApiError::Timeout { .. } => "TIMEOUT",
            ApiError::Transport { .. } => "TRANSPORT",
            ApiError::Status { status, .. } if *status == StatusCode::NOT_FOUND => "NOT_FOUND",
            ApiError::Status { .. } => "STATUS",
            ApiError::Decode { .. } => "DECODE",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_carry_request_and_code() {
        let err = ApiError::Status {
            method: Method::PATCH,
            path: "employees/4".into(),
            status: StatusCode::NOT_FOUND,
        };
        assert_eq!(err.to_string(), "PATCH employees/4 returned 404 Not Found");
        assert!(err.is_not_found());

        let err = ApiError::Status {
            method: Method::GET,
            path: "employees".into(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        };
        assert_eq!(err.code(), "STATUS");
        assert!(!err.is_not_found());
    }

    #[test]
    fn only_a_404_status_counts_as_not_found() {
        let err = ApiError::Status {
            method: Method::DELETE,
            path: "employees/9".into(),
            status: StatusCode::GONE,
        };
        assert!(!err.is_not_found());
        let err = ApiError::Timeout {
            method: Method::GET,
            path: "employees/9".into(),
        };
        assert!(!err.is_not_found());
        assert!(!ApiError::InvalidBaseUrl("NOT_FOUND".into()).is_not_found());
    }
}
