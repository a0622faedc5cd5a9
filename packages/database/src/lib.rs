#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Storage access for glamping map properties.
//!
//! Properties live in a single wide table behind Supabase's REST surface
//! (`PostgREST`). The [`PropertyStore`] trait hides the transport:
//! [`supabase::SupabaseStore`] talks HTTP, [`memory::MemoryStore`] serves
//! rows from memory (tests and local JSON fixtures).
//!
//! Errors carry a [`ErrorClass`] so callers decide whether to retry from
//! the error's type, never from its message text.

pub mod db;
pub mod memory;
pub mod queries;
pub mod retry;
pub mod rows;
pub mod supabase;

use std::path::PathBuf;

use async_trait::async_trait;
use glamping_map_property_models::{PropertyQuery, RawPropertyRow};

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A response body could not be decoded (truncated or garbled JSON).
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Storage answered with a non-success status.
    #[error("Storage returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// I/O error (fixture file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A fixture file is not a JSON array of rows.
    #[error("Invalid fixture {}: {source}", path.display())]
    Fixture {
        /// Path of the fixture file.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// Missing or invalid configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },

    /// A column name that is not a plain identifier.
    #[error("Invalid column name: {column}")]
    InvalidColumn {
        /// The rejected column name.
        column: String,
    },
}

/// Whether a failed operation is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Likely to succeed on a later attempt.
    Transient,
    /// Will fail the same way again.
    Fatal,
}

impl StoreError {
    /// Classifies this error.
    ///
    /// Transient: timeouts, connection failures, body read/decode failures,
    /// unparseable response bodies, HTTP 429 and 5xx. Everything else is
    /// fatal.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        let transient = match self {
            Self::Http(e) => {
                e.is_timeout() || e.is_connect() || e.is_body() || e.is_decode() || e.is_request()
            }
            Self::Json(_) => true,
            Self::Status { status, .. } => *status == 429 || (500..600).contains(status),
            Self::Io(_) | Self::Fixture { .. } | Self::Config { .. } | Self::InvalidColumn { .. } => {
                false
            }
        };

        if transient {
            ErrorClass::Transient
        } else {
            ErrorClass::Fatal
        }
    }

    /// Shorthand for `self.class() == ErrorClass::Transient`.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.class() == ErrorClass::Transient
    }
}

/// Read/write access to the properties table.
///
/// Implementations return rows ordered by ascending `id`.
#[async_trait]
pub trait PropertyStore: Send + Sync {
    /// Fetches one page of rows matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the storage request fails.
    async fn fetch_page(
        &self,
        query: &PropertyQuery,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<RawPropertyRow>, StoreError>;

    /// Fetches the lowest-`id` row with the given slug among the rows
    /// matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the storage request fails.
    async fn find_by_slug(
        &self,
        query: &PropertyQuery,
        slug: &str,
    ) -> Result<Option<RawPropertyRow>, StoreError>;

    /// Sets `column` to `value` on row `id`, only if the column is
    /// currently null. Returns whether a row was updated.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if `column` is not a plain identifier or the
    /// storage request fails.
    async fn fill_missing(&self, id: i64, column: &str, value: &str) -> Result<bool, StoreError>;
}

/// Rejects column names that are not lowercase identifiers.
///
/// # Errors
///
/// Returns [`StoreError::InvalidColumn`] for anything but `[a-z0-9_]+`.
pub fn validate_column(column: &str) -> Result<(), StoreError> {
    let valid = !column.is_empty()
        && column
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_');

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidColumn {
            column: column.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        let status = |status| StoreError::Status {
            status,
            body: String::new(),
        };
        assert_eq!(status(503).class(), ErrorClass::Transient);
        assert_eq!(status(429).class(), ErrorClass::Transient);
        assert_eq!(status(404).class(), ErrorClass::Fatal);
        assert_eq!(status(401).class(), ErrorClass::Fatal);
    }

    #[test]
    fn truncated_json_is_transient() {
        let err = serde_json::from_str::<Vec<RawPropertyRow>>("[{\"id\": 1, \"na")
            .map_err(StoreError::from)
            .unwrap_err();
        assert!(err.is_transient());
    }

    #[test]
    fn configuration_problems_are_fatal() {
        let err = StoreError::Config {
            message: "SUPABASE_URL is not set".to_string(),
        };
        assert_eq!(err.class(), ErrorClass::Fatal);
        assert_eq!(
            StoreError::InvalidColumn {
                column: "x".to_string()
            }
            .class(),
            ErrorClass::Fatal
        );
    }

    #[test]
    fn column_names_must_be_identifiers() {
        assert!(validate_column("country").is_ok());
        assert!(validate_column("rate__avg_2024").is_ok());
        assert!(validate_column("country;drop").is_err());
        assert!(validate_column("Country").is_err());
        assert!(validate_column("").is_err());
    }
}
