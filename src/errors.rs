// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for Pi-hole API operations and reconciliation.
//!
//! - [`PiHoleError`] - failures talking to the Pi-hole configuration API
//! - [`ReconcileError`] - a failed reconcile pass, handed to the controller runtime
//!
//! None of these are retried by the operator itself. The controller runtime
//! requeues the resource and the next pass re-observes the backend.

use crate::record::ValidationError;
use thiserror::Error;

/// Errors that can occur while talking to the Pi-hole configuration API.
#[derive(Error, Debug)]
pub enum PiHoleError {
    /// Pi-hole rejected the credential or returned a malformed session
    ///
    /// The session stays empty; the next authenticated call tries again.
    #[error("Pi-hole authentication failed: {reason}")]
    Authentication {
        /// Why the session could not be established
        reason: String,
    },

    /// Unexpected HTTP status on an otherwise well-formed call
    #[error("Pi-hole {operation} failed with HTTP status {status}")]
    Backend {
        /// The operation that failed (e.g. "create record")
        operation: String,
        /// HTTP status code returned by Pi-hole
        status: u16,
    },

    /// Response body did not match the expected shape
    #[error("Failed to decode Pi-hole response: {reason}")]
    Decode {
        /// What could not be parsed
        reason: String,
    },

    /// Network-level failure before a response was received
    #[error("HTTP request to Pi-hole failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The configured base URL cannot be used to build API paths
    #[error("Invalid Pi-hole base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// The configured URL
        url: String,
        /// Why it was rejected
        reason: String,
    },
}

impl PiHoleError {
    /// Build a [`PiHoleError::Backend`] for `operation`.
    #[must_use]
    pub fn backend(operation: &str, status: reqwest::StatusCode) -> Self {
        Self::Backend {
            operation: operation.to_string(),
            status: status.as_u16(),
        }
    }

    /// Build a [`PiHoleError::Decode`].
    #[must_use]
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }

    /// HTTP status code carried by this error, if any.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// A failed reconcile pass.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// The declared spec cannot be turned into a record
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A call to Pi-hole failed
    #[error(transparent)]
    Backend(#[from] PiHoleError),

    /// Reading or patching the `DNSName` resource failed
    #[error(transparent)]
    Store(anyhow::Error),
}

impl ReconcileError {
    /// Short label used for the error metrics.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Backend(PiHoleError::Authentication { .. }) => "authentication_error",
            Self::Backend(PiHoleError::Backend { .. }) => "backend_error",
            Self::Backend(PiHoleError::Decode { .. }) => "decode_error",
            Self::Backend(PiHoleError::Transport(_)) => "transport_error",
            Self::Backend(PiHoleError::InvalidBaseUrl { .. }) => "configuration_error",
            Self::Store(_) => "store_error",
        }
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
