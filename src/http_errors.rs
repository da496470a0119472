// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Mapping of Pi-hole API failures to Kubernetes status condition reasons.
//!
//! # Usage
//!
//! ```rust
//! use pihole_operator::http_errors::map_http_error_to_reason;
//!
//! let (reason, message) = map_http_error_to_reason(401);
//! assert_eq!(reason, "BackendAuthFailed");
//! assert!(message.contains("401"));
//! ```

use crate::errors::{PiHoleError, ReconcileError};
use crate::status_reasons::{
    REASON_AUTHENTICATION_FAILED, REASON_BACKEND_AUTH_FAILED, REASON_BACKEND_BAD_REQUEST,
    REASON_BACKEND_INTERNAL_ERROR, REASON_BACKEND_NOT_FOUND, REASON_BACKEND_RATE_LIMITED,
    REASON_BACKEND_UNEXPECTED_STATUS, REASON_BACKEND_UNREACHABLE, REASON_DECODE_FAILED,
    REASON_GATEWAY_ERROR, REASON_INVALID_SPEC, REASON_STORE_ERROR,
};

/// Map HTTP status code to condition reason and message.
///
/// | HTTP Code | Reason |
/// |-----------|--------|
/// | 400 | `BackendBadRequest` |
/// | 401, 403 | `BackendAuthFailed` |
/// | 404 | `BackendNotFound` |
/// | 429 | `BackendRateLimited` |
/// | 500 | `BackendInternalError` |
/// | 502, 503, 504 | `GatewayError` |
/// | Other | `BackendUnexpectedStatus` |
#[must_use]
pub fn map_http_error_to_reason(status_code: u16) -> (&'static str, String) {
    match status_code {
        400 => (
            REASON_BACKEND_BAD_REQUEST,
            "Invalid request to Pi-hole API (400)".into(),
        ),
        401 => (
            REASON_BACKEND_AUTH_FAILED,
            "Pi-hole session not authorized (401)".into(),
        ),
        403 => (
            REASON_BACKEND_AUTH_FAILED,
            "Pi-hole denied the request (403)".into(),
        ),
        404 => (
            REASON_BACKEND_NOT_FOUND,
            "Record or endpoint not found in Pi-hole (404)".into(),
        ),
        429 => (
            REASON_BACKEND_RATE_LIMITED,
            "Pi-hole is rate limiting requests (429)".into(),
        ),
        500 => (
            REASON_BACKEND_INTERNAL_ERROR,
            "Pi-hole API internal error (500)".into(),
        ),
        502 => (
            REASON_GATEWAY_ERROR,
            "Bad gateway reaching Pi-hole (502)".into(),
        ),
        503 => (
            REASON_GATEWAY_ERROR,
            "Pi-hole service unavailable (503)".into(),
        ),
        504 => (
            REASON_GATEWAY_ERROR,
            "Gateway timeout reaching Pi-hole (504)".into(),
        ),
        _ => (
            REASON_BACKEND_UNEXPECTED_STATUS,
            format!("Unexpected HTTP status from Pi-hole ({status_code})"),
        ),
    }
}

/// Map a failed reconcile pass to a condition reason and message.
#[must_use]
pub fn map_reconcile_error_to_reason(error: &ReconcileError) -> (&'static str, String) {
    match error {
        ReconcileError::Validation(e) => (REASON_INVALID_SPEC, e.to_string()),
        ReconcileError::Backend(PiHoleError::Authentication { .. }) => {
            (REASON_AUTHENTICATION_FAILED, error.to_string())
        }
        ReconcileError::Backend(PiHoleError::Backend { operation, status }) => {
            let (reason, message) = map_http_error_to_reason(*status);
            (reason, format!("{operation}: {message}"))
        }
        ReconcileError::Backend(PiHoleError::Decode { .. }) => {
            (REASON_DECODE_FAILED, error.to_string())
        }
        ReconcileError::Backend(
            PiHoleError::Transport(_) | PiHoleError::InvalidBaseUrl { .. },
        ) => (REASON_BACKEND_UNREACHABLE, error.to_string()),
        ReconcileError::Store(_) => (REASON_STORE_ERROR, error.to_string()),
    }
}

#[cfg(test)]
#[path = "http_errors_tests.rs"]
mod http_errors_tests;
