// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Standard Kubernetes status condition reasons for `DNSName` resources.
//!
//! Reasons are programmatic identifiers in CamelCase that explain why a condition has
//! a particular status. Every `DNSName` carries a single `type: Ready` condition.
//!
//! # Example Status
//!
//! ```yaml
//! status:
//!   conditions:
//!     - type: Ready
//!       status: "True"
//!       reason: RecordCreated
//!       message: "Created CNAME foobar.de -> homelab (ttl 500)"
//! ```

/// The single condition type reported on `DNSName` resources.
pub const CONDITION_TYPE_READY: &str = "Ready";

/// Condition status values
pub const CONDITION_STATUS_TRUE: &str = "True";
pub const CONDITION_STATUS_FALSE: &str = "False";
pub const CONDITION_STATUS_UNKNOWN: &str = "Unknown";

// ============================================================================
// Progress Reasons
// ============================================================================

/// A mutation against Pi-hole is about to be issued.
pub const REASON_PENDING: &str = "Pending";

/// The desired record did not exist and was created.
pub const REASON_RECORD_CREATED: &str = "RecordCreated";

/// One or more stale records were deleted and the desired record created.
pub const REASON_RECORD_REPLACED: &str = "RecordReplaced";

/// Pi-hole already serves exactly the desired record.
pub const REASON_RECORD_IN_SYNC: &str = "RecordInSync";

/// The `DNSName` is being deleted and its records were removed from Pi-hole.
pub const REASON_RECORDS_CLEANED_UP: &str = "RecordsCleanedUp";

// ============================================================================
// Failure Reasons
// ============================================================================

/// The declared spec is missing a field required by its type.
pub const REASON_INVALID_SPEC: &str = "InvalidSpec";

/// Pi-hole rejected the configured password.
pub const REASON_AUTHENTICATION_FAILED: &str = "AuthenticationFailed";

/// A Pi-hole response could not be parsed.
pub const REASON_DECODE_FAILED: &str = "DecodeFailed";

/// No HTTP response was received from Pi-hole.
pub const REASON_BACKEND_UNREACHABLE: &str = "BackendUnreachable";

/// Reading or updating the `DNSName` itself failed.
pub const REASON_STORE_ERROR: &str = "StoreError";

// ============================================================================
// HTTP-derived Reasons
// ============================================================================

/// HTTP 400 from Pi-hole.
pub const REASON_BACKEND_BAD_REQUEST: &str = "BackendBadRequest";

/// HTTP 401 or 403 from Pi-hole.
pub const REASON_BACKEND_AUTH_FAILED: &str = "BackendAuthFailed";

/// HTTP 404 from Pi-hole.
pub const REASON_BACKEND_NOT_FOUND: &str = "BackendNotFound";

/// HTTP 429 from Pi-hole.
pub const REASON_BACKEND_RATE_LIMITED: &str = "BackendRateLimited";

/// HTTP 500 from Pi-hole.
pub const REASON_BACKEND_INTERNAL_ERROR: &str = "BackendInternalError";

/// HTTP 502, 503 or 504 between the operator and Pi-hole.
pub const REASON_GATEWAY_ERROR: &str = "GatewayError";

/// Any other unexpected status.
pub const REASON_BACKEND_UNEXPECTED_STATUS: &str = "BackendUnexpectedStatus";
