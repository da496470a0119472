// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the Pi-hole operator.
//!
//! This module contains the numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group of the `DNSName` CRD
pub const API_GROUP: &str = "networking.liebler.dev";

/// API version of the `DNSName` CRD
pub const API_VERSION: &str = "v1alpha1";

/// Fully qualified API version (group/version)
pub const API_GROUP_VERSION: &str = "networking.liebler.dev/v1alpha1";

/// Kind name for `DNSName` resource
pub const KIND_DNS_NAME: &str = "DNSName";

/// Finalizer that defers hard deletion of a `DNSName` until its records are removed
pub const DNS_NAME_FINALIZER: &str = "dnsname.networking.liebler.dev/finalizer";

/// Controller name reported on Kubernetes events
pub const CONTROLLER_NAME: &str = "pihole-operator";

// ============================================================================
// Pi-hole API Constants
// ============================================================================

/// Authentication endpoint (POST to log in, DELETE to log out)
pub const PIHOLE_AUTH_PATH: &str = "auth";

/// Configuration section holding local DNS collections
pub const PIHOLE_CONFIG_SECTION: [&str; 2] = ["config", "dns"];

/// Collection holding address records (`"<address> <domain>"`)
pub const PIHOLE_HOSTS_COLLECTION: &str = "hosts";

/// Collection holding CNAME records (`"<domain>,<target>[,<ttl>]"`)
pub const PIHOLE_CNAME_COLLECTION: &str = "cnameRecords";

/// Request header carrying the session id
pub const PIHOLE_SID_HEADER: &str = "sid";

// ============================================================================
// Controller Timing Constants
// ============================================================================

/// Requeue interval after a failed reconciliation
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

/// Default requeue interval for converged resources (drift repair)
pub const DEFAULT_REQUEUE_INTERVAL_SECS: u64 = 300;

/// Default number of reconciliations that may run concurrently
pub const DEFAULT_MAX_CONCURRENT_RECONCILES: u16 = 1;

// ============================================================================
// Server Constants
// ============================================================================

/// Default bind address for the Prometheus metrics endpoint
pub const DEFAULT_METRICS_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Path serving Prometheus metrics
pub const METRICS_PATH: &str = "/metrics";
