// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definition for declared DNS names.
//!
//! A [`DNSName`] states the operator's intent for one local DNS mapping served by
//! Pi-hole. Two kinds are supported:
//!
//! - `A` - maps a hostname to an IPv4 or IPv6 address
//! - `CNAME` - aliases a hostname to another hostname, optionally with a TTL
//!
//! # Example: Declaring a CNAME
//!
//! ```rust
//! use pihole_operator::crd::{DNSNameSpec, DNSRecordType};
//!
//! let spec = DNSNameSpec {
//!     record_type: DNSRecordType::Cname,
//!     domain: "grafana.home.lab".to_string(),
//!     target: Some("homelab".to_string()),
//!     target_ip: None,
//!     ttl: Some(300),
//! };
//! assert_eq!(spec.record_type, DNSRecordType::Cname);
//! ```

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Record kinds a `DNSName` can declare.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum DNSRecordType {
    /// Canonical name (alias) record
    #[serde(rename = "CNAME")]
    Cname,

    /// Address record (IPv4 or IPv6)
    #[serde(rename = "A")]
    A,

    /// Any value the operator does not understand.
    ///
    /// Kept so a stray value fails validation for that one resource instead of
    /// breaking deserialization of the whole watch stream.
    #[serde(other)]
    #[schemars(skip)]
    Unsupported,
}

impl std::fmt::Display for DNSRecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cname => write!(f, "CNAME"),
            Self::A => write!(f, "A"),
            Self::Unsupported => write!(f, "Unsupported"),
        }
    }
}

/// Condition represents an observation of a resource's current state.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition, e.g. `Ready`.
    pub r#type: String,

    /// Status of the condition: True, False, or Unknown.
    pub status: String,

    /// Brief CamelCase reason for the condition's last transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message indicating details about the transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Last time the condition transitioned from one status to another (RFC3339 format).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

/// `DNSName` status
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DNSNameStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

/// `DNSName` declares one local DNS record to be served by Pi-hole.
///
/// Exactly one of `target` (for `CNAME`) or `targetIP` (for `A`) must be set,
/// matching `type`.
///
/// # Example
///
/// ```yaml
/// apiVersion: networking.liebler.dev/v1alpha1
/// kind: DNSName
/// metadata:
///   name: nas
///   namespace: default
/// spec:
///   type: A
///   domain: nas.home.lab
///   targetIP: 192.168.178.10
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "networking.liebler.dev",
    version = "v1alpha1",
    kind = "DNSName",
    plural = "dnsnames",
    namespaced,
    doc = "DNSName declares a local DNS record (A or CNAME) that the operator keeps converged in Pi-hole."
)]
#[kube(status = "DNSNameStatus")]
#[kube(printcolumn = r#"{"name":"Type","type":"string","jsonPath":".spec.type"}"#)]
#[kube(printcolumn = r#"{"name":"Domain","type":"string","jsonPath":".spec.domain"}"#)]
#[serde(rename_all = "camelCase")]
pub struct DNSNameSpec {
    /// Record type: `CNAME` or `A`.
    #[serde(rename = "type")]
    pub record_type: DNSRecordType,

    /// Source domain of the record (e.g. "nas.home.lab").
    #[schemars(regex(
        pattern = r"^([a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)*[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?$"
    ))]
    pub domain: String,

    /// CNAME target hostname. Required for `CNAME` records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(regex(
        pattern = r"^([a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)*[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?$"
    ))]
    pub target: Option<String>,

    /// IPv4 or IPv6 address. Required for `A` records.
    #[serde(rename = "targetIP", default, skip_serializing_if = "Option::is_none")]
    #[schemars(regex(
        pattern = r"^(((25[0-5]|(2[0-4]|1\d|[1-9]|)\d)\.){3}(25[0-5]|(2[0-4]|1\d|[1-9]|)\d)|[0-9a-fA-F:.]*:[0-9a-fA-F:.]*)$"
    ))]
    pub target_ip: Option<String>,

    /// Time To Live in seconds. Only applies to `CNAME` records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 0))]
    pub ttl: Option<i32>,
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
