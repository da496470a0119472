// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Canonical in-memory DNS record.
//!
//! A [`Record`] is rebuilt on every reconcile pass, both from the declared
//! [`DNSNameSpec`] and from the lines Pi-hole reports. Matching between desired
//! and observed records uses the domain as key; whether a match is up to date is
//! decided by full structural equality, where an absent TTL differs from `Some(0)`.

use crate::crd::{DNSNameSpec, DNSRecordType};
use thiserror::Error;

/// Record kinds Pi-hole stores in separate collections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    A,
    Cname,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::Cname => write!(f, "CNAME"),
        }
    }
}

/// A declared spec that cannot be turned into a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `type: A` without `targetIP`
    #[error("targetIP is required for A records (domain '{domain}')")]
    MissingTargetIp { domain: String },

    /// `type: CNAME` without `target`
    #[error("target is required for CNAME records (domain '{domain}')")]
    MissingTarget { domain: String },

    /// A record type the operator does not manage
    #[error("invalid DNS record type {record_type} (domain '{domain}')")]
    UnsupportedType { domain: String, record_type: String },
}

/// One DNS record as Pi-hole understands it.
///
/// For `A` records `target` holds the address literal; for `CNAME` records it
/// holds the canonical hostname. Only `CNAME` records carry a TTL.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Record {
    pub domain: String,
    pub target: String,
    pub kind: RecordKind,
    pub ttl: Option<i32>,
}

impl Record {
    /// Build an address record.
    #[must_use]
    pub fn a(domain: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            target: address.into(),
            kind: RecordKind::A,
            ttl: None,
        }
    }

    /// Build a CNAME record.
    #[must_use]
    pub fn cname(domain: impl Into<String>, target: impl Into<String>, ttl: Option<i32>) -> Self {
        Self {
            domain: domain.into(),
            target: target.into(),
            kind: RecordKind::Cname,
            ttl,
        }
    }

    /// Build the desired record from a declared spec.
    ///
    /// The TTL is copied verbatim for `CNAME` records and dropped for `A` records.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the field required by the declared type is
    /// missing, or when the type is not one the operator manages.
    pub fn from_declared(spec: &DNSNameSpec) -> Result<Self, ValidationError> {
        match spec.record_type {
            DNSRecordType::A => {
                let address =
                    spec.target_ip
                        .as_ref()
                        .ok_or_else(|| ValidationError::MissingTargetIp {
                            domain: spec.domain.clone(),
                        })?;
                Ok(Self::a(spec.domain.clone(), address.clone()))
            }
            DNSRecordType::Cname => {
                let target = spec
                    .target
                    .as_ref()
                    .ok_or_else(|| ValidationError::MissingTarget {
                        domain: spec.domain.clone(),
                    })?;
                Ok(Self::cname(spec.domain.clone(), target.clone(), spec.ttl))
            }
            DNSRecordType::Unsupported => Err(ValidationError::UnsupportedType {
                domain: spec.domain.clone(),
                record_type: spec.record_type.to_string(),
            }),
        }
    }

    /// Whether this record is keyed by `domain`.
    #[must_use]
    pub fn has_domain(&self, domain: &str) -> bool {
        self.domain == domain
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.ttl {
            Some(ttl) => write!(
                f,
                "{} {} -> {} (ttl {ttl})",
                self.kind, self.domain, self.target
            ),
            None => write!(f, "{} {} -> {}", self.kind, self.domain, self.target),
        }
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod record_tests;
