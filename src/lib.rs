// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # Pi-hole DNS Operator for Kubernetes
//!
//! Converges declared `DNSName` resources into the local DNS records served
//! by a Pi-hole instance, through Pi-hole's session-authenticated
//! configuration API.
//!
//! ## Overview
//!
//! - A `DNSName` declares one `A` or `CNAME` record
//! - Every reconcile pass lists Pi-hole's records, compares the one carrying
//!   the declared domain, and deletes then recreates it when it differs
//! - A finalizer holds deleted `DNSName` resources until their records are
//!   gone from Pi-hole
//!
//! ## Modules
//!
//! - [`crd`] - The `DNSName` Custom Resource Definition
//! - [`record`] - Canonical in-memory DNS record
//! - [`pihole`] - Pi-hole API client and wire codecs
//! - [`reconcilers`] - Reconciliation logic, status and finalizer helpers
//! - [`controller`] - Controller runtime wiring
//! - [`config`] - Command-line and environment configuration
//! - [`metrics`] - Prometheus metrics
//!
//! ## Example
//!
//! ```rust
//! use pihole_operator::crd::{DNSNameSpec, DNSRecordType};
//! use pihole_operator::record::Record;
//!
//! let spec = DNSNameSpec {
//!     record_type: DNSRecordType::A,
//!     domain: "foobar4.com".to_string(),
//!     target: None,
//!     target_ip: Some("192.168.178.1".to_string()),
//!     ttl: None,
//! };
//!
//! let record = Record::from_declared(&spec).unwrap();
//! assert_eq!(record, Record::a("foobar4.com", "192.168.178.1"));
//! ```

pub mod backend;
pub mod config;
pub mod constants;
pub mod context;
pub mod controller;
pub mod crd;
pub mod errors;
pub mod http_errors;
pub mod metrics;
pub mod pihole;
pub mod reconcilers;
pub mod record;
pub mod server;
pub mod status_reasons;
