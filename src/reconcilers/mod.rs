// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation logic for `DNSName` resources.
//!
//! The operator follows the standard Kubernetes controller pattern:
//!
//! 1. **Watch** - The controller runtime delivers `DNSName` changes
//! 2. **Reconcile** - Compare the declared record with what Pi-hole serves
//! 3. **Update** - Create or replace records in Pi-hole
//! 4. **Status** - Report the result back on the `DNSName`
//!
//! # Modules
//!
//! - [`dnsname`] - The reconcile pass itself
//! - [`finalizers`] - Finalizer token helpers
//! - [`status`] - Status condition helpers
//! - [`store`] - Read and patch access to declared resources

pub mod dnsname;
pub mod finalizers;
pub mod status;
pub mod store;

pub use dnsname::{reconcile_dnsname, ReconcileOutcome};
pub use store::{DeclaredStore, KubeDeclaredStore};
