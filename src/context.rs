// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context for the `DNSName` controller.
//!
//! Every reconcile pass receives an `Arc<Context>` holding the resource store,
//! the Pi-hole backend and the requeue interval. The backend owns the single
//! Pi-hole session shared by all passes.

use crate::backend::DnsBackend;
use crate::reconcilers::store::DeclaredStore;
use std::sync::Arc;
use std::time::Duration;

/// Shared context passed to the controller.
#[derive(Clone)]
pub struct Context {
    /// Read and patch access to `DNSName` resources
    pub store: Arc<dyn DeclaredStore>,

    /// The DNS backend records are converged into
    pub backend: Arc<dyn DnsBackend>,

    /// Delay before a converged `DNSName` is checked again for drift
    pub requeue_interval: Duration,
}

impl Context {
    #[must_use]
    pub fn new(
        store: Arc<dyn DeclaredStore>,
        backend: Arc<dyn DnsBackend>,
        requeue_interval: Duration,
    ) -> Self {
        Self {
            store,
            backend,
            requeue_interval,
        }
    }
}
