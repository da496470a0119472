// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Access to declared `DNSName` resources.
//!
//! The reconciler only reads a `DNSName` and issues scoped patches against it:
//! add or remove the finalizer token, replace the status, and publish events.
//! [`DeclaredStore`] is that surface; [`KubeDeclaredStore`] backs it with the
//! Kubernetes API.

use crate::constants::CONTROLLER_NAME;
use crate::crd::{DNSName, DNSNameStatus};
use crate::reconcilers::finalizers::{ensure_finalizer, remove_finalizer};
use anyhow::{Context as _, Result};
use kube::api::{Patch, PatchParams};
use kube::runtime::events::{Event, EventType, Recorder, Reporter};
use kube::{Api, Client, Resource, ResourceExt};
use serde_json::json;
use tracing::debug;

/// Severity of an event published against a `DNSName`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeSeverity {
    Normal,
    Warning,
}

/// An event to publish against a `DNSName`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub severity: NoticeSeverity,
    /// CamelCase reason, taken from [`crate::status_reasons`]
    pub reason: &'static str,
    /// What the operator was doing, e.g. `Reconcile` or `Cleanup`
    pub action: &'static str,
    pub note: String,
}

/// Read and patch access to declared `DNSName` resources.
#[async_trait::async_trait]
pub trait DeclaredStore: Send + Sync {
    /// Fetch a `DNSName`, or `None` if it no longer exists.
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<DNSName>>;

    /// Add `finalizer` to the resource if absent.
    async fn add_finalizer(&self, resource: &DNSName, finalizer: &str) -> Result<()>;

    /// Remove `finalizer` from the resource if present.
    async fn remove_finalizer(&self, resource: &DNSName, finalizer: &str) -> Result<()>;

    /// Replace the status subresource.
    async fn patch_status(&self, resource: &DNSName, status: &DNSNameStatus) -> Result<()>;

    /// Publish an event referencing the resource.
    async fn publish_event(&self, resource: &DNSName, notice: Notice) -> Result<()>;
}

/// [`DeclaredStore`] backed by the Kubernetes API server.
pub struct KubeDeclaredStore {
    client: Client,
    recorder: Recorder,
}

impl KubeDeclaredStore {
    /// Create a store that reports events as this controller.
    ///
    /// `instance` identifies the operator replica in emitted events, usually the
    /// pod name.
    #[must_use]
    pub fn new(client: Client, instance: Option<String>) -> Self {
        let reporter = Reporter {
            controller: CONTROLLER_NAME.to_string(),
            instance,
        };
        let recorder = Recorder::new(client.clone(), reporter);
        Self { client, recorder }
    }

    fn api(&self, namespace: &str) -> Api<DNSName> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn api_for(&self, resource: &DNSName) -> Api<DNSName> {
        self.api(&resource.namespace().unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl DeclaredStore for KubeDeclaredStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<DNSName>> {
        self.api(namespace)
            .get_opt(name)
            .await
            .with_context(|| format!("failed to get DNSName {namespace}/{name}"))
    }

    async fn add_finalizer(&self, resource: &DNSName, finalizer: &str) -> Result<()> {
        ensure_finalizer(&self.api_for(resource), resource, finalizer)
            .await
            .with_context(|| format!("failed to add finalizer to DNSName {}", resource.name_any()))
    }

    async fn remove_finalizer(&self, resource: &DNSName, finalizer: &str) -> Result<()> {
        remove_finalizer(&self.api_for(resource), resource, finalizer)
            .await
            .with_context(|| {
                format!(
                    "failed to remove finalizer from DNSName {}",
                    resource.name_any()
                )
            })
    }

    async fn patch_status(&self, resource: &DNSName, status: &DNSNameStatus) -> Result<()> {
        let name = resource.name_any();
        debug!(
            namespace = %resource.namespace().unwrap_or_default(),
            name = %name,
            "Patching DNSName status"
        );

        let patch = json!({ "status": status });
        self.api_for(resource)
            .patch_status(&name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .with_context(|| format!("failed to patch status of DNSName {name}"))?;

        Ok(())
    }

    async fn publish_event(&self, resource: &DNSName, notice: Notice) -> Result<()> {
        let event = Event {
            type_: match notice.severity {
                NoticeSeverity::Normal => EventType::Normal,
                NoticeSeverity::Warning => EventType::Warning,
            },
            reason: notice.reason.to_string(),
            note: Some(notice.note),
            action: notice.action.to_string(),
            secondary: None,
        };

        self.recorder
            .publish(&event, &resource.object_ref(&()))
            .await
            .with_context(|| format!("failed to publish event for DNSName {}", resource.name_any()))
    }
}
