// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Finalizer management for `DNSName` resources.
//!
//! The finalizer token makes the API server hold a deleted `DNSName` until
//! the operator has removed its records from Pi-hole. Adding and removing the
//! token is a JSON merge patch of `metadata.finalizers`, so both are
//! idempotent and never touch the spec.
//!
//! # Example
//!
//! ```rust
//! use pihole_operator::reconcilers::finalizers::{has_finalizer, with_finalizer};
//! use pihole_operator::crd::{DNSName, DNSNameSpec, DNSRecordType};
//!
//! const FINALIZER: &str = "dnsname.networking.liebler.dev/finalizer";
//!
//! let dnsname = DNSName::new("nas", DNSNameSpec {
//!     record_type: DNSRecordType::A,
//!     domain: "nas.home.lab".to_string(),
//!     target: None,
//!     target_ip: Some("192.168.178.10".to_string()),
//!     ttl: None,
//! });
//! assert!(!has_finalizer(&dnsname, FINALIZER));
//! assert_eq!(with_finalizer(&dnsname, FINALIZER), vec![FINALIZER.to_string()]);
//! ```

use anyhow::Result;
use kube::api::{Patch, PatchParams};
use kube::core::NamespaceResourceScope;
use kube::{Api, Resource, ResourceExt};
use serde_json::json;
use tracing::info;

/// Whether `resource` carries `finalizer`.
#[must_use]
pub fn has_finalizer<T: Resource>(resource: &T, finalizer: &str) -> bool {
    resource
        .meta()
        .finalizers
        .as_ref()
        .is_some_and(|f| f.iter().any(|existing| existing == finalizer))
}

/// Whether deletion of `resource` has been requested.
#[must_use]
pub fn is_being_deleted<T: Resource>(resource: &T) -> bool {
    resource.meta().deletion_timestamp.is_some()
}

/// Finalizer list of `resource` with `finalizer` appended if absent.
#[must_use]
pub fn with_finalizer<T: Resource>(resource: &T, finalizer: &str) -> Vec<String> {
    let mut finalizers = resource.meta().finalizers.clone().unwrap_or_default();
    if !finalizers.iter().any(|f| f == finalizer) {
        finalizers.push(finalizer.to_string());
    }
    finalizers
}

/// Finalizer list of `resource` with every `finalizer` entry removed.
#[must_use]
pub fn without_finalizer<T: Resource>(resource: &T, finalizer: &str) -> Vec<String> {
    let mut finalizers = resource.meta().finalizers.clone().unwrap_or_default();
    finalizers.retain(|f| f != finalizer);
    finalizers
}

/// Merge patch replacing `metadata.finalizers`.
#[must_use]
pub fn finalizers_patch(finalizers: &[String]) -> serde_json::Value {
    json!({ "metadata": { "finalizers": finalizers } })
}

/// Add a finalizer to a resource if not already present.
///
/// # Errors
///
/// Returns an error if the API patch operation fails.
pub async fn ensure_finalizer<T>(api: &Api<T>, resource: &T, finalizer: &str) -> Result<()>
where
    T: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + std::fmt::Debug
        + serde::Serialize
        + for<'de> serde::Deserialize<'de>,
{
    if has_finalizer(resource, finalizer) {
        return Ok(());
    }

    let name = resource.name_any();
    info!(
        "Adding finalizer {} to {}/{} {}",
        finalizer,
        resource.namespace().unwrap_or_default(),
        name,
        T::kind(&())
    );

    let patch = finalizers_patch(&with_finalizer(resource, finalizer));
    api.patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
        .await?;

    Ok(())
}

/// Remove a finalizer from a resource if present.
///
/// # Errors
///
/// Returns an error if the API patch operation fails.
pub async fn remove_finalizer<T>(api: &Api<T>, resource: &T, finalizer: &str) -> Result<()>
where
    T: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + std::fmt::Debug
        + serde::Serialize
        + for<'de> serde::Deserialize<'de>,
{
    if !has_finalizer(resource, finalizer) {
        return Ok(());
    }

    let name = resource.name_any();
    info!(
        "Removing finalizer {} from {}/{} {}",
        finalizer,
        resource.namespace().unwrap_or_default(),
        name,
        T::kind(&())
    );

    let patch = finalizers_patch(&without_finalizer(resource, finalizer));
    api.patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
        .await?;

    Ok(())
}

#[cfg(test)]
#[path = "finalizers_tests.rs"]
mod finalizers_tests;
