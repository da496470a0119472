// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use kube::{
    api::{Api, DeleteParams, PostParams},
    client::Client,
};
use pihole_operator::crd::{DNSName, DNSNameSpec, DNSNameStatus};
use pihole_operator::reconcilers::store::{DeclaredStore, Notice};
use serde_json::json;
use std::sync::Mutex;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_NAMESPACE: &str = "default";
pub const PIHOLE_PASSWORD: &str = "integration-password";
pub const PIHOLE_SID: &str = "integration-sid";

// ============================================================================
// Kubernetes helpers
// ============================================================================

/// Get a Kubernetes client or skip the test if not in a cluster
pub async fn get_kube_client_or_skip() -> Option<Client> {
    match Client::try_default().await {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!("Skipping integration test: not running in Kubernetes cluster: {e}");
            None
        }
    }
}

/// Create a test namespace
pub async fn create_test_namespace(
    client: &Client,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let namespaces: Api<k8s_openapi::api::core::v1::Namespace> = Api::all(client.clone());

    let ns = serde_json::from_value(json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "labels": {
                "test": "integration",
                "managed-by": "pihole-operator-test"
            }
        }
    }))?;

    match namespaces.create(&PostParams::default(), &ns).await {
        Ok(_) => {
            println!("Created test namespace: {name}");
            Ok(())
        }
        Err(kube::Error::Api(ae)) if ae.code == 409 => {
            println!("Test namespace already exists: {name}");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

/// Cleanup test namespace
pub async fn cleanup_test_namespace(client: &Client, name: &str) {
    let namespaces: Api<k8s_openapi::api::core::v1::Namespace> = Api::all(client.clone());

    match namespaces.delete(name, &DeleteParams::default()).await {
        Ok(_) => println!("Deleted test namespace: {name}"),
        Err(kube::Error::Api(ae)) if ae.code == 404 => {
            println!("Test namespace already deleted: {name}");
        }
        Err(e) => eprintln!("Failed to delete test namespace {name}: {e}"),
    }
}

// ============================================================================
// In-memory declared store
// ============================================================================

/// `DeclaredStore` holding a single `DNSName`, dropping it once a deleted
/// object loses its last finalizer.
#[derive(Default)]
pub struct MemoryStore {
    resource: Mutex<Option<DNSName>>,
    events: Mutex<Vec<Notice>>,
}

impl MemoryStore {
    pub fn with(name: &str, spec: DNSNameSpec) -> Self {
        let mut resource = DNSName::new(name, spec);
        resource.metadata.namespace = Some(TEST_NAMESPACE.to_string());
        resource.metadata.generation = Some(1);
        Self {
            resource: Mutex::new(Some(resource)),
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn current(&self) -> Option<DNSName> {
        self.resource.lock().unwrap().clone()
    }

    pub fn request_deletion(&self) {
        if let Some(resource) = self.resource.lock().unwrap().as_mut() {
            resource.metadata.deletion_timestamp = Some(
                k8s_openapi::apimachinery::pkg::apis::meta::v1::Time(k8s_openapi::jiff::Timestamp::now()),
            );
        }
    }

    pub fn events(&self) -> Vec<Notice> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DeclaredStore for MemoryStore {
    async fn get(&self, _namespace: &str, _name: &str) -> anyhow::Result<Option<DNSName>> {
        Ok(self.current())
    }

    async fn add_finalizer(&self, _resource: &DNSName, finalizer: &str) -> anyhow::Result<()> {
        if let Some(resource) = self.resource.lock().unwrap().as_mut() {
            let finalizers = resource.metadata.finalizers.get_or_insert_with(Vec::new);
            if !finalizers.iter().any(|f| f == finalizer) {
                finalizers.push(finalizer.to_string());
            }
        }
        Ok(())
    }

    async fn remove_finalizer(&self, _resource: &DNSName, finalizer: &str) -> anyhow::Result<()> {
        let mut guard = self.resource.lock().unwrap();
        let mut gone = false;
        if let Some(resource) = guard.as_mut() {
            if let Some(finalizers) = resource.metadata.finalizers.as_mut() {
                finalizers.retain(|f| f != finalizer);
            }
            gone = resource.metadata.deletion_timestamp.is_some()
                && resource
                    .metadata
                    .finalizers
                    .as_ref()
                    .is_none_or(Vec::is_empty);
        }
        if gone {
            *guard = None;
        }
        Ok(())
    }

    async fn patch_status(&self, _resource: &DNSName, status: &DNSNameStatus) -> anyhow::Result<()> {
        if let Some(resource) = self.resource.lock().unwrap().as_mut() {
            resource.status = Some(status.clone());
        }
        Ok(())
    }

    async fn publish_event(&self, _resource: &DNSName, notice: Notice) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(notice);
        Ok(())
    }
}

// ============================================================================
// Mock Pi-hole
// ============================================================================

/// Start a mock Pi-hole API under `/api` serving the given collections and
/// accepting every create and delete.
pub async fn start_pihole(hosts: &[&str], cname_records: &[&str]) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session": { "valid": true, "sid": PIHOLE_SID, "validity": 1800 }
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/config/dns/hosts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "config": { "dns": { "hosts": hosts } }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/config/dns/cnameRecords"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "config": { "dns": { "cnameRecords": cname_records } }
        })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path_regex(r"^/api/config/dns/(hosts|cnameRecords)/.+$"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path_regex(r"^/api/config/dns/(hosts|cnameRecords)/.+$"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    server
}

/// Base URL of the mock Pi-hole API.
pub fn pihole_url(server: &MockServer) -> String {
    format!("{}/api", server.uri())
}

/// Mutating requests received by the mock, as `(method, path)` pairs.
pub async fn mutations(server: &MockServer) -> Vec<(String, String)> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path().starts_with("/api/config/"))
        .filter(|r| r.method.as_str() != "GET")
        .map(|r| (r.method.to_string(), r.url.path().to_string()))
        .collect()
}
