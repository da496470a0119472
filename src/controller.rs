// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `DNSName` controller runtime.
//!
//! Watches `DNSName` resources in all namespaces and hands each change to
//! [`reconcile_dnsname`]. The runtime guarantees at most one pass per resource
//! at a time; `max_concurrent_reconciles` bounds passes across resources.
//! Retry is owned here: failed passes are requeued by [`error_policy`] and
//! converged resources are requeued periodically to repair drift.

use crate::constants::{ERROR_REQUEUE_DURATION_SECS, KIND_DNS_NAME};
use crate::context::Context;
use crate::crd::DNSName;
use crate::errors::ReconcileError;
use crate::metrics::{record_reconciliation_error, record_reconciliation_success};
use crate::reconcilers::{reconcile_dnsname, ReconcileOutcome};
use anyhow::Result;
use futures::StreamExt;
use kube::runtime::controller::{Action, Config as ControllerConfig};
use kube::runtime::watcher::Config as WatcherConfig;
use kube::runtime::Controller;
use kube::{Api, Client, ResourceExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Run the `DNSName` controller until its watch stream ends.
///
/// # Errors
///
/// Currently always returns `Ok(())` once the stream ends; the signature leaves
/// room for startup failures.
pub async fn run_dnsname_controller(
    client: Client,
    context: Arc<Context>,
    max_concurrent_reconciles: u16,
) -> Result<()> {
    info!(
        concurrency = max_concurrent_reconciles,
        "Starting DNSName controller"
    );

    let api = Api::<DNSName>::all(client);

    Controller::new(api, WatcherConfig::default())
        .with_config(ControllerConfig::default().concurrency(max_concurrent_reconciles))
        .shutdown_on_signal()
        .run(reconcile_wrapper, error_policy, context)
        .for_each(|result| {
            match result {
                Ok((object, action)) => {
                    debug!(dnsname = %object, action = ?action, "Reconciled DNSName");
                }
                Err(e) => warn!(error = %e, "DNSName controller reported an error"),
            }
            futures::future::ready(())
        })
        .await;

    info!("DNSName controller stopped");
    Ok(())
}

/// Reconcile one `DNSName` and record metrics for the pass.
async fn reconcile_wrapper(
    dnsname: Arc<DNSName>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let start = Instant::now();
    let namespace = dnsname.namespace().unwrap_or_default();
    let name = dnsname.name_any();

    match reconcile_dnsname(ctx.store.as_ref(), ctx.backend.as_ref(), &namespace, &name).await {
        Ok(outcome) => {
            info!(
                namespace = %namespace,
                name = %name,
                outcome = outcome.as_label(),
                "Successfully reconciled DNSName"
            );
            record_reconciliation_success(KIND_DNS_NAME, outcome.as_label(), start.elapsed());
            Ok(action_for(outcome, ctx.requeue_interval))
        }
        Err(e) => {
            error!(namespace = %namespace, name = %name, error = %e, "Failed to reconcile DNSName");
            record_reconciliation_error(KIND_DNS_NAME, e.error_type(), start.elapsed());
            Err(e)
        }
    }
}

/// Next action after a successful pass.
///
/// Resources that are gone or being deleted wait for the next change; live
/// ones are checked again after `requeue_interval` so out-of-band edits in
/// Pi-hole get repaired.
#[must_use]
pub fn action_for(outcome: ReconcileOutcome, requeue_interval: Duration) -> Action {
    if outcome.is_terminal() {
        Action::await_change()
    } else {
        Action::requeue(requeue_interval)
    }
}

/// Action after a failed pass.
#[must_use]
pub fn error_action() -> Action {
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_DURATION_SECS))
}

#[allow(clippy::needless_pass_by_value)] // Signature required by kube::runtime::Controller
fn error_policy(dnsname: Arc<DNSName>, err: &ReconcileError, _ctx: Arc<Context>) -> Action {
    warn!(
        dnsname = %dnsname.name_any(),
        error = %err,
        "Reconciliation error - will retry in {}s",
        ERROR_REQUEUE_DURATION_SECS
    );
    error_action()
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod controller_tests;
