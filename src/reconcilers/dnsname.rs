// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `DNSName` reconciliation.
//!
//! One pass converges one declared record into Pi-hole:
//!
//! 1. **Load** - fetch the `DNSName`; a missing resource ends the pass
//! 2. **Finalizer gate** - add the finalizer, or run cleanup when deletion is requested
//! 3. **Build desired** - turn the spec into a [`Record`]
//! 4. **Fetch observed** - list every record Pi-hole serves
//! 5. **Converge** - create, replace, or leave the record untouched
//!
//! Records are matched by domain. The pass is in sync only when exactly one
//! observed record carries the domain and it equals the desired record.
//! Otherwise every record with that domain is deleted before the desired one is
//! created, so no partial-field update is ever issued. Mutations already sent
//! are not rolled back on failure; the next pass re-observes the backend.
//!
//! Status conditions and events narrate the pass. Writing them is best-effort:
//! a failure is logged and never changes the outcome.

use crate::backend::DnsBackend;
use crate::constants::DNS_NAME_FINALIZER;
use crate::crd::{DNSName, DNSNameStatus};
use crate::errors::ReconcileError;
use crate::http_errors::map_reconcile_error_to_reason;
use crate::reconcilers::finalizers::{has_finalizer, is_being_deleted};
use crate::reconcilers::status::next_status;
use crate::reconcilers::store::{DeclaredStore, Notice, NoticeSeverity};
use crate::record::Record;
use crate::status_reasons::{
    CONDITION_STATUS_FALSE, CONDITION_STATUS_TRUE, CONDITION_STATUS_UNKNOWN,
    CONDITION_TYPE_READY, REASON_PENDING, REASON_RECORDS_CLEANED_UP, REASON_RECORD_CREATED,
    REASON_RECORD_IN_SYNC, REASON_RECORD_REPLACED,
};
use tracing::{debug, info, warn};

const ACTION_RECONCILE: &str = "Reconcile";
const ACTION_CLEANUP: &str = "Cleanup";

/// What a successful reconcile pass did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The `DNSName` no longer exists.
    NotFound,
    /// Deletion was requested but the finalizer is already gone.
    AwaitingDeletion,
    /// Deletion was requested; `deleted` matching records were removed and the
    /// finalizer released.
    CleanedUp { deleted: usize },
    /// No record carried the domain; the desired record was created.
    Created,
    /// `deleted` stale records were removed and the desired record created.
    Replaced { deleted: usize },
    /// Pi-hole already serves exactly the desired record.
    InSync,
}

impl ReconcileOutcome {
    /// Label used for the reconciliation metrics.
    #[must_use]
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::AwaitingDeletion => "awaiting_deletion",
            Self::CleanedUp { .. } => "cleaned_up",
            Self::Created => "created",
            Self::Replaced { .. } => "replaced",
            Self::InSync => "in_sync",
        }
    }

    /// Whether the `DNSName` is gone or on its way out.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::NotFound | Self::AwaitingDeletion | Self::CleanedUp { .. }
        )
    }
}

/// Best-effort status writer that remembers the last status it applied.
struct StatusNarrator<'a, S: ?Sized> {
    store: &'a S,
    resource: &'a DNSName,
    status: Option<DNSNameStatus>,
}

impl<'a, S: DeclaredStore + ?Sized> StatusNarrator<'a, S> {
    fn new(store: &'a S, resource: &'a DNSName) -> Self {
        Self {
            store,
            resource,
            status: resource.status.clone(),
        }
    }

    async fn ready(&mut self, status: &str, reason: &str, message: &str) {
        let Some(next) = next_status(
            self.status.as_ref(),
            self.resource.metadata.generation,
            CONDITION_TYPE_READY,
            status,
            reason,
            message,
        ) else {
            return;
        };

        match self.store.patch_status(self.resource, &next).await {
            Ok(()) => self.status = Some(next),
            Err(e) => warn!(error = %e, reason = reason, "Failed to update DNSName status"),
        }
    }

    async fn notify(&self, severity: NoticeSeverity, reason: &'static str, action: &'static str, note: String) {
        let notice = Notice {
            severity,
            reason,
            action,
            note,
        };
        if let Err(e) = self.store.publish_event(self.resource, notice).await {
            warn!(error = %e, reason = reason, "Failed to publish DNSName event");
        }
    }

    async fn fail(&mut self, error: &ReconcileError, action: &'static str) {
        let (reason, message) = map_reconcile_error_to_reason(error);
        self.ready(CONDITION_STATUS_FALSE, reason, &message).await;
        self.notify(NoticeSeverity::Warning, reason, action, message)
            .await;
    }
}

/// Run one reconcile pass for the `DNSName` `namespace/name`.
///
/// # Errors
///
/// Returns [`ReconcileError`] when the spec is invalid, when Pi-hole cannot be
/// listed or mutated, or when the `DNSName` cannot be read or its finalizer
/// patched. The caller owns retry.
pub async fn reconcile_dnsname<S, B>(
    store: &S,
    backend: &B,
    namespace: &str,
    name: &str,
) -> Result<ReconcileOutcome, ReconcileError>
where
    S: DeclaredStore + ?Sized,
    B: DnsBackend + ?Sized,
{
    let Some(dnsname) = store
        .get(namespace, name)
        .await
        .map_err(ReconcileError::Store)?
    else {
        debug!(namespace = %namespace, name = %name, "DNSName not found, nothing to do");
        return Ok(ReconcileOutcome::NotFound);
    };

    let mut narrator = StatusNarrator::new(store, &dnsname);

    if is_being_deleted(&dnsname) {
        if !has_finalizer(&dnsname, DNS_NAME_FINALIZER) {
            debug!(namespace = %namespace, name = %name, "DNSName is being deleted without our finalizer");
            return Ok(ReconcileOutcome::AwaitingDeletion);
        }

        return match cleanup(store, backend, &dnsname).await {
            Ok(deleted) => Ok(ReconcileOutcome::CleanedUp { deleted }),
            Err(e) => {
                narrator.fail(&e, ACTION_CLEANUP).await;
                Err(e)
            }
        };
    }

    if !has_finalizer(&dnsname, DNS_NAME_FINALIZER) {
        if let Err(e) = store.add_finalizer(&dnsname, DNS_NAME_FINALIZER).await {
            let e = ReconcileError::Store(e);
            narrator.fail(&e, ACTION_RECONCILE).await;
            return Err(e);
        }
    }

    match converge(backend, &dnsname, &mut narrator).await {
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            narrator.fail(&e, ACTION_RECONCILE).await;
            Err(e)
        }
    }
}

/// Delete every observed record carrying the declared domain, then release
/// the finalizer. Returns the number of records deleted.
async fn cleanup<S, B>(store: &S, backend: &B, dnsname: &DNSName) -> Result<usize, ReconcileError>
where
    S: DeclaredStore + ?Sized,
    B: DnsBackend + ?Sized,
{
    let domain = &dnsname.spec.domain;
    info!(domain = %domain, "DNSName is being deleted, removing its records from Pi-hole");

    let observed = backend.list_records().await?;
    let matching: Vec<&Record> = observed.iter().filter(|r| r.has_domain(domain)).collect();

    for record in &matching {
        backend.delete_record(record).await?;
    }

    store
        .remove_finalizer(dnsname, DNS_NAME_FINALIZER)
        .await
        .map_err(ReconcileError::Store)?;

    let deleted = matching.len();
    info!(domain = %domain, deleted = deleted, "Released DNSName finalizer");

    let notice = Notice {
        severity: NoticeSeverity::Normal,
        reason: REASON_RECORDS_CLEANED_UP,
        action: ACTION_CLEANUP,
        note: format!("Deleted {deleted} record(s) for {domain}"),
    };
    if let Err(e) = store.publish_event(dnsname, notice).await {
        warn!(error = %e, "Failed to publish DNSName event");
    }

    Ok(deleted)
}

/// Converge Pi-hole to the desired record for a live `DNSName`.
async fn converge<S, B>(
    backend: &B,
    dnsname: &DNSName,
    narrator: &mut StatusNarrator<'_, S>,
) -> Result<ReconcileOutcome, ReconcileError>
where
    S: DeclaredStore + ?Sized,
    B: DnsBackend + ?Sized,
{
    let desired = Record::from_declared(&dnsname.spec)?;
    let observed = backend.list_records().await?;

    let matching: Vec<&Record> = observed
        .iter()
        .filter(|r| r.has_domain(&desired.domain))
        .collect();

    if let [only] = matching.as_slice() {
        if **only == desired {
            debug!(record = %desired, "Record already in sync");
            narrator
                .ready(
                    CONDITION_STATUS_TRUE,
                    REASON_RECORD_IN_SYNC,
                    &format!("{desired} is served by Pi-hole"),
                )
                .await;
            return Ok(ReconcileOutcome::InSync);
        }
    }

    narrator
        .ready(
            CONDITION_STATUS_UNKNOWN,
            REASON_PENDING,
            &format!("Converging {desired}"),
        )
        .await;

    for stale in &matching {
        info!(stale = %stale, desired = %desired, "Deleting stale record");
        backend.delete_record(stale).await?;
    }

    backend.create_record(&desired).await?;

    let (outcome, reason, message) = if matching.is_empty() {
        (
            ReconcileOutcome::Created,
            REASON_RECORD_CREATED,
            format!("Created {desired}"),
        )
    } else {
        (
            ReconcileOutcome::Replaced {
                deleted: matching.len(),
            },
            REASON_RECORD_REPLACED,
            format!("Replaced {} record(s) with {desired}", matching.len()),
        )
    };

    info!(record = %desired, outcome = outcome.as_label(), "Record converged");
    narrator.ready(CONDITION_STATUS_TRUE, reason, &message).await;
    narrator
        .notify(NoticeSeverity::Normal, reason, ACTION_RECONCILE, message)
        .await;

    Ok(outcome)
}

#[cfg(test)]
#[path = "dnsname_tests.rs"]
mod dnsname_tests;
