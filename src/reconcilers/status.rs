// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Status condition helpers for `DNSName` resources.
//!
//! # Condition Format
//!
//! Kubernetes conditions follow a standard format:
//! - `type`: The aspect of the resource being reported (here always `Ready`)
//! - `status`: "True", "False", or "Unknown"
//! - `reason`: A programmatic identifier (CamelCase)
//! - `message`: A human-readable explanation
//! - `lastTransitionTime`: RFC3339 timestamp when the condition changed
//!
//! Conditions are upserted by type, so the list never grows past one entry per
//! condition type. None of the helpers here talk to the API server; persisting
//! is done through [`crate::reconcilers::store::DeclaredStore::patch_status`].
//!
//! # Example
//!
//! ```rust
//! use pihole_operator::reconcilers::status::create_condition;
//!
//! let condition = create_condition("Ready", "True", "RecordCreated", "Record created");
//! assert_eq!(condition.status, "True");
//! ```

use crate::crd::{Condition, DNSNameStatus};
use chrono::Utc;

/// Create a new condition stamped with the current time.
#[must_use]
pub fn create_condition(
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
) -> Condition {
    Condition {
        r#type: condition_type.to_string(),
        status: status.to_string(),
        reason: Some(reason.to_string()),
        message: Some(message.to_string()),
        last_transition_time: Some(Utc::now().to_rfc3339()),
    }
}

/// Check if a condition has changed compared to the existing one.
///
/// A condition is considered changed if its type, status, reason or message
/// differ. `lastTransitionTime` is never compared.
#[must_use]
pub fn condition_changed(existing: Option<&Condition>, new_condition: &Condition) -> bool {
    if let Some(current) = existing {
        current.r#type != new_condition.r#type
            || current.status != new_condition.status
            || current.reason != new_condition.reason
            || current.message != new_condition.message
    } else {
        true
    }
}

/// Find a condition by type.
#[must_use]
pub fn find_condition<'a>(
    conditions: &'a [Condition],
    condition_type: &str,
) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.r#type == condition_type)
}

/// Update or add a condition in a conditions list (in-memory, no API call).
///
/// The `lastTransitionTime` is kept when the status value does not change and
/// reset to now when it does.
pub fn update_condition_in_memory(
    conditions: &mut Vec<Condition>,
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
) {
    if let Some(existing) = conditions.iter_mut().find(|c| c.r#type == condition_type) {
        let last_transition_time = if existing.status == status {
            existing
                .last_transition_time
                .clone()
                .unwrap_or_else(|| Utc::now().to_rfc3339())
        } else {
            Utc::now().to_rfc3339()
        };

        existing.status = status.to_string();
        existing.reason = Some(reason.to_string());
        existing.message = Some(message.to_string());
        existing.last_transition_time = Some(last_transition_time);
    } else {
        conditions.push(create_condition(condition_type, status, reason, message));
    }
}

/// Compute the status that results from setting one condition.
///
/// Returns `None` when the condition is semantically unchanged and the observed
/// generation is already current, so callers can skip the status patch.
#[must_use]
pub fn next_status(
    current: Option<&DNSNameStatus>,
    observed_generation: Option<i64>,
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
) -> Option<DNSNameStatus> {
    let mut next = current.cloned().unwrap_or_default();

    let candidate = create_condition(condition_type, status, reason, message);
    let unchanged = !condition_changed(find_condition(&next.conditions, condition_type), &candidate)
        && next.observed_generation == observed_generation;
    if unchanged {
        return None;
    }

    update_condition_in_memory(&mut next.conditions, condition_type, status, reason, message);
    next.observed_generation = observed_generation;
    Some(next)
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod status_tests;
