// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The DNS backend seen by the reconciler.

use crate::errors::PiHoleError;
use crate::record::Record;

/// Record operations the reconciler needs from a DNS backend.
///
/// [`crate::pihole::PiHoleClient`] is the production implementation.
#[async_trait::async_trait]
pub trait DnsBackend: Send + Sync {
    /// Every record the backend currently serves, owned by the operator or not.
    async fn list_records(&self) -> Result<Vec<Record>, PiHoleError>;

    /// Create `record`.
    async fn create_record(&self, record: &Record) -> Result<(), PiHoleError>;

    /// Delete `record`, identified by its full encoded value.
    async fn delete_record(&self, record: &Record) -> Result<(), PiHoleError>;
}
