// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `dnsname.rs`, against in-memory fakes of the store and backend.

#[cfg(test)]
mod tests {
    use crate::backend::DnsBackend;
    use crate::constants::DNS_NAME_FINALIZER;
    use crate::crd::{DNSName, DNSNameSpec, DNSNameStatus, DNSRecordType};
    use crate::errors::{PiHoleError, ReconcileError};
    use crate::pihole::codec::encode_key;
    use crate::reconcilers::dnsname::{reconcile_dnsname, ReconcileOutcome};
    use crate::reconcilers::status::find_condition;
    use crate::reconcilers::store::{DeclaredStore, Notice, NoticeSeverity};
    use crate::record::Record;
    use crate::status_reasons::{
        CONDITION_STATUS_FALSE, CONDITION_STATUS_TRUE, CONDITION_TYPE_READY,
        REASON_BACKEND_INTERNAL_ERROR, REASON_INVALID_SPEC, REASON_RECORDS_CLEANED_UP,
        REASON_RECORD_CREATED, REASON_RECORD_IN_SYNC, REASON_RECORD_REPLACED,
    };
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
    use std::sync::Mutex;

    const NAMESPACE: &str = "default";
    const NAME: &str = "example";

    // ============================================================================
    // Fakes
    // ============================================================================

    #[derive(Clone, Debug, PartialEq, Eq)]
    enum Call {
        List,
        Create(Record),
        Delete(Record),
    }

    /// Backend that applies creates and deletes to an in-memory record list.
    #[derive(Default)]
    struct FakeBackend {
        records: Mutex<Vec<Record>>,
        calls: Mutex<Vec<Call>>,
        fail_list: bool,
        fail_create: bool,
    }

    impl FakeBackend {
        fn with_records(records: Vec<Record>) -> Self {
            Self {
                records: Mutex::new(records),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn records(&self) -> Vec<Record> {
            self.records.lock().unwrap().clone()
        }

        fn create_count(&self) -> usize {
            self.calls()
                .iter()
                .filter(|c| matches!(c, Call::Create(_)))
                .count()
        }
    }

    #[async_trait::async_trait]
    impl DnsBackend for FakeBackend {
        async fn list_records(&self) -> Result<Vec<Record>, PiHoleError> {
            self.calls.lock().unwrap().push(Call::List);
            if self.fail_list {
                return Err(PiHoleError::Backend {
                    operation: "list hosts".to_string(),
                    status: 500,
                });
            }
            Ok(self.records())
        }

        async fn create_record(&self, record: &Record) -> Result<(), PiHoleError> {
            self.calls.lock().unwrap().push(Call::Create(record.clone()));
            if self.fail_create {
                return Err(PiHoleError::Backend {
                    operation: "create record".to_string(),
                    status: 500,
                });
            }
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }

        async fn delete_record(&self, record: &Record) -> Result<(), PiHoleError> {
            self.calls.lock().unwrap().push(Call::Delete(record.clone()));
            let mut records = self.records.lock().unwrap();
            let Some(index) = records.iter().position(|r| r == record) else {
                return Err(PiHoleError::Backend {
                    operation: "delete record".to_string(),
                    status: 404,
                });
            };
            records.remove(index);
            Ok(())
        }
    }

    /// Store holding at most one `DNSName`, mimicking the API server's
    /// handling of finalizers on deleted objects.
    #[derive(Default)]
    struct FakeStore {
        resource: Mutex<Option<DNSName>>,
        events: Mutex<Vec<Notice>>,
        fail_status: bool,
        fail_finalizer: bool,
    }

    impl FakeStore {
        fn with(resource: DNSName) -> Self {
            Self {
                resource: Mutex::new(Some(resource)),
                ..Self::default()
            }
        }

        fn current(&self) -> Option<DNSName> {
            self.resource.lock().unwrap().clone()
        }

        fn ready_condition(&self) -> Option<(String, String)> {
            let resource = self.current()?;
            let status = resource.status?;
            let ready = find_condition(&status.conditions, CONDITION_TYPE_READY)?;
            Some((ready.status.clone(), ready.reason.clone().unwrap_or_default()))
        }

        fn events(&self) -> Vec<Notice> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl DeclaredStore for FakeStore {
        async fn get(&self, _namespace: &str, _name: &str) -> anyhow::Result<Option<DNSName>> {
            Ok(self.current())
        }

        async fn add_finalizer(&self, _resource: &DNSName, finalizer: &str) -> anyhow::Result<()> {
            if self.fail_finalizer {
                anyhow::bail!("conflict");
            }
            let mut guard = self.resource.lock().unwrap();
            if let Some(resource) = guard.as_mut() {
                resource
                    .metadata
                    .finalizers
                    .get_or_insert_with(Vec::new)
                    .push(finalizer.to_string());
            }
            Ok(())
        }

        async fn remove_finalizer(
            &self,
            _resource: &DNSName,
            finalizer: &str,
        ) -> anyhow::Result<()> {
            let mut guard = self.resource.lock().unwrap();
            let gone = match guard.as_mut() {
                Some(resource) => {
                    if let Some(finalizers) = resource.metadata.finalizers.as_mut() {
                        finalizers.retain(|f| f != finalizer);
                    }
                    resource.metadata.deletion_timestamp.is_some()
                        && resource
                            .metadata
                            .finalizers
                            .as_ref()
                            .is_none_or(Vec::is_empty)
                }
                None => false,
            };
            if gone {
                *guard = None;
            }
            Ok(())
        }

        async fn patch_status(
            &self,
            _resource: &DNSName,
            status: &DNSNameStatus,
        ) -> anyhow::Result<()> {
            if self.fail_status {
                anyhow::bail!("status subresource unavailable");
            }
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
    // Helpers
    // ============================================================================

    fn dnsname(spec: DNSNameSpec) -> DNSName {
        let mut resource = DNSName::new(NAME, spec);
        resource.metadata.namespace = Some(NAMESPACE.to_string());
        resource.metadata.generation = Some(1);
        resource
    }

    fn a_spec(domain: &str, address: &str) -> DNSNameSpec {
        DNSNameSpec {
            record_type: DNSRecordType::A,
            domain: domain.to_string(),
            target: None,
            target_ip: Some(address.to_string()),
            ttl: None,
        }
    }

    fn cname_spec(domain: &str, target: &str, ttl: Option<i32>) -> DNSNameSpec {
        DNSNameSpec {
            record_type: DNSRecordType::Cname,
            domain: domain.to_string(),
            target: Some(target.to_string()),
            target_ip: None,
            ttl,
        }
    }

    fn finalized(mut resource: DNSName) -> DNSName {
        resource.metadata.finalizers = Some(vec![DNS_NAME_FINALIZER.to_string()]);
        resource
    }

    fn deleting(mut resource: DNSName) -> DNSName {
        resource.metadata.deletion_timestamp = Some(Time(k8s_openapi::jiff::Timestamp::now()));
        resource
    }

    async fn run(store: &FakeStore, backend: &FakeBackend) -> Result<ReconcileOutcome, ReconcileError> {
        reconcile_dnsname(store, backend, NAMESPACE, NAME).await
    }

    // ============================================================================
    // Load and finalizer gate
    // ============================================================================

    #[tokio::test]
    async fn test_missing_resource_is_not_an_error() {
        let store = FakeStore::default();
        let backend = FakeBackend::default();

        let outcome = run(&store, &backend).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::NotFound);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_finalizer_is_added_before_converging() {
        let store = FakeStore::with(dnsname(a_spec("foobar4.com", "192.168.178.1")));
        let backend = FakeBackend::default();

        run(&store, &backend).await.unwrap();

        let resource = store.current().unwrap();
        assert_eq!(
            resource.metadata.finalizers,
            Some(vec![DNS_NAME_FINALIZER.to_string()])
        );
    }

    #[tokio::test]
    async fn test_finalizer_failure_stops_the_pass() {
        let store = FakeStore {
            fail_finalizer: true,
            ..FakeStore::with(dnsname(a_spec("foobar4.com", "192.168.178.1")))
        };
        let backend = FakeBackend::default();

        let err = run(&store, &backend).await.unwrap_err();

        assert!(matches!(err, ReconcileError::Store(_)));
        assert!(backend.calls().is_empty());
    }

    // ============================================================================
    // Converge
    // ============================================================================

    #[tokio::test]
    async fn test_address_record_created_on_empty_backend() {
        let store = FakeStore::with(dnsname(a_spec("foobar4.com", "192.168.178.1")));
        let backend = FakeBackend::default();

        let outcome = run(&store, &backend).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::Created);
        let desired = Record::a("foobar4.com", "192.168.178.1");
        assert_eq!(backend.calls(), vec![Call::List, Call::Create(desired.clone())]);
        assert_eq!(encode_key(&desired).1, "192.168.178.1 foobar4.com");

        assert_eq!(
            store.ready_condition(),
            Some((
                CONDITION_STATUS_TRUE.to_string(),
                REASON_RECORD_CREATED.to_string()
            ))
        );
        let events = store.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].severity, NoticeSeverity::Normal);
        assert_eq!(events[0].reason, REASON_RECORD_CREATED);
    }

    #[tokio::test]
    async fn test_matching_cname_needs_no_mutation() {
        let store = FakeStore::with(finalized(dnsname(cname_spec(
            "foobar.de",
            "homelab",
            Some(500),
        ))));
        let backend =
            FakeBackend::with_records(vec![Record::cname("foobar.de", "homelab", Some(500))]);

        let outcome = run(&store, &backend).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::InSync);
        assert_eq!(backend.calls(), vec![Call::List]);
        assert_eq!(
            store.ready_condition(),
            Some((
                CONDITION_STATUS_TRUE.to_string(),
                REASON_RECORD_IN_SYNC.to_string()
            ))
        );
        assert!(store.events().is_empty());
    }

    #[tokio::test]
    async fn test_second_pass_is_a_no_op() {
        let store = FakeStore::with(dnsname(cname_spec("grafana.home.lab", "homelab", None)));
        let backend = FakeBackend::default();

        assert_eq!(
            run(&store, &backend).await.unwrap(),
            ReconcileOutcome::Created
        );
        assert_eq!(run(&store, &backend).await.unwrap(), ReconcileOutcome::InSync);
        assert_eq!(backend.create_count(), 1);
    }

    #[tokio::test]
    async fn test_drift_is_replaced_delete_before_create() {
        let store = FakeStore::with(finalized(dnsname(cname_spec("foobar.de", "homelab", None))));
        let stale = Record::cname("foobar.de", "homelab", Some(500));
        let backend = FakeBackend::with_records(vec![stale.clone()]);

        let outcome = run(&store, &backend).await.unwrap();

        let desired = Record::cname("foobar.de", "homelab", None);
        assert_eq!(outcome, ReconcileOutcome::Replaced { deleted: 1 });
        assert_eq!(
            backend.calls(),
            vec![Call::List, Call::Delete(stale), Call::Create(desired.clone())]
        );
        assert_eq!(backend.records(), vec![desired]);
        assert_eq!(
            store.ready_condition(),
            Some((
                CONDITION_STATUS_TRUE.to_string(),
                REASON_RECORD_REPLACED.to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_every_same_domain_record_is_deleted_before_create() {
        let store = FakeStore::with(finalized(dnsname(a_spec("nas.home.lab", "10.0.0.5"))));
        let as_cname = Record::cname("nas.home.lab", "homelab", None);
        let old_address = Record::a("nas.home.lab", "10.0.0.4");
        let unrelated = Record::a("printer.home.lab", "10.0.0.9");
        let backend = FakeBackend::with_records(vec![
            old_address.clone(),
            unrelated.clone(),
            as_cname.clone(),
        ]);

        let outcome = run(&store, &backend).await.unwrap();

        let desired = Record::a("nas.home.lab", "10.0.0.5");
        assert_eq!(outcome, ReconcileOutcome::Replaced { deleted: 2 });
        assert_eq!(
            backend.calls(),
            vec![
                Call::List,
                Call::Delete(old_address),
                Call::Delete(as_cname),
                Call::Create(desired.clone()),
            ]
        );
        assert_eq!(backend.records(), vec![unrelated, desired]);
    }

    #[tokio::test]
    async fn test_duplicate_of_desired_is_not_in_sync() {
        let store = FakeStore::with(finalized(dnsname(a_spec("nas.home.lab", "10.0.0.5"))));
        let desired = Record::a("nas.home.lab", "10.0.0.5");
        let backend = FakeBackend::with_records(vec![desired.clone(), desired.clone()]);

        let outcome = run(&store, &backend).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::Replaced { deleted: 2 });
        assert_eq!(backend.records(), vec![desired]);
        assert_eq!(backend.create_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_spec_touches_nothing() {
        let mut spec = a_spec("foobar4.com", "192.168.178.1");
        spec.target_ip = None;
        let store = FakeStore::with(finalized(dnsname(spec)));
        let backend = FakeBackend::default();

        let err = run(&store, &backend).await.unwrap_err();

        assert!(matches!(err, ReconcileError::Validation(_)));
        assert!(backend.calls().is_empty());
        assert_eq!(
            store.ready_condition(),
            Some((
                CONDITION_STATUS_FALSE.to_string(),
                REASON_INVALID_SPEC.to_string()
            ))
        );
        let events = store.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].severity, NoticeSeverity::Warning);
    }

    #[tokio::test]
    async fn test_unsupported_type_is_a_validation_error() {
        let mut spec = cname_spec("foobar.de", "homelab", None);
        spec.record_type = DNSRecordType::Unsupported;
        let store = FakeStore::with(finalized(dnsname(spec)));
        let backend = FakeBackend::default();

        let err = run(&store, &backend).await.unwrap_err();

        assert!(matches!(err, ReconcileError::Validation(_)));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_list_failure_is_reported() {
        let store = FakeStore::with(finalized(dnsname(a_spec("foobar4.com", "192.168.178.1"))));
        let backend = FakeBackend {
            fail_list: true,
            ..FakeBackend::default()
        };

        let err = run(&store, &backend).await.unwrap_err();

        assert!(matches!(err, ReconcileError::Backend(_)));
        assert_eq!(backend.calls(), vec![Call::List]);
        assert_eq!(
            store.ready_condition(),
            Some((
                CONDITION_STATUS_FALSE.to_string(),
                REASON_BACKEND_INTERNAL_ERROR.to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_create_failure_keeps_completed_deletes() {
        let store = FakeStore::with(finalized(dnsname(cname_spec("foobar.de", "homelab", None))));
        let stale = Record::cname("foobar.de", "homelab", Some(500));
        let backend = FakeBackend {
            fail_create: true,
            ..FakeBackend::with_records(vec![stale.clone()])
        };

        let err = run(&store, &backend).await.unwrap_err();

        assert!(matches!(err, ReconcileError::Backend(_)));
        assert_eq!(backend.calls().len(), 3);
        assert!(backend.records().is_empty());
    }

    #[tokio::test]
    async fn test_status_failure_does_not_change_outcome() {
        let store = FakeStore {
            fail_status: true,
            ..FakeStore::with(dnsname(a_spec("foobar4.com", "192.168.178.1")))
        };
        let backend = FakeBackend::default();

        let outcome = run(&store, &backend).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::Created);
        assert!(store.ready_condition().is_none());
    }

    // ============================================================================
    // Deletion
    // ============================================================================

    #[tokio::test]
    async fn test_deletion_removes_matching_records_and_finalizer() {
        let store = FakeStore::with(deleting(finalized(dnsname(cname_spec(
            "foobar.de",
            "homelab",
            Some(500),
        )))));
        let owned = Record::cname("foobar.de", "homelab", Some(500));
        let same_domain = Record::a("foobar.de", "10.0.0.1");
        let unrelated = Record::a("foobar4.com", "192.168.178.1");
        let backend = FakeBackend::with_records(vec![
            same_domain.clone(),
            unrelated.clone(),
            owned.clone(),
        ]);

        let outcome = run(&store, &backend).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::CleanedUp { deleted: 2 });
        assert_eq!(
            backend.calls(),
            vec![Call::List, Call::Delete(same_domain), Call::Delete(owned)]
        );
        assert_eq!(backend.records(), vec![unrelated]);
        assert_eq!(backend.create_count(), 0);
        assert!(store.current().is_none());
        assert_eq!(store.events()[0].reason, REASON_RECORDS_CLEANED_UP);
    }

    #[tokio::test]
    async fn test_deletion_with_nothing_to_clean() {
        let store = FakeStore::with(deleting(finalized(dnsname(a_spec(
            "foobar4.com",
            "192.168.178.1",
        )))));
        let backend = FakeBackend::default();

        let outcome = run(&store, &backend).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::CleanedUp { deleted: 0 });
        assert!(store.current().is_none());
    }

    #[tokio::test]
    async fn test_deletion_failure_keeps_finalizer() {
        let store = FakeStore::with(deleting(finalized(dnsname(a_spec(
            "foobar4.com",
            "192.168.178.1",
        )))));
        let backend = FakeBackend {
            fail_list: true,
            ..FakeBackend::default()
        };

        let err = run(&store, &backend).await.unwrap_err();

        assert!(matches!(err, ReconcileError::Backend(_)));
        let resource = store.current().unwrap();
        assert_eq!(
            resource.metadata.finalizers,
            Some(vec![DNS_NAME_FINALIZER.to_string()])
        );
    }

    #[tokio::test]
    async fn test_deletion_without_finalizer_is_left_alone() {
        let store = FakeStore::with(deleting(dnsname(a_spec("foobar4.com", "192.168.178.1"))));
        let backend = FakeBackend::with_records(vec![Record::a("foobar4.com", "192.168.178.1")]);

        let outcome = run(&store, &backend).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::AwaitingDeletion);
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(ReconcileOutcome::Created.as_label(), "created");
        assert_eq!(
            ReconcileOutcome::Replaced { deleted: 3 }.as_label(),
            "replaced"
        );
        assert!(ReconcileOutcome::CleanedUp { deleted: 0 }.is_terminal());
        assert!(!ReconcileOutcome::InSync.is_terminal());
    }
}
