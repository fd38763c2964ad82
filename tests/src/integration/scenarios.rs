//! # Admission → Index Scenarios
//!
//! ## Scenarios
//!
//! - **A** - valid token under marker `"X"` is admitted and found by locator
//! - **B** - expired token is rejected and never indexed
//! - **C** - spend retires the record; a second spend is a no-op
//! - **D** - signature over fields 0..=7 is rejected
//!
//! Plus replay, check ordering, key policy and concurrent admission of one
//! output.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use hc_01_commitment_admission::test_utils::{
        alt_keypair, fields_of, resign, test_keypair, test_txid, NOW, TEST_LOCATOR,
    };
    use hc_01_commitment_admission::{
        encode, AdmissionApi, AdmissionConfig, AdmissionOutcome, AdmissionService,
        CommitmentBuilder, KeyPolicy, RejectReason, Rejection, SpendOutcome,
    };
    use hc_02_commitment_index::{
        CommitmentIndex, CommitmentIndexApi, InMemoryCommitmentStore, LookupAnswer,
        LookupQuestion, LookupService, OutputReference, DEFAULT_LOOKUP_SERVICE,
    };
    use node_runtime::DirectIndexSink;
    use serde_json::json;
    use shared_crypto::sha256_concat;
    use shared_types::{FixedTimeSource, OutputKey};

    // =========================================================================
    // FIXTURES
    // =========================================================================

    const TOPIC: &str = "tm_uhrp";
    const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    type Index = Arc<CommitmentIndex<InMemoryCommitmentStore>>;
    type Admission = AdmissionService<DirectIndexSink<Index>, Arc<FixedTimeSource>>;

    struct Harness {
        admission: Arc<Admission>,
        index: Index,
        lookup: LookupService<Index>,
        clock: Arc<FixedTimeSource>,
    }

    impl Harness {
        fn new(config: AdmissionConfig) -> Self {
            let index = Arc::new(CommitmentIndex::new(InMemoryCommitmentStore::new()));
            let clock = Arc::new(FixedTimeSource::new(NOW));
            let admission = AdmissionService::with_time_source(
                config,
                DirectIndexSink::new(Arc::clone(&index)),
                Arc::clone(&clock),
            );
            Self {
                admission: Arc::new(admission),
                lookup: LookupService::new(Arc::clone(&index)),
                index,
                clock,
            }
        }

        fn with_marker(marker: &str) -> Self {
            Self::new(AdmissionConfig {
                protocol_marker: marker.to_string(),
                ..AdmissionConfig::default()
            })
        }

        async fn add(&self, txid: &str, output_index: u32, script: &[u8]) -> AdmissionOutcome {
            self.admission
                .on_output_added(txid, output_index, script, TOPIC)
                .await
                .unwrap()
        }

        async fn spend(&self, txid: &str, output_index: u32) -> SpendOutcome {
            self.admission
                .on_output_spent(txid, output_index, TOPIC)
                .await
                .unwrap()
        }
    }

    fn hello_token(marker: &str) -> Vec<u8> {
        CommitmentBuilder::new(TEST_LOCATOR)
            .protocol_marker(marker)
            .content(b"hello")
            .content_size(1024)
            .expires_at(NOW + 3600)
            .sign(&test_keypair(), NOW)
            .unwrap()
            .script
    }

    fn tx_a() -> String {
        test_txid(0xa)
    }

    fn key_a() -> OutputKey {
        OutputKey::new(&tx_a(), 0).unwrap()
    }

    // =========================================================================
    // SCENARIOS A-D
    // =========================================================================

    #[tokio::test]
    async fn scenario_a_valid_token_is_admitted_and_found() {
        let harness = Harness::with_marker("X");

        let outcome = harness.add(&tx_a(), 0, &hello_token("X")).await;
        let AdmissionOutcome::Admitted { record, replayed } = outcome else {
            panic!("expected admission, got {outcome:?}");
        };
        assert!(!replayed);
        assert_eq!(record.content_hash, HELLO_SHA256);
        assert_eq!(record.retention_value, NOW + 3600);
        assert_eq!(record.content_size, 1024);
        assert_eq!(record.created_at, NOW);

        let found = harness.index.find_by_locator(TEST_LOCATOR).unwrap();
        assert_eq!(found, vec![record.clone()]);
        assert_eq!(harness.index.find_by_key(&key_a()).unwrap(), Some(record));
    }

    #[tokio::test]
    async fn scenario_b_expired_token_never_reaches_index() {
        let harness = Harness::with_marker("X");
        let script = hello_token("X");
        // Expiry is now one second in the past.
        harness.clock.set(NOW + 3601);

        let outcome = harness.add(&tx_a(), 0, &script).await;
        assert_eq!(
            outcome,
            AdmissionOutcome::Rejected(Rejection::Invalid(RejectReason::Expired))
        );
        assert_eq!(harness.index.stats().unwrap().live_commitments, 0);
    }

    #[tokio::test]
    async fn scenario_c_spend_retires_and_second_spend_is_noop() {
        let harness = Harness::with_marker("X");
        assert!(harness.add(&tx_a(), 0, &hello_token("X")).await.is_admitted());

        assert_eq!(
            harness.spend(&tx_a(), 0).await,
            SpendOutcome::Retired { removed: 1 }
        );
        assert_eq!(harness.index.find_by_key(&key_a()).unwrap(), None);

        assert_eq!(
            harness.spend(&tx_a(), 0).await,
            SpendOutcome::Retired { removed: 0 }
        );
        assert_eq!(harness.index.stats().unwrap().deletes, 1);
    }

    #[tokio::test]
    async fn scenario_d_signature_over_all_fields_rejected() {
        let harness = Harness::with_marker("X");
        let mut fields = fields_of(&hello_token("X"));
        let digest = sha256_concat(&fields[..8]);
        fields[7] = test_keypair().sign_prehash_der(&digest).unwrap();

        let outcome = harness.add(&tx_a(), 0, &encode(&fields).unwrap()).await;
        assert_eq!(
            outcome,
            AdmissionOutcome::Rejected(Rejection::Invalid(RejectReason::BadSignature))
        );
        assert!(harness.index.find_by_locator(TEST_LOCATOR).unwrap().is_empty());
    }

    // =========================================================================
    // REPLAY AND ORDERING
    // =========================================================================

    #[tokio::test]
    async fn replayed_output_keeps_first_record() {
        let harness = Harness::with_marker("X");
        let script = hello_token("X");

        let first = harness.add(&tx_a(), 0, &script).await;
        harness.clock.advance(60);
        let second = harness.add(&tx_a(), 0, &script).await;

        assert!(matches!(second, AdmissionOutcome::Admitted { replayed: true, .. }));
        let AdmissionOutcome::Admitted { record, .. } = first else {
            panic!("expected admission");
        };
        // The stored record is the original, not the replay's re-stamped copy.
        assert_eq!(harness.index.find_by_key(&key_a()).unwrap(), Some(record));
        assert_eq!(harness.index.stats().unwrap().duplicates, 1);
    }

    #[tokio::test]
    async fn spend_for_unknown_output_is_noop() {
        let harness = Harness::with_marker("X");
        assert_eq!(
            harness.spend(&test_txid(0x55), 9).await,
            SpendOutcome::Retired { removed: 0 }
        );
    }

    #[tokio::test]
    async fn first_failing_check_is_reported() {
        let harness = Harness::with_marker("X");
        let script = hello_token("uhrp-other");
        // Wrong marker and expired: the marker check runs first.
        harness.clock.set(NOW + 7200);

        assert_eq!(
            harness.add(&tx_a(), 0, &script).await,
            AdmissionOutcome::Rejected(Rejection::Invalid(RejectReason::WrongProtocol))
        );
    }

    #[tokio::test]
    async fn pinned_key_rejects_other_signers() {
        let harness = Harness::new(AdmissionConfig {
            protocol_marker: "X".into(),
            key_policy: KeyPolicy::Pinned(test_keypair().public_key()),
            ..AdmissionConfig::default()
        });

        assert!(harness.add(&tx_a(), 0, &hello_token("X")).await.is_admitted());

        let mut fields = fields_of(&hello_token("X"));
        resign(&mut fields, &alt_keypair());
        let outcome = harness.add(&tx_a(), 1, &encode(&fields).unwrap()).await;
        assert_eq!(
            outcome,
            AdmissionOutcome::Rejected(Rejection::Invalid(RejectReason::BadSignature))
        );
    }

    #[tokio::test]
    async fn identify_admissible_outputs_of_one_transaction() {
        let harness = Harness::with_marker("X");
        let good = hello_token("X");
        let outputs = vec![good.clone(), vec![0xff, 0x01], hello_token("Y"), good];

        let instructions = harness.admission.identify_admissible_outputs(&outputs);
        assert_eq!(instructions.outputs_to_admit, vec![0, 3]);
        assert!(instructions.coins_to_retain.is_empty());
    }

    // =========================================================================
    // CONCURRENCY
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_admissions_of_one_output_index_once() {
        let harness = Harness::with_marker("X");
        let script = Arc::new(hello_token("X"));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let admission = Arc::clone(&harness.admission);
                let script = Arc::clone(&script);
                tokio::spawn(async move {
                    admission
                        .on_output_added(&test_txid(0xa), 0, &script, TOPIC)
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut fresh = 0;
        for task in tasks {
            if let AdmissionOutcome::Admitted { replayed, .. } = task.await.unwrap() {
                if !replayed {
                    fresh += 1;
                }
            }
        }

        assert_eq!(fresh, 1);
        let stats = harness.index.stats().unwrap();
        assert_eq!(stats.live_commitments, 1);
        assert_eq!(stats.duplicates, 15);
    }

    // =========================================================================
    // LOOKUP
    // =========================================================================

    #[tokio::test]
    async fn lookup_by_hash_is_case_insensitive() {
        let harness = Harness::with_marker("X");
        harness.add(&tx_a(), 0, &hello_token("X")).await;
        harness.add(&test_txid(0xb), 2, &hello_token("X")).await;

        let answer = harness
            .lookup
            .lookup(&LookupQuestion::new(
                DEFAULT_LOOKUP_SERVICE,
                json!({ "fileHash": HELLO_SHA256.to_uppercase() }),
            ))
            .unwrap();

        assert_eq!(
            answer,
            LookupAnswer::OutputList {
                outputs: vec![
                    OutputReference {
                        txid: tx_a(),
                        output_index: 0
                    },
                    OutputReference {
                        txid: test_txid(0xb),
                        output_index: 2
                    },
                ]
            }
        );
    }
}
