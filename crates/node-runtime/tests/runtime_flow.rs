//! # Runtime Flow Tests
//!
//! Ledger events in, lookup answers out, through the real channel and
//! handler task.

use std::sync::Arc;

use hc_01_commitment_admission::test_utils::{test_txid, TokenFixture};
use hc_01_commitment_admission::{
    AdmissionError, AdmissionOutcome, AdmissionReport, RejectReason, Rejection, SinkError,
};
use hc_02_commitment_index::test_utils::FailingStore;
use hc_02_commitment_index::{LookupAnswer, LookupQuestion, OutputReference, NO_MATCH_MESSAGE};
use node_runtime::{NodeConfig, NodeRuntime};
use serde_json::json;
use shared_bus::EventPublisher;
use shared_types::{LedgerEvent, SystemTimeSource, TimeSource};

fn added(n: u8, output_index: u32, script: Vec<u8>) -> LedgerEvent {
    LedgerEvent::OutputAdded {
        txid: test_txid(n),
        output_index,
        script,
        topic: "tm_uhrp".into(),
    }
}

fn spent(n: u8, output_index: u32) -> LedgerEvent {
    LedgerEvent::OutputSpent {
        txid: test_txid(n),
        output_index,
        topic: "tm_uhrp".into(),
    }
}

fn by_locator(locator: &str) -> LookupQuestion {
    LookupQuestion::new("ls_uhrp", json!({ "uhrpUrl": locator }))
}

async fn started() -> NodeRuntime {
    let runtime = NodeRuntime::new(NodeConfig::default()).unwrap();
    runtime.start().await.unwrap();
    runtime
}

#[tokio::test]
async fn test_admitted_output_becomes_visible_to_lookup() {
    let runtime = started().await;
    let fixture = TokenFixture::new(SystemTimeSource.now());

    let report = runtime.submit(added(1, 0, fixture.script.clone())).await.unwrap();
    assert!(matches!(
        report,
        AdmissionReport::Added(AdmissionOutcome::Admitted { replayed: false, .. })
    ));
    runtime.wait_until_indexed().await;

    assert_eq!(
        runtime.lookup(&by_locator(&fixture.locator)).unwrap(),
        LookupAnswer::OutputList {
            outputs: vec![OutputReference {
                txid: test_txid(1),
                output_index: 0,
            }]
        }
    );

    runtime.submit(spent(1, 0)).await.unwrap();
    runtime.wait_until_indexed().await;
    assert_eq!(
        runtime.lookup(&by_locator(&fixture.locator)).unwrap(),
        LookupAnswer::Freeform {
            result: NO_MATCH_MESSAGE.into()
        }
    );

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_replayed_admission_indexed_once() {
    let runtime = started().await;
    let fixture = TokenFixture::new(SystemTimeSource.now());

    let mut replays = Vec::new();
    for _ in 0..3 {
        match runtime.submit(added(2, 1, fixture.script.clone())).await.unwrap() {
            AdmissionReport::Added(AdmissionOutcome::Admitted { replayed, .. }) => {
                replays.push(replayed)
            }
            other => panic!("unexpected report {other:?}"),
        }
    }
    assert_eq!(replays, vec![false, true, true]);
    runtime.wait_until_indexed().await;

    let stats = runtime.stats().unwrap();
    assert_eq!(stats.live_commitments, 1);
    assert_eq!(stats.duplicates, 2);
    assert_eq!(runtime.handler_stats().duplicates, 2);

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_rejected_output_never_indexed() {
    let runtime = started().await;
    let mut fixture = TokenFixture::new(SystemTimeSource.now());
    let last = fixture.script.len() - 1;
    fixture.script[last] ^= 0x01;

    let report = runtime.submit(added(3, 0, fixture.script)).await.unwrap();
    match report {
        AdmissionReport::Added(AdmissionOutcome::Rejected(rejection)) => {
            assert_eq!(rejection, Rejection::Invalid(RejectReason::BadSignature));
        }
        other => panic!("unexpected report {other:?}"),
    }

    runtime.wait_until_indexed().await;
    assert_eq!(runtime.stats().unwrap().live_commitments, 0);
    runtime.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_drains_queued_events() {
    let runtime = Arc::new(NodeRuntime::new(NodeConfig::default()).unwrap());
    let now = SystemTimeSource.now();

    // Queue admissions before the handler task exists; each submit waits for
    // its outcome.
    let submissions: Vec<_> = (0..5u8)
        .map(|n| {
            let runtime = Arc::clone(&runtime);
            let fixture = TokenFixture::with_locator(now, &format!("https://example.com/file{n}"));
            tokio::spawn(async move { runtime.submit(added(n, 0, fixture.script)).await })
        })
        .collect();

    let container = runtime.container();
    let publisher = container.admission.sink().publisher();
    while publisher.events_published() < 5 {
        tokio::task::yield_now().await;
    }
    runtime.start().await.unwrap();
    runtime.shutdown().await;

    for submission in submissions {
        let report = submission.await.unwrap().unwrap();
        assert!(matches!(
            report,
            AdmissionReport::Added(AdmissionOutcome::Admitted { replayed: false, .. })
        ));
    }
    assert_eq!(runtime.stats().unwrap().live_commitments, 5);
    assert_eq!(runtime.handler_stats().applied, 5);
}

#[tokio::test]
async fn test_storage_failure_reaches_submitter() {
    let runtime =
        NodeRuntime::with_store(NodeConfig::default(), Box::new(FailingStore::new("disk gone")))
            .unwrap();
    runtime.start().await.unwrap();
    let fixture = TokenFixture::new(SystemTimeSource.now());

    let result = runtime.submit(added(6, 0, fixture.script)).await;
    assert!(matches!(
        result,
        Err(AdmissionError::Sink(SinkError::Storage(ref message))) if message.contains("disk gone")
    ));

    let spend = runtime.submit(spent(6, 0)).await;
    assert!(matches!(spend, Err(AdmissionError::Sink(SinkError::Storage(_)))));
    assert_eq!(runtime.handler_stats().failed, 2);

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_concurrent_replay_reported_once_as_fresh() {
    let runtime = Arc::new(started().await);
    let script = TokenFixture::new(SystemTimeSource.now()).script;

    let submissions: Vec<_> = (0..8)
        .map(|_| {
            let runtime = Arc::clone(&runtime);
            let script = script.clone();
            tokio::spawn(async move { runtime.submit(added(7, 0, script)).await })
        })
        .collect();

    let mut fresh = 0;
    for submission in submissions {
        if let AdmissionReport::Added(AdmissionOutcome::Admitted { replayed, .. }) =
            submission.await.unwrap().unwrap()
        {
            if !replayed {
                fresh += 1;
            }
        }
    }
    assert_eq!(fresh, 1);
    assert_eq!(runtime.stats().unwrap().duplicates, 7);

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_start_twice_is_error() {
    let runtime = started().await;
    assert!(runtime.start().await.is_err());
    runtime.shutdown().await;
}
