//! Integration tests for `ArrayController` against a mock appliance.
//!
//! Cover the dispatch state machine (gate, re-validation, forced
//! re-poll), poll failure handling, and cache warm starts.
#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use spindle_core::{
    ArrayController, ArrayStatus, AutoConfirm, Command, CommandOutcome, ConfirmPrompt,
    ControllerConfig, CoreError, MemberState, Notifier, SnapshotCache, TlsVerification,
    eligibility,
};

// ── Test collaborators ──────────────────────────────────────────────

#[derive(Default)]
struct RecordingNotifier {
    successes: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    fn successes(&self) -> Vec<String> {
        self.successes.lock().unwrap().clone()
    }

    fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify_success(&self, text: &str) {
        self.successes.lock().unwrap().push(text.to_owned());
    }

    fn notify_error(&self, text: &str) {
        self.errors.lock().unwrap().push(text.to_owned());
    }
}

struct DenyConfirm;

impl ConfirmPrompt for DenyConfirm {
    fn confirm(&self, _message: &str) -> bool {
        false
    }
}

// ── Fixtures ────────────────────────────────────────────────────────

fn degraded_status_body() -> serde_json::Value {
    json!({
        "arrays": [{
            "name": "tank",
            "level": "raid1",
            "status": "degraded",
            "sizeBytes": 4_000_787_030_016_u64,
            "devices": [
                { "name": "sdb", "state": "failed" },
                { "name": "sdc", "state": "active" }
            ]
        }],
        "speedLimits": { "minimum": 1000, "maximum": 200_000 }
    })
}

fn disks_body() -> serde_json::Value {
    json!({
        "disks": [
            {
                "name": "sdd",
                "sizeBytes": 512_110_190_592_u64,
                "model": "Samsung SSD 870",
                "isSsd": true
            },
            { "name": "sda", "sizeBytes": 256_060_514_304_u64, "isOsDisk": true }
        ]
    })
}

fn test_config(server: &MockServer) -> ControllerConfig {
    let mut config = ControllerConfig::new(Url::parse(&server.uri()).unwrap());
    config.tls = TlsVerification::SystemDefaults;
    config.status_poll_interval = Duration::from_millis(100);
    config.disk_poll_interval = Duration::from_millis(100);
    config
}

async fn mount_snapshots(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/storage/raid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(degraded_status_body()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/storage/disks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(disks_body()))
        .mount(server)
        .await;
}

async fn oneshot_controller(
    server: &MockServer,
) -> (ArrayController, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let controller = ArrayController::oneshot(
        test_config(server),
        Arc::clone(&notifier) as Arc<dyn Notifier>,
        Arc::new(AutoConfirm),
    )
    .await
    .unwrap();
    (controller, notifier)
}

async fn count_requests(server: &MockServer, http_method: &str, url_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.method.as_str() == http_method && r.url.path() == url_path)
        .count()
}

// ── Snapshot projection & eligibility scenario ──────────────────────

#[tokio::test]
async fn oneshot_projects_snapshot_and_affordances() {
    let server = MockServer::start().await;
    mount_snapshots(&server).await;

    let (controller, _) = oneshot_controller(&server).await;

    let snapshot = controller.status_snapshot().expect("status loaded");
    let tank = snapshot.array("tank").expect("array present");
    assert_eq!(tank.status, ArrayStatus::Degraded);

    let sdb = tank.device("sdb").unwrap();
    let sdc = tank.device("sdc").unwrap();
    assert_eq!(sdb.state, MemberState::Failed);
    assert_eq!(sdc.state, MemberState::Active);

    // Rebuild offered for the failed member only, mark-failed for the
    // active one only, finalize visible while degraded.
    assert!(eligibility::can_start_rebuild(sdb));
    assert!(!eligibility::can_start_rebuild(sdc));
    assert!(eligibility::can_mark_failed(sdc));
    assert!(!eligibility::can_mark_failed(sdb));
    assert!(eligibility::should_offer_finalize(tank));

    let disks = controller.disk_snapshot().expect("disks loaded");
    assert!(eligibility::can_format(disks.disk("sdd").unwrap()));
    assert!(!eligibility::can_format(disks.disk("sda").unwrap()));
}

// ── Dispatch: success path ──────────────────────────────────────────

#[tokio::test]
async fn successful_command_notifies_then_forces_repoll() {
    let server = MockServer::start().await;
    mount_snapshots(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/storage/raid/tank/rebuild"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "Rebuild started" })),
        )
        .mount(&server)
        .await;

    let (controller, notifier) = oneshot_controller(&server).await;

    let outcome = controller
        .execute(Command::StartRebuild {
            array: "tank".into(),
            device: "sdb".into(),
        })
        .await
        .unwrap();

    assert_eq!(
        outcome,
        CommandOutcome::Applied {
            message: "Rebuild started".into()
        }
    );
    assert_eq!(notifier.successes(), vec!["Rebuild started".to_owned()]);
    assert!(notifier.errors().is_empty());

    // Oneshot fetch + forced re-poll.
    assert_eq!(count_requests(&server, "GET", "/api/storage/raid").await, 2);
    assert!(!controller.is_busy());

    // The forced re-poll is issued strictly after the command response.
    let requests = server.received_requests().await.unwrap();
    let rebuild_pos = requests
        .iter()
        .position(|r| r.url.path() == "/api/storage/raid/tank/rebuild")
        .unwrap();
    let last_status_pos = requests
        .iter()
        .rposition(|r| r.method.as_str() == "GET" && r.url.path() == "/api/storage/raid")
        .unwrap();
    assert!(rebuild_pos < last_status_pos);

    // A periodic tick racing the forced re-poll just overwrites the
    // snapshot with identical data -- no duplicates, no conflict.
    controller.refresh_status().await.unwrap();
    let snapshot = controller.status_snapshot().unwrap();
    assert_eq!(snapshot.arrays.len(), 1);
    assert_eq!(snapshot.arrays[0].name, "tank");
}

#[tokio::test]
async fn disk_affecting_command_also_refreshes_inventory() {
    let server = MockServer::start().await;
    mount_snapshots(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/storage/disks/sdd/format"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "Format started" })),
        )
        .mount(&server)
        .await;

    let (controller, _) = oneshot_controller(&server).await;

    controller
        .execute(Command::FormatDisk {
            disk: "sdd".into(),
            filesystem: "ext4".into(),
            label: None,
        })
        .await
        .unwrap();

    assert_eq!(count_requests(&server, "GET", "/api/storage/disks").await, 2);
}

// ── Dispatch: failure path ──────────────────────────────────────────

#[tokio::test]
async fn failed_command_releases_gate_and_skips_repoll() {
    let server = MockServer::start().await;
    mount_snapshots(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/storage/raid/tank/rebuild"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": "rebuild rejected",
            "detail": "device sdb is still spun down"
        })))
        .mount(&server)
        .await;

    let (controller, notifier) = oneshot_controller(&server).await;

    let result = controller
        .execute(Command::StartRebuild {
            array: "tank".into(),
            device: "sdb".into(),
        })
        .await;

    assert!(matches!(result, Err(CoreError::Service { .. })));
    // Server detail preferred over the generic message.
    assert_eq!(
        notifier.errors(),
        vec!["device sdb is still spun down".to_owned()]
    );
    assert!(notifier.successes().is_empty());

    // No re-poll on failure: only the oneshot fetch happened.
    assert_eq!(count_requests(&server, "GET", "/api/storage/raid").await, 1);

    // Gate free immediately after the failure is observed.
    assert!(!controller.is_busy());
}

// ── Single-flight ───────────────────────────────────────────────────

#[tokio::test]
async fn second_command_rejected_while_first_in_flight() {
    let server = MockServer::start().await;
    mount_snapshots(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/storage/raid/tank/rebuild"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "message": "Rebuild started" }))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let (controller, _) = oneshot_controller(&server).await;
    let second = controller.clone();

    let rebuild = Command::StartRebuild {
        array: "tank".into(),
        device: "sdb".into(),
    };
    let finalize = Command::FinalizeRebuild {
        array: "tank".into(),
    };

    let (first_result, second_result) =
        tokio::join!(controller.execute(rebuild), second.execute(finalize));

    assert!(matches!(first_result, Ok(CommandOutcome::Applied { .. })));
    assert!(matches!(second_result, Err(CoreError::Busy)));

    // The rejected command never contacted the service.
    assert_eq!(
        count_requests(&server, "POST", "/api/storage/raid/tank/finalize").await,
        0
    );
    assert_eq!(
        count_requests(&server, "POST", "/api/storage/raid/tank/rebuild").await,
        1
    );
}

// ── Local validation & confirmation ─────────────────────────────────

#[tokio::test]
async fn blank_spare_rejected_before_any_remote_call() {
    let server = MockServer::start().await;
    mount_snapshots(&server).await;

    let (controller, notifier) = oneshot_controller(&server).await;

    let result = controller
        .execute(Command::AddSpare {
            array: "tank".into(),
            device: "  ".into(),
        })
        .await;

    assert!(matches!(result, Err(CoreError::ValidationFailed { .. })));
    // No notification beyond the validation error itself, no request,
    // gate never acquired.
    assert!(notifier.successes().is_empty());
    assert!(notifier.errors().is_empty());
    assert_eq!(
        count_requests(&server, "PUT", "/api/storage/raid/tank/options").await,
        0
    );
    assert!(!controller.is_busy());
}

#[tokio::test]
async fn empty_speed_limit_form_rejected_locally() {
    let server = MockServer::start().await;
    mount_snapshots(&server).await;

    let (controller, notifier) = oneshot_controller(&server).await;

    let result = controller
        .execute(Command::SetSpeedLimits {
            minimum: None,
            maximum: None,
        })
        .await;

    assert!(matches!(result, Err(CoreError::ValidationFailed { .. })));
    assert!(notifier.errors().is_empty());
    assert_eq!(
        count_requests(&server, "PUT", "/api/storage/raid/tank/options").await,
        0
    );
}

#[tokio::test]
async fn declined_confirmation_sends_nothing() {
    let server = MockServer::start().await;
    mount_snapshots(&server).await;

    let notifier = Arc::new(RecordingNotifier::default());
    let controller = ArrayController::oneshot(
        test_config(&server),
        Arc::clone(&notifier) as Arc<dyn Notifier>,
        Arc::new(DenyConfirm),
    )
    .await
    .unwrap();

    let outcome = controller
        .execute(Command::DeleteArray {
            array: "tank".into(),
            force: false,
        })
        .await
        .unwrap();

    assert_eq!(outcome, CommandOutcome::Declined);
    assert_eq!(count_requests(&server, "DELETE", "/api/storage/raid/tank").await, 0);
    assert!(!controller.is_busy());
}

// ── Defensive re-validation ─────────────────────────────────────────

#[tokio::test]
async fn stale_view_dispatch_rejected_by_revalidation() {
    let server = MockServer::start().await;
    mount_snapshots(&server).await;

    let (controller, _) = oneshot_controller(&server).await;

    // sdc is active -- a stale view offering rebuild for it must be
    // caught before any remote call.
    let result = controller
        .execute(Command::StartRebuild {
            array: "tank".into(),
            device: "sdc".into(),
        })
        .await;

    assert!(matches!(result, Err(CoreError::NotAllowed { .. })));
    assert_eq!(
        count_requests(&server, "POST", "/api/storage/raid/tank/rebuild").await,
        0
    );
    assert!(!controller.is_busy());
}

#[tokio::test]
async fn unknown_member_state_blocks_every_action() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/storage/raid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "arrays": [{
                "name": "tank",
                "level": "raid1",
                "status": "optimal",
                "sizeBytes": 1024,
                "devices": [{ "name": "sdb", "state": "limbo" }]
            }],
            "speedLimits": {}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/storage/disks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(disks_body()))
        .mount(&server)
        .await;

    let (controller, _) = oneshot_controller(&server).await;

    for cmd in [
        Command::StartRebuild {
            array: "tank".into(),
            device: "sdb".into(),
        },
        Command::MarkDeviceFailed {
            array: "tank".into(),
            device: Some("sdb".into()),
        },
        Command::SetWriteMostly {
            array: "tank".into(),
            device: "sdb".into(),
            enabled: true,
        },
        Command::RemoveDevice {
            array: "tank".into(),
            device: "sdb".into(),
        },
    ] {
        let result = controller.execute(cmd).await;
        assert!(matches!(result, Err(CoreError::NotAllowed { .. })));
    }
}

// ── Poll failure handling ───────────────────────────────────────────

#[tokio::test]
async fn failed_refresh_retains_previous_snapshot() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/storage/raid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(degraded_status_body()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/storage/raid"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/storage/disks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(disks_body()))
        .mount(&server)
        .await;

    let (controller, _) = oneshot_controller(&server).await;
    assert!(controller.status_snapshot().is_some());

    let result = controller.refresh_status().await;
    assert!(result.is_err());

    // Stale-but-present beats a blank view.
    let snapshot = controller.status_snapshot().expect("snapshot retained");
    assert_eq!(snapshot.arrays.len(), 1);
}

// ── Poller lifecycle ────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn deactivate_stops_polling_deterministically() {
    let server = MockServer::start().await;
    mount_snapshots(&server).await;

    let notifier = Arc::new(RecordingNotifier::default());
    let controller = ArrayController::new(
        test_config(&server),
        Arc::clone(&notifier) as Arc<dyn Notifier>,
        Arc::new(AutoConfirm),
    )
    .unwrap();

    controller.activate().await;
    tokio::time::sleep(Duration::from_millis(350)).await;
    controller.deactivate().await;

    let after_deactivate = count_requests(&server, "GET", "/api/storage/raid").await;
    // Immediate fetch plus at least one periodic tick fired.
    assert!(after_deactivate >= 2, "got {after_deactivate} fetches");

    tokio::time::sleep(Duration::from_millis(300)).await;
    let later = count_requests(&server, "GET", "/api/storage/raid").await;
    assert_eq!(after_deactivate, later, "poller fired after deactivate");
}

#[tokio::test]
async fn warm_cache_seeds_view_when_service_is_down() {
    let live = MockServer::start().await;
    mount_snapshots(&live).await;

    let cache = SnapshotCache::in_memory();
    let notifier: Arc<dyn Notifier> = Arc::new(RecordingNotifier::default());

    // First controller fills the shared cache.
    let first = ArrayController::with_cache(
        test_config(&live),
        Arc::clone(&notifier),
        Arc::new(AutoConfirm),
        cache.clone(),
    )
    .unwrap();
    first.refresh_status().await.unwrap();

    // Second controller points at a dead endpoint but shares the cache:
    // activation still renders the cached snapshot.
    let dead = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&dead)
        .await;

    let second = ArrayController::with_cache(
        test_config(&dead),
        Arc::clone(&notifier),
        Arc::new(AutoConfirm),
        cache,
    )
    .unwrap();
    second.activate().await;

    let snapshot = second.status_snapshot().expect("seeded from cache");
    assert_eq!(snapshot.arrays[0].name, "tank");

    second.deactivate().await;
}
