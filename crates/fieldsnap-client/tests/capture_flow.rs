//! End-to-end capture-session flows against scripted platform surfaces.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::{mpsc, oneshot, Mutex};

use fieldsnap_client::capture::Session;
use fieldsnap_client::events::SessionEvent;
use fieldsnap_client::state::{CaptureState, SessionSnapshot};
use fieldsnap_platform::{
    CoordinateProvider, ImagePicker, PermissionGate, PermissionProbe, PickError, PickRequest,
    PickedImage, PositionRequest, PositionSource, ProbeError, RawFix,
};
use fieldsnap_shared::constants::{MSG_CAPTURE_BUSY, MSG_LOCATION_FAILED, MSG_PERMISSION_DENIED};
use fieldsnap_shared::error::GeoError;
use fieldsnap_shared::types::{PermissionState, RecordLocation};

// ---------------------------------------------------------------------------
// Scripted platform surfaces
// ---------------------------------------------------------------------------

/// Sensor that always answers with the same fix.
struct FixedSource {
    latitude: f64,
    longitude: f64,
}

impl PositionSource for FixedSource {
    async fn current_position(&self, _request: PositionRequest) -> Result<RawFix, GeoError> {
        Ok(RawFix {
            latitude: self.latitude,
            longitude: self.longitude,
        })
    }
}

/// Sensor that never produces a fix.
struct SilentSource;

impl PositionSource for SilentSource {
    async fn current_position(&self, _request: PositionRequest) -> Result<RawFix, GeoError> {
        std::future::pending().await
    }
}

/// Sensor whose reading advances on every call.
struct DriftingSource {
    calls: AtomicU32,
}

impl PositionSource for DriftingSource {
    async fn current_position(&self, _request: PositionRequest) -> Result<RawFix, GeoError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(RawFix {
            latitude: f64::from(call),
            longitude: -99.13,
        })
    }
}

/// Sensor resolved by the test, for teardown-while-pending flows.
struct ManualSource {
    fix_rx: Mutex<Option<oneshot::Receiver<RawFix>>>,
}

impl PositionSource for ManualSource {
    async fn current_position(&self, _request: PositionRequest) -> Result<RawFix, GeoError> {
        let rx = self.fix_rx.lock().await.take();
        match rx {
            Some(rx) => rx
                .await
                .map_err(|_| GeoError::Unavailable("sensor stream closed".into())),
            None => std::future::pending().await,
        }
    }
}

/// Picker that immediately returns a fixed selection.
struct StaticPicker {
    items: Vec<PickedImage>,
}

impl ImagePicker for StaticPicker {
    async fn pick(&self, _request: PickRequest) -> Result<Vec<PickedImage>, PickError> {
        Ok(self.items.clone())
    }
}

/// Picker where the operator cancels: zero items.
struct CancelPicker;

impl ImagePicker for CancelPicker {
    async fn pick(&self, _request: PickRequest) -> Result<Vec<PickedImage>, PickError> {
        Ok(Vec::new())
    }
}

/// Picker held open until the test releases it.
struct GatedPicker {
    release_rx: Mutex<Option<oneshot::Receiver<Vec<PickedImage>>>>,
}

impl ImagePicker for GatedPicker {
    async fn pick(&self, _request: PickRequest) -> Result<Vec<PickedImage>, PickError> {
        let rx = self.release_rx.lock().await.take();
        match rx {
            Some(rx) => rx
                .await
                .map_err(|_| PickError::Unavailable("surface closed".into())),
            None => std::future::pending().await,
        }
    }
}

/// Probe that reports one fixed permission state and never changes.
struct StaticProbe(PermissionState);

impl PermissionProbe for StaticProbe {
    async fn query(&mut self) -> Result<PermissionState, ProbeError> {
        Ok(self.0)
    }

    async fn next_change(&mut self) -> Option<PermissionState> {
        std::future::pending().await
    }
}

/// Probe whose transitions are driven by the test.
struct ChannelProbe {
    initial: PermissionState,
    changes: mpsc::Receiver<PermissionState>,
}

impl PermissionProbe for ChannelProbe {
    async fn query(&mut self) -> Result<PermissionState, ProbeError> {
        Ok(self.initial)
    }

    async fn next_change(&mut self) -> Option<PermissionState> {
        self.changes.recv().await
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn session_with(
    source: impl PositionSource,
    picker: impl ImagePicker,
    permission: PermissionState,
    timeout: Duration,
) -> (Session, mpsc::Receiver<SessionEvent>) {
    let provider = CoordinateProvider::new(source, timeout, true);
    let gate = PermissionGate::spawn(StaticProbe(permission));
    Session::spawn(provider, picker, gate)
}

async fn wait_until(
    session: &Session,
    what: &str,
    predicate: impl Fn(&SessionSnapshot) -> bool,
) {
    for _ in 0..400 {
        if predicate(&session.snapshot()) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!(
        "timed out waiting for {what}; last snapshot: {:?}",
        session.snapshot()
    );
}

fn picked(data: &'static [u8], last_modified: DateTime<Utc>) -> PickedImage {
    PickedImage {
        data: Bytes::from_static(data),
        last_modified,
    }
}

fn latitude_of(location: &RecordLocation) -> Option<f64> {
    location.coordinate().map(|c| c.latitude)
}

// ---------------------------------------------------------------------------
// Flows
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_capture_binds_the_fix_to_every_selected_image() {
    let t1 = Utc.with_ymd_and_hms(2024, 11, 5, 10, 0, 0).unwrap();
    let t2 = Utc.with_ymd_and_hms(2024, 11, 5, 11, 0, 0).unwrap();

    let (session, mut events) = session_with(
        FixedSource {
            latitude: 19.43,
            longitude: -99.13,
        },
        StaticPicker {
            items: vec![picked(b"first-jpeg", t1), picked(b"second-jpeg", t2)],
        },
        PermissionState::Granted,
        Duration::from_millis(200),
    );

    session.request_capture().await;
    wait_until(&session, "two records", |s| s.record_count == 2).await;
    tokio::time::sleep(Duration::from_millis(10)).await;

    let records = session.records();
    assert_eq!(records.len(), 2);
    assert_ne!(records[0].id, records[1].id);
    assert_eq!(records[0].captured_at, t1);
    assert_eq!(records[1].captured_at, t2);
    for record in &records {
        let coordinate = record.location.coordinate().expect("location bound");
        assert_eq!(coordinate.latitude, 19.43);
        assert_eq!(coordinate.longitude, -99.13);
    }
    assert_eq!(
        session.image_bytes(records[0].image).unwrap(),
        Bytes::from_static(b"first-jpeg")
    );

    let snapshot = session.snapshot();
    assert_eq!(snapshot.capture_state, CaptureState::Idle);
    assert_eq!(snapshot.status_message, None);
    assert!(snapshot.current_location.is_resolved());

    // Location resolves before ingestion reports.
    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    let location_at = seen
        .iter()
        .position(|e| matches!(e, SessionEvent::LocationUpdated { .. }))
        .expect("location event");
    let records_at = seen
        .iter()
        .position(|e| matches!(e, SessionEvent::RecordsAppended { count: 2 }))
        .expect("records event");
    assert!(location_at < records_at);
}

#[tokio::test]
async fn test_denied_permission_blocks_the_gesture() {
    let (session, _events) = session_with(
        FixedSource {
            latitude: 19.43,
            longitude: -99.13,
        },
        CancelPicker,
        PermissionState::Denied,
        Duration::from_millis(200),
    );

    wait_until(&session, "denied permission", |s| {
        s.permission == PermissionState::Denied
    })
    .await;

    session.request_capture().await;
    wait_until(&session, "errored state", |s| {
        s.capture_state == CaptureState::Errored
    })
    .await;

    let snapshot = session.snapshot();
    assert_eq!(snapshot.record_count, 0);
    assert_eq!(
        snapshot.status_message.as_deref(),
        Some(MSG_PERMISSION_DENIED)
    );
    assert!(!snapshot.current_location.is_resolved());
}

#[tokio::test]
async fn test_silent_sensor_times_out_into_errored() {
    let (session, _events) = session_with(
        SilentSource,
        CancelPicker,
        PermissionState::Granted,
        Duration::from_millis(50),
    );

    session.request_capture().await;
    wait_until(&session, "errored state", |s| {
        s.capture_state == CaptureState::Errored
    })
    .await;

    let snapshot = session.snapshot();
    assert_eq!(snapshot.record_count, 0);
    assert_eq!(snapshot.status_message.as_deref(), Some(MSG_LOCATION_FAILED));
    assert!(!snapshot.current_location.is_resolved());
}

#[tokio::test]
async fn test_cancelled_selection_creates_no_records() {
    let (session, mut events) = session_with(
        FixedSource {
            latitude: 19.43,
            longitude: -99.13,
        },
        CancelPicker,
        PermissionState::Granted,
        Duration::from_millis(200),
    );

    session.request_capture().await;
    wait_until(&session, "idle after cancel", |s| {
        s.capture_state == CaptureState::Idle && s.current_location.is_resolved()
    })
    .await;
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(session.snapshot().record_count, 0);

    let mut cancelled = false;
    while let Ok(event) = events.try_recv() {
        if matches!(event, SessionEvent::SelectionCancelled) {
            cancelled = true;
        }
    }
    assert!(cancelled);
}

#[tokio::test]
async fn test_second_gesture_while_busy_is_rejected() {
    let (release_tx, release_rx) = oneshot::channel();
    let (session, _events) = session_with(
        FixedSource {
            latitude: 19.43,
            longitude: -99.13,
        },
        GatedPicker {
            release_rx: Mutex::new(Some(release_rx)),
        },
        PermissionState::Granted,
        Duration::from_millis(200),
    );

    session.request_capture().await;
    wait_until(&session, "awaiting selection", |s| {
        s.capture_state == CaptureState::AwaitingSelection
    })
    .await;

    // Second gesture while the picker is open: rejected, flight untouched.
    session.request_capture().await;
    wait_until(&session, "busy rejection", |s| {
        s.status_message.as_deref() == Some(MSG_CAPTURE_BUSY)
    })
    .await;
    assert_eq!(
        session.snapshot().capture_state,
        CaptureState::AwaitingSelection
    );

    let t1 = Utc.with_ymd_and_hms(2024, 11, 5, 10, 0, 0).unwrap();
    release_tx
        .send(vec![picked(b"only-jpeg", t1)])
        .expect("picker still open");

    wait_until(&session, "one record", |s| s.record_count == 1).await;
    assert_eq!(session.snapshot().status_message, None);
}

#[tokio::test]
async fn test_refreshing_twice_keeps_the_latest_fix_and_no_records() {
    let (session, _events) = session_with(
        DriftingSource {
            calls: AtomicU32::new(0),
        },
        CancelPicker,
        PermissionState::Granted,
        Duration::from_millis(200),
    );

    session.refresh_location().await;
    wait_until(&session, "first fix", |s| {
        latitude_of(&s.current_location) == Some(0.0)
    })
    .await;

    session.refresh_location().await;
    wait_until(&session, "second fix", |s| {
        latitude_of(&s.current_location) == Some(1.0)
    })
    .await;

    let snapshot = session.snapshot();
    assert_eq!(snapshot.record_count, 0);
    assert_eq!(snapshot.capture_state, CaptureState::Idle);
}

#[tokio::test]
async fn test_teardown_discards_the_pending_acquisition() {
    let (fix_tx, fix_rx) = oneshot::channel();
    let (session, _events) = session_with(
        ManualSource {
            fix_rx: Mutex::new(Some(fix_rx)),
        },
        CancelPicker,
        PermissionState::Granted,
        Duration::from_secs(5),
    );

    session.request_capture().await;
    wait_until(&session, "awaiting location", |s| {
        s.capture_state == CaptureState::AwaitingLocation
    })
    .await;

    let state = session.state();
    session.shutdown().await;

    // The pending acquisition was dropped with the flight: the sensor's
    // late fix has nowhere to land.
    assert!(fix_tx
        .send(RawFix {
            latitude: 19.43,
            longitude: -99.13,
        })
        .is_err());

    let guard = state.lock().unwrap();
    assert!(guard.records.is_empty());
    assert!(!guard.current_location.is_resolved());
    assert!(guard.images.is_empty());
}

#[tokio::test]
async fn test_prompt_to_granted_gesture_reaches_selection() {
    let (change_tx, change_rx) = mpsc::channel(4);
    let (fix_tx, fix_rx) = oneshot::channel();

    let provider = CoordinateProvider::new(
        ManualSource {
            fix_rx: Mutex::new(Some(fix_rx)),
        },
        Duration::from_secs(5),
        true,
    );
    let gate = PermissionGate::spawn(ChannelProbe {
        initial: PermissionState::Prompt,
        changes: change_rx,
    });
    let (release_tx, release_rx) = oneshot::channel();
    let (session, _events) = Session::spawn(
        provider,
        GatedPicker {
            release_rx: Mutex::new(Some(release_rx)),
        },
        gate,
    );

    wait_until(&session, "prompt permission", |s| {
        s.permission == PermissionState::Prompt
    })
    .await;

    session.request_capture().await;
    wait_until(&session, "awaiting location", |s| {
        s.capture_state == CaptureState::AwaitingLocation
    })
    .await;

    change_tx.send(PermissionState::Granted).await.unwrap();
    wait_until(&session, "granted permission", |s| {
        s.permission == PermissionState::Granted
    })
    .await;

    fix_tx
        .send(RawFix {
            latitude: 19.43,
            longitude: -99.13,
        })
        .expect("acquisition pending");

    wait_until(&session, "awaiting selection", |s| {
        s.capture_state == CaptureState::AwaitingSelection
    })
    .await;

    let snapshot = session.snapshot();
    assert_eq!(latitude_of(&snapshot.current_location), Some(19.43));
    assert_eq!(snapshot.record_count, 0);

    drop(release_tx);
    session.shutdown().await;
}
