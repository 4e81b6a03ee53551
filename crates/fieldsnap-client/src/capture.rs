//! The capture-session coordinator.
//!
//! One spawned task owns every state transition: commands arrive on an
//! mpsc channel, at most one capture flight is in the air, and flight
//! completions are processed by the same `select!` loop that watches the
//! permission gate, so transitions are strictly sequential. Tearing the
//! session down drops the pending flight, so a late sensor fix can no
//! longer touch session state.

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use fieldsnap_platform::{
    CoordinateProvider, ImagePicker, PermissionGate, PickRequest, PickedImage, PositionSource,
};
use fieldsnap_shared::error::{CaptureError, GeoError, PickError};
use fieldsnap_shared::types::{
    CaptureRecord, Coordinate, ImageHandle, PermissionState, RecordId, RecordLocation,
};

use crate::events::{emit, SessionEvent};
use crate::state::{CaptureState, SessionSnapshot, SessionState};

const COMMAND_CAPACITY: usize = 16;
const EVENT_CAPACITY: usize = 64;

/// Commands sent *into* the session task.
#[derive(Debug)]
pub enum SessionCommand {
    /// One full capture gesture: acquire a fix, open the picker, ingest.
    RequestCapture,
    /// Re-acquire the current location without opening the picker.
    RefreshLocation,
    /// Tear the session down (operator logout or navigation away).
    Shutdown,
}

/// The one in-flight asynchronous step of a capture gesture.
enum Flight {
    Locating {
        fut: BoxFuture<'static, Result<Coordinate, GeoError>>,
        then_pick: bool,
    },
    Selecting {
        coordinate: Coordinate,
        fut: BoxFuture<'static, Result<Vec<PickedImage>, PickError>>,
    },
}

enum FlightOutcome {
    Located(Result<Coordinate, GeoError>, bool),
    Selected(Coordinate, Result<Vec<PickedImage>, PickError>),
}

/// Resolves with the pending flight's outcome; pends forever while no
/// flight is in the air, leaving the select loop to the other arms.
async fn flight_outcome(inflight: &mut Option<Flight>) -> FlightOutcome {
    match inflight {
        Some(Flight::Locating { fut, then_pick }) => {
            FlightOutcome::Located(fut.as_mut().await, *then_pick)
        }
        Some(Flight::Selecting { coordinate, fut }) => {
            FlightOutcome::Selected(*coordinate, fut.as_mut().await)
        }
        None => std::future::pending().await,
    }
}

/// Handle to a running capture session.
///
/// Commands are fire-and-forget; outcomes surface through the event
/// stream and through [`snapshot`](Session::snapshot).
pub struct Session {
    cmd_tx: mpsc::Sender<SessionCommand>,
    state: Arc<Mutex<SessionState>>,
    task: JoinHandle<()>,
}

impl Session {
    /// Spawn the session task.
    ///
    /// Returns the handle plus the event stream for the presentation
    /// layer. The permission gate is owned by the task and its
    /// subscription is cancelled on teardown.
    pub fn spawn<S, K>(
        provider: CoordinateProvider<S>,
        picker: K,
        gate: PermissionGate,
    ) -> (Self, mpsc::Receiver<SessionEvent>)
    where
        S: PositionSource,
        K: ImagePicker,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel(EVENT_CAPACITY);
        let state = Arc::new(Mutex::new(SessionState::new()));

        let task = tokio::spawn(session_loop(
            Arc::new(provider),
            Arc::new(picker),
            gate,
            state.clone(),
            cmd_rx,
            event_tx,
        ));

        (
            Self {
                cmd_tx,
                state,
                task,
            },
            event_rx,
        )
    }

    /// Ask for one capture gesture. Rejected with the busy message when
    /// a gesture is already in flight.
    pub async fn request_capture(&self) {
        let _ = self.cmd_tx.send(SessionCommand::RequestCapture).await;
    }

    /// Re-acquire the current location without opening the picker.
    pub async fn refresh_location(&self) {
        let _ = self.cmd_tx.send(SessionCommand::RefreshLocation).await;
    }

    /// Tear the session down and wait for the task to finish. Any
    /// pending acquisition is discarded without mutating session state.
    pub async fn shutdown(self) {
        let _ = self.cmd_tx.send(SessionCommand::Shutdown).await;
        let _ = self.task.await;
    }

    /// Point-in-time view of the session state.
    pub fn snapshot(&self) -> SessionSnapshot {
        match self.state.lock() {
            Ok(guard) => guard.snapshot(),
            Err(poisoned) => poisoned.into_inner().snapshot(),
        }
    }

    /// All records so far, oldest first.
    pub fn records(&self) -> Vec<CaptureRecord> {
        match self.state.lock() {
            Ok(guard) => guard.records.all().to_vec(),
            Err(poisoned) => poisoned.into_inner().records.all().to_vec(),
        }
    }

    /// Bytes behind one record's image handle.
    pub fn image_bytes(&self, handle: ImageHandle) -> Option<Bytes> {
        match self.state.lock() {
            Ok(guard) => guard.images.get(handle),
            Err(poisoned) => poisoned.into_inner().images.get(handle),
        }
    }

    /// Shared state, for read-side consumers like the gallery.
    pub fn state(&self) -> Arc<Mutex<SessionState>> {
        self.state.clone()
    }
}

async fn session_loop<S, K>(
    provider: Arc<CoordinateProvider<S>>,
    picker: Arc<K>,
    mut gate: PermissionGate,
    state: Arc<Mutex<SessionState>>,
    mut cmd_rx: mpsc::Receiver<SessionCommand>,
    event_tx: mpsc::Sender<SessionEvent>,
) where
    S: PositionSource,
    K: ImagePicker,
{
    // Seed with whatever the gate has already seen.
    set_permission(&state, gate.current());

    let mut inflight: Option<Flight> = None;
    let mut gate_open = true;

    info!("Capture session started");

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                Some(SessionCommand::RequestCapture) => {
                    start_flight(&provider, &state, &event_tx, &mut inflight, true);
                }
                Some(SessionCommand::RefreshLocation) => {
                    start_flight(&provider, &state, &event_tx, &mut inflight, false);
                }
                Some(SessionCommand::Shutdown) | None => break,
            },

            changed = gate.changed(), if gate_open => match changed {
                Ok(permission) => {
                    set_permission(&state, permission);
                    emit(&event_tx, SessionEvent::PermissionChanged { state: permission });
                }
                Err(_) => {
                    // monitor gone; keep the last known state
                    gate_open = false;
                }
            },

            outcome = flight_outcome(&mut inflight) => {
                inflight = None;
                match outcome {
                    FlightOutcome::Located(Ok(coordinate), then_pick) => {
                        with_state(&state, |s| {
                            s.current_location = RecordLocation::Fixed(coordinate);
                            s.status_message = None;
                        });
                        emit(&event_tx, SessionEvent::LocationUpdated { coordinate });

                        if then_pick {
                            set_capture_state(&state, CaptureState::AwaitingSelection);
                            let picker = picker.clone();
                            let fut = async move {
                                picker.pick(PickRequest::capture_defaults()).await
                            }
                            .boxed();
                            inflight = Some(Flight::Selecting { coordinate, fut });
                        } else {
                            set_capture_state(&state, CaptureState::Idle);
                        }
                    }

                    FlightOutcome::Located(Err(e), _) => {
                        fail(&state, &event_tx, CaptureError::from(e));
                    }

                    FlightOutcome::Selected(coordinate, Ok(items)) => {
                        if items.is_empty() {
                            debug!("Selection cancelled");
                            set_capture_state(&state, CaptureState::Idle);
                            emit(&event_tx, SessionEvent::SelectionCancelled);
                        } else {
                            ingest(&state, &event_tx, coordinate, items);
                        }
                    }

                    FlightOutcome::Selected(_, Err(e)) => {
                        fail(&state, &event_tx, CaptureError::from(e));
                    }
                }
            }
        }
    }

    // Teardown: discard any pending flight, stop permission delivery,
    // release the transient image handles.
    drop(inflight);
    gate.cancel().await;
    with_state(&state, |s| s.images.release_all());
    emit(&event_tx, SessionEvent::SessionClosed);
    info!("Capture session closed");
}

/// Begin a capture gesture (`then_pick`) or a bare location refresh.
fn start_flight<S: PositionSource>(
    provider: &Arc<CoordinateProvider<S>>,
    state: &Arc<Mutex<SessionState>>,
    event_tx: &mpsc::Sender<SessionEvent>,
    inflight: &mut Option<Flight>,
    then_pick: bool,
) {
    if inflight.is_some() {
        // Reject rather than queue: a queued selection could bind
        // another gesture's coordinate.
        warn!("Capture requested while a gesture is in flight");
        let message = CaptureError::Busy.user_message().to_string();
        with_state(state, |s| s.status_message = Some(message.clone()));
        emit(event_tx, SessionEvent::CaptureFailed { message });
        return;
    }

    let permission =
        with_state(state, |s| s.permission).unwrap_or(PermissionState::Unknown);
    if permission == PermissionState::Denied {
        fail(
            state,
            event_tx,
            CaptureError::Location(GeoError::PermissionDenied),
        );
        return;
    }

    set_capture_state(state, CaptureState::AwaitingLocation);
    let provider = provider.clone();
    let fut = async move { provider.acquire().await }.boxed();
    *inflight = Some(Flight::Locating { fut, then_pick });
    debug!(then_pick, "Location acquisition started");
}

/// Create one record per selected item, all bound to the coordinate of
/// this gesture (never a fresh reading).
fn ingest(
    state: &Arc<Mutex<SessionState>>,
    event_tx: &mpsc::Sender<SessionEvent>,
    coordinate: Coordinate,
    items: Vec<PickedImage>,
) {
    let count = items.len();
    let mut guard = match state.lock() {
        Ok(guard) => guard,
        Err(_) => return,
    };

    guard.capture_state = CaptureState::Ingesting;
    for item in items {
        let image = guard.images.insert(item.data);
        guard.records.append(CaptureRecord {
            id: RecordId::new(),
            image,
            captured_at: item.last_modified,
            location: RecordLocation::Fixed(coordinate),
        });
    }
    guard.capture_state = CaptureState::Idle;
    guard.status_message = None;
    drop(guard);

    info!(count, "Capture gesture ingested");
    emit(event_tx, SessionEvent::RecordsAppended { count });
}

/// Convert a failure into the single user-visible message and a stable
/// state; the controller stays usable for the next attempt.
fn fail(
    state: &Arc<Mutex<SessionState>>,
    event_tx: &mpsc::Sender<SessionEvent>,
    error: CaptureError,
) {
    let message = error.user_message().to_string();
    warn!(error = %error, "Capture failed");
    with_state(state, |s| {
        s.capture_state = CaptureState::Errored;
        s.status_message = Some(message.clone());
    });
    emit(event_tx, SessionEvent::CaptureFailed { message });
}

fn set_permission(state: &Arc<Mutex<SessionState>>, permission: PermissionState) {
    debug!(state = ?permission, "Permission state updated");
    with_state(state, |s| s.permission = permission);
}

fn set_capture_state(state: &Arc<Mutex<SessionState>>, capture_state: CaptureState) {
    with_state(state, |s| s.capture_state = capture_state);
}

fn with_state<R>(
    state: &Arc<Mutex<SessionState>>,
    f: impl FnOnce(&mut SessionState) -> R,
) -> Option<R> {
    match state.lock() {
        Ok(mut guard) => Some(f(&mut guard)),
        Err(_) => None,
    }
}
