//! Geolocation permission gate.
//!
//! A spawned monitor task queries the platform once, then forwards every
//! permission transition into a `watch` channel. The subscription is an
//! explicit pair: [`PermissionGate::spawn`] starts delivery,
//! [`PermissionGate::cancel`] stops it. Once `cancel` resolves, no
//! further state is published, so a torn-down session can never be
//! mutated by a late callback.

use std::future::Future;

use thiserror::Error;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use fieldsnap_shared::types::PermissionState;

/// Failure modes of the platform permission query.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The host platform has no permission introspection at all.
    #[error("Permission introspection unsupported on this platform")]
    Unsupported,

    #[error("Permission query failed: {0}")]
    Failed(String),
}

/// Platform geolocation-permission surface: a one-shot state query plus
/// a change-notification stream.
pub trait PermissionProbe: Send + 'static {
    fn query(&mut self) -> impl Future<Output = Result<PermissionState, ProbeError>> + Send;

    /// Next platform-reported permission transition; `None` once the
    /// platform stream ends.
    fn next_change(&mut self) -> impl Future<Output = Option<PermissionState>> + Send;
}

/// One-shot permission query.
///
/// An unsupported platform reports `Prompt` optimistically; the
/// positioning sensor's own success or failure is the real answer. Any
/// other fault reports `Denied`, since the caller cannot distinguish
/// "unsupported" from "denied" on most platforms.
pub async fn query_permission<P: PermissionProbe>(probe: &mut P) -> PermissionState {
    match probe.query().await {
        Ok(state) => state,
        Err(ProbeError::Unsupported) => PermissionState::Prompt,
        Err(e) => {
            warn!(error = %e, "Permission query failed, reporting Denied");
            PermissionState::Denied
        }
    }
}

/// Handle to the spawned permission monitor.
///
/// The state channel starts at `Unknown` and is updated by the monitor
/// task as queries complete and transitions arrive.
pub struct PermissionGate {
    rx: watch::Receiver<PermissionState>,
    cancel_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl PermissionGate {
    /// Spawn the monitor task for the given probe.
    pub fn spawn<P: PermissionProbe>(probe: P) -> Self {
        let (tx, rx) = watch::channel(PermissionState::Unknown);
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let task = tokio::spawn(monitor_loop(probe, tx, cancel_rx));

        Self {
            rx,
            cancel_tx,
            task,
        }
    }

    /// Latest state published by the monitor.
    pub fn current(&self) -> PermissionState {
        *self.rx.borrow()
    }

    /// Wait for the next published transition. Fails once the monitor
    /// task has exited.
    pub async fn changed(&mut self) -> Result<PermissionState, watch::error::RecvError> {
        self.rx.changed().await?;
        Ok(*self.rx.borrow())
    }

    /// Extra read handle onto the state channel, for presentation-layer
    /// consumers.
    pub fn subscribe(&self) -> watch::Receiver<PermissionState> {
        self.rx.clone()
    }

    /// Cancel the subscription. Once this returns the monitor task has
    /// exited and no further state will be published.
    pub async fn cancel(self) {
        let _ = self.cancel_tx.send(());
        let _ = self.task.await;
    }
}

async fn monitor_loop<P: PermissionProbe>(
    mut probe: P,
    tx: watch::Sender<PermissionState>,
    mut cancel_rx: oneshot::Receiver<()>,
) {
    let initial = tokio::select! {
        _ = &mut cancel_rx => return,
        state = query_permission(&mut probe) => state,
    };

    let _ = tx.send(initial);
    debug!(state = ?initial, "Permission monitor started");

    loop {
        tokio::select! {
            _ = &mut cancel_rx => break,
            change = probe.next_change() => match change {
                Some(state) => {
                    debug!(state = ?state, "Permission transition");
                    if tx.send(state).is_err() {
                        // every receiver is gone
                        break;
                    }
                }
                None => break,
            },
        }
    }

    debug!("Permission monitor stopped");
}
