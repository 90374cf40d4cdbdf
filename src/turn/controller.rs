//! Turn controller: drives one request/response turn.
//!
//! The controller owns the live [`TurnState`] while a turn runs. It pulls
//! chunks from the transport, frames and decodes them, applies each event and
//! publishes an immutable snapshot after every change. The only suspension
//! points are opening the stream and waiting for the next chunk; both are
//! raced against the cancellation signal.

use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::aggregator::Applied;
use super::state::{TurnState, TurnStatus, STREAM_ENDED_MARKER};
use crate::error::{TurnError, TurnResult};
use crate::models::QueryRequest;
use crate::sse::{decode, DecodeError, Frame, FrameSplitter};
use crate::traits::{ByteStream, Transport};

/// Immutable view of a turn, shared with subscribers.
pub type TurnSnapshot = Arc<TurnState>;

/// Phase of the controller's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPhase {
    /// No turn has run yet
    Idle,
    /// Request issued, waiting for the response body
    Sending,
    /// Reading the body
    Streaming,
    Completed,
    Errored,
    Cancelled,
}

impl ControllerPhase {
    /// A turn is in flight; a new one may not start.
    pub fn is_active(&self) -> bool {
        matches!(self, ControllerPhase::Sending | ControllerPhase::Streaming)
    }
}

impl From<TurnStatus> for ControllerPhase {
    fn from(status: TurnStatus) -> Self {
        match status {
            TurnStatus::Streaming => ControllerPhase::Streaming,
            TurnStatus::Completed => ControllerPhase::Completed,
            TurnStatus::Errored => ControllerPhase::Errored,
            TurnStatus::Cancelled => ControllerPhase::Cancelled,
        }
    }
}

#[derive(Debug)]
struct Shared {
    phase: ControllerPhase,
    cancel_tx: Option<Arc<watch::Sender<bool>>>,
    subscribers: Vec<mpsc::UnboundedSender<TurnSnapshot>>,
    latest: Option<TurnSnapshot>,
}

/// Resets the phase if the driving future is dropped before finishing.
struct ActiveTurn {
    shared: Arc<Mutex<Shared>>,
    finished: bool,
}

impl Drop for ActiveTurn {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let mut shared = lock(&self.shared);
        if shared.phase.is_active() {
            tracing::warn!("Turn dropped while {:?}; marking cancelled", shared.phase);
            shared.phase = ControllerPhase::Cancelled;
        }
        shared.cancel_tx = None;
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Resolves once cancellation has been requested.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            // Sender gone without a request: never resolve.
            std::future::pending::<()>().await;
        }
    }
}

/// Drives turns for one conversation, one at a time.
///
/// Cloning is cheap and every clone controls the same turn, so a clone can
/// be handed to a signal handler to call [`TurnController::cancel`].
#[derive(Clone)]
pub struct TurnController {
    transport: Arc<dyn Transport>,
    top_k: Option<u32>,
    shared: Arc<Mutex<Shared>>,
}

impl std::fmt::Debug for TurnController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnController")
            .field("top_k", &self.top_k)
            .field("phase", &self.phase())
            .finish()
    }
}

impl TurnController {
    /// Create a controller over a shared transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            top_k: None,
            shared: Arc::new(Mutex::new(Shared {
                phase: ControllerPhase::Idle,
                cancel_tx: None,
                subscribers: Vec::new(),
                latest: None,
            })),
        }
    }

    /// Convenience constructor taking the transport by value.
    pub fn from_transport<T: Transport + 'static>(transport: T) -> Self {
        Self::new(Arc::new(transport))
    }

    /// Builder method to set `top_k` on every outgoing request
    pub fn with_top_k(mut self, top_k: Option<u32>) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn phase(&self) -> ControllerPhase {
        lock(&self.shared).phase
    }

    pub fn is_active(&self) -> bool {
        self.phase().is_active()
    }

    /// Most recently published snapshot, if any turn has started.
    pub fn latest(&self) -> Option<TurnSnapshot> {
        lock(&self.shared).latest.clone()
    }

    /// Receive every snapshot published from now on, one per applied event
    /// and one per status transition.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<TurnSnapshot> {
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.shared).subscribers.push(tx);
        rx
    }

    /// Request cancellation of the turn in flight.
    ///
    /// Returns `false` when no turn is sending or streaming.
    pub fn cancel(&self) -> bool {
        let shared = lock(&self.shared);
        match (&shared.cancel_tx, shared.phase.is_active()) {
            (Some(tx), true) => {
                tracing::debug!("Cancellation requested");
                tx.send_replace(true);
                true
            }
            _ => false,
        }
    }

    /// Start a turn on the current tokio runtime and return its handle.
    ///
    /// Fails immediately with [`TurnError::AlreadyActive`] while another turn
    /// is in flight.
    pub fn start(&self, query: &str) -> TurnResult<TurnHandle> {
        let (request, cancel_tx, cancel_rx, guard) = self.begin(query)?;
        let controller = self.clone();
        let join = tokio::spawn(async move { controller.drive(request, cancel_rx, guard).await });
        Ok(TurnHandle { join, cancel_tx })
    }

    /// Run a turn to its end on the calling task.
    pub async fn run(&self, query: &str) -> TurnResult<TurnSnapshot> {
        let (request, _cancel_tx, cancel_rx, guard) = self.begin(query)?;
        Ok(self.drive(request, cancel_rx, guard).await)
    }

    /// Claim the controller for a new turn: `Idle`/terminal → `Sending`.
    fn begin(
        &self,
        query: &str,
    ) -> TurnResult<(
        QueryRequest,
        Arc<watch::Sender<bool>>,
        watch::Receiver<bool>,
        ActiveTurn,
    )> {
        let query = query.trim();
        if query.is_empty() {
            return Err(TurnError::EmptyQuery);
        }

        let mut shared = lock(&self.shared);
        if shared.phase.is_active() {
            return Err(TurnError::AlreadyActive);
        }
        let (tx, rx) = watch::channel(false);
        let tx = Arc::new(tx);
        shared.phase = ControllerPhase::Sending;
        shared.cancel_tx = Some(Arc::clone(&tx));
        drop(shared);

        let request = QueryRequest::new(query).with_top_k(self.top_k);
        let guard = ActiveTurn {
            shared: Arc::clone(&self.shared),
            finished: false,
        };
        Ok((request, tx, rx, guard))
    }

    async fn drive(
        &self,
        request: QueryRequest,
        mut cancel_rx: watch::Receiver<bool>,
        mut guard: ActiveTurn,
    ) -> TurnSnapshot {
        let mut state = TurnState::new(request.query.clone());
        tracing::info!(turn_id = %state.id(), "Turn started");

        let opened = tokio::select! {
            biased;
            _ = cancelled(&mut cancel_rx) => None,
            result = self.transport.open(&request) => Some(result),
        };

        match opened {
            None => {
                state.cancel();
            }
            Some(Err(err)) => {
                tracing::warn!(turn_id = %state.id(), "Transport failed before streaming: {}", err);
                state.fail_transport(&err, false);
            }
            Some(Ok(body)) => {
                lock(&self.shared).phase = ControllerPhase::Streaming;
                self.publish(&state);
                self.pump(&mut state, body, &mut cancel_rx).await;
            }
        }

        guard.finished = true;
        self.finish(state)
    }

    /// Pull chunks until the turn reaches a terminal status.
    async fn pump(
        &self,
        state: &mut TurnState,
        mut body: ByteStream,
        cancel_rx: &mut watch::Receiver<bool>,
    ) {
        let mut splitter = FrameSplitter::new();

        while !state.is_terminal() {
            let next = tokio::select! {
                biased;
                _ = cancelled(cancel_rx) => {
                    state.cancel();
                    break;
                }
                item = body.next() => item,
            };

            match next {
                Some(Ok(bytes)) => {
                    tracing::trace!(len = bytes.len(), "Chunk received");
                    for frame in splitter.feed(&bytes) {
                        if self.handle_frame(state, frame) == Applied::Terminal {
                            break;
                        }
                    }
                }
                Some(Err(err)) => {
                    tracing::warn!(turn_id = %state.id(), "Stream read failed: {}", err);
                    state.fail_transport(&err, true);
                }
                None => {
                    if let Some(frame) = splitter.close() {
                        self.handle_frame(state, frame);
                    }
                    if !state.is_terminal() {
                        tracing::debug!("Stream ended without a closing event");
                        state.complete(STREAM_ENDED_MARKER);
                    }
                }
            }
        }
    }

    fn handle_frame(&self, state: &mut TurnState, frame: Frame) -> Applied {
        match decode(&frame) {
            Ok(event) => {
                tracing::debug!(event = event.event_type_name(), "Applying event");
                let applied = state.apply(&event);
                // Terminal transitions are published by finish()
                if applied == Applied::Continue {
                    self.publish(state);
                }
                applied
            }
            Err(DecodeError::Empty) => {
                tracing::debug!(event = %frame.event, "Dropping frame without data");
                Applied::Continue
            }
            Err(err) => {
                tracing::warn!("Dropping frame: {}", err);
                state.record_dropped_frame();
                Applied::Continue
            }
        }
    }

    fn publish(&self, state: &TurnState) -> TurnSnapshot {
        let snapshot = Arc::new(state.clone());
        let mut shared = lock(&self.shared);
        shared.latest = Some(Arc::clone(&snapshot));
        shared
            .subscribers
            .retain(|tx| tx.send(Arc::clone(&snapshot)).is_ok());
        snapshot
    }

    fn finish(&self, state: TurnState) -> TurnSnapshot {
        tracing::info!(
            turn_id = %state.id(),
            status = state.status().as_str(),
            dropped_frames = state.dropped_frames(),
            "Turn finished"
        );
        {
            let mut shared = lock(&self.shared);
            shared.phase = ControllerPhase::from(state.status());
            shared.cancel_tx = None;
        }
        self.publish(&state)
    }
}

/// Handle to a turn started with [`TurnController::start`].
#[derive(Debug)]
pub struct TurnHandle {
    join: JoinHandle<TurnSnapshot>,
    cancel_tx: Arc<watch::Sender<bool>>,
}

impl TurnHandle {
    /// Request cancellation of this turn.
    pub fn cancel(&self) {
        self.cancel_tx.send_replace(true);
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the turn to end and return its final snapshot.
    pub async fn join(self) -> TurnResult<TurnSnapshot> {
        self.join
            .await
            .map_err(|e| TurnError::Aborted(e.to_string()))
    }
}
