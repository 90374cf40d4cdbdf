//! Per-turn content state.
//!
//! A [`TurnState`] is created when a turn starts, mutated only by the
//! aggregator and the controller's finalizers, and frozen exactly once.
//! Every mutator is a no-op on a frozen state.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::channel::Channel;
use crate::error::StreamError;
use crate::sse::{ErrorInfo, Source};
use crate::traits::TransportError;

/// Written to the active channel when the backend finished without content.
pub const NO_CONTENT_MARKER: &str = "[No content generated]";
/// Written to the active channel when the body ended without content or a
/// closing event.
pub const STREAM_ENDED_MARKER: &str = "[Stream ended without content]";
/// Appended to the active channel when the user cancels.
pub const INTERRUPTED_NOTICE: &str = "\n[Response interrupted by user]";

/// Lifecycle status of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStatus {
    Streaming,
    Completed,
    Errored,
    Cancelled,
}

impl TurnStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TurnStatus::Streaming)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TurnStatus::Streaming => "streaming",
            TurnStatus::Completed => "completed",
            TurnStatus::Errored => "errored",
            TurnStatus::Cancelled => "cancelled",
        }
    }
}

/// The aggregate content of one user turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnState {
    id: Uuid,
    query: String,
    /// Channel texts in first-seen order, chat first
    channels: Vec<(Channel, String)>,
    available: Vec<Channel>,
    active_channel: Channel,
    sources: Option<Vec<Source>>,
    status: TurnStatus,
    terminal_note: Option<String>,
    failure: Option<StreamError>,
    dropped_frames: u32,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl TurnState {
    /// Create a streaming turn with every channel empty
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            query: query.into(),
            channels: vec![(Channel::Chat, String::new())],
            available: vec![Channel::Chat],
            active_channel: Channel::Chat,
            sources: None,
            status: TurnStatus::Streaming,
            terminal_note: None,
            failure: None,
            dropped_frames: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn status(&self) -> TurnStatus {
        self.status
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Accumulated text of a channel, empty when it never received content.
    pub fn channel_text(&self, channel: &Channel) -> &str {
        self.channels
            .iter()
            .find(|(c, _)| c == channel)
            .map(|(_, text)| text.as_str())
            .unwrap_or("")
    }

    pub fn chat(&self) -> &str {
        self.channel_text(&Channel::Chat)
    }

    pub fn active_channel(&self) -> &Channel {
        &self.active_channel
    }

    pub fn active_text(&self) -> &str {
        self.channel_text(&self.active_channel)
    }

    /// Channels with at least one contribution, in first-seen order.
    pub fn available_channels(&self) -> &[Channel] {
        &self.available
    }

    pub fn has_channel(&self, channel: &Channel) -> bool {
        self.available.contains(channel)
    }

    /// Text for a consumer-requested channel, falling back to the active one
    /// when nothing (or an unavailable channel) is requested.
    pub fn view(&self, requested: Option<&Channel>) -> &str {
        match requested {
            Some(channel) if self.has_channel(channel) => self.channel_text(channel),
            _ => self.active_text(),
        }
    }

    pub fn sources(&self) -> Option<&[Source]> {
        self.sources.as_deref()
    }

    pub fn terminal_note(&self) -> Option<&str> {
        self.terminal_note.as_deref()
    }

    pub fn failure(&self) -> Option<&StreamError> {
        self.failure.as_ref()
    }

    /// Frames dropped because their payload could not be decoded
    pub fn dropped_frames(&self) -> u32 {
        self.dropped_frames
    }

    /// Still streaming and nothing to show yet.
    pub fn is_awaiting_content(&self) -> bool {
        self.status == TurnStatus::Streaming && self.active_text().is_empty()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    // ---------------------------------------------------------------------
    // Mutators, crate-internal
    // ---------------------------------------------------------------------

    /// Append text to a channel, registering it as available on first
    /// contribution.
    pub(crate) fn append(&mut self, channel: Channel, text: &str) {
        if self.is_terminal() {
            return;
        }
        if !self.available.contains(&channel) {
            self.available.push(channel.clone());
        }
        match self.channels.iter_mut().find(|(c, _)| *c == channel) {
            Some((_, buf)) => buf.push_str(text),
            None => self.channels.push((channel, text.to_string())),
        }
    }

    pub(crate) fn set_active(&mut self, channel: Channel) {
        if self.is_terminal() {
            return;
        }
        self.active_channel = channel;
    }

    pub(crate) fn replace_sources(&mut self, sources: Vec<Source>) {
        if self.is_terminal() {
            return;
        }
        self.sources = Some(sources);
    }

    pub(crate) fn record_dropped_frame(&mut self) {
        if self.is_terminal() {
            return;
        }
        self.dropped_frames += 1;
    }

    /// Append an annotation to the active channel; a leading newline is
    /// dropped when the channel is still empty.
    fn annotate_active(&mut self, note: &str) {
        let channel = self.active_channel.clone();
        let note = if self.channel_text(&channel).is_empty() {
            note.trim_start_matches('\n')
        } else {
            note
        };
        self.append(channel, note);
    }

    fn freeze(&mut self, status: TurnStatus) {
        self.status = status;
        self.finished_at = Some(Utc::now());
    }

    /// Complete the turn, writing `marker` if the active channel is empty.
    pub(crate) fn complete(&mut self, marker: &str) -> bool {
        if self.is_terminal() {
            return false;
        }
        if self.active_text().is_empty() {
            self.annotate_active(marker);
            self.terminal_note = Some(marker.to_string());
        }
        self.freeze(TurnStatus::Completed);
        true
    }

    /// Terminate on an explicit error from the backend.
    pub(crate) fn fail_protocol(&mut self, info: &ErrorInfo) -> bool {
        if self.is_terminal() {
            return false;
        }
        let annotation = info.annotation();
        self.annotate_active(&annotation);
        self.terminal_note = Some(annotation.trim().to_string());
        self.failure = Some(StreamError::from(info));
        self.freeze(TurnStatus::Errored);
        true
    }

    /// Terminate on a transport failure.
    ///
    /// Before any byte arrived the chat channel carries the failure message;
    /// mid-stream the failure is appended to whatever was already received.
    pub(crate) fn fail_transport(&mut self, err: &TransportError, streaming: bool) -> bool {
        if self.is_terminal() {
            return false;
        }
        let failure = StreamError::from(err);
        let note = failure.user_message();
        if streaming {
            self.annotate_active(&format!("\n[{}]", note));
        } else {
            self.append(Channel::Chat, &note);
        }
        self.terminal_note = Some(note);
        self.failure = Some(failure);
        self.freeze(TurnStatus::Errored);
        true
    }

    /// Terminate on user cancellation, keeping all partial content.
    pub(crate) fn cancel(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.annotate_active(INTERRUPTED_NOTICE);
        self.terminal_note = Some(INTERRUPTED_NOTICE.trim().to_string());
        self.failure = Some(StreamError::Cancelled);
        self.freeze(TurnStatus::Cancelled);
        true
    }
}
