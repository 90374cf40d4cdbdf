//! Folding decoded events into a [`TurnState`].

use super::channel::Channel;
use super::state::{TurnState, NO_CONTENT_MARKER};
use crate::sse::{Chunk, ErrorInfo, StreamEvent};

/// What applying one event did to the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// State updated, keep reading
    Continue,
    /// State updated and frozen; stop reading
    Terminal,
    /// State was already frozen; nothing changed
    Ignored,
}

impl TurnState {
    /// Apply one event in place.
    pub fn apply(&mut self, event: &StreamEvent) -> Applied {
        if self.is_terminal() {
            return Applied::Ignored;
        }

        match event {
            StreamEvent::Sources(sources) => {
                self.replace_sources(sources.clone());
                Applied::Continue
            }
            StreamEvent::AnswerChunk(text) => {
                self.append(Channel::Chat, text);
                Applied::Continue
            }
            StreamEvent::Error(info) => {
                self.fail_protocol(info);
                Applied::Terminal
            }
            StreamEvent::Done => {
                self.complete(NO_CONTENT_MARKER);
                Applied::Terminal
            }
            StreamEvent::Chunk(chunk) => self.apply_chunk(chunk),
        }
    }

    fn apply_chunk(&mut self, chunk: &Chunk) -> Applied {
        if let Some(message) = &chunk.error {
            self.fail_protocol(&ErrorInfo::new(message.clone()));
            return Applied::Terminal;
        }

        let channel = Channel::for_chunk(&chunk.kind);
        if channel.promotes_on_content() {
            self.set_active(channel.clone());
        }
        self.append(channel, &chunk.text);

        if chunk.done {
            self.complete(NO_CONTENT_MARKER);
            Applied::Terminal
        } else {
            Applied::Continue
        }
    }
}

/// Pure form of [`TurnState::apply`]: consume a state, return the next one.
pub fn apply(mut state: TurnState, event: &StreamEvent) -> TurnState {
    state.apply(event);
    state
}
