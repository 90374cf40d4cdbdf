//! In-memory conversation history.
//!
//! Each finished turn is kept as an [`Exchange`]. A consumer may pick which
//! channel to show per exchange; the choice lives on the exchange and never
//! touches the frozen turn state.

use crate::error::TurnResult;
use crate::turn::{Channel, TurnController, TurnSnapshot};

/// One finished question/answer pair.
#[derive(Debug, Clone)]
pub struct Exchange {
    snapshot: TurnSnapshot,
    selected: Option<Channel>,
}

impl Exchange {
    fn new(snapshot: TurnSnapshot) -> Self {
        Self {
            snapshot,
            selected: None,
        }
    }

    pub fn query(&self) -> &str {
        self.snapshot.query()
    }

    pub fn snapshot(&self) -> &TurnSnapshot {
        &self.snapshot
    }

    pub fn selected_channel(&self) -> Option<&Channel> {
        self.selected.as_ref()
    }

    /// Channel currently shown: the selection, else the turn's active one.
    pub fn shown_channel(&self) -> &Channel {
        self.selected
            .as_ref()
            .unwrap_or_else(|| self.snapshot.active_channel())
    }

    pub fn display_text(&self) -> &str {
        self.snapshot.view(self.selected.as_ref())
    }
}

/// Conversation bound to one controller.
#[derive(Debug)]
pub struct Conversation {
    controller: TurnController,
    history: Vec<Exchange>,
}

impl Conversation {
    pub fn new(controller: TurnController) -> Self {
        Self {
            controller,
            history: Vec::new(),
        }
    }

    pub fn controller(&self) -> &TurnController {
        &self.controller
    }

    /// Run a turn to its end and append it to the history.
    pub async fn ask(&mut self, query: &str) -> TurnResult<&Exchange> {
        let snapshot = self.controller.run(query).await?;
        let index = self.push(snapshot);
        Ok(&self.history[index])
    }

    /// Append a turn that was driven elsewhere (e.g. via
    /// [`TurnController::start`]).
    ///
    /// Returns the exchange index, or `None` when the snapshot is not final.
    pub fn record(&mut self, snapshot: TurnSnapshot) -> Option<usize> {
        if !snapshot.is_terminal() {
            tracing::warn!(turn_id = %snapshot.id(), "Refusing to record an unfinished turn");
            return None;
        }
        Some(self.push(snapshot))
    }

    fn push(&mut self, snapshot: TurnSnapshot) -> usize {
        self.history.push(Exchange::new(snapshot));
        self.history.len() - 1
    }

    pub fn history(&self) -> &[Exchange] {
        &self.history
    }

    pub fn get(&self, index: usize) -> Option<&Exchange> {
        self.history.get(index)
    }

    pub fn last(&self) -> Option<&Exchange> {
        self.history.last()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Show `channel` for the exchange at `index`.
    ///
    /// Accepted only when the turn has content on that channel.
    pub fn select_channel(&mut self, index: usize, channel: Channel) -> bool {
        match self.history.get_mut(index) {
            Some(exchange) if exchange.snapshot.has_channel(&channel) => {
                exchange.selected = Some(channel);
                true
            }
            _ => false,
        }
    }

    /// Go back to showing the turn's active channel.
    pub fn clear_selection(&mut self, index: usize) {
        if let Some(exchange) = self.history.get_mut(index) {
            exchange.selected = None;
        }
    }

    pub fn display_text(&self, index: usize) -> Option<&str> {
        self.history.get(index).map(Exchange::display_text)
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}
