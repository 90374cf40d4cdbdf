//! Line-based rendering of streaming turns.
//!
//! Snapshots are cumulative; the printer remembers how much of the active
//! channel it already wrote and emits only the new tail.

use std::io::{self, Write};

use crate::conversation::Exchange;
use crate::turn::{Channel, TurnState};

/// Line width for separators.
const LINE_WIDTH: usize = 60;

/// Separator naming a channel.
///
/// ```text
/// ── reporter ────────────────────────────────────────────────
/// ```
pub fn channel_header(channel: &Channel) -> String {
    let label = format!("── {} ", channel);
    let fill = LINE_WIDTH.saturating_sub(label.chars().count());
    format!("{}{}", label, "─".repeat(fill))
}

/// Incremental writer for one turn.
#[derive(Debug, Default)]
pub struct StreamPrinter {
    channel: Option<Channel>,
    written: usize,
}

impl StreamPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write whatever the snapshot adds to what was already printed.
    ///
    /// A header is printed when the active channel moves away from chat.
    pub fn update<W: Write>(&mut self, state: &TurnState, out: &mut W) -> io::Result<()> {
        let active = state.active_channel();
        if self.channel.as_ref() != Some(active) {
            if self.channel.is_some() || *active != Channel::Chat {
                if self.written > 0 {
                    writeln!(out)?;
                }
                writeln!(out, "{}", channel_header(active))?;
            }
            self.channel = Some(active.clone());
            self.written = 0;
        }

        let text = state.active_text();
        if text.len() > self.written && text.is_char_boundary(self.written) {
            out.write_all(text[self.written..].as_bytes())?;
            self.written = text.len();
        }
        out.flush()
    }

    /// Write the remaining text, then the sources list.
    pub fn finish<W: Write>(&mut self, state: &TurnState, out: &mut W) -> io::Result<()> {
        self.update(state, out)?;
        writeln!(out)?;
        write_sources(state, out)?;
        self.channel = None;
        self.written = 0;
        out.flush()
    }
}

/// Numbered list of sources, if the turn received any.
pub fn write_sources<W: Write>(state: &TurnState, out: &mut W) -> io::Result<()> {
    let Some(sources) = state.sources().filter(|s| !s.is_empty()) else {
        return Ok(());
    };
    writeln!(out, "\nSources:")?;
    for (i, source) in sources.iter().enumerate() {
        if source.title.is_empty() {
            writeln!(out, "  [{}] {}", i + 1, source.url)?;
        } else {
            writeln!(out, "  [{}] {} - {}", i + 1, source.title, source.url)?;
        }
    }
    Ok(())
}

/// Reprint a finished exchange on its shown channel.
pub fn write_exchange<W: Write>(exchange: &Exchange, out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", channel_header(exchange.shown_channel()))?;
    writeln!(out, "{}", exchange.display_text())?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sse::{Chunk, ChunkKind, Source, StreamEvent};

    fn render(states: &[TurnState]) -> String {
        let mut printer = StreamPrinter::new();
        let mut out = Vec::new();
        for state in states {
            printer.update(state, &mut out).unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_prints_only_new_text() {
        let mut state = TurnState::new("q");
        state.apply(&StreamEvent::AnswerChunk("Hel".to_string()));
        let first = state.clone();
        state.apply(&StreamEvent::AnswerChunk("lo".to_string()));
        assert_eq!(render(&[first, state.clone(), state]), "Hello");
    }

    #[test]
    fn test_header_on_reporter_promotion() {
        let mut state = TurnState::new("q");
        state.apply(&StreamEvent::AnswerChunk("chat".to_string()));
        let before = state.clone();
        state.apply(&StreamEvent::Chunk(Chunk::new(
            "report",
            ChunkKind::ReporterResult,
        )));

        let output = render(&[before, state]);
        assert!(output.starts_with("chat\n── reporter "));
        assert!(output.ends_with("\nreport"));
    }

    #[test]
    fn test_finish_lists_sources() {
        let mut state = TurnState::new("q");
        state.apply(&StreamEvent::Sources(vec![
            Source {
                title: "Rust".to_string(),
                url: "https://rust-lang.org".to_string(),
            },
            Source {
                title: String::new(),
                url: "https://docs.rs".to_string(),
            },
        ]));
        state.apply(&StreamEvent::AnswerChunk("answer".to_string()));
        state.apply(&StreamEvent::Done);

        let mut out = Vec::new();
        StreamPrinter::new().finish(&state, &mut out).unwrap();
        let output = String::from_utf8(out).unwrap();
        assert_eq!(
            output,
            "answer\n\nSources:\n  [1] Rust - https://rust-lang.org\n  [2] https://docs.rs\n"
        );
    }

    #[test]
    fn test_channel_header_width() {
        let header = channel_header(&Channel::Search);
        assert!(header.starts_with("── search "));
        assert_eq!(header.chars().count(), LINE_WIDTH);
    }
}
