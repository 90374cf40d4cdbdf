//! Interactive session: asks queries, streams answers, handles commands.

use std::io::Write;

use color_eyre::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

use super::printer::{write_exchange, StreamPrinter};
use crate::conversation::Conversation;
use crate::turn::{Channel, TurnController, TurnSnapshot};

/// A line typed at the prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplInput {
    Query(String),
    Show(Channel),
    Channels,
    History,
    Clear,
    Quit,
    Empty,
    Unknown(String),
}

impl ReplInput {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ReplInput::Empty;
        }
        let Some(command) = line.strip_prefix('/') else {
            return ReplInput::Query(line.to_string());
        };
        let (name, rest) = command.split_once(' ').unwrap_or((command, ""));
        match (name, rest.trim()) {
            ("show", channel) if !channel.is_empty() => ReplInput::Show(Channel::from_name(channel)),
            ("channels", _) => ReplInput::Channels,
            ("history", _) => ReplInput::History,
            ("clear", _) => ReplInput::Clear,
            ("quit" | "exit", _) => ReplInput::Quit,
            _ => ReplInput::Unknown(line.to_string()),
        }
    }
}

/// Streams turns of one conversation to an output.
pub struct Session {
    conversation: Conversation,
    snapshots: mpsc::UnboundedReceiver<TurnSnapshot>,
}

impl Session {
    pub fn new(controller: TurnController) -> Self {
        let snapshots = controller.subscribe();
        Self {
            conversation: Conversation::new(controller),
            snapshots,
        }
    }

    pub fn controller(&self) -> &TurnController {
        self.conversation.controller()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Run one turn, printing the active channel as it grows.
    ///
    /// Fails with [`TurnError::Aborted`](crate::error::TurnError::Aborted)
    /// when the turn task dies before publishing its final snapshot.
    pub async fn ask<W: Write>(&mut self, query: &str, out: &mut W) -> Result<TurnSnapshot> {
        let handle = self.conversation.controller().start(query)?;
        let join = handle.join();
        tokio::pin!(join);
        let mut printer = StreamPrinter::new();

        let snapshot = loop {
            tokio::select! {
                biased;
                received = self.snapshots.recv() => match received {
                    Some(snapshot) if snapshot.is_terminal() => {
                        printer.finish(&snapshot, out)?;
                        break (&mut join).await?;
                    }
                    Some(snapshot) => printer.update(&snapshot, out)?,
                    None => break (&mut join).await?,
                },
                joined = &mut join => {
                    let snapshot = joined?;
                    while let Ok(queued) = self.snapshots.try_recv() {
                        if !queued.is_terminal() {
                            printer.update(&queued, out)?;
                        }
                    }
                    printer.finish(&snapshot, out)?;
                    break snapshot;
                }
            }
        };

        self.conversation.record(snapshot.clone());
        Ok(snapshot)
    }

    /// Handle one prompt line. Returns `false` when the user asked to quit.
    pub async fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<bool> {
        match ReplInput::parse(line) {
            ReplInput::Empty => {}
            ReplInput::Quit => return Ok(false),
            ReplInput::Query(query) => {
                self.ask(&query, out).await?;
            }
            ReplInput::Show(channel) => {
                let Some(index) = self.conversation.len().checked_sub(1) else {
                    writeln!(out, "Nothing to show yet")?;
                    return Ok(true);
                };
                if self.conversation.select_channel(index, channel.clone()) {
                    if let Some(exchange) = self.conversation.last() {
                        write_exchange(exchange, out)?;
                    }
                } else {
                    writeln!(out, "No '{}' content in the last answer", channel)?;
                }
            }
            ReplInput::Channels => match self.conversation.last() {
                Some(exchange) => {
                    let names: Vec<&str> = exchange
                        .snapshot()
                        .available_channels()
                        .iter()
                        .map(Channel::name)
                        .collect();
                    writeln!(out, "{}", names.join(", "))?;
                }
                None => writeln!(out, "Nothing to show yet")?,
            },
            ReplInput::History => {
                for (i, exchange) in self.conversation.history().iter().enumerate() {
                    writeln!(
                        out,
                        "{:>3}. [{}] {}",
                        i + 1,
                        exchange.snapshot().status().as_str(),
                        exchange.query()
                    )?;
                }
            }
            ReplInput::Clear => self.conversation.clear(),
            ReplInput::Unknown(line) => writeln!(out, "Unknown command: {}", line)?,
        }
        out.flush()?;
        Ok(true)
    }

    /// Read lines from `input` until end of input or `/quit`.
    pub async fn run_repl<R, W>(&mut self, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();
        loop {
            write!(out, "> ")?;
            out.flush()?;
            let Some(line) = lines.next_line().await? else {
                writeln!(out)?;
                return Ok(());
            };
            if !self.handle_line(&line, out).await? {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::adapters::mock::ScriptedTransport;
    use crate::error::TurnError;
    use crate::models::QueryRequest;
    use crate::traits::{ByteStream, Transport, TransportError};

    const DEEP_STREAM: &str = concat!(
        "data: {\"chunk\":\"hmm\",\"type\":\"stream\"}\n\n",
        "data: {\"chunk\":\"hits\",\"type\":\"search_result\"}\n\n",
        "data: {\"chunk\":\"Report\",\"type\":\"reporter_result\",\"done\":true}\n\n",
    );

    fn session(chunks: &[&'static str]) -> Session {
        let transport = ScriptedTransport::new().with_chunks(chunks.iter().copied());
        Session::new(TurnController::from_transport(transport))
    }

    #[test]
    fn test_parse_repl_input() {
        assert_eq!(ReplInput::parse("  "), ReplInput::Empty);
        assert_eq!(
            ReplInput::parse(" what is rust "),
            ReplInput::Query("what is rust".to_string())
        );
        assert_eq!(ReplInput::parse("/show search"), ReplInput::Show(Channel::Search));
        assert_eq!(ReplInput::parse("/quit"), ReplInput::Quit);
        assert_eq!(
            ReplInput::parse("/show"),
            ReplInput::Unknown("/show".to_string())
        );
    }

    #[tokio::test]
    async fn test_ask_streams_and_records() {
        let mut session = session(&["event: answer_chunk\ndata: \"Hi there\"\n\nevent: done\ndata: {}\n\n"]);
        let mut out = Vec::new();
        let snapshot = session.ask("hello", &mut out).await.unwrap();

        assert_eq!(snapshot.chat(), "Hi there");
        assert_eq!(String::from_utf8(out).unwrap(), "Hi there\n");
        assert_eq!(session.conversation().len(), 1);
    }

    #[tokio::test]
    async fn test_repl_show_other_channel() {
        let mut session = session(&[DEEP_STREAM]);
        let input: &[u8] = b"research\n/show search\n/quit\nignored\n";
        let mut out = Vec::new();
        session.run_repl(input, &mut out).await.unwrap();

        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("── reporter "));
        assert!(output.contains("Report"));
        assert!(output.contains("── search "));
        assert!(output.contains("hits"));
        assert_eq!(session.conversation().len(), 1);
    }

    struct PanickingTransport;

    #[async_trait::async_trait]
    impl Transport for PanickingTransport {
        async fn open(&self, _request: &QueryRequest) -> Result<ByteStream, TransportError> {
            panic!("transport blew up");
        }
    }

    #[tokio::test]
    async fn test_ask_fails_when_turn_task_dies() {
        let mut session = Session::new(TurnController::from_transport(PanickingTransport));
        let mut out = Vec::new();

        let result = tokio::time::timeout(Duration::from_secs(5), session.ask("q", &mut out))
            .await
            .expect("ask should return once the turn task is gone");
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TurnError>(),
            Some(TurnError::Aborted(_))
        ));
        assert!(session.conversation().is_empty());
        assert!(!session.controller().is_active());
    }

    #[tokio::test]
    async fn test_show_without_history() {
        let mut session = session(&[]);
        let mut out = Vec::new();
        assert!(session.handle_line("/show chat", &mut out).await.unwrap());
        assert_eq!(String::from_utf8(out).unwrap(), "Nothing to show yet\n");
    }
}
