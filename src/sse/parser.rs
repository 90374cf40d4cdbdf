//! SSE framing logic
//!
//! Contains the stateful [`FrameSplitter`] that buffers raw byte chunks and
//! emits complete frames, as well as the line and frame parsing functions.

use crate::sse::events::{Frame, SseLine, DEFAULT_EVENT_NAME};

/// Parse a single SSE line into its component type
pub fn parse_sse_line(line: &str) -> SseLine {
    if line.is_empty() {
        return SseLine::Empty;
    }

    if let Some(stripped) = line.strip_prefix(':') {
        return SseLine::Comment(stripped.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("event:") {
        return SseLine::Event(rest.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("data:") {
        return SseLine::Data(rest.trim_start().to_string());
    }

    SseLine::Unknown(line.to_string())
}

/// Parse one delimited block into a [`Frame`].
///
/// Lines may end in `\n`, `\r\n` or a bare `\r`. Returns `None` when the
/// block holds neither an `event:` nor a `data:` line (keepalive comments,
/// stray blank lines).
pub fn parse_frame(block: &str) -> Option<Frame> {
    let mut event: Option<String> = None;
    let mut data_lines: Vec<String> = Vec::new();

    // A CRLF pair yields an extra empty line, which is skipped like any other
    for line in block.split(|c| c == '\n' || c == '\r') {
        match parse_sse_line(line) {
            SseLine::Event(name) => event = Some(name),
            SseLine::Data(data) => data_lines.push(data),
            SseLine::Empty | SseLine::Comment(_) | SseLine::Unknown(_) => {}
        }
    }

    if event.is_none() && data_lines.is_empty() {
        return None;
    }

    let event = event
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_EVENT_NAME.to_string());

    Some(Frame {
        event,
        data: data_lines.join("\n"),
    })
}

fn parse_block(block: &[u8]) -> Option<Frame> {
    parse_frame(&String::from_utf8_lossy(block))
}

/// Stateful splitter that turns arbitrarily cut byte chunks into frames.
///
/// A frame ends at the first empty line. Line terminators are `\n`, `\r\n`
/// and a bare `\r`; a `\r` ending a non-empty line at the very end of the
/// buffer is held back until the next byte shows whether it starts a `\r\n`
/// pair.
///
/// Bytes are buffered undecoded, so a multi-byte UTF-8 character cut in half
/// by a chunk boundary is only decoded once both halves have arrived. Each
/// byte is scanned once, however many chunks a frame spans.
#[derive(Debug, Default)]
pub struct FrameSplitter {
    buf: Vec<u8>,
    /// Offset in `buf` where the next scan resumes
    scanned: usize,
    /// Offset in `buf` where the current line began
    line_start: usize,
}

impl FrameSplitter {
    /// Create a new splitter
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every frame it completes, in order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Frame> {
        self.buf.extend_from_slice(chunk);

        let mut frames = Vec::new();
        let mut block_start = 0;
        let mut i = self.scanned;
        while i < self.buf.len() {
            let terminator_len = match self.buf[i] {
                b'\n' => 1,
                b'\r' => match self.buf.get(i + 1) {
                    Some(b'\n') => 2,
                    Some(_) => 1,
                    // An empty line ends the frame whatever follows
                    None if i == self.line_start => 1,
                    None => break,
                },
                _ => {
                    i += 1;
                    continue;
                }
            };

            if i == self.line_start {
                // Empty line: the block so far is one frame
                if let Some(frame) = parse_block(&self.buf[block_start..i]) {
                    frames.push(frame);
                }
                block_start = i + terminator_len;
            }
            i += terminator_len;
            self.line_start = i;
        }

        self.buf.drain(..block_start);
        self.scanned = i - block_start;
        self.line_start -= block_start;
        frames
    }

    /// Flush whatever is still buffered as a final best-effort frame.
    pub fn close(&mut self) -> Option<Frame> {
        if self.buf.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buf);
        self.reset();
        parse_block(&rest)
    }

    /// Number of bytes waiting for a delimiter
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Reset the splitter state
    pub fn reset(&mut self) {
        self.buf.clear();
        self.scanned = 0;
        self.line_start = 0;
    }
}
