//! Protocol codec
//!
//! Line framing and reply classification for the wire protocol.
//!
//! ## Reply Framing
//! ```text
//! first line ─┬─ "C..."            → BusinessRule error
//!             ├─ "E..."            → Validation error
//!             ├─ "" / end of data  → Protocol error (no data returned)
//!             ├─ "G|P|W|F..."      → read lines until one starts with F
//!             └─ anything else     → single-line reply
//! ```

use std::io::{self, BufRead, Write};

use bytes::BytesMut;

use crate::error::{GlsError, Result};
use super::{Command, Reply, ReplyTag};

/// Longest reply line accepted by default, terminator included
pub const DEFAULT_MAX_LINE_LEN: usize = 1024;

/// Most lines accepted in one multi-line reply by default
pub const DEFAULT_MAX_REPLY_LINES: usize = 10_000;

/// Bounds applied while reading replies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLimits {
    pub max_line_len: usize,
    pub max_reply_lines: usize,
}

impl Default for FrameLimits {
    fn default() -> Self {
        Self {
            max_line_len: DEFAULT_MAX_LINE_LEN,
            max_reply_lines: DEFAULT_MAX_REPLY_LINES,
        }
    }
}

// =============================================================================
// Line I/O
// =============================================================================

/// Read one line and strip its terminator
///
/// Returns `None` if the stream ends before any byte of the line.
pub fn read_line<R: BufRead>(reader: &mut R, max_line_len: usize) -> Result<Option<String>> {
    let mut line = BytesMut::with_capacity(64);

    loop {
        let available = match reader.fill_buf() {
            Ok(buf) => buf,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };

        if available.is_empty() {
            if line.is_empty() {
                return Ok(None);
            }
            return Err(GlsError::Transport(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed in the middle of a line",
            )));
        }

        let (take, complete) = match available.iter().position(|&b| b == b'\n') {
            Some(i) => (i + 1, true),
            None => (available.len(), false),
        };

        if line.len() + take > max_line_len {
            return Err(GlsError::Protocol(format!(
                "reply line exceeds {} bytes",
                max_line_len
            )));
        }

        line.extend_from_slice(&available[..take]);
        reader.consume(take);

        if complete {
            break;
        }
    }

    line.truncate(line.len() - 1);
    if line.last() == Some(&b'\r') {
        line.truncate(line.len() - 1);
    }

    String::from_utf8(line.to_vec())
        .map(Some)
        .map_err(|_| GlsError::Protocol("reply line is not valid UTF-8".to_string()))
}

/// Write a command line to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    writer.write_all(&command.encode())?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Reply Classification
// =============================================================================

/// Read the complete reply to `command`
pub fn read_reply<R: BufRead>(
    reader: &mut R,
    command: &Command,
    limits: FrameLimits,
) -> Result<Reply> {
    let first = match read_line(reader, limits.max_line_len)? {
        Some(line) if !line.is_empty() => line,
        _ => return Err(GlsError::Protocol("no data returned".to_string())),
    };

    match ReplyTag::of(&first) {
        Some(ReplyTag::Change) => Err(GlsError::BusinessRule {
            command: command.redacted(),
        }),
        Some(ReplyTag::Error) => Err(GlsError::Validation {
            command: command.redacted(),
        }),
        Some(tag) if tag.starts_sequence() => read_sequence(reader, first, limits),
        _ => Ok(Reply::Line(first)),
    }
}

/// Accumulate lines until the end-of-sequence line, which is kept
fn read_sequence<R: BufRead>(reader: &mut R, first: String, limits: FrameLimits) -> Result<Reply> {
    let mut lines = vec![first];

    while !is_terminator(lines.last()) {
        if lines.len() >= limits.max_reply_lines {
            return Err(GlsError::Protocol(format!(
                "multi-line reply exceeds {} lines without a terminator",
                limits.max_reply_lines
            )));
        }

        match read_line(reader, limits.max_line_len)? {
            Some(line) if line.is_empty() => {
                return Err(GlsError::Protocol(
                    "empty line inside a multi-line reply".to_string(),
                ));
            }
            Some(line) => lines.push(line),
            None => {
                return Err(GlsError::Transport(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed before the end of a multi-line reply",
                )));
            }
        }
    }

    Ok(Reply::Sequence(lines))
}

fn is_terminator(line: Option<&String>) -> bool {
    line.map_or(false, |l| ReplyTag::of(l) == Some(ReplyTag::Finished))
}
