//! Reply definitions
//!
//! Replies read back from the server after a command.

/// Reply tags (first character of a reply line)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplyTag {
    Ok,
    Change,
    Error,
    Group,
    Position,
    Waypoint,
    Finished,
    Quit,
}

impl ReplyTag {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'K' => Some(ReplyTag::Ok),
            'C' => Some(ReplyTag::Change),
            'E' => Some(ReplyTag::Error),
            'G' => Some(ReplyTag::Group),
            'P' => Some(ReplyTag::Position),
            'W' => Some(ReplyTag::Waypoint),
            'F' => Some(ReplyTag::Finished),
            'Q' => Some(ReplyTag::Quit),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            ReplyTag::Ok => 'K',
            ReplyTag::Change => 'C',
            ReplyTag::Error => 'E',
            ReplyTag::Group => 'G',
            ReplyTag::Position => 'P',
            ReplyTag::Waypoint => 'W',
            ReplyTag::Finished => 'F',
            ReplyTag::Quit => 'Q',
        }
    }

    /// Tag of a line, if it has a known one
    pub fn of(line: &str) -> Option<Self> {
        line.chars().next().and_then(Self::from_char)
    }

    /// Whether a line with this tag opens a multi-line reply
    pub fn starts_sequence(self) -> bool {
        matches!(
            self,
            ReplyTag::Group | ReplyTag::Position | ReplyTag::Waypoint | ReplyTag::Finished
        )
    }
}

/// One reply unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A single line (handshake answers, join and submit acknowledgements)
    Line(String),

    /// Record lines in server order, terminator line last
    Sequence(Vec<String>),
}

impl Reply {
    /// True for the single-line success reply
    pub fn is_ok(&self) -> bool {
        matches!(self, Reply::Line(line) if line.as_str() == "K")
    }

    /// First line of the reply
    pub fn first_line(&self) -> &str {
        match self {
            Reply::Line(line) => line,
            Reply::Sequence(lines) => lines.first().map(String::as_str).unwrap_or_default(),
        }
    }

    /// Record lines of a sequence, terminator excluded; empty for a single line
    pub fn records(&self) -> &[String] {
        match self {
            Reply::Line(_) => &[],
            Reply::Sequence(lines) => match lines.last() {
                Some(last) if ReplyTag::of(last) == Some(ReplyTag::Finished) => {
                    &lines[..lines.len() - 1]
                }
                _ => lines.as_slice(),
            },
        }
    }
}
