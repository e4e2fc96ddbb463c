//! Command definitions
//!
//! Commands sent from the client, one per line.

use std::fmt;

use crate::error::{GlsError, Result};
use super::record::{Position, Waypoint};

/// Command opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Version,
    Login,
    Device,
    Position,
    Waypoint,
    Group,
    Quit,
}

impl Opcode {
    /// The tag character written on the wire
    pub fn as_char(self) -> char {
        match self {
            Opcode::Version => 'V',
            Opcode::Login => 'N',
            Opcode::Device => 'D',
            Opcode::Position => 'P',
            Opcode::Waypoint => 'W',
            Opcode::Group => 'G',
            Opcode::Quit => 'Q',
        }
    }
}

/// A single protocol command
#[derive(Clone, PartialEq, Eq)]
pub struct Command {
    opcode: Opcode,
    argument: String,
}

impl Command {
    /// Build a command from an opcode and a raw argument
    ///
    /// The argument may contain the `,` separator but never a line break.
    pub fn new(opcode: Opcode, argument: impl Into<String>) -> Result<Self> {
        let argument = argument.into();
        if argument.contains(|c: char| c == '\n' || c == '\r') {
            return Err(GlsError::InvalidArgument(format!(
                "{} command argument contains a line break",
                opcode.as_char()
            )));
        }
        Ok(Self { opcode, argument })
    }

    fn bare(opcode: Opcode) -> Self {
        Self {
            opcode,
            argument: String::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Handshake
    // -------------------------------------------------------------------------

    /// `V<version>`
    pub fn version(version: &str) -> Result<Self> {
        check_word("protocol version", version)?;
        Self::new(Opcode::Version, version)
    }

    /// `N<name>` or `N<name>,<password>`; an empty password is no password
    pub fn login(client_name: &str, password: Option<&str>) -> Result<Self> {
        check_word("client name", client_name)?;
        match password.filter(|p| !p.is_empty()) {
            Some(password) => {
                check_separators("password", password)?;
                Self::new(Opcode::Login, format!("{},{}", client_name, password))
            }
            None => Self::new(Opcode::Login, client_name),
        }
    }

    /// `D<device>`
    pub fn device(device_name: &str) -> Result<Self> {
        check_word("device name", device_name)?;
        Self::new(Opcode::Device, device_name)
    }

    // -------------------------------------------------------------------------
    // Session traffic
    // -------------------------------------------------------------------------

    /// `G` with no argument: list groups
    pub fn list_groups() -> Self {
        Self::bare(Opcode::Group)
    }

    /// `G<name>`: join a group
    pub fn join_group(group_name: &str) -> Result<Self> {
        check_word("group name", group_name)?;
        Self::new(Opcode::Group, group_name)
    }

    /// `P` with no argument: positions of the other group members
    pub fn query_positions() -> Self {
        Self::bare(Opcode::Position)
    }

    /// `P<lat,lon,alt,speed,bearing>`
    pub fn submit_position(position: &Position) -> Result<Self> {
        Self::new(Opcode::Position, position.to_payload()?)
    }

    /// `W` with no argument: waypoints of the other group members
    pub fn query_waypoints() -> Self {
        Self::bare(Opcode::Waypoint)
    }

    /// `W<lat,lon,alt,name>`
    pub fn submit_waypoint(waypoint: &Waypoint) -> Result<Self> {
        Self::new(Opcode::Waypoint, waypoint.to_payload()?)
    }

    /// `Q`
    pub fn quit() -> Self {
        Self::bare(Opcode::Quit)
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn argument(&self) -> &str {
        &self.argument
    }

    /// The command line without its terminator
    pub fn text(&self) -> String {
        let mut text = String::with_capacity(1 + self.argument.len());
        text.push(self.opcode.as_char());
        text.push_str(&self.argument);
        text
    }

    /// The command text safe for logs and error messages
    pub fn redacted(&self) -> String {
        match (self.opcode, self.argument.split_once(',')) {
            (Opcode::Login, Some((name, _))) => format!("N{},<redacted>", name),
            _ => self.text(),
        }
    }

    /// Encode the command as one newline-terminated line
    pub fn encode(&self) -> Vec<u8> {
        let mut line = Vec::with_capacity(2 + self.argument.len());
        line.push(self.opcode.as_char() as u8);
        line.extend_from_slice(self.argument.as_bytes());
        line.push(b'\n');
        line
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("opcode", &self.opcode)
            .field("text", &self.redacted())
            .finish()
    }
}

/// Non-empty and free of separators
fn check_word(what: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(GlsError::InvalidArgument(format!("{} must not be empty", what)));
    }
    check_separators(what, value)
}

pub(crate) fn check_separators(what: &str, value: &str) -> Result<()> {
    if value.contains(|c: char| matches!(c, ',' | '\n' | '\r')) {
        return Err(GlsError::InvalidArgument(format!(
            "{} must not contain ',' or line breaks: {:?}",
            what, value
        )));
    }
    Ok(())
}
