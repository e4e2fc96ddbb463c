//! Session Module
//!
//! The protocol session: one connection, the handshake, and the high-level
//! operations built on top of command framing.
//!
//! ## Handshake
//! ```text
//! Disconnected ──V──▶ VersionNegotiated ──N──▶ Authenticated ──D──▶ DeviceRegistered ──▶ Connected
//!      ▲                      │                      │                     │
//!      └──────────────────────┴──────── any failure ─┴─────────────────────┘
//! ```
//!
//! Every operation connects lazily, so callers never drive the handshake
//! themselves unless they want to surface connection errors early.

use std::collections::HashMap;

use crate::config::SessionConfig;
use crate::error::{Action, GlsError, Result};
use crate::network::Connection;
use crate::protocol::{
    parse_group_record, parse_position_record, parse_waypoint_record, Command, Position, Reply,
    ReplyTag, Waypoint,
};

/// Positions of the other participants, keyed by owner
pub type Positions = HashMap<String, Position>;

/// Waypoints of the other participants, keyed by owner
pub type Waypoints = HashMap<String, Waypoint>;

/// Progress through the handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    Disconnected,
    VersionNegotiated,
    Authenticated,
    DeviceRegistered,
    Connected,
}

/// A session with one GLS server
///
/// ## Ownership
///
/// The session owns its socket exclusively and every call blocks until the
/// full reply has been read. Two commands must never interleave on one
/// socket, so sharing a session across threads goes through
/// [`SharedSession`](crate::shared::SharedSession).
pub struct Session {
    config: SessionConfig,

    /// Present only while `state` is `Connected`
    connection: Option<Connection>,

    state: HandshakeState,

    /// Greeting line the server sent on connect
    server_version: Option<String>,
}

impl Session {
    /// Create a session; no connection is made until the first operation
    pub fn new(config: SessionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            connection: None,
            state: HandshakeState::Disconnected,
            server_version: None,
        })
    }

    // =========================================================================
    // Handshake
    // =========================================================================

    /// Run the handshake if the session is not connected yet
    ///
    /// Idempotent: a connected session returns immediately without I/O.
    pub fn connect(&mut self) -> Result<()> {
        if self.state == HandshakeState::Connected {
            return Ok(());
        }

        match self.handshake() {
            Ok(connection) => {
                self.connection = Some(connection);
                self.state = HandshakeState::Connected;
                tracing::info!("Connected to {}", self.config.server_addr());
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Handshake with {} failed: {}", self.config.server_addr(), e);
                self.reset();
                Err(e)
            }
        }
    }

    fn handshake(&mut self) -> Result<Connection> {
        self.reset();
        tracing::info!("Connection attempt for {}", self.config.server_addr());

        let mut connection = Connection::open(&self.config)?;

        // Step 0: the server advertises its versions unprompted
        let greeting = connection.read_line()?.ok_or_else(|| {
            GlsError::Protocol("server closed the connection before its greeting".to_string())
        })?;
        self.server_version = Some(greeting);

        // Step 1: version
        let command = Command::version(&self.config.protocol_version)?;
        if let Some(reply) = handshake_step(&mut connection, &command)? {
            return Err(GlsError::VersionMismatch {
                requested: self.config.protocol_version.clone(),
                server: self.server_version.clone().unwrap_or_default(),
                reply,
            });
        }
        self.state = HandshakeState::VersionNegotiated;

        // Step 2: login
        let command = Command::login(&self.config.client_name, self.config.password.as_deref())?;
        if let Some(reply) = handshake_step(&mut connection, &command)? {
            return Err(GlsError::Authentication {
                client: self.config.client_name.clone(),
                reply,
            });
        }
        self.state = HandshakeState::Authenticated;

        // Step 3: device
        let command = Command::device(&self.config.device_name)?;
        if let Some(reply) = handshake_step(&mut connection, &command)? {
            return Err(GlsError::DeviceRejected {
                device: self.config.device_name.clone(),
                reply,
            });
        }
        self.state = HandshakeState::DeviceRegistered;

        Ok(connection)
    }

    /// Drop the socket and forget everything learned from the server
    fn reset(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.shutdown();
        }
        self.state = HandshakeState::Disconnected;
        self.server_version = None;
    }

    // =========================================================================
    // Command Framing
    // =========================================================================

    /// Send one command and read back its reply, connecting first if needed
    ///
    /// A transport or framing failure leaves the stream at an unknown
    /// position, so the session drops the socket and returns to
    /// `Disconnected`. Server rejections keep the session connected.
    pub fn send_command(&mut self, command: &Command) -> Result<Reply> {
        self.connect()?;

        let result = match self.connection.as_mut() {
            Some(connection) => connection.request(command),
            None => Err(GlsError::Protocol("session is not connected".to_string())),
        };

        if let Err(e) = &result {
            if e.breaks_connection() {
                tracing::warn!("Dropping connection after {}: {}", command.redacted(), e);
                self.reset();
            }
        }
        result
    }

    /// Run a high-level operation, adding its context to any error
    ///
    /// A malformed reply leaves the session `Disconnected`, the same as a
    /// framing failure inside `send_command`.
    fn run<T>(&mut self, action: Action, op: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        op(self).map_err(|e| {
            if e.breaks_connection() && self.connection.is_some() {
                tracing::warn!("Dropping connection after failed {}: {}", action, e);
                self.reset();
            }
            e.during(action)
        })
    }

    // =========================================================================
    // High-Level Operations
    // =========================================================================

    /// Names of the groups known to the server, in server order
    pub fn request_groups(&mut self) -> Result<Vec<String>> {
        self.run(Action::ListGroups, |session| {
            let reply = session.send_command(&Command::list_groups())?;
            let records = expect_sequence(&reply)?;
            records.iter().map(|line| parse_group_record(line)).collect()
        })
    }

    /// Join a group
    pub fn join_group(&mut self, group_name: &str) -> Result<()> {
        self.run(Action::JoinGroup, |session| {
            let command = Command::join_group(group_name)?;
            let reply = session.send_command(&command)?;
            expect_ok(&reply, &command)
        })
    }

    /// Join the group named in the session config
    pub fn join_configured_group(&mut self) -> Result<()> {
        let group_name = self.config.group_name.clone();
        self.join_group(&group_name)
    }

    /// Publish this device's position
    pub fn send_position(&mut self, position: &Position) -> Result<()> {
        self.run(Action::SendPosition, |session| {
            let command = Command::submit_position(position)?;
            let reply = session.send_command(&command)?;
            expect_ok(&reply, &command)
        })
    }

    /// Publish a waypoint
    pub fn send_waypoint(&mut self, waypoint: &Waypoint) -> Result<()> {
        self.run(Action::SendWaypoint, |session| {
            let command = Command::submit_waypoint(waypoint)?;
            let reply = session.send_command(&command)?;
            expect_ok(&reply, &command)
        })
    }

    /// Positions of the other participants; a repeated owner keeps the last record
    pub fn request_positions(&mut self) -> Result<Positions> {
        self.run(Action::RequestPositions, |session| {
            let reply = session.send_command(&Command::query_positions())?;
            let mut positions = Positions::new();
            for line in expect_sequence(&reply)? {
                let (owner, position) = parse_position_record(line)?;
                positions.insert(owner, position);
            }
            Ok(positions)
        })
    }

    /// Waypoints of the other participants; a repeated owner keeps the last record
    pub fn request_waypoints(&mut self) -> Result<Waypoints> {
        self.run(Action::RequestWaypoints, |session| {
            let reply = session.send_command(&Command::query_waypoints())?;
            let mut waypoints = Waypoints::new();
            for line in expect_sequence(&reply)? {
                let (owner, waypoint) = parse_waypoint_record(line)?;
                waypoints.insert(owner, waypoint);
            }
            Ok(waypoints)
        })
    }

    /// Probe the server by requesting the group list
    ///
    /// The protocol has no ping; any well-formed reply counts as alive.
    pub fn test_connection(&mut self) -> Result<()> {
        self.run(Action::TestConnection, |session| {
            session.send_command(&Command::list_groups()).map(|_| ())
        })
    }

    /// Say goodbye and release the socket
    ///
    /// The quit command is best-effort: the socket is released either way.
    /// Closing a closed session does nothing; the next operation reconnects.
    pub fn close(&mut self) {
        let Some(mut connection) = self.connection.take() else {
            self.reset();
            return;
        };

        tracing::info!("Closing connection to {}", connection.peer_addr());
        if let Err(e) = connection.send(&Command::quit()) {
            tracing::warn!("Quit to {} failed: {}", connection.peer_addr(), e);
        }
        connection.shutdown();
        self.reset();
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn is_connected(&self) -> bool {
        self.state == HandshakeState::Connected
    }

    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Versions the server advertised on connect
    pub fn server_version(&self) -> Option<&str> {
        self.server_version.as_deref()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

/// Returns the rejected reply text, or `None` when the server said OK
fn handshake_step(connection: &mut Connection, command: &Command) -> Result<Option<String>> {
    match connection.request(command) {
        Ok(reply) if reply.is_ok() => Ok(None),
        Ok(reply) => Ok(Some(reply.first_line().to_string())),
        Err(GlsError::BusinessRule { .. }) => Ok(Some(ReplyTag::Change.as_char().to_string())),
        Err(GlsError::Validation { .. }) => Ok(Some(ReplyTag::Error.as_char().to_string())),
        Err(e) => Err(e),
    }
}

fn expect_ok(reply: &Reply, command: &Command) -> Result<()> {
    if reply.is_ok() {
        return Ok(());
    }
    Err(GlsError::Protocol(format!(
        "unexpected reply {:?} to {}",
        reply.first_line(),
        command.redacted()
    )))
}

fn expect_sequence(reply: &Reply) -> Result<&[String]> {
    match reply {
        Reply::Sequence(_) => Ok(reply.records()),
        Reply::Line(line) => Err(GlsError::Protocol(format!(
            "expected a multi-line reply, got {:?}",
            line
        ))),
    }
}
