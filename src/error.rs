//! Error types for the GLS client
//!
//! One variant per way a request can fail: the transport, the framing, each
//! handshake step, and each server rejection tag.

use std::fmt;

use thiserror::Error;

/// Result type alias using GlsError
pub type Result<T> = std::result::Result<T, GlsError>;

/// Unified error type for GLS client operations
#[derive(Debug, Error)]
pub enum GlsError {
    // -------------------------------------------------------------------------
    // Transport / Framing Errors
    // -------------------------------------------------------------------------
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Handshake Errors
    // -------------------------------------------------------------------------
    #[error("Version mismatch - server understands {server}; client wants to speak {requested}")]
    VersionMismatch {
        requested: String,
        server: String,
        reply: String,
    },

    #[error("The client ({client}) could not be authenticated on the server")]
    Authentication { client: String, reply: String },

    #[error("The server did not accept the device ({device})")]
    DeviceRejected { device: String, reply: String },

    // -------------------------------------------------------------------------
    // Server Rejections
    // -------------------------------------------------------------------------
    #[error("Command rejected by server business rules: {command}")]
    BusinessRule { command: String },

    #[error("Command failed server validation: {command}")]
    Validation { command: String },

    // -------------------------------------------------------------------------
    // Client-side Errors
    // -------------------------------------------------------------------------
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Context
    // -------------------------------------------------------------------------
    #[error("{action} failed: {source}")]
    Operation {
        action: Action,
        #[source]
        source: Box<GlsError>,
    },
}

/// Error classification, stable across context wrapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Protocol,
    VersionMismatch,
    Authentication,
    DeviceRejected,
    BusinessRule,
    Validation,
    InvalidArgument,
    Config,
}

/// The logical action a high-level operation was performing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ListGroups,
    JoinGroup,
    SendPosition,
    SendWaypoint,
    RequestPositions,
    RequestWaypoints,
    TestConnection,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::ListGroups => "list groups",
            Action::JoinGroup => "join group",
            Action::SendPosition => "send position",
            Action::SendWaypoint => "send waypoint",
            Action::RequestPositions => "request positions",
            Action::RequestWaypoints => "request waypoints",
            Action::TestConnection => "test connection",
        };
        f.write_str(name)
    }
}

impl GlsError {
    /// Classify the error; context wrappers report the kind of their cause
    pub fn kind(&self) -> ErrorKind {
        match self {
            GlsError::Transport(_) => ErrorKind::Transport,
            GlsError::Protocol(_) => ErrorKind::Protocol,
            GlsError::VersionMismatch { .. } => ErrorKind::VersionMismatch,
            GlsError::Authentication { .. } => ErrorKind::Authentication,
            GlsError::DeviceRejected { .. } => ErrorKind::DeviceRejected,
            GlsError::BusinessRule { .. } => ErrorKind::BusinessRule,
            GlsError::Validation { .. } => ErrorKind::Validation,
            GlsError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            GlsError::Config(_) => ErrorKind::Config,
            GlsError::Operation { source, .. } => source.kind(),
        }
    }

    /// Strip all operation context and return the underlying error
    pub fn root(&self) -> &GlsError {
        match self {
            GlsError::Operation { source, .. } => source.root(),
            other => other,
        }
    }

    /// The outermost action this error was raised under, if any
    pub fn action(&self) -> Option<Action> {
        match self {
            GlsError::Operation { action, .. } => Some(*action),
            _ => None,
        }
    }

    /// Wrap with operation context
    pub(crate) fn during(self, action: Action) -> Self {
        GlsError::Operation {
            action,
            source: Box::new(self),
        }
    }

    /// Whether the connection can no longer be trusted after this error
    pub(crate) fn breaks_connection(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transport | ErrorKind::Protocol)
    }
}
