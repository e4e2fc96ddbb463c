//! # glsclient
//!
//! Client for the GLS (GPS Location Sharing) protocol:
//! - Line-based TCP protocol with single-character tags
//! - Three-step handshake (version, login, device) before any traffic
//! - Single-line and multi-line reply framing
//! - One typed error per server rejection
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │          Callers (CLI, walker, map viewers, poller)          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Session                                │
//! │        (handshake + high-level operations, lazy connect)     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Protocol   │          │ Connection  │
//!   │ (framing)   │◀────────▶│   (TCP)     │
//!   └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod session;
pub mod shared;
pub mod poller;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Action, ErrorKind, GlsError, Result};
pub use config::SessionConfig;
pub use protocol::{Field, Position, Waypoint};
pub use session::{HandshakeState, Positions, Session, Waypoints};
pub use shared::SharedSession;
pub use poller::{PollEvent, PositionPoller, EVENT_CAPACITY};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of glsclient
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// GLS protocol version spoken by default
pub const PROTOCOL_VERSION: &str = "2";
