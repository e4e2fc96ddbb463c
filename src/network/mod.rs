//! Network Module
//!
//! TCP transport to the GLS server.
//!
//! ## Model
//! - One blocking stream per session
//! - Socket-level read/write deadlines bound every exchange
//! - No retries; failures surface as `GlsError::Transport`

mod connection;

pub use connection::Connection;
