//! Protocol Module
//!
//! Defines the GLS line protocol spoken between client and relay server.
//!
//! ## Line Format
//! ```text
//! ┌─────────┬──────────────────────────────┬──────┐
//! │ Tag (1) │  Payload (comma separated)   │  \n  │
//! └─────────┴──────────────────────────────┴──────┘
//! ```
//!
//! ### Commands (client → server)
//! - `V`: version     - Payload: protocol version
//! - `N`: login       - Payload: name or name,password
//! - `D`: device      - Payload: device name
//! - `P`: position    - Payload: empty (query) or lat,lon,alt,speed,bearing
//! - `W`: waypoint    - Payload: empty (query) or lat,lon,alt,name
//! - `G`: group       - Payload: empty (list) or group name (join)
//! - `Q`: quit        - Payload: empty
//!
//! ### Replies (server → client)
//! - `K`: OK
//! - `C`: rejected by business rules
//! - `E`: rejected by validation
//! - `G` / `P` / `W`: record line of a multi-line reply
//! - `F`: end of a multi-line reply
//!
//! A multi-line reply is zero or more record lines followed by `F`.

mod command;
mod reply;
mod record;
mod codec;

pub use command::{Command, Opcode};
pub use reply::{Reply, ReplyTag};
pub use record::{
    parse_group_record, parse_position_record, parse_waypoint_record, Field, Position, Waypoint,
};
pub use codec::{
    read_line, read_reply, write_command, FrameLimits, DEFAULT_MAX_LINE_LEN,
    DEFAULT_MAX_REPLY_LINES,
};
