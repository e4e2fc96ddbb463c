//! Shared Session
//!
//! A cloneable handle that serializes access to one session.
//!
//! The lock is held for the whole request/reply exchange, so a reply can
//! never be read by a different command than the one that caused it.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;
use crate::protocol::{Position, Waypoint};
use crate::session::{Positions, Session, Waypoints};

/// Thread-safe handle to a [`Session`]
#[derive(Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<Session>>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Run `op` with exclusive access to the session
    pub fn with<T>(&self, op: impl FnOnce(&mut Session) -> T) -> T {
        let mut session = self.inner.lock();
        op(&mut session)
    }

    pub fn connect(&self) -> Result<()> {
        self.with(Session::connect)
    }

    pub fn request_groups(&self) -> Result<Vec<String>> {
        self.with(Session::request_groups)
    }

    pub fn join_group(&self, group_name: &str) -> Result<()> {
        self.with(|session| session.join_group(group_name))
    }

    pub fn send_position(&self, position: &Position) -> Result<()> {
        self.with(|session| session.send_position(position))
    }

    pub fn send_waypoint(&self, waypoint: &Waypoint) -> Result<()> {
        self.with(|session| session.send_waypoint(waypoint))
    }

    pub fn request_positions(&self) -> Result<Positions> {
        self.with(Session::request_positions)
    }

    pub fn request_waypoints(&self) -> Result<Waypoints> {
        self.with(Session::request_waypoints)
    }

    pub fn close(&self) {
        self.with(Session::close)
    }

    pub fn is_connected(&self) -> bool {
        self.with(|session| session.is_connected())
    }
}

impl From<Session> for SharedSession {
    fn from(session: Session) -> Self {
        Self::new(session)
    }
}
