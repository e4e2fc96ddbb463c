//! Position Poller
//!
//! Background refresh of the other participants' positions.
//!
//! ## Loop
//! 1. Join the configured group (if one is set)
//! 2. Request positions
//! 3. Publish the result on the event channel
//! 4. Wait for the next tick or a stop signal
//!
//! A failed poll closes the session, so the next tick starts with a fresh
//! handshake.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender, TrySendError};

use crate::error::{GlsError, Result};
use crate::session::{Positions, Session};
use crate::shared::SharedSession;

/// Events buffered for a slow consumer before new ones are dropped
pub const EVENT_CAPACITY: usize = 16;

/// Outcome of one poll
#[derive(Debug)]
pub enum PollEvent {
    Positions(Positions),
    Failed(GlsError),
}

/// Handle to a running poller thread
pub struct PositionPoller {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PositionPoller {
    /// Start polling every `interval`; the first poll runs immediately
    pub fn spawn(
        session: SharedSession,
        interval: Duration,
    ) -> Result<(Self, Receiver<PollEvent>)> {
        let (stop_tx, stop_rx) = channel::bounded::<()>(1);
        let (event_tx, event_rx) = channel::bounded(EVENT_CAPACITY);

        let handle = thread::Builder::new()
            .name("gls-poller".to_string())
            .spawn(move || poll_loop(session, interval, stop_rx, event_tx))?;

        Ok((
            Self {
                stop_tx: Some(stop_tx),
                handle: Some(handle),
            },
            event_rx,
        ))
    }

    /// Stop the thread and wait for it to finish its current poll
    pub fn stop(&mut self) {
        // Dropping the sender disconnects the stop channel
        self.stop_tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Poller thread panicked");
            }
        }
    }
}

impl Drop for PositionPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

fn poll_loop(
    session: SharedSession,
    interval: Duration,
    stop_rx: Receiver<()>,
    event_tx: Sender<PollEvent>,
) {
    let ticker = channel::tick(interval);
    tracing::debug!("Poller started, interval {:?}", interval);

    loop {
        let event = match session.with(poll_once) {
            Ok(positions) => PollEvent::Positions(positions),
            Err(e) => {
                tracing::warn!("Position poll failed: {}", e);
                PollEvent::Failed(e)
            }
        };

        match event_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!("Poll event dropped, consumer is {} events behind", EVENT_CAPACITY);
            }
            // Nobody is listening anymore
            Err(TrySendError::Disconnected(_)) => break,
        }

        channel::select! {
            recv(stop_rx) -> _ => break,
            recv(ticker) -> _ => {}
        }
    }

    tracing::debug!("Poller stopped");
}

fn poll_once(session: &mut Session) -> Result<Positions> {
    let result = refresh(session);
    if result.is_err() {
        session.close();
    }
    result
}

fn refresh(session: &mut Session) -> Result<Positions> {
    if !session.config().group_name.is_empty() {
        session.join_configured_group()?;
    }
    session.request_positions()
}
