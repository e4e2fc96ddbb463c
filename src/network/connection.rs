//! Server Connection
//!
//! Owns the TCP stream to one GLS server.

use std::io::{self, BufReader, BufWriter};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};

use crate::config::SessionConfig;
use crate::error::{GlsError, Result};
use crate::protocol::{read_line, read_reply, write_command, Command, FrameLimits, Reply};

/// A connected transport to the GLS server
pub struct Connection {
    /// TCP stream reader (buffered for line reads)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered, flushed after each command)
    writer: BufWriter<TcpStream>,

    /// Bounds for reply framing
    limits: FrameLimits,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Connect to the server named in the config
    ///
    /// Tries every resolved address in turn and applies the configured
    /// socket deadlines.
    pub fn open(config: &SessionConfig) -> Result<Self> {
        let addr = config.server_addr();
        let mut last_error = None;

        for candidate in addr.to_socket_addrs()? {
            match TcpStream::connect_timeout(&candidate, config.connect_timeout()) {
                Ok(stream) => {
                    return Self::from_stream(
                        stream,
                        FrameLimits {
                            max_line_len: config.max_line_len,
                            max_reply_lines: config.max_reply_lines,
                        },
                        config,
                    );
                }
                Err(e) => {
                    tracing::debug!("Connect to {} failed: {}", candidate, e);
                    last_error = Some(e);
                }
            }
        }

        Err(GlsError::Transport(last_error.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} did not resolve to any address", addr),
            )
        })))
    }

    fn from_stream(stream: TcpStream, limits: FrameLimits, config: &SessionConfig) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Every command is one short line; do not let Nagle hold it back
        stream.set_nodelay(true)?;
        stream.set_read_timeout(config.read_timeout())?;
        stream.set_write_timeout(config.write_timeout())?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            limits,
            peer_addr,
        })
    }

    /// Read one line the server sent unprompted (the version greeting)
    pub fn read_line(&mut self) -> Result<Option<String>> {
        let line = read_line(&mut self.reader, self.limits.max_line_len)?;
        if let Some(line) = &line {
            tracing::debug!("Received {:?} from {}", line, self.peer_addr);
        }
        Ok(line)
    }

    /// Send a command without waiting for a reply
    pub fn send(&mut self, command: &Command) -> Result<()> {
        tracing::debug!("Sending {} to {}", command.redacted(), self.peer_addr);
        write_command(&mut self.writer, command)
    }

    /// Send a command and read back its complete reply
    pub fn request(&mut self, command: &Command) -> Result<Reply> {
        self.send(command)?;
        let reply = read_reply(&mut self.reader, command, self.limits)?;
        tracing::debug!("Received {:?} from {}", reply, self.peer_addr);
        Ok(reply)
    }

    /// Close both directions of the socket
    pub fn shutdown(self) {
        if let Err(e) = self.writer.get_ref().shutdown(Shutdown::Both) {
            // Already closed by the peer
            tracing::trace!("Shutdown of {} reported: {}", self.peer_addr, e);
        }
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}
