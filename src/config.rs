//! Configuration for a GLS session
//!
//! Connection parameters plus transport limits, with sensible defaults.

use std::fmt;
use std::time::Duration;

use crate::error::{GlsError, Result};

/// Parameters for one protocol session
#[derive(Clone)]
pub struct SessionConfig {
    // -------------------------------------------------------------------------
    // Server
    // -------------------------------------------------------------------------
    /// Hostname or IP address of the GLS server
    pub host: String,

    /// Port the GLS server is listening on
    pub port: u16,

    /// Protocol version requested during the handshake
    pub protocol_version: String,

    // -------------------------------------------------------------------------
    // Identity
    // -------------------------------------------------------------------------
    /// Name used to log in
    pub client_name: String,

    /// Optional login password (never logged)
    pub password: Option<String>,

    /// Name of the GPS device registered for the session
    pub device_name: String,

    /// Group used by `Session::join_configured_group`
    pub group_name: String,

    // -------------------------------------------------------------------------
    // Transport
    // -------------------------------------------------------------------------
    /// Connect timeout (milliseconds)
    pub connect_timeout_ms: u64,

    /// Socket read timeout (milliseconds, 0 disables)
    pub read_timeout_ms: u64,

    /// Socket write timeout (milliseconds, 0 disables)
    pub write_timeout_ms: u64,

    /// Longest accepted reply line in bytes, terminator included
    pub max_line_len: usize,

    /// Most lines accepted in one multi-line reply
    pub max_reply_lines: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 47757,
            protocol_version: crate::PROTOCOL_VERSION.to_string(),
            client_name: String::new(),
            password: None,
            device_name: String::new(),
            group_name: String::new(),
            connect_timeout_ms: 5000,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
            max_line_len: 1024,
            max_reply_lines: 10_000,
        }
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("SessionConfig");
        dbg.field("host", &self.host)
            .field("port", &self.port)
            .field("protocol_version", &self.protocol_version)
            .field("client_name", &self.client_name);
        if let Some(password) = &self.password {
            dbg.field(
                "password",
                &format_args!("<redacted:{} bytes>", password.len()),
            );
        } else {
            dbg.field("password", &Option::<String>::None);
        }
        dbg.field("device_name", &self.device_name)
            .field("group_name", &self.group_name)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("read_timeout_ms", &self.read_timeout_ms)
            .field("write_timeout_ms", &self.write_timeout_ms)
            .field("max_line_len", &self.max_line_len)
            .field("max_reply_lines", &self.max_reply_lines)
            .finish()
    }
}

impl SessionConfig {
    /// Create a new config builder
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// `host:port` as passed to the resolver
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout_ms > 0).then(|| Duration::from_millis(self.read_timeout_ms))
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        (self.write_timeout_ms > 0).then(|| Duration::from_millis(self.write_timeout_ms))
    }

    /// Check the parameters before any connection attempt
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(GlsError::Config("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(GlsError::Config("port must not be 0".to_string()));
        }
        if self.connect_timeout_ms == 0 {
            return Err(GlsError::Config(
                "connect timeout must be greater than 0".to_string(),
            ));
        }
        if self.max_line_len < 2 {
            return Err(GlsError::Config(format!(
                "max line length {} cannot hold a tagged line",
                self.max_line_len
            )));
        }
        if self.max_reply_lines == 0 {
            return Err(GlsError::Config(
                "max reply lines must be greater than 0".to_string(),
            ));
        }

        require_word("protocol version", &self.protocol_version, true)?;
        require_word("client name", &self.client_name, true)?;
        require_word("device name", &self.device_name, true)?;
        require_word("group name", &self.group_name, false)?;
        if let Some(password) = &self.password {
            require_word("password", password, false)?;
        }

        Ok(())
    }
}

/// A config value travels inside one command argument
fn require_word(what: &str, value: &str, required: bool) -> Result<()> {
    if required && value.is_empty() {
        return Err(GlsError::Config(format!("{} must not be empty", what)));
    }
    if value.contains(|c: char| matches!(c, ',' | '\n' | '\r')) {
        return Err(GlsError::Config(format!(
            "{} must not contain ',' or line breaks",
            what
        )));
    }
    Ok(())
}

/// Builder for SessionConfig
#[derive(Default)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    /// Set the server host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the protocol version to negotiate
    pub fn protocol_version(mut self, version: impl Into<String>) -> Self {
        self.config.protocol_version = version.into();
        self
    }

    /// Set the login name
    pub fn client_name(mut self, name: impl Into<String>) -> Self {
        self.config.client_name = name.into();
        self
    }

    /// Set or clear the login password
    pub fn password(mut self, password: Option<String>) -> Self {
        self.config.password = password;
        self
    }

    /// Set the device name
    pub fn device_name(mut self, name: impl Into<String>) -> Self {
        self.config.device_name = name.into();
        self
    }

    /// Set the session's group
    pub fn group_name(mut self, name: impl Into<String>) -> Self {
        self.config.group_name = name.into();
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the longest accepted reply line (in bytes)
    pub fn max_line_len(mut self, len: usize) -> Self {
        self.config.max_line_len = len;
        self
    }

    /// Set the most lines accepted in one multi-line reply
    pub fn max_reply_lines(mut self, count: usize) -> Self {
        self.config.max_reply_lines = count;
        self
    }

    pub fn build(self) -> SessionConfig {
        self.config
    }
}
