//! Scripted GLS server for session tests
//!
//! Accepts one connection per script, sends the greeting, then answers each
//! received line with the next scripted reply (written verbatim). Once the
//! script is exhausted it keeps recording lines until the client hangs up.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use glsclient::SessionConfig;

/// Replies accepting version, login and device
pub const HANDSHAKE_OK: [&str; 3] = ["K\n", "K\n", "K\n"];

pub struct ScriptedServer {
    pub port: u16,
    handle: JoinHandle<Vec<Vec<String>>>,
}

impl ScriptedServer {
    /// Serve a single connection
    pub fn start(greeting: &str, replies: &[&str]) -> Self {
        Self::start_many(greeting, vec![replies.to_vec()])
    }

    /// Serve one connection per script, in order
    pub fn start_many(greeting: &str, scripts: Vec<Vec<&str>>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let greeting = greeting.to_string();
        let scripts: Vec<Vec<String>> = scripts
            .into_iter()
            .map(|s| s.into_iter().map(str::to_string).collect())
            .collect();

        let handle = thread::spawn(move || {
            let mut received = Vec::new();
            for script in scripts {
                let (stream, _) = listener.accept().unwrap();
                let mut writer = stream.try_clone().unwrap();
                let mut reader = BufReader::new(stream);
                writer.write_all(greeting.as_bytes()).unwrap();

                let mut lines = Vec::new();
                let mut replies = script.into_iter();
                loop {
                    let mut line = String::new();
                    match reader.read_line(&mut line) {
                        Ok(0) | Err(_) => break,
                        Ok(_) => {}
                    }
                    lines.push(line.trim_end_matches('\n').to_string());
                    if let Some(reply) = replies.next() {
                        if writer.write_all(reply.as_bytes()).is_err() {
                            break;
                        }
                    }
                }
                received.push(lines);
            }
            received
        });

        Self { port, handle }
    }

    /// Config pointing at this server with short deadlines
    pub fn config(&self) -> SessionConfig {
        Self::config_for_port(self.port)
    }

    pub fn config_for_port(port: u16) -> SessionConfig {
        SessionConfig::builder()
            .host("127.0.0.1")
            .port(port)
            .client_name("CathodioN")
            .password(Some("test".to_string()))
            .device_name("DummyDevice")
            .group_name("OpenMoko")
            .read_timeout_ms(500)
            .write_timeout_ms(500)
            .build()
    }

    /// Wait for every scripted connection to close; lines received per connection
    pub fn finish(self) -> Vec<Vec<String>> {
        self.handle.join().unwrap()
    }
}

/// Server that answers a fixed number of lines and then hangs up
///
/// Without a greeting it closes the connection as soon as it is accepted.
pub struct HangupServer {
    pub port: u16,
    handle: JoinHandle<Vec<String>>,
}

impl HangupServer {
    pub fn start(greeting: Option<&str>, replies: &[&str]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let greeting = greeting.map(str::to_string);
        let replies: Vec<String> = replies.iter().map(|r| r.to_string()).collect();

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut writer = stream.try_clone().unwrap();
            let mut reader = BufReader::new(stream);
            if let Some(greeting) = greeting {
                writer.write_all(greeting.as_bytes()).unwrap();
            }

            let mut lines = Vec::new();
            for reply in replies {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap_or(0) == 0 {
                    break;
                }
                lines.push(line.trim_end_matches('\n').to_string());
                writer.write_all(reply.as_bytes()).unwrap();
            }
            lines
        });

        Self { port, handle }
    }

    pub fn config(&self) -> SessionConfig {
        ScriptedServer::config_for_port(self.port)
    }

    /// Wait for the hangup; lines received before it
    pub fn finish(self) -> Vec<String> {
        self.handle.join().unwrap()
    }
}

/// Handshake replies followed by `rest`
pub fn after_handshake<'a>(rest: &[&'a str]) -> Vec<&'a str> {
    let mut replies: Vec<&'a str> = HANDSHAKE_OK.to_vec();
    replies.extend_from_slice(rest);
    replies
}
