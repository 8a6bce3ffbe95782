//! # Server — TCP line-protocol front-end
//!
//! A thin collaborator that exposes the SiltDB [`engine`] to remote clients.
//! The protocol is line-oriented: one command per newline-terminated line,
//! case-insensitive verbs, fields separated by single spaces.
//!
//! ```text
//! PUT <key> <value>   ->  OK                    (value may contain spaces)
//! GET <key>           ->  <value>  or  (nil)
//! DEL <key>           ->  OK
//! COMPACT             ->  OK compaction started (runs on its own thread)
//! anything else       ->  ERR ...
//! ```
//!
//! Each connection gets its own OS thread; the engine's internal
//! reader-writer lock does the rest. A malformed line produces a single
//! `ERR` reply without touching the engine, and the connection stays open.

use anyhow::Result;
use engine::Engine;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use tracing::{error, info};

/// A parsed client command.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Put { key: Vec<u8>, value: Vec<u8> },
    Get { key: Vec<u8> },
    Del { key: Vec<u8> },
    Compact,
}

impl Command {
    /// Parses one protocol line.
    ///
    /// The line is split into at most three fields, so a `PUT` value keeps
    /// any spaces it contains. Errors are the exact `ERR` reply to send.
    pub fn parse(line: &str) -> Result<Command, String> {
        let mut parts = line.splitn(3, ' ');
        let verb = parts.next().unwrap_or("");

        match verb.to_ascii_uppercase().as_str() {
            "PUT" => match (parts.next(), parts.next()) {
                (Some(key), Some(value)) if !key.is_empty() => Ok(Command::Put {
                    key: key.as_bytes().to_vec(),
                    value: value.as_bytes().to_vec(),
                }),
                _ => Err("ERR usage: PUT <key> <value>".to_string()),
            },
            "GET" => match parts.next() {
                Some(key) if !key.is_empty() => Ok(Command::Get {
                    key: key.as_bytes().to_vec(),
                }),
                _ => Err("ERR usage: GET <key>".to_string()),
            },
            "DEL" => match parts.next() {
                Some(key) if !key.is_empty() => Ok(Command::Del {
                    key: key.as_bytes().to_vec(),
                }),
                _ => Err("ERR usage: DEL <key>".to_string()),
            },
            "COMPACT" => Ok(Command::Compact),
            other => Err(format!("ERR unknown command: {}", other)),
        }
    }
}

/// Accepts connections forever, spawning one handler thread per client.
pub fn serve(listener: TcpListener, engine: Arc<Engine>) -> Result<()> {
    info!(addr = %listener.local_addr()?, "listening");

    for conn in listener.incoming() {
        match conn {
            Ok(stream) => {
                let engine = Arc::clone(&engine);
                thread::spawn(move || {
                    let peer = stream
                        .peer_addr()
                        .map(|a| a.to_string())
                        .unwrap_or_else(|_| "?".to_string());
                    if let Err(e) = handle_connection(stream, &engine) {
                        error!(peer = %peer, error = %e, "connection failed");
                    }
                });
            }
            Err(e) => error!(error = %e, "accept failed"),
        }
    }
    Ok(())
}

/// Serves one client until it disconnects.
pub fn handle_connection(stream: TcpStream, engine: &Arc<Engine>) -> Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(()); // client disconnected
        }

        let reply = dispatch(line.trim_end_matches(&['\r', '\n'][..]), engine);
        writer.write_all(reply.as_bytes())?;
        writer.write_all(b"\n")?;
    }
}

/// Executes one line against the engine and renders the reply.
fn dispatch(line: &str, engine: &Arc<Engine>) -> String {
    match Command::parse(line) {
        Ok(Command::Put { key, value }) => match engine.put(key, value) {
            Ok(()) => "OK".to_string(),
            Err(e) => format!("ERR put failed: {}", e),
        },
        Ok(Command::Get { key }) => match engine.get(&key) {
            Ok(Some(value)) => String::from_utf8_lossy(&value).into_owned(),
            Ok(None) => "(nil)".to_string(),
            Err(e) => format!("ERR get failed: {}", e),
        },
        Ok(Command::Del { key }) => match engine.delete(key) {
            Ok(()) => "OK".to_string(),
            Err(e) => format!("ERR del failed: {}", e),
        },
        Ok(Command::Compact) => {
            let engine = Arc::clone(engine);
            thread::spawn(move || {
                if let Err(e) = engine.compact() {
                    error!(error = %e, "compaction failed");
                }
            });
            "OK compaction started".to_string()
        }
        Err(reply) => reply,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbs_are_case_insensitive() {
        assert!(matches!(Command::parse("put k v"), Ok(Command::Put { .. })));
        assert!(matches!(Command::parse("GeT k"), Ok(Command::Get { .. })));
        assert!(matches!(Command::parse("DEL k"), Ok(Command::Del { .. })));
        assert!(matches!(Command::parse("compact"), Ok(Command::Compact)));
    }

    #[test]
    fn put_value_keeps_its_spaces() {
        let cmd = Command::parse("PUT greeting hello wide world").unwrap();
        assert_eq!(
            cmd,
            Command::Put {
                key: b"greeting".to_vec(),
                value: b"hello wide world".to_vec(),
            }
        );
    }

    #[test]
    fn missing_arguments_yield_usage_errors() {
        assert_eq!(Command::parse("PUT k").unwrap_err(), "ERR usage: PUT <key> <value>");
        assert_eq!(Command::parse("GET").unwrap_err(), "ERR usage: GET <key>");
        assert_eq!(Command::parse("DEL").unwrap_err(), "ERR usage: DEL <key>");
    }

    #[test]
    fn unknown_verbs_yield_err() {
        let reply = Command::parse("FLY me to the moon").unwrap_err();
        assert!(reply.starts_with("ERR"));
    }

    #[test]
    fn empty_line_yields_err() {
        assert!(Command::parse("").unwrap_err().starts_with("ERR"));
    }
}
