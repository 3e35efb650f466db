//! One authenticated RCON connection, scoped to a single command.
//!
//! A `ConsoleSession` is never kept between operations: `run_once` opens it, sends one
//! command, reads the whole reply and releases it on every exit path. Dropping the session closes
//! the socket, so an early `?` return never leaks the connection.

use std::fmt;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::debug;

use super::packet::{
    decode_body, read_packet, read_raw_packet, write_packet, Packet, AUTH_FAILED_ID, PACKET_AUTH_RESPONSE,
    PACKET_COMMAND, PACKET_LOGIN,
};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("RCON password is required")]
    MissingPassword,
    #[error("could not connect to {addr}: {source}")]
    Connect { addr: String, source: std::io::Error },
    #[error("RCON authentication rejected by server")]
    AuthRejected,
    #[error("RCON transport error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RCON protocol error: {0}")]
    Protocol(String),
}

/// Where and how to reach the console. The password is guaranteed non-empty.
#[derive(Clone)]
pub struct ConsoleTarget {
    host: String,
    port: u16,
    password: String,
}

impl ConsoleTarget {
    pub fn new(host: impl Into<String>, port: u16, password: Option<String>) -> Result<Self, SessionError> {
        let password = password.filter(|p| !p.is_empty()).ok_or(SessionError::MissingPassword)?;
        Ok(Self { host: host.into(), port, password })
    }

    pub fn host(&self) -> &str { &self.host }
    pub fn port(&self) -> u16 { self.port }
    pub fn addr(&self) -> String { format!("{}:{}", self.host, self.port) }
}

impl fmt::Debug for ConsoleTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleTarget")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &"<redacted>")
            .finish()
    }
}

pub struct ConsoleSession {
    stream: TcpStream,
    next_id: i32,
}

impl ConsoleSession {
    /// Connect and authenticate.
    pub async fn open(target: &ConsoleTarget) -> Result<Self, SessionError> {
        let addr = target.addr();
        let stream = TcpStream::connect((target.host.as_str(), target.port))
            .await
            .map_err(|source| SessionError::Connect { addr: addr.clone(), source })?;
        let mut session = Self { stream, next_id: 1 };
        session.login(&target.password).await?;
        debug!(target: "minecord::rcon", "session authenticated to {}", addr);
        Ok(session)
    }

    fn take_id(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    async fn login(&mut self, password: &str) -> Result<(), SessionError> {
        let id = self.take_id();
        write_packet(&mut self.stream, &Packet::new(id, PACKET_LOGIN, password)).await?;
        // Some servers send an empty response value ahead of the auth response.
        for _ in 0..2 {
            let reply = read_packet(&mut self.stream).await?;
            if reply.kind != PACKET_AUTH_RESPONSE {
                continue;
            }
            if reply.request_id == AUTH_FAILED_ID {
                return Err(SessionError::AuthRejected);
            }
            if reply.request_id != id {
                return Err(SessionError::Protocol(format!(
                    "auth response id {} does not match request {}",
                    reply.request_id, id
                )));
            }
            return Ok(());
        }
        Err(SessionError::Protocol("no auth response from server".into()))
    }

    /// Send one command and read back its full reply.
    ///
    /// Long replies arrive as several packets carrying the command's id. An empty command
    /// with a second id follows the real one; the server answers in order, so its echo marks
    /// the end of the reply.
    pub async fn execute(&mut self, command: &str) -> Result<String, SessionError> {
        let id = self.take_id();
        let end_id = self.take_id();
        write_packet(&mut self.stream, &Packet::new(id, PACKET_COMMAND, command)).await?;
        write_packet(&mut self.stream, &Packet::new(end_id, PACKET_COMMAND, "")).await?;
        let mut body = Vec::new();
        let mut packets = 0usize;
        loop {
            let reply = read_raw_packet(&mut self.stream).await?;
            match reply.request_id {
                AUTH_FAILED_ID => return Err(SessionError::AuthRejected),
                rid if rid == end_id => break,
                rid if rid == id => {
                    packets += 1;
                    body.extend_from_slice(&reply.body);
                }
                rid => {
                    return Err(SessionError::Protocol(format!("reply id {rid} does not match request {id}")));
                }
            }
        }
        if packets > 1 {
            debug!(target: "minecord::rcon", "reply to '{}' arrived in {} packets ({} bytes)", command, packets, body.len());
        }
        Ok(decode_body(&body))
    }

    pub async fn close(mut self) {
        let _ = self.stream.shutdown().await;
    }
}

/// Open a session, run `command`, and release the session whatever the outcome.
pub async fn run_once(target: &ConsoleTarget, command: &str) -> Result<String, SessionError> {
    let mut session = ConsoleSession::open(target).await?;
    let result = session.execute(command).await;
    session.close().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_or_missing_password_is_rejected() {
        assert!(matches!(ConsoleTarget::new("localhost", 25575, None), Err(SessionError::MissingPassword)));
        assert!(matches!(
            ConsoleTarget::new("localhost", 25575, Some(String::new())),
            Err(SessionError::MissingPassword)
        ));
        assert!(ConsoleTarget::new("localhost", 25575, Some("pw".into())).is_ok());
    }

    #[test]
    fn debug_output_hides_password() {
        let t = ConsoleTarget::new("mc.example", 25575, Some("hunter2".into())).unwrap();
        let dbg = format!("{t:?}");
        assert!(dbg.contains("mc.example"));
        assert!(!dbg.contains("hunter2"));
    }
}
