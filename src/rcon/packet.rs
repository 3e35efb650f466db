//! RCON packet framing.
//!
//! Every packet is `i32 length | i32 request id | i32 type | body | 0x00 0x00`, all integers
//! little-endian, where `length` counts everything after itself.

use std::borrow::Cow;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use super::session::SessionError;

pub const PACKET_LOGIN: i32 = 3;
pub const PACKET_COMMAND: i32 = 2;
pub const PACKET_AUTH_RESPONSE: i32 = 2;
pub const PACKET_RESPONSE: i32 = 0;

/// Request id the server answers a login with when the password is wrong.
pub const AUTH_FAILED_ID: i32 = -1;

/// Largest command body a Minecraft server accepts.
pub const MAX_OUTGOING_BODY: usize = 1446;
/// Upper bound on an inbound packet's declared length.
pub const MAX_INBOUND_LEN: usize = 64 * 1024;
/// Minecraft splits reply bodies longer than this across several response packets.
pub const REPLY_CHUNK: usize = 4096;
/// id + type + two trailing nulls.
const MIN_PACKET_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub request_id: i32,
    pub kind: i32,
    pub body: String,
}

impl Packet {
    pub fn new(request_id: i32, kind: i32, body: impl Into<String>) -> Self {
        Self { request_id, kind, body: body.into() }
    }

    pub fn encode(&self) -> Vec<u8> {
        let body = self.body.as_bytes();
        let len = (MIN_PACKET_LEN + body.len()) as i32;
        let mut out = Vec::with_capacity(4 + MIN_PACKET_LEN + body.len());
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&self.request_id.to_le_bytes());
        out.extend_from_slice(&self.kind.to_le_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(&[0, 0]);
        out
    }
}

pub async fn write_packet<W: AsyncWrite + Unpin>(w: &mut W, packet: &Packet) -> Result<(), SessionError> {
    if packet.body.len() > MAX_OUTGOING_BODY {
        return Err(SessionError::Protocol(format!(
            "command too long: {} bytes (max {})",
            packet.body.len(),
            MAX_OUTGOING_BODY
        )));
    }
    w.write_all(&packet.encode()).await?;
    w.flush().await?;
    Ok(())
}

/// A packet as read off the wire, body still undecoded. Multi-packet replies are joined at
/// this level so a character split between two packets survives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPacket {
    pub request_id: i32,
    pub kind: i32,
    pub body: Vec<u8>,
}

pub async fn read_raw_packet<R: AsyncRead + Unpin>(r: &mut R) -> Result<RawPacket, SessionError> {
    let len = r.read_i32_le().await?;
    if len < MIN_PACKET_LEN as i32 || len as usize > MAX_INBOUND_LEN {
        return Err(SessionError::Protocol(format!("bad packet length {len}")));
    }
    let mut buf = vec![0u8; len as usize];
    r.read_exact(&mut buf).await?;
    let request_id = i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let kind = i32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
    let mut body = buf.split_off(8);
    // Body runs up to the first null; some servers omit the second terminator byte.
    let end = body.iter().position(|b| *b == 0).unwrap_or(body.len());
    body.truncate(end);
    Ok(RawPacket { request_id, kind, body })
}

pub async fn read_packet<R: AsyncRead + Unpin>(r: &mut R) -> Result<Packet, SessionError> {
    let raw = read_raw_packet(r).await?;
    Ok(Packet { request_id: raw.request_id, kind: raw.kind, body: decode_body(&raw.body) })
}

/// Decode a reply body, replacing invalid UTF-8 with U+FFFD.
pub fn decode_body(bytes: &[u8]) -> String {
    match String::from_utf8_lossy(bytes) {
        Cow::Borrowed(s) => s.to_owned(),
        Cow::Owned(s) => {
            debug!(
                target: "minecord::rcon",
                "reply body of {} bytes was not valid UTF-8; invalid sequences replaced", bytes.len()
            );
            s
        }
    }
}
