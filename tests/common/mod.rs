//! In-process mock RCON server for integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use minecord::rcon::{
    read_packet, write_packet, Packet, AUTH_FAILED_ID, PACKET_AUTH_RESPONSE, PACKET_RESPONSE, REPLY_CHUNK,
};

pub const PASSWORD: &str = "letmein";

type Handler = dyn Fn(&str) -> Option<String> + Send + Sync;

/// Answers each command with `handler(command)`; `None` drops the connection instead.
/// Like a real server, replies longer than `REPLY_CHUNK` bytes go out as several packets and
/// an empty command is echoed back with an empty body.
pub struct MockRcon {
    pub port: u16,
    pub commands: Arc<Mutex<Vec<String>>>,
    pub connections: Arc<AtomicUsize>,
    pub closed: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl Drop for MockRcon {
    fn drop(&mut self) { self.handle.abort(); }
}

impl MockRcon {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await.expect("bind 127.0.0.1:0");
        let port = listener.local_addr().unwrap().port();
        let commands = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));
        let closed = Arc::new(AtomicUsize::new(0));
        let handler: Arc<Handler> = Arc::new(handler);

        let (cmds, conns, done) = (commands.clone(), connections.clone(), closed.clone());
        let handle = tokio::spawn(async move {
            loop {
                let Ok((mut sock, _)) = listener.accept().await else { return };
                conns.fetch_add(1, Ordering::SeqCst);
                let (cmds, done, handler) = (cmds.clone(), done.clone(), handler.clone());
                tokio::spawn(async move {
                    serve(&mut sock, &cmds, handler.as_ref()).await;
                    done.fetch_add(1, Ordering::SeqCst);
                });
            }
        });
        Self { port, commands, connections, closed, handle }
    }

    pub fn commands(&self) -> Vec<String> { self.commands.lock().clone() }

    pub fn connection_count(&self) -> usize { self.connections.load(Ordering::SeqCst) }

    /// Wait until every accepted connection has been closed by the client.
    pub async fn wait_all_closed(&self) {
        let deadline = std::time::Instant::now() + Duration::from_secs(3);
        loop {
            let opened = self.connections.load(Ordering::SeqCst);
            if opened > 0 && self.closed.load(Ordering::SeqCst) == opened { return; }
            if std::time::Instant::now() >= deadline {
                panic!("connections still open: opened={} closed={}", opened, self.closed.load(Ordering::SeqCst));
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

async fn serve(sock: &mut tokio::net::TcpStream, cmds: &Mutex<Vec<String>>, handler: &Handler) {
    let Ok(login) = read_packet(sock).await else { return };
    if login.body != PASSWORD {
        let _ = write_packet(sock, &Packet::new(AUTH_FAILED_ID, PACKET_AUTH_RESPONSE, "")).await;
        // Hold the socket until the client gives up so the close is observed from its side.
        let _ = read_packet(sock).await;
        return;
    }
    if write_packet(sock, &Packet::new(login.request_id, PACKET_AUTH_RESPONSE, "")).await.is_err() {
        return;
    }
    while let Ok(req) = read_packet(sock).await {
        if req.body.is_empty() {
            if write_packet(sock, &Packet::new(req.request_id, PACKET_RESPONSE, "")).await.is_err() {
                return;
            }
            continue;
        }
        cmds.lock().push(req.body.clone());
        let Some(reply) = handler(&req.body) else { return };
        if send_reply(sock, req.request_id, &reply).await.is_err() {
            return;
        }
    }
}

/// Test replies are ASCII, so byte chunks are valid strings.
async fn send_reply(sock: &mut tokio::net::TcpStream, id: i32, reply: &str) -> Result<(), minecord::rcon::SessionError> {
    if reply.is_empty() {
        return write_packet(sock, &Packet::new(id, PACKET_RESPONSE, "")).await;
    }
    for chunk in reply.as_bytes().chunks(REPLY_CHUNK) {
        let body = String::from_utf8_lossy(chunk).into_owned();
        write_packet(sock, &Packet::new(id, PACKET_RESPONSE, body)).await?;
    }
    Ok(())
}

/// A localhost port with nothing listening on it.
pub fn closed_port() -> u16 {
    let l = std::net::TcpListener::bind(("127.0.0.1", 0)).unwrap();
    l.local_addr().unwrap().port()
}

/// Replies the way a vanilla server with two players and automodpack installed would.
pub fn vanilla(command: &str) -> Option<String> {
    let reply = match command {
        "list" => "There are 2/20 players online: Alice, Bob".to_string(),
        "automodpack host fingerprint" => "Certificate fingerprint - 00112233".to_string(),
        "whitelist list" => "There are 2 whitelisted player(s): Alice, Bob".to_string(),
        c if c.starts_with("whitelist add ") => format!("Added {} to the whitelist", &c["whitelist add ".len()..]),
        other => format!("Unknown or incomplete command: {other}"),
    };
    Some(reply)
}
