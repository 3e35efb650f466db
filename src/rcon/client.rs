use tracing::{debug, error};

use super::parse::{parse_fingerprint, parse_player_list, Fingerprint};
use super::session::{run_once, ConsoleTarget, SessionError};

pub const CMD_LIST: &str = "list";
pub const CMD_FINGERPRINT: &str = "automodpack host fingerprint";
pub const CMD_WHITELIST_LIST: &str = "whitelist list";

pub fn whitelist_add_command(username: &str) -> String {
    format!("whitelist add {username}")
}

/// Result of a pass-through console command. Success means the session delivered the command
/// and a reply came back; the reply text itself is never inspected to decide this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleReply {
    Applied(String),
    Failed(String),
}

impl ConsoleReply {
    pub fn is_success(&self) -> bool { matches!(self, ConsoleReply::Applied(_)) }

    pub fn text(&self) -> &str {
        match self {
            ConsoleReply::Applied(t) | ConsoleReply::Failed(t) => t,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            ConsoleReply::Applied(t) | ConsoleReply::Failed(t) => t,
        }
    }
}

/// Minecraft remote console client. Holds only connection settings; every call opens and
/// releases its own session, so one client can be shared freely between tasks.
#[derive(Debug, Clone)]
pub struct MinecraftConsole {
    target: ConsoleTarget,
}

impl MinecraftConsole {
    /// Fails with `SessionError::MissingPassword` when no password is configured.
    pub fn new(host: impl Into<String>, port: u16, password: Option<String>) -> Result<Self, SessionError> {
        Ok(Self { target: ConsoleTarget::new(host, port, password)? })
    }

    pub fn target(&self) -> &ConsoleTarget { &self.target }

    /// Run a single raw command.
    pub async fn execute(&self, command: &str) -> Result<String, SessionError> {
        debug!(target: "minecord::rcon", "executing '{}' on {}", command, self.target.addr());
        match run_once(&self.target, command).await {
            Ok(reply) => Ok(reply),
            Err(e) => {
                error!(target: "minecord::rcon", "RCON Error: Failed to execute command '{}'. Reason: {}", command, e);
                Err(e)
            }
        }
    }

    /// Online players, keeping session failures distinct from an empty server.
    pub async fn fetch_players(&self) -> Result<Vec<String>, SessionError> {
        let reply = self.execute(CMD_LIST).await?;
        Ok(parse_player_list(&reply))
    }

    /// Online players; empty both when nobody is online and when the session failed.
    pub async fn list_players(&self) -> Vec<String> {
        self.fetch_players().await.unwrap_or_default()
    }

    pub async fn fetch_fingerprint(&self) -> Fingerprint {
        match self.execute(CMD_FINGERPRINT).await {
            Ok(reply) => parse_fingerprint(&reply).map(Fingerprint::Hex).unwrap_or(Fingerprint::Unparsable),
            Err(_) => Fingerprint::Unavailable,
        }
    }

    pub async fn get_fingerprint(&self) -> String {
        self.fetch_fingerprint().await.to_string()
    }

    pub async fn allow_player(&self, username: &str) -> ConsoleReply {
        match self.execute(&whitelist_add_command(username)).await {
            Ok(reply) => ConsoleReply::Applied(reply),
            Err(_) => ConsoleReply::Failed(format!(
                "Failed to add {username} to the allow-list: could not reach the Minecraft server."
            )),
        }
    }

    pub async fn allow(&self, username: &str) -> String {
        self.allow_player(username).await.into_text()
    }

    pub async fn allowed_players(&self) -> ConsoleReply {
        match self.execute(CMD_WHITELIST_LIST).await {
            Ok(reply) => ConsoleReply::Applied(reply),
            Err(_) => ConsoleReply::Failed(
                "Failed to retrieve the allow-list: could not reach the Minecraft server.".to_string(),
            ),
        }
    }

    pub async fn list_allowed(&self) -> String {
        self.allowed_players().await.into_text()
    }
}
