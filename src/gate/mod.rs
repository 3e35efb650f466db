//! Command dispatch gate.
//!
//! Every inbound command walks `received → authorizing → denied | executing → succeeded | failed`
//! and produces exactly one private reply. Privileged commands consult the admin store before
//! any console call is made; failures are logged in full and reported to the caller generically.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::error::{AppError, AppResult};
use crate::identity::{required_privilege, AdminStore, Caller, Privilege};
use crate::rcon::{ConsoleReply, Fingerprint, MinecraftConsole};

mod commands;

pub use commands::{parse_mention, CommandKind};

pub const ACCESS_DENIED: &str = "You are not authorized to access this command. Your attempt has been logged.";
pub const GRANT_DENIED: &str = "You are not authorized to make new admins. Your attempt has been logged.";

/// One command as delivered by the chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundCommand {
    pub caller: Caller,
    pub name: String,
    pub args: Vec<String>,
}

impl InboundCommand {
    pub fn new(caller: Caller, name: impl Into<String>, args: Vec<String>) -> Self {
        Self { caller, name: name.into(), args }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Denied,
    Succeeded,
    Failed,
}

/// The single reply an invocation produces. Always private to the invoking caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub ephemeral: bool,
    pub outcome: Outcome,
}

impl Reply {
    fn with(outcome: Outcome, text: impl Into<String>) -> Self {
        Self { text: text.into(), ephemeral: true, outcome }
    }
    pub fn denied(text: impl Into<String>) -> Self { Self::with(Outcome::Denied, text) }
    pub fn succeeded(text: impl Into<String>) -> Self { Self::with(Outcome::Succeeded, text) }
    pub fn failed(text: impl Into<String>) -> Self { Self::with(Outcome::Failed, text) }
}

/// Resolves a member id to a display name. Supplied by the chat platform integration.
pub trait MemberDirectory: Send + Sync {
    fn display_name(&self, user_id: &str) -> Option<String>;
}

pub struct CommandGate {
    admins: Arc<AdminStore>,
    console: MinecraftConsole,
    directory: Arc<dyn MemberDirectory>,
}

impl CommandGate {
    pub fn new(admins: Arc<AdminStore>, console: MinecraftConsole, directory: Arc<dyn MemberDirectory>) -> Self {
        Self { admins, console, directory }
    }

    pub fn admins(&self) -> &AdminStore { &self.admins }

    pub async fn handle(&self, cmd: &InboundCommand) -> Reply {
        let Some(kind) = CommandKind::from_name(&cmd.name) else {
            return Reply::failed(format!("Unknown command: {}. Try `help`.", cmd.name));
        };
        if let Err(e) = self.authorize(&cmd.caller, kind) {
            return Reply::denied(e.reply_text());
        }
        match self.execute(kind, cmd).await {
            Ok(reply) => reply,
            Err(e) => {
                match &e {
                    AppError::UserInput { .. } => {
                        debug!(target: "minecord::gate", "{} rejected input from {}: {}", kind.name(), cmd.caller, e)
                    }
                    _ => error!(
                        target: "minecord::gate",
                        caller_id = %cmd.caller.user_id,
                        command = kind.name(),
                        "{} failed for {}: {}", kind.name(), cmd.caller, e
                    ),
                }
                Reply::failed(e.reply_text())
            }
        }
    }

    fn authorize(&self, caller: &Caller, kind: CommandKind) -> AppResult<()> {
        let privilege = required_privilege(kind.name());
        if privilege == Privilege::Open {
            return Ok(());
        }
        debug!(target: "minecord::gate", "Checking for authorization: {}", caller);
        if !self.admins.is_authorized(&caller.user_id) {
            warn!(
                target: "minecord::gate",
                caller_id = %caller.user_id,
                command = kind.name(),
                "DENIED: {} was denied to user: {}", kind.name(), caller
            );
            return Err(AppError::denied("not_admin", ACCESS_DENIED));
        }
        if privilege == Privilege::Grant && !self.admins.can_grant(&caller.user_id) {
            warn!(
                target: "minecord::gate",
                caller_id = %caller.user_id,
                command = kind.name(),
                "DENIED: {} was denied to user: {}", kind.name(), caller
            );
            return Err(AppError::denied("not_root", GRANT_DENIED));
        }
        Ok(())
    }

    async fn execute(&self, kind: CommandKind, cmd: &InboundCommand) -> AppResult<Reply> {
        match kind {
            CommandKind::Online => {
                let players = self.console.fetch_players().await?;
                if players.is_empty() {
                    Ok(Reply::succeeded("No players are currently online."))
                } else {
                    Ok(Reply::succeeded(format!(
                        "**Online players ({}):** {}",
                        players.len(),
                        players.join(", ")
                    )))
                }
            }
            CommandKind::Fingerprint => match self.console.fetch_fingerprint().await {
                Fingerprint::Unavailable => Err(AppError::session("rcon_unavailable", "fingerprint query failed")),
                fp => Ok(Reply::succeeded(format!("**Automodpack fingerprint:** ```{fp}```"))),
            },
            CommandKind::Allow => {
                let username = commands::single_arg(kind, &cmd.args)?;
                commands::validate_username(username)?;
                Ok(console_reply(self.console.allow_player(username).await))
            }
            CommandKind::Allowed => Ok(console_reply(self.console.allowed_players().await)),
            CommandKind::MakeAdmin => self.make_admin(cmd).await,
            CommandKind::AmIAdmin => Ok(Reply::succeeded("You **are** an admin (here on Discord)! 🎉")),
            CommandKind::Echo => {
                if cmd.args.is_empty() {
                    return Err(commands::usage(kind));
                }
                Ok(Reply::succeeded(format!("You said: {}", cmd.args.join(" "))))
            }
            CommandKind::Help => Ok(Reply::succeeded(commands::help_text())),
        }
    }

    async fn make_admin(&self, cmd: &InboundCommand) -> AppResult<Reply> {
        let mention = commands::single_arg(CommandKind::MakeAdmin, &cmd.args)?;
        let target_id = parse_mention(mention)
            .ok_or_else(|| AppError::user("bad_mention".to_string(), format!("'{mention}' is not a user mention.")))?;
        let Some(target_name) = self.directory.display_name(&target_id) else {
            return Err(AppError::user("unknown_user".to_string(), format!("Could not find user {mention}.")));
        };
        let store = Arc::clone(&self.admins);
        let (id, name) = (target_id.clone(), target_name.clone());
        let created = tokio::task::spawn_blocking(move || store.grant(&id, &name))
            .await
            .map_err(|e| AppError::internal("grant_task".to_string(), format!("grant task did not complete: {e}")))??;
        if created {
            info!(
                target: "minecord::gate",
                "{} granted delegate admin to {} ({})", cmd.caller, target_name, target_id
            );
            Ok(Reply::succeeded(format!("{target_name} is now an admin on Discord (not a Minecraft op)! 🎉")))
        } else {
            Ok(Reply::succeeded(format!("{target_name} is already an admin.")))
        }
    }
}

fn console_reply(reply: ConsoleReply) -> Reply {
    match reply {
        ConsoleReply::Applied(text) if text.trim().is_empty() => Reply::succeeded("(the server sent an empty reply)"),
        ConsoleReply::Applied(text) => Reply::succeeded(text),
        ConsoleReply::Failed(text) => Reply::failed(text),
    }
}
