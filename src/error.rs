//! Unified application error model and mapping helpers.
//! Module-level errors (`SessionError`, `StoreError`, `ConfigError`) convert into `AppError`
//! at the dispatch gate, which maps each variant to the caller-visible reply text.
//! The concrete message stays in the logs; callers only ever see `reply_text()`.

use std::fmt::{Display, Formatter};

use crate::config::ConfigError;
use crate::identity::StoreError;
use crate::rcon::SessionError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    UserInput { code: String, message: String },
    Config { code: String, message: String },
    Session { code: String, message: String },
    Denied { code: String, message: String },
    Persistence { code: String, message: String },
    Internal { code: String, message: String },
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::UserInput { code, .. }
            | AppError::Config { code, .. }
            | AppError::Session { code, .. }
            | AppError::Denied { code, .. }
            | AppError::Persistence { code, .. }
            | AppError::Internal { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::UserInput { message, .. }
            | AppError::Config { message, .. }
            | AppError::Session { message, .. }
            | AppError::Denied { message, .. }
            | AppError::Persistence { message, .. }
            | AppError::Internal { message, .. } => message.as_str(),
        }
    }

    pub fn user<S: Into<String>>(code: S, msg: S) -> Self { AppError::UserInput { code: code.into(), message: msg.into() } }
    pub fn config<S: Into<String>>(code: S, msg: S) -> Self { AppError::Config { code: code.into(), message: msg.into() } }
    pub fn session<S: Into<String>>(code: S, msg: S) -> Self { AppError::Session { code: code.into(), message: msg.into() } }
    pub fn denied<S: Into<String>>(code: S, msg: S) -> Self { AppError::Denied { code: code.into(), message: msg.into() } }
    pub fn persistence<S: Into<String>>(code: S, msg: S) -> Self { AppError::Persistence { code: code.into(), message: msg.into() } }
    pub fn internal<S: Into<String>>(code: S, msg: S) -> Self { AppError::Internal { code: code.into(), message: msg.into() } }

    /// Text shown to the invoking caller. Only `UserInput` and `Denied` carry their own
    /// message through; everything else collapses to a generic notice.
    pub fn reply_text(&self) -> String {
        match self {
            AppError::UserInput { message, .. } => message.clone(),
            AppError::Denied { message, .. } => message.clone(),
            AppError::Session { .. } => {
                "Error: Could not connect to the Minecraft server. \
                 Please check if the server is running and if RCON is enabled and configured correctly."
                    .to_string()
            }
            AppError::Persistence { .. } => "An error occurred in this bot's admins module.".to_string(),
            AppError::Config { .. } | AppError::Internal { .. } => {
                "An unexpected error occurred. The bot operator has been notified.".to_string()
            }
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal { code: "internal_error".into(), message: format!("{err:#}") }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::MissingPassword => AppError::config("rcon_password_missing".to_string(), err.to_string()),
            SessionError::Connect { .. } => AppError::session("rcon_connect".to_string(), err.to_string()),
            SessionError::AuthRejected => AppError::session("rcon_auth_rejected".to_string(), err.to_string()),
            SessionError::Io(_) | SessionError::Protocol(_) => AppError::session("rcon_transport".to_string(), err.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::persistence("admins_persist".to_string(), err.to_string())
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::config("config_error".to_string(), err.to_string())
    }
}
