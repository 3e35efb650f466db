use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Online,
    Fingerprint,
    Allow,
    Allowed,
    MakeAdmin,
    AmIAdmin,
    Echo,
    Help,
}

const ALL: [CommandKind; 8] = [
    CommandKind::Online,
    CommandKind::Fingerprint,
    CommandKind::Allow,
    CommandKind::Allowed,
    CommandKind::MakeAdmin,
    CommandKind::AmIAdmin,
    CommandKind::Echo,
    CommandKind::Help,
];

impl CommandKind {
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().trim_start_matches('/');
        ALL.into_iter().find(|k| k.name().eq_ignore_ascii_case(name))
    }

    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::Online => "online",
            CommandKind::Fingerprint => "fingerprint",
            CommandKind::Allow => "allow",
            CommandKind::Allowed => "allowed",
            CommandKind::MakeAdmin => "make-admin",
            CommandKind::AmIAdmin => "am-i-admin",
            CommandKind::Echo => "echo",
            CommandKind::Help => "help",
        }
    }

    pub fn usage(&self) -> &'static str {
        match self {
            CommandKind::Online => "online",
            CommandKind::Fingerprint => "fingerprint",
            CommandKind::Allow => "allow <username>",
            CommandKind::Allowed => "allowed",
            CommandKind::MakeAdmin => "make-admin <@user>",
            CommandKind::AmIAdmin => "am-i-admin",
            CommandKind::Echo => "echo <message>",
            CommandKind::Help => "help",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CommandKind::Online => "List online players.",
            CommandKind::Fingerprint => "Retrieve the server automodpack fingerprint.",
            CommandKind::Allow => "Add a player to the server allow-list.",
            CommandKind::Allowed => "Show the server allow-list.",
            CommandKind::MakeAdmin => "Add user to admins list.",
            CommandKind::AmIAdmin => "Check whether you're an admin.",
            CommandKind::Echo => "Repeats a message you provide.",
            CommandKind::Help => "Show this list.",
        }
    }
}

pub(super) fn usage(kind: CommandKind) -> AppError {
    AppError::user("usage".to_string(), format!("Usage: {}", kind.usage()))
}

pub(super) fn single_arg(kind: CommandKind, args: &[String]) -> Result<&str, AppError> {
    match args {
        [one] if !one.trim().is_empty() => Ok(one.trim()),
        _ => Err(usage(kind)),
    }
}

/// Player names go straight into a console command line, so nothing that could split or
/// extend that line is let through.
pub(super) fn validate_username(name: &str) -> Result<(), AppError> {
    let ok = !name.is_empty()
        && name.chars().count() <= 32
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(AppError::user("bad_username".to_string(), format!("'{name}' is not a valid player name.")))
    }
}

/// `<@123>`, `<@!123>` or a bare numeric id → `"123"`.
pub fn parse_mention(raw: &str) -> Option<String> {
    let s = raw.trim();
    let inner = match s.strip_prefix("<@").and_then(|r| r.strip_suffix('>')) {
        Some(rest) => rest.strip_prefix('!').unwrap_or(rest),
        None => s,
    };
    if !inner.is_empty() && inner.chars().all(|c| c.is_ascii_digit()) {
        Some(inner.to_string())
    } else {
        None
    }
}

pub(super) fn help_text() -> String {
    let mut out = String::from("**Commands:**");
    for k in ALL {
        out.push_str(&format!("\n`{}` - {}", k.usage(), k.description()));
    }
    out
}
