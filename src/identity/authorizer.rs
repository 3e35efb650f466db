use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Admin role stored per identity. Closed set: there is no path from `Delegate` to `Root`
/// inside the process; root entries are written to the store file by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Root,
    Delegate,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Root => "root",
            Role::Delegate => "delegate",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Role {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "root" => Ok(Role::Root),
            "delegate" => Ok(Role::Delegate),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// What a command demands of its caller before it may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    /// Anyone may run it.
    Open,
    /// Caller must have any admin record.
    Admin,
    /// Caller must be an admin with the root role.
    Grant,
}

/// Map a command name to the privilege gate it sits behind. Unknown names are treated as
/// admin-only so a newly added command never starts out open by accident.
pub fn required_privilege(command: &str) -> Privilege {
    match command {
        "online" | "fingerprint" | "echo" | "help" => Privilege::Open,
        "allow" | "allowed" | "am-i-admin" => Privilege::Admin,
        "make-admin" => Privilege::Grant,
        _ => Privilege::Admin,
    }
}
