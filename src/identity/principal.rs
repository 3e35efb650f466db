use serde::{Deserialize, Serialize};

/// The human behind an inbound command, as reported by the chat platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    #[serde(default)]
    pub display_name: String,
}

impl Caller {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), display_name: display_name.into() }
    }
}

impl std::fmt::Display for Caller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.display_name, self.user_id)
    }
}
