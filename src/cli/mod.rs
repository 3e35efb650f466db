//! Console front end: turns operator lines into inbound commands and renders replies.

use std::collections::BTreeMap;

use crate::gate::{InboundCommand, MemberDirectory, Outcome, Reply};
use crate::identity::Caller;

/// Split a line on whitespace, keeping "double quoted" runs together.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;
    let mut has_token = false;
    for c in line.chars() {
        match c {
            '"' => { in_quotes = !in_quotes; has_token = true; }
            c if c.is_whitespace() && !in_quotes => {
                if has_token { out.push(std::mem::take(&mut cur)); has_token = false; }
            }
            c => { cur.push(c); has_token = true; }
        }
    }
    if has_token { out.push(cur); }
    out
}

/// Parse an operator line into a command for `caller`. Blank lines yield `None`.
pub fn parse_line(caller: &Caller, line: &str) -> Option<InboundCommand> {
    let mut tokens = tokenize(line).into_iter();
    let name = tokens.next()?;
    Some(InboundCommand::new(caller.clone(), name, tokens.collect()))
}

pub fn render_reply(reply: &Reply) -> String {
    let tag = match reply.outcome {
        Outcome::Succeeded => "ok",
        Outcome::Denied => "denied",
        Outcome::Failed => "failed",
    };
    let vis = if reply.ephemeral { " (only you can see this)" } else { "" };
    format!("[{tag}]{vis} {}", reply.text)
}

/// Member names from the config `members` map; unknown ids resolve to themselves so the
/// console can still grant to any id.
pub struct ConsoleDirectory {
    members: BTreeMap<String, String>,
}

impl ConsoleDirectory {
    pub fn new(members: BTreeMap<String, String>) -> Self { Self { members } }
}

impl MemberDirectory for ConsoleDirectory {
    fn display_name(&self, user_id: &str) -> Option<String> {
        Some(self.members.get(user_id).cloned().unwrap_or_else(|| user_id.to_string()))
    }
}
