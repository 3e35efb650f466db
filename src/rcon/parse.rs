//! Lenient parsers for the free-text replies the Minecraft console sends back.
//! None of these fail: a reply without the expected delimiter is simply "no data".

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

pub const FINGERPRINT_UNPARSABLE: &str = "<unparsable fingerprint>";
pub const FINGERPRINT_UNAVAILABLE: &str = "<failed to retrieve fingerprint>";

static FINGERPRINT_RE: Lazy<Regex> = Lazy::new(|| {
    // Trailing hex run after the last " - ".
    Regex::new(r"-\s*([0-9A-Fa-f]+)\s*$").expect("static fingerprint regex")
});

/// Outcome of the fingerprint query. `Display` renders the two failure cases as sentinels
/// that can never be mistaken for a real fingerprint, which is hex digits only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fingerprint {
    Hex(String),
    Unparsable,
    Unavailable,
}

impl Fingerprint {
    pub fn as_hex(&self) -> Option<&str> {
        match self {
            Fingerprint::Hex(h) => Some(h),
            _ => None,
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fingerprint::Hex(h) => f.write_str(h),
            Fingerprint::Unparsable => f.write_str(FINGERPRINT_UNPARSABLE),
            Fingerprint::Unavailable => f.write_str(FINGERPRINT_UNAVAILABLE),
        }
    }
}

/// Drop `§x` formatting codes some servers and mods colour their output with.
pub fn strip_formatting(reply: &str) -> String {
    let mut out = String::with_capacity(reply.len());
    let mut chars = reply.chars();
    while let Some(c) = chars.next() {
        if c == '§' {
            chars.next();
            continue;
        }
        out.push(c);
    }
    out
}

/// `"There are 2/20 players online: Alice, Bob"` → `["Alice", "Bob"]`.
pub fn parse_player_list(reply: &str) -> Vec<String> {
    let clean = strip_formatting(reply);
    let Some((_, names)) = clean.split_once(':') else { return Vec::new() };
    names
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect()
}

/// `"Certificate fingerprint - 00112233"` → `Some("00112233")`, lowercased.
pub fn parse_fingerprint(reply: &str) -> Option<String> {
    let clean = strip_formatting(reply);
    FINGERPRINT_RE
        .captures(clean.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
}
