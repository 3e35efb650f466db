//! Minecraft remote console (RCON) client.
//! Split into wire framing, the per-command session, reply parsing and the typed client.

mod packet;
mod session;
mod parse;
mod client;

pub use packet::{read_packet, write_packet, Packet, AUTH_FAILED_ID, PACKET_AUTH_RESPONSE, PACKET_COMMAND, PACKET_LOGIN, PACKET_RESPONSE, REPLY_CHUNK};
pub use session::{run_once, ConsoleSession, ConsoleTarget, SessionError};
pub use parse::{parse_fingerprint, parse_player_list, strip_formatting, Fingerprint, FINGERPRINT_UNAVAILABLE, FINGERPRINT_UNPARSABLE};
pub use client::{whitelist_add_command, ConsoleReply, MinecraftConsole, CMD_FINGERPRINT, CMD_LIST, CMD_WHITELIST_LIST};
