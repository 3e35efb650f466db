//!
//! minecord RCON diagnostic
//! ------------------------
//! Talks to a Minecraft server console directly, bypassing the bot's admin checks.
//! Without a command it prints the online players; otherwise it prints the raw reply.

use std::env;

use anyhow::{Context, Result};

use minecord::rcon::MinecraftConsole;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 4 || args.iter().any(|a| a == "-h" || a == "--help") {
        eprintln!("Usage: {} <host> <port> <password> [command...]", args.first().map(String::as_str).unwrap_or("minecord_rcon"));
        std::process::exit(1);
    }
    let host = args[1].clone();
    let port: u16 = args[2].parse().with_context(|| format!("invalid port '{}'", args[2]))?;
    let console = MinecraftConsole::new(host, port, Some(args[3].clone()))?;

    if args.len() > 4 {
        let command = args[4..].join(" ");
        let reply = console.execute(&command).await.context("RCON command failed")?;
        println!("{reply}");
        return Ok(());
    }

    let players = console.fetch_players().await.context("RCON command failed")?;
    println!("--- Minecraft Server Status ---");
    if players.is_empty() {
        println!("No players are currently online.");
    } else {
        println!("Online players ({}): {}", players.len(), players.join(", "));
    }
    println!("-----------------------------");
    Ok(())
}
