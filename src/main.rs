//!
//! minecord bot binary
//! -------------------
//! Loads the YAML configuration, opens the admin store, and serves commands through the
//! dispatch gate from an interactive console (or a single `--command`).

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use minecord::cli::{parse_line, render_reply, ConsoleDirectory};
use minecord::config::{sample_config, Config, CONFIG_ENV};
use minecord::gate::CommandGate;
use minecord::identity::{AdminStore, Caller};
use minecord::rcon::MinecraftConsole;

fn print_usage(program: &str) {
    eprintln!(
        "Runs the Minecord bot.\n\nUSAGE:\n  {program} [--config PATH] [--as ID] [--name NAME] [--command LINE]\n  {program} --print-sample-config\n\nOPTIONS:\n  --config PATH           Path to configuration file (YAML format; env: {CONFIG_ENV})\n  --print-sample-config   Print a sample configuration file and exit\n  --as ID                 Caller id used for console commands (config: console_user_id)\n  --name NAME             Caller display name (config: console_display_name)\n  --command LINE          Run one command line and exit\n  -h, --help              Show this help\n\nConfiguration is loaded from YAML files.\nThe bot will search for configuration in the following order:\n  1. $PWD/minecord.yaml\n  2. $HOME/.config/minecord.yaml\n  3. /etc/minecord.yaml\n\nInteractive commands: any bot command (try `help`), or quit | exit."
    );
}

fn take_value(args: &[String], i: usize, flag: &str, program: &str) -> String {
    match args.get(i + 1) {
        Some(v) => v.clone(),
        None => {
            eprintln!("{flag} requires a value");
            print_usage(program);
            std::process::exit(2);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    fmt().with_env_filter(filter).init();

    let mut args: Vec<String> = env::args().collect();
    let program = args.remove(0);

    let mut config_path: Option<PathBuf> = None;
    let mut as_id: Option<String> = None;
    let mut as_name: Option<String> = None;
    let mut one_shot: Option<String> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => { config_path = Some(PathBuf::from(take_value(&args, i, "--config", &program))); i += 2; }
            "--as" => { as_id = Some(take_value(&args, i, "--as", &program)); i += 2; }
            "--name" => { as_name = Some(take_value(&args, i, "--name", &program)); i += 2; }
            "--command" | "-c" => { one_shot = Some(take_value(&args, i, "--command", &program)); i += 2; }
            "--print-sample-config" => {
                println!("{}", sample_config());
                return Ok(());
            }
            "-h" | "--help" => {
                print_usage(&program);
                return Ok(());
            }
            unk => {
                eprintln!("Unrecognized argument: {unk}");
                print_usage(&program);
                std::process::exit(2);
            }
        }
    }

    let config = match Config::discover(config_path.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            eprintln!("\nTo create an example configuration file, run:\n  {program} --print-sample-config");
            std::process::exit(1);
        }
    };

    let admins = Arc::new(AdminStore::open(config.admins_yaml()));
    let console = MinecraftConsole::new(config.rcon_host(), config.rcon_port(), config.rcon_password())
        .context("invalid RCON configuration")?;
    let directory = Arc::new(ConsoleDirectory::new(config.members()));
    let gate = CommandGate::new(admins.clone(), console, directory);

    let user_id = as_id.or_else(|| config.console_user_id()).unwrap_or_else(whoami::username);
    let display_name = as_name.or_else(|| config.console_display_name()).unwrap_or_else(|| user_id.clone());
    let caller = Caller::new(user_id, display_name);

    info!(
        target: "minecord",
        "Minecord starting: config='{}', rcon={}:{}, admins='{}' ({} loaded), caller={}",
        config.source().display(),
        config.rcon_host(),
        config.rcon_port(),
        admins.path().display(),
        admins.len(),
        caller
    );

    if let Some(line) = one_shot {
        if let Some(cmd) = parse_line(&caller, &line) {
            println!("{}", render_reply(&gate.handle(&cmd).await));
        }
        return Ok(());
    }

    println!("Hello! The Minecord bot is now online.");
    let mut rl = rustyline::DefaultEditor::new().context("failed to start line editor")?;
    loop {
        match rl.readline("minecord> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() { continue; }
                if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") { break; }
                let _ = rl.add_history_entry(trimmed);
                if let Some(cmd) = parse_line(&caller, trimmed) {
                    println!("{}", render_reply(&gate.handle(&cmd).await));
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("failed to read console input"),
        }
    }
    info!(target: "minecord", "Minecord shutting down");
    Ok(())
}
