pub mod config;
pub mod error;
pub mod identity;
pub mod rcon;
pub mod gate;
pub mod cli;
