pub mod addresses;
pub mod artifacts;
pub mod chain;
pub mod cli;
pub mod commands;
pub mod config;
pub mod deployer;
pub mod error;
pub mod networks;
pub mod plan;
pub mod prompt;
pub mod table;
pub mod verify;
