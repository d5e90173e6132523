#![deny(rust_2018_idioms)]

pub mod commands;
pub mod config;
pub mod events;
pub mod host;
pub mod message;
pub mod permissions;
mod plugin;
pub mod relay;
pub mod utils;

pub use plugin::{LogChannel, LOG_PERMISSION, PLUGIN_DETAILS};
