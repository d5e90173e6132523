use crate::config::ConfigError;
use thiserror::Error;

pub const USAGE: &str = "/logchannel <Reload | Log <message...> | Mute>";

/// Whoever ran the command, a player or the console.
pub trait CommandSender {
    fn send_message(&self, message: &str);
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Usage: {}", USAGE)]
    Usage,
    #[error("Failed to reload configuration: {0}")]
    Reload(#[from] ConfigError),
}

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Debug, PartialEq, Eq)]
pub enum LogChannelCommand {
    Reload,
    /// The words of the message, joined by single spaces.
    Log(String),
    Mute,
}

impl LogChannelCommand {
    pub fn parse(args: &[&str]) -> CommandResult<LogChannelCommand> {
        let Some((subcommand, rest)) = args.split_first() else {
            return Err(CommandError::Usage);
        };
        if subcommand.eq_ignore_ascii_case("reload") && rest.is_empty() {
            Ok(LogChannelCommand::Reload)
        } else if subcommand.eq_ignore_ascii_case("log") && !rest.is_empty() {
            Ok(LogChannelCommand::Log(rest.join(" ")))
        } else if subcommand.eq_ignore_ascii_case("mute") && rest.is_empty() {
            Ok(LogChannelCommand::Mute)
        } else {
            Err(CommandError::Usage)
        }
    }
}
