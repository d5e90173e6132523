use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use logchannel_core::config::{Config, Templates};
use logchannel_core::message::LogChannelMessage;
use logchannel_core::utils::HyphenatedUUID;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Operator tools for the LogChannel plugin.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load the config, filling in missing keys, and print what the plugin would use.
    CheckConfig {
        #[arg(long, default_value = "plugins/LogChannel/config.toml")]
        path: PathBuf,
    },
    /// Decode a captured `LogChannel` plugin message payload.
    Decode { file: PathBuf },
}

fn check_config(path: PathBuf) -> Result<()> {
    let config = Config::load(&path)?;
    let templates = Templates::from_config(&config);
    info!("Loaded {}", path.display());
    println!("channel:      {}", config.channel_name);
    println!("death:        {}", templates.death.pattern());
    println!("join:         {}", templates.join.pattern());
    println!("leave:        {}", templates.leave.pattern());
    println!("mute:         {}", config.mute);
    println!("mute deaths:  {}", config.mute_deaths);
    println!("local joins:  {}", config.relay_local_joins);
    println!("luckperms:    {}", config.luckperms.is_some());
    Ok(())
}

fn decode(file: PathBuf) -> Result<()> {
    let data = fs::read(&file).with_context(|| format!("Failed to read {}", file.display()))?;
    let message = LogChannelMessage::decode(&data)
        .with_context(|| format!("{} is not a valid payload", file.display()))?;
    println!("type: {}", message.message_type);
    println!("uuid: {}", HyphenatedUUID(message.uuid));
    println!("name: {}", message.name);
    if message.kind().is_none() {
        println!("(the plugin ignores this message type)");
    }
    Ok(())
}

fn main() -> Result<()> {
    // Setup logging
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var("LOGCHANNEL_LOG")
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::CheckConfig { path } => check_config(path),
        Command::Decode { file } => decode(file),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_config_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("LogChannel").join("config.toml");
        check_config(path.clone()).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("ChannelName = \"Log\""));
    }

    #[test]
    fn check_config_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "MuteDeaths = 3\n").unwrap();
        assert!(check_config(path).is_err());
    }

    #[test]
    fn decodes_captured_payload() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("join.bin");
        let message = LogChannelMessage {
            message_type: "Join".to_owned(),
            uuid: 0x069a79f444e94726a5befca90e38aaf5,
            name: "Notch".to_owned(),
        };
        fs::write(&file, message.encode().unwrap()).unwrap();
        decode(file).unwrap();
    }

    #[test]
    fn decode_fails_on_truncated_payload() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("join.bin");
        fs::write(&file, [0, 4, b'J', b'o']).unwrap();
        let err = decode(file.clone()).unwrap_err();
        assert!(err.to_string().contains("is not a valid payload"));

        assert!(decode(dir.path().join("missing.bin")).is_err());
    }
}
