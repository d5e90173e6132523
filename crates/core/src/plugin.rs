use crate::commands::{CommandResult, CommandSender, LogChannelCommand};
use crate::config::{Config, ConfigError, Templates};
use crate::events::{
    EventRegistry, PlayerDeathEvent, PlayerJoinEvent, PlayerKickEvent, PlayerQuitEvent,
    PluginDetails, ServerEventHandler,
};
use crate::host::{Player, Server};
use crate::message::{LogChannelMessage, MessageKind, PLUGIN_CHANNEL};
use crate::permissions::{LuckPermsService, PermissionResolver, PermissionService};
use crate::relay::{relay, Cause};
use crate::utils::HyphenatedUUID;
use logchannel_text::{strip_color, translate_alternate_color_codes, ColorCode};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Players need this to have their deaths, joins and leaves relayed.
pub const LOG_PERMISSION: &str = "logchannel.log";

pub const PLUGIN_DETAILS: PluginDetails = PluginDetails {
    name: "LogChannel",
    version: env!("CARGO_PKG_VERSION"),
};

pub struct LogChannel {
    config_path: PathBuf,
    config: Config,
    templates: Templates,
    mute: bool,
    permissions: PermissionResolver,
}

fn connect_permissions(config: &Config) -> Option<Box<dyn PermissionService>> {
    let luckperms = config.luckperms.as_ref()?;
    match LuckPermsService::connect(luckperms) {
        Ok(service) => Some(Box::new(service)),
        Err(err) => {
            warn!("{:#}", err);
            None
        }
    }
}

impl LogChannel {
    /// Loads the config at `config_path`, writing defaults for missing keys.
    pub fn enable(config_path: impl Into<PathBuf>) -> Result<LogChannel, ConfigError> {
        let config_path = config_path.into();
        let config = Config::load(&config_path)?;
        let permissions = PermissionResolver::new(connect_permissions(&config));
        info!(
            "Enabling {} v{}, relaying to channel {}",
            PLUGIN_DETAILS.name, PLUGIN_DETAILS.version, config.channel_name
        );
        Ok(LogChannel::with_config(config_path, config, permissions))
    }

    /// Creates the plugin from an already loaded config.
    pub fn with_config(
        config_path: impl Into<PathBuf>,
        config: Config,
        permissions: PermissionResolver,
    ) -> LogChannel {
        LogChannel {
            config_path: config_path.into(),
            templates: Templates::from_config(&config),
            mute: config.mute,
            config,
            permissions,
        }
    }

    pub fn register_events(registry: &mut dyn EventRegistry<LogChannel>) {
        registry.register(ServerEventHandler::PlayerDeath(LogChannel::on_player_death));
        registry.register(ServerEventHandler::PlayerJoin(LogChannel::on_player_join));
        registry.register(ServerEventHandler::PlayerQuit(LogChannel::on_player_quit));
        registry.register(ServerEventHandler::PlayerKick(LogChannel::on_player_kick));
        registry.register(ServerEventHandler::PluginMessage {
            channel: PLUGIN_CHANNEL,
            handler: LogChannel::on_plugin_message,
        });
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_muted(&self) -> bool {
        self.mute
    }

    /// Rereads the config file. On failure the current config stays in place.
    pub fn reload(&mut self) -> Result<(), ConfigError> {
        let config = Config::load(&self.config_path)?;
        self.permissions = PermissionResolver::new(connect_permissions(&config));
        self.templates = Templates::from_config(&config);
        self.mute = config.mute;
        self.config = config;
        info!("Configuration reloaded from {}", self.config_path.display());
        Ok(())
    }

    fn relay(
        &self,
        server: &dyn Server,
        cause: Option<&Cause<'_>>,
        message: &str,
        nearby: bool,
    ) -> usize {
        relay(server, &self.config.channel_name, cause, message, nearby)
    }

    fn should_log(&self, player: &dyn Player) -> bool {
        !self.mute && player.has_permission(LOG_PERMISSION)
    }

    pub fn on_player_death(&mut self, server: &dyn Server, event: &mut PlayerDeathEvent<'_>) {
        let Some(message) = event.death_message.take() else {
            return;
        };
        let message = strip_color(&message);
        info!("{}", message);

        if self.config.mute_deaths || !self.should_log(event.entity) {
            return;
        }
        let text = self.templates.death.format(&message);
        let cause = Cause::from_player(event.entity);
        self.relay(server, Some(&cause), &text, event.killer.is_some());
    }

    fn relay_local_presence(&self, server: &dyn Server, player: &dyn Player, kind: MessageKind) {
        if !self.config.relay_local_joins || !self.should_log(player) {
            return;
        }
        let template = match kind {
            MessageKind::Join => &self.templates.join,
            MessageKind::Leave => &self.templates.leave,
        };
        let cause = Cause::from_player(player);
        self.relay(server, Some(&cause), &template.format(player.name()), false);
    }

    pub fn on_player_join(&mut self, server: &dyn Server, event: &mut PlayerJoinEvent<'_>) {
        event.join_message = None;
        self.relay_local_presence(server, event.player, MessageKind::Join);
    }

    pub fn on_player_quit(&mut self, server: &dyn Server, event: &mut PlayerQuitEvent<'_>) {
        event.quit_message = None;
        self.relay_local_presence(server, event.player, MessageKind::Leave);
    }

    pub fn on_player_kick(&mut self, _server: &dyn Server, event: &mut PlayerKickEvent<'_>) {
        event.leave_message = None;
    }

    pub fn on_plugin_message(&mut self, server: &dyn Server, data: &[u8]) {
        let message = match LogChannelMessage::decode(data) {
            Ok(message) => message,
            Err(err) => {
                warn!("Dropping malformed {} message: {}", PLUGIN_CHANNEL, err);
                return;
            }
        };
        if self.mute {
            return;
        }
        if !self
            .permissions
            .has_permission(server, message.uuid, LOG_PERMISSION)
        {
            debug!(
                "{} ({}) lacks {}",
                message.name,
                HyphenatedUUID(message.uuid),
                LOG_PERMISSION
            );
            return;
        }
        let template = match message.kind() {
            Some(MessageKind::Join) => &self.templates.join,
            Some(MessageKind::Leave) => &self.templates.leave,
            None => {
                warn!("Unknown message type: {}", message.message_type);
                return;
            }
        };
        let text = template.format(&message.name);
        let cause = match server.player(message.uuid) {
            Some(player) => Cause::from_player(player),
            None => Cause::named(&message.name),
        };
        self.relay(server, Some(&cause), &text, false);
    }

    /// Handles `/logchannel`. A usage error means the invocation was
    /// malformed and the host should show the usage.
    pub fn on_command(
        &mut self,
        server: &dyn Server,
        sender: &dyn CommandSender,
        args: &[&str],
    ) -> CommandResult<()> {
        match LogChannelCommand::parse(args)? {
            LogChannelCommand::Reload => {
                self.reload()?;
                sender.send_message("Configuration reloaded");
            }
            LogChannelCommand::Log(message) => {
                let message = translate_alternate_color_codes('&', &message);
                self.relay(server, None, &message, false);
            }
            LogChannelCommand::Mute => {
                self.mute = !self.mute;
                let state = if self.mute { "muted" } else { "unmuted" };
                info!("LogChannel {}", state);
                sender.send_message(&format!("{}LogChannel {}", ColorCode::Yellow, state));
            }
        }
        Ok(())
    }
}
