//! Server events the plugin listens to and the way it registers for them.

use crate::host::{Player, Server};

pub struct PlayerDeathEvent<'a> {
    pub entity: &'a dyn Player,
    pub killer: Option<&'a dyn Player>,
    /// The message the server broadcasts, `None` to broadcast nothing.
    pub death_message: Option<String>,
}

pub struct PlayerJoinEvent<'a> {
    pub player: &'a dyn Player,
    pub join_message: Option<String>,
}

pub struct PlayerQuitEvent<'a> {
    pub player: &'a dyn Player,
    pub quit_message: Option<String>,
}

pub struct PlayerKickEvent<'a> {
    pub player: &'a dyn Player,
    pub leave_message: Option<String>,
}

pub type PlayerDeathHandler<P> = fn(&mut P, &dyn Server, &mut PlayerDeathEvent<'_>);
pub type PlayerJoinHandler<P> = fn(&mut P, &dyn Server, &mut PlayerJoinEvent<'_>);
pub type PlayerQuitHandler<P> = fn(&mut P, &dyn Server, &mut PlayerQuitEvent<'_>);
pub type PlayerKickHandler<P> = fn(&mut P, &dyn Server, &mut PlayerKickEvent<'_>);
pub type PluginMessageHandler<P> = fn(&mut P, &dyn Server, &[u8]);

pub enum ServerEventHandler<P> {
    PlayerDeath(PlayerDeathHandler<P>),
    PlayerJoin(PlayerJoinHandler<P>),
    PlayerQuit(PlayerQuitHandler<P>),
    PlayerKick(PlayerKickHandler<P>),
    PluginMessage {
        channel: &'static str,
        handler: PluginMessageHandler<P>,
    },
}

/// Implemented by the host so plugins can subscribe to events.
pub trait EventRegistry<P> {
    fn register(&mut self, handler: ServerEventHandler<P>);
}

pub struct PluginDetails {
    pub name: &'static str,
    pub version: &'static str,
}
