use crate::host::{Chatter, Location, Player, Server};
use tracing::{debug, warn};

/// Members farther away than this from the cause do not receive local
/// messages.
pub const LOCAL_RADIUS: f64 = 128.0;

/// The player a notification is about.
#[derive(Clone, Debug, PartialEq)]
pub struct Cause<'a> {
    pub name: &'a str,
    /// `None` if the player is not connected to this server.
    pub location: Option<Location>,
}

impl<'a> Cause<'a> {
    pub fn named(name: &'a str) -> Cause<'a> {
        Cause {
            name,
            location: None,
        }
    }

    pub fn from_player(player: &'a dyn Player) -> Cause<'a> {
        Cause {
            name: player.name(),
            location: Some(player.location()),
        }
    }
}

fn is_nearby(center: &Location, player: &dyn Player) -> bool {
    match center.distance_squared(&player.location()) {
        Some(dist) => dist <= LOCAL_RADIUS * LOCAL_RADIUS,
        None => false,
    }
}

fn should_receive(
    chatter: &dyn Chatter,
    player: &dyn Player,
    ignore_key: Option<&str>,
    center: Option<&Location>,
    nearby: bool,
) -> bool {
    if let Some(name) = ignore_key {
        if chatter.is_ignoring(name) {
            return false;
        }
    }
    if nearby {
        return center.is_some_and(|center| is_nearby(center, player));
    }
    true
}

/// Sends `message` to every eligible member of the channel called
/// `channel_name` and returns how many members received it.
///
/// Members that ignore the cause are skipped. If `nearby` is set, only members
/// in the cause's world within [`LOCAL_RADIUS`] receive the message.
pub fn relay(
    server: &dyn Server,
    channel_name: &str,
    cause: Option<&Cause<'_>>,
    message: &str,
    nearby: bool,
) -> usize {
    let Some(channel) = server.channel(channel_name) else {
        warn!("Channel not found: {}", channel_name);
        return 0;
    };

    let ignore_key = cause.map(|cause| cause.name.to_lowercase());
    let center = cause.and_then(|cause| cause.location.as_ref());
    if nearby && center.is_none() {
        debug!("Local message without a location, nobody is in range");
    }

    let mut delivered = 0;
    for chatter in channel.members() {
        let Some(player) = chatter.player() else {
            continue;
        };
        if should_receive(chatter, player, ignore_key.as_deref(), center, nearby) {
            player.send_message(message);
            delivered += 1;
        }
    }
    debug!(
        "Relayed message to {} member(s) of {}",
        delivered,
        channel.name()
    );
    delivered
}
