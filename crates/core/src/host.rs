//! Interfaces of the server that embeds the plugin.
//!
//! The host owns every player, channel and permission backend. The plugin only
//! ever sees them through these traits, borrowed for the duration of a single
//! callback.

use crate::permissions::PermissionService;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Position {
        Position { x, y, z }
    }

    pub fn distance_squared(self, other: Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }
}

/// A position inside a named world.
#[derive(Clone, Debug, PartialEq)]
pub struct Location {
    pub world: String,
    pub pos: Position,
}

impl Location {
    pub fn new(world: impl Into<String>, x: f64, y: f64, z: f64) -> Location {
        Location {
            world: world.into(),
            pos: Position::new(x, y, z),
        }
    }

    /// Returns `None` if the locations are in different worlds.
    pub fn distance_squared(&self, other: &Location) -> Option<f64> {
        if self.world != other.world {
            return None;
        }
        Some(self.pos.distance_squared(other.pos))
    }
}

/// A player connected to this server.
pub trait Player {
    fn uuid(&self) -> u128;
    fn name(&self) -> &str;
    fn location(&self) -> Location;
    fn has_permission(&self, node: &str) -> bool;
    /// Sends a legacy formatted (`§` codes) chat message.
    fn send_message(&self, message: &str);
}

/// A member of a chat channel.
pub trait Chatter {
    /// `None` once the member has disconnected.
    fn player(&self) -> Option<&dyn Player>;
    /// `name` is always lowercase.
    fn is_ignoring(&self, name: &str) -> bool;
}

pub trait Channel {
    fn name(&self) -> &str;
    fn members(&self) -> Box<dyn Iterator<Item = &dyn Chatter> + '_>;
}

pub trait Server {
    fn channel(&self, name: &str) -> Option<&dyn Channel>;
    /// Looks up a live session.
    fn player(&self, uuid: u128) -> Option<&dyn Player>;

    /// A permission backend the host provides for players that are not
    /// connected.
    fn permission_service(&self) -> Option<&dyn PermissionService> {
        None
    }
}
