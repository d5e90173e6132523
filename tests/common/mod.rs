#![allow(dead_code)]

use anyhow::{anyhow, Result};
use logchannel_core::config::Config;
use logchannel_core::events::{
    EventRegistry, PlayerDeathEvent, PlayerJoinEvent, PlayerKickEvent, PlayerQuitEvent,
    ServerEventHandler,
};
use logchannel_core::host::{Channel, Chatter, Location, Player, Server};
use logchannel_core::permissions::{PermissionResolver, PermissionService};
use logchannel_core::LogChannel;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

pub const CHANNEL: &str = "Log";

pub struct TestPlayer {
    uuid: u128,
    name: String,
    location: Location,
    permissions: HashSet<String>,
    inbox: RefCell<Vec<String>>,
}

impl TestPlayer {
    pub fn new(uuid: u128, name: &str, location: Location) -> TestPlayer {
        TestPlayer {
            uuid,
            name: name.to_owned(),
            location,
            permissions: HashSet::new(),
            inbox: RefCell::new(Vec::new()),
        }
    }

    pub fn with_permission(mut self, node: &str) -> TestPlayer {
        self.permissions.insert(node.to_owned());
        self
    }

    pub fn messages(&self) -> Vec<String> {
        self.inbox.borrow().clone()
    }
}

impl Player for TestPlayer {
    fn uuid(&self) -> u128 {
        self.uuid
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn location(&self) -> Location {
        self.location.clone()
    }

    fn has_permission(&self, node: &str) -> bool {
        self.permissions.contains(node)
    }

    fn send_message(&self, message: &str) {
        self.inbox.borrow_mut().push(message.to_owned());
    }
}

pub struct TestChatter {
    player: Option<Rc<TestPlayer>>,
    ignores: HashSet<String>,
}

impl TestChatter {
    pub fn online(player: &Rc<TestPlayer>) -> TestChatter {
        TestChatter {
            player: Some(player.clone()),
            ignores: HashSet::new(),
        }
    }

    pub fn offline() -> TestChatter {
        TestChatter {
            player: None,
            ignores: HashSet::new(),
        }
    }

    pub fn ignoring(mut self, name: &str) -> TestChatter {
        self.ignores.insert(name.to_lowercase());
        self
    }
}

impl Chatter for TestChatter {
    fn player(&self) -> Option<&dyn Player> {
        self.player.as_deref().map(|player| player as &dyn Player)
    }

    fn is_ignoring(&self, name: &str) -> bool {
        self.ignores.contains(name)
    }
}

pub struct TestChannel {
    name: String,
    members: Vec<TestChatter>,
}

impl Channel for TestChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn members(&self) -> Box<dyn Iterator<Item = &dyn Chatter> + '_> {
        Box::new(self.members.iter().map(|member| member as &dyn Chatter))
    }
}

/// Permission table keyed by uuid, standing in for an offline permission backend.
#[derive(Default)]
pub struct TestPermissions {
    pub granted: HashMap<u128, HashSet<String>>,
    pub lookups: Cell<usize>,
    pub fail: bool,
}

impl TestPermissions {
    pub fn grant(mut self, uuid: u128, node: &str) -> TestPermissions {
        self.granted.entry(uuid).or_default().insert(node.to_owned());
        self
    }
}

impl PermissionService for TestPermissions {
    fn has_permission(&self, uuid: u128, node: &str) -> Result<bool> {
        self.lookups.set(self.lookups.get() + 1);
        if self.fail {
            return Err(anyhow!("permission backend is down"));
        }
        Ok(self
            .granted
            .get(&uuid)
            .is_some_and(|nodes| nodes.contains(node)))
    }
}

#[derive(Default)]
pub struct TestServer {
    channels: Vec<TestChannel>,
    players: Vec<Rc<TestPlayer>>,
    pub permission_service: Option<TestPermissions>,
}

impl TestServer {
    pub fn new() -> TestServer {
        Default::default()
    }

    /// Adds an online player. It is not a member of any channel yet.
    pub fn join(&mut self, player: TestPlayer) -> Rc<TestPlayer> {
        let player = Rc::new(player);
        self.players.push(player.clone());
        player
    }

    pub fn add_channel(&mut self, name: &str, members: Vec<TestChatter>) {
        self.channels.push(TestChannel {
            name: name.to_owned(),
            members,
        });
    }
}

impl Server for TestServer {
    fn channel(&self, name: &str) -> Option<&dyn Channel> {
        self.channels
            .iter()
            .find(|channel| channel.name == name)
            .map(|channel| channel as &dyn Channel)
    }

    fn player(&self, uuid: u128) -> Option<&dyn Player> {
        self.players
            .iter()
            .find(|player| player.uuid == uuid)
            .map(|player| &**player as &dyn Player)
    }

    fn permission_service(&self) -> Option<&dyn PermissionService> {
        self.permission_service
            .as_ref()
            .map(|service| service as &dyn PermissionService)
    }
}

/// Collects the handlers a plugin registers and dispatches events to them the
/// way a host would.
#[derive(Default)]
pub struct TestEventBus {
    handlers: Vec<ServerEventHandler<LogChannel>>,
}

impl EventRegistry<LogChannel> for TestEventBus {
    fn register(&mut self, handler: ServerEventHandler<LogChannel>) {
        self.handlers.push(handler);
    }
}

impl TestEventBus {
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn death(
        &self,
        plugin: &mut LogChannel,
        server: &dyn Server,
        event: &mut PlayerDeathEvent<'_>,
    ) {
        for handler in &self.handlers {
            if let ServerEventHandler::PlayerDeath(handler) = handler {
                handler(&mut *plugin, server, &mut *event);
            }
        }
    }

    pub fn join(&self, plugin: &mut LogChannel, server: &dyn Server, event: &mut PlayerJoinEvent<'_>) {
        for handler in &self.handlers {
            if let ServerEventHandler::PlayerJoin(handler) = handler {
                handler(&mut *plugin, server, &mut *event);
            }
        }
    }

    pub fn quit(&self, plugin: &mut LogChannel, server: &dyn Server, event: &mut PlayerQuitEvent<'_>) {
        for handler in &self.handlers {
            if let ServerEventHandler::PlayerQuit(handler) = handler {
                handler(&mut *plugin, server, &mut *event);
            }
        }
    }

    pub fn kick(&self, plugin: &mut LogChannel, server: &dyn Server, event: &mut PlayerKickEvent<'_>) {
        for handler in &self.handlers {
            if let ServerEventHandler::PlayerKick(handler) = handler {
                handler(&mut *plugin, server, &mut *event);
            }
        }
    }

    pub fn plugin_message(
        &self,
        plugin: &mut LogChannel,
        server: &dyn Server,
        channel: &str,
        data: &[u8],
    ) {
        for handler in &self.handlers {
            if let ServerEventHandler::PluginMessage {
                channel: registered,
                handler,
            } = handler
            {
                if *registered == channel {
                    handler(&mut *plugin, server, data);
                }
            }
        }
    }
}

pub fn plugin_with(config: Config) -> LogChannel {
    LogChannel::with_config("config.toml", config, PermissionResolver::default())
}

pub fn plugin() -> LogChannel {
    plugin_with(Config::default())
}

pub fn registered_bus() -> TestEventBus {
    let mut bus = TestEventBus::default();
    LogChannel::register_events(&mut bus);
    bus
}

#[derive(Clone, Default)]
struct WarningCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for WarningCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Runs `f` and returns how many warnings it logged.
pub fn count_warnings(f: impl FnOnce()) -> usize {
    let counter = WarningCounter::default();
    let subscriber = tracing_subscriber::registry().with(counter.clone());
    tracing::subscriber::with_default(subscriber, f);
    counter.0.load(Ordering::Relaxed)
}
