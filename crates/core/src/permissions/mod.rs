use crate::host::Server;
use crate::utils::HyphenatedUUID;
use anyhow::{Context, Result};
use mysql::prelude::*;
use mysql::{OptsBuilder, Pool, PooledConn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

/// A permission backend that can answer for players who are not connected.
pub trait PermissionService {
    fn has_permission(&self, uuid: u128, node: &str) -> Result<bool>;
}

#[derive(Debug)]
enum PathSegment {
    WildCard,
    Named(String),
}

#[derive(Debug)]
struct PermissionNode {
    path: Vec<PathSegment>,
    value: bool,
}

impl PermissionNode {
    fn matches(&self, name: &str) -> bool {
        let mut segments = name.split('.');
        for path_segment in &self.path {
            match (path_segment, segments.next()) {
                (PathSegment::WildCard, Some(_)) => return true,
                (PathSegment::Named(expected), Some(segment)) if expected == segment => {}
                _ => return false,
            }
        }
        segments.next().is_none()
    }
}

#[derive(Debug, Default)]
pub struct PlayerPermissionsCache {
    nodes: Vec<PermissionNode>,
}

impl PlayerPermissionsCache {
    /// Returns the value of the first node matching `name`.
    pub fn get_node_val(&self, name: &str) -> Option<bool> {
        self.nodes
            .iter()
            .find(|node| node.matches(name))
            .map(|node| node.value)
    }

    pub fn insert(&mut self, name: &str, value: bool) {
        let path = name
            .split('.')
            .map(|s| match s {
                "*" => PathSegment::WildCard,
                s => PathSegment::Named(s.to_owned()),
            })
            .collect();
        self.nodes.push(PermissionNode { path, value });
    }
}

/// Adds `nodes` to the cache, following granted `group.<name>` nodes into the
/// nodes of that group. Every group is loaded at most once.
fn insert_nodes<F>(
    cache: &mut PlayerPermissionsCache,
    nodes: Vec<(String, bool)>,
    loaded: &mut HashSet<String>,
    load_group: &mut F,
) -> Result<()>
where
    F: FnMut(&str) -> Result<Vec<(String, bool)>>,
{
    for (path_str, value) in nodes {
        cache.insert(&path_str, value);
        if !value {
            continue;
        }

        if let Some(group_name) = path_str.strip_prefix("group.") {
            if loaded.insert(group_name.to_owned()) {
                let group_nodes = load_group(group_name)?;
                insert_nodes(cache, group_nodes, loaded, load_group)?;
            }
        }
    }
    Ok(())
}

#[derive(Serialize, Deserialize, Clone)]
pub struct PermissionsConfig {
    pub host: String,
    pub db_name: String,
    pub username: String,
    pub password: String,
    pub server_context: String,
}

/// Reads permissions straight out of a LuckPerms MySQL database.
pub struct LuckPermsService {
    pool: Pool,
    server_context: String,
}

impl LuckPermsService {
    pub fn connect(config: &PermissionsConfig) -> Result<LuckPermsService> {
        let opts = OptsBuilder::new()
            .ip_or_hostname(Some(config.host.clone()))
            .db_name(Some(config.db_name.clone()))
            .user(Some(config.username.clone()))
            .pass(Some(config.password.clone()));
        let pool = Pool::new(opts).context("Failed to connect to the LuckPerms database")?;
        Ok(LuckPermsService {
            pool,
            server_context: config.server_context.clone(),
        })
    }

    fn load_group(&self, conn: &mut PooledConn, name: &str) -> Result<Vec<(String, bool)>> {
        let rows: Vec<(String, bool)> = conn.exec(
            r#"
                SELECT permission, value
                FROM luckperms_group_permissions
                WHERE name=? AND (server="global" OR server=?);
            "#,
            (name, &self.server_context),
        )?;
        Ok(rows)
    }

    pub fn load_player_cache(&self, uuid: u128) -> Result<PlayerPermissionsCache> {
        let uuid = HyphenatedUUID(uuid).to_string();
        let mut conn = self.pool.get_conn()?;

        let mut cache: PlayerPermissionsCache = Default::default();

        let user_rows: Vec<(String, bool)> = conn.exec(
            r#"
                SELECT permission, value
                FROM luckperms_user_permissions
                WHERE uuid=? AND (server="global" OR server=?);
            "#,
            (&uuid, &self.server_context),
        )?;
        let mut loaded = HashSet::new();
        insert_nodes(&mut cache, user_rows, &mut loaded, &mut |group| {
            self.load_group(&mut conn, group)
        })
        .with_context(|| format!("Failed to load permissions of {}", uuid))?;

        Ok(cache)
    }
}

impl PermissionService for LuckPermsService {
    fn has_permission(&self, uuid: u128, node: &str) -> Result<bool> {
        let cache = self.load_player_cache(uuid)?;
        Ok(cache.get_node_val(node).unwrap_or(false))
    }
}

/// Answers permission checks for players that may or may not be online.
#[derive(Default)]
pub struct PermissionResolver {
    service: Option<Box<dyn PermissionService>>,
    warned: bool,
}

impl PermissionResolver {
    pub fn new(service: Option<Box<dyn PermissionService>>) -> PermissionResolver {
        PermissionResolver {
            service,
            warned: false,
        }
    }

    /// Asks the live session first. Offline players are looked up in the
    /// configured service, then in the one the host provides. Without any
    /// service the answer is always `false`.
    pub fn has_permission(&mut self, server: &dyn Server, uuid: u128, node: &str) -> bool {
        if let Some(player) = server.player(uuid) {
            return player.has_permission(node);
        }

        let service: &dyn PermissionService = match self.service.as_deref() {
            Some(service) => service,
            None => match server.permission_service() {
                Some(service) => service,
                None => {
                    if !self.warned {
                        warn!("No permission service available, denying offline players");
                        self.warned = true;
                    }
                    return false;
                }
            },
        };
        self.warned = false;

        match service.has_permission(uuid, node) {
            Ok(val) => val,
            Err(err) => {
                warn!(
                    "Permission lookup of {} for {} failed: {:#}",
                    node,
                    HyphenatedUUID(uuid),
                    err
                );
                false
            }
        }
    }
}
