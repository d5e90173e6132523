use crate::permissions::PermissionsConfig;
use logchannel_text::translate_alternate_color_codes;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use toml_edit::{value, DocumentMut};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not access {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("{} is not valid TOML: {source}", path.display())]
    Syntax {
        path: PathBuf,
        source: toml_edit::TomlError,
    },
    #[error("{} contains an invalid value: {source}", path.display())]
    Invalid {
        path: PathBuf,
        source: toml::de::Error,
    },
}

trait ConfigSerializeDefault {
    fn fix_config(self, name: &str, doc: &mut DocumentMut);
}

macro_rules! impl_simple_default {
    ( $( $type:ty ),* ) => {
        $(
            impl ConfigSerializeDefault for $type {
                fn fix_config(self, name: &str, doc: &mut DocumentMut) {
                    doc.entry(name).or_insert_with(|| value(self));
                }
            }
        )*
    }
}

impl_simple_default!(String, bool);

impl<T> ConfigSerializeDefault for Option<T> {
    fn fix_config(self, _: &str, _: &mut DocumentMut) {
        assert!(self.is_none(), "`Some` as default is unimplemented");
    }
}

macro_rules! gen_config {
    (
        $( $name:ident as $key:literal: $type:ty = $default:expr ),* $(,)?
    ) => {
        #[derive(Clone, Serialize, Deserialize)]
        pub struct Config {
            $(
                #[serde(rename = $key)]
                pub $name: $type,
            )*
        }

        impl Config {
            /// Adds every missing key with its default value.
            fn fix_defaults(doc: &mut DocumentMut) {
                $(
                    <$type as ConfigSerializeDefault>::fix_config($default, $key, doc);
                )*
            }
        }

        impl Default for Config {
            fn default() -> Config {
                Config {
                    $(
                        $name: $default,
                    )*
                }
            }
        }
    };
}

gen_config! {
    channel_name as "ChannelName": String = "Log".to_string(),
    death_message as "DeathMessage": String = "&7{message}".to_string(),
    join_message as "JoinMessage": String = "&8[&a+&8] &7{player}".to_string(),
    leave_message as "LeaveMessage": String = "&8[&c-&8] &7{player}".to_string(),
    mute as "Mute": bool = false,
    mute_deaths as "MuteDeaths": bool = false,
    relay_local_joins as "RelayLocalJoins": bool = false,
    luckperms as "luckperms": Option<PermissionsConfig> = None,
}

impl Config {
    /// Reads the config at `path`. Keys missing from the file are filled in
    /// with their defaults and written back, creating the file if needed.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_owned(),
            source,
        };

        let original = match fs::read_to_string(path) {
            Ok(str) => str,
            Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
            Err(err) => return Err(io_err(err)),
        };
        let mut doc = original
            .parse::<DocumentMut>()
            .map_err(|source| ConfigError::Syntax {
                path: path.to_owned(),
                source,
            })?;

        Config::fix_defaults(&mut doc);

        let patched = doc.to_string();
        if original != patched {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
            fs::write(path, &patched).map_err(io_err)?;
        }

        toml::from_str(&patched).map_err(|source| ConfigError::Invalid {
            path: path.to_owned(),
            source,
        })
    }
}

/// A chat message pattern with a single placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pattern: String,
    placeholder: &'static str,
}

impl Template {
    pub const MESSAGE: &'static str = "{message}";
    pub const PLAYER: &'static str = "{player}";

    /// `&` color codes in `raw` are translated.
    pub fn new(raw: &str, placeholder: &'static str) -> Template {
        Template {
            pattern: translate_alternate_color_codes('&', raw),
            placeholder,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Replaces the first occurrence of the placeholder with `value`, taken
    /// literally.
    pub fn format(&self, value: &str) -> String {
        self.pattern.replacen(self.placeholder, value, 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Templates {
    pub death: Template,
    pub join: Template,
    pub leave: Template,
}

impl Templates {
    pub fn from_config(config: &Config) -> Templates {
        Templates {
            death: Template::new(&config.death_message, Template::MESSAGE),
            join: Template::new(&config.join_message, Template::PLAYER),
            leave: Template::new(&config.leave_message, Template::PLAYER),
        }
    }
}
