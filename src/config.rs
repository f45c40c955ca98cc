//! Named connection profiles
//!
//! Connections are configured in a TOML settings file, one table per profile:
//!
//! ```toml
//! [connections.parks]
//! sqlitepath = "/data/parks.sqlite"
//! ```
//!
//! The registry is an explicitly constructed object: load it once, pass it to
//! whatever needs to resolve profile names. There is no process-wide settings
//! state.

use std::collections::HashMap;
use std::path::Path;

use config::Config;
use serde::Deserialize;
use tracing::debug;

use crate::database::{DbError, Result, SpatialiteConn};

const EMPTY_CONFIG: &str = r#"### sqlayer connection settings

### one table per named connection, e.g.:
# [connections.parks]
# sqlitepath = "/data/parks.sqlite"
"#;

#[derive(Debug, Clone, Deserialize)]
struct ProfileEntry {
    sqlitepath: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    connections: HashMap<String, ProfileEntry>,
}

/// A resolved connection profile.
#[derive(Debug, Clone)]
pub struct ConnectionProfile {
    pub name: String,
    pub sqlitepath: String,
}

/// Registry of the named connection profiles defined in the settings store.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    profiles: HashMap<String, ProfileEntry>,
}

impl ConnectionRegistry {
    /// Load the registry, from the given settings file or from the default
    /// location (`~/.sqlayer/sqlayer.toml`). A missing file is seeded with a
    /// commented template and yields an empty registry.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        let file = match path {
            Some(p) => p.to_string(),
            None => {
                let dir = Self::default_config_dir()?;
                std::fs::create_dir_all(&dir).map_err(|e| {
                    DbError::Settings(format!("unable to create settings directory: {e}"))
                })?;
                format!("{dir}/sqlayer.toml")
            }
        };

        if Path::new(&file).exists() {
            builder = builder.add_source(config::File::with_name(&file));
        } else {
            std::fs::write(&file, EMPTY_CONFIG)
                .map_err(|e| DbError::Settings(format!("unable to create {file}: {e}")))?;
        }

        // Settings from the environment (with a prefix of SQLAYER) overlay
        // the file.
        builder = builder.add_source(config::Environment::with_prefix("SQLAYER").separator("__"));

        let settings = builder
            .build()
            .map_err(|e| DbError::Settings(e.to_string()))?;
        let parsed = settings
            .try_deserialize::<SettingsFile>()
            .map_err(|e| DbError::Settings(e.to_string()))?;

        debug!(
            "loaded {} connection profile(s) from {}",
            parsed.connections.len(),
            file
        );
        Ok(ConnectionRegistry {
            profiles: parsed.connections,
        })
    }

    /// Names of the defined profiles, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.profiles.keys().cloned().collect();
        names.sort();
        names
    }

    /// Resolve a profile by name.
    ///
    /// An undefined name is a hard error, as is a profile without a
    /// `sqlitepath` entry.
    pub fn get(&self, name: &str) -> Result<ConnectionProfile> {
        let entry = self
            .profiles
            .get(name)
            .ok_or_else(|| DbError::UnknownConnection(name.to_string()))?;
        let sqlitepath = entry
            .sqlitepath
            .clone()
            .ok_or_else(|| DbError::MissingDatabasePath(name.to_string()))?;
        Ok(ConnectionProfile {
            name: name.to_string(),
            sqlitepath,
        })
    }

    /// Resolve a profile and open a connection to its database.
    pub fn connect(&self, name: &str) -> Result<SpatialiteConn> {
        let profile = self.get(name)?;
        SpatialiteConn::open(&profile.sqlitepath)
    }

    /// Default settings file location.
    pub fn default_config_path() -> Result<String> {
        Ok(format!("{}/sqlayer.toml", Self::default_config_dir()?))
    }

    fn default_config_dir() -> Result<String> {
        let home = dirs::home_dir()
            .ok_or_else(|| DbError::Settings("could not find home directory".to_string()))?;
        let home = home
            .to_str()
            .ok_or_else(|| DbError::Settings("home directory path is not valid UTF-8".to_string()))?;
        Ok(format!("{home}/.sqlayer"))
    }
}
