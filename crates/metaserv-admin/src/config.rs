//! Connection files.
//!
//! A connection file is a small TOML document describing one database server:
//!
//! ```toml
//! url = "sqlite:/var/lib/metaserv/server.db"
//! host = "lsst-db01"
//! port = 4040
//!
//! [databases]
//! DC_W13_Stripe82 = "stripe82.db"
//! ```
//!
//! Every entry under `[databases]` is attached to each connection under its
//! key, so the key is the database name used by `ADD DBDESCR`. Relative
//! paths resolve against the directory holding the connection file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AdminError, Result};
use crate::target::is_safe_name;

/// Default location of the catalog connection file.
pub const DEFAULT_AUTH_FILE: &str = "~/.metaserv/auth.toml";

fn default_host() -> String {
    "localhost".to_string()
}

/// One database server, as described by a connection file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// sqlx URL of the server's main database.
    pub url: String,
    /// Host name recorded in the catalog.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port recorded in the catalog.
    #[serde(default)]
    pub port: u16,
    /// Databases attached to every connection, keyed by name.
    #[serde(default)]
    pub databases: BTreeMap<String, PathBuf>,
}

impl ConnectionConfig {
    /// Creates a config for a single URL with no attached databases.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            host: default_host(),
            port: 0,
            databases: BTreeMap::new(),
        }
    }

    /// Sets the recorded host and port.
    #[must_use]
    pub fn endpoint(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    /// Attaches a database file under `name`.
    #[must_use]
    pub fn attach(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.databases.insert(name.into(), path.into());
        self
    }

    /// Parses a connection file held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Config`] for malformed TOML and
    /// [`AdminError::UnsafeName`] for a database name outside `[A-Za-z0-9_]`.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        if let Some(name) = config.databases.keys().find(|name| !is_safe_name(name)) {
            return Err(AdminError::UnsafeName(name.clone()));
        }
        Ok(config)
    }

    /// Reads a connection file, expanding a leading `~`.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::InvalidConfig`] if the file cannot be read, plus
    /// everything [`from_toml_str`](Self::from_toml_str) returns.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = expand_home(path.as_ref());
        let text = fs::read_to_string(&path).map_err(|e| AdminError::InvalidConfig {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let mut config = Self::from_toml_str(&text)?;
        if let Some(dir) = path.parent() {
            for file in config.databases.values_mut() {
                let expanded = expand_home(file);
                *file = if expanded.is_relative() {
                    dir.join(expanded)
                } else {
                    expanded
                };
            }
        }

        debug!(
            path = %path.display(),
            databases = config.databases.len(),
            "Loaded connection file"
        );
        Ok(config)
    }
}

/// Replaces a leading `~` with the user's home directory.
#[must_use]
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir().map_or_else(|| path.to_path_buf(), |home| home.join(rest)),
        Err(_) => path.to_path_buf(),
    }
}

/// Maps a Python-style verbosity threshold to a tracing level.
///
/// `10` and below is DEBUG, up to `20` INFO, up to `30` WARN, ERROR above.
#[must_use]
pub fn log_level(verbosity: u8) -> tracing::Level {
    match verbosity.min(50) {
        0..=10 => tracing::Level::DEBUG,
        11..=20 => tracing::Level::INFO,
        21..=30 => tracing::Level::WARN,
        _ => tracing::Level::ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_file() {
        let config = ConnectionConfig::from_toml_str(
            r#"
url = "sqlite::memory:"
host = "lsst-db01"
port = 4040

[databases]
Stripe82 = "/data/stripe82.db"
"#,
        )
        .unwrap();

        assert_eq!(config.url, "sqlite::memory:");
        assert_eq!(config.host, "lsst-db01");
        assert_eq!(config.port, 4040);
        assert_eq!(
            config.databases.get("Stripe82"),
            Some(&PathBuf::from("/data/stripe82.db"))
        );
    }

    #[test]
    fn test_defaults() {
        let config = ConnectionConfig::from_toml_str("url = \"sqlite::memory:\"").unwrap();
        assert_eq!(config, ConnectionConfig::new("sqlite::memory:"));
        assert_eq!(config.host, "localhost");
        assert!(config.databases.is_empty());
    }

    #[test]
    fn test_unsafe_database_name_rejected() {
        let err = ConnectionConfig::from_toml_str(
            "url = \"sqlite::memory:\"\n[databases]\n\"a;b\" = \"x.db\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, AdminError::UnsafeName(ref name) if name == "a;b"));
    }

    #[test]
    fn test_missing_url_is_config_error() {
        let err = ConnectionConfig::from_toml_str("host = \"x\"").unwrap_err();
        assert!(matches!(err, AdminError::Config(_)));
    }

    #[test]
    fn test_relative_paths_resolve_against_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.toml");
        fs::write(
            &path,
            "url = \"sqlite::memory:\"\n[databases]\nrel = \"rel.db\"\nabs = \"/abs.db\"\n",
        )
        .unwrap();

        let config = ConnectionConfig::from_file(&path).unwrap();
        assert_eq!(config.databases["rel"], dir.path().join("rel.db"));
        assert_eq!(config.databases["abs"], PathBuf::from("/abs.db"));
    }

    #[test]
    fn test_missing_file() {
        let err = ConnectionConfig::from_file("/nonexistent/auth.toml").unwrap_err();
        assert!(matches!(err, AdminError::InvalidConfig { .. }));
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home(Path::new("/etc/x")), PathBuf::from("/etc/x"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/.metaserv")), home.join(".metaserv"));
        }
    }

    #[test]
    fn test_log_level() {
        assert_eq!(log_level(0), tracing::Level::DEBUG);
        assert_eq!(log_level(10), tracing::Level::DEBUG);
        assert_eq!(log_level(20), tracing::Level::INFO);
        assert_eq!(log_level(30), tracing::Level::WARN);
        assert_eq!(log_level(40), tracing::Level::ERROR);
        assert_eq!(log_level(200), tracing::Level::ERROR);
    }
}
