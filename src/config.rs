//! Connection settings for the OpenNMS server.
//!
//! Settings live in a YAML file:
//!
//! ```yaml
//! host: https://opennms.example.com:8443
//! username: admin
//! password: admin
//! validate_certs: true
//! ```
//!
//! [load] looks for the file in the following places and uses the first one that exists:
//!
//! 1. The path passed by the caller, e.g. from `onms --config`.
//! 2. `~/.onms/connection.yaml`.
//! 3. `connection.yaml` in [config_dir].
//!
//! If the `ONMS_PASSWORD` environment variable is set, it replaces the password from the file.

use anyhow::{bail, Context};
use regex::Regex;
use reqwest::Url;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

/// The name of the connection settings file.
pub const CONNECTION_FILE: &str = "connection.yaml";

/// The environment variable that overrides [Connection::password].
pub const PASSWORD_VAR: &str = "ONMS_PASSWORD";

/// Returns a [PathBuf] to the directory where system-wide configuration should live.
///
/// When compiled for testing, this returns `CARGO_MANIFEST_DIR` plus `resources/etc/onms`.
/// Otherwise, it returns `/etc/onms`.
pub fn config_dir() -> PathBuf {
    // Omit the leading slash so that PathBuf::push appends instead of replacing.
    const CONFIG_DIR: &str = "etc/onms";

    let mut path = PathBuf::new();

    #[cfg(test)]
    {
        path.push(env!("CARGO_MANIFEST_DIR"));
        path.push("resources");
    }
    #[cfg(not(test))]
    path.push("/");

    path.push(CONFIG_DIR);
    path
}

/// Returns the path to the current user's connection file, if the home directory is known.
pub fn user_config_path() -> Option<PathBuf> {
    home::home_dir().map(|home| home.join(".onms").join(CONNECTION_FILE))
}

/// How to reach and log into an OpenNMS server.
///
/// Immutable once loaded; hand it to [HttpStore::new](crate::store::http::HttpStore::new).
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Connection {
    /// The server's base URL, including the scheme and port, e.g. `http://localhost:8980`.
    pub host: String,

    pub username: String,

    pub password: String,

    /// Set to `false` to accept invalid TLS certificates.
    #[serde(default = "default_validate_certs")]
    pub validate_certs: bool,

    /// Gives up on a request after this many seconds. `None` waits indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_validate_certs() -> bool {
    true
}

// Keeps the password out of logs and error messages.
impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("validate_certs", &self.validate_certs)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Connection {
    /// Parses and validates connection settings from YAML.
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        let connection: Connection = serde_yaml::from_str(yaml)?;
        connection.validate()?;
        Ok(connection)
    }

    /// Checks that [Self::host] is an `http` or `https` URL with a host name.
    /// Doesn't resolve the name; [HttpStore::new](crate::store::http::HttpStore::new) does.
    pub fn validate(&self) -> anyhow::Result<()> {
        static SCHEME: OnceLock<Regex> = OnceLock::new();
        let scheme = SCHEME.get_or_init(|| Regex::new(r"^https?://").unwrap());

        if !scheme.is_match(&self.host) {
            bail!("host must start with http:// or https://: {}", self.host);
        }
        let url = Url::parse(&self.host)
            .with_context(|| format!("unable to parse host as a URL: {}", self.host))?;
        if url.host_str().unwrap_or_default().is_empty() {
            bail!("host has no host name: {}", self.host);
        }
        if self.username.is_empty() {
            bail!("username should not be empty");
        }
        Ok(())
    }

    /// The base URL of the OpenNMS web application, i.e. [Self::host] plus `/opennms`.
    pub fn base_url(&self) -> anyhow::Result<Url> {
        let mut url = Url::parse(&self.host)
            .with_context(|| format!("unable to parse host as a URL: {}", self.host))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("host cannot be a base URL: {}", self.host))?
            .pop_if_empty()
            .push("opennms");
        Ok(url)
    }

    /// The request timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Replaces the password with `password`, if one is given.
    pub fn with_password_override(mut self, password: Option<String>) -> Self {
        if let Some(password) = password {
            self.password = password;
        }
        self
    }
}

/// Reads [Connection] settings from `path`.
pub fn load_file(path: impl AsRef<Path>) -> anyhow::Result<Connection> {
    let path = path.as_ref();
    let yaml = fs::read_to_string(path)
        .with_context(|| format!("failed to read connection settings {}", path.display()))?;
    Connection::from_yaml(&yaml)
        .with_context(|| format!("invalid connection settings in {}", path.display()))
}

/// Finds and reads [Connection] settings. See the [module documentation](self) for the search
/// order.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<Connection> {
    let path = match explicit {
        Some(path) => path.to_owned(),
        None => search_paths()
            .into_iter()
            .find(|path| path.is_file())
            .with_context(|| {
                format!(
                    "no connection settings found; create {} or pass --config",
                    config_dir().join(CONNECTION_FILE).display(),
                )
            })?,
    };

    tracing::debug!(path = %path.display(), "loading connection settings");
    let connection = load_file(&path)?;
    Ok(connection.with_password_override(env::var(PASSWORD_VAR).ok()))
}

/// The places [load] searches when no explicit path is given, in order.
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    paths.extend(user_config_path());
    paths.push(config_dir().join(CONNECTION_FILE));
    paths
}
