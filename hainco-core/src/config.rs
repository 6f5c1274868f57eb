//! Configuration management
//!
//! Settings come from an optional `settings.json` in the data directory,
//! then environment variables override individual values:
//! ```json
//! {
//!   "server": { "host": "0.0.0.0", "port": 8000, "allowedOrigins": ["http://localhost:3000"] },
//!   "databaseFile": "hainco.duckdb",
//!   "credentialKey": "..."
//! }
//! ```

use std::path::Path;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_DATABASE_FILE: &str = "hainco.duckdb";

/// File holding the generated server credential key (hex)
pub const CREDENTIAL_KEY_FILE: &str = "credential.key";

const CREDENTIAL_KEY_LEN: usize = 32;

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    server: ServerSettings,
    #[serde(default)]
    database_file: Option<String>,
    #[serde(default)]
    credential_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerSettings {
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    port: Option<u16>,
    #[serde(default)]
    allowed_origins: Option<Vec<String>>,
}

/// Resolved configuration
#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub database_file: String,
    /// Explicit server credential key; `None` falls back to [`CREDENTIAL_KEY_FILE`]
    pub credential_key: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("allowed_origins", &self.allowed_origins)
            .field("database_file", &self.database_file)
            .field("credential_key", &self.credential_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.to_string()],
            database_file: DEFAULT_DATABASE_FILE.to_string(),
            credential_key: None,
        }
    }
}

impl Config {
    /// Load config from the data directory and the process environment
    pub fn load(data_dir: &Path) -> Result<Self> {
        Self::load_with_env(data_dir, |name| std::env::var(name).ok())
    }

    /// Load config with a custom environment lookup
    pub fn load_with_env<F>(data_dir: &Path, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let settings_path = data_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content)
                .map_err(|e| Error::config(format!("Invalid settings.json: {}", e)))?
        } else {
            SettingsFile::default()
        };

        let defaults = Config::default();

        let host = env("HAINCO_HOST")
            .or(raw.server.host)
            .unwrap_or(defaults.host);

        let port = match env("HAINCO_PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| Error::config(format!("Invalid HAINCO_PORT: {}", value)))?,
            None => raw.server.port.unwrap_or(defaults.port),
        };
        if port == 0 {
            return Err(Error::config("Port must be between 1 and 65535"));
        }

        let allowed_origins = match env("HAINCO_ALLOWED_ORIGINS") {
            Some(value) => parse_origins(&value),
            None => raw.server.allowed_origins.unwrap_or(defaults.allowed_origins),
        };

        let database_file = env("HAINCO_DATABASE_FILE")
            .or(raw.database_file)
            .unwrap_or(defaults.database_file);

        let credential_key = env("HAINCO_CREDENTIAL_KEY")
            .or(raw.credential_key)
            .filter(|k| !k.is_empty());

        Ok(Self {
            host,
            port,
            allowed_origins,
            database_file,
            credential_key,
        })
    }

    /// `host:port` for binding the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Resolve the server credential key
    ///
    /// Uses the configured key when present. Otherwise reads the hex key
    /// file from the data directory, generating it on first use.
    pub fn credential_key_bytes(&self, data_dir: &Path) -> Result<Vec<u8>> {
        match &self.credential_key {
            Some(key) => Ok(key.as_bytes().to_vec()),
            None => load_or_create_credential_key(data_dir),
        }
    }
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read `credential.key`, creating it with fresh random bytes if missing
pub fn load_or_create_credential_key(data_dir: &Path) -> Result<Vec<u8>> {
    let key_path = data_dir.join(CREDENTIAL_KEY_FILE);

    if key_path.exists() {
        let content = std::fs::read_to_string(&key_path)?;
        let key = hex::decode(content.trim())
            .map_err(|e| Error::config(format!("Invalid {}: {}", CREDENTIAL_KEY_FILE, e)))?;
        if key.is_empty() {
            return Err(Error::config(format!("{} is empty", CREDENTIAL_KEY_FILE)));
        }
        return Ok(key);
    }

    let mut key = vec![0u8; CREDENTIAL_KEY_LEN];
    rand::thread_rng().fill_bytes(&mut key);
    std::fs::create_dir_all(data_dir)?;
    write_private_file(&key_path, hex::encode(&key).as_bytes())?;

    tracing::warn!(
        path = %key_path.display(),
        "generated a new credential key; passwords stored under a previous key can no longer be recovered"
    );

    Ok(key)
}

/// Create `path` readable by the owner only
#[cfg(unix)]
fn write_private_file(path: &Path, contents: &[u8]) -> Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents)?;
    Ok(())
}

#[cfg(not(unix))]
fn write_private_file(path: &Path, contents: &[u8]) -> Result<()> {
    std::fs::write(path, contents)?;
    Ok(())
}
