//! Server configuration
//!
//! Loaded once at startup from a JSON file and threaded into every component
//! constructor. Keys keep the camelCase names of the legacy `config.json`:
//!
//! ```json
//! {
//!   "mqttServer": "mqtt://localhost:1883",
//!   "bindingIP": "192.168.0.10",
//!   "bindingPort": 8080
//! }
//! ```
//!
//! Environment overrides:
//!   SIGNAGE_MQTT_SERVER, SIGNAGE_BINDING_IP, SIGNAGE_BINDING_PORT, SIGNAGE_NAMESPACE

use crate::error::{Result, SignageError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_NAMESPACE: &str = "ar-signage";
const DEFAULT_MQTT_PORT: u16 = 1883;
const DEFAULT_KEEP_ALIVE_SECS: u64 = 30;
const MIN_KEEP_ALIVE_SECS: u64 = 5;
const DEFAULT_STORE_TIMEOUT_MS: u64 = 5000;

const MEDIA_CACHE_PATH: &str = "mediaCache";
const ROOMS_PATH: &str = "rooms";
const CLIENTS_PATH: &str = "clients";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    pub mqtt_server: String,
    #[serde(rename = "bindingIP")]
    pub binding_ip: String,
    pub binding_port: u16,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_rooms_file")]
    pub rooms_file: PathBuf,
    #[serde(default = "default_clients_file")]
    pub clients_file: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default = "default_keep_alive")]
    pub keep_alive_secs: u64,
    #[serde(default = "default_store_timeout")]
    pub store_timeout_ms: u64,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_rooms_file() -> PathBuf {
    PathBuf::from("rooms.json")
}

fn default_clients_file() -> PathBuf {
    PathBuf::from("clients.json")
}

fn default_keep_alive() -> u64 {
    DEFAULT_KEEP_ALIVE_SECS
}

fn default_store_timeout() -> u64 {
    DEFAULT_STORE_TIMEOUT_MS
}

/// Broker address split out of `mqttServer`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerAddress {
    pub host: String,
    pub port: u16,
}

/// URLs advertised to clients and dashboards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvertisedUrls {
    pub media_cache: String,
    pub rooms: String,
    pub clients: String,
}

impl ServerConfig {
    /// Minimal configuration with defaults for everything optional.
    pub fn new(mqtt_server: impl Into<String>, binding_ip: impl Into<String>, port: u16) -> Self {
        Self {
            mqtt_server: mqtt_server.into(),
            binding_ip: binding_ip.into(),
            binding_port: port,
            namespace: default_namespace(),
            rooms_file: default_rooms_file(),
            clients_file: default_clients_file(),
            client_id: None,
            keep_alive_secs: DEFAULT_KEEP_ALIVE_SECS,
            store_timeout_ms: DEFAULT_STORE_TIMEOUT_MS,
        }
    }

    /// Read the config file, apply environment overrides and validate.
    ///
    /// Relative `roomsFile`/`clientsFile` paths resolve against the config
    /// file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SignageError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let mut config: Self = serde_json::from_str(&content).map_err(|e| {
            SignageError::Config(format!("cannot parse {}: {}", path.display(), e))
        })?;

        if let Some(base) = path.parent() {
            config.rooms_file = resolve(base, &config.rooms_file);
            config.clients_file = resolve(base, &config.clients_file);
        }

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(server) = std::env::var("SIGNAGE_MQTT_SERVER") {
            self.mqtt_server = server;
        }
        if let Ok(ip) = std::env::var("SIGNAGE_BINDING_IP") {
            self.binding_ip = ip;
        }
        if let Ok(port) = std::env::var("SIGNAGE_BINDING_PORT") {
            self.binding_port = port.parse().map_err(|_| {
                SignageError::Config(format!("SIGNAGE_BINDING_PORT is not a port: {}", port))
            })?;
        }
        if let Ok(namespace) = std::env::var("SIGNAGE_NAMESPACE") {
            self.namespace = namespace;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.namespace.is_empty() || self.namespace.contains(['/', '+', '#']) {
            return Err(SignageError::Config(format!(
                "namespace must be a single topic segment: '{}'",
                self.namespace
            )));
        }
        if self.binding_ip.is_empty() {
            return Err(SignageError::Config("bindingIP must not be empty".into()));
        }
        if self.keep_alive_secs < MIN_KEEP_ALIVE_SECS {
            return Err(SignageError::Config(format!(
                "keepAliveSecs must be at least {}",
                MIN_KEEP_ALIVE_SECS
            )));
        }
        self.broker()?;
        Ok(())
    }

    /// Parse `mqttServer` (`mqtt://host:port`, `tcp://host`, `host:port`, ...).
    pub fn broker(&self) -> Result<BrokerAddress> {
        let raw = self.mqtt_server.trim();
        let rest = match raw.split_once("://") {
            Some(("mqtt" | "tcp", rest)) => rest,
            Some((scheme, _)) => {
                return Err(SignageError::Config(format!(
                    "unsupported mqttServer scheme '{}'",
                    scheme
                )))
            },
            None => raw,
        };
        let rest = rest.trim_end_matches('/');

        let (host, port) = match rest.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| {
                    SignageError::Config(format!("invalid mqttServer port in '{}'", raw))
                })?;
                (host, port)
            },
            None => (rest, DEFAULT_MQTT_PORT),
        };

        if host.is_empty() {
            return Err(SignageError::Config(format!(
                "missing mqttServer host in '{}'",
                raw
            )));
        }

        Ok(BrokerAddress {
            host: host.to_string(),
            port,
        })
    }

    pub fn advertised_urls(&self) -> AdvertisedUrls {
        let base = format!("http://{}:{}", self.binding_ip, self.binding_port);
        AdvertisedUrls {
            media_cache: format!("{}/{}", base, MEDIA_CACHE_PATH),
            rooms: format!("{}/{}", base, ROOMS_PATH),
            clients: format!("{}/{}", base, CLIENTS_PATH),
        }
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }

    pub fn client_id(&self) -> String {
        self.client_id
            .clone()
            .unwrap_or_else(|| format!("signage-server-{}", rand::random::<u16>()))
    }
}

fn resolve(base: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        base.join(file)
    }
}
