use crate::error::{ConfigError, ConfigResult};
use crate::kv;
use std::path::{Path, PathBuf};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT_IN: u16 = 7000;
const DEFAULT_PORT_OUT: u16 = 7001;
const DEFAULT_SERVER_HOST: &str = "127.0.0.1";
const DEFAULT_SERVER_PORT_IN: u16 = 8000;
const DEFAULT_BUS_HOST: &str = "127.0.0.1";
const DEFAULT_BUS_PORT_IN: u16 = 9000;
const DEFAULT_PRIVATE_KEY_PATH: &str = "./node.key";

/// A node's resolved configuration. Per-key
/// defaults apply independently, so a file missing `hostBus` still gets a
/// usable `bus_host` even if every other key was given explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    pub host: String,
    pub port_in: u16,
    pub port_out: u16,
    pub server_host: String,
    pub server_port_in: u16,
    pub bus_host: String,
    pub bus_port_in: u16,
    pub private_key_path: PathBuf,
    pub display_name: Option<String>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port_in: DEFAULT_PORT_IN,
            port_out: DEFAULT_PORT_OUT,
            server_host: DEFAULT_SERVER_HOST.to_owned(),
            server_port_in: DEFAULT_SERVER_PORT_IN,
            bus_host: DEFAULT_BUS_HOST.to_owned(),
            bus_port_in: DEFAULT_BUS_PORT_IN,
            private_key_path: PathBuf::from(DEFAULT_PRIVATE_KEY_PATH),
            display_name: None,
        }
    }
}

/// Loads a node config from `path`. A missing file falls back to
/// documented defaults entirely.
pub fn load_node_config(path: &Path) -> ConfigResult<NodeConfig> {
    match std::fs::read_to_string(path) {
        Ok(text) => load_node_config_from_str(&text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(NodeConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        }),
    }
}

pub fn load_node_config_from_str(text: &str) -> ConfigResult<NodeConfig> {
    let raw = kv::parse(text);
    let defaults = NodeConfig::default();

    let port = |key: &str, default: u16| -> ConfigResult<u16> {
        match raw.get(key) {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                key: key.to_owned(),
                value: value.clone(),
            }),
            None => Ok(default),
        }
    };
    let host = |key: &str, default: &str| -> String {
        raw.get(key).cloned().unwrap_or_else(|| default.to_owned())
    };

    Ok(NodeConfig {
        host: host("host", &defaults.host),
        port_in: port("port.in", defaults.port_in)?,
        port_out: port("port.out", defaults.port_out)?,
        server_host: host("hostServer", &defaults.server_host),
        server_port_in: port("port.inServer", defaults.server_port_in)?,
        bus_host: host("hostBus", &defaults.bus_host),
        bus_port_in: port("port.inBus", defaults.bus_port_in)?,
        private_key_path: raw
            .get("private_key_path")
            .map(PathBuf::from)
            .unwrap_or(defaults.private_key_path),
        display_name: raw.get("display_name").cloned(),
    })
}
