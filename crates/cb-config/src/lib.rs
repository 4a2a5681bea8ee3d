//! Loads the key=value-with-`#`-comments node configuration.

mod error;
mod kv;
mod node;

pub use error::{ConfigError, ConfigResult};
pub use node::{load_node_config, load_node_config_from_str, NodeConfig};
