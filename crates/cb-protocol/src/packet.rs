use crate::content::Content;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The unit transported end-to-end between nodes.
///
/// `origin_public_key`, when present on the wire, is base64-encoded inside
/// the textual form (handled by the `origin_public_key` serde module
/// below); in memory it is always raw key bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    #[serde(rename = "type")]
    pub packet_type: String,
    pub content: Content,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_port: Option<u16>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "origin_public_key_b64"
    )]
    pub origin_public_key: Option<Vec<u8>>,
    /// Unknown keys tolerated on decode and preserved through re-encode.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Packet {
    pub fn new(packet_type: impl Into<String>, content: Content) -> Self {
        Self {
            packet_type: packet_type.into(),
            content,
            origin: None,
            destination: None,
            host: None,
            origin_port: None,
            dest_port: None,
            origin_public_key: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_origin_port(mut self, port: u16) -> Self {
        self.origin_port = Some(port);
        self
    }

    pub fn with_dest_port(mut self, port: u16) -> Self {
        self.dest_port = Some(port);
        self
    }

    pub fn with_origin_public_key(mut self, key: Vec<u8>) -> Self {
        self.origin_public_key = Some(key);
        self
    }

    /// The `(host, origin_port)` pair used for self-exclusion and
    /// subscriber-table keying.
    pub fn origin_endpoint(&self) -> Option<(&str, u16)> {
        match (self.host.as_deref(), self.origin_port) {
            (Some(h), Some(p)) => Some((h, p)),
            _ => None,
        }
    }
}

mod origin_public_key_b64 {
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(bytes) => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
                serializer.serialize_some(&encoded)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        match encoded {
            Some(s) => base64::engine::general_purpose::STANDARD
                .decode(s.as_bytes())
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
