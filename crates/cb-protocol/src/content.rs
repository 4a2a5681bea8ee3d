use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The heterogeneous payload carried in a [`crate::Packet`]'s `content`
/// field: a scalar, an ordered sequence, or a string-keyed mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Scalar(Scalar),
    List(Vec<Content>),
    Map(BTreeMap<String, Content>),
}

/// A single leaf value inside [`Content`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl Content {
    pub fn str(s: impl Into<String>) -> Self {
        Content::Scalar(Scalar::Str(s.into()))
    }

    pub fn list_of_strings<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Content::List(
            items
                .into_iter()
                .map(|s| Content::Scalar(Scalar::Str(s.into())))
                .collect(),
        )
    }

    /// Interpret this content as a list of event-type strings, as required
    /// when decoding a `BEGIN_CONNECTION` packet. Non-string
    /// entries are skipped rather than failing the whole packet.
    pub fn as_event_type_list(&self) -> Vec<String> {
        match self {
            Content::List(items) => items
                .iter()
                .filter_map(|c| match c {
                    Content::Scalar(Scalar::Str(s)) => Some(s.clone()),
                    _ => None,
                })
                .collect(),
            Content::Scalar(Scalar::Str(s)) => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Content::Scalar(Scalar::Str(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn map<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Content)>,
        K: Into<String>,
    {
        Content::Map(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Content>> {
        match self {
            Content::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Convenience for the common case of reading a string field out of a
    /// `Content::Map` payload (e.g. `{"username": "alice", ...}`).
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.as_map()?.get(key)?.as_str()
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Content::str(s)
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Content::Scalar(Scalar::Str(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_round_trips_through_json() {
        let c = Content::str("hello");
        let json = serde_json::to_string(&c).unwrap();
        let back: Content = serde_json::from_str(&json).unwrap();
        assert_eq!(c, back);
    }

    #[test]
    fn event_type_list_extracts_strings_only() {
        let c = Content::list_of_strings(["CHAT", "USER_LIST"]);
        assert_eq!(c.as_event_type_list(), vec!["CHAT", "USER_LIST"]);
    }

    #[test]
    fn get_str_reads_a_field_out_of_a_map() {
        let mut map = BTreeMap::new();
        map.insert("username".to_owned(), Content::str("alice"));
        let c = Content::Map(map);
        assert_eq!(c.get_str("username"), Some("alice"));
        assert_eq!(c.get_str("missing"), None);
    }

    #[test]
    fn get_str_on_a_non_map_is_none() {
        assert_eq!(Content::str("x").get_str("username"), None);
    }

    #[test]
    fn empty_list_is_legal_event_type_list() {
        let c = Content::List(vec![]);
        assert!(c.as_event_type_list().is_empty());
    }
}
