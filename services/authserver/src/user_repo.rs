use crate::error::{RepoError, RepoResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

/// One user's persisted state: a mapping from username to
/// `{password_hash, ip, port, color, public_key}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    pub password_hash: String,
    pub ip: String,
    pub port: u16,
    pub color: String,
    #[serde(with = "public_key_b64")]
    pub public_key: Vec<u8>,
}

/// The username-to-record mapping, rewritten atomically on every change,
/// following `cb_crypto::keyfile`'s write discipline: never leave a
/// half-written file visible to a concurrent reader.
pub struct UserRepository {
    path: PathBuf,
    users: Mutex<HashMap<String, UserRecord>>,
}

impl UserRepository {
    pub fn load(path: &Path) -> RepoResult<Self> {
        let users = match std::fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(RepoError::Io(e)),
        };
        Ok(Self {
            path: path.to_owned(),
            users: Mutex::new(users),
        })
    }

    pub fn get(&self, username: &str) -> Option<UserRecord> {
        self.users.lock().unwrap().get(username).cloned()
    }

    pub fn list(&self) -> Vec<(String, UserRecord)> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn register(&self, username: &str, record: UserRecord) -> RepoResult<()> {
        let mut users = self.users.lock().unwrap();
        if users.contains_key(username) {
            return Err(RepoError::UsernameTaken);
        }
        users.insert(username.to_owned(), record);
        self.persist(&users)
    }

    /// Updates `ip`/`port`/`public_key` for an existing user, as happens
    /// on every successful `LOGIN`.
    pub fn update_presence(&self, username: &str, ip: String, port: u16, public_key: Vec<u8>) -> RepoResult<()> {
        let mut users = self.users.lock().unwrap();
        let record = users.get_mut(username).ok_or(RepoError::UnknownUser)?;
        record.ip = ip;
        record.port = port;
        record.public_key = public_key;
        self.persist(&users)
    }

    fn persist(&self, users: &HashMap<String, UserRecord>) -> RepoResult<()> {
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent)?;
        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(serde_json::to_string_pretty(users)?.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| RepoError::Io(e.error))?;
        info!(path = %self.path.display(), users = users.len(), "user file rewritten");
        Ok(())
    }
}

mod public_key_b64 {
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
