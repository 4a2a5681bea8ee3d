use crate::error::CryptoResult;
use crate::security_manager::SecurityManager;
use std::path::Path;
use tracing::info;

/// Loads a node's key pair from a private-key PEM file, generating and
/// persisting a fresh pair if the file does not exist yet.
pub fn load_or_generate(private_key_path: &Path) -> CryptoResult<SecurityManager> {
    if private_key_path.exists() {
        let pem = std::fs::read_to_string(private_key_path)?;
        info!(path = %private_key_path.display(), "loaded key pair from file");
        SecurityManager::from_private_key_pem(&pem)
    } else {
        let manager = SecurityManager::generate()?;
        save(&manager, private_key_path)?;
        info!(path = %private_key_path.display(), "generated and persisted new key pair");
        Ok(manager)
    }
}

/// Writes the private key to `private_key_path` and, alongside it, the
/// public key to `<private_key_path>.pub` — the "server public key file"
/// clients load to initialize their Sender.
pub fn save(manager: &SecurityManager, private_key_path: &Path) -> CryptoResult<()> {
    if let Some(parent) = private_key_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(private_key_path, manager.private_key_pem()?)?;
    restrict_to_owner(private_key_path)?;
    std::fs::write(public_key_path_for(private_key_path), manager.public_key_bytes()?)?;
    Ok(())
}

/// Restricts a freshly written private key file to owner read/write,
/// overriding whatever the process umask would otherwise leave it at.
#[cfg(unix)]
fn restrict_to_owner(path: &Path) -> CryptoResult<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o600);
    std::fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path) -> CryptoResult<()> {
    Ok(())
}

pub fn public_key_path_for(private_key_path: &Path) -> std::path::PathBuf {
    let mut s = private_key_path.as_os_str().to_owned();
    s.push(".pub");
    std::path::PathBuf::from(s)
}

/// Loads a peer's public key from its canonical PEM file.
pub fn load_public_key(path: &Path) -> CryptoResult<rsa::RsaPublicKey> {
    let bytes = std::fs::read(path)?;
    SecurityManager::import_public(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_or_generate_persists_and_reloads_identically() {
        let dir = tempdir();
        let path = dir.join("node.key.pem");
        let first = load_or_generate(&path).unwrap();
        let second = load_or_generate(&path).unwrap();
        assert_eq!(first.public_key(), second.public_key());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn save_writes_a_loadable_public_key_file() {
        let dir = tempdir();
        let path = dir.join("node.key.pem");
        let manager = SecurityManager::generate().unwrap();
        save(&manager, &path).unwrap();
        let loaded = load_public_key(&public_key_path_for(&path)).unwrap();
        assert_eq!(loaded, *manager.public_key());
        std::fs::remove_dir_all(&dir).ok();
    }

    fn tempdir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "cb-crypto-test-{:?}",
            std::thread::current().id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}
