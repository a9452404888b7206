use super::{StateStore, StoreError};
use crate::key::ActorKey;
use async_trait::async_trait;
use std::fmt::Write as _;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// [`StateStore`] keeping one JSON file per key inside a directory.
///
/// Writes go to a temporary sibling file which is then renamed over the target, so a
/// reader never observes a half-written blob.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens (creating if needed) a store rooted at `dir`.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            StoreError::Unavailable(format!("cannot create {}: {e}", dir.display()))
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the blob for `key`.
    pub fn path_for(&self, key: &ActorKey) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(key)))
    }
}

/// Maps a key onto a file stem that is safe on every platform.
///
/// Alphanumerics and `@ . _ -` pass through; every other byte becomes `%XX`.
fn file_stem(key: &ActorKey) -> String {
    let mut stem = String::with_capacity(key.as_str().len());
    for byte in key.as_str().bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'@' | b'.' | b'_' | b'-' => {
                stem.push(byte as char)
            }
            _ => {
                let _ = write!(stem, "%{byte:02X}");
            }
        }
    }
    stem
}

#[async_trait]
impl StateStore for FileStore {
    async fn load(&self, key: &ActorKey) -> Result<Option<Vec<u8>>, StoreError> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.clone(),
                source,
            }),
        }
    }

    async fn save(&self, key: &ActorKey, blob: Vec<u8>) -> Result<(), StoreError> {
        let target = self.path_for(key);
        let staging = target.with_extension("json.tmp");
        let io_err = |source| StoreError::Io {
            key: key.clone(),
            source,
        };

        tokio::fs::write(&staging, &blob).await.map_err(io_err)?;
        tokio::fs::rename(&staging, &target).await.map_err(io_err)?;
        debug!(%key, bytes = blob.len(), path = %target.display(), "Blob written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem_escapes_separators() {
        assert_eq!(
            file_stem(&ActorKey::from("alice@example.com")),
            "alice@example.com"
        );
        assert_eq!(file_stem(&ActorKey::from("../etc/passwd")), "..%2Fetc%2Fpasswd");
        assert_eq!(file_stem(&ActorKey::from("a b%")), "a%20b%25");
    }

    #[tokio::test]
    async fn test_blob_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let key = ActorKey::from("alice@example.com");

        let store = FileStore::open(dir.path()).await.unwrap();
        assert!(store.load(&key).await.unwrap().is_none());
        store.save(&key, b"{\"items\":[]}".to_vec()).await.unwrap();

        let reopened = FileStore::open(dir.path()).await.unwrap();
        assert_eq!(
            reopened.load(&key).await.unwrap(),
            Some(b"{\"items\":[]}".to_vec())
        );

        assert!(!dir.path().join("alice@example.com.json.tmp").exists());
    }
}
