//! Durable file-backed cache storage
//!
//! Layout: `<root>/<generation>/<sha256(identity)>.entry`. Each entry file is
//! one JSON header line (identity plus response metadata) followed by the raw
//! body. Writes go to a uniquely named temp file in the generation directory
//! and are renamed into place, so concurrent writers of one identity resolve
//! last-write-wins and readers never see a mix of two writes.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tokio::fs;
use tracing::{debug, warn};

use crate::domain::DomainError;
use crate::domain::cache::{CacheStorage, CacheStore, RequestKey, validate_cache_name};
use crate::domain::fetch::{ResponseMeta, StoredResponse};

const ENTRY_EXT: &str = "entry";

/// Cache storage surviving process restarts
#[derive(Debug, Clone)]
pub struct FileCacheStorage {
    root: PathBuf,
}

impl FileCacheStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn generation_dir(&self, name: &str) -> Result<PathBuf, DomainError> {
        validate_cache_name(name)?;
        Ok(self.root.join(name))
    }
}

fn storage_error(context: &str, path: &Path, e: io::Error) -> DomainError {
    DomainError::storage(format!("{} {}: {}", context, path.display(), e))
}

#[async_trait]
impl CacheStorage for FileCacheStorage {
    async fn open(&self, name: &str) -> Result<Arc<dyn CacheStore>, DomainError> {
        let dir = self.generation_dir(name)?;

        fs::create_dir_all(&dir)
            .await
            .map_err(|e| storage_error("Failed to create cache directory", &dir, e))?;

        Ok(Arc::new(FileCacheStore {
            name: name.to_string(),
            dir,
        }))
    }

    async fn has(&self, name: &str) -> Result<bool, DomainError> {
        let dir = self.generation_dir(name)?;

        match fs::metadata(&dir).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(storage_error("Failed to inspect", &dir, e)),
        }
    }

    async fn keys(&self) -> Result<Vec<String>, DomainError> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(storage_error("Failed to read", &self.root, e)),
        };

        let mut names = Vec::new();

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| storage_error("Failed to read", &self.root, e))?
        {
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);

            if let (true, Some(name)) = (is_dir, entry.file_name().to_str()) {
                names.push(name.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    async fn delete(&self, name: &str) -> Result<bool, DomainError> {
        let dir = self.generation_dir(name)?;

        match fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(storage_error("Failed to delete", &dir, e)),
        }
    }
}

/// Header line of an entry file
#[derive(Debug, Serialize, Deserialize)]
struct EntryHeader {
    key: RequestKey,
    response: ResponseMeta,
}

fn encode_entry(key: &RequestKey, response: &StoredResponse) -> io::Result<Vec<u8>> {
    let header = EntryHeader {
        key: key.clone(),
        response: response.meta().clone(),
    };

    // Compact JSON never contains a raw newline
    let mut contents = serde_json::to_vec(&header)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    contents.push(b'\n');
    contents.extend_from_slice(response.body());

    Ok(contents)
}

fn decode_entry(contents: Vec<u8>) -> Result<(EntryHeader, Bytes), String> {
    let split = contents
        .iter()
        .position(|b| *b == b'\n')
        .ok_or("missing header terminator")?;
    let header = serde_json::from_slice(&contents[..split]).map_err(|e| e.to_string())?;

    Ok((header, Bytes::from(contents).slice(split + 1..)))
}

/// One generation directory
#[derive(Debug)]
pub struct FileCacheStore {
    name: String,
    dir: PathBuf,
}

impl FileCacheStore {
    fn entry_path(&self, key: &RequestKey) -> PathBuf {
        self.dir.join(key.to_filename()).with_extension(ENTRY_EXT)
    }

    /// Publishes the entry with a single rename; a failed write leaves any
    /// previously published entry untouched
    async fn write_entry(&self, key: &RequestKey, response: &StoredResponse) -> io::Result<()> {
        let contents = encode_entry(key, response)?;

        // Directory may have been removed with its generation; recreate lazily
        fs::create_dir_all(&self.dir).await?;

        let dir = self.dir.clone();
        let entry_path = self.entry_path(key);

        tokio::task::spawn_blocking(move || -> io::Result<()> {
            let mut temp = NamedTempFile::new_in(&dir)?;
            temp.write_all(&contents)?;
            temp.persist(&entry_path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(io::Error::other)?
    }

    async fn remove_entry(&self, key: &RequestKey) -> io::Result<bool> {
        match fs::remove_file(self.entry_path(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl CacheStore for FileCacheStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup(&self, key: &RequestKey) -> Result<Option<StoredResponse>, DomainError> {
        let path = self.entry_path(key);

        let contents = match fs::read(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_error("Failed to read", &path, e)),
        };

        let (header, body) = match decode_entry(contents) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(path = ?path, error = %e, "Discarding unreadable cache entry");
                let _ = self.remove_entry(key).await;
                return Ok(None);
            }
        };

        if &header.key != key {
            warn!(path = ?path, stored = %header.key, requested = %key, "Cache entry identity mismatch");
            return Ok(None);
        }

        Ok(Some(StoredResponse::from_parts(header.response, body)))
    }

    async fn put(&self, key: RequestKey, response: StoredResponse) -> Result<(), DomainError> {
        key.ensure_cacheable()?;

        self.write_entry(&key, &response)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to store {}: {}", key, e)))?;

        debug!(cache = %self.name, key = %key, "Stored cache entry");
        Ok(())
    }

    /// Writes the batch, removing anything already written if one entry fails
    async fn put_all(&self, batch: Vec<(RequestKey, StoredResponse)>) -> Result<(), DomainError> {
        for (key, _) in &batch {
            key.ensure_cacheable()?;
        }

        let mut written: Vec<&RequestKey> = Vec::with_capacity(batch.len());

        for (key, response) in &batch {
            if let Err(e) = self.write_entry(key, response).await {
                for done in written {
                    if let Err(cleanup) = self.remove_entry(done).await {
                        warn!(cache = %self.name, key = %done, error = %cleanup, "Failed to roll back cache entry");
                    }
                }

                return Err(DomainError::storage(format!(
                    "Failed to store {}: {}",
                    key, e
                )));
            }

            written.push(key);
        }

        Ok(())
    }

    async fn keys(&self) -> Result<Vec<RequestKey>, DomainError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(storage_error("Failed to read", &self.dir, e)),
        };

        let mut keys = Vec::new();

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| storage_error("Failed to read", &self.dir, e))?
        {
            let path = entry.path();
            let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);

            if !is_file || path.extension().and_then(|ext| ext.to_str()) != Some(ENTRY_EXT) {
                continue;
            }

            let parsed = match fs::read(&path).await {
                Ok(contents) => decode_entry(contents).ok(),
                Err(_) => None,
            };

            match parsed {
                Some((header, _)) => keys.push(header.key),
                None => warn!(path = ?path, "Skipping unreadable cache entry"),
            }
        }

        keys.sort();
        Ok(keys)
    }
}
