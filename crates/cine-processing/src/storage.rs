//! Snapshot and artifact mirroring.
//!
//! [`ArtifactStore`] is a small synchronous facade over the `object_store`
//! crate. The pipeline only needs four verbs (list, upload, download,
//! exists) and treats a missing key as "no prior artifact", never as an
//! error. Two backends are supported: an S3 bucket (credentials resolved
//! from the environment by the storage library) and a plain local
//! directory used when no bucket is configured and by tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as StorePath;
use object_store::{ObjectStore, PutPayload};
use tokio::runtime::Runtime;
use tracing::{info, warn};

use crate::config::{Settings, StorageSettings};
use crate::error::Result;

/// Synchronous facade over an object-store backend.
pub struct ArtifactStore {
    store: Arc<dyn ObjectStore>,
    runtime: Runtime,
    label: String,
}

impl ArtifactStore {
    /// Build the store selected by the settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        match &settings.storage {
            StorageSettings::S3 { bucket, region } => Self::s3(bucket, region),
            StorageSettings::Local { root } => Self::local(root),
        }
    }

    /// Bucket backend. Authentication is delegated to the storage library's
    /// environment lookup.
    pub fn s3(bucket: &str, region: &str) -> Result<Self> {
        let store = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .with_region(region)
            .build()?;

        Ok(ArtifactStore {
            store: Arc::new(store),
            runtime: new_runtime()?,
            label: format!("s3://{bucket}"),
        })
    }

    /// Directory backend rooted at `root`, created if absent.
    pub fn local(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)?;
        let store = LocalFileSystem::new_with_prefix(root)?;

        Ok(ArtifactStore {
            store: Arc::new(store),
            runtime: new_runtime()?,
            label: root.display().to_string(),
        })
    }

    /// Sorted keys under `prefix`.
    pub fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix = StorePath::from(prefix);
        let mut keys: Vec<String> = self.runtime.block_on(
            self.store
                .list(Some(&prefix))
                .map_ok(|meta| meta.location.to_string())
                .try_collect(),
        )?;
        keys.sort();
        Ok(keys)
    }

    /// Upload a local file under `remote_prefix`, keyed by its file name.
    ///
    /// Returns the full key written.
    pub fn upload(&self, local_path: &Path, remote_prefix: &str) -> Result<String> {
        let file_name = file_name_of(local_path);
        let key = format!("{}/{}", remote_prefix.trim_end_matches('/'), file_name);

        let bytes = fs::read(local_path)?;
        self.runtime
            .block_on(self.store.put(&StorePath::from(key.as_str()), PutPayload::from(bytes)))?;

        info!("Uploaded {} -> {}/{}", local_path.display(), self.label, key);
        Ok(key)
    }

    /// Download `key` into `local_dir`, keeping the key's file name.
    ///
    /// A missing key is not an error: the surrounding prefix is listed for
    /// diagnostics and `None` is returned so callers can treat the miss as
    /// "no prior artifact".
    pub fn download(&self, key: &str, local_dir: &Path) -> Result<Option<PathBuf>> {
        let remote = StorePath::from(key);

        match self.runtime.block_on(self.store.head(&remote)) {
            Ok(_) => {}
            Err(object_store::Error::NotFound { .. }) => {
                warn!("No object at {}/{}", self.label, key);
                self.log_sibling_keys(key);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }

        let bytes = self.runtime.block_on(async {
            let result = self.store.get(&remote).await?;
            result.bytes().await
        })?;

        fs::create_dir_all(local_dir)?;
        let local_path = local_dir.join(file_name_of(Path::new(key)));
        fs::write(&local_path, bytes)?;

        info!("Downloaded {}/{} -> {}", self.label, key, local_path.display());
        Ok(Some(local_path))
    }

    /// Whether `key` exists in the store.
    pub fn exists(&self, key: &str) -> Result<bool> {
        match self.runtime.block_on(self.store.head(&StorePath::from(key))) {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// List what does exist next to a missed key, as a download-miss
    /// diagnostic.
    fn log_sibling_keys(&self, key: &str) {
        let parent = match key.rsplit_once('/') {
            Some((parent, _)) => parent.to_string(),
            None => String::new(),
        };

        match self.list(&parent) {
            Ok(keys) if keys.is_empty() => {
                info!("Prefix '{}' holds no objects", parent);
            }
            Ok(keys) => {
                info!("Objects under '{}': {:?}", parent, keys);
            }
            Err(e) => {
                warn!("Could not list prefix '{}': {}", parent, e);
            }
        }
    }
}

fn new_runtime() -> std::io::Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
