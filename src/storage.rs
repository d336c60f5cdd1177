//! Cover image files on disk.
//!
//! Two locations are in use. `store` writes into the storage disk under
//! `movie_covers/` and records the disk-relative path. `update` writes into
//! the public `images/` directory under a time-based name and records the bare
//! file name. Deletion resolves a reference back to whichever location it came
//! from.

use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::upload::UploadedFile;

pub const COVER_PATH: &str = "movie_covers";
pub const IMAGE_PATH: &str = "images";

#[derive(Debug, Clone)]
pub struct CoverStorage {
    disk_root: PathBuf,
    images_dir: PathBuf,
}

/// 13 hex digits: seconds then microseconds of the current time.
pub fn unique_token() -> String {
    let now = Utc::now();
    format!("{:08x}{:05x}", now.timestamp(), now.timestamp_subsec_micros())
}

impl CoverStorage {
    pub fn new(disk_root: impl Into<PathBuf>, public_dir: impl AsRef<Path>) -> Self {
        Self {
            disk_root: disk_root.into(),
            images_dir: public_dir.as_ref().join(IMAGE_PATH),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.storage_dir, &config.public_dir)
    }

    pub fn disk_root(&self) -> &Path {
        &self.disk_root
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Writes `file` to `<disk>/movie_covers/<random>.<ext>` and returns
    /// `movie_covers/<random>.<ext>`.
    pub async fn store_on_disk(&self, file: &UploadedFile) -> io::Result<String> {
        let dir = self.disk_root.join(COVER_PATH);
        fs::create_dir_all(&dir).await?;

        let name = format!("{}.{}", Uuid::new_v4().simple(), file.guess_extension());
        fs::write(dir.join(&name), &file.bytes).await?;

        tracing::debug!(path = %dir.join(&name).display(), bytes = file.size(), "Cover stored on disk");
        Ok(format!("{COVER_PATH}/{name}"))
    }

    /// Writes `file` into the public image directory under a unique
    /// time-based name that keeps the client's extension, and returns that
    /// name.
    pub async fn store_image(&self, file: &UploadedFile) -> io::Result<String> {
        fs::create_dir_all(&self.images_dir).await?;
        let extension = file.client_extension();

        loop {
            let name = match &extension {
                Some(ext) => format!("{}.{ext}", unique_token()),
                None => unique_token(),
            };
            let path = self.images_dir.join(&name);

            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut handle) => {
                    handle.write_all(&file.bytes).await?;
                    handle.flush().await?;
                    tracing::debug!(path = %path.display(), bytes = file.size(), "Cover moved to public images");
                    return Ok(name);
                }
                // Same microsecond as an earlier upload; take the next token.
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(err),
            }
        }
    }

    fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let reference = reference.trim_start_matches('/');
        if reference.is_empty()
            || Path::new(reference)
                .components()
                .any(|c| !matches!(c, std::path::Component::Normal(_)))
        {
            return None;
        }

        if reference.starts_with(&format!("{COVER_PATH}/")) {
            Some(self.disk_root.join(reference))
        } else {
            Some(self.images_dir.join(reference))
        }
    }

    /// Removes the file a cover reference points at. A missing file is not
    /// an error; returns whether something was deleted.
    pub async fn delete_cover(&self, reference: &str) -> io::Result<bool> {
        let Some(path) = self.resolve(reference) else {
            tracing::warn!(reference, "Refusing to delete suspicious cover reference");
            return Ok(false);
        };

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Cover deleted");
                Ok(true)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }
}
