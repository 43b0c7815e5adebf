//! Filesystem-backed image store.
//!
//! Accepted uploads are copied into the upload directory under a
//! millisecond-timestamp name and referenced as `/uploads/<file>`. Writes
//! use `create_new`, so a same-millisecond collision bumps the stamp
//! instead of clobbering an earlier image.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::ImageRef;
use crate::domain::ports::{ImageStore, ImageStoreError, ImageUpload};

const PUBLIC_PREFIX: &str = "/uploads";

/// Image store writing into a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct DiskImageStore {
    root: PathBuf,
}

impl DiskImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ImageStore for DiskImageStore {
    async fn save(&self, upload: ImageUpload) -> Result<ImageRef, ImageStoreError> {
        fs::create_dir_all(&self.root).await.map_err(|error| {
            ImageStoreError::io(format!(
                "create upload dir {}: {error}",
                self.root.display()
            ))
        })?;
        let bytes = fs::read(&upload.source).await.map_err(|error| {
            ImageStoreError::io(format!("read upload {}: {error}", upload.source.display()))
        })?;

        let mut stamp = Utc::now().timestamp_millis();
        loop {
            let file_name = format!("{stamp}.{}", upload.extension);
            let path = self.root.join(&file_name);
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(&bytes).await.map_err(|error| {
                        ImageStoreError::io(format!("store image {}: {error}", path.display()))
                    })?;
                    file.flush().await.map_err(|error| {
                        ImageStoreError::io(format!("store image {}: {error}", path.display()))
                    })?;
                    return ImageRef::new(format!("{PUBLIC_PREFIX}/{file_name}"))
                        .map_err(|error| ImageStoreError::io(error.to_string()));
                }
                Err(error) if error.kind() == ErrorKind::AlreadyExists => stamp += 1,
                Err(error) => {
                    return Err(ImageStoreError::io(format!(
                        "store image {}: {error}",
                        path.display()
                    )));
                }
            }
        }
    }
}
