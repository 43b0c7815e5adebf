//! Port for storing uploaded listing images.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::listing::ImageRef;

use super::define_port_error;

define_port_error! {
    /// Errors raised by image store adapters.
    pub enum ImageStoreError {
        /// Reading the upload or writing the stored copy failed.
        Io { message: String } =>
            "image store i/o failed: {message}",
    }
}

/// An upload that already passed the type gate, ready to be persisted.
///
/// `source` points at the transport layer's temporary file; it must remain
/// valid until [`ImageStore::save`] returns. `extension` is the validated
/// lowercase extension without the dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub source: PathBuf,
    pub extension: String,
}

/// Port for image persistence.
///
/// Storage happens before the listing record referencing the image is
/// written. Stored files are never deleted by listing mutations; replaced
/// or orphaned images are tolerated.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist the upload and return the reference to store on the
    /// listing.
    async fn save(&self, upload: ImageUpload) -> Result<ImageRef, ImageStoreError>;
}
