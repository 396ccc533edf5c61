//! Bytes of uploaded files, addressable by their local image reference.

use std::collections::HashMap;

use image::RgbaImage;

use crate::error::ViewerError;

/// Scheme of image references served from [`UploadRegistry`].
pub const LOCAL_SCHEME: &str = "local://";

/// Storage for uploaded file contents, keyed by image reference.
#[derive(Clone, Debug, Default)]
pub struct UploadRegistry {
    files: HashMap<String, Vec<u8>>,
}

impl UploadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: impl Into<String>, bytes: Vec<u8>) {
        let url = url.into();
        log::debug!("Registered {} bytes under '{}'", bytes.len(), url);
        self.files.insert(url, bytes);
    }

    pub fn get(&self, url: &str) -> Option<&[u8]> {
        self.files.get(url).map(Vec::as_slice)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.files.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Whether `url` refers to this registry rather than a remote resource.
    pub fn is_local(url: &str) -> bool {
        url.starts_with(LOCAL_SCHEME)
    }

    /// Decode the bytes registered under `url`.
    pub fn decode(&self, url: &str) -> Result<RgbaImage, ViewerError> {
        let bytes = self
            .get(url)
            .ok_or_else(|| ViewerError::image_load(url, "no upload registered"))?;
        image::load_from_memory(bytes)
            .map(|img| img.to_rgba8())
            .map_err(|e| ViewerError::image_load(url, e.to_string()))
    }
}
