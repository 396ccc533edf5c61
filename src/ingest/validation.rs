//! Upload validation.

use crate::error::ViewerError;

/// Raster image extensions accepted when the MIME type is missing
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tiff", "tif", "webp"];

/// Medical image extensions
pub const MEDICAL_EXTENSIONS: &[&str] = &["dcm", "dicom"];

/// A file handed over by a file picker or drop target.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// File name as reported by the host
    pub name: String,
    /// MIME type as reported by the host (may be empty)
    pub mime: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFile")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl UploadFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Lower-cased extension without the dot.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_lowercase())
    }
}

/// Accept image MIME types and recognized image/medical extensions.
pub fn validate_upload(file: &UploadFile) -> Result<(), ViewerError> {
    if file.mime.to_lowercase().starts_with("image/") {
        return Ok(());
    }
    match file.extension() {
        Some(ext)
            if IMAGE_EXTENSIONS.contains(&ext.as_str())
                || MEDICAL_EXTENSIONS.contains(&ext.as_str()) =>
        {
            Ok(())
        }
        Some(ext) => Err(ViewerError::validation(
            &file.name,
            format!("unsupported file type '.{ext}'"),
        )),
        None => Err(ViewerError::validation(
            &file.name,
            "file has no recognizable type",
        )),
    }
}
