//! Native host helpers: logging, file access and image loading.

use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};

use crate::config::LogLevel;
use crate::error::ViewerError;
use crate::ingest::{IMAGE_EXTENSIONS, MEDICAL_EXTENSIONS, UploadFile};

/// Initialize stderr logging. `RUST_LOG` overrides the configured level.
pub fn init_logging(level: LogLevel) {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level.to_level_filter())
        .parse_default_env()
        .target(env_logger::Target::Stderr);
    if let Err(e) = builder.try_init() {
        eprintln!("Logger already initialized: {}", e);
    }
}

/// Show a file dialog for choosing an image to upload.
pub fn pick_upload() -> Option<PathBuf> {
    let mut extensions: Vec<&str> = IMAGE_EXTENSIONS.to_vec();
    extensions.extend_from_slice(MEDICAL_EXTENSIONS);
    rfd::FileDialog::new()
        .set_title("Upload scan")
        .add_filter("Images", extensions.as_slice())
        .pick_file()
}

/// Read a file from disk as an upload, guessing its MIME type from the extension.
pub fn read_upload(path: &Path) -> Result<UploadFile, ViewerError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let bytes = std::fs::read(path)
        .map_err(|e| ViewerError::validation(&name, format!("could not read file: {e}")))?;
    let mime = ImageFormat::from_path(path)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_default();
    log::debug!("Read upload {:?} ({} bytes, mime '{}')", path, bytes.len(), mime);
    Ok(UploadFile::new(name, mime, bytes))
}

/// Load an image reference requested by the session.
///
/// Plain paths and `file://` references are read from disk. Remote references
/// are not fetched by this host and report a load failure.
pub fn load_image(url: &str) -> Result<RgbaImage, ViewerError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        return Err(ViewerError::image_load(
            url,
            "remote images are not fetched by the native host",
        ));
    }
    let path = url.strip_prefix("file://").unwrap_or(url);
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|e| ViewerError::image_load(url, e.to_string()))
}
