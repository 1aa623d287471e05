//! In-memory user-selected image file.

use std::path::Path;
use std::time::SystemTime;

/// An image file as selected by the user: name, declared type and bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub name: String,
    /// Declared MIME type, if the picker or filesystem reported one.
    pub content_type: Option<String>,
    pub data: Vec<u8>,
    pub last_modified: SystemTime,
}

impl SourceImage {
    pub fn new(name: impl Into<String>, content_type: Option<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type,
            data,
            last_modified: SystemTime::now(),
        }
    }

    /// Read a file from disk, guessing the content type from its extension.
    pub async fn open(path: &Path) -> std::io::Result<Self> {
        let data = tokio::fs::read(path).await?;
        let modified = tokio::fs::metadata(path).await.and_then(|m| m.modified());
        Ok(Self::from_file(path, data, modified))
    }

    /// Blocking [`open`](Self::open), for rayon workers.
    pub fn read(path: &Path) -> std::io::Result<Self> {
        let data = std::fs::read(path)?;
        let modified = std::fs::metadata(path).and_then(|m| m.modified());
        Ok(Self::from_file(path, data, modified))
    }

    fn from_file(path: &Path, data: Vec<u8>, modified: std::io::Result<SystemTime>) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = guess_content_type(&name).map(str::to_string);
        Self {
            name,
            content_type,
            data,
            last_modified: modified.unwrap_or_else(|_| SystemTime::now()),
        }
    }

    /// Lowercased extension of [`name`](Self::name), if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
    }
}

/// MIME type for common photo extensions.
pub fn guess_content_type(name: &str) -> Option<&'static str> {
    let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "avif" => "image/avif",
        _ => return None,
    };
    Some(mime)
}
