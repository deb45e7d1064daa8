//! # Source Document Module
//!
//! Immutable upload payload plus its declared media type, and the checks that
//! decide whether a payload is accepted before any processing begins.
//!
//! SVG, AVIF, HEIC and HEIF uploads are accepted but the `image` build used
//! here cannot decode them; they fail at decode time with an `ImageLoad`
//! error naming the type (see [`UNDECODABLE_IMAGE_TYPES`]).

use std::path::Path;

use tracing::{debug, info};

use crate::errors::{AppError, AppResult};
use crate::extraction_errors::PipelineError;

/// Raster media types accepted by the pipeline
pub const SUPPORTED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/bmp",
    "image/webp",
    "image/tiff",
    "image/tif",
    "image/svg+xml",
    "image/x-icon",
    "image/vnd.microsoft.icon",
    "image/avif",
    "image/heic",
    "image/heif",
];

/// Accepted raster types the image decoder has no codec for
pub const UNDECODABLE_IMAGE_TYPES: &[&str] =
    &["image/svg+xml", "image/avif", "image/heic", "image/heif"];

/// Paginated document media type (first page only is processed)
pub const PAGINATED_DOCUMENT_TYPE: &str = "application/pdf";

/// File extensions accepted when the declared media type is missing or generic
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff", "tif", "svg", "ico", "avif", "heic",
    "heif", "pdf",
];

const PDF_MAGIC: &[u8] = b"%PDF";

/// How a document has to be turned into pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// A single raster image
    Raster,
    /// A multi-page document that needs rasterization
    Paginated,
}

/// Uploaded document: bytes plus the metadata used for validation and cache keys
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    bytes: Vec<u8>,
    media_type: String,
    file_name: Option<String>,
    modified_unix_ms: Option<i64>,
}

impl SourceDocument {
    /// Create a document from raw bytes and a declared media type
    pub fn new(bytes: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            bytes,
            media_type: media_type.into(),
            file_name: None,
            modified_unix_ms: None,
        }
    }

    /// Attach the original file name
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Attach the modification time in milliseconds since the epoch
    pub fn with_modified(mut self, modified_unix_ms: i64) -> Self {
        self.modified_unix_ms = Some(modified_unix_ms);
        self
    }

    /// Read a document from disk, deriving the media type from its extension
    pub fn from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let metadata = std::fs::metadata(path)?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AppError::FileSystem(format!("invalid file name: {}", path.display())))?
            .to_string();
        let media_type = media_type_for_extension(&file_name)
            .unwrap_or("application/octet-stream")
            .to_string();

        let mut document = Self::new(bytes, media_type).with_file_name(file_name);
        if let Ok(modified) = metadata.modified() {
            if let Ok(since_epoch) = modified.duration_since(std::time::UNIX_EPOCH) {
                document = document.with_modified(since_epoch.as_millis() as i64);
            }
        }

        info!(
            path = %path.display(),
            size_bytes = document.size(),
            media_type = %document.media_type,
            "Loaded document from disk"
        );
        Ok(document)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn modified_unix_ms(&self) -> Option<i64> {
        self.modified_unix_ms
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Decide whether the document is accepted and how it must be rendered.
    ///
    /// The declared media type decides. Only a generic declaration
    /// (`application/octet-stream` or empty) falls back to the file
    /// extension, then to sniffing the first `buffer_size` bytes.
    ///
    /// # Errors
    ///
    /// Returns `EmptyPayload`, `PayloadTooLarge` or `UnsupportedMediaType`.
    pub fn validate(&self, max_size: u64, buffer_size: usize) -> Result<MediaKind, PipelineError> {
        if self.bytes.is_empty() {
            return Err(PipelineError::EmptyPayload);
        }
        if self.size() > max_size {
            return Err(PipelineError::PayloadTooLarge {
                size: self.size(),
                limit: max_size,
            });
        }

        let declared = normalize_media_type(&self.media_type);
        if let Some(kind) = media_kind_for_type(&declared) {
            return Ok(kind);
        }

        if declared.is_empty() || declared == "application/octet-stream" {
            if let Some(kind) = self
                .file_name
                .as_deref()
                .and_then(media_type_for_extension)
                .and_then(media_kind_for_type)
            {
                debug!(file_name = ?self.file_name, "Media kind resolved from file extension");
                return Ok(kind);
            }
            if let Some(kind) = sniff_media_kind(&self.bytes, buffer_size) {
                debug!(?kind, "Media kind resolved from content sniffing");
                return Ok(kind);
            }
        }

        Err(PipelineError::UnsupportedMediaType(if declared.is_empty() {
            "unknown".to_string()
        } else {
            declared
        }))
    }
}

/// Lowercase a media type and drop any parameters (`; charset=...`)
fn normalize_media_type(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Map an accepted media type to its media kind
pub fn media_kind_for_type(media_type: &str) -> Option<MediaKind> {
    let normalized = normalize_media_type(media_type);
    if normalized == PAGINATED_DOCUMENT_TYPE {
        Some(MediaKind::Paginated)
    } else if SUPPORTED_IMAGE_TYPES.contains(&normalized.as_str()) {
        Some(MediaKind::Raster)
    } else {
        None
    }
}

/// Whether an accepted raster type can be decoded by this build
pub fn is_decodable_image_type(media_type: &str) -> bool {
    !UNDECODABLE_IMAGE_TYPES.contains(&normalize_media_type(media_type).as_str())
}

/// Map a file name to the media type of its extension, if accepted
pub fn media_type_for_extension(file_name: &str) -> Option<&'static str> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())?
        .to_ascii_lowercase();
    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return None;
    }
    Some(match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "tiff" | "tif" => "image/tiff",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "avif" => "image/avif",
        "heic" => "image/heic",
        "heif" => "image/heif",
        _ => PAGINATED_DOCUMENT_TYPE,
    })
}

/// Identify the format from the document header
pub fn detect_image_format(bytes: &[u8], buffer_size: usize) -> Option<image::ImageFormat> {
    let header = &bytes[..bytes.len().min(buffer_size)];
    image::guess_format(header).ok()
}

fn sniff_media_kind(bytes: &[u8], buffer_size: usize) -> Option<MediaKind> {
    if bytes.starts_with(PDF_MAGIC) {
        return Some(MediaKind::Paginated);
    }
    detect_image_format(bytes, buffer_size).map(|_| MediaKind::Raster)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    #[test]
    fn test_declared_media_types() {
        let doc = SourceDocument::new(vec![1, 2, 3], "image/png");
        assert_eq!(doc.validate(1024, 32), Ok(MediaKind::Raster));

        let doc = SourceDocument::new(vec![1, 2, 3], "Application/PDF; version=1.7");
        assert_eq!(doc.validate(1024, 32), Ok(MediaKind::Paginated));

        let doc = SourceDocument::new(vec![1, 2, 3], "image/heic");
        assert_eq!(doc.validate(1024, 32), Ok(MediaKind::Raster));
    }

    #[test]
    fn test_unsupported_media_type_is_rejected() {
        let doc = SourceDocument::new(b"hello".to_vec(), "text/plain");
        assert_eq!(
            doc.validate(1024, 32),
            Err(PipelineError::UnsupportedMediaType("text/plain".to_string()))
        );
    }

    #[test]
    fn test_extension_fallback() {
        let doc = SourceDocument::new(vec![1, 2, 3], "application/octet-stream")
            .with_file_name("scan.TIF");
        assert_eq!(doc.validate(1024, 32), Ok(MediaKind::Raster));

        let doc = SourceDocument::new(vec![1, 2, 3], "").with_file_name("notes.txt");
        assert!(doc.validate(1024, 32).is_err());
    }

    #[test]
    fn test_specific_declaration_ignores_extension() {
        let doc = SourceDocument::new(PNG_HEADER.to_vec(), "text/plain").with_file_name("scan.png");
        assert_eq!(
            doc.validate(1024, 32),
            Err(PipelineError::UnsupportedMediaType("text/plain".to_string()))
        );

        let doc = SourceDocument::new(PNG_HEADER.to_vec(), "").with_file_name("scan.png");
        assert_eq!(doc.validate(1024, 32), Ok(MediaKind::Raster));
    }

    #[test]
    fn test_decodable_image_types() {
        assert!(is_decodable_image_type("image/png"));
        assert!(is_decodable_image_type("IMAGE/JPEG"));
        assert!(!is_decodable_image_type("image/heic"));
        assert!(!is_decodable_image_type("image/svg+xml; charset=utf-8"));
    }

    #[test]
    fn test_content_sniffing_for_generic_types() {
        let doc = SourceDocument::new(PNG_HEADER.to_vec(), "application/octet-stream");
        assert_eq!(doc.validate(1024, 32), Ok(MediaKind::Raster));

        let doc = SourceDocument::new(b"%PDF-1.4 ...".to_vec(), "");
        assert_eq!(doc.validate(1024, 32), Ok(MediaKind::Paginated));
    }

    #[test]
    fn test_size_limits() {
        let doc = SourceDocument::new(Vec::new(), "image/png");
        assert_eq!(doc.validate(1024, 32), Err(PipelineError::EmptyPayload));

        let doc = SourceDocument::new(vec![0; 11], "image/png");
        assert_eq!(
            doc.validate(10, 32),
            Err(PipelineError::PayloadTooLarge { size: 11, limit: 10 })
        );
    }

    #[test]
    fn test_media_type_for_extension() {
        assert_eq!(media_type_for_extension("a.JPG"), Some("image/jpeg"));
        assert_eq!(media_type_for_extension("a.pdf"), Some("application/pdf"));
        assert_eq!(media_type_for_extension("a.ico"), Some("image/x-icon"));
        assert_eq!(media_type_for_extension("a.docx"), None);
        assert_eq!(media_type_for_extension("noext"), None);
    }

    #[test]
    fn test_detect_image_format() {
        assert_eq!(
            detect_image_format(PNG_HEADER, 32),
            Some(image::ImageFormat::Png)
        );
        assert_eq!(detect_image_format(b"plain text", 32), None);
    }
}
