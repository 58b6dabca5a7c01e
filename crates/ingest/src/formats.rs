//! Accepted drawing formats and their signatures.
//!
//! The whitelist is fixed: PNG, JPEG (under both `image/jpeg` and the
//! non-standard `image/jpg` that some browsers send) and PDF.
use serde::{Deserialize, Serialize};

/// The declared MIME types an upload may carry.
pub const SUPPORTED_CONTENT_TYPES: [&str; 4] =
    ["image/png", "image/jpeg", "image/jpg", "application/pdf"];

/// Upper bound for a single upload: 50 MiB.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8, 0xFF];
const PDF_SIGNATURE: &[u8] = b"%PDF-";

/// A drawing format accepted by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawingFormat {
    Png,
    Jpeg,
    Pdf,
}

impl DrawingFormat {
    /// Resolve a declared content type to a format.
    ///
    /// Parameters (`; charset=...`) are ignored and the comparison is ASCII
    /// case-insensitive.
    ///
    /// ```rust
    /// use ingest::DrawingFormat;
    ///
    /// assert_eq!(DrawingFormat::from_content_type("image/jpg"), Some(DrawingFormat::Jpeg));
    /// assert_eq!(DrawingFormat::from_content_type("Application/PDF"), Some(DrawingFormat::Pdf));
    /// assert_eq!(DrawingFormat::from_content_type("text/plain"), None);
    /// ```
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match mime_essence(content_type).as_str() {
            "image/png" => Some(DrawingFormat::Png),
            "image/jpeg" | "image/jpg" => Some(DrawingFormat::Jpeg),
            "application/pdf" => Some(DrawingFormat::Pdf),
            _ => None,
        }
    }

    /// Detect a format from the leading bytes of a payload.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        [DrawingFormat::Png, DrawingFormat::Jpeg, DrawingFormat::Pdf]
            .into_iter()
            .find(|format| bytes.starts_with(format.signature()))
    }

    /// Canonical file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            DrawingFormat::Png => "png",
            DrawingFormat::Jpeg => "jpg",
            DrawingFormat::Pdf => "pdf",
        }
    }

    /// Canonical MIME type.
    pub fn mime_type(self) -> &'static str {
        match self {
            DrawingFormat::Png => "image/png",
            DrawingFormat::Jpeg => "image/jpeg",
            DrawingFormat::Pdf => "application/pdf",
        }
    }

    fn signature(self) -> &'static [u8] {
        match self {
            DrawingFormat::Png => PNG_SIGNATURE,
            DrawingFormat::Jpeg => JPEG_SIGNATURE,
            DrawingFormat::Pdf => PDF_SIGNATURE,
        }
    }
}

impl std::fmt::Display for DrawingFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Strip MIME parameters, surrounding whitespace and case.
pub(crate) fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
