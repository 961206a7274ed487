//! Photo decoding for file, byte and base64 inputs
//!
//! Uploads arrive as base64 text (optionally as a `data:` URL), as raw bytes,
//! or as a path from the CLI. All of them end up as a [`FoodImage`]: the
//! decoded pixels plus the original encoded bytes, which the remote vision
//! adapters forward unchanged.
//!
//! ## Supported Formats
//!
//! Decoding goes through the `image` crate; the format is sniffed from the
//! content, never trusted from a file name:
//! - JPEG, PNG, GIF (first frame), WebP, TIFF, BMP

use crate::error::{AnalysisError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use std::path::Path;
use tracing::debug;

/// Supported photo formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// JPEG image
    Jpeg,
    /// PNG image
    Png,
    /// GIF image (first frame only)
    Gif,
    /// WebP image
    WebP,
    /// TIFF image
    Tiff,
    /// BMP image
    Bmp,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<ImageFormat> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "gif" => Some(ImageFormat::Gif),
            "webp" => Some(ImageFormat::WebP),
            "tiff" | "tif" => Some(ImageFormat::Tiff),
            "bmp" => Some(ImageFormat::Bmp),
            _ => None,
        }
    }

    /// Detect format from the leading bytes of an encoded image
    pub fn sniff(bytes: &[u8]) -> Option<ImageFormat> {
        match image::guess_format(bytes).ok()? {
            image::ImageFormat::Jpeg => Some(ImageFormat::Jpeg),
            image::ImageFormat::Png => Some(ImageFormat::Png),
            image::ImageFormat::Gif => Some(ImageFormat::Gif),
            image::ImageFormat::WebP => Some(ImageFormat::WebP),
            image::ImageFormat::Tiff => Some(ImageFormat::Tiff),
            image::ImageFormat::Bmp => Some(ImageFormat::Bmp),
            _ => None,
        }
    }

    /// MIME type used when forwarding the image to remote services
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Tiff => "image/tiff",
            ImageFormat::Bmp => "image/bmp",
        }
    }
}

/// A decoded food photo together with its original encoding
#[derive(Debug, Clone)]
pub struct FoodImage {
    image: DynamicImage,
    bytes: Vec<u8>,
    format: ImageFormat,
}

impl FoodImage {
    /// Decoded pixels
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Original encoded bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Original bytes re-encoded as standard base64
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// Reject images whose width or height is below `minimum`
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::ImageTooSmall` naming the actual size.
    pub fn validate_dimensions(&self, minimum: u32) -> Result<()> {
        let (width, height) = (self.width(), self.height());
        if width < minimum || height < minimum {
            return Err(AnalysisError::ImageTooSmall {
                width,
                height,
                minimum,
            });
        }
        Ok(())
    }
}

/// Decode a base64 payload into a [`FoodImage`]
///
/// Accepts plain base64 or a `data:image/...;base64,` URL. Embedded
/// whitespace and line breaks are ignored.
///
/// # Errors
///
/// Returns `AnalysisError::ImageDecodeError` if the text is not valid base64
/// or the bytes are not a supported image.
///
/// # Example
///
/// ```rust,no_run
/// use nutriscan::image_loader::decode_base64;
///
/// let photo = decode_base64("iVBORw0KGgo...")?;
/// println!("Decoded photo: {}x{}", photo.width(), photo.height());
/// # Ok::<(), nutriscan::AnalysisError>(())
/// ```
pub fn decode_base64(payload: &str) -> Result<FoodImage> {
    let body = strip_data_url(payload.trim());
    let compact: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(AnalysisError::ImageDecodeError {
            message: "empty image payload".to_string(),
            source: None,
        });
    }

    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| AnalysisError::image_decode("invalid base64 payload", e))?;

    decode_bytes(bytes)
}

/// Decode raw encoded bytes into a [`FoodImage`]
///
/// # Errors
///
/// Returns `AnalysisError::ImageDecodeError` for empty input, unknown formats
/// and corrupt data.
pub fn decode_bytes(bytes: Vec<u8>) -> Result<FoodImage> {
    let format = ImageFormat::sniff(&bytes).ok_or_else(|| AnalysisError::ImageDecodeError {
        message: "unrecognized image format".to_string(),
        source: None,
    })?;

    let image = image::load_from_memory(&bytes)
        .map_err(|e| AnalysisError::image_decode("corrupt image data", e))?;

    debug!(
        width = image.width(),
        height = image.height(),
        ?format,
        "decoded photo"
    );

    Ok(FoodImage {
        image,
        bytes,
        format,
    })
}

/// Load a photo from disk
///
/// # Errors
///
/// Returns `AnalysisError::ImageDecodeError` if the file cannot be read or
/// decoded.
pub fn load_image(path: &Path) -> Result<FoodImage> {
    let bytes = std::fs::read(path).map_err(|e| {
        AnalysisError::image_decode(format!("failed to read {}", path.display()), e)
    })?;
    decode_bytes(bytes)
}

fn strip_data_url(payload: &str) -> &str {
    if payload.starts_with("data:") {
        if let Some((_, body)) = payload.split_once(',') {
            return body;
        }
    }
    payload
}

/// Get list of all supported file extensions
pub fn supported_extensions() -> &'static [&'static str] {
    &["jpg", "jpeg", "png", "gif", "webp", "tiff", "tif", "bmp"]
}

/// Check if a file extension is supported
pub fn is_supported_extension(ext: &str) -> bool {
    let ext_lower = ext.to_lowercase();
    supported_extensions().contains(&ext_lower.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_pixel(width, height, Rgb([200u8, 40, 40]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(
            ImageFormat::from_extension(Path::new("photo.JPEG")),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::from_extension(Path::new("photo.png")),
            Some(ImageFormat::Png)
        );
        assert_eq!(ImageFormat::from_extension(Path::new("photo.xyz")), None);
        assert_eq!(ImageFormat::sniff(&png_bytes(4, 4)), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::sniff(b"hello"), None);
    }

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported_extension("jpg"));
        assert!(is_supported_extension("PNG"));
        assert!(!is_supported_extension("heic"));
        assert!(!is_supported_extension("doc"));
    }

    #[test]
    fn test_decode_base64_plain_and_data_url() {
        let encoded = STANDARD.encode(png_bytes(60, 70));

        let photo = decode_base64(&encoded).unwrap();
        assert_eq!((photo.width(), photo.height()), (60, 70));
        assert_eq!(photo.format().mime_type(), "image/png");

        let data_url = format!("data:image/png;base64,{}", encoded);
        let photo = decode_base64(&data_url).unwrap();
        assert_eq!(photo.width(), 60);
        assert_eq!(photo.to_base64(), encoded);
    }

    #[test]
    fn test_decode_base64_ignores_line_breaks() {
        let encoded = STANDARD.encode(png_bytes(60, 60));
        let wrapped: String = encoded
            .as_bytes()
            .chunks(20)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect::<Vec<_>>()
            .join("\n");
        assert!(decode_base64(&wrapped).is_ok());
    }

    #[test]
    fn test_decode_failures() {
        assert!(matches!(
            decode_base64("not base64 at all!!"),
            Err(AnalysisError::ImageDecodeError { .. })
        ));
        assert!(matches!(
            decode_base64(""),
            Err(AnalysisError::ImageDecodeError { .. })
        ));
        let text = STANDARD.encode(b"plain text, not an image");
        assert!(matches!(
            decode_base64(&text),
            Err(AnalysisError::ImageDecodeError { .. })
        ));
    }

    #[test]
    fn test_truncated_png_is_decode_error() {
        let mut bytes = png_bytes(60, 60);
        bytes.truncate(40);
        assert!(matches!(
            decode_bytes(bytes),
            Err(AnalysisError::ImageDecodeError { .. })
        ));
    }

    #[test]
    fn test_validate_dimensions() {
        let photo = decode_bytes(png_bytes(49, 200)).unwrap();
        match photo.validate_dimensions(50) {
            Err(AnalysisError::ImageTooSmall { width, height, minimum }) => {
                assert_eq!((width, height, minimum), (49, 200, 50));
            }
            other => panic!("expected ImageTooSmall, got {:?}", other),
        }

        let photo = decode_bytes(png_bytes(50, 50)).unwrap();
        assert!(photo.validate_dimensions(50).is_ok());
    }

    #[test]
    fn test_load_image_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plate.png");
        std::fs::write(&path, png_bytes(64, 64)).unwrap();

        let photo = load_image(&path).unwrap();
        assert_eq!(photo.width(), 64);
        assert!(load_image(&dir.path().join("missing.png")).is_err());
    }
}
