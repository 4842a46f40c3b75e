//! Codec backed by the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode | `image::ImageReader` with format guessed from content |
//! | Encode | `DynamicImage::save_with_format`, format from the file extension |

use super::backend::{CodecError, FaceCodec};
use image::{DynamicImage, ImageFormat, ImageReader};
use std::path::Path;
use std::sync::LazyLock;

/// Formats with an encoder compiled in, by extension.
const CANDIDATES: &[(&str, ImageFormat)] = &[
    ("png", ImageFormat::Png),
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
    ("bmp", ImageFormat::Bmp),
    ("gif", ImageFormat::Gif),
];

static WRITABLE_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.writing_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Extensions [`ImageCrateCodec::encode`] can write.
pub fn supported_output_extensions() -> &'static [&'static str] {
    &WRITABLE_EXTENSIONS
}

/// Pick the output format for `path` from its extension.
pub fn output_format(path: &Path) -> Result<ImageFormat, CodecError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    ImageFormat::from_extension(ext)
        .filter(|fmt| fmt.writing_enabled())
        .ok_or_else(|| CodecError::UnsupportedFormat(ext.to_string()))
}

/// Production codec.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateCodec;

impl ImageCrateCodec {
    pub fn new() -> Self {
        Self
    }
}

impl FaceCodec for ImageCrateCodec {
    fn decode(&self, path: &Path) -> Result<DynamicImage, CodecError> {
        Ok(ImageReader::open(path)?.with_guessed_format()?.decode()?)
    }

    fn encode(&self, image: &DynamicImage, path: &Path) -> Result<(), CodecError> {
        let format = output_format(path)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // JPEG has no alpha channel.
        if format == ImageFormat::Jpeg && image.color().has_alpha() {
            return Ok(DynamicImage::ImageRgb8(image.to_rgb8()).save_with_format(path, format)?);
        }
        Ok(image.save_with_format(path, format)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    fn sample() -> DynamicImage {
        let mut img = RgbaImage::new(4, 3);
        img.put_pixel(1, 1, Rgba([255, 0, 0, 255]));
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn png_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("face.png");
        let codec = ImageCrateCodec::new();
        codec.encode(&sample(), &path).unwrap();

        let decoded = codec.decode(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 3));
        assert_eq!(decoded.to_rgba8().get_pixel(1, 1), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn jpeg_drops_alpha() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("face.jpg");
        ImageCrateCodec::new().encode(&sample(), &path).unwrap();
        let decoded = ImageCrateCodec::new().decode(&path).unwrap();
        assert_eq!(decoded.width(), 4);
    }

    #[test]
    fn encode_creates_parent_directories() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("niko/portraits/face.png");
        ImageCrateCodec::new().encode(&sample(), &path).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn unsupported_encode_leaves_no_directory() {
        let tmp = TempDir::new().unwrap();
        let result = ImageCrateCodec::new().encode(&sample(), &tmp.path().join("out/face.xyz"));
        assert!(matches!(result, Err(CodecError::UnsupportedFormat(_))));
        assert!(!tmp.path().join("out").exists());
    }

    #[test]
    fn extension_is_case_insensitive() {
        assert_eq!(output_format(Path::new("a/B.PNG")).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        match output_format(Path::new("face.xyz")) {
            Err(CodecError::UnsupportedFormat(ext)) => assert_eq!(ext, "xyz"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(
            output_format(Path::new("face")),
            Err(CodecError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = ImageCrateCodec::new().decode(&tmp.path().join("nope.png"));
        assert!(matches!(result, Err(CodecError::Io(_))));
    }

    #[test]
    fn garbage_file_is_image_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("junk.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        let result = ImageCrateCodec::new().decode(&path);
        assert!(matches!(result, Err(CodecError::Image(_))));
    }

    #[test]
    fn png_is_writable() {
        assert!(supported_output_extensions().contains(&"png"));
    }
}
