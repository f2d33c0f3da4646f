//! Logo decoding. A [`Logo`] is only ever built from bytes that decoded
//! successfully, so the renderers can trust it.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use image::ImageFormat;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogoError {
    #[error("failed to read logo file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported logo format (expected PNG or JPEG)")]
    UnsupportedFormat,
    #[error("failed to decode logo: {0}")]
    Decode(#[from] image::ImageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoFormat {
    Png,
    Jpeg,
}

impl LogoFormat {
    pub fn extension(self) -> &'static str {
        match self {
            LogoFormat::Png => "png",
            LogoFormat::Jpeg => "jpg",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Logo {
    pub name: String,
    pub bytes: Arc<[u8]>,
    pub format: LogoFormat,
    pub width: u32,
    pub height: u32,
}

impl Logo {
    /// Stable key for caching the decoded texture of this logo.
    pub fn cache_key(&self) -> (usize, usize) {
        (Arc::as_ptr(&self.bytes) as *const u8 as usize, self.bytes.len())
    }

    /// Decodes the logo into RGBA pixels for display.
    pub fn to_rgba(&self) -> Result<image::RgbaImage, LogoError> {
        let format = match self.format {
            LogoFormat::Png => ImageFormat::Png,
            LogoFormat::Jpeg => ImageFormat::Jpeg,
        };
        Ok(image::load_from_memory_with_format(&self.bytes, format)?.to_rgba8())
    }
}

pub fn decode(name: impl Into<String>, bytes: Vec<u8>) -> Result<Logo, LogoError> {
    let format = match image::guess_format(&bytes) {
        Ok(ImageFormat::Png) => LogoFormat::Png,
        Ok(ImageFormat::Jpeg) => LogoFormat::Jpeg,
        _ => return Err(LogoError::UnsupportedFormat),
    };
    let decoded = image::load_from_memory(&bytes)?;
    Ok(Logo {
        name: name.into(),
        bytes: bytes.into(),
        format,
        width: decoded.width(),
        height: decoded.height(),
    })
}

pub fn load(path: &Path) -> Result<Logo, LogoError> {
    let bytes = fs::read(path).map_err(|source| LogoError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "logo".to_string());
    let logo = decode(name, bytes)?;
    tracing::info!(name = %logo.name, width = logo.width, height = logo.height, "Loaded logo");
    Ok(logo)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;

    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([190, 24, 93, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decodes_png() {
        let logo = decode("mark.png", png_bytes(4, 3)).unwrap();
        assert_eq!(logo.format, LogoFormat::Png);
        assert_eq!((logo.width, logo.height), (4, 3));
        assert_eq!(logo.to_rgba().unwrap().dimensions(), (4, 3));
    }

    #[test]
    fn rejects_non_image_bytes() {
        let err = decode("notes.txt", b"hello world".to_vec()).unwrap_err();
        assert!(matches!(err, LogoError::UnsupportedFormat));
    }

    #[test]
    fn rejects_truncated_png() {
        let mut bytes = png_bytes(8, 8);
        bytes.truncate(bytes.len() / 2);
        assert!(matches!(decode("broken.png", bytes), Err(LogoError::Decode(_))));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("nope.png")).unwrap_err();
        assert!(matches!(err, LogoError::Io { .. }));
    }

    #[test]
    fn load_uses_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brand.png");
        fs::write(&path, png_bytes(2, 2)).unwrap();
        assert_eq!(load(&path).unwrap().name, "brand.png");
    }
}
