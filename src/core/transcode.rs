//! Image transcoding for referenced media assets.

use std::fs;
use std::io;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use tracing::debug;

use crate::error::ConvertError;

/// Decodes an asset, fits it inside a bounding box and re-encodes it
/// as JPEG.
#[derive(Debug, Clone, Copy)]
pub struct Transcoder {
    /// Bounding box images are scaled to fit within (both axes).
    pub max_dimension: u32,
    /// JPEG re-encode quality, 1-100.
    pub quality: u8,
}

impl Default for Transcoder {
    fn default() -> Self {
        Self {
            max_dimension: 800,
            quality: 80,
        }
    }
}

impl Transcoder {
    /// Decode `asset` and write it as a JPEG to `dest`.
    ///
    /// Aspect ratio is preserved and an image already inside the box is
    /// never enlarged. `index` only labels the error.
    pub fn transcode(&self, asset: &Path, dest: &Path, index: &str) -> Result<(), ConvertError> {
        // Assets are stored under their bare manifest index, so the
        // format must be sniffed from content, not the extension.
        let img = image::ImageReader::open(asset)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| media_err(index, "decode failed", &e))?
            .decode()
            .map_err(|e| media_err(index, "decode failed", &e))?;
        let img = self.fit(img);

        let mut out = fs::File::create(dest).map_err(|e| media_err(index, "write failed", &e))?;
        let encoder = JpegEncoder::new_with_quality(&mut out, self.quality);

        // JPEG carries no alpha channel.
        DynamicImage::ImageRgb8(img.to_rgb8())
            .write_with_encoder(encoder)
            .map_err(|e| media_err(index, "encode failed", &e))?;

        debug!(asset = %asset.display(), dest = %dest.display(), "image transcoded");
        Ok(())
    }

    fn fit(&self, img: DynamicImage) -> DynamicImage {
        if img.width() <= self.max_dimension && img.height() <= self.max_dimension {
            return img;
        }
        img.resize(self.max_dimension, self.max_dimension, FilterType::Lanczos3)
    }
}

/// Inline representation of an already-transcoded JPEG.
pub fn data_uri(jpeg_path: &Path) -> io::Result<String> {
    let bytes = fs::read(jpeg_path)?;
    Ok(format!("data:image/jpeg;base64,{}", STANDARD.encode(bytes)))
}

fn media_err(index: &str, what: &str, e: &dyn std::fmt::Display) -> ConvertError {
    ConvertError::MediaProcessing {
        index: index.to_string(),
        reason: format!("{what}: {e}"),
    }
}
