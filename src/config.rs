//! Conversion settings.
//!
//! Sources (highest priority first):
//! 1. CLI flags (applied by the caller on top of the result)
//! 2. Environment variables (DECKPORT_MEDIA_ROOT)
//! 3. Config file (YAML, via `--config` or DECKPORT_CONFIG)
//! 4. Built-in defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Raw config file schema.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    /// Root directory transcoded media is published under.
    pub media_root: Option<PathBuf>,

    /// URL prefix exported image paths start with.
    pub public_prefix: Option<String>,

    #[serde(default)]
    pub image: ImageConfig,

    /// Whole-conversion timeout in seconds.
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageConfig {
    pub max_dimension: Option<u32>,
    pub quality: Option<u8>,
}

/// Resolved options the pipeline consumes.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Shared media root; each conversion writes under its own
    /// namespace inside it.
    pub media_root: PathBuf,

    /// Prefix for the public paths written into exported text.
    pub public_prefix: String,

    /// Bounding box for transcoded images.
    pub max_dimension: u32,

    /// JPEG re-encode quality.
    pub jpeg_quality: u8,

    /// Inline images as base64 data URIs instead of public paths.
    pub inline_images: bool,

    /// Cooperative deadline for one conversion, checked between stages.
    pub timeout: Option<Duration>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            media_root: PathBuf::from("public/media"),
            public_prefix: "/media".to_string(),
            max_dimension: 800,
            jpeg_quality: 80,
            inline_images: false,
            timeout: None,
        }
    }
}

impl ConvertOptions {
    /// Build options from an optional config file plus the environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = config_path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("DECKPORT_CONFIG").ok().map(PathBuf::from));

        let file = match path {
            Some(path) => {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config file: {}", path.display()))?;
                serde_yaml::from_str::<ConfigFile>(&text)
                    .with_context(|| format!("failed to parse config file: {}", path.display()))?
            }
            None => ConfigFile::default(),
        };

        let mut options = Self::default().apply(file);
        if let Ok(root) = std::env::var("DECKPORT_MEDIA_ROOT") {
            options.media_root = PathBuf::from(root);
        }
        Ok(options)
    }

    /// Layer config file values over these options.
    pub fn apply(mut self, file: ConfigFile) -> Self {
        if let Some(root) = file.media_root {
            self.media_root = root;
        }
        if let Some(prefix) = file.public_prefix {
            self.public_prefix = prefix;
        }
        if let Some(dim) = file.image.max_dimension {
            self.max_dimension = dim;
        }
        if let Some(quality) = file.image.quality {
            self.jpeg_quality = quality;
        }
        if let Some(secs) = file.timeout_seconds {
            self.timeout = Some(Duration::from_secs(secs));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let options = ConvertOptions::default();
        assert_eq!(options.media_root, PathBuf::from("public/media"));
        assert_eq!(options.public_prefix, "/media");
        assert_eq!(options.max_dimension, 800);
        assert_eq!(options.jpeg_quality, 80);
        assert!(!options.inline_images);
        assert!(options.timeout.is_none());
    }

    #[test]
    fn config_file_parses_and_applies() {
        let file: ConfigFile = serde_yaml::from_str(
            r#"
media_root: /srv/media
public_prefix: /assets
image:
  max_dimension: 400
  quality: 60
timeout_seconds: 30
"#,
        )
        .unwrap();

        let options = ConvertOptions::default().apply(file);

        assert_eq!(options.media_root, PathBuf::from("/srv/media"));
        assert_eq!(options.public_prefix, "/assets");
        assert_eq!(options.max_dimension, 400);
        assert_eq!(options.jpeg_quality, 60);
        assert_eq!(options.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let file: ConfigFile = serde_yaml::from_str("public_prefix: /m").unwrap();
        let options = ConvertOptions::default().apply(file);

        assert_eq!(options.public_prefix, "/m");
        assert_eq!(options.max_dimension, 800);
        assert_eq!(options.jpeg_quality, 80);
    }
}
