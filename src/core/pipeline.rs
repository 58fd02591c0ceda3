//! The conversion pipeline.
//!
//! One conversion is a forward-only pass:
//! Extracting -> Reading -> Rewriting -> Serializing -> Done.
//! Any error takes the single failure path instead: the unpersisted
//! media output directory is removed, the workspace is released, and
//! the error surfaces to the caller.

use std::ffi::OsStr;
use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use crate::config::ConvertOptions;
use crate::core::media::{sanitize_filename, MediaManifest};
use crate::core::rewrite::{split_fields, ResolvedAsset, Rewriter};
use crate::core::serialize::{self, ExportRow};
use crate::core::transcode::{data_uri, Transcoder};
use crate::core::workspace::{MediaOutputDir, Workspace};
use crate::core::{archive, collection};
use crate::domain::Export;
use crate::error::ConvertError;

/// Pipeline stages, in the only order they can occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Extracting,
    Reading,
    Rewriting,
    Serializing,
}

impl Stage {
    fn as_str(self) -> &'static str {
        match self {
            Stage::Extracting => "extracting",
            Stage::Reading => "reading",
            Stage::Rewriting => "rewriting",
            Stage::Serializing => "serializing",
        }
    }
}

/// Converts one uploaded deck package into tabular text.
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Run the whole pipeline over one package.
    ///
    /// `package_name` is advisory; it only shapes the suggested output
    /// filename and must carry the `.apkg` extension.
    #[instrument(skip(self, package), fields(package = %package_name, bytes = package.len()))]
    pub fn convert(&self, package: &[u8], package_name: &str) -> Result<Export, ConvertError> {
        if package.is_empty() {
            return Err(ConvertError::Input("empty package".to_string()));
        }

        let name_path = Path::new(package_name);
        if name_path.extension().and_then(OsStr::to_str) != Some("apkg") {
            return Err(ConvertError::Input(format!(
                "expected an .apkg package, got {package_name:?}"
            )));
        }
        let base = name_path
            .file_stem()
            .and_then(OsStr::to_str)
            .unwrap_or("deck");

        let deadline = self
            .options
            .timeout
            .map(|limit| (Instant::now() + limit, limit));

        // The workspace is released whichever way `run` exits; its
        // drop impl also covers panics.
        let workspace = Workspace::acquire()?;
        let result = self.run(package, &workspace, base, deadline);
        workspace.release();
        result
    }

    fn run(
        &self,
        package: &[u8],
        workspace: &Workspace,
        base: &str,
        deadline: Option<(Instant, Duration)>,
    ) -> Result<Export, ConvertError> {
        check_deadline(Stage::Extracting, deadline)?;
        archive::extract(package, workspace.path())?;

        check_deadline(Stage::Reading, deadline)?;
        let notes = collection::read_notes(workspace.path())?;
        let manifest = MediaManifest::load(workspace.path());
        info!(notes = notes.len(), media_entries = manifest.len(), "collection read");

        check_deadline(Stage::Rewriting, deadline)?;
        // Allocated only now: extraction or database failures must not
        // leave an empty namespace behind. Dropped without persist() on
        // any later failure, which removes it.
        let media_dir = MediaOutputDir::allocate(&self.options.media_root)?;

        let transcoder = Transcoder {
            max_dimension: self.options.max_dimension,
            quality: self.options.jpeg_quality,
        };
        let inline = self.options.inline_images;
        let public_prefix = self.options.public_prefix.clone();
        let workspace_root = workspace.path().to_path_buf();
        let out_dir = media_dir.path().to_path_buf();
        let namespace = media_dir.namespace().to_string();

        // Resolver: locate the asset by manifest index inside the
        // workspace, transcode it, and report the rewritten src value.
        let resolver = move |index: &str, original_name: &str| {
            let asset = workspace_root.join(index);
            if !asset.is_file() {
                return Err(format!("asset {index} not present in package"));
            }

            let safe_name = sanitize_filename(original_name);
            let dest = out_dir.join(&safe_name);
            transcoder
                .transcode(&asset, &dest, index)
                .map_err(|e| e.to_string())?;

            let public_path = format!("{public_prefix}/{namespace}/{safe_name}");
            let src = if inline {
                data_uri(&dest).map_err(|e| format!("inline encoding failed: {e}"))?
            } else {
                public_path.clone()
            };
            Ok(ResolvedAsset { src, public_path })
        };

        let mut rewriter = Rewriter::new(&manifest, resolver);
        let mut rows = Vec::with_capacity(notes.len());
        for note in &notes {
            let fields = split_fields(&note.fields_blob);
            let front = rewriter.rewrite(fields.first().map(String::as_str).unwrap_or(""));
            let back = rewriter.rewrite(fields.get(1).map(String::as_str).unwrap_or(""));
            rows.push(ExportRow { front, back });
        }
        let assets = rewriter.into_outcomes();

        check_deadline(Stage::Serializing, deadline)?;
        if rows.len() != notes.len() {
            return Err(ConvertError::Serialization(format!(
                "{} rows assembled for {} notes",
                rows.len(),
                notes.len()
            )));
        }
        let csv = serialize::to_csv(&rows);

        let resolved = assets.iter().filter(|a| a.is_resolved()).count();
        info!(
            rows = rows.len(),
            assets_resolved = resolved,
            assets_skipped = assets.len() - resolved,
            "conversion done"
        );

        media_dir.persist();
        Ok(Export {
            csv,
            filename: format!("{base}.csv"),
            content_type: "text/csv",
            assets,
        })
    }
}

fn check_deadline(
    stage: Stage,
    deadline: Option<(Instant, Duration)>,
) -> Result<(), ConvertError> {
    if let Some((at, limit)) = deadline {
        if Instant::now() >= at {
            warn!(stage = stage.as_str(), "deadline exceeded");
            return Err(ConvertError::DeadlineExceeded {
                limit_secs: limit.as_secs(),
            });
        }
    }
    Ok(())
}
