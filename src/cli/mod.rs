//! Command-line interface for deckport.
//!
//! Provides commands for converting a deck package to CSV and for
//! inspecting a package without producing output.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::ConvertOptions;
use crate::core::media::MediaManifest;
use crate::core::rewrite::split_fields;
use crate::core::workspace::Workspace;
use crate::core::{archive, collection};
use crate::core::pipeline::Converter;
use crate::domain::AssetOutcome;

/// deckport - flashcard deck package to CSV converter
#[derive(Parser, Debug)]
#[command(name = "deckport")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (YAML); also read from DECKPORT_CONFIG
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a deck package to tab-separated CSV
    Convert {
        /// Path to the .apkg package
        input: PathBuf,

        /// Output file (defaults to <input-base>.csv next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Root directory transcoded media is written under
        #[arg(long)]
        media_root: Option<PathBuf>,

        /// Inline images as base64 data URIs instead of public paths
        #[arg(long)]
        inline: bool,

        /// Abort the conversion after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Show a package's note count, field arity and media entries
    Inspect {
        /// Path to the .apkg package
        input: PathBuf,

        /// Emit JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub fn execute(self) -> Result<()> {
        let mut options = ConvertOptions::load(self.config.as_deref())?;

        match self.command {
            Commands::Convert {
                input,
                output,
                media_root,
                inline,
                timeout,
            } => {
                if let Some(root) = media_root {
                    options.media_root = root;
                }
                options.inline_images = inline;
                if let Some(secs) = timeout {
                    options.timeout = Some(Duration::from_secs(secs));
                }
                convert(&input, output, options)
            }
            Commands::Inspect { input, json } => inspect(&input, json),
        }
    }
}

fn convert(input: &Path, output: Option<PathBuf>, options: ConvertOptions) -> Result<()> {
    let package = fs::read(input)
        .with_context(|| format!("failed to read package: {}", input.display()))?;
    let name = input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("deck.apkg");

    let export = Converter::new(options).convert(&package, name)?;

    let out_path = output.unwrap_or_else(|| input.with_file_name(&export.filename));
    fs::write(&out_path, &export.csv)
        .with_context(|| format!("failed to write output: {}", out_path.display()))?;

    let resolved = export.assets.iter().filter(|a| a.is_resolved()).count();
    let skipped = export.assets.len() - resolved;
    println!(
        "wrote {} ({resolved} assets resolved, {skipped} skipped)",
        out_path.display()
    );
    for asset in &export.assets {
        if let AssetOutcome::Skipped { index, reason } = asset {
            println!("  skipped {index}: {reason}");
        }
    }
    Ok(())
}

fn inspect(input: &Path, json: bool) -> Result<()> {
    let package = fs::read(input)
        .with_context(|| format!("failed to read package: {}", input.display()))?;

    let workspace = Workspace::acquire()?;
    let result = inspect_in(&package, workspace.path(), json);
    workspace.release();
    result
}

fn inspect_in(package: &[u8], workspace: &Path, json: bool) -> Result<()> {
    archive::extract(package, workspace)?;
    let notes = collection::read_notes(workspace)?;
    let manifest = MediaManifest::load(workspace);

    let max_fields = notes
        .iter()
        .map(|n| split_fields(&n.fields_blob).len())
        .max()
        .unwrap_or(0);

    if json {
        let media: HashMap<&str, &str> = manifest.iter().collect();
        let summary = serde_json::json!({
            "notes": notes.len(),
            "max_fields": max_fields,
            "media_entries": media,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("notes:         {}", notes.len());
        println!("max fields:    {max_fields}");
        println!("media entries: {}", manifest.len());
        let mut entries: Vec<(&str, &str)> = manifest.iter().collect();
        entries.sort_unstable();
        for (index, name) in entries {
            println!("  {index} -> {name}");
        }
    }
    Ok(())
}
