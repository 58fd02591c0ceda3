//! Field splitting and note content rewriting.
//!
//! Deck fields are HTML-ish snippets, but the export format carries no
//! markup, so rewriting is deliberately lossy: image references are
//! resolved and kept, line-break tags become newlines, every other tag
//! is dropped. No input, however malformed, aborts a conversion; the
//! worst case for any one reference is "left as found".

use std::collections::HashMap;

use tracing::warn;

use crate::core::media::MediaManifest;
use crate::domain::AssetOutcome;

/// Field separator inside a note's raw blob (U+001F, unit separator).
pub const FIELD_SEPARATOR: char = '\u{1f}';

/// Split a raw field blob on the unit separator.
///
/// No arity bounds; joining the result with the separator reproduces
/// the blob exactly. Consumers wanting a field past the end read "".
pub fn split_fields(blob: &str) -> Vec<String> {
    blob.split(FIELD_SEPARATOR).map(str::to_string).collect()
}

/// A successfully transcoded asset, as the resolver callback reports
/// it: the value for the rewritten `src` attribute and the public path
/// recorded for the caller (identical unless images are inlined).
#[derive(Debug, Clone)]
pub struct ResolvedAsset {
    pub src: String,
    pub public_path: String,
}

/// Rewrites field content against a manifest and a media resolver.
///
/// The resolver is called at most once per manifest index for the whole
/// conversion; later references reuse the cached result. Outcomes are
/// recorded per index in first-reference order.
pub struct Rewriter<'a, F> {
    manifest: &'a MediaManifest,
    resolver: F,
    cache: HashMap<String, Option<ResolvedAsset>>,
    outcomes: Vec<AssetOutcome>,
}

impl<'a, F> Rewriter<'a, F>
where
    F: FnMut(&str, &str) -> Result<ResolvedAsset, String>,
{
    pub fn new(manifest: &'a MediaManifest, resolver: F) -> Self {
        Self {
            manifest,
            resolver,
            cache: HashMap::new(),
            outcomes: Vec::new(),
        }
    }

    /// Rewrite one field: drop sound tokens, resolve image tags,
    /// normalize line breaks, strip the rest, trim.
    pub fn rewrite(&mut self, field: &str) -> String {
        let text = strip_sound_tokens(field);
        let text = self.rewrite_tags(&text);
        text.trim().to_string()
    }

    /// Per-asset outcomes accumulated across every `rewrite` call.
    pub fn into_outcomes(self) -> Vec<AssetOutcome> {
        self.outcomes
    }

    /// Single pass over tag boundaries. A `<` with no matching `>` is
    /// not a tag and stays literal.
    fn rewrite_tags(&mut self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(open) = rest.find('<') {
            out.push_str(&rest[..open]);
            let tail = &rest[open..];
            let Some(close) = tail.find('>') else {
                out.push_str(tail);
                return out;
            };
            self.emit_tag(&tail[..=close], &mut out);
            rest = &tail[close + 1..];
        }

        out.push_str(rest);
        out
    }

    fn emit_tag(&mut self, tag: &str, out: &mut String) {
        let name = tag_name(tag);
        if name.eq_ignore_ascii_case("img") {
            let rewritten = self.rewrite_img(tag);
            // Image tags always sit alone on their own line.
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&rewritten);
            out.push('\n');
        } else if name.eq_ignore_ascii_case("br") {
            out.push('\n');
        }
        // Anything else is presentation markup the export cannot carry.
    }

    fn rewrite_img(&mut self, tag: &str) -> String {
        let Some(src) = attr_value(tag, "src") else {
            return tag.to_string();
        };
        let manifest = self.manifest;
        let Some(original_name) = manifest.get(src) else {
            return tag.to_string();
        };
        match self.resolve_cached(src, original_name) {
            Some(resolved) => format!("<img src=\"{}\">", resolved.src),
            None => tag.to_string(),
        }
    }

    fn resolve_cached(&mut self, index: &str, original_name: &str) -> Option<ResolvedAsset> {
        if let Some(hit) = self.cache.get(index) {
            return hit.clone();
        }

        let entry = match (self.resolver)(index, original_name) {
            Ok(resolved) => {
                self.outcomes.push(AssetOutcome::Resolved {
                    index: index.to_string(),
                    public_path: resolved.public_path.clone(),
                });
                Some(resolved)
            }
            Err(reason) => {
                warn!(index, reason = %reason, "media asset skipped");
                self.outcomes.push(AssetOutcome::Skipped {
                    index: index.to_string(),
                    reason,
                });
                None
            }
        };

        self.cache.insert(index.to_string(), entry.clone());
        entry
    }
}

/// Tag name right after `<` and an optional `/`.
fn tag_name(tag: &str) -> &str {
    let inner = tag
        .trim_start_matches('<')
        .trim_start_matches('/')
        .trim_start();
    let end = inner
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(inner.len());
    &inner[..end]
}

/// Value of a double-quoted attribute inside one tag.
fn attr_value<'t>(tag: &'t str, name: &str) -> Option<&'t str> {
    let needle = format!("{name}=\"", name = name.to_ascii_lowercase());
    let pos = tag.to_ascii_lowercase().find(&needle)?;
    let rest = &tag[pos + needle.len()..];
    let end = rest.find('"')?;
    Some(&rest[..end])
}

/// Remove every `[sound:…]` token, asset or no asset. The export has
/// no inline audio support. An unterminated token stays literal.
fn strip_sound_tokens(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("[sound:") {
        let Some(end) = rest[start..].find(']') else {
            break;
        };
        out.push_str(&rest[..start]);
        rest = &rest[start + end + 1..];
    }

    out.push_str(rest);
    out
}
