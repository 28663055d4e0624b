//! The closed set of transform steps.
//!
//! Each step is a pure content-to-content function; a step may additionally
//! emit named side outputs (e.g. an extracted asset file). Steps are
//! serializable so a rule's chain identity can be hashed — changing any
//! step or option invalidates cache entries made under the old chain.

use std::path::Path;

use base64::Engine as _;
use lode_common::hashed_file_name;
use lode_config::{BuildMode, StepConfig};
use serde::{Deserialize, Serialize};

use crate::error::TransformError;

/// Default size limit for [`TransformStep::InlineAsset`]: assets up to 10K
/// are inlined as data URIs, larger ones are emitted as files.
pub const DEFAULT_INLINE_LIMIT: u64 = 10 * 1024;

/// Subdirectory under the destination root for emitted asset files.
const ASSET_DIR: &str = "assets";

/// A single transform step in a rule's chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransformStep {
    /// Passes content through unchanged.
    Passthrough,
    /// Uppercases ASCII content. Mainly useful for demos and tests.
    Uppercase,
    /// Removes `//` and `/* */` comments outside string literals.
    StripComments,
    /// Collapses whitespace runs to single spaces.
    CollapseWhitespace,
    /// Prepends a comment banner.
    Banner {
        /// The banner text.
        text: String,
    },
    /// Substitutes `process.env.NODE_ENV` with the quoted build mode.
    DefineMode,
    /// Inlines small assets as data URIs and emits large ones as hashed
    /// files under `assets/`, replacing the module content with a URL
    /// export either way.
    InlineAsset {
        /// Maximum size in bytes for data-URI inlining.
        limit: u64,
    },
}

/// Context available to every step invocation.
pub struct StepContext<'a> {
    /// The module being transformed (for naming and diagnostics).
    pub module: &'a Path,
    /// The build mode, substituted by [`TransformStep::DefineMode`].
    pub mode: BuildMode,
    /// Hash length for side-artifact filenames.
    pub hash_length: usize,
}

/// The result of applying one step.
#[derive(Debug)]
pub struct StepOutput {
    /// Content passed to the next step (or emitted, for the last step).
    pub content: Vec<u8>,
    /// Side outputs emitted by this step.
    pub side: Vec<SideOutput>,
}

impl StepOutput {
    fn content_only(content: Vec<u8>) -> Self {
        Self {
            content,
            side: Vec::new(),
        }
    }
}

/// A named side output emitted by a step (e.g. an extracted asset).
///
/// The name is a destination-relative path with the content hash already
/// embedded, since the producing step references it from the module output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideOutput {
    /// Destination-relative output path.
    pub name: String,
    /// File content.
    pub bytes: Vec<u8>,
}

impl TransformStep {
    /// The step's configuration name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Passthrough => "passthrough",
            Self::Uppercase => "uppercase",
            Self::StripComments => "strip_comments",
            Self::CollapseWhitespace => "collapse_whitespace",
            Self::Banner { .. } => "banner",
            Self::DefineMode => "define_mode",
            Self::InlineAsset { .. } => "inline_asset",
        }
    }

    /// Builds a step from its configuration form.
    pub fn from_config(config: &StepConfig) -> Result<Self, TransformError> {
        let (name, text, limit) = match config {
            StepConfig::Name(name) => (name.as_str(), None, None),
            StepConfig::Detailed { step, text, limit } => {
                (step.as_str(), text.clone(), *limit)
            }
        };
        match name {
            "passthrough" => Ok(Self::Passthrough),
            "uppercase" => Ok(Self::Uppercase),
            "strip_comments" => Ok(Self::StripComments),
            "collapse_whitespace" => Ok(Self::CollapseWhitespace),
            "define_mode" => Ok(Self::DefineMode),
            "banner" => match text {
                Some(text) => Ok(Self::Banner { text }),
                None => Err(TransformError::MissingOption {
                    step: "banner".to_string(),
                    option: "text".to_string(),
                }),
            },
            "inline_asset" => Ok(Self::InlineAsset {
                limit: limit.unwrap_or(DEFAULT_INLINE_LIMIT),
            }),
            other => Err(TransformError::UnknownStep {
                name: other.to_string(),
            }),
        }
    }

    /// Applies the step to `input`.
    ///
    /// Returns a failure reason on error; the executor attaches the step
    /// name and module path.
    pub fn apply(&self, input: &[u8], ctx: &StepContext<'_>) -> Result<StepOutput, String> {
        match self {
            Self::Passthrough => Ok(StepOutput::content_only(input.to_vec())),
            Self::Uppercase => Ok(StepOutput::content_only(input.to_ascii_uppercase())),
            Self::StripComments => {
                let text = as_text(input)?;
                Ok(StepOutput::content_only(strip_comments(text)))
            }
            Self::CollapseWhitespace => {
                let text = as_text(input)?;
                Ok(StepOutput::content_only(
                    collapse_whitespace(text).into_bytes(),
                ))
            }
            Self::Banner { text } => {
                let mut out = format!("/*! {text} */\n").into_bytes();
                out.extend_from_slice(input);
                Ok(StepOutput::content_only(out))
            }
            Self::DefineMode => {
                let text = as_text(input)?;
                let replacement = format!("\"{}\"", ctx.mode.as_str());
                Ok(StepOutput::content_only(
                    text.replace("process.env.NODE_ENV", &replacement)
                        .into_bytes(),
                ))
            }
            Self::InlineAsset { limit } => Ok(inline_asset(input, *limit, ctx)),
        }
    }
}

/// Interprets step input as UTF-8 text.
fn as_text(input: &[u8]) -> Result<&str, String> {
    std::str::from_utf8(input).map_err(|_| "module content is not valid UTF-8".to_string())
}

/// Removes `//` and `/* */` comments, preserving string literals.
///
/// Works on raw bytes; only whole ASCII-delimited comment regions are
/// removed, so valid UTF-8 input stays valid.
fn strip_comments(src: &str) -> Vec<u8> {
    let bytes = src.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];

        if c == b'/' && bytes.get(i + 1) == Some(&b'/') {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        }

        if c == b'/' && bytes.get(i + 1) == Some(&b'*') {
            i += 2;
            while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                i += 1;
            }
            i = (i + 2).min(bytes.len());
            continue;
        }

        if c == b'\'' || c == b'"' || c == b'`' {
            let quote = c;
            out.push(c);
            i += 1;
            while i < bytes.len() && bytes[i] != quote {
                if bytes[i] == b'\\' && i + 1 < bytes.len() {
                    out.push(bytes[i]);
                    i += 1;
                }
                out.push(bytes[i]);
                i += 1;
            }
            if i < bytes.len() {
                out.push(quote);
                i += 1;
            }
            continue;
        }

        out.push(c);
        i += 1;
    }

    out
}

/// Collapses every whitespace run to a single space and trims the ends.
fn collapse_whitespace(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut in_whitespace = false;
    for c in src.chars() {
        if c.is_whitespace() {
            in_whitespace = true;
        } else {
            if in_whitespace && !out.is_empty() {
                out.push(' ');
            }
            in_whitespace = false;
            out.push(c);
        }
    }
    out
}

/// Inlines or extracts an asset, producing a URL-export module.
fn inline_asset(input: &[u8], limit: u64, ctx: &StepContext<'_>) -> StepOutput {
    let file_name = ctx
        .module
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("asset");

    if input.len() as u64 <= limit {
        let b64 = base64::engine::general_purpose::STANDARD.encode(input);
        let uri = format!("data:{};base64,{b64}", mime_for(file_name));
        return StepOutput::content_only(
            format!("module.exports = \"{uri}\";\n").into_bytes(),
        );
    }

    let name = hashed_file_name(&format!("{ASSET_DIR}/{file_name}"), input, ctx.hash_length);
    let content = format!("module.exports = \"/{name}\";\n").into_bytes();
    StepOutput {
        content,
        side: vec![SideOutput {
            name,
            bytes: input.to_vec(),
        }],
    }
}

/// MIME type guess from a filename extension.
fn mime_for(file_name: &str) -> &'static str {
    match file_name.rsplit('.').next() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("eot") => "application/vnd.ms-fontobject",
        _ => "application/octet-stream",
    }
}
