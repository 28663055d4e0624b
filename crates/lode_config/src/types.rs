//! Configuration types deserialized from `lode.toml`.

use serde::Deserialize;
use std::collections::BTreeMap;

/// The top-level project configuration parsed from `lode.toml`.
///
/// Contains project metadata, the entry-point map, output settings,
/// import resolution settings, and the ordered transform rule table.
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// Core project metadata (name, version).
    pub project: ProjectMeta,
    /// Named build entry points: logical name → source path relative to
    /// the project root.
    #[serde(default)]
    pub entries: BTreeMap<String, String>,
    /// Output settings (destination root, hash length, mode, preserve).
    #[serde(default)]
    pub build: OutputConfig,
    /// Import resolution settings (extensions, module directories).
    #[serde(default)]
    pub resolve: ResolveConfig,
    /// Ordered transform rules. Earlier rules win when patterns overlap.
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

/// Core project metadata required in every `lode.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// The project version string.
    #[serde(default)]
    pub version: String,
    /// A brief description of the project.
    #[serde(default)]
    pub description: String,
}

/// Output settings controlling where and how artifacts are written.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Destination root directory, relative to the project root.
    #[serde(default = "default_dest")]
    pub dest: String,
    /// Number of hex characters of the content hash embedded in output
    /// filenames.
    #[serde(default = "default_hash_length")]
    pub hash_length: usize,
    /// Build mode, substituted into sources by the `define_mode` step.
    #[serde(default)]
    pub mode: BuildMode,
    /// Glob patterns for destination entries to preserve across the
    /// clean+write cycle (e.g. `["dll", "dll/**"]`).
    #[serde(default)]
    pub preserve: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dest: default_dest(),
            hash_length: default_hash_length(),
            mode: BuildMode::default(),
            preserve: Vec::new(),
        }
    }
}

fn default_dest() -> String {
    "dist".to_string()
}

fn default_hash_length() -> usize {
    6
}

/// The build mode. Affects the `define_mode` transform step only; the
/// pipeline itself is identical in both modes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Development build.
    Development,
    /// Production build.
    #[default]
    Production,
}

impl BuildMode {
    /// The mode string substituted for `process.env.NODE_ENV`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

/// Import resolution settings.
#[derive(Debug, Deserialize)]
pub struct ResolveConfig {
    /// Extensions tried, in order, when a specifier has none
    /// (e.g. `["js", "jsx"]` resolves `./app` to `./app.js`).
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Directories searched, in order, for bare specifiers.
    #[serde(default = "default_module_dirs")]
    pub module_dirs: Vec<String>,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            module_dirs: default_module_dirs(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["js".to_string(), "jsx".to_string()]
}

fn default_module_dirs() -> Vec<String> {
    vec!["node_modules".to_string()]
}

/// A single transform rule: a filename glob pattern plus an ordered list
/// of transform steps.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleConfig {
    /// Filename glob pattern (e.g. `"*.js"`), matched against the module's
    /// file name.
    pub pattern: String,
    /// Ordered transform steps applied to matching modules.
    #[serde(default)]
    pub steps: Vec<StepConfig>,
}

/// A transform step reference in the rule table.
///
/// Uses serde's untagged enum so a step can be a bare name
/// (`"strip_comments"`) or a table with options
/// (`{ step = "inline_asset", limit = 10240 }`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StepConfig {
    /// A bare step name with default options.
    Name(String),
    /// A step with explicit options.
    Detailed {
        /// The step name.
        step: String,
        /// Banner text for the `banner` step.
        #[serde(default)]
        text: Option<String>,
        /// Size limit in bytes for the `inline_asset` step.
        #[serde(default)]
        limit: Option<u64>,
    },
}

impl StepConfig {
    /// Returns the step name regardless of configuration form.
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Detailed { step, .. } => step,
        }
    }
}
