//! File-type detection from path extensions.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// The detected type of a source module, derived from its file extension.
///
/// Determines which import scanner applies to the module's content. Transform
/// rules match on filenames rather than kinds, so new extensions only need a
/// mapping here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleKind {
    /// JavaScript source (`.js`, `.jsx`, `.mjs`). Scanned for `import`,
    /// `export ... from`, and `require()` specifiers.
    Script,
    /// Stylesheet source (`.css`, `.less`). Scanned for `@import` specifiers.
    Style,
    /// Binary or opaque asset (images, fonts, everything else). Never
    /// scanned for imports.
    Asset,
}

impl ModuleKind {
    /// Detects the module kind from a path's extension.
    ///
    /// Unrecognized or missing extensions are treated as opaque assets.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("js" | "jsx" | "mjs") => Self::Script,
            Some("css" | "less") => Self::Style,
            _ => Self::Asset,
        }
    }

    /// Returns `true` if modules of this kind can declare imports.
    pub fn has_imports(&self) -> bool {
        !matches!(self, Self::Asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_extensions() {
        assert_eq!(ModuleKind::from_path(Path::new("a.js")), ModuleKind::Script);
        assert_eq!(
            ModuleKind::from_path(Path::new("a.jsx")),
            ModuleKind::Script
        );
        assert_eq!(
            ModuleKind::from_path(Path::new("a.mjs")),
            ModuleKind::Script
        );
    }

    #[test]
    fn style_extensions() {
        assert_eq!(ModuleKind::from_path(Path::new("a.css")), ModuleKind::Style);
        assert_eq!(
            ModuleKind::from_path(Path::new("a.less")),
            ModuleKind::Style
        );
    }

    #[test]
    fn everything_else_is_asset() {
        assert_eq!(ModuleKind::from_path(Path::new("a.png")), ModuleKind::Asset);
        assert_eq!(
            ModuleKind::from_path(Path::new("a.woff2")),
            ModuleKind::Asset
        );
        assert_eq!(
            ModuleKind::from_path(Path::new("no_extension")),
            ModuleKind::Asset
        );
    }

    #[test]
    fn assets_have_no_imports() {
        assert!(ModuleKind::Script.has_imports());
        assert!(ModuleKind::Style.has_imports());
        assert!(!ModuleKind::Asset.has_imports());
    }
}
