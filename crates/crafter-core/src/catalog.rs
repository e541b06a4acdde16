//! Registry of supported output frameworks.
//!
//! Every framework the generator can target lives in a single static table.
//! The active selection is always a `&'static FrameworkEntry` into that table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A generation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Framework {
    #[default]
    HtmlCss,
    HtmlTailwind,
    HtmlBootstrap,
    ReactJs,
    ReactTailwind,
    ReactBootstrap,
    NextJs,
    Angular,
}

impl Framework {
    /// Catalog entry for this framework.
    pub fn entry(self) -> &'static FrameworkEntry {
        // CATALOG is declared in enum order.
        &CATALOG[self as usize]
    }

    /// Stable identifier (e.g. "react-js").
    pub fn id(self) -> &'static str {
        self.entry().id
    }

    /// Check if this framework is plain markup that needs no component compilation.
    pub fn is_markup(self) -> bool {
        matches!(self, Self::HtmlCss | Self::HtmlTailwind | Self::HtmlBootstrap)
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Framework {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(s).map(|entry| entry.framework)
    }
}

/// Kind of file a framework's output is saved as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// Standalone HTML document
    Markup,
    /// JSX component module
    ComponentScript,
    /// TypeScript component module
    TypedComponent,
}

impl FileKind {
    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Markup => "html",
            Self::ComponentScript => "jsx",
            Self::TypedComponent => "ts",
        }
    }

    /// MIME type used when the file is downloaded.
    pub fn mime_type(self) -> &'static str {
        mime_for_extension(self.extension())
    }
}

/// Map a file extension to its download MIME type.
///
/// Unknown extensions are served as `text/plain`.
pub fn mime_for_extension(extension: &str) -> &'static str {
    match extension {
        "html" => "text/html",
        "jsx" => "text/javascript",
        "ts" => "text/typescript",
        _ => "text/plain",
    }
}

/// A static catalog entry.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct FrameworkEntry {
    /// Closed tag for this entry
    #[serde(skip)]
    pub framework: Framework,

    /// Unique identifier used by the UI and config
    pub id: &'static str,

    /// Human-readable label, also quoted in the prompt
    pub label: &'static str,

    /// Framework-specific instruction embedded in the prompt
    pub instruction: &'static str,

    /// Output file kind
    pub file_kind: FileKind,
}

impl FrameworkEntry {
    /// File extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        self.file_kind.extension()
    }

    /// MIME type for downloads.
    pub fn mime_type(&self) -> &'static str {
        self.file_kind.mime_type()
    }
}

/// Errors from catalog lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Unknown framework: {0}")]
    UnknownFramework(String),
}

static CATALOG: [FrameworkEntry; 8] = [
    FrameworkEntry {
        framework: Framework::HtmlCss,
        id: "html-css",
        label: "HTML + CSS",
        instruction: "Return a complete HTML + CSS code inside a single HTML file.",
        file_kind: FileKind::Markup,
    },
    FrameworkEntry {
        framework: Framework::HtmlTailwind,
        id: "html-tailwind",
        label: "HTML + Tailwind CSS",
        instruction: "Return a complete HTML file using Tailwind CSS via CDN.",
        file_kind: FileKind::Markup,
    },
    FrameworkEntry {
        framework: Framework::HtmlBootstrap,
        id: "html-bootstrap",
        label: "HTML + Bootstrap",
        instruction: "Return a complete HTML file using Bootstrap via CDN.",
        file_kind: FileKind::Markup,
    },
    FrameworkEntry {
        framework: Framework::ReactJs,
        id: "react-js",
        label: "React JS",
        instruction: "Return only React component code in JSX format, without <html>, <body>, or <script> tags.",
        file_kind: FileKind::ComponentScript,
    },
    FrameworkEntry {
        framework: Framework::ReactTailwind,
        id: "react-tailwind",
        label: "React + Tailwind CSS",
        instruction: "Return a React component using Tailwind CSS (JSX only).",
        file_kind: FileKind::ComponentScript,
    },
    FrameworkEntry {
        framework: Framework::ReactBootstrap,
        id: "react-bootstrap",
        label: "React + Bootstrap",
        instruction: "Return a React component using Bootstrap (JSX only).",
        file_kind: FileKind::ComponentScript,
    },
    FrameworkEntry {
        framework: Framework::NextJs,
        id: "next-js",
        label: "Next JS",
        instruction: "Return a Next.js page component (use JSX, no HTML shell). Add 'use client' if needed.",
        file_kind: FileKind::ComponentScript,
    },
    FrameworkEntry {
        framework: Framework::Angular,
        id: "angular",
        label: "Angular JS",
        instruction: "Return Angular component code with .ts, .html, and .css parts if applicable.",
        file_kind: FileKind::TypedComponent,
    },
];

/// All catalog entries in display order.
pub fn all() -> &'static [FrameworkEntry] {
    &CATALOG
}

/// The entry used when a lookup fails.
pub fn default_entry() -> &'static FrameworkEntry {
    Framework::default().entry()
}

/// Look up a framework by identifier.
pub fn lookup(id: &str) -> Result<&'static FrameworkEntry, CatalogError> {
    let id = id.trim();
    CATALOG
        .iter()
        .find(|entry| entry.id == id)
        .ok_or_else(|| CatalogError::UnknownFramework(id.to_string()))
}

/// Look up a framework, falling back to the default entry.
pub fn lookup_or_default(id: &str) -> &'static FrameworkEntry {
    match lookup(id) {
        Ok(entry) => entry,
        Err(e) => {
            tracing::warn!("{}, using {}", e, default_entry().id);
            default_entry()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_order_matches_enum() {
        for entry in all() {
            assert_eq!(entry.framework.entry(), entry);
            assert_eq!(entry.framework.id(), entry.id);
        }
    }

    #[test]
    fn looks_up_known_ids() {
        assert_eq!(lookup("react-js").unwrap().label, "React JS");
        assert_eq!(lookup(" angular ").unwrap().framework, Framework::Angular);
        assert_eq!("next-js".parse::<Framework>().unwrap(), Framework::NextJs);
    }

    #[test]
    fn unknown_id_errors_and_falls_back() {
        assert_eq!(
            lookup("svelte"),
            Err(CatalogError::UnknownFramework("svelte".to_string()))
        );
        assert_eq!(lookup_or_default("svelte").id, "html-css");
    }

    #[test]
    fn extensions_and_mime_types() {
        assert_eq!(Framework::Angular.entry().extension(), "ts");
        assert_eq!(Framework::Angular.entry().mime_type(), "text/typescript");
        assert_eq!(Framework::ReactJs.entry().extension(), "jsx");
        assert_eq!(Framework::NextJs.entry().mime_type(), "text/javascript");
        assert_eq!(Framework::HtmlBootstrap.entry().mime_type(), "text/html");
        assert_eq!(mime_for_extension("vue"), "text/plain");
    }

    #[test]
    fn markup_frameworks() {
        let markup: Vec<_> = all()
            .iter()
            .filter(|e| e.framework.is_markup())
            .map(|e| e.id)
            .collect();
        assert_eq!(markup, vec!["html-css", "html-tailwind", "html-bootstrap"]);
    }
}
