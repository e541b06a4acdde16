//! Export of generated code as a downloadable file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::catalog;
use crate::error::ValidationError;

/// Product name used in exported file names.
pub const PRODUCT_NAME: &str = "CodeCrafter";

/// A file ready to be downloaded or written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    /// File name (e.g. "CodeCrafter-Code.jsx")
    pub file_name: String,

    /// MIME type for the download
    pub mime_type: &'static str,

    /// File contents
    pub contents: String,
}

impl ExportFile {
    /// Write the file into `dir`, returning the full path.
    pub fn write_into(&self, dir: &Path) -> io::Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.contents)?;
        Ok(path)
    }
}

/// Package `code` for download using the framework's extension and MIME type.
///
/// Unknown frameworks fall back to the default markup entry.
pub fn export_file(code: &str, framework_id: &str) -> Result<ExportFile, ValidationError> {
    if code.trim().is_empty() {
        return Err(ValidationError::NothingToDownload);
    }

    let entry = catalog::lookup_or_default(framework_id);
    let extension = entry.extension();

    Ok(ExportFile {
        file_name: format!("{}-Code.{}", PRODUCT_NAME, extension),
        mime_type: catalog::mime_for_extension(extension),
        contents: code.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn angular_exports_typescript() {
        let file = export_file("@Component({})", "angular").unwrap();
        assert!(file.file_name.ends_with(".ts"));
        assert_eq!(file.mime_type, "text/typescript");
    }

    #[test]
    fn react_exports_jsx() {
        let file = export_file("export default () => <div />", "react-js").unwrap();
        assert_eq!(file.file_name, "CodeCrafter-Code.jsx");
        assert_eq!(file.mime_type, "text/javascript");
    }

    #[test]
    fn unknown_framework_exports_html() {
        let file = export_file("<div></div>", "svelte").unwrap();
        assert!(file.file_name.ends_with(".html"));
        assert_eq!(file.mime_type, "text/html");
    }

    #[test]
    fn empty_code_is_rejected() {
        assert_eq!(
            export_file("   ", "react-js"),
            Err(ValidationError::NothingToDownload)
        );
    }

    #[test]
    fn writes_into_directory() {
        let temp = tempdir().unwrap();
        let file = export_file("<p>hi</p>", "html-css").unwrap();

        let path = file.write_into(&temp.path().join("out")).unwrap();

        assert_eq!(path.file_name().unwrap(), "CodeCrafter-Code.html");
        assert_eq!(fs::read_to_string(path).unwrap(), "<p>hi</p>");
    }
}
