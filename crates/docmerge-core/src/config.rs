//! Configuration settings.
//!
//! Settings are loaded from `docmerge.toml`:
//!
//! ```toml
//! [output]
//! directory = "salidas"
//! document_suffix = "RELLENADO"
//! report_suffix = "REPORTE"
//!
//! [mapping]
//! sheet_name = "mapeo"
//!
//! [report]
//! max_items = 200
//! ```
//!
//! Every section and key is optional.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// File looked up in the working directory when no path is given
pub const CONFIG_FILE_NAME: &str = "docmerge.toml";

/// Top-level settings structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Where and how outputs are written
    pub output: OutputSettings,
    /// Mapping sheet detection
    pub mapping: MappingSettings,
    /// Report layout
    pub report: ReportSettings,
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load settings from `path`, or from `docmerge.toml` in the working
    /// directory when present, or fall back to defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let local = PathBuf::from(CONFIG_FILE_NAME);
                if !local.is_file() {
                    return Ok(Self::default());
                }
                local
            }
        };

        let text = std::fs::read_to_string(&path).map_err(|e| {
            CoreError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let settings = Self::from_toml_str(&text)
            .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))?;

        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }
}

/// Output naming
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Directory created once before a run
    pub directory: PathBuf,
    /// `<base>_<suffix>.docx`
    pub document_suffix: String,
    /// `<base>_<suffix>.txt`
    pub report_suffix: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("salidas"),
            document_suffix: "RELLENADO".to_string(),
            report_suffix: "REPORTE".to_string(),
        }
    }
}

impl OutputSettings {
    /// Output document path for a spreadsheet
    pub fn document_path(&self, spreadsheet: &Path) -> PathBuf {
        self.output_path(spreadsheet, &self.document_suffix, "docx")
    }

    /// Report path for a spreadsheet
    pub fn report_path(&self, spreadsheet: &Path) -> PathBuf {
        self.output_path(spreadsheet, &self.report_suffix, "txt")
    }

    fn output_path(&self, spreadsheet: &Path, suffix: &str, extension: &str) -> PathBuf {
        let base = spreadsheet
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        self.directory
            .join(format!("{}_{}.{}", base, suffix, extension))
    }
}

/// Mapping sheet detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingSettings {
    /// Keyword matched against sheet names
    pub sheet_name: String,
}

impl Default for MappingSettings {
    fn default() -> Self {
        Self {
            sheet_name: "mapeo".to_string(),
        }
    }
}

/// Report layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Entries printed per list before "... and N more"
    pub max_items: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self { max_items: 200 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();

        assert_eq!(settings.output.directory, PathBuf::from("salidas"));
        assert_eq!(settings.output.document_suffix, "RELLENADO");
        assert_eq!(settings.output.report_suffix, "REPORTE");
        assert_eq!(settings.mapping.sheet_name, "mapeo");
        assert_eq!(settings.report.max_items, 200);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml = r#"
[output]
document_suffix = "FILLED"

[report]
max_items = 10
"#;
        let settings = Settings::from_toml_str(toml).unwrap();

        assert_eq!(settings.output.document_suffix, "FILLED");
        assert_eq!(settings.output.report_suffix, "REPORTE");
        assert_eq!(settings.output.directory, PathBuf::from("salidas"));
        assert_eq!(settings.mapping.sheet_name, "mapeo");
        assert_eq!(settings.report.max_items, 10);
    }

    #[test]
    fn test_empty_toml() {
        assert_eq!(Settings::from_toml_str("").unwrap(), Settings::default());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(Settings::from_toml_str("[report]\nmax_items = \"many\"").is_err());
    }

    #[test]
    fn test_load_from_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[mapping]\nsheet_name = \"map\"\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.mapping.sheet_name, "map");

        let missing = dir.path().join("missing.toml");
        assert!(matches!(Settings::load(Some(&missing)), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_output_paths() {
        let output = OutputSettings {
            directory: PathBuf::from("out"),
            ..OutputSettings::default()
        };
        let sheet = Path::new("/data/lote 12.xlsx");

        assert_eq!(output.document_path(sheet), PathBuf::from("out/lote 12_RELLENADO.docx"));
        assert_eq!(output.report_path(sheet), PathBuf::from("out/lote 12_REPORTE.txt"));
    }
}
