use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default file name of the (email, job) success table.
pub const DEFAULT_SUCCESS_TABLE: &str = "data.csv";
/// Default file name of the failed-jobs table.
pub const DEFAULT_FAILURE_TABLE: &str = "fail_jobs.csv";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Contents of a `config.toml` / `.mailsift.toml` file.
///
/// Every section and key may be omitted; missing values fall through to the
/// next layer of the cascade and finally to built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub input: Option<InputConfig>,
    pub output: Option<OutputConfig>,
    pub parsing: Option<ParsingSection>,
    pub pdf: Option<PdfConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConfig {
    /// Root directories scanned for `.pdf` files.
    pub directories: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub success_table: Option<String>,
    pub failure_table: Option<String>,
}

/// Overrides for the normalization and matching pipeline.
///
/// Characters are written as one-character strings; brackets as two-character
/// strings (`"{}"`). Validation happens when the parsing config is built.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsingSection {
    pub brackets: Option<Vec<String>>,
    pub separators: Option<Vec<String>>,
    pub strip_chars: Option<Vec<String>>,
    pub glue_chars: Option<Vec<String>>,
    pub ignore_window: Option<usize>,
    pub truncate_at_abstract: Option<bool>,
    pub abstract_keyword: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PdfConfig {
    /// Fraction of page height from the top to skip (0.0 disables).
    pub header_exclusion: Option<f32>,
    /// Fraction of page height from the bottom to skip (0.0 disables).
    pub footer_exclusion: Option<f32>,
}

impl ConfigFile {
    pub fn directories(&self) -> Vec<PathBuf> {
        self.input
            .as_ref()
            .and_then(|i| i.directories.as_ref())
            .map(|dirs| dirs.iter().map(PathBuf::from).collect())
            .unwrap_or_default()
    }

    pub fn success_table(&self) -> PathBuf {
        self.output
            .as_ref()
            .and_then(|o| o.success_table.as_deref())
            .unwrap_or(DEFAULT_SUCCESS_TABLE)
            .into()
    }

    pub fn failure_table(&self) -> PathBuf {
        self.output
            .as_ref()
            .and_then(|o| o.failure_table.as_deref())
            .unwrap_or(DEFAULT_FAILURE_TABLE)
            .into()
    }
}

/// Platform config directory path: `<config_dir>/mailsift/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mailsift").join("config.toml"))
}

/// Resolve the implicit config: the platform file with the working
/// directory's `.mailsift.toml` layered on top. Unreadable files are skipped.
pub fn load_config() -> ConfigFile {
    let layers = [
        config_path().and_then(|p| load_from_path(&p)),
        load_from_path(Path::new(".mailsift.toml")),
    ];
    layers
        .into_iter()
        .flatten()
        .fold(ConfigFile::default(), merge)
}

/// Parse `path` if it exists and is valid TOML.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content)
            .inspect_err(|e| {
                tracing::warn!(path = %path.display(), "ignoring invalid config: {e}");
            })
            .ok(),
        Err(_) => None,
    }
}

/// Load a config the user named explicitly; unlike the cascade, failures surface.
pub fn load_explicit(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Layer `overlay` on top of `base`, key by key.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let input = merge_section(base.input, overlay.input, |b, o| InputConfig {
        directories: o.directories.or(b.directories),
    });
    let output = merge_section(base.output, overlay.output, |b, o| OutputConfig {
        success_table: o.success_table.or(b.success_table),
        failure_table: o.failure_table.or(b.failure_table),
    });
    let parsing = merge_section(base.parsing, overlay.parsing, |b, o| ParsingSection {
        brackets: o.brackets.or(b.brackets),
        separators: o.separators.or(b.separators),
        strip_chars: o.strip_chars.or(b.strip_chars),
        glue_chars: o.glue_chars.or(b.glue_chars),
        ignore_window: o.ignore_window.or(b.ignore_window),
        truncate_at_abstract: o.truncate_at_abstract.or(b.truncate_at_abstract),
        abstract_keyword: o.abstract_keyword.or(b.abstract_keyword),
    });
    let pdf = merge_section(base.pdf, overlay.pdf, |b, o| PdfConfig {
        header_exclusion: o.header_exclusion.or(b.header_exclusion),
        footer_exclusion: o.footer_exclusion.or(b.footer_exclusion),
    });

    ConfigFile {
        input,
        output,
        parsing,
        pdf,
    }
}

fn merge_section<T: Default>(
    base: Option<T>,
    overlay: Option<T>,
    combine: impl FnOnce(T, T) -> T,
) -> Option<T> {
    match (base, overlay) {
        (None, None) => None,
        (b, o) => Some(combine(b.unwrap_or_default(), o.unwrap_or_default())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_tables_round_trip_toml() {
        let config = ConfigFile {
            output: Some(OutputConfig {
                success_table: Some("/tmp/emails.csv".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: ConfigFile = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.success_table(), PathBuf::from("/tmp/emails.csv"));
        assert_eq!(parsed.failure_table(), PathBuf::from(DEFAULT_FAILURE_TABLE));
    }

    #[test]
    fn defaults_when_sections_absent() {
        let parsed: ConfigFile = toml::from_str("").unwrap();
        assert_eq!(parsed.success_table(), PathBuf::from("data.csv"));
        assert_eq!(parsed.failure_table(), PathBuf::from("fail_jobs.csv"));
        assert!(parsed.directories().is_empty());
    }

    #[test]
    fn parsing_section_deserializes() {
        let toml_str = r#"
[parsing]
brackets = ["{}", "[]"]
ignore_window = 20
truncate_at_abstract = false
"#;
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        let parsing = parsed.parsing.unwrap();
        assert_eq!(
            parsing.brackets.unwrap(),
            vec!["{}".to_string(), "[]".to_string()]
        );
        assert_eq!(parsing.ignore_window, Some(20));
        assert_eq!(parsing.truncate_at_abstract, Some(false));
        assert!(parsing.separators.is_none());
    }

    #[test]
    fn merge_overlay_wins() {
        let base = ConfigFile {
            output: Some(OutputConfig {
                success_table: Some("base.csv".to_string()),
                failure_table: Some("base_fail.csv".to_string()),
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            output: Some(OutputConfig {
                success_table: Some("overlay.csv".to_string()),
                failure_table: None,
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay);
        assert_eq!(merged.success_table(), PathBuf::from("overlay.csv"));
        assert_eq!(merged.failure_table(), PathBuf::from("base_fail.csv"));
    }

    #[test]
    fn merge_base_preserved_when_overlay_absent() {
        let base = ConfigFile {
            input: Some(InputConfig {
                directories: Some(vec!["/proceedings".to_string()]),
            }),
            ..Default::default()
        };
        let merged = merge(base, ConfigFile::default());
        assert_eq!(merged.directories(), vec![PathBuf::from("/proceedings")]);
        assert!(merged.pdf.is_none());
    }

    #[test]
    fn load_explicit_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[output\nsuccess_table = 3").unwrap();
        assert!(matches!(
            load_explicit(&path),
            Err(ConfigError::Parse { .. })
        ));
        assert!(load_from_path(&path).is_none());
    }

    #[test]
    fn load_explicit_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            load_explicit(&missing),
            Err(ConfigError::Io { .. })
        ));
    }
}
