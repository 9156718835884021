//! Configuration management for flowprint.
//!
//! Parses `flowprint.toml` with serde and discovers it in the working
//! directory or its parents. Relative paths are resolved against the
//! directory containing the config file.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String values support `${VAR}` (error if unset) and `${VAR:-default}`.
//!
//! Expanded fields:
//! - `document.source`, `document.output_dir`
//! - `template.title`, `template.subtitle`, `template.overview`,
//!   `template.footer`, `template.metadata[].value`
//! - `diagrams.command`
//! - `export.chrome`, `export.weasyprint`, `export.wkhtmltopdf`

mod expand;

use std::path::{Path, PathBuf};

use serde::Deserialize;

pub use flowprint_renderer::{
    EmphasisMode, FigureAssignment, MetadataField, TemplateConfig, TemplateStyle,
};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "flowprint.toml";

/// Source document used when neither the CLI nor the config names one.
const DEFAULT_SOURCE: &str = "APP_FLOWCHART.md";

/// CLI settings that override configuration file values.
///
/// Only `Some` fields override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override source document.
    pub source: Option<PathBuf>,
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override diagram rendering enabled flag.
    pub diagrams_enabled: Option<bool>,
    /// Override how images are referenced from the HTML.
    pub embed: Option<DiagramEmbed>,
    /// Override diagram theme.
    pub theme: Option<String>,
    /// Override diagram cache enabled flag.
    pub cache_enabled: Option<bool>,
    /// Override PDF export enabled flag.
    pub export_enabled: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Document paths as written in TOML.
    document: DocumentConfigRaw,
    /// Page template and prose handling.
    pub template: TemplateConfig,
    /// External diagram renderer settings.
    pub diagrams: DiagramsConfig,
    /// PDF export settings.
    pub export: ExportConfig,

    /// Resolved document configuration (set after loading).
    #[serde(skip)]
    pub document_resolved: DocumentConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    #[allow(clippy::derivable_impls)]
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocumentConfigRaw {
    source: Option<String>,
    output_dir: Option<String>,
    stem: Option<String>,
}

/// Resolved document configuration with absolute paths.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DocumentConfig {
    /// Markdown source document.
    pub source: PathBuf,
    /// Directory receiving HTML, PDF and diagram images.
    pub output_dir: PathBuf,
    /// Explicit base name for output files.
    pub stem: Option<String>,
    /// Directory for flowprint data (`.flowprint/`).
    pub project_dir: PathBuf,
}

impl DocumentConfig {
    /// Cache directory path (`.flowprint/cache/`).
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.project_dir.join("cache")
    }

    /// Base name for output files: the configured stem or the source file stem.
    #[must_use]
    pub fn stem(&self) -> String {
        self.stem.clone().unwrap_or_else(|| {
            self.source
                .file_stem()
                .map_or_else(|| "document".to_owned(), |s| s.to_string_lossy().into_owned())
        })
    }

    /// `<output_dir>/<stem>.html`
    #[must_use]
    pub fn html_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.html", self.stem()))
    }

    /// `<output_dir>/<stem>.pdf`
    #[must_use]
    pub fn pdf_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.pdf", self.stem()))
    }
}

/// Image format produced by the diagram renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramFormat {
    #[default]
    Png,
    Svg,
}

impl DiagramFormat {
    /// File extension and renderer `-e` argument.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }

    /// MIME type for `data:` URIs.
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Svg => "image/svg+xml",
        }
    }
}

/// How rendered images are referenced from the HTML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramEmbed {
    /// Relative paths into `<output_dir>/diagrams/`.
    #[default]
    Files,
    /// Base64 `data:` URIs; the HTML is self-contained.
    Inline,
}

/// External diagram renderer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DiagramsConfig {
    /// Whether diagrams are rendered at all.
    pub enabled: bool,
    /// Fence language tag marking a diagram.
    pub language: String,
    /// Renderer binary name or path.
    pub command: String,
    pub theme: String,
    pub format: DiagramFormat,
    /// Page width in pixels.
    pub width: u32,
    /// Page height in pixels.
    pub height: u32,
    /// Device scale factor.
    pub scale: u32,
    pub background: String,
    pub embed: DiagramEmbed,
    /// Whether rendered images are cached by content hash.
    pub cache_enabled: bool,
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            language: "mermaid".to_owned(),
            command: "mmdc".to_owned(),
            theme: "default".to_owned(),
            format: DiagramFormat::default(),
            width: 1200,
            height: 800,
            scale: 2,
            background: "white".to_owned(),
            embed: DiagramEmbed::default(),
            cache_enabled: true,
        }
    }
}

/// PDF export configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Whether the PDF is produced after the HTML.
    pub enabled: bool,
    /// Headless browser candidates, tried in order.
    pub chrome: Vec<String>,
    /// `WeasyPrint` binary name or path.
    pub weasyprint: String,
    /// `wkhtmltopdf` binary name or path.
    pub wkhtmltopdf: String,
    pub page_size: String,
    /// Page margin for converters that support it.
    pub margin_mm: u32,
    /// Whether to fall back to a text-only PDF when every converter fails.
    pub text_fallback: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            chrome: vec![
                "google-chrome".to_owned(),
                "chromium-browser".to_owned(),
                "chromium".to_owned(),
                "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome".to_owned(),
            ],
            weasyprint: "weasyprint".to_owned(),
            wkhtmltopdf: "wkhtmltopdf".to_owned(),
            page_size: "A4".to_owned(),
            margin_mm: 20,
            text_fallback: true,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`diagrams.command`").
        field: String,
        /// Error message (e.g., "${`MMDC`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_positive(value: u32, field: &str) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Validation(format!(
            "{field} must be greater than 0"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise,
    /// searches for `flowprint.toml` in the current directory and parents,
    /// falling back to defaults relative to the current directory.
    ///
    /// CLI settings are applied after loading and path resolution.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// an environment variable is unset, or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source) = &settings.source {
            self.document_resolved.source.clone_from(source);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.document_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(enabled) = settings.diagrams_enabled {
            self.diagrams.enabled = enabled;
        }
        if let Some(embed) = settings.embed {
            self.diagrams.embed = embed;
        }
        if let Some(theme) = &settings.theme {
            self.diagrams.theme.clone_from(theme);
        }
        if let Some(cache_enabled) = settings.cache_enabled {
            self.diagrams.cache_enabled = cache_enabled;
        }
        if let Some(enabled) = settings.export_enabled {
            self.export.enabled = enabled;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to `base`.
    fn default_with_base(base: &Path) -> Self {
        Self {
            document: DocumentConfigRaw::default(),
            template: TemplateConfig::default(),
            diagrams: DiagramsConfig::default(),
            export: ExportConfig::default(),
            document_resolved: DocumentConfig {
                source: base.join(DEFAULT_SOURCE),
                output_dir: base.to_path_buf(),
                stem: None,
                project_dir: base.join(".flowprint"),
            },
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any check fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_diagrams()?;
        self.validate_export()?;
        Ok(())
    }

    fn validate_diagrams(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.diagrams.language, "diagrams.language")?;
        require_non_empty(&self.diagrams.command, "diagrams.command")?;
        require_positive(self.diagrams.width, "diagrams.width")?;
        require_positive(self.diagrams.height, "diagrams.height")?;
        require_positive(self.diagrams.scale, "diagrams.scale")?;
        Ok(())
    }

    fn validate_export(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.export.page_size, "export.page_size")?;
        for (i, candidate) in self.export.chrome.iter().enumerate() {
            require_non_empty(candidate, &format!("export.chrome[{i}]"))?;
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(source) = &self.document.source {
            self.document.source = Some(expand::expand_env(source, "document.source")?);
        }
        if let Some(output_dir) = &self.document.output_dir {
            self.document.output_dir =
                Some(expand::expand_env(output_dir, "document.output_dir")?);
        }

        let template = &mut self.template;
        template.title = expand::expand_env(&template.title, "template.title")?;
        if let Some(subtitle) = &template.subtitle {
            template.subtitle = Some(expand::expand_env(subtitle, "template.subtitle")?);
        }
        if let Some(overview) = &template.overview {
            template.overview = Some(expand::expand_env(overview, "template.overview")?);
        }
        expand::expand_env_all(&mut template.footer, "template.footer")?;
        for (i, field) in template.metadata.iter_mut().enumerate() {
            field.value =
                expand::expand_env(&field.value, &format!("template.metadata[{i}].value"))?;
        }

        self.diagrams.command = expand::expand_env(&self.diagrams.command, "diagrams.command")?;

        expand::expand_env_all(&mut self.export.chrome, "export.chrome")?;
        self.export.weasyprint = expand::expand_env(&self.export.weasyprint, "export.weasyprint")?;
        self.export.wkhtmltopdf =
            expand::expand_env(&self.export.wkhtmltopdf, "export.wkhtmltopdf")?;

        Ok(())
    }

    /// Resolve relative document paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.document_resolved = DocumentConfig {
            source: resolve(self.document.source.as_deref(), DEFAULT_SOURCE),
            output_dir: resolve(self.document.output_dir.as_deref(), "."),
            stem: self.document.stem.clone(),
            project_dir: config_dir.join(".flowprint"),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        let document = &config.document_resolved;

        assert_eq!(document.source, PathBuf::from("/test/APP_FLOWCHART.md"));
        assert_eq!(document.output_dir, PathBuf::from("/test"));
        assert_eq!(document.cache_dir(), PathBuf::from("/test/.flowprint/cache"));
        assert_eq!(document.stem(), "APP_FLOWCHART");
        assert_eq!(document.html_path(), PathBuf::from("/test/APP_FLOWCHART.html"));
        assert_eq!(document.pdf_path(), PathBuf::from("/test/APP_FLOWCHART.pdf"));

        assert!(config.diagrams.enabled);
        assert_eq!(config.diagrams.command, "mmdc");
        assert_eq!(config.diagrams.width, 1200);
        assert_eq!(config.diagrams.height, 800);
        assert_eq!(config.diagrams.scale, 2);
        assert_eq!(config.export.page_size, "A4");
        assert_eq!(config.export.margin_mm, 20);
        assert!(config.export.text_fallback);
        assert_eq!(config.template.emphasis, EmphasisMode::Paired);
        assert_eq!(config.template.assignment, FigureAssignment::PerSection);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.diagrams, DiagramsConfig::default());
        assert_eq!(config.export, ExportConfig::default());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[document]
source = "FLOW.md"
output_dir = "out"
stem = "flows"

[template]
title = "App - User Flow Chart"
subtitle = "User Flow Documentation"
style = "classic"
emphasis = "alternating"
assignment = "positional"
overview = "All flows."
footer = ["App v1.0.0"]

[[template.metadata]]
label = "Version"
value = "1.0.0 (MVP)"

[diagrams]
theme = "dark"
format = "svg"
embed = "inline"
cache_enabled = false

[export]
chrome = ["chromium"]
page_size = "Letter"
text_fallback = false
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.template.title, "App - User Flow Chart");
        assert_eq!(config.template.style, TemplateStyle::Classic);
        assert_eq!(config.template.emphasis, EmphasisMode::Alternating);
        assert_eq!(config.template.assignment, FigureAssignment::Positional);
        assert_eq!(
            config.template.metadata,
            vec![MetadataField::new("Version", "1.0.0 (MVP)")]
        );
        assert_eq!(config.diagrams.theme, "dark");
        assert_eq!(config.diagrams.format, DiagramFormat::Svg);
        assert_eq!(config.diagrams.embed, DiagramEmbed::Inline);
        assert!(!config.diagrams.cache_enabled);
        assert_eq!(config.diagrams.command, "mmdc");
        assert_eq!(config.export.chrome, vec!["chromium"]);
        assert_eq!(config.export.page_size, "Letter");
        assert!(!config.export.text_fallback);
    }

    #[test]
    fn test_unknown_enum_value_rejected() {
        let result: Result<Config, _> = toml::from_str("[diagrams]\nformat = \"gif\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_resolves_paths_against_config_dir() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "[document]\nsource = \"docs/FLOW.md\"\noutput_dir = \"out\"\n",
        );

        let config = Config::load(Some(&path), None).unwrap();
        let document = &config.document_resolved;

        assert_eq!(document.source, dir.path().join("docs/FLOW.md"));
        assert_eq!(document.output_dir, dir.path().join("out"));
        assert_eq!(document.project_dir, dir.path().join(".flowprint"));
        assert_eq!(document.stem(), "FLOW");
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_defaults_source_next_to_config() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "");

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(
            config.document_resolved.source,
            dir.path().join("APP_FLOWCHART.md")
        );
        assert_eq!(config.document_resolved.output_dir, dir.path().join("."));
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.toml");

        let err = Config::load(Some(&missing), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[diagrams\n");

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_validates() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[diagrams]\nwidth = 0\n");

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(err.to_string().contains("diagrams.width"));
    }

    #[test]
    fn test_load_expands_env_vars() {
        // SAFETY: variable names are unique to this test
        unsafe {
            std::env::set_var("FLOWPRINT_CFG_MMDC", "/opt/mmdc");
            std::env::remove_var("FLOWPRINT_CFG_UNSET");
        }
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[template]
footer = ["v${FLOWPRINT_CFG_UNSET:-dev}"]

[diagrams]
command = "${FLOWPRINT_CFG_MMDC}"
"#,
        );

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.diagrams.command, "/opt/mmdc");
        assert_eq!(config.template.footer, vec!["vdev"]);
        unsafe {
            std::env::remove_var("FLOWPRINT_CFG_MMDC");
        }
    }

    #[test]
    fn test_load_missing_env_var() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("FLOWPRINT_CFG_MISSING");
        }
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[export]\nwkhtmltopdf = \"${FLOWPRINT_CFG_MISSING}\"\n");

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { ref field, .. } if field == "export.wkhtmltopdf"));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/test"));

        config.apply_cli_settings(&CliSettings {
            source: Some(PathBuf::from("/docs/FLOW.md")),
            output_dir: Some(PathBuf::from("/out")),
            diagrams_enabled: Some(false),
            embed: Some(DiagramEmbed::Inline),
            theme: Some("forest".to_owned()),
            cache_enabled: Some(false),
            export_enabled: Some(false),
        });

        assert_eq!(config.document_resolved.source, PathBuf::from("/docs/FLOW.md"));
        assert_eq!(config.document_resolved.output_dir, PathBuf::from("/out"));
        assert_eq!(config.document_resolved.stem(), "FLOW");
        assert!(!config.diagrams.enabled);
        assert_eq!(config.diagrams.embed, DiagramEmbed::Inline);
        assert_eq!(config.diagrams.theme, "forest");
        assert!(!config.diagrams.cache_enabled);
        assert!(!config.export.enabled);
        assert_eq!(
            config.document_resolved.project_dir,
            PathBuf::from("/test/.flowprint")
        );
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let before = Config::default_with_base(Path::new("/test"));
        let mut config = Config::default_with_base(Path::new("/test"));

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.document_resolved, before.document_resolved);
        assert_eq!(config.diagrams, before.diagrams);
        assert_eq!(config.export, before.export);
    }

    #[test]
    fn test_validate_default_config_passes() {
        assert!(Config::default_with_base(Path::new("/test")).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        let cases: [(fn(&mut Config), &str); 6] = [
            (|c| c.diagrams.language = String::new(), "diagrams.language"),
            (|c| c.diagrams.command = " ".to_owned(), "diagrams.command"),
            (|c| c.diagrams.height = 0, "diagrams.height"),
            (|c| c.diagrams.scale = 0, "diagrams.scale"),
            (|c| c.export.page_size = String::new(), "export.page_size"),
            (|c| c.export.chrome.push(String::new()), "export.chrome[4]"),
        ];

        for (mutate, field) in cases {
            let mut config = Config::default_with_base(Path::new("/test"));
            mutate(&mut config);
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains(field), "{field}: {err}");
        }
    }

    #[test]
    fn test_explicit_stem() {
        let document = DocumentConfig {
            source: PathBuf::from("/docs/FLOW.md"),
            output_dir: PathBuf::from("/out"),
            stem: Some("flows".to_owned()),
            project_dir: PathBuf::from("/docs/.flowprint"),
        };
        assert_eq!(document.html_path(), PathBuf::from("/out/flows.html"));
    }

    #[test]
    fn test_diagram_format_extension() {
        assert_eq!(DiagramFormat::Png.extension(), "png");
        assert_eq!(DiagramFormat::Svg.mime_type(), "image/svg+xml");
    }
}
