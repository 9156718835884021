//! `flowprint convert` command implementation.

use std::path::PathBuf;

use clap::Args;
use flowprint_config::{CliSettings, Config, DiagramEmbed};
use flowprint_diagrams::{CACHE_VERSION, DiagramCache, DiagramProcessor, MermaidCli};
use flowprint_export::{ExportPipeline, Outline};
use flowprint_renderer::{Artifacts, DiagramExtractor, Document};

use super::export::report_export;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Markdown document (overrides config).
    input: Option<PathBuf>,

    /// Output directory for HTML, PDF and diagrams (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover flowprint.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only produce the HTML.
    #[arg(long)]
    no_pdf: bool,

    /// Skip diagram rendering.
    #[arg(long)]
    no_diagrams: bool,

    /// Embed diagrams in the HTML as data URIs.
    #[arg(long)]
    inline_diagrams: bool,

    /// Mermaid theme (overrides config).
    #[arg(long, env = "FLOWPRINT_THEME")]
    theme: Option<String>,

    /// Disable the diagram cache.
    #[arg(long)]
    no_cache: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl ConvertArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source: self.input,
            output_dir: self.output_dir,
            diagrams_enabled: self.no_diagrams.then_some(false),
            embed: self.inline_diagrams.then_some(DiagramEmbed::Inline),
            theme: self.theme,
            cache_enabled: self.no_cache.then_some(false),
            export_enabled: self.no_pdf.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        convert(&config, &output)
    }
}

/// Run the whole conversion described by `config`.
fn convert(config: &Config, output: &Output) -> Result<(), CliError> {
    let paths = &config.document_resolved;

    // Nothing is created until the source is known to exist.
    if !paths.source.is_file() {
        return Err(CliError::SourceNotFound(paths.source.clone()));
    }
    let text = std::fs::read_to_string(&paths.source)?;

    output.highlight(&format!("Converting {}", paths.source.display()));
    output.separator();

    let extractor = DiagramExtractor::new(&config.diagrams.language);
    let document = Document::parse(&text, &extractor);
    output.info(&format!(
        "Found {} sections and {} diagrams",
        document.sections().len(),
        document.snippets().len()
    ));

    std::fs::create_dir_all(&paths.output_dir)?;

    let artifacts = if config.diagrams.enabled {
        render_diagrams(config, &document, output)
    } else {
        Artifacts::new()
    };

    let html = document.render(&config.template, &artifacts);
    let html_path = paths.html_path();
    std::fs::write(&html_path, html)?;
    tracing::info!(path = %html_path.display(), figures = artifacts.len(), "HTML written");
    output.success(&format!("HTML generated: {}", html_path.display()));

    if config.export.enabled {
        let outline = Outline::from_template(
            &config.template,
            document
                .sections()
                .iter()
                .map(|s| s.title.clone())
                .collect(),
        );
        let report = ExportPipeline::standard(&config.export, Some(outline))
            .run(&html_path, &paths.pdf_path());
        report_export(&report, &html_path, output);
    }

    Ok(())
}

fn render_diagrams(config: &Config, document: &Document<'_>, output: &Output) -> Artifacts {
    let total = document.snippets().len();
    if total == 0 {
        return Artifacts::new();
    }

    let renderer = MermaidCli::from_config(&config.diagrams);
    let mut processor = DiagramProcessor::new(
        Box::new(renderer),
        config.document_resolved.output_dir.clone(),
    )
    .output(config.diagrams.embed.into());
    if config.diagrams.cache_enabled {
        processor = processor.with_cache(DiagramCache::new(
            config.document_resolved.cache_dir(),
            CACHE_VERSION,
        ));
    }

    let artifacts = processor.process(document, config.template.assignment);
    for warning in processor.warnings() {
        output.warning(warning);
    }
    output.info(&format!("Rendered {}/{total} diagrams", artifacts.len()));
    artifacts
}
