//! folio - report exporter

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use serde::Deserialize;

use folio::export::{CoverSettings, DocxExporter, ExportRequest, Exporter, PdfExporter};
use folio::sections::{ContentMap, CustomSection, Subsection, assemble};
use folio::{Error, ExportConfig};

#[derive(Parser)]
#[command(name = "folio")]
#[command(version, about = "Export a report project to DOCX and PDF", long_about = None)]
#[command(after_help = "EXAMPLES:
    folio project.json out/                 Write both formats
    folio project.json out/ -t pdf          Write only the PDF
    folio project.json out/ -c cfg.json     Override page size, colours, timeouts")]
struct Cli {
    /// Project file (JSON)
    #[arg(value_name = "PROJECT")]
    project: PathBuf,

    /// Output directory
    #[arg(value_name = "OUT_DIR")]
    out_dir: PathBuf,

    /// Which documents to write
    #[arg(short, long, value_enum, default_value_t = Target::Both)]
    target: Target,

    /// Export configuration (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Target {
    Docx,
    Pdf,
    Both,
}

/// On-disk project description.
#[derive(Deserialize)]
struct Project {
    project_name: String,
    /// Standard section ids, in display order.
    sections: Vec<String>,
    #[serde(default)]
    custom_sections: Vec<CustomSection>,
    #[serde(default)]
    subsection_overrides: HashMap<String, Vec<Subsection>>,
    #[serde(default)]
    content: ContentMap,
    #[serde(default)]
    cover: CoverSettings,
    /// Custom cover markup, relative to the project file.
    cover_html_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {} ({e})", e.cause());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> folio::Result<()> {
    let config = match &cli.config {
        Some(path) => ExportConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => ExportConfig::default(),
    };
    let request = load_request(&cli.project)?;
    std::fs::create_dir_all(&cli.out_dir)?;

    if matches!(cli.target, Target::Docx | Target::Both) {
        let artifact = DocxExporter::new()
            .with_export_config(config.clone())
            .export(&request)
            .await?;
        let path = artifact.save(&cli.out_dir)?;
        if !cli.quiet {
            println!("Wrote {}", path.display());
        }
    }

    if matches!(cli.target, Target::Pdf | Target::Both) {
        let artifact = PdfExporter::new()
            .with_export_config(config)
            .export(&request)
            .await?;
        let path = artifact.save(&cli.out_dir)?;
        if !cli.quiet {
            println!(
                "Wrote {} ({} pages)",
                path.display(),
                artifact.page_count.unwrap_or(0)
            );
        }
    }
    Ok(())
}

fn load_request(path: &Path) -> folio::Result<ExportRequest> {
    let json = std::fs::read_to_string(path)?;
    let project: Project = serde_json::from_str(&json)
        .map_err(|e| Error::InvalidInput(format!("{}: {e}", path.display())))?;

    let assembled = assemble(
        &project.sections,
        &project.custom_sections,
        &project.subsection_overrides,
    );
    log::info!(
        "{}: {} section(s) selected",
        project.project_name,
        assembled.len()
    );

    let mut request = ExportRequest::new(project.project_name, assembled.ordered, project.content)
        .with_cover(project.cover);
    if let Some(cover) = project.cover_html_file {
        let cover_path = path.parent().unwrap_or(Path::new(".")).join(cover);
        request = request.with_cover_html(std::fs::read_to_string(&cover_path)?);
    }
    Ok(request)
}
