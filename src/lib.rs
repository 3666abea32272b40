pub mod category;
pub mod fields;
pub mod project;
pub mod report;
pub mod sprite;

#[cfg(not(target_arch = "wasm32"))]
pub mod cli;

use anyhow::Result;
use category::Sb2Catalog;
use project::{analyze_project, load_project, ProjectAnalysis};
use regex::Regex;
use report::ReportFormat;
use sprite::AnalyzeOptions;
use std::path::{Path, PathBuf};

#[cfg(all(target_arch = "wasm32", feature = "wasm-bindings"))]
pub mod wasm;

pub use category::{BlockCategory, BlockClassifier, CategoryCounts};
pub use fields::MalformedInputError;
pub use sprite::{analyze, analyze_with_options, SpriteRecord};

#[cfg(not(target_arch = "wasm32"))]
pub fn run_cli(args: &cli::Args) -> Result<()> {
    let sprite_filter = args
        .sprite
        .as_deref()
        .map(Regex::new)
        .transpose()
        .map_err(|e| anyhow::anyhow!("Invalid --sprite pattern: {}", e))?;

    let total_stages = 3 + usize::from(args.output.is_some());
    let progress = CliProgress::new("Analyze", total_stages);
    let mut stage = 0usize;

    stage += 1;
    progress.emit(stage, "Resolving input path");
    let input = canonicalize_file(&args.input)?;

    stage += 1;
    progress.emit(stage, "Reading project");
    let root = load_project(&input)?;

    stage += 1;
    progress.emit(stage, "Counting scripts and blocks");
    let options = AnalyzeOptions {
        allow_missing_collections: !args.strict,
    };
    let mut analysis = analyze_project(&root, &Sb2Catalog::new(), options)?;
    if let Some(pattern) = &sprite_filter {
        analysis = analysis.filter_sprites(pattern);
    }

    let format = if args.json {
        ReportFormat::Json
    } else {
        ReportFormat::Text
    };
    let rendered = report::render(&analysis, format)?;

    match &args.output {
        Some(output) => {
            stage += 1;
            progress.emit(stage, "Writing report");
            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(output, rendered.as_bytes())?;
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

pub fn analyze_path(input: &Path, options: AnalyzeOptions) -> Result<ProjectAnalysis> {
    let input = canonicalize_file(input)?;
    let root = load_project(&input)?;
    analyze_project(&root, &Sb2Catalog::new(), options)
}

pub fn analyze_project_source(source: &str, format: ReportFormat) -> Result<String> {
    let root: serde_json::Value = serde_json::from_str(source)
        .map_err(|e| anyhow::anyhow!("Invalid project.json: {}", e))?;
    let options = AnalyzeOptions {
        allow_missing_collections: true,
    };
    let analysis = analyze_project(&root, &Sb2Catalog::new(), options)?;
    report::render(&analysis, format)
}

pub fn canonicalize_file(path: &Path) -> Result<PathBuf> {
    if !path.exists() || !path.is_file() {
        return Err(anyhow::anyhow!("Input file not found: '{}'.", path.display()));
    }
    Ok(path.canonicalize()?)
}

#[cfg(not(target_arch = "wasm32"))]
struct CliProgress {
    prefix: &'static str,
    total: usize,
}

#[cfg(not(target_arch = "wasm32"))]
impl CliProgress {
    fn new(prefix: &'static str, total: usize) -> Self {
        Self {
            prefix,
            total: total.max(1),
        }
    }

    fn emit(&self, step: usize, label: &str) {
        let step = step.clamp(1, self.total);
        let bar = render_progress_bar(step, self.total, 14);
        eprintln!(
            "[{}] {}... ({}/{}) {}",
            self.prefix, label, step, self.total, bar
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn render_progress_bar(step: usize, total: usize, width: usize) -> String {
    let width = width.max(1);
    let total = total.max(1);
    let filled = ((step * width) + (total / 2)) / total;
    let mut s = String::with_capacity(width + 2);
    s.push('[');
    for i in 0..width {
        s.push(if i < filled { '=' } else { '-' });
    }
    s.push(']');
    s
}
