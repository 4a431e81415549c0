use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use enclass::bundler::{self, BundleOptions, DEFAULT_OUTPUT_DIR, DEFAULT_OUTPUT_FILE};
use enclass::logging;

/// Bundle project files into one text file for AI context upload.
#[derive(Parser)]
#[command(name = "ai-zipper", version, about)]
struct Cli {
    /// Project root (default: current directory).
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Extensions to include, e.g. `.py .html .yaml` (default: a common text set).
    #[arg(long = "include-ext", num_args = 0..)]
    include_ext: Option<Vec<String>>,

    /// Output directory, relative to the root.
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: String,

    /// Output file name inside the output directory.
    #[arg(long, default_value = DEFAULT_OUTPUT_FILE)]
    output_file: String,

    /// Print the report as JSON instead of the summary.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging("ai-zipper", "warn");

    let mut opts = BundleOptions::new(&cli.root);
    if let Some(exts) = cli.include_ext.filter(|e| !e.is_empty()) {
        opts.include_exts = exts;
    }
    opts.output_dir = cli.output_dir;
    opts.output_file = cli.output_file;

    let report = bundler::bundle(&opts)
        .with_context(|| format!("failed to bundle {}", cli.root.to_string_lossy()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for s in &report.skipped {
        println!("[Skipped] {}: {}", s.path, s.reason);
    }
    println!();
    println!("Done. Total files added: {}", report.files.len());
    println!("Output file: {}", report.output_path.display());
    println!("Estimated token count: {} tokens", report.estimated_tokens);
    println!("Snapshot hash: {}", report.content_hash);
    if report.env_file_included {
        println!("Warning: a .env file was included in the output. Double-check for secrets.");
    }
    if !report.has_gitignore {
        println!(
            "Tip: create a .gitignore to exclude folders like __pycache__, .venv, node_modules."
        );
    }
    Ok(())
}
