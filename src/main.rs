use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use enclass::backup;
use enclass::config::Layout;
use enclass::logging;
use enclass::manifest::{Format, Kind};
use enclass::scaffold::{AddRequest, Scaffolder};

/// Scaffolder and content manager for the tutoring calendar site.
#[derive(Parser)]
#[command(name = "enclass", version, about)]
struct Cli {
    /// Project root; the site lives in `<root>/docs`.
    #[arg(long, global = true, env = "ENCLASS_ROOT", default_value = ".")]
    root: PathBuf,

    /// Log every write, copy and backup instead of performing it.
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the docs/ skeleton and seed one student with sample pages.
    Init {
        #[arg(long, default_value = "ray")]
        student: String,
    },

    /// Create an empty manifest for a student.
    NewStudent {
        #[arg(long)]
        student: String,
    },

    /// Add or update one material or homework entry.
    Add {
        #[arg(long)]
        student: String,
        #[arg(long)]
        course: String,
        /// Lesson date, YYYY-MM-DD.
        #[arg(long)]
        date: String,
        #[arg(long = "type", value_enum)]
        kind: Kind,
        #[arg(long, value_enum)]
        format: Format,
        /// File to copy into materials/; omit to generate an HTML template.
        #[arg(long)]
        src: Option<PathBuf>,
        /// Target URL, required for --format link.
        #[arg(long)]
        external_url: Option<String>,
        #[arg(long)]
        title: Option<String>,
    },

    /// Import a folder of YYMMDD-named files (`_hw` marks homework).
    BatchAdd {
        #[arg(long)]
        student: String,
        #[arg(long)]
        course: String,
        #[arg(long)]
        from_dir: PathBuf,
    },

    /// List the manifest backups kept for a student, oldest first.
    Backups {
        #[arg(long)]
        student: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging("enclass", "info");

    let layout = Layout::new(cli.root);
    let scaffolder = Scaffolder::new(layout, cli.dry_run);

    match cli.command {
        Commands::Init { student } => {
            let outcome = scaffolder
                .init(&student)
                .with_context(|| format!("init failed for student {student}"))?;
            println!("initialised {}", scaffolder.layout().docs().display());
            for s in &outcome.samples {
                println!("  sample {} -> {}", s.date, s.url);
            }
        }
        Commands::NewStudent { student } => {
            let outcome = scaffolder
                .new_student(&student, false)
                .with_context(|| format!("new-student failed for {student}"))?;
            if outcome.created {
                println!("created {}", outcome.manifest_path.display());
            } else {
                println!("already exists: {}", outcome.manifest_path.display());
            }
        }
        Commands::Add {
            student,
            course,
            date,
            kind,
            format,
            src,
            external_url,
            title,
        } => {
            let outcome = scaffolder
                .add(&AddRequest {
                    student,
                    course,
                    date,
                    kind,
                    format,
                    src,
                    external_url,
                    title,
                })
                .context("add failed")?;
            println!(
                "{} {} {} -> {}",
                outcome.date,
                outcome.kind.as_str(),
                outcome.format.as_str(),
                outcome.url
            );
        }
        Commands::BatchAdd {
            student,
            course,
            from_dir,
        } => {
            let report = scaffolder
                .batch_add(&student, &course, &from_dir)
                .context("batch-add failed")?;
            for a in &report.added {
                println!("  -> {} {} {}", a.date, a.kind.as_str(), a.url);
            }
            for s in &report.skipped {
                println!("  [skip] {}: {}", s.name, s.reason);
            }
            println!(
                "added {}, skipped {}",
                report.added.len(),
                report.skipped.len()
            );
        }
        Commands::Backups { student } => {
            let path = scaffolder.layout().manifest_path(&student);
            let backups = backup::list_backups(&path)?;
            if backups.is_empty() {
                println!("no backups for {}", path.display());
            }
            for b in backups {
                println!("{}", b.display());
            }
        }
    }

    if scaffolder.is_dry_run() {
        println!("(dry run: nothing was written)");
    }
    Ok(())
}
