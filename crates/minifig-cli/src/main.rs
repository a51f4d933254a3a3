//! Minifig parents table inspector binary.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use minifig_cli::{CheckReport, ParentReport, ValidityReport};
use minifig_loader::{
    resolve_parents_path, write_tsv, DuplicatePolicy, HierarchyConfig, HierarchyRegistry,
};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Inspect an LDraw minifigure parents table
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Parents file (defaults to $MINIFIG_PARENTS_PATH, then ./parents.txt)
    #[arg(short, long, value_name = "FILE", global = true)]
    file: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log every duplicate entry in the table
    #[arg(long, global = true)]
    warn_duplicates: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse the table and print a summary
    Check,
    /// List the parts that may attach to a parent
    Children {
        /// Parent part number
        parent: String,
    },
    /// List the attach points of a parent
    Points {
        /// Parent part number
        parent: String,
    },
    /// Check whether a child may attach to a parent (exit code 1 if not)
    Valid {
        /// Parent part number
        parent: String,
        /// Child part number
        child: String,
    },
    /// Write every parent/child pair as TSV
    Export {
        /// Output file (defaults to stdout)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    let config = HierarchyConfig {
        duplicates: if args.warn_duplicates {
            DuplicatePolicy::Warn
        } else {
            DuplicatePolicy::Merge
        },
        ..HierarchyConfig::default()
    };

    let path = resolve_parents_path(args.file.as_deref())?;
    tracing::debug!("Loading parents table from: {}", path.display());

    let registry = HierarchyRegistry::new(config);
    let hierarchy = registry.reload(&path)?;

    match args.command {
        Command::Check => {
            let report = CheckReport::new(&hierarchy);
            emit(args.json, &report, report.to_text())?;
        }
        Command::Children { parent } => {
            let report = ParentReport::new(&hierarchy, &parent);
            if !report.known {
                tracing::warn!("Unknown parent: {}", parent);
            }
            emit(args.json, &report, report.children_text())?;
        }
        Command::Points { parent } => {
            let report = ParentReport::new(&hierarchy, &parent);
            if !report.known {
                tracing::warn!("Unknown parent: {}", parent);
            }
            emit(args.json, &report, report.points_text())?;
        }
        Command::Valid { parent, child } => {
            let report = ValidityReport::new(&hierarchy, &parent, &child);
            emit(args.json, &report, report.to_text())?;
            if !report.valid {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Export { output } => {
            let rows = match output {
                Some(path) => write_tsv(&hierarchy, File::create(&path)?)?,
                None => write_tsv(&hierarchy, io::stdout().lock())?,
            };
            tracing::info!("Exported {} parent/child pairs", rows);
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Prints `report` as JSON, or `text` as is.
fn emit<T: Serialize>(json: bool, report: &T, text: String) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut stdout, report)?;
        writeln!(stdout)
    } else if text.is_empty() {
        Ok(())
    } else {
        writeln!(stdout, "{text}")
    }
}
