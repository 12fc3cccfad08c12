//! Alliance Scanner CLI
//!
//! Scans a screenshot of the alliance panel into a JSON staging file and
//! reports whether the alliance is new or already in the database.

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use alliance_scan::alliance::SqliteStore;
use alliance_scan::config::ScanConfig;
use alliance_scan::ocr::{locate_tesseract, TesseractEngine};
use alliance_scan::{log, paths, scan, ScanRequest};

#[derive(Parser, Debug)]
#[command(
    name = "alliance-scan",
    version,
    about = "Scan alliance screenshots into reviewable JSON"
)]
struct Cli {
    /// Config file (default is $HOME/.alliance-scan.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Alliance database file
    #[arg(long)]
    dbfile: Option<PathBuf>,

    /// Directory to store scratch files
    #[arg(long)]
    scratch: Option<PathBuf>,

    /// Save preprocessed field images to the scratch directory
    #[arg(long)]
    debug: bool,

    /// Tesseract data directory
    #[arg(long)]
    tessdata: Option<PathBuf>,

    /// Tesseract executable
    #[arg(long)]
    tesseract: Option<PathBuf>,

    /// Layout profile matching the screenshot resolution
    #[arg(long)]
    layout: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scans an alliance screenshot into a JSON file for cleanup before import.
    Scan {
        /// Image file (PNG) to scan for alliance data
        #[arg(short = 'i', long)]
        image: PathBuf,

        /// JSON file to output alliance data to (default: image path with .json)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Alliance's server number
        #[arg(short = 's', long, default_value_t = 1)]
        server: i64,
    },
}

impl Cli {
    /// Applies command-line overrides on top of the loaded config.
    fn apply(&self, config: &mut ScanConfig) {
        if let Some(dbfile) = &self.dbfile {
            config.dbfile = dbfile.clone();
        }
        if let Some(scratch) = &self.scratch {
            config.scratch = scratch.clone();
        }
        if self.debug {
            config.debug = true;
        }
        if let Some(tessdata) = &self.tessdata {
            config.tessdata = Some(tessdata.clone());
        }
        if let Some(tesseract) = &self.tesseract {
            config.tesseract = Some(tesseract.clone());
        }
        if let Some(layout) = &self.layout {
            config.layout = layout.clone();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = paths::ensure_directories() {
        log(&format!("Warning: cannot create logs directory: {}", e));
    }

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(paths::get_default_config_path);
    let mut config = ScanConfig::load(&config_path)?;
    cli.apply(&mut config);

    match &cli.command {
        Command::Scan {
            image,
            output,
            server,
        } => {
            let layout = config.active_layout()?.clone();
            let request = ScanRequest {
                image_path: image.clone(),
                output_path: output.clone().unwrap_or_else(|| image.with_extension("json")),
                server_id: *server,
                layout,
                debug_dir: config.debug.then(|| config.scratch.clone()),
            };

            let tesseract =
                locate_tesseract(config.tesseract.as_deref(), config.tessdata.as_deref())?;
            let engine = TesseractEngine::new(tesseract, config.dpi);
            let store = SqliteStore::open(&config.dbfile)?;

            let report = scan(&request, &engine, &store, &Local::now())
                .with_context(|| format!("Failed to scan {}", request.image_path.display()))?;

            if let Some(instruction) = report.instruction() {
                println!("{}", instruction);
            }
        }
    }

    Ok(())
}
