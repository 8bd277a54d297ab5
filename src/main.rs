use std::io::Read;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use brief_fmt::brief::{structure_all, StructuredBrief};
use brief_fmt::db;
use brief_fmt::settings::Settings;

#[derive(Parser)]
#[command(name = "brief_fmt", about = "Structure AI-written security briefs for rendering")]
struct Cli {
    /// SQLite database (overrides BRIEF_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Structure a text file (or stdin) and print the result
    Format {
        /// Input file; reads stdin when omitted
        file: Option<PathBuf>,
        /// Print classified blocks as JSON instead of rendered text
        #[arg(long)]
        blocks: bool,
    },
    /// Structure one article's brief and print it
    Show {
        slug: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Structure stored briefs and save the results
    Export {
        /// Max briefs to structure (default: all pending)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Re-structure briefs that were already exported
        #[arg(long)]
        all: bool,
    },
    /// Brief and export counts
    Stats,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load()?;
    if let Some(path) = cli.db {
        settings.db_path = path;
    }

    let result = match cli.command {
        Commands::Format { file, blocks } => {
            let raw = read_input(file.as_ref())?;
            if blocks {
                let classified = brief_fmt::structure_blocks(&raw);
                println!("{}", serde_json::to_string_pretty(&classified)?);
            } else {
                println!("{}", brief_fmt::structure(&raw));
            }
            Ok(())
        }
        Commands::Show { slug, json } => {
            let conn = db::connect(&settings.db_path)?;
            match db::fetch_brief(&conn, &slug)? {
                Some(record) => {
                    let brief = StructuredBrief::from_record(&record);
                    if json {
                        println!("{}", serde_json::to_string_pretty(&brief)?);
                    } else {
                        print_brief(&brief);
                    }
                }
                None => println!("No brief found for '{}'.", slug),
            }
            Ok(())
        }
        Commands::Export { limit, all } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let records = db::fetch_briefs(&conn, limit, !all)?;
            if records.is_empty() {
                println!("No pending briefs. Use --all to re-structure everything.");
            } else {
                println!("Structuring {} briefs...", records.len());
                let saved = export_briefs(&conn, &records, settings.chunk_size)?;
                println!("Saved {} structured briefs.", saved);
            }
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Articles:   {}", s.articles);
            println!("Briefs:     {}", s.briefs);
            println!("Structured: {}", s.structured);
            println!("Pending:    {}", s.pending);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {:?}", path)),
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("Failed to read stdin")?;
            Ok(raw)
        }
    }
}

fn print_brief(brief: &StructuredBrief) {
    println!("{}", brief.title);
    println!("{}", "=".repeat(brief.title.chars().count()));
    println!("{} min read\n", brief.reading_time_minutes);
    for (label, text) in brief.sections() {
        println!("--- {} ---\n", label);
        println!("{}\n", text);
    }
}

fn export_briefs(
    conn: &rusqlite::Connection,
    records: &[brief_fmt::brief::BriefRecord],
    chunk_size: usize,
) -> Result<usize> {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut saved = 0;
    for chunk in records.chunks(chunk_size) {
        let briefs = structure_all(chunk);
        for b in briefs.iter().filter(|b| b.sections().is_empty()) {
            warn!("Brief for {} has no text in any field", b.slug);
        }
        saved += db::save_structured(conn, &briefs)?;
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    info!(saved, "export complete");
    Ok(saved)
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
