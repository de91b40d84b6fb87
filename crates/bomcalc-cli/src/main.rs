//! bomcalc CLI - browse BOM workbooks and export formulations

use anyhow::{Context, Result};
use bomcalc::prelude::*;
use bomcalc::{export_file_name, filter_colors};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "bomcalc")]
#[command(
    author,
    version,
    about = "Bill-of-materials formulation calculator"
)]
struct Cli {
    /// JSON configuration overriding the default workbook layout
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all sheets with their data row counts
    Sheets {
        /// Input workbook (xlsx, xlsm, csv)
        input: PathBuf,
    },

    /// Print one page of a normalized sheet
    Show {
        /// Input workbook
        input: PathBuf,

        /// Sheet name
        sheet: String,

        /// Only rows with a cell containing this text
        #[arg(short, long)]
        search: Option<String>,

        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: usize,
    },

    /// List color codes and their display names
    Colors {
        /// Input workbook
        input: PathBuf,

        /// Only colors whose code or name contains this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Print the formulations of a color code
    Formulate {
        /// Input workbook
        input: PathBuf,

        /// Color code
        code: String,
    },

    /// Export the formulations of a color code as CSV
    Export {
        /// Input workbook
        input: PathBuf,

        /// Color code
        code: String,

        /// Output CSV file (default: formulations_<code>_all.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print tab-separated rows to stdout instead
        #[arg(long, conflicts_with = "output")]
        clipboard: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    tracing::debug!(config = ?cli.config, "configuration loaded");

    match cli.command {
        Commands::Sheets { input } => list_sheets(&open(&input, config)?),
        Commands::Show {
            input,
            sheet,
            search,
            page,
        } => show_sheet(&open(&input, config)?, &sheet, search, page),
        Commands::Colors { input, search } => {
            list_colors(&open(&input, config)?, search.as_deref().unwrap_or(""))
        }
        Commands::Formulate { input, code } => formulate(&open(&input, config)?, &code),
        Commands::Export {
            input,
            code,
            output,
            clipboard,
        } => export(&open(&input, config)?, &code, output, clipboard),
    }
}

/// Log to stderr, filtered by `BOMCALC_LOG` (default `bomcalc=info`)
fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("BOMCALC_LOG").unwrap_or_else(|_| EnvFilter::new("bomcalc=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .with(filter)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("Failed to read config '{}'", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn open(input: &Path, config: EngineConfig) -> Result<Engine> {
    Engine::open(input, config).with_context(|| format!("Failed to open '{}'", input.display()))
}

fn list_sheets(engine: &Engine) -> Result<()> {
    for (i, (name, table)) in engine.dataset().iter().enumerate() {
        println!("{}\t{}\t{} rows", i, name, table.len());
    }
    Ok(())
}

/// Display text of a cell; absent cells print as N/A
fn display_cell(cell: &Cell) -> String {
    if cell.is_absent() {
        "N/A".to_string()
    } else {
        cell.to_string()
    }
}

fn show_sheet(engine: &Engine, sheet: &str, search: Option<String>, page: usize) -> Result<()> {
    let table = engine
        .table(sheet)
        .with_context(|| format!("Sheet '{}' not found", sheet))?;

    let mut session = engine.session();
    session.switch_sheet(sheet);
    if let Some(term) = search {
        session.set_search(term);
    }
    session.page = page;

    let page = engine
        .view(&session)
        .with_context(|| format!("Sheet '{}' not found", sheet))?;

    println!("{}", table.labels().join("\t"));
    for row in &page.rows {
        let line: Vec<String> = (0..table.width())
            .map(|col| row.get(col).map(display_cell).unwrap_or_else(|| "N/A".to_string()))
            .collect();
        println!("{}", line.join("\t"));
    }
    eprintln!(
        "Page {} of {} ({} rows)",
        page.page, page.total_pages, page.total_rows
    );

    Ok(())
}

fn list_colors(engine: &Engine, search: &str) -> Result<()> {
    let colors = filter_colors(engine.colors(), search);
    for entry in &colors {
        println!("{}", entry.label());
    }
    eprintln!("{} of {} colors", colors.len(), engine.colors().len());
    Ok(())
}

fn formulate(engine: &Engine, code: &str) -> Result<()> {
    let set = engine.formulations(code);
    if set.is_empty() {
        eprintln!("No formulations found for '{}'", code);
        return Ok(());
    }

    if let Some(entry) = engine.color(code) {
        println!("{}", entry.label());
    }

    let labels = &engine.config().export.column_labels;
    let precision = engine.config().formulation.precision;
    for formulation in &set {
        println!();
        println!("=== Formulation {} ===", formulation.ordinal);
        println!("{}", labels.join("\t"));
        for line in &formulation.lines {
            println!("{}", line.fields().join("\t"));
        }
        println!(
            "Total: {:.*} (raw {})",
            precision,
            formulation.total_normalized(),
            formulation.raw_total
        );
    }

    Ok(())
}

fn export(engine: &Engine, code: &str, output: Option<PathBuf>, clipboard: bool) -> Result<()> {
    let set = engine.formulations(code);
    if set.is_empty() {
        eprintln!("Warning: no formulations found for '{}'", code);
    }

    if clipboard {
        let mut stdout = io::stdout();
        writeln!(stdout, "{}", engine.clipboard_text(code)).context("Failed to write to stdout")?;
        return Ok(());
    }

    let path = output.unwrap_or_else(|| PathBuf::from(export_file_name(code.trim())));
    engine
        .export_csv_file(code, &path)
        .with_context(|| format!("Failed to write '{}'", path.display()))?;
    eprintln!(
        "Wrote {} formulations ({} rows) to '{}'",
        set.len(),
        set.line_count(),
        path.display()
    );

    Ok(())
}
