//! gridcalc CLI - recalculate and inspect spreadsheet documents

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use gridcalc::prelude::*;
use gridcalc::{evaluate, generate_chart_data, CalculationMode};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "gridcalc")]
#[command(author, version, about = "Spreadsheet formula evaluation and recalculation tool")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recalculate every sheet of a JSON document
    #[command(alias = "calc")]
    Recalc {
        /// Input document
        input: PathBuf,

        /// Output document (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Evaluation order: single-pass or dependency-order
        #[arg(short, long, default_value = "single-pass")]
        mode: CalculationMode,
    },

    /// Evaluate a single formula against ad-hoc cells
    Eval {
        /// Formula text, e.g. "=A1*2"
        formula: String,

        /// Cell input as REF=VALUE (repeatable)
        #[arg(short, long = "cell", value_name = "REF=VALUE")]
        cells: Vec<String>,
    },

    /// Show information about a document
    Info {
        /// Input document
        input: PathBuf,
    },

    /// Print chart series for a range of a sheet as JSON
    Chart {
        /// Input document
        input: PathBuf,

        /// Data range, e.g. A1:C5
        #[arg(short, long)]
        range: String,

        /// Chart type: line, bar, pie or scatter
        #[arg(short = 't', long = "type", default_value = "bar")]
        chart_type: ChartType,

        /// Sheet id (default: the active sheet)
        #[arg(short, long)]
        sheet: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Recalc {
            input,
            output,
            mode,
        } => recalc(&input, output.as_deref(), mode),
        Commands::Eval { formula, cells } => eval(&formula, &cells),
        Commands::Info { input } => show_info(&input),
        Commands::Chart {
            input,
            range,
            chart_type,
            sheet,
        } => chart(&input, &range, chart_type, sheet.as_deref()),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn open(input: &Path) -> Result<Workbook> {
    Workbook::open(input).with_context(|| format!("Failed to open '{}'", input.display()))
}

fn recalc(input: &Path, output: Option<&Path>, mode: CalculationMode) -> Result<()> {
    let mut workbook = open(input)?;
    let stats = workbook.calculate_with_options(&CalculationOptions::with_mode(mode));
    eprintln!(
        "Calculated {} formulas ({} errors, {} circular)",
        stats.cells_calculated, stats.errors, stats.circular_references
    );

    match output {
        Some(path) => {
            workbook
                .save(path)
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            eprintln!("Wrote '{}'", path.display());
        }
        None => {
            let json = workbook.to_json().context("Failed to serialize document")?;
            writeln!(io::stdout(), "{}", json).context("Failed to write to stdout")?;
        }
    }

    Ok(())
}

fn eval(formula: &str, inputs: &[String]) -> Result<()> {
    let mut sheet = Sheet::new("eval", "Eval");
    for input in inputs {
        let Some((reference, value)) = input.split_once('=') else {
            bail!("Expected REF=VALUE, got '{}'", input);
        };
        sheet
            .set_cell_input(reference.trim(), value)
            .with_context(|| format!("Invalid cell '{}'", reference))?;
    }
    sheet.calculate();

    println!("{}", evaluate(formula, sheet.cells()));
    Ok(())
}

fn show_info(input: &Path) -> Result<()> {
    let workbook = open(input)?;

    println!("File: {}", input.display());
    println!("Name: {}", workbook.name());
    println!("Sheets: {}", workbook.sheet_count());

    for sheet in workbook.sheets() {
        let marker = if sheet.id() == workbook.active_sheet_id() {
            " (active)"
        } else {
            ""
        };

        println!();
        println!("  Sheet {}: \"{}\"{}", sheet.id(), sheet.name(), marker);
        println!(
            "    Grid: {} rows x {} columns",
            sheet.row_count(),
            sheet.column_count()
        );
        println!("    Cells: {}", sheet.cells().len());
        println!("    Formulas: {}", sheet.cells().formula_count());
    }

    Ok(())
}

fn chart(input: &Path, range: &str, chart_type: ChartType, sheet: Option<&str>) -> Result<()> {
    let workbook = open(input)?;
    let sheet = match sheet {
        Some(id) => workbook
            .sheet(id)
            .with_context(|| format!("Sheet '{}' not found", id))?,
        None => workbook.active_sheet().context("Document has no sheets")?,
    };

    let config = ChartConfig::new("cli", chart_type, range);
    let data = generate_chart_data(sheet.cells(), &config);
    if data.is_empty() {
        log::warn!("range '{}' produced no chart data", range);
    }

    let json = serde_json::to_string_pretty(&data).context("Failed to serialize chart data")?;
    println!("{}", json);
    Ok(())
}
