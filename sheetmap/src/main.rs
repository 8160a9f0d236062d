//! Sheetmap CLI - read spreadsheet rows as JSON records
//!
//! # Commands
//!
//! ```bash
//! sheetmap sheets book.xlsx                     # List sheets and dimensions
//! sheetmap heading data.csv                     # Print the heading row
//! sheetmap rows data.csv -o rows.json           # Every row as a JSON object
//! sheetmap rows book.xlsx --sheet Members --columns name,email
//! sheetmap rows raw.csv --no-heading --columns 0,2
//! ```
//!
//! Options can also come from a JSON file (`--config options.json`); flags
//! given on the command line win. Set `SHEETMAP_LOG=debug` or pass `-v` for
//! more output on stderr.

use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;
use sheetmap::logging;
use sheetmap::{
    auto_map, CellGrid, ClassMap, ExcelImporter, ExcelSheet, ImportOptions,
    ManyToOneDictionaryPropertyMap,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sheetmap")]
#[command(about = "Read spreadsheet rows as typed records", long_about = None)]
struct Cli {
    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Input file (csv, tsv, txt, xlsx, xlsm, xls, xlsb, ods)
    input: PathBuf,

    /// Sheet name (default: first sheet)
    #[arg(short, long)]
    sheet: Option<String>,

    /// CSV delimiter (auto-detect if not specified)
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Import options JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the sheets of a file
    Sheets {
        /// Input file
        input: PathBuf,
    },

    /// Print the heading row of a sheet
    Heading {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Read every row of a sheet and write JSON
    Rows {
        #[command(flatten)]
        source: SourceArgs,

        /// The sheet has no heading row; columns are keyed by index
        #[arg(long)]
        no_heading: bool,

        /// Only these columns (names, or indices without a heading)
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// One row keyed by column name, or by column index without a heading.
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
struct Record {
    values: BTreeMap<String, Option<String>>,
}
auto_map!(Record { values });

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    if let Err(e) = logging::init(logging::level_from(cli.verbose)) {
        eprintln!("warning: logger not installed: {}", e);
    }

    let result = match cli.command {
        Commands::Sheets { input } => cmd_sheets(&input),
        Commands::Heading { source } => cmd_heading(&source),
        Commands::Rows {
            source,
            no_heading,
            columns,
            output,
        } => cmd_rows(&source, no_heading, &columns, output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_sheets(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let importer = ExcelImporter::open(input)?;
    eprintln!("📄 {}: {} sheets", input.display(), importer.sheet_count());

    for (index, grid) in importer.grids().iter().enumerate() {
        println!(
            "{}\t{}\t{} rows\t{} columns",
            index,
            grid.name(),
            grid.row_count(),
            grid.column_count()
        );
    }
    Ok(())
}

fn cmd_heading(source: &SourceArgs) -> Result<(), Box<dyn std::error::Error>> {
    let options = load_options(source, None)?;
    let importer = ExcelImporter::open_with_options(&source.input, &options)?;
    let mut sheet = importer.read_sheet_with_options(&options)?;

    let heading = sheet.read_heading()?;
    for (index, name) in heading.column_names().iter().enumerate() {
        println!("{}\t{}", index, name);
    }
    Ok(())
}

fn cmd_rows(
    source: &SourceArgs,
    no_heading: bool,
    columns: &[String],
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Reading: {}", source.input.display());

    let options = load_options(source, no_heading.then_some(false))?;
    let mut importer = ExcelImporter::open_with_options(&source.input, &options)?;
    importer.configuration_mut().set_auto_map(true);

    let mut sheet = importer.read_sheet_with_options(&options)?;
    if sheet.expects_heading() {
        let heading = sheet.read_heading()?;
        eprintln!("   Columns: {}", heading.column_names().join(", "));
    }

    let records: Vec<Record> = if columns.is_empty() {
        sheet.read_auto_rows()?
    } else {
        let map = record_map(&sheet, columns)?;
        sheet.read_rows_with(&map)?
    };
    eprintln!("✅ Read {} rows from '{}'", records.len(), sheet.name());

    let json = serde_json::to_string_pretty(&records)?;
    write_output(&json, output)?;
    Ok(())
}

/// Options file first, then the command-line flags on top.
fn load_options(
    source: &SourceArgs,
    has_heading: Option<bool>,
) -> Result<ImportOptions, Box<dyn std::error::Error>> {
    let mut options = match &source.config {
        Some(path) => {
            info!("loading options from {}", path.display());
            ImportOptions::from_file(path)?
        }
        None => ImportOptions::default(),
    };

    if source.delimiter.is_some() {
        options.delimiter = source.delimiter;
    }
    if source.sheet.is_some() {
        options.sheet = source.sheet.clone();
    }
    if has_heading.is_some() {
        options.has_heading = has_heading;
    }
    Ok(options)
}

type RecordValues =
    ManyToOneDictionaryPropertyMap<Option<String>, BTreeMap<String, Option<String>>>;

/// A record map restricted to `columns`.
fn record_map(
    sheet: &ExcelSheet<'_>,
    columns: &[String],
) -> Result<ClassMap<Record>, Box<dyn std::error::Error>> {
    let values = if sheet.expects_heading() {
        RecordValues::new().with_column_names(columns.iter().cloned())
    } else {
        let indices = columns
            .iter()
            .map(|c| c.trim().parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("columns must be indices without a heading: {}", e))?;
        RecordValues::new().with_indices(indices)
    };

    let mut map = ClassMap::with_strategy(sheet.configuration().empty_value_strategy());
    map.map("values", |r: &mut Record, v| r.values = v, values);
    Ok(map)
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("   💾 Saved to: {}", p.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}
