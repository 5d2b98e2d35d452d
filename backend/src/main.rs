//! Salestar CLI - Turn a raw sales CSV into a star schema
//!
//! # Commands
//!
//! ```bash
//! salestar run data/raw_sales.csv -o output   # Full pipeline
//! salestar parse data/raw_sales.csv           # Show how the source is read
//! salestar check output                       # Re-check written tables
//! ```
//!
//! Paths default to `SALESTAR_INPUT` / `SALESTAR_OUTPUT_DIR` (a `.env` file
//! is honored), then to `data/raw_sales.csv` and `output/`.

use clap::{Parser, Subcommand};
use salestar::transform::pipeline::format_delimiter;
use salestar::transform::normalize::{missing_required_columns, standardize_headers};
use salestar::{
    check_star_schema, load_file, read_star_schema, run, to_json_records, PipelineOptions,
    RunManifest,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "salestar")]
#[command(about = "Normalize raw sales transactions into a star schema", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: load, normalize, build dimensions and facts, write
    Run {
        /// Input CSV file
        input: Option<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Also write the normalized intermediate table
        #[arg(long)]
        write_normalized: bool,

        /// Don't write manifest.json
        #[arg(long)]
        no_manifest: bool,
    },

    /// Load a CSV file and output its rows as JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check referential integrity of written tables
    Check {
        /// Directory holding the four tables
        dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let defaults = PipelineOptions::from_env();

    let result = match cli.command {
        Commands::Run {
            input,
            output,
            delimiter,
            write_normalized,
            no_manifest,
        } => {
            let options = PipelineOptions {
                input: input.unwrap_or(defaults.input),
                output_dir: output.unwrap_or(defaults.output_dir),
                delimiter: delimiter.or(defaults.delimiter),
                write_normalized,
                write_manifest: !no_manifest,
            };
            cmd_run(options).await
        }

        Commands::Parse {
            input,
            delimiter,
            output,
        } => cmd_parse(&input, delimiter.or(defaults.delimiter), output.as_deref()),

        Commands::Check { dir } => cmd_check(&dir.unwrap_or(defaults.output_dir)),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_run(options: PipelineOptions) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = run(options).await?;

    let stats = &outcome.normalized.stats;
    eprintln!("\n📊 Summary");
    eprintln!("   Rows read:    {}", stats.input_rows);
    eprintln!("   Rows kept:    {}", stats.kept_rows);
    eprintln!("   Rows dropped: {}", stats.dropped_rows);
    for (name, count) in outcome.schema.row_counts() {
        eprintln!("   {:<13} {}", format!("{}:", name), count);
    }
    if !outcome.integrity_issues.is_empty() {
        eprintln!("   ⚠️  {} integrity issue(s), see manifest", outcome.integrity_issues.len());
    }

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_parse(
    input: &Path,
    delimiter: Option<char>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let loaded = load_file(input, delimiter)?;

    eprintln!("   Encoding: {}", loaded.encoding);
    eprintln!(
        "   Delimiter: '{}'{}",
        format_delimiter(loaded.delimiter),
        if delimiter.is_none() { " (auto-detected)" } else { "" }
    );
    eprintln!("   Columns: {}", standardize_headers(&loaded.table.headers).join(", "));

    let missing = missing_required_columns(&loaded.table.headers);
    if !missing.is_empty() {
        eprintln!("   ⚠️  Missing required columns: {}", missing.join(", "));
    }
    eprintln!("✅ Parsed {} records", loaded.table.len());

    let json = serde_json::to_string_pretty(&to_json_records(&loaded.table))?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_check(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Checking tables in: {}", dir.display());

    let schema = read_star_schema(dir)?;
    for (name, count) in schema.row_counts() {
        eprintln!("   {}: {} rows", name, count);
    }
    if let Some(manifest) = RunManifest::load(dir) {
        eprintln!("   Run: {} (finished {})", manifest.run_id, manifest.finished_at);
    }

    match check_star_schema(&schema) {
        Ok(()) => {
            eprintln!("✅ Star schema is consistent");
            Ok(())
        }
        Err(errors) => {
            eprintln!("\n❌ {} issue(s):", errors.len());
            for err in &errors {
                eprintln!("   - {}", err);
            }
            Err(format!("star schema in {} is inconsistent", dir.display()).into())
        }
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use salestar::{write_star_schema, FactSales, StarSchema};
    use tempfile::tempdir;

    fn orphan_fact() -> FactSales {
        FactSales {
            order_id: "A1".into(),
            order_date_key: 20230315,
            customer_id: "C1".into(),
            product_id: "P1".into(),
            sales: 100.0,
            quantity: 1.0,
            discount: 0.0,
            profit: 10.0,
            country: "France".into(),
            region: "Europe".into(),
            state: "IDF".into(),
            city: "Paris".into(),
        }
    }

    #[test]
    fn test_check_reports_inconsistent_tables_as_error() {
        let dir = tempdir().unwrap();
        let schema = StarSchema { fact_sales: vec![orphan_fact()], ..Default::default() };
        write_star_schema(dir.path(), &schema).unwrap();

        let err = cmd_check(dir.path()).unwrap_err();
        assert!(err.to_string().contains("inconsistent"));
    }

    #[test]
    fn test_check_accepts_empty_tables() {
        let dir = tempdir().unwrap();
        write_star_schema(dir.path(), &StarSchema::default()).unwrap();

        assert!(cmd_check(dir.path()).is_ok());
    }
}
