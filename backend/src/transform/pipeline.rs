//! High-level pipeline API: raw sales CSV to star schema on disk.
//!
//! ```text
//! load ──▶ normalize ──┬──▶ dimensions ──┬──▶ check ──▶ write
//!                      └──▶ fact ────────┘
//! ```
//!
//! Dimension and fact building only read the normalized snapshot, so the
//! async entry point runs them side by side on blocking tasks. Nothing is
//! written until every earlier stage has succeeded.
//!
//! # Example
//!
//! ```rust,ignore
//! use salestar::{run, PipelineOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let outcome = run(PipelineOptions::from_env()).await?;
//!     println!("{} fact rows", outcome.schema.fact_sales.len());
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use super::dimensions::{build_dimensions, Dimensions};
use super::fact::build_fact_sales;
use super::normalize::{defaulted_columns, missing_required_columns, normalize, standardize_headers};
use crate::error::PipelineResult;
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::manifest::RunManifest;
use crate::models::{FactSales, NormalizedTable, StarSchema};
use crate::parser::{load_file, LoadedTable};
use crate::validation::check_star_schema;
use crate::writer::{write_star_schema, write_table};

/// Environment variable overriding the input path
pub const ENV_INPUT: &str = "SALESTAR_INPUT";
/// Environment variable overriding the output directory
pub const ENV_OUTPUT_DIR: &str = "SALESTAR_OUTPUT_DIR";
/// Environment variable forcing the delimiter (first character is used)
pub const ENV_DELIMITER: &str = "SALESTAR_DELIMITER";

/// Options for the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// Raw sales CSV
    pub input: PathBuf,

    /// Directory receiving the output tables
    pub output_dir: PathBuf,

    /// Force a delimiter instead of auto-detecting it
    pub delimiter: Option<char>,

    /// Also write the normalized intermediate table
    pub write_normalized: bool,

    /// Write `manifest.json` next to the tables
    pub write_manifest: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::from("data/raw_sales.csv"),
            output_dir: PathBuf::from("output"),
            delimiter: None,
            write_normalized: false,
            write_manifest: true,
        }
    }
}

impl PipelineOptions {
    /// Defaults overridden by `SALESTAR_*` variables (a `.env` file is loaded first).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::default().with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from a key lookup.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(input) = lookup(ENV_INPUT) {
            self.input = PathBuf::from(input);
        }
        if let Some(dir) = lookup(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(delimiter) = lookup(ENV_DELIMITER).and_then(|v| v.chars().next()) {
            self.delimiter = Some(delimiter);
        }
        self
    }
}

/// Source file information
#[derive(Debug, Clone, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    /// Standardized column names
    pub columns: Vec<String>,
    pub row_count: usize,
}

/// Result of a complete run
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// The four tables as written
    pub schema: StarSchema,
    /// Normalized intermediate table
    pub normalized: Arc<NormalizedTable>,
    /// Source metadata
    pub csv_info: CsvInfo,
    /// Files written, tables first
    pub files: Vec<PathBuf>,
    /// Manifest path, when written
    pub manifest: Option<PathBuf>,
    /// Integrity violations (logged, never fatal)
    pub integrity_issues: Vec<String>,
}

/// Build the star schema from normalized records, sequentially.
pub fn build_star_schema(table: &NormalizedTable) -> StarSchema {
    assemble(build_dimensions(&table.records), build_fact_sales(&table.records))
}

/// Build dimensions and facts concurrently over a shared snapshot.
pub async fn build_star_schema_concurrent(table: Arc<NormalizedTable>) -> PipelineResult<StarSchema> {
    let dims_input = Arc::clone(&table);
    let dims = tokio::task::spawn_blocking(move || build_dimensions(&dims_input.records));

    let facts_input = Arc::clone(&table);
    let facts = tokio::task::spawn_blocking(move || build_fact_sales(&facts_input.records));

    let (dims, facts) = tokio::try_join!(dims, facts)?;
    Ok(assemble(dims, facts))
}

fn assemble(dims: Dimensions, fact_sales: Vec<FactSales>) -> StarSchema {
    StarSchema {
        dim_date: dims.dim_date,
        dim_customer: dims.dim_customer,
        dim_product: dims.dim_product,
        fact_sales,
    }
}

/// Run the whole pipeline.
///
/// 1. Load the source (fatal if missing or unreadable)
/// 2. Normalize, dropping rows without required keys
/// 3. Build dimensions and facts
/// 4. Check referential integrity (warnings only)
/// 5. Write the tables, optionally the normalized table and the manifest
pub async fn run(options: PipelineOptions) -> PipelineResult<PipelineOutcome> {
    let mut manifest = RunManifest::begin(&options.input);

    // Step 1: Load
    log_info(format!("📖 Loading raw sales data from {}...", options.input.display()));
    let loaded = load_file(&options.input, options.delimiter)?;
    let csv_info = csv_info(&loaded);
    log_success(format!("Detected encoding: {}", csv_info.encoding));
    log_success(format!("Delimiter: '{}'", format_delimiter(csv_info.delimiter)));
    log_success(format!("Read {} rows, {} columns", csv_info.row_count, csv_info.columns.len()));

    // Step 2: Normalize
    log_info("🧹 Cleaning data...");
    let missing = missing_required_columns(&loaded.table.headers);
    if !missing.is_empty() {
        log_warning(format!(
            "Required column(s) absent, every row will be dropped: {}",
            missing.join(", ")
        ));
    }
    let defaulted = defaulted_columns(&loaded.table.headers);
    if !defaulted.is_empty() {
        log_info_indent(format!("Absent columns filled with defaults: {}", defaulted.join(", ")), 1);
    }

    let table = Arc::new(normalize(&loaded.table));
    print_normalize_result(&table);

    // Step 3: Build
    log_info("⭐ Building dimensions and facts...");
    let schema = build_star_schema_concurrent(Arc::clone(&table)).await?;
    for (name, count) in schema.row_counts() {
        log_success(format!("{}: {} rows", name, count));
    }

    // Step 4: Check
    let integrity_issues = match check_star_schema(&schema) {
        Ok(()) => {
            log_success("Referential integrity OK");
            Vec::new()
        }
        Err(issues) => {
            log_warning(format!("{} integrity issue(s)", issues.len()));
            for issue in issues.iter().take(5) {
                log_info_indent(issue.clone(), 1);
            }
            issues
        }
    };

    // Step 5: Write
    log_info(format!("💾 Writing tables to {}...", options.output_dir.display()));
    let mut files = write_star_schema(&options.output_dir, &schema)?;
    if options.write_normalized {
        files.push(write_table(&options.output_dir, &table.records)?);
    }
    for file in &files {
        log_success(format!("{} created", file.display()));
    }

    let manifest_path = if options.write_manifest {
        manifest.encoding = csv_info.encoding.clone();
        manifest.delimiter = csv_info.delimiter;
        manifest.columns = csv_info.columns.clone();
        manifest.normalize = table.stats.clone();
        manifest.row_counts = schema.row_counts();
        manifest.integrity_issues = integrity_issues.clone();
        manifest.record_files(&files);
        manifest.finish();
        let path = manifest.save(&options.output_dir)?;
        log_info_indent(format!("Run {} recorded in {}", manifest.run_id, path.display()), 1);
        Some(path)
    } else {
        None
    };

    log_success("🎉 ETL pipeline completed");

    Ok(PipelineOutcome {
        schema,
        normalized: table,
        csv_info,
        files,
        manifest: manifest_path,
        integrity_issues,
    })
}

/// Source metadata with standardized column names
pub fn csv_info(loaded: &LoadedTable) -> CsvInfo {
    CsvInfo {
        encoding: loaded.encoding.clone(),
        delimiter: loaded.delimiter,
        columns: standardize_headers(&loaded.table.headers),
        row_count: loaded.table.len(),
    }
}

/// Format delimiter for display
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "TAB".to_string(),
        c => c.to_string(),
    }
}

/// Log normalizer accounting, including a sample of dropped rows per reason
fn print_normalize_result(table: &NormalizedTable) {
    let stats = &table.stats;
    log_success(format!("Kept {} of {} rows", stats.kept_rows, stats.input_rows));

    for line in drop_report(table) {
        log_warning(line);
    }
}

/// Warning lines describing dropped rows, grouped by missing fields.
fn drop_report(table: &NormalizedTable) -> Vec<String> {
    let stats = &table.stats;
    if stats.dropped_rows == 0 {
        return Vec::new();
    }
    let mut lines = vec![format!("Dropped {} rows missing required fields", stats.dropped_rows)];

    let mut reasons: HashMap<String, Vec<usize>> = HashMap::new();
    for skip in &table.skipped {
        reasons
            .entry(skip.missing_fields.join(", "))
            .or_default()
            .push(skip.row);
    }

    let mut reasons: Vec<_> = reasons.into_iter().collect();
    reasons.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(&b.0)));
    for (reason, rows) in reasons.iter().take(5) {
        let row_sample: Vec<String> = rows.iter().take(5).map(|r| r.to_string()).collect();
        let more = if rows.len() > 5 { format!("... +{}", rows.len() - 5) } else { String::new() };
        lines.push(format!("• Missing {} (rows: {}{})", reason, row_sample.join(", "), more));
    }
    lines
}
