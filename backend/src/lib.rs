//! # Salestar - sales transactions to a star schema
//!
//! Salestar reads a flat export of sales transactions and produces one
//! fact table referencing three dimension tables, ready for analytical
//! querying.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  raw CSV    │────▶│   Loader    │────▶│ Normalizer  │────▶│ dim_date    │
//! │ (any enc.)  │     │ (auto-enc)  │     │ (coercion)  │  ├─▶│ dim_customer│
//! └─────────────┘     └─────────────┘     └─────────────┘  ├─▶│ dim_product │
//!                                                          └─▶│ fact_sales  │
//!                                                             └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use salestar::{run, PipelineOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let outcome = run(PipelineOptions::default()).await.unwrap();
//!     println!("Wrote {} fact rows", outcome.schema.fact_sales.len());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`models`] - Raw, normalized, dimension and fact rows
//! - [`parser`] - CSV loading with auto-detection
//! - [`transform`] - Normalization, dimension/fact building, pipeline
//! - [`writer`] - CSV output
//! - [`validation`] - Star-schema integrity checks
//! - [`manifest`] - Run summary
//! - [`logs`] - Status logging

// Core modules
pub mod error;
pub mod logs;
pub mod models;

// Loading
pub mod parser;

// Transformation
pub mod transform;

// Output
pub mod manifest;
pub mod writer;

// Checks
pub mod validation;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{LoadError, PipelineError, WriteError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    date_key,
    decode_date_key,
    DimCustomer,
    DimDate,
    DimProduct,
    FactSales,
    NormalizeStats,
    NormalizedRecord,
    NormalizedTable,
    RawTable,
    StarSchema,
    TableRow,
};

// =============================================================================
// Re-exports - Loader
// =============================================================================

pub use parser::{
    decode_content,
    detect_delimiter,
    detect_encoding,
    load_file,
    parse_bytes,
    parse_str,
    to_json_records,
    LoadedTable,
};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::{
    build_dimensions,
    build_fact_sales,
    normalize,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    build_star_schema,
    build_star_schema_concurrent,
    run,
    CsvInfo,
    PipelineOptions,
    PipelineOutcome,
};

// =============================================================================
// Re-exports - Output and checks
// =============================================================================

pub use manifest::RunManifest;
pub use validation::{check_star_schema, is_consistent};
pub use writer::{read_star_schema, write_star_schema};
