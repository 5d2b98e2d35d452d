//! Transformation module.
//!
//! This module turns raw sales rows into a star schema:
//! - Coerce: per-field parse rules (dates, numbers, null tokens)
//! - Normalize: column standardization, defaults, required-field filter
//! - Dimensions: date, customer and product dimensions
//! - Fact: sales fact table
//! - Pipeline: load, build, check and write in one run

pub mod coerce;
pub mod dimensions;
pub mod fact;
pub mod normalize;
pub mod pipeline;

pub use dimensions::{build_dim_customer, build_dim_date, build_dim_product, build_dimensions, Dimensions};
pub use fact::build_fact_sales;
pub use normalize::{normalize, normalize_row, ColumnIndex};
