//! Dimension builder: project normalized records into deduplicated
//! dimension tables.
//!
//! # Architecture
//!
//! ```text
//! Normalized records                    dim_customer (distinct tuples)
//! ┌──────────────────────────────┐     ┌──────────────────────────────┐
//! │ C1, Ada, Consumer, … Paris   │     │ C1, Ada, Consumer, … Paris   │
//! │ C1, Ada, Consumer, … Paris   │  →  │ C1, Ada, Corporate, … Paris  │
//! │ C1, Ada, Corporate, … Paris  │     └──────────────────────────────┘
//! └──────────────────────────────┘
//! ```
//!
//! Uniqueness is over the whole projected tuple. An id whose attributes
//! drift between transactions yields one dimension row per variant; this
//! is kept as is and not reconciled.
//!
//! Rows come out in first-occurrence order. Consumers must not rely on it.

use std::collections::HashSet;
use std::hash::Hash;

use crate::models::{DimCustomer, DimDate, DimProduct, NormalizedRecord};

/// The three dimension tables of one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dimensions {
    pub dim_date: Vec<DimDate>,
    pub dim_customer: Vec<DimCustomer>,
    pub dim_product: Vec<DimProduct>,
}

/// Accumulates distinct rows, keeping the first occurrence of each.
struct DistinctRows<T> {
    seen: HashSet<T>,
    rows: Vec<T>,
}

impl<T: Eq + Hash + Clone> DistinctRows<T> {
    fn new() -> Self {
        Self { seen: HashSet::new(), rows: Vec::new() }
    }

    fn add(&mut self, row: T) {
        if self.seen.insert(row.clone()) {
            self.rows.push(row);
        }
    }

    fn build(self) -> Vec<T> {
        self.rows
    }
}

fn distinct<T: Eq + Hash + Clone>(rows: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut acc = DistinctRows::new();
    for row in rows {
        acc.add(row);
    }
    acc.build()
}

impl From<&NormalizedRecord> for DimCustomer {
    fn from(r: &NormalizedRecord) -> Self {
        Self {
            customer_id: r.customer_id.clone(),
            customer_name: r.customer_name.clone(),
            segment: r.segment.clone(),
            country: r.country.clone(),
            region: r.region.clone(),
            state: r.state.clone(),
            city: r.city.clone(),
        }
    }
}

impl From<&NormalizedRecord> for DimProduct {
    fn from(r: &NormalizedRecord) -> Self {
        Self {
            product_id: r.product_id.clone(),
            product_name: r.product_name.clone(),
            category: r.category.clone(),
            sub_category: r.sub_category.clone(),
        }
    }
}

/// One row per distinct `order_date`. Dates without a key are skipped,
/// matching [`build_fact_sales`](super::fact::build_fact_sales).
pub fn build_dim_date(records: &[NormalizedRecord]) -> Vec<DimDate> {
    distinct(records.iter().map(|r| r.order_date))
        .into_iter()
        .filter_map(DimDate::from_date)
        .collect()
}

/// One row per distinct customer tuple.
pub fn build_dim_customer(records: &[NormalizedRecord]) -> Vec<DimCustomer> {
    distinct(records.iter().map(DimCustomer::from))
}

/// One row per distinct product tuple.
pub fn build_dim_product(records: &[NormalizedRecord]) -> Vec<DimProduct> {
    distinct(records.iter().map(DimProduct::from))
}

/// Build all three dimensions.
pub fn build_dimensions(records: &[NormalizedRecord]) -> Dimensions {
    Dimensions {
        dim_date: build_dim_date(records),
        dim_customer: build_dim_customer(records),
        dim_product: build_dim_product(records),
    }
}
