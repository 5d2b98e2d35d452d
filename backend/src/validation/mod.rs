//! Integrity checks over a built (or re-read) star schema.
//!
//! These check the output, not the input: malformed source rows are
//! coerced by the normalizer and never reach this point as errors.
//!
//! # Checks
//!
//! - every `fact_sales.order_date_key` exists in `dim_date`
//! - `dim_date` keys are unique and decode back to their `date`
//! - no duplicate full tuples in `dim_customer` / `dim_product`
//! - every fact `customer_id` / `product_id` appears in its dimension
//!
//! A fact id may match several dimension rows when attributes drift; that
//! is expected and not reported.

use std::collections::HashSet;
use std::hash::Hash;

use crate::models::{decode_date_key, StarSchema};

/// Cap on reported messages per check
const MAX_REPORTED: usize = 10;

/// Validate a star schema.
///
/// # Returns
/// * `Ok(())` when every check passes
/// * `Err(Vec<String>)` with one message per violation (capped per check)
///
/// # Example
/// ```ignore
/// use salestar::{build_star_schema, check_star_schema, normalize};
///
/// let schema = build_star_schema(&normalize(&raw));
/// assert!(check_star_schema(&schema).is_ok());
/// ```
pub fn check_star_schema(schema: &StarSchema) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    check_dim_date(schema, &mut errors);
    check_unique("dim_customer", &schema.dim_customer, &mut errors);
    check_unique("dim_product", &schema.dim_product, &mut errors);
    check_fact_references(schema, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick yes/no variant of [`check_star_schema`].
pub fn is_consistent(schema: &StarSchema) -> bool {
    check_star_schema(schema).is_ok()
}

fn check_dim_date(schema: &StarSchema, errors: &mut Vec<String>) {
    let mut seen = HashSet::new();
    let mut reported = 0;
    for row in &schema.dim_date {
        let problem = if !seen.insert(row.date_key) {
            Some(format!("dim_date: duplicate date_key {}", row.date_key))
        } else if decode_date_key(row.date_key) != Some(row.date) {
            Some(format!(
                "dim_date: date_key {} does not encode date {}",
                row.date_key, row.date
            ))
        } else {
            None
        };

        if let Some(msg) = problem {
            reported += 1;
            if reported <= MAX_REPORTED {
                errors.push(msg);
            }
        }
    }
}

fn check_unique<T: Eq + Hash + std::fmt::Debug>(table: &str, rows: &[T], errors: &mut Vec<String>) {
    let mut seen = HashSet::new();
    let duplicates: Vec<&T> = rows.iter().filter(|row| !seen.insert(*row)).collect();

    for row in duplicates.iter().take(MAX_REPORTED) {
        errors.push(format!("{}: duplicate row {:?}", table, row));
    }
}

fn check_fact_references(schema: &StarSchema, errors: &mut Vec<String>) {
    let date_keys: HashSet<u32> = schema.dim_date.iter().map(|d| d.date_key).collect();
    let customer_ids: HashSet<&str> = schema
        .dim_customer
        .iter()
        .map(|c| c.customer_id.as_str())
        .collect();
    let product_ids: HashSet<&str> = schema
        .dim_product
        .iter()
        .map(|p| p.product_id.as_str())
        .collect();

    let mut dangling = Vec::new();
    for fact in &schema.fact_sales {
        if !date_keys.contains(&fact.order_date_key) {
            dangling.push(format!(
                "fact_sales: order {} has order_date_key {} missing from dim_date",
                fact.order_id, fact.order_date_key
            ));
        }
        if !customer_ids.contains(fact.customer_id.as_str()) {
            dangling.push(format!(
                "fact_sales: order {} references unknown customer_id {}",
                fact.order_id, fact.customer_id
            ));
        }
        if !product_ids.contains(fact.product_id.as_str()) {
            dangling.push(format!(
                "fact_sales: order {} references unknown product_id {}",
                fact.order_id, fact.product_id
            ));
        }
    }

    let total = dangling.len();
    errors.extend(dangling.into_iter().take(MAX_REPORTED));
    if total > MAX_REPORTED {
        errors.push(format!(
            "fact_sales: ... and {} more dangling references",
            total - MAX_REPORTED
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DimDate, FactSales};
    use crate::transform::dimensions::tests::record;
    use crate::transform::pipeline::build_star_schema;
    use crate::models::NormalizedTable;
    use chrono::NaiveDate;

    fn built_schema() -> StarSchema {
        let mut drifted = record("A3", (2023, 4, 1), "C1", "P2");
        drifted.city = "San Diego".to_string();
        let table = NormalizedTable {
            records: vec![
                record("A1", (2023, 3, 15), "C1", "P1"),
                record("A2", (2023, 3, 15), "C2", "P1"),
                drifted,
            ],
            ..Default::default()
        };
        build_star_schema(&table)
    }

    #[test]
    fn test_built_schema_is_consistent() {
        let schema = built_schema();
        assert!(is_consistent(&schema));
    }

    #[test]
    fn test_empty_schema_is_consistent() {
        assert!(check_star_schema(&StarSchema::default()).is_ok());
    }

    #[test]
    fn test_dangling_date_key() {
        let mut schema = built_schema();
        schema.fact_sales[0].order_date_key = 19990101;

        let errors = check_star_schema(&schema).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("19990101"));
    }

    #[test]
    fn test_duplicate_dimension_rows() {
        let mut schema = built_schema();
        let dup = schema.dim_customer[0].clone();
        schema.dim_customer.push(dup);
        let date = schema.dim_date[0].clone();
        schema.dim_date.push(date);

        let errors = check_star_schema(&schema).unwrap_err();
        assert!(errors.iter().any(|e| e.starts_with("dim_customer: duplicate")));
        assert!(errors.iter().any(|e| e.starts_with("dim_date: duplicate")));
    }

    #[test]
    fn test_key_not_matching_date() {
        let mut row = DimDate::from_date(NaiveDate::from_ymd_opt(2023, 3, 15).unwrap()).unwrap();
        row.date_key = 20230316;
        let schema = StarSchema { dim_date: vec![row], ..Default::default() };

        let errors = check_star_schema(&schema).unwrap_err();
        assert!(errors[0].contains("does not encode"));
    }

    #[test]
    fn test_unknown_customer_and_overflow_message() {
        let mut schema = built_schema();
        let template = schema.fact_sales[0].clone();
        schema.fact_sales = (0..15)
            .map(|i| FactSales { order_id: format!("X{i}"), customer_id: "ghost".into(), ..template.clone() })
            .collect();

        let errors = check_star_schema(&schema).unwrap_err();
        assert_eq!(errors.len(), MAX_REPORTED + 1);
        assert!(errors.last().unwrap().contains("5 more"));
    }
}
