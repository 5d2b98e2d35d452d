//! Fact builder: one `fact_sales` row per normalized transaction.
//!
//! `order_date_key` goes through [`date_key`], the same encoder the date
//! dimension uses, so every fact row joins to `dim_date`. Geography is
//! carried from the transaction itself, not looked up in `dim_customer`.

use chrono::NaiveDate;

use crate::models::{date_key, FactSales, NormalizedRecord};

impl TryFrom<&NormalizedRecord> for FactSales {
    /// The order date that has no key
    type Error = NaiveDate;

    fn try_from(r: &NormalizedRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            order_id: r.order_id.clone(),
            order_date_key: date_key(r.order_date).ok_or(r.order_date)?,
            customer_id: r.customer_id.clone(),
            product_id: r.product_id.clone(),
            sales: r.sales,
            quantity: r.quantity,
            discount: r.discount,
            profit: r.profit,
            country: r.country.clone(),
            region: r.region.clone(),
            state: r.state.clone(),
            city: r.city.clone(),
        })
    }
}

/// One fact row per record. The normalizer only keeps encodable order
/// dates, so nothing is skipped for its output.
pub fn build_fact_sales(records: &[NormalizedRecord]) -> Vec<FactSales> {
    records
        .iter()
        .filter_map(|r| FactSales::try_from(r).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::dimensions::{build_dim_date, tests::record};
    use std::collections::HashSet;

    #[test]
    fn test_one_fact_per_record() {
        let records = vec![
            record("A1", (2023, 3, 15), "C1", "P1"),
            record("A1", (2023, 3, 15), "C1", "P1"),
        ];
        let facts = build_fact_sales(&records);

        // No deduplication on the fact side
        assert_eq!(facts.len(), 2);
    }

    #[test]
    fn test_projection() {
        let mut r = record("A7", (2022, 12, 31), "C9", "P4");
        r.city = "Seattle".to_string();
        r.discount = 0.25;
        let fact = FactSales::try_from(&r).unwrap();

        assert_eq!(fact.order_id, "A7");
        assert_eq!(fact.order_date_key, 20221231);
        assert_eq!(fact.customer_id, "C9");
        assert_eq!(fact.product_id, "P4");
        assert_eq!(fact.sales, 100.0);
        assert_eq!(fact.quantity, 2.0);
        assert_eq!(fact.discount, 0.25);
        assert_eq!(fact.profit, 12.5);
        assert_eq!(fact.city, "Seattle");
        assert_eq!(fact.state, "California");
    }

    #[test]
    fn test_fact_keys_join_dim_date() {
        let records = vec![
            record("A1", (2023, 1, 5), "C1", "P1"),
            record("A2", (2023, 6, 30), "C2", "P2"),
            record("A3", (2024, 2, 29), "C3", "P3"),
        ];
        let date_keys: HashSet<u32> = build_dim_date(&records).iter().map(|d| d.date_key).collect();

        for fact in build_fact_sales(&records) {
            assert!(date_keys.contains(&fact.order_date_key));
        }
    }

    #[test]
    fn test_unencodable_date_has_no_fact() {
        let mut r = record("A1", (2023, 3, 15), "C1", "P1");
        r.order_date = NaiveDate::from_ymd_opt(-1, 3, 15).unwrap();

        assert_eq!(FactSales::try_from(&r), Err(r.order_date));
        assert!(build_fact_sales(&[r]).is_empty());
    }
}
