//! Domain models for the Salestar star-schema pipeline.
//!
//! - [`RawTable`] - Untyped rows as read from the source
//! - [`NormalizedRecord`] / [`NormalizedTable`] - One cleaned transaction per row
//! - [`SkippedRow`] / [`NormalizeStats`] - What the required-field filter dropped
//! - [`DimDate`], [`DimCustomer`], [`DimProduct`] - Dimension rows
//! - [`FactSales`] - Fact rows
//! - [`StarSchema`] - The four output tables together
//!
//! Every output row type implements [`TableRow`], which pins the file name
//! and the header order the writer emits. Struct field order matches
//! `COLUMNS` because the csv serializer writes fields in declaration order.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

// =============================================================================
// Raw input
// =============================================================================

/// Untyped tabular data straight from the loader.
///
/// Headers are kept verbatim; every row has exactly `headers.len()` fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self { headers, rows: Vec::new() }
    }

    /// Append a row, padding or truncating it to the header width.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// =============================================================================
// Normalized records
// =============================================================================

/// One sales transaction after cleaning.
///
/// Required keys are plain values: a row that cannot fill them never
/// becomes a `NormalizedRecord`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub order_id: String,
    pub order_date: NaiveDate,
    pub ship_date: Option<NaiveDate>,
    pub customer_id: String,
    pub customer_name: String,
    pub segment: String,
    pub country: String,
    pub region: String,
    pub state: String,
    pub city: String,
    pub product_id: String,
    pub product_name: String,
    pub category: String,
    pub sub_category: String,
    pub sales: f64,
    pub quantity: f64,
    pub discount: f64,
    pub profit: f64,
}

/// Row accounting for a normalization pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizeStats {
    /// Rows read from the source
    pub input_rows: usize,
    /// Rows that survived the required-field filter
    pub kept_rows: usize,
    /// Rows dropped by the required-field filter
    pub dropped_rows: usize,
    /// Dropped rows per required field (a row missing two keys counts twice)
    pub dropped_by_field: BTreeMap<String, usize>,
}

/// A raw row dropped by the required-field filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRow {
    /// 1-based data row index (header excluded)
    pub row: usize,
    /// Required fields that were missing or unparsable
    pub missing_fields: Vec<String>,
}

/// Output of the normalizer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedTable {
    pub records: Vec<NormalizedRecord>,
    pub skipped: Vec<SkippedRow>,
    pub stats: NormalizeStats,
}

// =============================================================================
// Date surrogate key
// =============================================================================

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Years a `YYYYMMDD` key can represent.
pub const KEY_YEARS: RangeInclusive<i32> = 1..=9999;

/// Encode a calendar date as `YYYYMMDD`, or `None` outside [`KEY_YEARS`].
///
/// Shared by `dim_date.date_key` and `fact_sales.order_date_key`; joins
/// between the two depend on this being the only encoder.
pub fn date_key(date: NaiveDate) -> Option<u32> {
    if !KEY_YEARS.contains(&date.year()) {
        return None;
    }
    let year = u32::try_from(date.year()).ok()?;
    Some(year * 10_000 + date.month() * 100 + date.day())
}

/// Whether `date` has a [`date_key`].
pub fn is_encodable(date: NaiveDate) -> bool {
    date_key(date).is_some()
}

/// Inverse of [`date_key`]. Returns `None` for keys that are not a real date.
pub fn decode_date_key(key: u32) -> Option<NaiveDate> {
    let year = (key / 10_000) as i32;
    let month = (key / 100) % 100;
    let day = key % 100;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Locale-independent three-letter month name, `month` in 1..=12.
pub fn month_abbrev(month: u32) -> &'static str {
    MONTH_ABBREVIATIONS[(month.clamp(1, 12) - 1) as usize]
}

/// Calendar quarter, `ceil(month / 3)`.
pub fn quarter_of(month: u32) -> u32 {
    (month + 2) / 3
}

// =============================================================================
// Output tables
// =============================================================================

/// A row type that is persisted as its own table.
pub trait TableRow: Serialize {
    /// File stem of the table
    const TABLE: &'static str;
    /// Header row, in serialization order
    const COLUMNS: &'static [&'static str];
}

/// Date dimension row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DimDate {
    pub date_key: u32,
    pub date: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub quarter: u32,
}

impl DimDate {
    /// `None` when the date has no key.
    pub fn from_date(date: NaiveDate) -> Option<Self> {
        let month = date.month();
        Some(Self {
            date_key: date_key(date)?,
            date,
            year: date.year(),
            month,
            month_name: month_abbrev(month).to_string(),
            quarter: quarter_of(month),
        })
    }
}

/// Customer dimension row. Unique over the whole tuple, not the id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DimCustomer {
    pub customer_id: String,
    pub customer_name: String,
    pub segment: String,
    pub country: String,
    pub region: String,
    pub state: String,
    pub city: String,
}

/// Product dimension row. Unique over the whole tuple, not the id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DimProduct {
    pub product_id: String,
    pub product_name: String,
    pub category: String,
    pub sub_category: String,
}

/// Sales fact row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactSales {
    pub order_id: String,
    pub order_date_key: u32,
    pub customer_id: String,
    pub product_id: String,
    pub sales: f64,
    pub quantity: f64,
    pub discount: f64,
    pub profit: f64,
    pub country: String,
    pub region: String,
    pub state: String,
    pub city: String,
}

impl TableRow for DimDate {
    const TABLE: &'static str = "dim_date";
    const COLUMNS: &'static [&'static str] =
        &["date_key", "date", "year", "month", "month_name", "quarter"];
}

impl TableRow for DimCustomer {
    const TABLE: &'static str = "dim_customer";
    const COLUMNS: &'static [&'static str] = &[
        "customer_id",
        "customer_name",
        "segment",
        "country",
        "region",
        "state",
        "city",
    ];
}

impl TableRow for DimProduct {
    const TABLE: &'static str = "dim_product";
    const COLUMNS: &'static [&'static str] =
        &["product_id", "product_name", "category", "sub_category"];
}

impl TableRow for FactSales {
    const TABLE: &'static str = "fact_sales";
    const COLUMNS: &'static [&'static str] = &[
        "order_id",
        "order_date_key",
        "customer_id",
        "product_id",
        "sales",
        "quantity",
        "discount",
        "profit",
        "country",
        "region",
        "state",
        "city",
    ];
}

impl TableRow for NormalizedRecord {
    const TABLE: &'static str = "normalized_sales";
    const COLUMNS: &'static [&'static str] = &[
        "order_id",
        "order_date",
        "ship_date",
        "customer_id",
        "customer_name",
        "segment",
        "country",
        "region",
        "state",
        "city",
        "product_id",
        "product_name",
        "category",
        "sub_category",
        "sales",
        "quantity",
        "discount",
        "profit",
    ];
}

/// The four output tables of one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StarSchema {
    pub dim_date: Vec<DimDate>,
    pub dim_customer: Vec<DimCustomer>,
    pub dim_product: Vec<DimProduct>,
    pub fact_sales: Vec<FactSales>,
}

impl StarSchema {
    /// Row count per table, keyed by table name.
    pub fn row_counts(&self) -> BTreeMap<String, usize> {
        BTreeMap::from([
            (DimDate::TABLE.to_string(), self.dim_date.len()),
            (DimCustomer::TABLE.to_string(), self.dim_customer.len()),
            (DimProduct::TABLE.to_string(), self.dim_product.len()),
            (FactSales::TABLE.to_string(), self.fact_sales.len()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_key_encoding() {
        let date = NaiveDate::from_ymd_opt(2023, 3, 15).unwrap();
        assert_eq!(date_key(date), Some(20230315));
    }

    #[test]
    fn test_date_key_rejects_years_outside_range() {
        let signed = NaiveDate::from_ymd_opt(-1, 3, 15).unwrap();
        let year_zero = NaiveDate::from_ymd_opt(0, 1, 1).unwrap();
        let far = NaiveDate::from_ymd_opt(10_000, 1, 1).unwrap();
        assert_eq!(date_key(signed), None);
        assert_eq!(date_key(year_zero), None);
        assert_eq!(date_key(far), None);
        assert!(DimDate::from_date(signed).is_none());

        let edge = NaiveDate::from_ymd_opt(9999, 12, 31).unwrap();
        assert_eq!(date_key(edge), Some(99991231));
        assert!(is_encodable(NaiveDate::from_ymd_opt(1, 1, 1).unwrap()));
    }

    #[test]
    fn test_date_key_decodes_back() {
        let start = NaiveDate::from_ymd_opt(1999, 12, 25).unwrap();
        for offset in 0..800 {
            let date = start + chrono::Duration::days(offset);
            assert_eq!(decode_date_key(date_key(date).unwrap()), Some(date));
        }
    }

    #[test]
    fn test_decode_rejects_impossible_dates() {
        assert_eq!(decode_date_key(20230230), None);
        assert_eq!(decode_date_key(20231301), None);
    }

    #[test]
    fn test_quarter_and_month_name() {
        let quarters: Vec<u32> = (1..=12).map(quarter_of).collect();
        assert_eq!(quarters, vec![1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4]);
        assert_eq!(month_abbrev(1), "Jan");
        assert_eq!(month_abbrev(9), "Sep");
        assert_eq!(month_abbrev(12), "Dec");
    }

    #[test]
    fn test_dim_date_from_date() {
        let row = DimDate::from_date(NaiveDate::from_ymd_opt(2023, 3, 15).unwrap()).unwrap();
        assert_eq!(row.date_key, 20230315);
        assert_eq!(row.year, 2023);
        assert_eq!(row.month, 3);
        assert_eq!(row.month_name, "Mar");
        assert_eq!(row.quarter, 1);
    }

    #[test]
    fn test_raw_row_padding() {
        let mut table = RawTable::new(vec!["a".into(), "b".into(), "c".into()]);
        table.push_row(vec!["1".into()]);
        table.push_row(vec!["1".into(), "2".into(), "3".into(), "4".into()]);

        assert_eq!(table.rows[0], vec!["1", "", ""]);
        assert_eq!(table.rows[1], vec!["1", "2", "3"]);
    }

    #[test]
    fn test_row_counts_keys() {
        let counts = StarSchema::default().row_counts();
        assert_eq!(counts.len(), 4);
        assert_eq!(counts["fact_sales"], 0);
    }
}
