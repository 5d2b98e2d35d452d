//! Normalizer: raw rows to typed sales records.
//!
//! Rules, applied per row:
//!
//! ```text
//! header      "  Order Date " ──▶ order_date          (always, first)
//! dates       order_date, ship_date    unparsable ──▶ null
//! required    order_id order_date customer_id product_id sales
//!             any null ──▶ row dropped (counted, not an error)
//! categorical customer_name … sub_category   null/absent ──▶ "Unknown"
//! numeric     sales quantity discount profit unparsable/null/absent ──▶ 0
//! ```
//!
//! `sales` is checked for presence before numeric coercion: a present but
//! non-numeric value keeps the row and becomes `0`.

use std::collections::HashMap;

use super::coerce::{non_null, number_or_zero, parse_date, standardize_column, text_or_unknown};
use crate::models::{NormalizeStats, NormalizedRecord, NormalizedTable, RawTable, SkippedRow};

/// Fields a row must carry to be kept
pub const REQUIRED_COLUMNS: [&str; 5] =
    ["order_id", "order_date", "customer_id", "product_id", "sales"];

/// Categorical fields defaulting to `"Unknown"`
pub const TEXT_COLUMNS: [&str; 9] = [
    "customer_name",
    "segment",
    "country",
    "region",
    "state",
    "city",
    "product_name",
    "category",
    "sub_category",
];

/// Measures defaulting to `0`
pub const NUMERIC_COLUMNS: [&str; 4] = ["sales", "quantity", "discount", "profit"];

/// Standardized column name to position in the raw row.
///
/// When two headers standardize to the same name the first one wins.
#[derive(Debug, Clone, Default)]
pub struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    pub fn new(headers: &[String]) -> Self {
        let mut positions = HashMap::new();
        for (i, header) in headers.iter().enumerate() {
            positions.entry(standardize_column(header)).or_insert(i);
        }
        Self { positions }
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }
}

/// Standardized headers, in source order.
pub fn standardize_headers(headers: &[String]) -> Vec<String> {
    headers.iter().map(|h| standardize_column(h)).collect()
}

/// Names from `names` that no header standardizes to.
pub fn absent_columns(headers: &[String], names: &[&'static str]) -> Vec<&'static str> {
    let index = ColumnIndex::new(headers);
    names.iter().copied().filter(|c| !index.contains(c)).collect()
}

/// Required columns that no header standardizes to.
pub fn missing_required_columns(headers: &[String]) -> Vec<&'static str> {
    absent_columns(headers, &REQUIRED_COLUMNS)
}

/// Categorical and numeric columns that will be filled with defaults.
pub fn defaulted_columns(headers: &[String]) -> Vec<&'static str> {
    let mut absent = absent_columns(headers, &TEXT_COLUMNS);
    absent.extend(absent_columns(headers, &NUMERIC_COLUMNS));
    absent
}

/// Normalize a whole raw table.
///
/// Pure: the input is not touched and nothing is logged.
pub fn normalize(raw: &RawTable) -> NormalizedTable {
    let index = ColumnIndex::new(&raw.headers);
    let mut table = NormalizedTable::default();

    for (i, row) in raw.rows.iter().enumerate() {
        match normalize_row(row, &index) {
            Ok(record) => table.records.push(record),
            Err(missing_fields) => table.skipped.push(SkippedRow {
                row: i + 1,
                missing_fields: missing_fields.into_iter().map(String::from).collect(),
            }),
        }
    }

    table.stats = stats_for(raw.len(), &table);
    table
}

/// Normalize one raw row, or name the required fields it lacks.
pub fn normalize_row(
    row: &[String],
    index: &ColumnIndex,
) -> Result<NormalizedRecord, Vec<&'static str>> {
    let field = |name: &str| index.get(name).and_then(|i| row.get(i)).map(String::as_str);
    let key = |name: &'static str| field(name).and_then(non_null);

    let order_id = key("order_id");
    let order_date = field("order_date").and_then(parse_date);
    let customer_id = key("customer_id");
    let product_id = key("product_id");
    let sales = key("sales");

    let (Some(order_id), Some(order_date), Some(customer_id), Some(product_id), Some(_)) =
        (order_id, order_date, customer_id, product_id, sales)
    else {
        let present = [
            order_id.is_some(),
            order_date.is_some(),
            customer_id.is_some(),
            product_id.is_some(),
            sales.is_some(),
        ];
        return Err(REQUIRED_COLUMNS
            .iter()
            .zip(present)
            .filter(|(_, ok)| !ok)
            .map(|(name, _)| *name)
            .collect());
    };

    Ok(NormalizedRecord {
        order_id: order_id.to_string(),
        order_date,
        ship_date: field("ship_date").and_then(parse_date),
        customer_id: customer_id.to_string(),
        customer_name: text_or_unknown(field("customer_name")),
        segment: text_or_unknown(field("segment")),
        country: text_or_unknown(field("country")),
        region: text_or_unknown(field("region")),
        state: text_or_unknown(field("state")),
        city: text_or_unknown(field("city")),
        product_id: product_id.to_string(),
        product_name: text_or_unknown(field("product_name")),
        category: text_or_unknown(field("category")),
        sub_category: text_or_unknown(field("sub_category")),
        sales: number_or_zero(field("sales")),
        quantity: number_or_zero(field("quantity")),
        discount: number_or_zero(field("discount")),
        profit: number_or_zero(field("profit")),
    })
}

fn stats_for(input_rows: usize, table: &NormalizedTable) -> NormalizeStats {
    let mut stats = NormalizeStats {
        input_rows,
        kept_rows: table.records.len(),
        dropped_rows: table.skipped.len(),
        ..Default::default()
    };
    for skip in &table.skipped {
        for field in &skip.missing_fields {
            *stats.dropped_by_field.entry(field.clone()).or_default() += 1;
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn raw(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        let mut table = RawTable::new(headers.iter().map(|h| h.to_string()).collect());
        for row in rows {
            table.push_row(row.iter().map(|v| v.to_string()).collect());
        }
        table
    }

    const HEADERS: &[&str] = &[
        "Order ID",
        "Order Date",
        "Ship Date",
        "Customer ID",
        "Customer Name",
        "Segment",
        "Country",
        "Region",
        "State",
        "City",
        "Product ID",
        "Product Name",
        "Category",
        "Sub Category",
        "Sales",
        "Quantity",
        "Discount",
        "Profit",
    ];

    fn full_row<'a>(order_id: &'a str, customer_id: &'a str, discount: &'a str) -> Vec<&'a str> {
        vec![
            order_id, "2023-03-15", "2023-03-18", customer_id, "Ada Lovelace", "Consumer",
            "United States", "West", "California", "Los Angeles", "P1", "Stapler", "Office Supplies",
            "Fasteners", "100", "2", discount, "12.5",
        ]
    }

    #[test]
    fn test_order_date_header_is_standardized_and_parsed() {
        let table = normalize(&raw(
            &["  Order Date ", "ORDER ID", "customer id", "Product ID", "Sales"],
            &[&["2023-03-15", "A1", "C1", "P1", "100"]],
        ));

        assert_eq!(table.records.len(), 1);
        assert_eq!(
            table.records[0].order_date,
            NaiveDate::from_ymd_opt(2023, 3, 15).unwrap()
        );
    }

    #[test]
    fn test_full_row() {
        let row = full_row("A1", "C1", "0.2");
        let table = normalize(&raw(HEADERS, &[&row[..]]));
        let record = &table.records[0];

        assert_eq!(record.order_id, "A1");
        assert_eq!(record.ship_date, NaiveDate::from_ymd_opt(2023, 3, 18));
        assert_eq!(record.sub_category, "Fasteners");
        assert_eq!(record.sales, 100.0);
        assert_eq!(record.quantity, 2.0);
        assert_eq!(record.discount, 0.2);
        assert_eq!(record.profit, 12.5);
    }

    #[test]
    fn test_missing_customer_id_drops_only_that_row() {
        let kept = full_row("A1", "C1", "0");
        let dropped = full_row("A2", "", "0");
        let table = normalize(&raw(HEADERS, &[&kept[..], &dropped[..]]));

        assert_eq!(table.records.len(), 1);
        assert_eq!(table.records[0].order_id, "A1");
        assert_eq!(table.skipped[0].row, 2);
        assert_eq!(table.skipped[0].missing_fields, vec!["customer_id"]);
        assert_eq!(table.stats.input_rows, 2);
        assert_eq!(table.stats.kept_rows, 1);
        assert_eq!(table.stats.dropped_rows, 1);
        assert_eq!(table.stats.dropped_by_field["customer_id"], 1);
    }

    #[test]
    fn test_unparsable_order_date_drops_row() {
        let mut row = full_row("A1", "C1", "0");
        row[1] = "someday";
        let table = normalize(&raw(HEADERS, &[&row[..]]));

        assert!(table.records.is_empty());
        assert_eq!(table.skipped[0].missing_fields, vec!["order_date"]);
    }

    #[test]
    fn test_signed_year_order_date_drops_row() {
        let mut row = full_row("A1", "C1", "0");
        row[1] = "-0001-03-15";
        let table = normalize(&raw(HEADERS, &[&row[..]]));

        assert!(table.records.is_empty());
        assert_eq!(table.stats.dropped_by_field["order_date"], 1);
    }

    #[test]
    fn test_bad_ship_date_is_nulled_not_dropped() {
        let mut row = full_row("A1", "C1", "0");
        row[2] = "soon";
        let table = normalize(&raw(HEADERS, &[&row[..]]));

        assert_eq!(table.records.len(), 1);
        assert_eq!(table.records[0].ship_date, None);
    }

    #[test]
    fn test_non_numeric_discount_becomes_zero() {
        let row = full_row("A1", "C1", "N/A");
        let table = normalize(&raw(HEADERS, &[&row[..]]));
        let record = &table.records[0];

        assert_eq!(record.discount, 0.0);
        assert_eq!(record.sales, 100.0);
        assert_eq!(record.profit, 12.5);
        assert_eq!(record.customer_name, "Ada Lovelace");
    }

    #[test]
    fn test_non_numeric_sales_is_kept_as_zero() {
        let mut row = full_row("A1", "C1", "0");
        row[14] = "lots";
        let table = normalize(&raw(HEADERS, &[&row[..]]));

        assert_eq!(table.records.len(), 1);
        assert_eq!(table.records[0].sales, 0.0);
    }

    #[test]
    fn test_empty_sales_drops_row() {
        let mut row = full_row("A1", "C1", "0");
        row[14] = "";
        let table = normalize(&raw(HEADERS, &[&row[..]]));

        assert!(table.records.is_empty());
        assert_eq!(table.stats.dropped_by_field["sales"], 1);
    }

    #[test]
    fn test_absent_optional_columns_default() {
        let table = normalize(&raw(
            &["Order ID", "Order Date", "Customer ID", "Product ID", "Sales", "Segment"],
            &[&["A1", "2023-03-15", "C1", "P1", "100", ""]],
        ));
        let record = &table.records[0];

        assert_eq!(record.segment, "Unknown");
        assert_eq!(record.city, "Unknown");
        assert_eq!(record.category, "Unknown");
        assert_eq!(record.quantity, 0.0);
        assert_eq!(record.ship_date, None);
    }

    #[test]
    fn test_absent_required_column_drops_every_row() {
        let headers = ["Order ID", "Order Date", "Product ID", "Sales"];
        let table = normalize(&raw(&headers, &[&["A1", "2023-03-15", "P1", "100"]]));

        assert!(table.records.is_empty());
        assert_eq!(table.stats.dropped_rows, 1);

        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        assert_eq!(missing_required_columns(&headers), vec!["customer_id"]);
    }

    #[test]
    fn test_defaulted_columns() {
        let headers: Vec<String> = ["Order ID", "Order Date", "Customer ID", "Product ID", "Sales", "City"]
            .iter()
            .map(|h| h.to_string())
            .collect();
        let defaulted = defaulted_columns(&headers);

        assert!(defaulted.contains(&"segment"));
        assert!(defaulted.contains(&"profit"));
        assert!(!defaulted.contains(&"city"));
        assert!(!defaulted.contains(&"sales"));
    }

    #[test]
    fn test_duplicate_standardized_header_first_wins() {
        let table = normalize(&raw(
            &["Order ID", "order id", "Order Date", "Customer ID", "Product ID", "Sales"],
            &[&["first", "second", "2023-03-15", "C1", "P1", "1"]],
        ));

        assert_eq!(table.records[0].order_id, "first");
    }

    #[test]
    fn test_values_are_trimmed() {
        let table = normalize(&raw(
            &["Order ID", "Order Date", "Customer ID", "Product ID", "Sales", "City"],
            &[&[" A1 ", "2023-03-15", " C1", "P1 ", " 7 ", "  Paris "]],
        ));
        let record = &table.records[0];

        assert_eq!(record.order_id, "A1");
        assert_eq!(record.customer_id, "C1");
        assert_eq!(record.product_id, "P1");
        assert_eq!(record.city, "Paris");
        assert_eq!(record.sales, 7.0);
    }

    #[test]
    fn test_empty_input() {
        let table = normalize(&raw(HEADERS, &[]));

        assert!(table.records.is_empty());
        assert_eq!(table.stats, NormalizeStats::default());
    }

    #[test]
    fn test_standardize_headers() {
        let headers = vec!["Order ID".to_string(), " Sub Category".to_string()];
        assert_eq!(standardize_headers(&headers), vec!["order_id", "sub_category"]);
    }
}
