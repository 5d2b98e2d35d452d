//! Raw sales loader with encoding and delimiter auto-detection.
//!
//! Produces an untyped [`RawTable`]; header names are kept exactly as they
//! appear in the file. Cleaning happens later in [`crate::transform::normalize`].

use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{LoadError, LoadResult};
use crate::models::RawTable;

/// Loaded table plus what was detected while reading it
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: RawTable,
    /// Detected encoding
    pub encoding: String,
    /// Detected or requested delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" | "utf-8-sig" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes using the given encoding label, falling back to lossy UTF-8.
///
/// A leading byte order mark is removed.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let decoded = match encoding {
        "utf-8" => String::from_utf8_lossy(bytes).into_owned(),
        label => match encoding_rs::Encoding::for_label(label.as_bytes()) {
            Some(enc) => enc.decode(bytes).0.into_owned(),
            None => String::from_utf8_lossy(bytes).into_owned(),
        },
    };

    match decoded.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => decoded,
    }
}

/// Detect the delimiter by counting occurrences in the header line.
///
/// Comma wins ties and is the fallback for single-column files.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV text with an explicit delimiter.
///
/// Quoted fields may contain the delimiter or line breaks. Rows shorter than
/// the header are padded with empty fields, longer rows are truncated, and
/// rows whose fields are all blank are skipped.
pub fn parse_str(content: &str, delimiter: char) -> LoadResult<RawTable> {
    if !delimiter.is_ascii() {
        return Err(LoadError::InvalidDelimiter(delimiter));
    }
    let delimiter_byte = delimiter as u8;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(LoadError::EmptyFile);
    }

    let mut table = RawTable::new(headers);
    for result in reader.records() {
        let record = result?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        table.push_row(record.iter().map(str::to_string).collect());
    }

    Ok(table)
}

/// Parse CSV bytes, detecting encoding and (unless given) the delimiter.
pub fn parse_bytes(bytes: &[u8], delimiter: Option<char>) -> LoadResult<LoadedTable> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);

    if content.trim().is_empty() {
        return Err(LoadError::EmptyFile);
    }

    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));
    let table = parse_str(&content, delimiter)?;

    Ok(LoadedTable { table, encoding, delimiter })
}

/// Load a CSV file from disk.
///
/// A missing or unreadable file is the one fatal input condition.
///
/// # Example
/// ```ignore
/// let loaded = load_file("data/raw_sales.csv", None)?;
/// println!("Encoding: {}, Delimiter: '{}'", loaded.encoding, loaded.delimiter);
/// println!("Rows: {}", loaded.table.len());
/// ```
pub fn load_file<P: AsRef<Path>>(path: P, delimiter: Option<char>) -> LoadResult<LoadedTable> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_bytes(&bytes, delimiter)
}

/// Raw rows as JSON objects keyed by the original header names.
pub fn to_json_records(table: &RawTable) -> Vec<Value> {
    table
        .rows
        .iter()
        .map(|row| {
            let mut obj = Map::new();
            for (header, value) in table.headers.iter().zip(row) {
                obj.entry(header.clone())
                    .or_insert_with(|| Value::String(value.clone()));
            }
            Value::Object(obj)
        })
        .collect()
}
