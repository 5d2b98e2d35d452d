//! CSV persistence of the star schema.
//!
//! Each table is written as `<table>.csv` with an explicit header row, so a
//! table with zero rows still carries its columns.

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

use crate::error::{LoadError, LoadResult, WriteError, WriteResult};
use crate::models::{DimCustomer, DimDate, DimProduct, FactSales, StarSchema, TableRow};

/// Path of a table's file inside `dir`.
pub fn table_path<T: TableRow>(dir: &Path) -> PathBuf {
    dir.join(format!("{}.csv", T::TABLE))
}

/// Create the output directory if it does not exist yet.
pub fn prepare_output_dir(dir: &Path) -> WriteResult<()> {
    std::fs::create_dir_all(dir).map_err(|source| WriteError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

/// Write one table, replacing any previous file.
pub fn write_table<T: TableRow>(dir: &Path, rows: &[T]) -> WriteResult<PathBuf> {
    let path = table_path::<T>(dir);
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)?;

    writer.write_record(T::COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|source| WriteError::Io {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}

/// Write the four star-schema tables into `dir`.
///
/// Returns the written paths in the order dim_date, dim_customer,
/// dim_product, fact_sales.
pub fn write_star_schema(dir: &Path, schema: &StarSchema) -> WriteResult<Vec<PathBuf>> {
    prepare_output_dir(dir)?;
    Ok(vec![
        write_table(dir, &schema.dim_date)?,
        write_table(dir, &schema.dim_customer)?,
        write_table(dir, &schema.dim_product)?,
        write_table(dir, &schema.fact_sales)?,
    ])
}

/// Read one table written by [`write_table`].
pub fn read_table<T: TableRow + DeserializeOwned>(dir: &Path) -> LoadResult<Vec<T>> {
    let path = table_path::<T>(dir);
    let file = std::fs::File::open(&path).map_err(|source| LoadError::Io {
        path: path.clone(),
        source,
    })?;

    let mut reader = csv::Reader::from_reader(file);
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}

/// Read back the four tables from an output directory.
pub fn read_star_schema(dir: &Path) -> LoadResult<StarSchema> {
    Ok(StarSchema {
        dim_date: read_table::<DimDate>(dir)?,
        dim_customer: read_table::<DimCustomer>(dir)?,
        dim_product: read_table::<DimProduct>(dir)?,
        fact_sales: read_table::<FactSales>(dir)?,
    })
}
