// src/load/mod.rs

use anyhow::{bail, Context, Result};
use arrow::{
    csv::{reader::Format, ReaderBuilder},
    datatypes::{DataType, Field, Schema, SchemaRef},
    record_batch::RecordBatch,
};
use duckdb::Connection;
use std::{fs, io::Cursor, path::Path, sync::Arc, time::Instant};
use tracing::{debug, info};

use crate::duck;
use crate::query::is_simple_ident;

/// Rows per Arrow batch when parsing the source file.
const BATCH_ROWS: usize = 8_192;

/// The source file held fully in memory.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub schema: SchemaRef,
    pub batches: Vec<RecordBatch>,
}

impl Dataset {
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(|b| b.num_rows()).sum()
    }

    pub fn num_columns(&self) -> usize {
        self.schema.fields().len()
    }
}

/// Collapse inferred types onto the four column types the table supports.
///
/// Dates, timestamps and columns with no values at all are kept as text.
fn table_schema(inferred: &Schema) -> Schema {
    let fields: Vec<Field> = inferred
        .fields()
        .iter()
        .map(|f| {
            let dt = match f.data_type() {
                DataType::Int64 => DataType::Int64,
                DataType::Float64 => DataType::Float64,
                DataType::Boolean => DataType::Boolean,
                _ => DataType::Utf8,
            };
            Field::new(f.name(), dt, true)
        })
        .collect();
    Schema::new(fields)
}

/// Read a headed CSV file fully into memory, inferring column types from every record.
pub fn read_csv(path: &Path) -> Result<Dataset> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;

    let (inferred, records) = Format::default()
        .with_header(true)
        .infer_schema(Cursor::new(&bytes), None)
        .with_context(|| format!("inferring schema of {}", path.display()))?;
    if inferred.fields().is_empty() {
        bail!("{} has no header row", path.display());
    }
    let schema: SchemaRef = Arc::new(table_schema(&inferred));
    debug!(records, columns = schema.fields().len(), "inferred schema");

    let reader = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .with_batch_size(BATCH_ROWS)
        .build(Cursor::new(&bytes))
        .context("creating CSV reader")?;
    let batches = reader
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("parsing {}", path.display()))?;

    Ok(Dataset { schema, batches })
}

/// Replace `table` with the contents of `data`, returning the number of rows written.
///
/// Any existing table of that name is dropped first; nothing is appended or merged.
pub fn write_table(conn: &Connection, table: &str, data: &Dataset) -> Result<u64> {
    let quoted: Vec<&str> = data
        .schema
        .fields()
        .iter()
        .map(|f| f.name().as_str())
        .filter(|n| !is_simple_ident(n))
        .collect();
    if !quoted.is_empty() {
        debug!(?quoted, "columns that need quoting in queries");
    }

    duck::create_or_replace_table(conn, table, &data.schema)?;
    duck::append_batches(conn, table, &data.batches)
}

/// Load the CSV at `path` into `table`, replacing whatever was there.
pub fn load_file(conn: &Connection, path: &Path, table: &str) -> Result<u64> {
    let start = Instant::now();
    let data = read_csv(path)?;
    info!(
        path = %path.display(),
        rows = data.num_rows(),
        columns = data.num_columns(),
        "read source file"
    );

    let rows = write_table(conn, table, &data)
        .with_context(|| format!("writing {} to table {}", path.display(), table))?;
    info!(
        "✅ loaded {} rows into table {} in {:?}",
        rows,
        table,
        start.elapsed()
    );
    Ok(rows)
}
