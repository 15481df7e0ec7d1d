use anyhow::{anyhow, bail, Context, Result};
use arrow::datatypes::{DataType, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use duckdb::Connection;
use std::path::Path;
use tracing::debug;

use crate::query::quote_ident;

/// Open a DuckDB database on disk at `path`, creating the file if it doesn't exist.
pub fn open_disk_db(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("opening DuckDB database {}", path.display()))?;
    Ok(conn)
}

/// Open a DuckDB in‐memory database
pub fn open_mem_db() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory DuckDB")?;
    Ok(conn)
}

/// Close the connection, surfacing any error DuckDB reports on shutdown.
pub fn close(conn: Connection) -> Result<()> {
    conn.close()
        .map_err(|(_, e)| anyhow!(e))
        .context("closing DuckDB connection")
}

/// Map an Arrow DataType into the DuckDB column type used for the table.
///
/// Only the types the CSV reader produces are accepted:
/// - Int64   → BIGINT
/// - Float64 → DOUBLE
/// - Boolean → BOOLEAN
/// - Utf8    → VARCHAR
pub fn duck_type_for(dt: &DataType) -> Result<&'static str> {
    match dt {
        DataType::Int64 => Ok("BIGINT"),
        DataType::Float64 => Ok("DOUBLE"),
        DataType::Boolean => Ok("BOOLEAN"),
        DataType::Utf8 => Ok("VARCHAR"),
        other => bail!("no DuckDB column type for Arrow type {}", other),
    }
}

/// Build the `CREATE OR REPLACE TABLE` statement for `schema`.
pub fn create_table_sql(table: &str, schema: &Schema) -> Result<String> {
    if schema.fields().is_empty() {
        bail!("cannot create table {} without columns", table);
    }
    let columns = schema
        .fields()
        .iter()
        .map(|f| Ok(format!("{} {}", quote_ident(f.name()), duck_type_for(f.data_type())?)))
        .collect::<Result<Vec<_>>>()?;
    Ok(format!(
        "CREATE OR REPLACE TABLE {} ({});",
        quote_ident(table),
        columns.join(", ")
    ))
}

/// Drop any existing `table` and recreate it empty with the columns of `schema`.
pub fn create_or_replace_table(conn: &Connection, table: &str, schema: &Schema) -> Result<()> {
    let sql = create_table_sql(table, schema)?;
    debug!(%sql, "creating table");
    conn.execute_batch(&sql)
        .with_context(|| format!("creating table {}", table))?;
    Ok(())
}

/// Bulk insert `batches` via the Arrow appender, returning the number of rows written.
pub fn append_batches(conn: &Connection, table: &str, batches: &[RecordBatch]) -> Result<u64> {
    let mut appender = conn
        .appender(table)
        .with_context(|| format!("creating appender for {}", table))?;
    let mut rows = 0u64;
    for batch in batches {
        rows += batch.num_rows() as u64;
        appender
            .append_record_batch(batch.clone())
            .with_context(|| format!("appending batch to {}", table))?;
    }
    appender
        .flush()
        .with_context(|| format!("flushing appender for {}", table))?;
    Ok(rows)
}

/// Run `sql` and materialize the whole result set as Arrow batches.
///
/// The schema is returned separately so an empty result still carries its columns.
pub fn query_batches(conn: &Connection, sql: &str) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let mut stmt = conn.prepare(sql).context("preparing query")?;
    let arrow = stmt.query_arrow([]).context("executing query")?;
    let schema = arrow.get_schema();
    let batches: Vec<RecordBatch> = arrow.collect();
    Ok((schema, batches))
}

/// Row count of `table`.
pub fn count_rows(conn: &Connection, table: &str) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
    let n: i64 = conn
        .query_row(&sql, [], |row| row.get(0))
        .with_context(|| format!("counting rows of {}", table))?;
    Ok(n)
}
