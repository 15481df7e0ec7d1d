use anyhow::{Context, Result};
use arrow::{csv::WriterBuilder, record_batch::RecordBatch};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use super::ReportTable;

/// Write `table` to `path` as comma-separated UTF-8 with a header row, overwriting any
/// existing file. Returns the number of data rows written.
pub fn write_csv(path: &Path, table: &ReportTable) -> Result<u64> {
    let file =
        File::create(path).with_context(|| format!("creating report {}", path.display()))?;
    let mut writer = WriterBuilder::new()
        .with_header(true)
        .with_delimiter(b',')
        .build(BufWriter::new(file));

    if table.batches.is_empty() {
        // header only
        writer
            .write(&RecordBatch::new_empty(table.schema.clone()))
            .with_context(|| format!("writing header of {}", path.display()))?;
    }
    for batch in &table.batches {
        writer
            .write(batch)
            .with_context(|| format!("writing rows to {}", path.display()))?;
    }

    writer
        .into_inner()
        .flush()
        .with_context(|| format!("flushing {}", path.display()))?;
    Ok(table.num_rows() as u64)
}
