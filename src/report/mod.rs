// src/report/mod.rs

pub mod catalog;
pub mod export;

#[cfg(test)]
mod testutil;

pub use catalog::catalog;

use anyhow::{Context, Result};
use arrow::{datatypes::SchemaRef, record_batch::RecordBatch};
use duckdb::Connection;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::{debug, error, info, warn};

use crate::config::CustomReport;
use crate::duck;
use crate::query::AggregateQuery;

/// What a report runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportQuery {
    Aggregate(AggregateQuery),
    /// Literal SQL, run as given.
    Sql(String),
}

impl ReportQuery {
    pub fn sql(&self, table: &str) -> String {
        match self {
            ReportQuery::Aggregate(q) => q.render(table),
            ReportQuery::Sql(sql) => sql.clone(),
        }
    }
}

/// One named query whose result is exported as `<name>` in the output directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub name: String,
    pub query: ReportQuery,
}

impl Report {
    pub fn aggregate(name: impl Into<String>, query: AggregateQuery) -> Self {
        Self {
            name: name.into(),
            query: ReportQuery::Aggregate(query),
        }
    }

    pub fn sql(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            query: ReportQuery::Sql(sql.into()),
        }
    }
}

impl From<&CustomReport> for Report {
    fn from(c: &CustomReport) -> Self {
        Report::sql(c.name.clone(), c.sql.clone())
    }
}

/// A fully materialized result set.
#[derive(Debug, Clone)]
pub struct ReportTable {
    pub schema: SchemaRef,
    pub batches: Vec<RecordBatch>,
}

impl ReportTable {
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(|b| b.num_rows()).sum()
    }
}

/// Result of one report attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    Exported {
        name: String,
        path: PathBuf,
        rows: u64,
    },
    Failed {
        name: String,
        error: String,
    },
}

impl ReportOutcome {
    pub fn name(&self) -> &str {
        match self {
            ReportOutcome::Exported { name, .. } | ReportOutcome::Failed { name, .. } => name,
        }
    }

    pub fn is_exported(&self) -> bool {
        matches!(self, ReportOutcome::Exported { .. })
    }
}

/// Run a single report against `table`.
pub fn execute(conn: &Connection, table: &str, report: &Report) -> Result<ReportTable> {
    let sql = report.query.sql(table);
    debug!(report = %report.name, %sql, "executing");
    let (schema, batches) = duck::query_batches(conn, &sql)
        .with_context(|| format!("running query for {}", report.name))?;
    Ok(ReportTable { schema, batches })
}

fn run_one(
    conn: &Connection,
    table: &str,
    report: &Report,
    output_dir: &Path,
) -> Result<(PathBuf, u64)> {
    let result = execute(conn, table, report)?;
    let path = output_dir.join(&report.name);
    let rows = export::write_csv(&path, &result)?;
    Ok((path, rows))
}

/// Run every report in order. A failing report never stops the ones after it.
pub fn run_reports(
    conn: &Connection,
    table: &str,
    reports: &[Report],
    output_dir: &Path,
) -> Vec<ReportOutcome> {
    if let Err(e) = fs::create_dir_all(output_dir) {
        warn!("could not create {}: {}", output_dir.display(), e);
    }

    reports
        .iter()
        .map(|report| {
            info!("📌 executing {}", report.name);
            let start = Instant::now();
            let outcome = match run_one(conn, table, report, output_dir) {
                Ok((path, rows)) => ReportOutcome::Exported {
                    name: report.name.clone(),
                    path,
                    rows,
                },
                Err(e) => ReportOutcome::Failed {
                    name: report.name.clone(),
                    error: format!("{:#}", e),
                },
            };
            debug!(report = %report.name, elapsed = ?start.elapsed(), "finished");
            outcome
        })
        .collect()
}

/// Log each outcome and return the (exported, failed) counts.
pub fn log_outcomes(outcomes: &[ReportOutcome]) -> (usize, usize) {
    let mut exported = 0;
    let mut failed = 0;
    for outcome in outcomes {
        match outcome {
            ReportOutcome::Exported { name, path, rows } => {
                exported += 1;
                info!(rows, path = %path.display(), "✅ saved {}", name);
            }
            ReportOutcome::Failed { name, error } => {
                failed += 1;
                error!("❌ error executing query for {}: {}", name, error);
            }
        }
    }
    (exported, failed)
}
