use anyhow::Result;
use duckdb::Connection;
use std::{io::Write, path::Path};
use tempfile::NamedTempFile;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::{duck, load};

pub const TABLE: &str = "agriculture";

pub const CROP_HEADER: &str = "STATE_NAME,DIST_NAME,YEAR,\
RICE_AREA_(1000_HA),RICE_PRODUCTION_(1000_TONS),RICE_YIELD_(KG_PER_HA),\
WHEAT_AREA_(1000_HA),WHEAT_PRODUCTION_(1000_TONS),WHEAT_YIELD_(KG_PER_HA),\
MAIZE_AREA_(1000_HA),MAIZE_PRODUCTION_(1000_TONS),MAIZE_YIELD_(KG_PER_HA),\
OILSEEDS_AREA_(1000_HA),OILSEEDS_PRODUCTION_(1000_TONS),GROUNDNUT_PRODUCTION_(1000_TONS)";

pub fn init_test_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,agristats=debug")),
        )
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Load `header` + `rows` into a fresh in-memory database as `agriculture`.
pub fn load_rows(header: &str, rows: &[&str]) -> Result<Connection> {
    let mut content = String::from(header);
    content.push('\n');
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    load_text(&content)
}

pub fn load_text(content: &str) -> Result<Connection> {
    let mut tmp = NamedTempFile::new()?;
    tmp.write_all(content.as_bytes())?;
    let conn = duck::open_mem_db()?;
    load::load_file(&conn, tmp.path(), TABLE)?;
    Ok(conn)
}

/// A full crop dataset: `states` states with two districts each, one row per year.
///
/// Production grows with the state index so larger indices rank higher.
pub fn crop_dataset(states: usize, years: std::ops::RangeInclusive<i64>) -> String {
    let mut content = String::from(CROP_HEADER);
    content.push('\n');
    for s in 1..=states {
        for d in 1..=2 {
            for year in years.clone() {
                let t = (year - years.start()) as f64;
                let base = (s * 10 + d) as f64;
                let fields = [
                    base,                 // rice area
                    base * 2.0 + t,       // rice production
                    1000.0 + base + t,    // rice yield
                    base / 2.0,           // wheat area
                    base + t * 0.5,       // wheat production
                    2000.0 + base * t,    // wheat yield
                    base / 4.0,           // maize area
                    base / 3.0,           // maize production
                    1500.0 + t * 10.0,    // maize yield
                    base * 1.5,           // oilseeds area
                    base + t,             // oilseeds production
                    base / 5.0 + t,       // groundnut production
                ];
                let values: Vec<String> = fields.iter().map(|v| format!("{:.2}", v)).collect();
                content.push_str(&format!("S{},S{}-D{},{},{}\n", s, s, d, year, values.join(",")));
            }
        }
    }
    content
}

/// Parse an exported report into its header and rows.
pub fn read_report(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut rdr = csv::Reader::from_path(path)?;
    let headers = rdr.headers()?.iter().map(str::to_string).collect();
    let rows = rdr
        .records()
        .map(|r| r.map(|rec| rec.iter().map(str::to_string).collect()))
        .collect::<Result<Vec<Vec<String>>, _>>()?;
    Ok((headers, rows))
}
