pub mod config;
pub mod duck;
pub mod load;
pub mod query;
pub mod report;

pub use config::Config;
pub use load::{load_file, read_csv, write_table, Dataset};
pub use report::{catalog, log_outcomes, run_reports, Report, ReportOutcome, ReportQuery};
