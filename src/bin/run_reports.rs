use agristats::{catalog, duck, log_outcomes, run_reports, Config, Report};
use anyhow::Result;
use std::{env, path::PathBuf};
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // Initialize tracing
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(log_level.parse().unwrap_or(Level::INFO.into())),
        )
        .init();

    // 1) Configuration: optional YAML path, then AGRI_* overrides
    let config_path = env::args().nth(1).map(PathBuf::from);
    let cfg = Config::load(config_path.as_deref())?;

    // 2) One connection for the whole run; failing to open it is fatal
    let conn = duck::open_disk_db(&cfg.database)?;
    info!("✅ database connection successful: {}", cfg.database.display());

    // 3) Built-in catalogue first, then any configured extras
    let mut reports = catalog();
    reports.extend(cfg.reports.iter().map(Report::from));

    // 4) Run everything, then report per-item status
    let outcomes = run_reports(&conn, &cfg.table, &reports, &cfg.output_dir);
    let (exported, failed) = log_outcomes(&outcomes);

    // 5) Release the connection once, after every report was attempted
    duck::close(conn)?;

    if failed > 0 {
        warn!("{} of {} reports failed", failed, outcomes.len());
    }
    info!(
        "✅ all SQL analyses complete: {} CSV files saved to {}",
        exported,
        cfg.output_dir.display()
    );
    Ok(())
}
