use agristats::{duck, load, Config};
use anyhow::Result;
use std::{env, path::PathBuf};
use tracing::{info, Level};
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
    info!(
        source = %cfg.source_csv.display(),
        database = %cfg.database.display(),
        table = %cfg.table,
        "loading cleaned data"
    );

    // 2) Open the database; failure here aborts the load
    let conn = duck::open_disk_db(&cfg.database)?;

    // 3) Replace the table with the file contents
    let rows = load::load_file(&conn, &cfg.source_csv, &cfg.table)?;

    duck::close(conn)?;
    info!(
        "✅ cleaned data uploaded to {} ({} rows in table {})",
        cfg.database.display(),
        rows,
        cfg.table
    );
    Ok(())
}
