// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

/// A literal-SQL report appended after the built-in catalogue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomReport {
    pub name: String,
    pub sql: String,
}

/// Runtime settings shared by the loader and the reporter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// DuckDB database file
    pub database: PathBuf,
    /// Table the dataset is loaded into and the reports read from
    pub table: String,
    /// Cleaned dataset to load
    pub source_csv: PathBuf,
    /// Directory the report CSVs are written to
    pub output_dir: PathBuf,
    pub reports: Vec<CustomReport>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from("agri_data.duckdb"),
            table: "agriculture".to_string(),
            source_csv: PathBuf::from("Cleaned_AgriData.csv"),
            output_dir: PathBuf::from("reports"),
            reports: Vec::new(),
        }
    }
}

impl Config {
    /// Parse a YAML config file. Missing fields fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_yaml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Defaults, then the optional file, then `AGRI_*` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        cfg.apply_overrides(|key| env::var(key).ok());
        Ok(cfg)
    }

    /// Apply overrides from `lookup` (the process environment outside tests).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("AGRI_DATABASE") {
            self.database = PathBuf::from(v);
        }
        if let Some(v) = lookup("AGRI_TABLE") {
            self.table = v;
        }
        if let Some(v) = lookup("AGRI_SOURCE_CSV") {
            self.source_csv = PathBuf::from(v);
        }
        if let Some(v) = lookup("AGRI_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
    }
}
