//! Day-partitioned on-disk record of unexpected server errors.

use std::fmt::Display;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

/// Writes one file per error under `<dir>/<YYYY-MM-DD>/`.
#[derive(Clone, Debug)]
pub struct ErrorLog {
    dir: PathBuf,
}

impl ErrorLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Records `error` raised while serving `route` and returns the file path.
    pub fn record(&self, route: &str, error: &dyn Display) -> io::Result<PathBuf> {
        self.record_at(Utc::now(), route, error)
    }

    fn record_at(
        &self,
        now: DateTime<Utc>,
        route: &str,
        error: &dyn Display,
    ) -> io::Result<PathBuf> {
        let day_dir = self.dir.join(now.format("%Y-%m-%d").to_string());
        fs::create_dir_all(&day_dir)?;

        let file_name = format!("{}.log", now.format("%Y-%m-%dT%H-%M-%S%.6fZ"));
        let path = day_dir.join(file_name);

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(file, "Date: {}", now.to_rfc3339())?;
        writeln!(file, "Route: {route}")?;
        writeln!(file, "Error: {error}")?;
        writeln!(file)?;

        Ok(path)
    }
}
