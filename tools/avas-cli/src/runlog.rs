//! Per-run CSV log.
//!
//! Every conversion run accumulates its progress lines and writes them out as
//! `Output/log/log_<timestamp>.csv`. Lines use ` | ` between columns while the
//! run is in flight; the separator becomes a CSV column break on save.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use avas_image::{LOG_FOLDER, OUTPUT_FOLDER};

#[derive(Debug, Default)]
pub struct RunLog {
    lines: Vec<String>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Write the accumulated lines under `<base>/Output/log/`.
    ///
    /// Returns the path of the log file. One CSV row per line, columns split
    /// on `|` with surrounding whitespace trimmed.
    pub fn save(&self, output_base: &Path) -> Result<PathBuf> {
        let dir = output_base.join(OUTPUT_FOLDER).join(LOG_FOLDER);
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create log folder {}", dir.display()))?;

        let name = format!("log_{}.csv", Local::now().format("%Y%m%d_%H%M%S"));
        let path = dir.join(name);

        let mut out = String::new();
        for line in &self.lines {
            let row: Vec<String> = line.split('|').map(|col| csv_field(col.trim())).collect();
            out.push_str(&row.join(","));
            out.push('\n');
        }
        fs::write(&path, out)
            .with_context(|| format!("failed to write run log {}", path.display()))?;
        Ok(path)
    }
}

/// Quote a CSV field when it contains a separator, quote or newline.
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
