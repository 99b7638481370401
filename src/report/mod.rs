mod csv;
mod json;
mod terminal;

pub use self::csv::{render_csv, CsvReporter, CSV_HEADER};
pub use json::JsonReporter;
pub use terminal::TerminalReporter;

use crate::analysis::AnalysisReport;
use miette::Result;
use std::path::{Path, PathBuf};

/// Writes the results of a run: always the CSV summary, optionally a JSON
/// report, and a terminal summary unless quiet
pub struct Reporter {
    csv_path: PathBuf,
    json_path: Option<PathBuf>,
    terminal: bool,
}

impl Reporter {
    pub fn new(output_dir: &Path, csv_name: &str) -> Self {
        Self {
            csv_path: output_dir.join(csv_name),
            json_path: None,
            terminal: true,
        }
    }

    pub fn with_json(mut self, json_path: Option<PathBuf>) -> Self {
        self.json_path = json_path;
        self
    }

    pub fn with_terminal(mut self, terminal: bool) -> Self {
        self.terminal = terminal;
        self
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    pub fn report(&self, report: &AnalysisReport, project_root: &Path) -> Result<()> {
        CsvReporter::new(self.csv_path.clone()).report(&report.unused)?;

        if let Some(json_path) = &self.json_path {
            JsonReporter::new(json_path.clone(), project_root).report(report)?;
        }

        if self.terminal {
            TerminalReporter::new().report(report)?;
        }

        Ok(())
    }
}
