use crate::analysis::UnusedScript;
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

pub const CSV_HEADER: [&str; 2] = ["Relative Path", "GUID"];

/// One row of the unused-script summary
#[derive(Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "Relative Path")]
    relative_path: &'a str,
    #[serde(rename = "GUID")]
    guid: &'a str,
}

/// Writes the unused-script summary as CSV
pub struct CsvReporter {
    output_path: PathBuf,
}

impl CsvReporter {
    pub fn new(output_path: PathBuf) -> Self {
        Self { output_path }
    }

    pub fn report(&self, unused: &[UnusedScript]) -> Result<()> {
        let file = std::fs::File::create(&self.output_path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to create {}", self.output_path.display()))?;
        write_csv(file, unused)
            .wrap_err_with(|| format!("Failed to write {}", self.output_path.display()))
    }
}

/// Header line plus one row per script
pub fn render_csv(unused: &[UnusedScript]) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, unused)?;
    String::from_utf8(buffer).into_diagnostic()
}

fn write_csv<W: Write>(out: W, unused: &[UnusedScript]) -> Result<()> {
    // The header is written by hand so an empty summary still carries it
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out);

    writer.write_record(CSV_HEADER).into_diagnostic()?;
    for script in unused {
        writer
            .serialize(CsvRow {
                relative_path: &script.relative_path,
                guid: &script.guid,
            })
            .into_diagnostic()?;
    }
    writer.flush().into_diagnostic()
}
