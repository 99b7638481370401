use crate::analysis::AnalysisReport;
use colored::Colorize;
use miette::Result;

/// Terminal reporter with colored output
pub struct TerminalReporter;

impl TerminalReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn report(&self, report: &AnalysisReport) -> Result<()> {
        println!();
        for failure in &report.failed_scenes {
            println!(
                "{} {}: {}",
                "skipped".yellow().bold(),
                failure.scene.display(),
                failure.reason.dimmed()
            );
        }

        let cycles = report.cycle_count();
        if cycles > 0 {
            println!(
                "{}",
                format!("{} hierarchy cycle(s) cut short, see log for anchors", cycles).yellow()
            );
        }

        if report.unused.is_empty() {
            println!("{}", "No unused scripts found!".green().bold());
        } else {
            println!(
                "{}",
                format!("Found {} unused scripts:", report.unused.len())
                    .yellow()
                    .bold()
            );
            for script in &report.unused {
                println!("  {} {}", script.relative_path.cyan(), script.guid.dimmed());
            }
        }

        println!();
        self.print_summary(report);
        Ok(())
    }

    fn print_summary(&self, report: &AnalysisReport) {
        println!(
            "{} {} scenes, {} scripts ({} registered, {} used, {} unused)",
            "Summary:".bold(),
            report.scenes_processed(),
            report.scripts_found,
            report.scripts_registered,
            report.used_count().to_string().green(),
            report.unused.len().to_string().red()
        );
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}
