use std::io::{self, Write};
use std::path::PathBuf;

use strider::{AnalyzeOptions, FileAnalysis, ReportConfig, analyze_files, write_reports};
use tracing::error;

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS};
use crate::terminal;

/// Replay access logs and print a report per tracked variable.
pub fn cmd_analyze(logs: &[PathBuf], jobs: usize, config: &ReportConfig, quiet: bool) -> i32 {
    let options = AnalyzeOptions::default().with_jobs(jobs);
    let results = match analyze_files(logs, &options) {
        Ok(results) => results,
        Err(e) => {
            error!("{e}");
            return EXIT_FAILURE;
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut failed = 0usize;
    let mut variables = 0usize;

    for (path, result) in logs.iter().zip(results) {
        match result {
            Ok(analysis) => {
                if !quiet && logs.len() > 1 {
                    terminal::header(&format!("==> {}", path.display()));
                }
                if let Err(e) = print_analysis(&mut out, &analysis, config, quiet) {
                    terminal::failure(&format!("{}: {e}", path.display()));
                    failed += 1;
                    continue;
                }
                variables += analysis.records.len();
            }
            Err(e) => {
                terminal::failure(&format!("{}: {e}", path.display()));
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return EXIT_FAILURE;
    }
    if !quiet {
        terminal::success(&format!(
            "{variables} variable(s) analyzed from {} log(s)",
            logs.len()
        ));
    }
    EXIT_SUCCESS
}

fn print_analysis<W: Write>(
    out: &mut W,
    analysis: &FileAnalysis,
    config: &ReportConfig,
    quiet: bool,
) -> strider::Result<()> {
    write_reports(out, &analysis.records, config)?;
    out.flush()?;

    if !quiet {
        for record in &analysis.records {
            let dropped = record.strides().dropped();
            if dropped > 0 {
                terminal::warning(&format!(
                    "{}: stride table full, {dropped} occurrence(s) dropped",
                    record.label()
                ));
            }
        }
    }
    Ok(())
}
