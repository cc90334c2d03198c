use std::io::{self, Write};

use serde::Serialize;

use crate::app::{ProgressEvent, ProgressSink, RunSummary};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Console,
    Json,
}

/// Prints progress lines to stdout as they happen.
pub struct ConsoleOutput;

impl ConsoleOutput {
    pub fn print_summary(summary: &RunSummary) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout)?;
        for report in &summary.taxa {
            write!(
                stdout,
                "{:<16} acquired {:>5}/{:<5} fetched {:>4} skipped {:>4} failed {:>4}",
                report.taxon,
                report.acquired,
                report.target,
                report.fetched,
                report.skipped_existing,
                report.failed
            )?;
            if let Some(err) = &report.fetch_error {
                write!(stdout, "  (fetch error: {err})")?;
            }
            writeln!(stdout)?;
        }
        let verb = if summary.dry_run { "planned" } else { "acquired" };
        writeln!(stdout, "total {verb}: {}", summary.total_acquired)?;
        Ok(())
    }
}

impl ProgressSink for ConsoleOutput {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => println!("{} [{:.1}s]", event.message, elapsed.as_secs_f64()),
            None => println!("{}", event.message),
        }
    }
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_summary(summary: &RunSummary) -> io::Result<()> {
        Self::print_json(summary)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}
