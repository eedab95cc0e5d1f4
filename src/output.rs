use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::warn;

use crate::scanner::Observer;
use crate::types::{PortResult, ScanSummary};

/// Console sink. Prints each result as it arrives; with `open_only` set,
/// only ports that accepted the connection are shown.
pub struct ScreenOutput {
    open_only: bool,
}

impl ScreenOutput {
    pub fn new(target: &str, open_only: bool) -> Self {
        println!("[+] Starting scan on {target}\n");
        Self { open_only }
    }
}

impl Observer for ScreenOutput {
    fn on_result(&mut self, result: &PortResult) {
        if self.open_only && !result.outcome.is_open() {
            return;
        }
        println!("{result}");
    }

    fn on_complete(&mut self, summary: &ScanSummary) {
        if summary.no_open_ports() {
            println!("\n[-] No open ports were found on {}", summary.target);
        }
    }
}

/// File sink. Writes the scan report in arrival order: a header line, a
/// blank line, then one indented line per result.
///
/// Opening the file is the caller's problem; write failures while the scan
/// streams are logged and swallowed so a bad disk never interrupts probing.
pub struct FileOutput {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileOutput {
    /// Create (or truncate) the report file and write its header.
    pub fn create(path: impl AsRef<Path>, target: &str) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut writer = BufWriter::new(File::create(&path)?);
        writeln!(writer, "[+] Results of scan on {target}")?;
        writeln!(writer)?;
        Ok(Self { path, writer })
    }
}

impl Observer for FileOutput {
    fn on_result(&mut self, result: &PortResult) {
        if let Err(err) = writeln!(self.writer, "    {result}") {
            warn!(path = %self.path.display(), %err, "failed to write scan result");
        }
    }

    fn on_complete(&mut self, summary: &ScanSummary) {
        if summary.no_open_ports() {
            if let Err(err) = writeln!(
                self.writer,
                "[-] No open ports were found on {}",
                summary.target
            ) {
                warn!(path = %self.path.display(), %err, "failed to write scan summary");
            }
        }
        if let Err(err) = self.writer.flush() {
            warn!(path = %self.path.display(), %err, "failed to flush scan report");
            return;
        }
        println!(
            "\n[+] Scan results successfully written to {}",
            self.path.display()
        );
    }
}

/// JSON report sink. Buffers results as they stream and writes one pretty
/// JSON document when the scan reaches its terminal state.
pub struct JsonOutput {
    path: PathBuf,
    results: Vec<PortResult>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    target: &'a str,
    completed: usize,
    open: usize,
    results: &'a [PortResult],
}

impl JsonOutput {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            results: Vec::new(),
        }
    }
}

impl Observer for JsonOutput {
    fn on_result(&mut self, result: &PortResult) {
        self.results.push(*result);
    }

    fn on_complete(&mut self, summary: &ScanSummary) {
        let report = JsonReport {
            target: &summary.target,
            completed: summary.completed,
            open: summary.open,
            results: &self.results,
        };
        let file = match File::create(&self.path) {
            Ok(file) => file,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "failed to create JSON report");
                return;
            }
        };
        if let Err(err) = serde_json::to_writer_pretty(file, &report) {
            warn!(path = %self.path.display(), %err, "failed to write JSON report");
        }
    }
}
