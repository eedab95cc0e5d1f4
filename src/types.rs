use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Classification of one completed connection attempt.
///
/// Every probe terminates in exactly one of these; resolution failures are
/// scan-level aborts, not per-port outcomes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortOutcome {
    Open,
    TimedOut,
    Refused,
}

impl PortOutcome {
    /// Label used by the render contract (`"Port <n> : <label>"`).
    /// Observers and tests depend on this exact text.
    pub fn label(&self) -> &'static str {
        match self {
            PortOutcome::Open => "Open",
            PortOutcome::TimedOut => "Closed | Timeout",
            PortOutcome::Refused => "Closed | ConnectionRefused",
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, PortOutcome::Open)
    }
}

impl fmt::Display for PortOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One probed port and how its connection attempt ended.
///
/// Created once by the worker that finished the probe, never mutated.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortResult {
    pub port: u16,
    pub outcome: PortOutcome,
}

impl PortResult {
    pub fn new(port: u16, outcome: PortOutcome) -> Self {
        Self { port, outcome }
    }
}

impl fmt::Display for PortResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Port {} : {}", self.port, self.outcome)
    }
}

/// Append-only aggregate of completed probe results, in completion order.
///
/// Only the engine's completion path appends; observers and callers read
/// through the accessors. A scan is complete when `len()` matches the
/// number of requested ports.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ScanResults {
    entries: Vec<PortResult>,
}

impl ScanResults {
    pub(crate) fn push(&mut self, result: PortResult) {
        self.entries.push(result);
    }

    pub fn entries(&self) -> &[PortResult] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn open_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.outcome.is_open())
            .count()
    }
}

/// Immutable configuration for one scan run.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    /// Hostname or address to scan; resolved once before dispatch.
    pub target: String,
    /// Ports to probe, in dispatch order. Duplicates are allowed and simply
    /// produce duplicate results.
    pub ports: Vec<u16>,
    /// Per-connection timeout ceiling.
    pub timeout: Duration,
    /// Maximum number of connection attempts in flight at once.
    pub concurrency: usize,
}

/// Snapshot handed to observers exactly once when a scan reaches a terminal
/// state.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ScanSummary {
    pub target: String,
    /// Ports requested for the scan.
    pub requested: usize,
    /// Probes that actually completed; less than `requested` after a
    /// cancellation.
    pub completed: usize,
    /// Completed probes classified `Open`.
    pub open: usize,
}

impl ScanSummary {
    /// The "no open ports found" signal: every completed probe was closed.
    pub fn no_open_ports(&self) -> bool {
        self.open == 0
    }
}
