use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::ScanError;
use crate::probe::{Probe, TcpProbe};
use crate::resolver;
use crate::types::{PortResult, ScanRequest, ScanResults, ScanSummary};

/// Suggested default for [`ScanRequest::concurrency`].
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Lifecycle of one scanner instance. A scanner runs exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Constructed, no workers started.
    Idle,
    /// Workers dispatched, results streaming to observers.
    Running,
    /// Every requested port is accounted for; the aggregate is final.
    Completed,
    /// Cancellation was requested: no further ports were dispatched,
    /// in-flight probes finished naturally, and the aggregate holds a valid
    /// partial prefix of the scan.
    Cancelled,
    /// Target resolution failed before any probe ran; the aggregate is
    /// empty.
    Aborted,
}

/// Consumer of streaming scan results.
///
/// `on_result` fires once per completed probe, in completion order, and is
/// never invoked concurrently for one observer. Observers decide their own
/// filtering and rendering.
pub trait Observer: Send {
    fn on_result(&mut self, result: &PortResult);

    /// Fired exactly once, after the scan reaches `Completed` or
    /// `Cancelled`. `summary.no_open_ports()` distinguishes an all-closed
    /// scan from silence.
    fn on_complete(&mut self, summary: &ScanSummary) {
        let _ = summary;
    }
}

/// Shared between workers for the duration of one scan: the single critical
/// section covering "append result + notify observers".
struct Shared {
    results: ScanResults,
    observers: Vec<Box<dyn Observer>>,
}

/// Concurrent TCP port scanner.
///
/// At most [`ScanRequest::concurrency`] connection attempts are in flight at
/// any moment, which keeps file descriptor and ephemeral port consumption
/// bounded on full 1-65535 sweeps and caps worst-case latency near
/// `(ports / concurrency) * timeout`. Result bookkeeping is serialized
/// behind one mutex; the connect attempts themselves run in parallel
/// outside it, so results stream in completion order, not request order.
///
/// Observers must be attached before [`scan`](Self::scan) is called.
/// `scan` holds `&mut self` for its whole run, so mid-scan attachment is a
/// compile error rather than a runtime hazard.
pub struct PortScanner {
    request: ScanRequest,
    probe: Arc<dyn Probe>,
    observers: Vec<Box<dyn Observer>>,
    results: ScanResults,
    cancel: CancellationToken,
    state: ScanState,
}

impl PortScanner {
    /// Scanner over the real TCP transport.
    pub fn new(request: ScanRequest) -> Self {
        Self::with_probe(request, Arc::new(TcpProbe))
    }

    /// Scanner over a caller-supplied transport, e.g. a deterministic fake.
    ///
    /// Port numbers are not pre-validated here; an out-of-range value is a
    /// caller error surfaced by the transport.
    pub fn with_probe(request: ScanRequest, probe: Arc<dyn Probe>) -> Self {
        Self {
            request,
            probe,
            observers: Vec::new(),
            results: ScanResults::default(),
            cancel: CancellationToken::new(),
            state: ScanState::Idle,
        }
    }

    pub fn request(&self) -> &ScanRequest {
        &self.request
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Aggregate of completed probes, in completion order.
    pub fn results(&self) -> &ScanResults {
        &self.results
    }

    /// Token the caller may wire to Ctrl-C or any other interrupt source.
    ///
    /// Cancelling stops new dispatches promptly; probes already in flight
    /// finish naturally and their results are kept.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Attach an observer. Must happen before `scan` starts.
    pub fn subscribe(&mut self, observer: Box<dyn Observer>) {
        self.observers.push(observer);
    }

    /// Run the scan to a terminal state, streaming each result to every
    /// observer as it completes.
    ///
    /// Fails fast on malformed configuration or an unresolvable target;
    /// per-port timeouts and refusals never interrupt the run.
    pub async fn scan(&mut self) -> Result<(), ScanError> {
        if self.state != ScanState::Idle {
            return Err(ScanError::AlreadyStarted);
        }
        if self.request.ports.is_empty() {
            return Err(ScanError::EmptyPortSet);
        }
        if self.request.concurrency == 0 {
            return Err(ScanError::InvalidConcurrency);
        }

        // Resolve once up front. Resolution is target-level, and failing
        // here means no partial results can exist yet.
        let ip = match resolver::resolve(&self.request.target).await {
            Ok(ip) => ip,
            Err(err) => {
                self.state = ScanState::Aborted;
                return Err(err);
            }
        };

        self.state = ScanState::Running;
        debug!(
            host = %self.request.target,
            ports = self.request.ports.len(),
            concurrency = self.request.concurrency,
            "starting scan"
        );

        let shared = Arc::new(Mutex::new(Shared {
            results: ScanResults::default(),
            observers: std::mem::take(&mut self.observers),
        }));
        let sem = Arc::new(Semaphore::new(self.request.concurrency));
        let mut set = JoinSet::new();
        let timeout = self.request.timeout;

        for &port in &self.request.ports {
            if self.cancel.is_cancelled() {
                break;
            }
            let permit = sem
                .clone()
                .acquire_owned()
                .await
                .expect("semaphore stays open for the whole scan");
            let shared = shared.clone();
            let probe = self.probe.clone();
            let cancel = self.cancel.clone();

            set.spawn(async move {
                // Holding the permit through append + notify keeps the next
                // dispatch behind this result's critical section.
                let _permit = permit;

                if cancel.is_cancelled() {
                    return;
                }

                let outcome = probe.probe(SocketAddr::new(ip, port), timeout).await;
                let result = PortResult::new(port, outcome);

                let mut guard = shared.lock().await;
                guard.results.push(result);
                for observer in &mut guard.observers {
                    observer.on_result(&result);
                }
            });
        }

        while set.join_next().await.is_some() {}

        {
            let mut guard = shared.lock().await;
            self.results = std::mem::take(&mut guard.results);
            self.observers = std::mem::take(&mut guard.observers);
        }

        self.state = if self.cancel.is_cancelled() {
            ScanState::Cancelled
        } else {
            ScanState::Completed
        };

        let summary = ScanSummary {
            target: self.request.target.clone(),
            requested: self.request.ports.len(),
            completed: self.results.len(),
            open: self.results.open_count(),
        };
        if summary.no_open_ports() {
            info!(host = %summary.target, "no open ports found");
        }
        for observer in &mut self.observers {
            observer.on_complete(&summary);
        }

        info!(
            host = %summary.target,
            completed = summary.completed,
            open = summary.open,
            state = ?self.state,
            "scan finished"
        );

        Ok(())
    }
}
