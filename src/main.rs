use std::path::PathBuf;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use portprobe::output::{FileOutput, JsonOutput, ScreenOutput};
use portprobe::ports;
use portprobe::scanner::{PortScanner, ScanState, DEFAULT_CONCURRENCY};
use portprobe::types::ScanRequest;

/// portprobe — concurrent TCP port reachability prober.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "portprobe",
    version,
    about = "Scan any number of TCP ports on a target machine.",
    long_about = None
)]
struct Cli {
    /// Target machine to scan (hostname or address).
    target: String,

    /// Scan all 65535 TCP ports.
    #[arg(short = 'a', long, conflicts_with_all = ["ports", "file"])]
    all: bool,

    /// Ports to scan: comma separated, dash for ranges ("22,80,8000-8010").
    #[arg(short = 'p', long)]
    ports: Option<String>,

    /// File with ports to scan, one port or range per line.
    #[arg(short = 'f', long, conflicts_with = "ports")]
    file: Option<PathBuf>,

    /// Socket connect timeout in seconds.
    #[arg(short = 't', long, default_value_t = 3.0)]
    timeout: f64,

    /// Max concurrent connection attempts.
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Write a text report of the scan to this path.
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Write the results as pretty JSON to this path.
    #[arg(long)]
    json: Option<PathBuf>,

    /// Only report open ports on the console.
    #[arg(long, default_value_t = false)]
    open_only: bool,
}

impl Cli {
    fn expand_ports(&self) -> Result<Vec<u16>> {
        if self.all {
            return Ok(ports::all_ports());
        }
        if let Some(path) = &self.file {
            return ports::load_ports_from_path(path);
        }
        let spec = self
            .ports
            .as_deref()
            .context("specify ports with --all, --ports or --file")?;
        ports::parse_port_spec(spec)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    ensure!(cli.timeout > 0.0, "timeout must be positive");
    let ports = cli.expand_ports()?;

    let request = ScanRequest {
        target: cli.target.clone(),
        ports,
        timeout: Duration::from_secs_f64(cli.timeout),
        concurrency: cli.concurrency,
    };

    let mut scanner = PortScanner::new(request);
    scanner.subscribe(Box::new(ScreenOutput::new(&cli.target, cli.open_only)));
    if let Some(path) = &cli.output {
        let sink = FileOutput::create(path, &cli.target)
            .with_context(|| format!("failed to open output file {}", path.display()))?;
        scanner.subscribe(Box::new(sink));
    }
    if let Some(path) = &cli.json {
        scanner.subscribe(Box::new(JsonOutput::new(path)));
    }

    // Ctrl-C requests cooperative cancellation: the engine stops dispatching
    // and lets in-flight probes finish.
    let cancel = scanner.cancellation_token();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        cancel.cancel();
    });

    scanner.scan().await?;

    if scanner.state() == ScanState::Cancelled {
        println!(
            "\n[-] Scan cancelled; {} of {} ports probed",
            scanner.results().len(),
            scanner.request().ports.len()
        );
    }

    Ok(())
}
