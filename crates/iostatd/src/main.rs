//! iostatd - disk I/O statistics subagent.
//!
//! Samples `iostat -xkd` in the background and serves the latest device table
//! as an OID tree through GET/GETNEXT.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::process;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use iostat_core::agent::{
    self, Handler, LocalSession, Oid, Response, Session, TreeResponder, VarBind,
};
use iostat_core::collector::{IostatCollector, SystemCommand};
use iostat_core::config::DEFAULT_ROOT;
use iostat_core::sampler::Sampler;
use iostat_core::storage::StatsCache;
use iostat_core::AgentConfig;

/// Disk I/O statistics subagent.
#[derive(Parser)]
#[command(name = "iostatd", about = "Disk I/O statistics SNMP subagent", version = iostat_core::VERSION)]
struct Args {
    /// Root OID the device table is served under.
    #[arg(long, default_value = DEFAULT_ROOT, env = "IOSTATD_ROOT", global = true)]
    root: Oid,

    /// Seconds each iostat measurement covers.
    #[arg(long, default_value = "5", env = "IOSTATD_SAMPLE_WINDOW", global = true)]
    sample_window: u64,

    /// Seconds between measurements.
    #[arg(long, default_value = "10", env = "IOSTATD_REPEAT_INTERVAL", global = true)]
    repeat_interval: u64,

    /// Seconds after which unrefreshed data is no longer served.
    #[arg(long, default_value = "60", env = "IOSTATD_MAX_AGE", global = true)]
    max_age: u64,

    /// Path to the iostat binary.
    #[arg(long, default_value = "iostat", env = "IOSTATD_IOSTAT", global = true)]
    iostat: String,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Command {
    /// Sample continuously and serve queries until interrupted (default).
    Run,
    /// Sample once and print every exposed OID.
    Walk,
    /// Sample once and print a single OID.
    Get {
        /// OID to look up.
        oid: Oid,
    },
    /// Sample once and print the parsed devices as JSON.
    Snapshot,
}

impl Args {
    fn config(&self) -> AgentConfig {
        AgentConfig {
            root: self.root.clone(),
            sample_window: Duration::from_secs(self.sample_window),
            repeat_interval: Duration::from_secs(self.repeat_interval),
            max_age: Duration::from_secs(self.max_age),
            program: self.iostat.clone(),
            ..AgentConfig::default()
        }
    }
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is INFO. Use -q for quiet mode (errors only).
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["iostatd", "iostat_core"] {
        match format!("{}={}", target, level).parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => eprintln!("invalid log directive for {}: {}", target, e),
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Renders one line of `walk`/`get` output.
fn format_response(requested: &Oid, response: &Response) -> String {
    match response {
        Response::Found(vb) => vb.to_string(),
        Response::NoSuchObject => format!("{} = No Such Object available on this agent", requested),
    }
}

/// Summarizes the tree for the periodic status line.
fn describe_tree(entries: &[VarBind], root: &Oid) -> String {
    let devices = entries
        .iter()
        .filter(|vb| vb.oid.as_slice().get(root.len()) == Some(&1))
        .count();
    format!("{} devices, {} objects", devices, entries.len())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let config = args.config();
    if let Err(e) = config.validate() {
        error!("invalid configuration: {}", e);
        process::exit(1);
    }
    if config.window_overlaps_interval() {
        warn!(
            sample_window = args.sample_window,
            repeat_interval = args.repeat_interval,
            "sample window is not shorter than the repeat interval, cycles will be skipped"
        );
    }

    let cache = StatsCache::new();
    let collector = IostatCollector::new(
        SystemCommand::new(),
        config.program.clone(),
        config.sample_window,
    );
    let sampler = Sampler::new(collector, cache.clone());
    let responder = Arc::new(TreeResponder::from_config(cache, &config));

    let result = match args.command.clone().unwrap_or(Command::Run) {
        Command::Run => run(sampler, responder, &config),
        Command::Walk => sample_then(&sampler, || print_walk(&responder)),
        Command::Get { oid } => sample_then(&sampler, || get(&responder, &oid)),
        Command::Snapshot => sample_then(&sampler, || snapshot(&sampler)),
    };

    if let Err(e) = result {
        error!("{}", e);
        process::exit(1);
    }
}

/// Runs one measurement synchronously, then `then`.
fn sample_then(
    sampler: &Sampler<SystemCommand>,
    then: impl FnOnce() -> Result<(), String>,
) -> Result<(), String> {
    info!("sampling once, this takes about one sample window");
    let devices = sampler
        .sample_once()
        .map_err(|e| format!("sampling failed: {}", e))?;
    debug!(devices, "sample complete");
    then()
}

fn print_walk(responder: &TreeResponder) -> Result<(), String> {
    for vb in responder.walk() {
        println!("{}", vb);
    }
    Ok(())
}

fn get(responder: &Arc<TreeResponder>, oid: &Oid) -> Result<(), String> {
    let session = register(responder)?;
    println!("{}", format_response(oid, &session.get(oid)));
    Ok(())
}

fn snapshot(sampler: &Sampler<SystemCommand>) -> Result<(), String> {
    let stats = sampler.cache().read();
    let json = serde_json::to_string_pretty(&*stats.devices)
        .map_err(|e| format!("failed to serialize snapshot: {}", e))?;
    println!("{}", json);
    Ok(())
}

fn register(responder: &Arc<TreeResponder>) -> Result<LocalSession, String> {
    let mut session = LocalSession::new();
    let handler: Arc<dyn Handler> = responder.clone();
    session
        .register(responder.root(), handler)
        .map_err(|e| e.to_string())?;
    Ok(session)
}

fn run(
    sampler: Sampler<SystemCommand>,
    responder: Arc<TreeResponder>,
    config: &AgentConfig,
) -> Result<(), String> {
    info!("iostatd {} starting", iostat_core::VERSION);
    info!(
        root = %config.root,
        sample_window_secs = config.sample_window.as_secs(),
        repeat_interval_secs = config.repeat_interval.as_secs(),
        max_age_secs = config.max_age.as_secs(),
        "config"
    );

    let session = register(&responder)?;
    info!(root = %config.root, "successfully registered");

    let handle = sampler
        .spawn(config.repeat_interval)
        .map_err(|e| format!("failed to start stats loader: {}", e))?;

    let (tx, rx) = mpsc::channel();
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = tx.send(());
    }) {
        warn!("Failed to set signal handler: {}", e);
    }

    loop {
        match rx.recv_timeout(config.repeat_interval) {
            Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
            Err(mpsc::RecvTimeoutError::Timeout) => {}
        }

        let entries = agent::walk(&session, &config.root);

        if entries.is_empty() {
            warn!("no data to serve, stats are stale or not collected yet");
        } else {
            info!("serving {}", describe_tree(&entries, &config.root));
        }
    }

    info!("Received shutdown signal");
    if handle.join().is_err() {
        error!("stats loader thread panicked");
    }
    info!("Shutdown complete");
    Ok(())
}
