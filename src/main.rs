//! Crowd Density Emitter CLI
//!
//! Posts synthetic crowd density readings to the crowdscan ingest API.

use clap::{Parser, Subcommand};
use crowd_density_emitter::{
    client::{BlockingCrowdDataClient, ClientConfig},
    config::Config,
    core::DensityGenerator,
    emitter::{interrupt, Emitter, Interrupt, RunOptions, INTERRUPT_EXIT_CODE},
    gates::catalog,
    stats::{create_shared_stats, SharedEmitterStats},
    VERSION,
};
use std::io::IsTerminal;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "crowd-emitter")]
#[command(version = VERSION)]
#[command(about = "Synthetic crowd density feed for crowdscan", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Post readings for every gate, every interval (default)
    Run {
        /// Ingest endpoint URL (overrides config)
        #[arg(long)]
        endpoint: Option<String>,

        /// Seconds between cycles (overrides config)
        #[arg(long)]
        interval: Option<u64>,

        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,
    },

    /// List monitored locations and gates
    Gates,

    /// Show configuration
    Config {
        /// Write the default configuration to the config path
        #[arg(long)]
        write_default: bool,
    },

    /// Run a local ingest API stand-in
    #[cfg(feature = "sink")]
    Sink {
        /// Port to listen on
        #[arg(long, default_value = "5000")]
        port: u16,

        /// Answer every ingest with this status instead of storing it
        #[arg(long)]
        respond_with: Option<u16>,
    },
}

fn main() {
    init_tracing();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run {
        endpoint: None,
        interval: None,
        once: false,
    }) {
        Commands::Run {
            endpoint,
            interval,
            once,
        } => {
            cmd_run(endpoint, interval, once);
        }
        Commands::Gates => {
            cmd_gates();
        }
        Commands::Config { write_default } => {
            cmd_config(write_default);
        }
        #[cfg(feature = "sink")]
        Commands::Sink { port, respond_with } => {
            cmd_sink(port, respond_with);
        }
    }
}

/// Log to stderr so stdout carries only the per-request lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_run(endpoint: Option<String>, interval: Option<u64>, once: bool) {
    let mut config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config from {:?}: {e}", Config::config_path());
            std::process::exit(1);
        }
    };
    if let Some(endpoint) = endpoint {
        config.endpoint = endpoint;
    }
    if let Some(secs) = interval {
        config.interval = Duration::from_secs(secs);
    }
    if let Err(e) = config.validate() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let client = match BlockingCrowdDataClient::new(ClientConfig::from(&config)) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!("Crowd Density Emitter v{VERSION}");
    tracing::info!(endpoint = client.endpoint(), "posting readings");
    tracing::info!(emitter_id = client.emitter_id(), "emitter identity");
    tracing::info!(
        interval_secs = config.interval.as_secs(),
        density_min = config.density_min,
        density_max = config.density_max,
        "cycle settings"
    );

    let generator = DensityGenerator::new(config.density_min, config.density_max);
    let mut emitter = Emitter::new(client, generator);
    tracing::info!(gates = emitter.gates().len(), "Press Ctrl+C to stop");

    let stats = create_shared_stats();
    ctrlc_handler(emitter.stop_handle(), Arc::clone(&stats));

    let options = RunOptions {
        interval: config.interval,
        max_cycles: once.then_some(1),
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    emitter.run(&mut out, &options, &stats);

    eprintln!();
    eprintln!("{}", stats.summary());
}

fn cmd_gates() {
    for location in catalog() {
        println!(
            "{} ({}, {}):",
            location.location_name, location.location_id, location.location_type
        );
        for gate in location.gates {
            println!(
                "  - {}: {} ({}, {})",
                gate.gate_id, gate.name, gate.coordinates.lat, gate.coordinates.lng
            );
        }
    }
}

fn cmd_config(write_default: bool) {
    if write_default {
        if let Err(e) = Config::default().save() {
            eprintln!("Error saving config: {e}");
            std::process::exit(1);
        }
        println!("Wrote default configuration.");
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            std::process::exit(1);
        }
    };

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}

#[cfg(feature = "sink")]
fn cmd_sink(port: u16, respond_with: Option<u16>) {
    use crowd_density_emitter::sink::{run, SinkConfig};

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error creating runtime: {e}");
            std::process::exit(1);
        }
    };

    let config = SinkConfig { port, respond_with };
    let result = runtime.block_on(async {
        let (addr, shutdown_tx) = run(config).await?;
        println!("Ingest sink on http://{addr}/api/crowd-data");
        println!("Press Ctrl+C to stop");

        tokio::signal::ctrl_c().await?;
        let _ = shutdown_tx.send(());
        anyhow::Ok(())
    });

    if let Err(e) = result {
        eprintln!("Sink error: {e}");
        std::process::exit(1);
    }
}

/// Set up Ctrl+C handler.
///
/// The first interrupt stops the loop once the in-flight request returns; a
/// second one exits immediately, so a hung endpoint cannot hold the process.
fn ctrlc_handler(running: Arc<AtomicBool>, stats: SharedEmitterStats) {
    if let Err(e) = ctrlc::set_handler(move || match interrupt(&running) {
        Interrupt::Stop => {
            eprintln!();
            eprintln!("Stopping after the current request (Ctrl+C again to exit now)");
        }
        Interrupt::Exit => {
            eprintln!();
            eprintln!("{}", stats.summary());
            std::process::exit(INTERRUPT_EXIT_CODE);
        }
    }) {
        tracing::warn!(error = %e, "could not install Ctrl+C handler");
    }
}
