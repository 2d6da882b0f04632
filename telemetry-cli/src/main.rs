//! CAN Telemetry CLI Application
//!
//! Front end for the telemetry-decoder library:
//! - `convert`: offline pipeline, frame log + DBC in, series artifact out
//! - `listen`: live pipeline, JSON-over-UDP in, console subscribers out
//!
//! Both modes can also be driven from a TOML config file.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use telemetry_decoder::live;
use telemetry_decoder::pipeline;
use telemetry_decoder::{DatagramListener, SignalRouter};

mod config;
mod sink;

use sink::ConsoleSink;

/// CAN Telemetry - decode recordings and route live telemetry
#[derive(Parser, Debug)]
#[command(name = "telemetry-cli")]
#[command(about = "Decode CAN frame logs and route live telemetry values", long_about = None)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to a TOML configuration file instead of a subcommand
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a frame log into a per-signal series artifact
    Convert {
        /// JSON-lines frame log to decode
        #[arg(short, long, value_name = "FILE")]
        log: PathBuf,

        /// DBC file with the message definitions
        #[arg(short, long, value_name = "FILE")]
        dbc: PathBuf,

        /// Output artifact path
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Receive live telemetry datagrams and print routed values
    Listen {
        /// Local address to bind
        #[arg(short, long, default_value = "127.0.0.1:6000")]
        addr: String,

        /// Signal name to subscribe to (can be repeated)
        #[arg(short, long = "signal", value_name = "NAME")]
        signals: Vec<String>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    log::info!("CAN Telemetry CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", telemetry_decoder::VERSION);

    match (&args.command, &args.config) {
        (Some(Command::Convert { log, dbc, output }), _) => run_convert(log, dbc, output),
        (Some(Command::Listen { addr, signals }), _) => {
            let subscribers = signals
                .iter()
                .map(|name| config::SubscriberConfig {
                    signal: name.clone(),
                    label: None,
                    min: None,
                    max: None,
                })
                .collect::<Vec<_>>();
            run_listen(addr, &subscribers)
        }
        (None, Some(config_path)) => config_mode(config_path),
        (None, None) => {
            println!("CAN Telemetry - no input specified");
            println!("\nQuick Start:");
            println!("  telemetry-cli convert --log frames.jsonl --dbc defs.dbc --output signals.json");
            println!("  telemetry-cli listen --addr 127.0.0.1:6000 --signal RPM --signal OilPress");
            println!("\nOr drive both from a config file:");
            println!("  telemetry-cli --config run.toml");
            println!("\nUse --help for more options");
            Ok(())
        }
    }
}

/// Run the offline pipeline and report its counters
fn run_convert(log: &Path, dbc: &Path, output: &Path) -> Result<()> {
    let stats = pipeline::convert(log, dbc, output)?;

    println!("Conversion finished: {:?}", output);
    println!("  Frames read:     {}", stats.frames_read);
    println!("  Frames decoded:  {}", stats.frames_decoded);
    println!("  Frames skipped:  {}", stats.frames_skipped);
    println!("  Samples dropped: {}", stats.samples_dropped);
    println!("  Series written:  {}", stats.signals_written);

    Ok(())
}

/// Bind the listener, register console subscribers, and run until killed
fn run_listen(addr: &str, subscribers: &[config::SubscriberConfig]) -> Result<()> {
    let mut listener = DatagramListener::bind(addr)?;
    let router = SignalRouter::new();

    for sub in subscribers {
        let label = sub.label.clone().unwrap_or_else(|| sub.signal.clone());
        let sink = Rc::new(RefCell::new(ConsoleSink::new(label, sub.min, sub.max)));
        router.register(sub.signal.clone(), sink);
        log::info!("Registered subscriber for '{}'", sub.signal);
    }

    if subscribers.is_empty() {
        log::warn!("No subscribers registered; packets will be parsed but not shown");
    }

    println!("Listening on {} ({} subscribers), Ctrl-C to stop", addr, subscribers.len());
    live::run(&mut listener, &router, || true)?;

    Ok(())
}

/// Config-file mode: run the convert job, then the listener, as configured
fn config_mode(config_path: &Path) -> Result<()> {
    log::info!("Loading configuration from: {:?}", config_path);
    let config = config::load_config(config_path)?;

    if let Some(convert) = &config.convert {
        run_convert(&convert.log, &convert.dbc, &convert.output)?;
    }

    if let Some(listen) = &config.listen {
        run_listen(&listen.addr, &listen.subscribers)?;
    }

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
