//! portkv Worker Binary
//!
//! Hosts an index and serves the command protocol on stdin/stdout. Logging
//! goes to stderr so stdout stays a clean protocol channel. The process exit
//! status is the authoritative outcome signal for the supervisor.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use portkv::config::WalSyncStrategy;
use portkv::{Config, Engine, ExitStatus, Worker};

/// portkv Worker
#[derive(Parser, Debug)]
#[command(name = "portkv-worker")]
#[command(about = "Key/value index worker serving a framed command protocol on stdio")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./portkv_data")]
    data_dir: String,

    /// Fsync the WAL after every N writes (0 = after every write)
    #[arg(short, long, default_value = "100")]
    sync_every: usize,
}

fn main() {
    // Initialize tracing/logging on stderr; stdout carries reply frames
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,portkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let args = Args::parse();

    tracing::info!("portkv worker v{}", portkv::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);

    let strategy = if args.sync_every == 0 {
        WalSyncStrategy::EveryWrite
    } else {
        WalSyncStrategy::EveryNEntries {
            count: args.sync_every,
        }
    };

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .wal_sync_strategy(strategy)
        .build();

    let engine = match Engine::open(config) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!("failed to open index: {}", e);
            std::process::exit(ExitStatus::ChannelIo.code());
        }
    };

    tracing::info!(entries = engine.entry_count(), "index ready");

    let stdin = std::io::stdin().lock();
    let stdout = std::io::stdout().lock();

    let status = Worker::new(stdin, stdout, engine).run();
    std::process::exit(status.code());
}
