use anyhow::{Context, bail};
use clap::{ArgAction, Parser};
use ratio_spoof::advancer::RngJitter;
use ratio_spoof::presenter::TerminalPresenter;
use ratio_spoof::session::{IntervalPacer, LaneConfig, SessionConfig, SimulationLoop};
use ratio_spoof::torrent::ContentMetadata;
use ratio_spoof::utils::PeerId;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// Usage:
// cargo run -- -t path/to/file.torrent -d 20 500 -u 0 120

#[derive(Parser, Debug)]
#[command(author, version, about = "Pretend to be downloading and seeding a torrent.")]
struct Args {
    /// path .torrent file
    #[arg(short = 't')]
    torrent: PathBuf,

    /// parms for download
    #[arg(
        short = 'd',
        required = true,
        num_args = 2,
        value_names = ["%_COMPLETE", "KBS_SPEED"],
        allow_negative_numbers = true
    )]
    download: Vec<i64>,

    /// parms for upload
    #[arg(
        short = 'u',
        required = true,
        num_args = 2,
        value_names = ["%_COMPLETE", "KBS_SPEED"],
        allow_negative_numbers = true
    )]
    upload: Vec<i64>,

    /// pause between two ticks, in milliseconds
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,

    /// stop after this many ticks instead of running until interrupted
    #[arg(long)]
    ticks: Option<u64>,

    /// seed the jitter for a reproducible feed
    #[arg(long)]
    seed: Option<u64>,

    /// more logging on stderr, repeat for more
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn lane_config(flag: &str, values: &[i64]) -> anyhow::Result<LaneConfig> {
    let &[percent, rate_kbs] = values else {
        bail!("{flag} takes exactly two values, got {}", values.len());
    };

    LaneConfig::checked(percent, rate_kbs).with_context(|| format!("invalid {flag}"))
}

fn set_up_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    // stdout belongs to the presenter
    let fmt_layer = fmt::layer()
        .compact()
        .with_line_number(true)
        .with_writer(io::stderr)
        .with_filter(filter);

    tracing_subscriber::registry().with(fmt_layer).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    set_up_tracing(args.verbose);

    let download = lane_config("-d", &args.download)?;
    let upload = lane_config("-u", &args.upload)?;

    let metadata = ContentMetadata::from_file(&args.torrent)
        .await
        .with_context(|| format!("failed to load {}", args.torrent.display()))?;

    let config = SessionConfig::new(download, upload, PeerId::generate());
    info!(peer_id = %config.peer_id, info_hash = %metadata.info_hash, "session identity");

    let jitter = match args.seed {
        Some(seed) => RngJitter::from_seed(seed),
        None => RngJitter::from_entropy(),
    };
    let mut session = SimulationLoop::new(config, metadata, jitter);

    let stdout = io::stdout();
    let interactive = stdout.is_terminal();
    let mut presenter = TerminalPresenter::new(stdout);
    if !interactive {
        presenter = presenter.without_clearing();
    }
    let mut pacer = IntervalPacer::new(Duration::from_millis(args.interval_ms));

    tokio::select! {
        ran = session.run(&mut presenter, &mut pacer, args.ticks) => {
            ran.context("failed to render the session")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, bye");
        }
    }

    Ok(())
}
