use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};
use voxstrip::{
    ArtifactNamer, CliMediaProcessor, Config, Error, PipelineOrchestrator, Result, YtDlpFetcher,
    api::start_api_server, run_with_shutdown,
};

/// Download online media and strip music and noise from its speech track
#[derive(Parser, Debug)]
#[command(name = "voxstrip", version, about)]
struct Args {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Address to listen on, overriding `api.bind_address`
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args).await {
        error!(error = %e, "voxstrip failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::from_file(&args.config)?;
    if let Some(bind) = args.bind {
        config.api.bind_address = bind;
    }
    let config = Arc::new(config.prepare_dirs()?);
    info!(
        config = %args.config.display(),
        upload_folder = %config.upload_folder().display(),
        "configuration loaded"
    );

    let fetcher = YtDlpFetcher::from_config(&config).ok_or_else(|| Error::Config {
        message: "yt-dlp not found; install it or set ytdlp_path".to_string(),
        key: Some("ytdlp_path".to_string()),
    })?;
    info!(binary = %fetcher.binary_path().display(), "using yt-dlp");

    let processor = CliMediaProcessor::from_config(&config);
    if !processor.binary_path().is_file() {
        warn!(
            binary = %processor.binary_path().display(),
            "processing engine not found; every request will fail at the processing stage"
        );
    }

    let namer = ArtifactNamer::new(config.upload_folder(), config.storage.container_ext.clone());
    let orchestrator = Arc::new(PipelineOrchestrator::new(
        Arc::new(fetcher),
        Arc::new(processor),
        namer,
    ));

    tokio::select! {
        result = start_api_server(orchestrator.clone(), config.clone()) => result,
        _ = run_with_shutdown((*orchestrator).clone()) => {
            info!("shutting down");
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(verbose))
        .init();
}
