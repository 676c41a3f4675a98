use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rhythm_analyzer::server::{build_router, AppState};
use rhythm_analyzer::{AnalysisPipeline, PipelineConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "rhythm-analyzer")]
#[command(about = "Tempo, beat and onset analysis of audio files", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Minimum reported BPM
    #[arg(long, global = true, default_value = "40")]
    min_bpm: f32,

    /// Maximum reported BPM
    #[arg(long, global = true, default_value = "208")]
    max_bpm: f32,

    /// Timeout for fetching remote audio, in seconds
    #[arg(long, global = true, default_value = "60")]
    fetch_timeout_secs: u64,

    /// Reject downloads larger than this many megabytes
    #[arg(long, global = true, default_value = "200")]
    max_download_mb: u64,

    /// Directory for temporary audio files (default: system temp dir)
    #[arg(long, global = true)]
    staging_dir: Option<String>,

    /// Run the analysis stages one after another instead of in parallel
    #[arg(long, global = true)]
    sequential: bool,

    /// Verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze one URL (or local path) and print the result as JSON
    Analyze {
        /// http(s):// URL, file:// URL or local path
        url: String,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Run the HTTP analysis service
    Serve {
        /// Address to listen on
        #[arg(long, env = "RHYTHM_ANALYZER_BIND", default_value = "127.0.0.1:8000")]
        bind: String,

        /// Per-request analysis timeout, in seconds
        #[arg(long, default_value = "300")]
        request_timeout_secs: u64,

        /// Allow file:// URLs and local paths in requests
        #[arg(long)]
        allow_local_files: bool,
    },
}

impl Args {
    fn pipeline_config(&self, allow_local_files: bool) -> PipelineConfig {
        let mut config = PipelineConfig::new()
            .with_bpm_range(self.min_bpm, self.max_bpm)
            .with_fetch_timeout(Duration::from_secs(self.fetch_timeout_secs))
            .with_max_download_bytes(self.max_download_mb * 1024 * 1024)
            .with_local_files(allow_local_files)
            .with_parallel_stages(!self.sequential);

        if let Some(ref dir) = self.staging_dir {
            let expanded = shellexpand::tilde(dir);
            config = config.with_staging_dir(PathBuf::from(expanded.as_ref()));
        }

        config
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if args.min_bpm <= 0.0 || args.min_bpm >= args.max_bpm {
        anyhow::bail!(
            "invalid BPM range {}-{}: minimum must be positive and below maximum",
            args.min_bpm,
            args.max_bpm
        );
    }

    match args.command {
        Command::Analyze { ref url, pretty } => {
            let pipeline = AnalysisPipeline::new(args.pipeline_config(true))
                .context("Failed to set up analysis pipeline")?;

            let response = pipeline
                .analyze(url)
                .with_context(|| format!("Analysis of {} failed", url))?;

            let json = if pretty {
                serde_json::to_string_pretty(&response)?
            } else {
                serde_json::to_string(&response)?
            };
            println!("{}", json);
        }
        Command::Serve {
            ref bind,
            request_timeout_secs,
            allow_local_files,
        } => {
            // The blocking HTTP client must be created outside the async runtime
            let pipeline = AnalysisPipeline::new(args.pipeline_config(allow_local_files))
                .context("Failed to set up analysis pipeline")?;

            if allow_local_files {
                log::warn!("Local file access is enabled for HTTP requests");
            }
            log::info!("BPM range: {}-{} BPM", args.min_bpm, args.max_bpm);

            let state = AppState::new(
                Arc::new(pipeline),
                Duration::from_secs(request_timeout_secs),
            );

            let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
            runtime.block_on(serve(bind, state))?;
        }
    }

    Ok(())
}

async fn serve(bind: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;

    log::info!("Audio analysis service listening on http://{}", bind);

    axum::serve(listener, build_router(state))
        .await
        .context("Server error")
}
