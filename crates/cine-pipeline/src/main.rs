//! CLI entry point for the movie champion training pipeline.

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tracing::error;

use cine_pipeline::{Pipeline, DEFAULT_PAGE_LIMIT};
use cine_processing::Settings;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Movie metadata champion training pipeline",
    long_about = "Batch pipeline: collect popular-movie metadata, clean it, train a\n\
                  regression candidate and promote it to champion when it beats the\n\
                  deployed model on MSE.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  TMDB_API_KEY    API key for the metadata service (required)\n  \
                  TMDB_BASE_URL   API base URL (default: https://api.themoviedb.org/3)\n  \
                  TMDB_LANGUAGE   request language (default: ko-KR)\n  \
                  DATA_ROOT       local snapshot root (default: data)\n  \
                  S3_BUCKET       mirror bucket; omit to mirror into a local directory\n  \
                  AWS_REGION      bucket region (default: ap-northeast-2)\n  \
                  MIRROR_ROOT     local mirror directory (default: mirror)"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch movie pages and persist the raw snapshot
    Collect {
        /// Number of pages to fetch
        #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
        page_limit: u32,
    },
    /// Clean a raw snapshot into a training table
    Preprocess {
        /// Remote key of the raw snapshot (defaults to this run's own)
        #[arg(long)]
        remote_raw: Option<String>,
    },
    /// Train a candidate and run the champion check
    Train {
        /// Remote key of a processed snapshot to restore first
        #[arg(long)]
        remote_processed: Option<String>,

        /// Label for this candidate in run logs
        #[arg(long, default_value = "v1")]
        model_name: String,
    },
    /// Run collect, preprocess and train in sequence
    RunAll {
        /// Number of pages to fetch
        #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
        page_limit: u32,
    },
}

/// Initialize the tracing subscriber for logging.
fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Run one stage, logging failures without aborting the process.
///
/// Stage errors are operational, not programming errors: the process exit
/// code stays clean so a scheduler retries on its own cadence.
fn run_stage(name: &str, stage: impl FnOnce() -> Result<()>) {
    if let Err(e) = stage() {
        error!("{name} stage failed: {e:?}");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    // Load environment variables from .env file
    dotenv().ok();

    let settings = Settings::from_env()?;
    let pipeline = Pipeline::new(settings)?;

    match cli.command {
        Command::Collect { page_limit } => {
            run_stage("collect", || pipeline.collect(page_limit).map(|_| ()));
        }
        Command::Preprocess { remote_raw } => {
            run_stage("preprocess", || {
                pipeline.preprocess(remote_raw.as_deref()).map(|_| ())
            });
        }
        Command::Train {
            remote_processed,
            model_name,
        } => {
            run_stage("train", || {
                pipeline
                    .train(remote_processed.as_deref(), &model_name)
                    .map(|_| ())
            });
        }
        Command::RunAll { page_limit } => {
            pipeline.run_all(page_limit);
        }
    }

    Ok(())
}
