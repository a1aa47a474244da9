mod download;
mod error;
mod file;
mod identifier;
mod options;

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Download a video file from Google Drive, resuming partial downloads.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// The video ID from Google Drive (e.g., 'abc-Qt12kjmS21kjDm2kjd') or a share link
    video_id: String,

    #[arg(short, long)]
    /// Optional output file name for the downloaded video (default: video name in Google Drive)
    output: Option<String>,

    #[arg(short, long = "chunk_size", default_value_t = options::DEFAULT_CHUNK_SIZE, value_parser = chunk_size_parser)]
    /// Chunk size in bytes used to read the video stream
    chunk_size: usize,

    #[arg(short, long)]
    /// Enable verbose mode
    verbose: bool,

    #[arg(long, hide = true, default_value = options::DEFAULT_INFO_ENDPOINT)]
    /// Video info endpoint
    endpoint: String,
}

fn chunk_size_parser(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("chunk size must be at least 1 byte".to_string()),
        Ok(size) => Ok(size),
        Err(err) => Err(err.to_string()),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let options = options::Options {
        info_endpoint: args.endpoint,
        output: args.output,
        chunk_size: args.chunk_size,
        verbose: args.verbose,
    };

    init_tracing(options.verbose);

    tracing::debug!("Options: {:?}", options);

    if download::search::download(&args.video_id, &options).await.is_err() {
        std::process::exit(1);
    }
}
