use anyhow::Result;
use chrono::Local;
use clap::Parser;
use embalses::{validate::validate_range, CsvSink, OutputMode, Scraper, ScraperConfig};
use std::{path::PathBuf, process::ExitCode};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Download weekly MITECO reservoir bulletins for every river-basin district into CSV"
)]
struct Args {
    /// First query date (dd/mm/yyyy)
    start_date: String,
    /// Last query date (dd/mm/yyyy)
    end_date: String,
    /// S = one file per week, A = one accumulated file
    #[arg(long, default_value = "S")]
    mode: OutputMode,
    /// Directory for the CSV files
    #[arg(long, default_value = "data")]
    output: PathBuf,
    /// YAML settings file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the bulletin endpoint
    #[arg(long)]
    endpoint: Option<Url>,
    /// Validate the endpoint's TLS certificate
    #[arg(long)]
    verify_certs: bool,
    /// District requests in flight per week
    #[arg(long)]
    concurrency: Option<usize>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,embalses=info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let args = Args::parse();

    // ─── 2) validate the range before touching the network ──────────
    let today = Local::now().date_naive();
    let (start, end) = match validate_range(&args.start_date, &args.end_date, today) {
        Ok(range) => range,
        Err(e) => {
            error!("invalid date range: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(args, start, end).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args, start: chrono::NaiveDate, end: chrono::NaiveDate) -> Result<()> {
    // ─── 3) settings: file, then flags ──────────────────────────────
    let mut config = match &args.config {
        Some(path) => ScraperConfig::from_yaml_file(path)?,
        None => ScraperConfig::default(),
    };
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }
    if args.verify_certs {
        config.accept_invalid_certs = false;
    }
    if let Some(n) = args.concurrency {
        config.fetch_concurrency = n.max(1);
    }

    // ─── 4) scrape ──────────────────────────────────────────────────
    let sink = CsvSink::new(args.mode, &args.output)?;
    let scraper = Scraper::new(config)?;
    let summary = scraper.run(start, end, sink).await?;

    for file in &summary.files {
        info!(path = %file.display(), "written");
    }
    Ok(())
}
