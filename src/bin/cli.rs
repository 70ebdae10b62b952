use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};
use tracing_subscriber::prelude::*;
use tracing_appender::rolling::RollingFileAppender;
use tracing_log::LogTracer;
use tracing::subscriber as tracing_subscriber_global;
use anyhow::{Result, Context};
use ytmusic_csv_import as lib;
use lib::api::Provider;
use lib::api::ytmusic::YtMusicProvider;
use lib::config::Config;
use lib::error::ImportError;
use lib::importer::ImportJob;
use lib::report::{ImportReport, RunLogs};

#[derive(Parser)]
#[command(name = "ytmusic-csv-import", version)]
struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a CSV playlist export into a new YouTube Music playlist
    Import {
        /// CSV file to import; a file dialog opens when omitted
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
        /// Playlist title (defaults to the CSV file name)
        #[arg(long)]
        name: Option<String>,
        /// Credential file (overrides `auth_file` from the config)
        #[arg(long, value_name = "FILE")]
        auth: Option<PathBuf>,
    },
    /// Create the credential file from pasted browser request headers (interactive)
    AuthSetup {
        /// Where to write the credential file (defaults to `auth_file` from the config)
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Validate config file and exit
    ConfigValidate,
}

async fn import(
    cfg: &Config,
    csv: Option<PathBuf>,
    name: Option<String>,
    auth: Option<PathBuf>,
) -> Result<(ImportReport, RunLogs), ImportError> {
    let auth_file = auth.unwrap_or_else(|| cfg.auth_file.clone());
    let provider = YtMusicProvider::from_headers_file(&auth_file, &cfg.language).map_err(ImportError::Auth)?;
    info!("{} client initialized from {}", Provider::name(&provider), auth_file.display());

    let csv_path = match csv {
        Some(p) => p,
        None => {
            info!("opening file dialog to select a CSV file...");
            lib::ingest::pick_csv_file()?
        }
    };
    let playlist_name = name.unwrap_or_else(|| lib::ingest::playlist_name_from_path(&csv_path));
    info!("playlist name: {}", playlist_name);

    let rows = lib::ingest::read_tracks(&csv_path)?;
    info!("read {} track(s) from {}", rows.len(), csv_path.display());
    let tracks = lib::ingest::dedupe_tracks(rows);
    info!("{} unique track(s) after deduplication", tracks.len());

    let file_name = csv_path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();
    let job = ImportJob {
        description: cfg.playlist_description(&playlist_name, &file_name),
        playlist_name,
        privacy: cfg.privacy_status,
    };
    let logs = RunLogs::new(&cfg.log_dir, &lib::util::run_timestamp(chrono::Local::now()));

    let report = lib::importer::run_import(&provider, &tracks, &job, &logs).await?;
    Ok((report, logs))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if matches!(cli.command, Commands::ConfigValidate) {
        match Config::resolve(cli.config.as_deref()) {
            Ok(_) => println!("OK"),
            Err(e) => {
                eprintln!("Config validation failed: {:#}", e);
                std::process::exit(2);
            }
        }
        return Ok(());
    }

    let cfg = Config::resolve(cli.config.as_deref()).with_context(|| "loading config".to_string())?;

    // Initialize log->tracing bridge and structured logging.
    // Logs go to both stdout (colored by level) and a daily-rotated file in cfg.log_dir.
    let _ = LogTracer::init();
    let file_appender: RollingFileAppender = tracing_appender::rolling::daily(&cfg.log_dir, "ytmusic-import.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Honor RUST_LOG if set, otherwise default to info.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = fmt::layer().with_ansi(false).with_writer(non_blocking);
    let stdout_layer = fmt::layer().with_ansi(true).with_target(false).with_writer(std::io::stdout);

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer);

    tracing_subscriber_global::set_global_default(subscriber)
        .context("failed to set global tracing subscriber")?;

    match cli.command {
        Commands::Import { csv, name, auth } => match import(&cfg, csv, name, auth).await {
            Ok((report, logs)) => {
                println!("Import finished: {}", report.summary());
                println!("Skipped tracks log: {}", logs.skipped_path().display());
                println!("Failed tracks log: {}", logs.failed_path().display());
            }
            Err(e) => {
                error!("{}", e);
                eprintln!("Import aborted: {}", e);
                // flush the file log before exiting
                drop(guard);
                std::process::exit(1);
            }
        },
        Commands::AuthSetup { output } => {
            let output = output.unwrap_or_else(|| cfg.auth_file.clone());
            lib::api::ytmusic_auth::run_auth_setup(&output)
                .with_context(|| format!("writing credentials to {}", output.display()))?;
        }
        Commands::ConfigValidate => {}
    }

    drop(guard);
    Ok(())
}
