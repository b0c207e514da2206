mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::{error, info, warn};
use tsuiseki_api::AniListClient;
use tsuiseki_core::cache::ProgressCache;
use tsuiseki_core::extract::FilenameTagger;
use tsuiseki_core::token::TokenStore;
use tsuiseki_core::{Action, AppConfig, SyncError, SyncOutcome, Updater};

/// Update AniList progress for a finished video file.
#[derive(Debug, Parser)]
#[command(name = "tsuiseki", version, about)]
struct Cli {
    /// Path of the video file.
    file: String,

    #[arg(value_enum)]
    action: CliAction,

    /// JSON object overriding sync options, e.g. '{"ADD_ENTRY_IF_MISSING": true}'.
    options: Option<String>,

    /// Config file to use instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliAction {
    /// Record the episode on the list.
    Update,
    /// Open the entry's AniList page.
    Launch,
}

impl From<CliAction> for Action {
    fn from(action: CliAction) -> Self {
        match action {
            CliAction::Update => Action::Update,
            CliAction::Launch => Action::Launch,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = logging::init(cli.verbose, &AppConfig::log_dir());

    match run(cli).await {
        Ok(message) => {
            println!("OSD: {message}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            if e.is_benign() {
                info!(error = %e, "Nothing to update");
            } else {
                error!(error = %e, "Sync failed");
            }
            eprintln!("ERROR: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<String, SyncError> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    if let Some(json) = &cli.options {
        config.sync.apply_json(json)?;
    }

    let token_path = config.token_path();
    let token = TokenStore::new(&token_path).load();
    if token.is_none() {
        warn!(path = %token_path.display(), "No access token, list queries will fail");
    }

    let client = AniListClient::new(token, (&config.api).into())
        .map_err(|e| SyncError::Api(Box::new(e)))?;
    let cache = ProgressCache::open(config.cache_path(), config.cache.ttl());
    let mut updater = Updater::new(client, FilenameTagger, cache, config.sync);

    info!(file = %cli.file, action = ?cli.action, "Processing file");
    match updater.run(&cli.file, cli.action.into()).await? {
        SyncOutcome::Launch { name, url } => {
            info!(url = %url, "Opening AniList page");
            open::that(&url)?;
            Ok(format!("Opening AniList for \"{name}\""))
        }
        SyncOutcome::Updated { progress } => {
            let name = progress.name.unwrap_or_default();
            let value = progress
                .current_progress
                .map_or_else(|| "?".to_string(), |p| p.to_string());
            Ok(format!("Updated \"{name}\" to: {value}"))
        }
    }
}
