use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Context as _;
use directories::ProjectDirs;
use readtrack_application::{AppContext, Library, StatusMessage};
use readtrack_engine::OpenLibraryClient;
use readtrack_storage::Storage;
use readtrack_ui::Ui;
use tracing_subscriber::EnvFilter;

mod config;

use config::Config;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let project_dirs =
        ProjectDirs::from("dev", "readtrack", "readtrack").context("resolve project dirs")?;
    let config = Config::from_env(project_dirs.data_dir())?;

    init_logging(&config.log_file)?;
    tracing::info!(
        data_file = %config.data_file.display(),
        api_url = %config.api_url,
        timeout_secs = config.lookup_timeout.as_secs(),
        "starting readtrack"
    );

    let (library, issue) = Library::open(Storage::new(&config.data_file));
    let status = match issue {
        None => None,
        Some(err) if err.is_missing() => None,
        Some(err) => Some(StatusMessage::error(format!(
            "Started with an empty library: {err}"
        ))),
    };

    let client = OpenLibraryClient::new(config.api_url.clone(), config.lookup_timeout)
        .context("create catalog client")?;

    let ctx = AppContext::new(library).with_status(status);
    let outcome = Ui::new(ctx, Arc::new(client)).run()?;

    if let Err(err) = outcome.ctx.library.save() {
        tracing::error!(error = %err, "final save failed");
        eprintln!("readtrack: could not save library: {err}");
    }
    tracing::info!("shutdown");

    Ok(())
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log dir {}", parent.display()))?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("install log subscriber: {err}"))?;
    Ok(())
}
