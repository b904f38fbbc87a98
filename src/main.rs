use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::mpsc;

use anotes::api::ApiClient;
use anotes::app::{App, AppEvent, EVENT_CHANNEL_SIZE};
use anotes::config::Config;
use anotes::session::SessionStore;
use anotes::ui;

/// Get the config directory path (~/.config/anotes/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("anotes"))
}

#[derive(Parser, Debug)]
#[command(name = "anotes", about = "Terminal client for a hierarchical note backend")]
struct Args {
    /// Backend base URL (overrides config file)
    #[arg(long, value_name = "URL")]
    server: Option<String>,

    /// Clear the stored selection and admin flag before starting
    #[arg(long)]
    reset_session: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    // Set up config directory
    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
        println!("Created config directory: {}", config_dir.display());
    }

    // User-only access on Unix: the session file carries the admin flag
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(&config_dir) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                if let Err(e) = std::fs::set_permissions(&config_dir, perms) {
                    tracing::warn!(
                        path = %config_dir.display(),
                        error = %e,
                        "Failed to set config directory permissions to 0700"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %config_dir.display(),
                    error = %e,
                    "Failed to read config directory metadata"
                );
            }
        }
    }

    let mut config = Config::load(&config_dir.join("config.toml"))
        .context("Failed to load configuration")?;
    if let Some(server) = args.server {
        config.server_url = server;
    }

    let base_url = config
        .server_url()
        .with_context(|| format!("Invalid server URL: {}", config.server_url))?;

    let session_path = config_dir.join("session.toml");
    let mut session = SessionStore::load(&session_path).context("Failed to load session")?;
    if args.reset_session {
        session.clear();
        session.save().context("Failed to reset session")?;
        println!("Session reset.");
    }

    let api = ApiClient::new(base_url, config.request_timeout())
        .context("Failed to create API client")?;

    // Create event channel for background tasks
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(EVENT_CHANNEL_SIZE);

    let mut app = App::new(api, session, event_tx);

    // Run the TUI (initial fetches are spawned inside the loop)
    ui::run(&mut app, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
