use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::mpsc;

use rssdeck::api::ApiClient;
use rssdeck::app::{App, AppEvent};
use rssdeck::config::Config;
use rssdeck::session::SessionStore;
use rssdeck::storage::{Database, DatabaseError};
use rssdeck::sync::{Synchronizer, View};
use rssdeck::ui;

/// Get the config directory path (~/.config/rssdeck/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("rssdeck"))
}

#[derive(Parser, Debug)]
#[command(name = "rssdeck", about = "Terminal client for go-rss aggregation servers")]
struct Args {
    /// Server base URL (overrides api_base_url from the config file)
    #[arg(long, value_name = "URL")]
    server: Option<String>,

    /// Use this config file instead of ~/.config/rssdeck/config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Forget the stored session and exit
    #[arg(long)]
    logout: bool,

    /// Check that the server is reachable and exit
    #[arg(long)]
    health: bool,

    /// Ask the server who the stored session belongs to and exit
    #[arg(long)]
    whoami: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
    }

    // The database holds an API key: user-only access
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) =
            std::fs::set_permissions(&config_dir, std::fs::Permissions::from_mode(0o700))
        {
            tracing::warn!(
                path = %config_dir.display(),
                error = %e,
                "Failed to set config directory permissions to 0700"
            );
        }
    }

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    let base_url = args.server.as_deref().unwrap_or(&config.api_base_url);

    let db_path = config_dir.join("state.db");
    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = match Database::open(db_path_str).await {
        Ok(db) => db,
        Err(DatabaseError::InstanceLocked) => {
            eprintln!(
                "Error: Another instance of rssdeck appears to be running. Please close it and try again."
            );
            std::process::exit(1);
        }
        Err(e) => return Err(anyhow::anyhow!("Failed to open database: {}", e)),
    };

    let session = SessionStore::new(db);
    let api = ApiClient::new(base_url, session.clone())
        .with_context(|| format!("Cannot use server URL '{}'", base_url))?;

    if args.health {
        api.healthz()
            .await
            .with_context(|| format!("Server at {} is not healthy", api.base_url()))?;
        println!("Server at {} is healthy", api.base_url());
        return Ok(());
    }

    if args.logout {
        match session.restore().await {
            Some(current) => {
                session.clear().await.context("Failed to remove stored session")?;
                println!("Logged out {}", current.identity());
            }
            None => println!("No stored session"),
        }
        return Ok(());
    }

    if args.whoami {
        if session.restore().await.is_none() {
            anyhow::bail!("Not logged in");
        }
        let user = match api.current_user().await {
            Ok(user) => user,
            Err(e) if e.is_auth_failure() => {
                anyhow::bail!("Server rejected the stored session ({}); log in again", e)
            }
            Err(e) => return Err(e).context("Failed to reach the server"),
        };
        println!("{}", user.username);
        return Ok(());
    }

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);
    let sync = Synchronizer::new(api, event_tx, View::LoginForm);
    let mut app = App::new(config.ui_settings(), View::LoginForm);

    ui::run(&mut app, sync, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
