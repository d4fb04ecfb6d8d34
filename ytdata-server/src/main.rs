mod routes;

use std::io;
use std::path::PathBuf;

use actix_web::{App, HttpServer};
use reqwest::{redirect, ClientBuilder};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use ytdata_core::{ChannelOptions, ChannelPoller, ConfigurationError};

const DEFAULT_BIND: &str = "127.0.0.1:8080";

#[actix_web::main]
async fn main() -> io::Result<()> {
    init_tracing();

    let client = build_client().map_err(io::Error::other)?;
    let poller = load_options()
        .and_then(|options| ChannelPoller::from_options(options, client))
        .map_err(|err| {
            error!(error = %err, "invalid channel options");
            io::Error::new(io::ErrorKind::InvalidInput, err)
        })?;
    let handle = poller.spawn();
    let layer = poller.middleware();

    let bind = std::env::var("YTDATA_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_owned());
    info!(%bind, channel = %poller.config().channel_id, "starting server");

    HttpServer::new(move || App::new().wrap(layer.clone()).configure(routes::configure))
        .bind(&bind)?
        .run()
        .await?;

    if let Err(err) = handle.stop().await {
        error!(error = %err, "poller did not shut down cleanly");
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn build_client() -> reqwest::Result<reqwest::Client> {
    ClientBuilder::new()
        .redirect(redirect::Policy::limited(5))
        .user_agent(concat!("ytdata/", env!("CARGO_PKG_VERSION")))
        .build()
}

fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("YTDATA_CONFIG") {
        return PathBuf::from(path);
    }
    // Linux: ~/.config/ytdata/config.json
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("ytdata");
    path.push("config.json");
    path
}

fn load_options() -> Result<ChannelOptions, ConfigurationError> {
    let path = config_path();
    let options = if path.exists() {
        ChannelOptions::from_file(&path)?
    } else {
        info!(path = %path.display(), "no options file, using environment only");
        ChannelOptions::default()
    };
    options.with_env_overrides()
}
