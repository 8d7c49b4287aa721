//! gift-theme binary: resolves the dominant color and palette of each local image given on the
//! command line and prints one JSON object per image. Remote (`http(s)`) references are not
//! fetched and resolve to the fallback accent.

use std::{env, sync::Arc};

use anyhow::{Context, bail};
use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gift_theme::{
    color::HexColor,
    config::AppConfig,
    dao::color_store::{ColorStore, JsonFileColorStore},
    extract::FsImageDecoder,
    services::extraction_service::{ColorSource, resolve},
    state::{SharedState, ThemeState},
    theme::{ThemePalette, get_theme_palette},
};

/// One output line.
#[derive(Serialize)]
struct ImageTheme<'a> {
    image: &'a str,
    color: HexColor,
    source: ColorSource,
    palette: ThemePalette,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let images: Vec<String> = env::args().skip(1).collect();
    if images.is_empty() {
        bail!("usage: gift-theme <image-path>... (local paths or file:// URLs)");
    }

    let config = AppConfig::load();
    let durable = durable_store(&config).await;
    let state = ThemeState::new(config, Arc::new(FsImageDecoder), durable);

    info!(count = images.len(), "resolving image themes");
    let lines = join_all(images.iter().map(|image| render_line(&state, image))).await;
    for line in lines {
        println!("{}", line?);
    }

    Ok(())
}

async fn render_line(state: &SharedState, image: &str) -> anyhow::Result<String> {
    let resolution = resolve(state, image).await;
    let palette = get_theme_palette(
        resolution.color,
        &Default::default(),
        state.config().theme_policy(),
    );
    let line = ImageTheme {
        image,
        color: resolution.color,
        source: resolution.source,
        palette,
    };
    serde_json::to_string(&line).with_context(|| format!("serialising theme for `{image}`"))
}

/// Pick the durable cache tier: CouchDB when built in and configured, else the JSON file.
async fn durable_store(config: &AppConfig) -> Option<Arc<dyn ColorStore>> {
    #[cfg(feature = "couch-store")]
    {
        use gift_theme::dao::color_store::couchdb::{CouchColorStore, CouchConfig};

        match CouchConfig::from_env() {
            Ok(couch) => match CouchColorStore::connect(couch).await {
                Ok(store) => {
                    info!("using CouchDB color cache");
                    return Some(Arc::new(store));
                }
                Err(err) => {
                    warn!(error = %err, "CouchDB color cache unavailable; falling back to file cache")
                }
            },
            Err(err) => info!(reason = %err, "CouchDB color cache not configured"),
        }
    }

    let path = config.cache_path()?;
    let store = JsonFileColorStore::new(path.clone());
    if let Err(err) = store.health_check().await {
        warn!(path = %path.display(), error = %err, "file color cache unusable; running without it");
        return None;
    }
    Some(Arc::new(store))
}

/// Configure tracing subscribers; logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
