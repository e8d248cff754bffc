use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use sunshine_core::{App, Config, ConfigError};
use sunshine_sync::{
    InMemoryDataLayer, PhoneSync, WatchFaceSync, WearableClient, WeatherSyncSender, WeatherUpdate,
};
use sunshine_weather::WeatherCache;
use tokio::sync::mpsc;

/// Runs a phone and a watch in one process over an in-memory data layer
/// and performs one request/update round trip.
#[tokio::main]
async fn main() -> Result<()> {
    let (config, _) = Config::load_validated().inspect_err(|e| {
        if let Some(config_err) = e.downcast_ref::<ConfigError>() {
            eprintln!("{}", config_err.user_message());
        }
    })?;
    sunshine_core::init(&config.logging.level)?;

    let layer = Arc::new(InMemoryDataLayer::new());

    // Host side: the refresh pipeline fills the phone's cache and pushes it.
    let host_cache = Arc::new(WeatherCache::new());
    let pipeline_sender =
        WeatherSyncSender::new(WearableClient::from_config(layer.clone(), &config));
    let refresh = {
        let host_cache = host_cache.clone();
        move || {
            let forecast = WeatherUpdate::new(801, 21.5, 12.0);
            host_cache.store(forecast.weather_id, forecast.high, forecast.low);
            pipeline_sender.send_from_cache(&host_cache);
        }
    };

    // Wearable side: redraws are forwarded here so we know when to stop.
    let (redraw_tx, mut redraw_rx) = mpsc::unbounded_channel();
    let watch_cache = Arc::new(WeatherCache::new());

    let mut app = App::with_config(config.clone());
    app.register_component(Box::new(PhoneSync::new(
        WearableClient::from_config(layer.clone(), &config),
        Arc::new(refresh),
    )));
    app.register_component(Box::new(WatchFaceSync::new(
        WearableClient::from_config(layer.clone(), &config),
        watch_cache.clone(),
        Arc::new(move || {
            let _ = redraw_tx.send(());
        }),
    )));
    app.start()?;

    match tokio::time::timeout(Duration::from_secs(5), redraw_rx.recv()).await {
        Ok(Some(())) => {
            let snapshot = watch_cache.snapshot();
            println!("Sunshine - wearable weather sync");
            println!(
                "  Condition: {} ({})",
                snapshot.icon.map(|i| i.description()).unwrap_or("unknown"),
                snapshot.weather_id.unwrap_or_default()
            );
            println!("  High: {:.0}  Low: {:.0}", snapshot.high, snapshot.low);
        }
        _ => tracing::warn!("No weather update reached the watch"),
    }

    app.shutdown()?;
    Ok(())
}
