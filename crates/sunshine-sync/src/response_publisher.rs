//! Phone side: push the latest forecast to the wearable.

use sunshine_weather::WeatherCache;

use crate::client::{PendingResult, WearableClient};
use crate::record::WeatherUpdate;

pub struct WeatherSyncSender {
    client: WearableClient,
}

impl WeatherSyncSender {
    pub fn new(client: WearableClient) -> Self {
        Self { client }
    }

    pub fn send_update(&self, update: &WeatherUpdate) -> PendingResult {
        tracing::debug!(
            node = %self.client.node(),
            weather_id = update.weather_id,
            high = update.high,
            low = update.low,
            "Sending weather to wearable"
        );
        self.client.put_data_item(update.to_put_request())
    }

    /// Publish what the host cache holds. Nothing is sent until a refresh
    /// has stored a condition code; 0.0/0.0 is a valid reading here.
    pub fn send_from_cache(&self, cache: &WeatherCache) -> Option<PendingResult> {
        let snapshot = cache.snapshot();
        let Some(weather_id) = snapshot.weather_id else {
            tracing::debug!("Host weather cache is empty; nothing to send");
            return None;
        };
        Some(self.send_update(&WeatherUpdate::new(weather_id, snapshot.high, snapshot.low)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{DataLayer, InMemoryDataLayer};
    use crate::record::WEARABLE_DATA_PATH;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_send_from_cache_publishes_triple() {
        let layer = Arc::new(InMemoryDataLayer::new());
        let sender = WeatherSyncSender::new(WearableClient::new(layer.clone(), "phone"));
        let cache = WeatherCache::new();
        cache.store(501, 18.5, 9.0);

        sender.send_from_cache(&cache).unwrap().wait().await.unwrap();

        let item = layer.get_data_item(WEARABLE_DATA_PATH).unwrap();
        assert_eq!(
            WeatherUpdate::from_item(&item),
            Some(WeatherUpdate::new(501, 18.5, 9.0))
        );
    }

    #[tokio::test]
    async fn test_freezing_forecast_is_still_published() {
        let layer = Arc::new(InMemoryDataLayer::new());
        let sender = WeatherSyncSender::new(WearableClient::new(layer.clone(), "phone"));
        let cache = WeatherCache::new();
        cache.store(600, 0.0, 0.0);

        let pending = sender.send_from_cache(&cache).unwrap();
        assert!(pending.wait().await.unwrap().is_changed());

        let item = layer.get_data_item(WEARABLE_DATA_PATH).unwrap();
        assert_eq!(
            WeatherUpdate::from_item(&item),
            Some(WeatherUpdate::new(600, 0.0, 0.0))
        );
    }

    #[tokio::test]
    async fn test_empty_cache_sends_nothing() {
        let layer = Arc::new(InMemoryDataLayer::new());
        let sender = WeatherSyncSender::new(WearableClient::new(layer.clone(), "phone"));

        assert!(sender.send_from_cache(&WeatherCache::new()).is_none());
        assert!(layer.get_data_item(WEARABLE_DATA_PATH).is_none());
    }
}
