//! Watch side: ask the phone for weather.

use sunshine_weather::WeatherCache;

use crate::client::{PendingResult, WearableClient};
use crate::record::DataRequest;

pub struct DataRequestSender {
    client: WearableClient,
}

impl DataRequestSender {
    pub fn new(client: WearableClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &WearableClient {
        &self.client
    }

    /// Publish a request stamped with the current time
    pub fn send_request(&self) -> PendingResult {
        self.send(DataRequest::now())
    }

    pub fn send(&self, request: DataRequest) -> PendingResult {
        tracing::debug!(
            node = %self.client.node(),
            requested_at_ms = request.requested_at_ms,
            "Requesting weather from host"
        );
        self.client.put_data_item(request.to_put_request())
    }

    /// Request only while the cache has never been filled.
    pub fn request_if_unsynced(&self, cache: &WeatherCache) -> Option<PendingResult> {
        if cache.is_unsynced() {
            Some(self.send_request())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{DataLayer, InMemoryDataLayer};
    use crate::record::{DATA_REQUEST_PATH, KEY_DATA_REQUEST_TIME};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_unsynced_cache_triggers_request() {
        let layer = Arc::new(InMemoryDataLayer::new());
        let sender = DataRequestSender::new(WearableClient::new(layer.clone(), "watch"));
        let cache = WeatherCache::new();

        let pending = sender.request_if_unsynced(&cache).unwrap();
        assert!(pending.wait().await.unwrap().is_changed());

        let item = layer.get_data_item(DATA_REQUEST_PATH).unwrap();
        assert!(item.data.get_long(KEY_DATA_REQUEST_TIME).unwrap() > 0);
    }

    #[tokio::test]
    async fn test_synced_cache_does_not_request() {
        let layer = Arc::new(InMemoryDataLayer::new());
        let sender = DataRequestSender::new(WearableClient::new(layer.clone(), "watch"));
        let cache = WeatherCache::new();
        cache.store(800, 75.0, 50.0);

        assert!(sender.request_if_unsynced(&cache).is_none());
        assert!(layer.get_data_item(DATA_REQUEST_PATH).is_none());
    }

    #[tokio::test]
    async fn test_same_timestamp_twice_is_unchanged() {
        let layer = Arc::new(InMemoryDataLayer::new());
        let sender = DataRequestSender::new(WearableClient::new(layer, "watch"));

        assert!(sender.send(DataRequest::at(10)).wait().await.unwrap().is_changed());
        assert!(!sender.send(DataRequest::at(10)).wait().await.unwrap().is_changed());
        assert!(sender.send(DataRequest::at(11)).wait().await.unwrap().is_changed());
    }
}
