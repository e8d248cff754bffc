//! Per-device bundles wired into the application lifecycle.
//!
//! `WatchFaceSync` runs on the wearable: it listens for weather updates
//! and asks for data when the cache is empty. `PhoneSync` runs on the host:
//! it listens for requests and kicks the refresh pipeline, on demand and
//! every `weather.refresh_minutes`.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use sunshine_core::{Component, ComponentContext};
use sunshine_weather::WeatherCache;

use crate::client::{ListenerHandle, PendingResult, WearableClient};
use crate::request_listener::{RefreshTrigger, RequestListener};
use crate::requester::DataRequestSender;
use crate::response_listener::{RenderSurface, WeatherUpdateListener};

pub struct WatchFaceSync {
    client: WearableClient,
    cache: Arc<WeatherCache>,
    surface: Arc<dyn RenderSurface>,
    listener: Option<ListenerHandle>,
}

impl WatchFaceSync {
    pub fn new(
        client: WearableClient,
        cache: Arc<WeatherCache>,
        surface: Arc<dyn RenderSurface>,
    ) -> Self {
        Self {
            client,
            cache,
            surface,
            listener: None,
        }
    }

    pub fn cache(&self) -> &Arc<WeatherCache> {
        &self.cache
    }

    pub fn is_listening(&self) -> bool {
        self.listener.as_ref().is_some_and(ListenerHandle::is_active)
    }

    /// Face became visible. Requests data if the cache was never filled.
    pub fn on_activate(&self) -> Option<PendingResult> {
        DataRequestSender::new(self.client.clone()).request_if_unsynced(&self.cache)
    }
}

impl Component for WatchFaceSync {
    fn id(&self) -> &str {
        "watch-face-sync"
    }

    fn name(&self) -> &str {
        "Watch face weather sync"
    }

    fn start(&mut self, _ctx: &ComponentContext) -> Result<()> {
        // A failed connect is logged by the client; the first publish retries it.
        let _ = self.client.connect();

        // Listen before asking so the reply can't slip past.
        let listener = WeatherUpdateListener::new(self.cache.clone(), self.surface.clone());
        self.listener = Some(self.client.add_listener(Arc::new(listener)));

        self.on_activate();
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(handle) = self.listener.take() {
            handle.remove();
        }
        self.client.disconnect();
        Ok(())
    }
}

pub struct PhoneSync {
    client: WearableClient,
    trigger: Arc<dyn RefreshTrigger>,
    listener: Option<ListenerHandle>,
    refresh_task: Option<JoinHandle<()>>,
}

impl PhoneSync {
    pub fn new(client: WearableClient, trigger: Arc<dyn RefreshTrigger>) -> Self {
        Self {
            client,
            trigger,
            listener: None,
            refresh_task: None,
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listener.as_ref().is_some_and(ListenerHandle::is_active)
    }

    pub fn has_periodic_refresh(&self) -> bool {
        self.refresh_task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

/// Fire `trigger` every `minutes`, first tick one period after start.
/// 0 disables the timer.
fn spawn_periodic_refresh(
    trigger: Arc<dyn RefreshTrigger>,
    minutes: u32,
) -> Option<JoinHandle<()>> {
    if minutes == 0 {
        tracing::info!("Periodic weather refresh disabled");
        return None;
    }

    let period = Duration::from_secs(u64::from(minutes) * 60);
    tracing::info!(minutes, "Scheduling periodic weather refresh");
    Some(tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            tracing::debug!("Periodic weather refresh");
            trigger.start_immediate_sync();
        }
    }))
}

impl Component for PhoneSync {
    fn id(&self) -> &str {
        "phone-sync"
    }

    fn name(&self) -> &str {
        "Phone weather request listener"
    }

    fn start(&mut self, ctx: &ComponentContext) -> Result<()> {
        let _ = self.client.connect();
        let listener = RequestListener::new(self.trigger.clone());
        self.listener = Some(self.client.add_listener(Arc::new(listener)));
        self.refresh_task =
            spawn_periodic_refresh(self.trigger.clone(), ctx.config.weather.refresh_minutes);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(task) = self.refresh_task.take() {
            task.abort();
        }
        if let Some(handle) = self.listener.take() {
            handle.remove();
        }
        self.client.disconnect();
        Ok(())
    }
}
