//! Watch side: apply weather updates to the render cache.

use std::sync::Arc;

use sunshine_weather::WeatherCache;

use crate::client::DataListener;
use crate::layer::DataEvent;
use crate::record::{WeatherUpdate, WEARABLE_DATA_PATH};

/// Whatever draws the face. `invalidate` schedules a redraw.
pub trait RenderSurface: Send + Sync {
    fn invalidate(&self);
}

impl<F> RenderSurface for F
where
    F: Fn() + Send + Sync,
{
    fn invalidate(&self) {
        self()
    }
}

pub struct WeatherUpdateListener {
    cache: Arc<WeatherCache>,
    surface: Arc<dyn RenderSurface>,
}

impl WeatherUpdateListener {
    pub fn new(cache: Arc<WeatherCache>, surface: Arc<dyn RenderSurface>) -> Self {
        Self { cache, surface }
    }

    pub fn cache(&self) -> &Arc<WeatherCache> {
        &self.cache
    }

    /// Apply each changed update event and redraw once per event.
    /// Returns the number of events applied.
    pub fn handle_batch(&self, events: &[DataEvent]) -> usize {
        let mut applied = 0;
        for event in events {
            if !event.is_changed_at(WEARABLE_DATA_PATH) {
                continue;
            }
            let Some(patch) = WeatherUpdate::patch_from_item(&event.item) else {
                continue;
            };

            let snapshot = self.cache.apply(patch);
            let icon = snapshot.icon.map_or("none", |i| i.icon_name());
            tracing::info!(
                weather_id = ?snapshot.weather_id,
                icon,
                high = snapshot.high,
                low = snapshot.low,
                "Weather updated from host"
            );
            self.surface.invalidate();
            applied += 1;
        }
        applied
    }
}

impl DataListener for WeatherUpdateListener {
    fn on_data_changed(&self, events: &[DataEvent]) {
        self.handle_batch(events);
    }
}
