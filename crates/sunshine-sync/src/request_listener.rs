//! Phone side: turn incoming weather requests into a refresh.

use std::sync::Arc;

use crate::client::DataListener;
use crate::layer::DataEvent;
use crate::record::{DATA_REQUEST_PATH, KEY_DATA_REQUEST};

/// Entry point of the host's weather refresh pipeline. Calling it
/// repeatedly must be safe; this side does no deduplication.
pub trait RefreshTrigger: Send + Sync {
    fn start_immediate_sync(&self);
}

impl<F> RefreshTrigger for F
where
    F: Fn() + Send + Sync,
{
    fn start_immediate_sync(&self) {
        self()
    }
}

pub struct RequestListener {
    trigger: Arc<dyn RefreshTrigger>,
}

impl RequestListener {
    pub fn new(trigger: Arc<dyn RefreshTrigger>) -> Self {
        Self { trigger }
    }

    /// Trigger one refresh per changed request event. Returns how many
    /// refreshes were started.
    pub fn handle_batch(&self, events: &[DataEvent]) -> usize {
        let mut triggered = 0;
        for event in events {
            if !event.is_changed_at(DATA_REQUEST_PATH) {
                continue;
            }
            for key in event.item.data.keys() {
                if key == KEY_DATA_REQUEST {
                    self.trigger.start_immediate_sync();
                    triggered += 1;
                }
            }
        }
        triggered
    }
}

impl DataListener for RequestListener {
    fn on_data_changed(&self, events: &[DataEvent]) {
        let triggered = self.handle_batch(events);
        if triggered > 0 {
            tracing::info!("Weather requested by wearable; started {} refresh(es)", triggered);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::DataEventKind;
    use crate::record::{DataItem, DataRequest, WeatherUpdate};
    use crate::value::DataMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_listener() -> (RequestListener, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let listener = RequestListener::new(Arc::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }));
        (listener, count)
    }

    #[test]
    fn test_request_triggers_once_per_event() {
        let (listener, count) = counting_listener();
        let events = vec![
            DataEvent::changed(DataRequest::at(1).to_put_request().to_item()),
            DataEvent::changed(DataRequest::at(2).to_put_request().to_item()),
        ];

        assert_eq!(listener.handle_batch(&events), 2);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_marker_value_does_not_matter() {
        let (listener, count) = counting_listener();
        let mut data = DataMap::new();
        data.put_double(KEY_DATA_REQUEST, 1.5);
        let event = DataEvent::changed(DataItem {
            path: DATA_REQUEST_PATH.into(),
            data,
        });

        assert_eq!(listener.handle_batch(&[event]), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_other_paths_and_deletes_are_ignored() {
        let (listener, count) = counting_listener();
        let events = vec![
            DataEvent::changed(WeatherUpdate::new(800, 1.0, 0.5).to_put_request().to_item()),
            DataEvent {
                kind: DataEventKind::Deleted,
                item: DataRequest::at(1).to_put_request().to_item(),
            },
        ];

        assert_eq!(listener.handle_batch(&events), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_request_without_marker_is_ignored() {
        let (listener, count) = counting_listener();
        let mut data = DataMap::new();
        data.put_long("data_request_time", 9);
        let event = DataEvent::changed(DataItem {
            path: DATA_REQUEST_PATH.into(),
            data,
        });

        listener.on_data_changed(&[event]);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
