//! Watch <-> phone weather synchronization for Sunshine.
//!
//! The watch publishes a request item, the phone reacts by refreshing and
//! publishing an update item, and the watch applies that update to its
//! render cache. Both sides only ever talk through the shared data layer.

pub mod client;
pub mod layer;
pub mod node;
pub mod record;
pub mod request_listener;
pub mod requester;
pub mod response_listener;
pub mod response_publisher;
pub mod retry;
pub mod value;

pub use client::{ConnectionState, DataListener, ListenerHandle, PendingResult, WearableClient};
pub use layer::{
    DataEvent, DataEventBatch, DataEventKind, DataLayer, InMemoryDataLayer, PutOutcome,
};
pub use node::{PhoneSync, WatchFaceSync};
pub use record::{
    DataItem, DataRequest, PutDataRequest, WeatherUpdate, DATA_REQUEST_PATH, WEARABLE_DATA_PATH,
};
pub use request_listener::{RefreshTrigger, RequestListener};
pub use requester::DataRequestSender;
pub use response_listener::{RenderSurface, WeatherUpdateListener};
pub use response_publisher::WeatherSyncSender;
pub use retry::RetryConfig;
pub use value::{DataMap, FieldValue};
