//! Data items and the two records exchanged between watch and phone.
//!
//! Consumers filter by path first and only then look at field names; any
//! field they don't recognise is skipped.

use sunshine_weather::WeatherPatch;

use crate::value::{DataMap, FieldValue};

/// Path the watch publishes weather requests to
pub const DATA_REQUEST_PATH: &str = "/data_request";
/// Path the phone publishes weather updates to
pub const WEARABLE_DATA_PATH: &str = "/wearable_data";

pub const KEY_DATA_REQUEST: &str = "data_request";
pub const KEY_DATA_REQUEST_TIME: &str = "data_request_time";
pub const KEY_WEARABLE_ID: &str = "wearable_id";
pub const KEY_WEARABLE_MAX: &str = "wearable_max";
pub const KEY_WEARABLE_MIN: &str = "wearable_min";

/// Latest value stored at a path
#[derive(Debug, Clone, PartialEq)]
pub struct DataItem {
    pub path: String,
    pub data: DataMap,
}

/// A write to the shared store
#[derive(Debug, Clone, PartialEq)]
pub struct PutDataRequest {
    path: String,
    data: DataMap,
    urgent: bool,
}

impl PutDataRequest {
    pub fn create(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            data: DataMap::new(),
            urgent: false,
        }
    }

    pub fn with_data(path: impl Into<String>, data: DataMap) -> Self {
        Self {
            path: path.into(),
            data,
            urgent: false,
        }
    }

    /// Ask the transport to deliver without batching delay. Best effort.
    pub fn set_urgent(mut self) -> Self {
        self.urgent = true;
        self
    }

    pub fn is_urgent(&self) -> bool {
        self.urgent
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn data(&self) -> &DataMap {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut DataMap {
        &mut self.data
    }

    pub fn to_item(&self) -> DataItem {
        DataItem {
            path: self.path.clone(),
            data: self.data.clone(),
        }
    }
}

/// Watch -> phone: "send me fresh weather".
///
/// The timestamp only exists to make each request a distinct payload; the
/// store does not notify when a put leaves the value unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataRequest {
    pub requested_at_ms: i64,
}

impl DataRequest {
    pub fn now() -> Self {
        Self::at(chrono::Utc::now().timestamp_millis())
    }

    pub fn at(requested_at_ms: i64) -> Self {
        Self { requested_at_ms }
    }

    /// Encode as an urgent put at `/data_request`.
    pub fn to_put_request(&self) -> PutDataRequest {
        let mut request = PutDataRequest::create(DATA_REQUEST_PATH);
        request
            .data_mut()
            .put_string(KEY_DATA_REQUEST, "")
            .put_long(KEY_DATA_REQUEST_TIME, self.requested_at_ms);
        request.set_urgent()
    }

    /// Decode a request item. The marker key must be present; its value and
    /// the timestamp are not required.
    pub fn from_item(item: &DataItem) -> Option<Self> {
        if item.path != DATA_REQUEST_PATH || !item.data.contains_key(KEY_DATA_REQUEST) {
            return None;
        }
        Some(Self::at(
            item.data.get_long(KEY_DATA_REQUEST_TIME).unwrap_or_default(),
        ))
    }
}

/// Phone -> watch: condition code plus today's high and low.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherUpdate {
    pub weather_id: i32,
    pub high: f64,
    pub low: f64,
}

impl WeatherUpdate {
    pub fn new(weather_id: i32, high: f64, low: f64) -> Self {
        Self {
            weather_id,
            high,
            low,
        }
    }

    pub fn to_put_request(&self) -> PutDataRequest {
        let mut request = PutDataRequest::create(WEARABLE_DATA_PATH);
        request
            .data_mut()
            .put_int(KEY_WEARABLE_ID, self.weather_id)
            .put_double(KEY_WEARABLE_MAX, self.high)
            .put_double(KEY_WEARABLE_MIN, self.low);
        request.set_urgent()
    }

    /// Fields of an update item as a partial patch. `None` if the item is at
    /// another path.
    pub fn patch_from_item(item: &DataItem) -> Option<WeatherPatch> {
        if item.path != WEARABLE_DATA_PATH {
            return None;
        }

        let mut patch = WeatherPatch::default();
        for (key, value) in item.data.iter() {
            match (key, value) {
                (KEY_WEARABLE_ID, FieldValue::Int(id)) => patch.weather_id = Some(*id),
                (KEY_WEARABLE_MAX, FieldValue::Double(high)) => patch.high = Some(*high),
                (KEY_WEARABLE_MIN, FieldValue::Double(low)) => patch.low = Some(*low),
                (KEY_WEARABLE_ID | KEY_WEARABLE_MAX | KEY_WEARABLE_MIN, other) => {
                    tracing::debug!(key, ?other, "Ignoring field with unexpected type");
                }
                _ => {}
            }
        }
        Some(patch)
    }

    /// A complete update, if all three fields are present
    pub fn from_item(item: &DataItem) -> Option<Self> {
        let patch = Self::patch_from_item(item)?;
        Some(Self::new(patch.weather_id?, patch.high?, patch.low?))
    }
}
