use serde::{Deserialize, Serialize};

/// High/low value meaning "never synced". A real 0.0 reading is
/// indistinguishable from it.
pub const SENTINEL_TEMPERATURE: f64 = 0.0;

/// Icon categories the watch face can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconCategory {
    Storm,
    LightRain,
    Rain,
    Snow,
    Fog,
    Clear,
    LightClouds,
    Cloudy,
}

impl IconCategory {
    /// Map an OpenWeatherMap condition code to an icon category.
    ///
    /// Ranges are tested in order and the first match wins. 761 falls in
    /// the fog range before the storm singletons are reached, so it maps to
    /// `Fog`. Unmatched codes are `Cloudy`.
    /// See: https://openweathermap.org/weather-conditions
    pub fn from_condition_code(code: i32) -> Self {
        match code {
            200..=232 => Self::Storm,
            300..=321 => Self::LightRain,
            500..=504 => Self::Rain,
            511 => Self::Snow,
            520..=531 => Self::Rain,
            600..=622 => Self::Snow,
            701..=761 => Self::Fog,
            // 761 (squalls) is claimed by the fog range above.
            771 | 781 => Self::Storm,
            800 => Self::Clear,
            801 => Self::LightClouds,
            802..=804 => Self::Cloudy,
            900..=906 => Self::Storm,
            958..=962 => Self::Storm,
            951..=957 => Self::Clear,
            _ => Self::Cloudy,
        }
    }

    /// Stable icon identifier handed to the render surface
    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Storm => "storm",
            Self::LightRain => "light_rain",
            Self::Rain => "rain",
            Self::Snow => "snow",
            Self::Fog => "fog",
            Self::Clear => "clear",
            Self::LightClouds => "light_clouds",
            Self::Cloudy => "cloudy",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Storm => "Storm",
            Self::LightRain => "Light Rain",
            Self::Rain => "Rain",
            Self::Snow => "Snow",
            Self::Fog => "Fog",
            Self::Clear => "Clear",
            Self::LightClouds => "Light Clouds",
            Self::Cloudy => "Cloudy",
        }
    }
}

/// What the render path sees: the last synced condition and temperatures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub weather_id: Option<i32>,
    pub icon: Option<IconCategory>,
    pub high: f64,
    pub low: f64,
}

impl Default for WeatherSnapshot {
    fn default() -> Self {
        Self {
            weather_id: None,
            icon: None,
            high: SENTINEL_TEMPERATURE,
            low: SENTINEL_TEMPERATURE,
        }
    }
}

impl WeatherSnapshot {
    /// Both temperatures still at the sentinel
    pub fn is_unsynced(&self) -> bool {
        self.high == SENTINEL_TEMPERATURE && self.low == SENTINEL_TEMPERATURE
    }
}

/// A partial update; absent fields leave the cached value untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeatherPatch {
    pub weather_id: Option<i32>,
    pub high: Option<f64>,
    pub low: Option<f64>,
}

impl WeatherPatch {
    pub fn is_empty(&self) -> bool {
        self.weather_id.is_none() && self.high.is_none() && self.low.is_none()
    }

    /// Apply to a snapshot, classifying the condition code if present
    pub fn apply_to(&self, snapshot: &mut WeatherSnapshot) {
        if let Some(id) = self.weather_id {
            snapshot.weather_id = Some(id);
            snapshot.icon = Some(IconCategory::from_condition_code(id));
        }
        if let Some(high) = self.high {
            snapshot.high = high;
        }
        if let Some(low) = self.low {
            snapshot.low = low;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_representative_codes() {
        let cases = [
            (200, IconCategory::Storm),
            (321, IconCategory::LightRain),
            (502, IconCategory::Rain),
            (511, IconCategory::Snow),
            (531, IconCategory::Rain),
            (611, IconCategory::Snow),
            (731, IconCategory::Fog),
            (800, IconCategory::Clear),
            (801, IconCategory::LightClouds),
            (803, IconCategory::Cloudy),
            (905, IconCategory::Storm),
            (960, IconCategory::Storm),
            (955, IconCategory::Clear),
        ];
        for (code, expected) in cases {
            assert_eq!(
                IconCategory::from_condition_code(code),
                expected,
                "code {}",
                code
            );
        }
    }

    #[test]
    fn test_761_resolves_to_fog_not_storm() {
        // Legacy first-match order: the 701..=761 fog range wins over the
        // 761|771|781 storm check.
        assert_eq!(IconCategory::from_condition_code(761), IconCategory::Fog);
        assert_eq!(IconCategory::from_condition_code(771), IconCategory::Storm);
        assert_eq!(IconCategory::from_condition_code(781), IconCategory::Storm);
    }

    #[test]
    fn test_range_edges() {
        assert_eq!(IconCategory::from_condition_code(232), IconCategory::Storm);
        assert_eq!(IconCategory::from_condition_code(233), IconCategory::Cloudy);
        assert_eq!(IconCategory::from_condition_code(510), IconCategory::Cloudy);
        assert_eq!(IconCategory::from_condition_code(622), IconCategory::Snow);
        assert_eq!(IconCategory::from_condition_code(701), IconCategory::Fog);
        assert_eq!(IconCategory::from_condition_code(804), IconCategory::Cloudy);
        assert_eq!(IconCategory::from_condition_code(957), IconCategory::Clear);
        assert_eq!(IconCategory::from_condition_code(958), IconCategory::Storm);
    }

    #[test]
    fn test_unknown_codes_default_to_cloudy() {
        for code in [-1, 0, 100, 700, 850, 907, 950, 963, i32::MAX] {
            assert_eq!(
                IconCategory::from_condition_code(code),
                IconCategory::Cloudy,
                "code {}",
                code
            );
        }
    }

    #[test]
    fn test_classification_is_pure() {
        for code in 0..1000 {
            assert_eq!(
                IconCategory::from_condition_code(code),
                IconCategory::from_condition_code(code)
            );
        }
    }

    #[test]
    fn test_icon_names_are_snake_case_serde_names() {
        let json = serde_json::to_string(&IconCategory::LightClouds).unwrap();
        assert_eq!(json, format!("\"{}\"", IconCategory::LightClouds.icon_name()));
    }

    #[test]
    fn test_default_snapshot_is_unsynced() {
        let snapshot = WeatherSnapshot::default();
        assert!(snapshot.is_unsynced());
        assert_eq!(snapshot.icon, None);
    }

    #[test]
    fn test_snapshot_with_one_real_value_is_synced() {
        let snapshot = WeatherSnapshot {
            high: 12.5,
            ..WeatherSnapshot::default()
        };
        assert!(!snapshot.is_unsynced());
    }

    #[test]
    fn test_patch_only_touches_present_fields() {
        let mut snapshot = WeatherSnapshot {
            weather_id: Some(500),
            icon: Some(IconCategory::Rain),
            high: 20.0,
            low: 10.0,
        };
        WeatherPatch {
            high: Some(22.0),
            ..WeatherPatch::default()
        }
        .apply_to(&mut snapshot);

        assert_eq!(snapshot.weather_id, Some(500));
        assert_eq!(snapshot.icon, Some(IconCategory::Rain));
        assert_eq!(snapshot.high, 22.0);
        assert_eq!(snapshot.low, 10.0);
    }
}
