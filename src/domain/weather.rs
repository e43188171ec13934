// Weather domain models - Persisted record and the snapshot sent to the watch
use serde::Deserialize;

/// Latest weather row as stored on the phone
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeatherRecord {
    pub date_millis: i64,
    pub weather_id: i32,
    pub max_celsius: f64,
    pub min_celsius: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureUnits {
    #[default]
    Metric,
    Imperial,
}

/// What the phone pushes to the watch for one sync
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub timestamp_millis: i64,
    pub max_temperature: String,
    pub min_temperature: String,
    pub condition_icon_id: i32,
}

impl WeatherSnapshot {
    pub fn from_record(record: &WeatherRecord, timestamp_millis: i64, units: TemperatureUnits) -> Self {
        Self {
            timestamp_millis,
            max_temperature: format_temperature(record.max_celsius, units),
            min_temperature: format_temperature(record.min_celsius, units),
            condition_icon_id: record.weather_id,
        }
    }

    pub fn icon_name(&self) -> Option<&'static str> {
        condition_icon_name(self.condition_icon_id)
    }
}

/// Format a Celsius reading for display, e.g. "72°"
pub fn format_temperature(celsius: f64, units: TemperatureUnits) -> String {
    let value = match units {
        TemperatureUnits::Metric => celsius,
        TemperatureUnits::Imperial => celsius * 1.8 + 32.0,
    };
    // Adding zero turns a rounded -0.0 into 0.0
    format!("{:.0}°", value.round() + 0.0)
}

/// Map an OpenWeatherMap condition code to the small icon asset name
pub fn condition_icon_name(weather_id: i32) -> Option<&'static str> {
    let name = match weather_id {
        200..=232 => "ic_storm",
        300..=321 => "ic_light_rain",
        500..=504 => "ic_rain",
        511 => "ic_snow",
        520..=531 => "ic_rain",
        600..=622 => "ic_snow",
        701..=760 => "ic_fog",
        761 | 771 | 781 => "ic_storm",
        800 => "ic_clear",
        801 => "ic_light_clouds",
        802..=804 => "ic_cloudy",
        900..=906 => "ic_storm",
        951..=957 => "ic_clear",
        958..=962 => "ic_storm",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_temperature() {
        assert_eq!(format_temperature(22.2, TemperatureUnits::Metric), "22°");
        assert_eq!(format_temperature(22.2, TemperatureUnits::Imperial), "72°");
        assert_eq!(format_temperature(-3.6, TemperatureUnits::Metric), "-4°");
    }

    #[test]
    fn test_format_temperature_never_shows_negative_zero() {
        assert_eq!(format_temperature(-0.4, TemperatureUnits::Metric), "0°");
        assert_eq!(format_temperature(-17.9, TemperatureUnits::Imperial), "0°");
    }

    #[test]
    fn test_condition_icon_name() {
        assert_eq!(condition_icon_name(211), Some("ic_storm"));
        assert_eq!(condition_icon_name(511), Some("ic_snow"));
        assert_eq!(condition_icon_name(761), Some("ic_storm"));
        assert_eq!(condition_icon_name(771), Some("ic_storm"));
        assert_eq!(condition_icon_name(741), Some("ic_fog"));
        assert_eq!(condition_icon_name(800), Some("ic_clear"));
        assert_eq!(condition_icon_name(803), Some("ic_cloudy"));
        assert_eq!(condition_icon_name(42), None);
    }

    #[test]
    fn test_snapshot_from_record() {
        let record = WeatherRecord {
            date_millis: 1_487_376_000_000,
            weather_id: 801,
            max_celsius: 22.2,
            min_celsius: 12.2,
        };
        let snapshot = WeatherSnapshot::from_record(&record, 5_000, TemperatureUnits::Imperial);

        assert_eq!(snapshot.timestamp_millis, 5_000);
        assert_eq!(snapshot.max_temperature, "72°");
        assert_eq!(snapshot.min_temperature, "54°");
        assert_eq!(snapshot.icon_name(), Some("ic_light_clouds"));
    }
}
