// Sync payload - Key/value map exchanged between phone and watch
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub const WEATHER_PATH: &str = "/weather-info";
pub const TIMESTAMP_KEY: &str = "current_time";
pub const MAX_TEMP_KEY: &str = "max_temp";
pub const MIN_TEMP_KEY: &str = "min_temp";
pub const WEATHER_ICON_KEY: &str = "weather_icon";

#[derive(Debug, Error, PartialEq)]
pub enum PayloadError {
    #[error("missing key `{0}`")]
    MissingKey(String),
    #[error("key `{key}` holds {found}, expected {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Opaque handle to a binary attachment carried by the channel
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRef(String);

impl AssetRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Attachment bytes published alongside a data item
#[derive(Debug, Clone)]
pub struct Asset {
    pub reference: AssetRef,
    pub data: Bytes,
}

impl Asset {
    pub fn new(reference: AssetRef, data: Bytes) -> Self {
        Self { reference, data }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DataValue {
    Long(i64),
    Int(i32),
    Double(f64),
    Text(String),
    Asset(AssetRef),
}

impl DataValue {
    fn kind(&self) -> &'static str {
        match self {
            DataValue::Long(_) => "long",
            DataValue::Int(_) => "int",
            DataValue::Double(_) => "double",
            DataValue::Text(_) => "text",
            DataValue::Asset(_) => "asset",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataMap {
    entries: BTreeMap<String, DataValue>,
}

impl DataMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_long(&mut self, key: &str, value: i64) {
        self.entries.insert(key.to_string(), DataValue::Long(value));
    }

    pub fn put_int(&mut self, key: &str, value: i32) {
        self.entries.insert(key.to_string(), DataValue::Int(value));
    }

    pub fn put_double(&mut self, key: &str, value: f64) {
        self.entries.insert(key.to_string(), DataValue::Double(value));
    }

    pub fn put_string(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(key.to_string(), DataValue::Text(value.into()));
    }

    pub fn put_asset(&mut self, key: &str, value: AssetRef) {
        self.entries.insert(key.to_string(), DataValue::Asset(value));
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get_long(&self, key: &str) -> Result<i64, PayloadError> {
        match self.lookup(key)? {
            DataValue::Long(v) => Ok(*v),
            DataValue::Int(v) => Ok(i64::from(*v)),
            other => Err(mismatch(key, "long", other)),
        }
    }

    pub fn get_int(&self, key: &str) -> Result<i32, PayloadError> {
        match self.lookup(key)? {
            DataValue::Int(v) => Ok(*v),
            other => Err(mismatch(key, "int", other)),
        }
    }

    pub fn get_double(&self, key: &str) -> Result<f64, PayloadError> {
        match self.lookup(key)? {
            DataValue::Double(v) => Ok(*v),
            other => Err(mismatch(key, "double", other)),
        }
    }

    pub fn get_string(&self, key: &str) -> Result<&str, PayloadError> {
        match self.lookup(key)? {
            DataValue::Text(v) => Ok(v),
            other => Err(mismatch(key, "text", other)),
        }
    }

    pub fn get_asset(&self, key: &str) -> Result<&AssetRef, PayloadError> {
        match self.lookup(key)? {
            DataValue::Asset(v) => Ok(v),
            other => Err(mismatch(key, "asset", other)),
        }
    }

    fn lookup(&self, key: &str) -> Result<&DataValue, PayloadError> {
        self.entries
            .get(key)
            .ok_or_else(|| PayloadError::MissingKey(key.to_string()))
    }
}

fn mismatch(key: &str, expected: &'static str, found: &DataValue) -> PayloadError {
    PayloadError::TypeMismatch {
        key: key.to_string(),
        expected,
        found: found.kind(),
    }
}

/// A data map addressed by path on the sync channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataItem {
    pub path: String,
    pub data: DataMap,
}

impl DataItem {
    pub fn new(path: impl Into<String>, data: DataMap) -> Self {
        Self {
            path: path.into(),
            data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataEventKind {
    Changed,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataEvent {
    pub kind: DataEventKind,
    pub item: DataItem,
}

/// Typed view of the `/weather-info` map
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherPayload {
    pub timestamp_millis: i64,
    pub max_temperature: Option<String>,
    pub min_temperature: Option<String>,
    pub weather_icon: Option<AssetRef>,
}

impl WeatherPayload {
    pub fn to_data_map(&self) -> DataMap {
        let mut map = DataMap::new();
        map.put_long(TIMESTAMP_KEY, self.timestamp_millis);
        if let Some(max) = &self.max_temperature {
            map.put_string(MAX_TEMP_KEY, max.clone());
        }
        if let Some(min) = &self.min_temperature {
            map.put_string(MIN_TEMP_KEY, min.clone());
        }
        if let Some(icon) = &self.weather_icon {
            map.put_asset(WEATHER_ICON_KEY, icon.clone());
        }
        map
    }

    /// Absent optional keys decode to `None`; a key of the wrong type is an error.
    pub fn from_data_map(map: &DataMap) -> Result<Self, PayloadError> {
        Ok(Self {
            timestamp_millis: optional(map.get_long(TIMESTAMP_KEY))?.unwrap_or_default(),
            max_temperature: optional(map.get_string(MAX_TEMP_KEY))?.map(str::to_string),
            min_temperature: optional(map.get_string(MIN_TEMP_KEY))?.map(str::to_string),
            weather_icon: optional(map.get_asset(WEATHER_ICON_KEY))?.cloned(),
        })
    }
}

fn optional<T>(result: Result<T, PayloadError>) -> Result<Option<T>, PayloadError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(PayloadError::MissingKey(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_payload_keys() {
        let payload = WeatherPayload {
            timestamp_millis: 1_000,
            max_temperature: Some("72°".to_string()),
            min_temperature: Some("54°".to_string()),
            weather_icon: Some(AssetRef::new("ic_clear")),
        };
        let map = payload.to_data_map();

        assert_eq!(map.get_long(TIMESTAMP_KEY), Ok(1_000));
        assert_eq!(map.get_string(MAX_TEMP_KEY), Ok("72°"));
        assert_eq!(map.get_string(MIN_TEMP_KEY), Ok("54°"));
        assert_eq!(map.get_asset(WEATHER_ICON_KEY), Ok(&AssetRef::new("ic_clear")));
        assert_eq!(WeatherPayload::from_data_map(&map), Ok(payload));
    }

    #[test]
    fn test_missing_icon_decodes_to_none() {
        let mut map = DataMap::new();
        map.put_long(TIMESTAMP_KEY, 61_000);
        map.put_string(MAX_TEMP_KEY, "70°");
        map.put_string(MIN_TEMP_KEY, "50°");

        let payload = WeatherPayload::from_data_map(&map).unwrap();
        assert_eq!(payload.max_temperature.as_deref(), Some("70°"));
        assert_eq!(payload.weather_icon, None);
    }

    #[test]
    fn test_type_mismatch_is_reported() {
        let mut map = DataMap::new();
        map.put_double(MAX_TEMP_KEY, 21.5);

        let err = WeatherPayload::from_data_map(&map).unwrap_err();
        assert_eq!(
            err,
            PayloadError::TypeMismatch {
                key: MAX_TEMP_KEY.to_string(),
                expected: "text",
                found: "double",
            }
        );
        assert_eq!(
            map.get_int("weatherId"),
            Err(PayloadError::MissingKey("weatherId".to_string()))
        );
    }

    #[test]
    fn test_int_widens_to_long() {
        let mut map = DataMap::new();
        map.put_int(TIMESTAMP_KEY, 7);
        assert_eq!(map.get_long(TIMESTAMP_KEY), Ok(7));
        assert!(map.get_int(TIMESTAMP_KEY).is_ok());
    }
}
