// Weather sync service - Phone-side use case that pushes the latest weather to the watch
use crate::application::clock::Clock;
use crate::application::sync_channel::SyncChannel;
use crate::application::weather_source::{IconSource, WeatherSource};
use crate::domain::payload::{Asset, AssetRef, DataItem, WeatherPayload};
use crate::domain::weather::{TemperatureUnits, WeatherRecord, WeatherSnapshot};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Published,
    /// Nothing stored yet, so nothing to send
    Skipped,
    Failed,
}

#[derive(Clone)]
pub struct WeatherSyncService {
    channel: Arc<dyn SyncChannel>,
    icons: Arc<dyn IconSource>,
    clock: Arc<dyn Clock>,
    data_path: String,
    units: TemperatureUnits,
}

impl WeatherSyncService {
    pub fn new(
        channel: Arc<dyn SyncChannel>,
        icons: Arc<dyn IconSource>,
        clock: Arc<dyn Clock>,
        data_path: String,
        units: TemperatureUnits,
    ) -> Self {
        Self {
            channel,
            icons,
            clock,
            data_path,
            units,
        }
    }

    pub async fn sync_latest(&self, source: &dyn WeatherSource) -> SyncOutcome {
        match source.latest_weather().await {
            Ok(Some(record)) => self.sync_record(&record).await,
            Ok(None) => {
                tracing::debug!("No weather stored yet, skipping sync");
                SyncOutcome::Skipped
            }
            Err(e) => {
                tracing::warn!("Failed to read latest weather: {:#}", e);
                SyncOutcome::Failed
            }
        }
    }

    /// Publish one record. Failures are logged; the next periodic sync supersedes them.
    pub async fn sync_record(&self, record: &WeatherRecord) -> SyncOutcome {
        let snapshot = WeatherSnapshot::from_record(record, self.clock.now_millis(), self.units);
        let icon = self.load_icon(&snapshot).await;

        let payload = WeatherPayload {
            timestamp_millis: snapshot.timestamp_millis,
            max_temperature: Some(snapshot.max_temperature.clone()),
            min_temperature: Some(snapshot.min_temperature.clone()),
            weather_icon: icon.as_ref().map(|asset| asset.reference.clone()),
        };
        let item = DataItem::new(self.data_path.clone(), payload.to_data_map());
        let assets = icon.into_iter().collect();

        match self.channel.put_data_item(item, assets).await {
            Ok(()) => {
                tracing::info!(
                    "Sent weather data item: {} / {}",
                    snapshot.max_temperature,
                    snapshot.min_temperature
                );
                SyncOutcome::Published
            }
            Err(e) => {
                tracing::warn!("Failed to send the weather data item: {}", e);
                SyncOutcome::Failed
            }
        }
    }

    async fn load_icon(&self, snapshot: &WeatherSnapshot) -> Option<Asset> {
        let name = snapshot.icon_name()?;
        match self.icons.load_icon(name).await {
            Ok(Some(data)) => Some(Asset::new(AssetRef::new(name), data)),
            Ok(None) => {
                tracing::warn!("No icon file for {}, sending without icon", name);
                None
            }
            Err(e) => {
                tracing::warn!("Failed to load icon {}: {:#}", name, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payload::{MAX_TEMP_KEY, WEATHER_ICON_KEY, WEATHER_PATH};
    use crate::infrastructure::configured_weather_source::ConfiguredWeatherSource;
    use crate::infrastructure::memory_channel::MemoryChannel;
    use async_trait::async_trait;
    use bytes::Bytes;
    use chrono::FixedOffset;
    use std::collections::HashMap;

    struct FixedClock(i64);

    impl Clock for FixedClock {
        fn now_millis(&self) -> i64 {
            self.0
        }

        fn utc_offset(&self) -> FixedOffset {
            FixedOffset::east_opt(0).unwrap()
        }
    }

    struct StaticIcons(HashMap<&'static str, Bytes>);

    #[async_trait]
    impl IconSource for StaticIcons {
        async fn load_icon(&self, name: &str) -> anyhow::Result<Option<Bytes>> {
            Ok(self.0.get(name).cloned())
        }
    }

    fn service(channel: Arc<MemoryChannel>, icons: StaticIcons) -> WeatherSyncService {
        WeatherSyncService::new(
            channel,
            Arc::new(icons),
            Arc::new(FixedClock(42_000)),
            WEATHER_PATH.to_string(),
            TemperatureUnits::Imperial,
        )
    }

    fn record(weather_id: i32) -> WeatherRecord {
        WeatherRecord {
            date_millis: 1_487_376_000_000,
            weather_id,
            max_celsius: 22.2,
            min_celsius: 12.2,
        }
    }

    #[tokio::test]
    async fn test_publishes_payload_with_icon() {
        let channel = Arc::new(MemoryChannel::new());
        let icons = StaticIcons(HashMap::from([("ic_clear", Bytes::from_static(b"sun"))]));
        let service = service(channel.clone(), icons);

        assert_eq!(service.sync_record(&record(800)).await, SyncOutcome::Published);

        let item = channel.latest(WEATHER_PATH).await.unwrap();
        let payload = WeatherPayload::from_data_map(&item.data).unwrap();
        assert_eq!(payload.timestamp_millis, 42_000);
        assert_eq!(payload.max_temperature.as_deref(), Some("72°"));
        assert_eq!(payload.min_temperature.as_deref(), Some("54°"));
        assert_eq!(payload.weather_icon, Some(AssetRef::new("ic_clear")));
        assert_eq!(
            channel.fetch_asset(&AssetRef::new("ic_clear")).await.unwrap(),
            Some(Bytes::from_static(b"sun"))
        );
    }

    #[tokio::test]
    async fn test_missing_icon_publishes_without_key() {
        let channel = Arc::new(MemoryChannel::new());
        let service = service(channel.clone(), StaticIcons(HashMap::new()));

        assert_eq!(service.sync_record(&record(500)).await, SyncOutcome::Published);

        let item = channel.latest(WEATHER_PATH).await.unwrap();
        assert!(item.data.contains_key(MAX_TEMP_KEY));
        assert!(!item.data.contains_key(WEATHER_ICON_KEY));
    }

    #[tokio::test]
    async fn test_publish_failure_is_reported_not_retried() {
        let channel = Arc::new(MemoryChannel::new());
        channel.set_connected(false);
        let service = service(channel.clone(), StaticIcons(HashMap::new()));

        assert_eq!(service.sync_record(&record(800)).await, SyncOutcome::Failed);

        channel.set_connected(true);
        assert_eq!(channel.latest(WEATHER_PATH).await, None);
    }

    #[tokio::test]
    async fn test_sync_latest_skips_without_record() {
        let channel = Arc::new(MemoryChannel::new());
        let service = service(channel.clone(), StaticIcons(HashMap::new()));
        let source = ConfiguredWeatherSource::new(None);

        assert_eq!(service.sync_latest(&source).await, SyncOutcome::Skipped);

        source.store(record(801)).await;
        assert_eq!(service.sync_latest(&source).await, SyncOutcome::Published);
    }
}
