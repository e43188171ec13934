// Weather source fed from configuration
use crate::application::weather_source::WeatherSource;
use crate::domain::weather::WeatherRecord;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Holds the latest record in memory; the phone app would read its database instead.
#[derive(Debug, Default)]
pub struct ConfiguredWeatherSource {
    latest: RwLock<Option<WeatherRecord>>,
}

impl ConfiguredWeatherSource {
    pub fn new(initial: Option<WeatherRecord>) -> Self {
        Self {
            latest: RwLock::new(initial),
        }
    }

    pub async fn store(&self, record: WeatherRecord) {
        *self.latest.write().await = Some(record);
    }
}

#[async_trait]
impl WeatherSource for ConfiguredWeatherSource {
    async fn latest_weather(&self) -> anyhow::Result<Option<WeatherRecord>> {
        Ok(self.latest.read().await.clone())
    }
}
