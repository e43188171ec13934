// Source traits for the producer side
use crate::domain::weather::WeatherRecord;
use async_trait::async_trait;
use bytes::Bytes;

#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Latest persisted weather record, if any has been stored yet
    async fn latest_weather(&self) -> anyhow::Result<Option<WeatherRecord>>;
}

#[async_trait]
pub trait IconSource: Send + Sync {
    /// Raw image bytes for a condition icon name such as `ic_rain`
    async fn load_icon(&self, name: &str) -> anyhow::Result<Option<Bytes>>;
}
