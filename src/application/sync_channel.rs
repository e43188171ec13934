// Sync channel trait - Phone/watch data layer as seen by this application
use crate::domain::payload::{Asset, AssetRef, DataEvent, DataItem};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use thiserror::Error;

/// Batches of data events, delivered in the order the channel observed them
pub type DataEventStream = BoxStream<'static, Vec<DataEvent>>;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("sync channel is not connected")]
    Disconnected,
    #[error("sync channel rejected the request: {0}")]
    Rejected(String),
    #[error("timed out after {0:?} waiting for the sync channel")]
    Timeout(std::time::Duration),
    #[error("failed to encode data item")]
    Encoding(#[from] serde_json::Error),
}

#[async_trait]
pub trait SyncChannel: Send + Sync {
    /// Store `item` under its path and notify subscribers when it changed
    async fn put_data_item(&self, item: DataItem, assets: Vec<Asset>) -> Result<(), SyncError>;

    /// Start receiving change notifications for every path
    async fn subscribe(&self) -> Result<DataEventStream, SyncError>;

    /// Resolve an asset reference to its bytes; `None` when the channel does not know it
    async fn fetch_asset(&self, asset: &AssetRef) -> Result<Option<Bytes>, SyncError>;
}
