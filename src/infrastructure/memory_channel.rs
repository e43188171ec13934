// In-process sync channel - Stands in for the paired-device data layer
use crate::application::sync_channel::{DataEventStream, SyncChannel, SyncError};
use crate::domain::payload::{Asset, AssetRef, DataEvent, DataEventKind, DataItem};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{broadcast, Mutex};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

const EVENT_CAPACITY: usize = 64;

/// Keeps the latest encoded item per path and fans change batches out to subscribers.
/// Items travel as JSON bytes so both ends only share the wire format.
pub struct MemoryChannel {
    items: Mutex<HashMap<String, Bytes>>,
    assets: Mutex<HashMap<AssetRef, Bytes>>,
    events: broadcast::Sender<Bytes>,
    connected: AtomicBool,
}

impl MemoryChannel {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            items: Mutex::new(HashMap::new()),
            assets: Mutex::new(HashMap::new()),
            events,
            connected: AtomicBool::new(true),
        }
    }

    /// Simulate the peer going away (or coming back)
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub async fn latest(&self, path: &str) -> Option<DataItem> {
        let items = self.items.lock().await;
        let encoded = items.get(path)?;
        serde_json::from_slice(encoded).ok()
    }

    pub async fn delete_data_item(&self, path: &str) -> Result<bool, SyncError> {
        self.ensure_connected()?;
        let removed = self.items.lock().await.remove(path);
        let Some(encoded) = removed else {
            return Ok(false);
        };
        let item: DataItem = serde_json::from_slice(&encoded)?;
        self.broadcast(vec![DataEvent {
            kind: DataEventKind::Deleted,
            item,
        }])?;
        Ok(true)
    }

    fn ensure_connected(&self) -> Result<(), SyncError> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(SyncError::Disconnected)
        }
    }

    fn broadcast(&self, batch: Vec<DataEvent>) -> Result<(), SyncError> {
        let encoded = Bytes::from(serde_json::to_vec(&batch)?);
        // No subscribers is not an error; the item is still stored.
        let delivered = self.events.send(encoded).unwrap_or(0);
        tracing::debug!("Broadcast {} data event(s) to {} subscriber(s)", batch.len(), delivered);
        Ok(())
    }
}

impl Default for MemoryChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SyncChannel for MemoryChannel {
    async fn put_data_item(&self, item: DataItem, assets: Vec<Asset>) -> Result<(), SyncError> {
        self.ensure_connected()?;
        if !item.path.starts_with('/') {
            return Err(SyncError::Rejected(format!("path `{}` must start with '/'", item.path)));
        }

        {
            let mut stored = self.assets.lock().await;
            for asset in assets {
                stored.insert(asset.reference, asset.data);
            }
        }

        let encoded = Bytes::from(serde_json::to_vec(&item)?);
        {
            let mut items = self.items.lock().await;
            if items.get(&item.path) == Some(&encoded) {
                tracing::debug!("Data item {} unchanged, no event", item.path);
                return Ok(());
            }
            items.insert(item.path.clone(), encoded);
        }

        self.broadcast(vec![DataEvent {
            kind: DataEventKind::Changed,
            item,
        }])
    }

    async fn subscribe(&self) -> Result<DataEventStream, SyncError> {
        self.ensure_connected()?;
        let stream = BroadcastStream::new(self.events.subscribe()).filter_map(|message| async move {
            match message {
                Ok(encoded) => match serde_json::from_slice::<Vec<DataEvent>>(&encoded) {
                    Ok(batch) => Some(batch),
                    Err(e) => {
                        tracing::warn!("Dropping undecodable data event batch: {}", e);
                        None
                    }
                },
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    tracing::warn!("Subscriber lagged, {} data event batch(es) skipped", skipped);
                    None
                }
            }
        });
        Ok(stream.boxed())
    }

    async fn fetch_asset(&self, asset: &AssetRef) -> Result<Option<Bytes>, SyncError> {
        self.ensure_connected()?;
        Ok(self.assets.lock().await.get(asset).cloned())
    }
}
