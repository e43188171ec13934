// Icon files on disk - Condition icons looked up by name under an assets directory
use crate::application::weather_source::IconSource;
use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct FileIconSource {
    dir: PathBuf,
}

impl FileIconSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.png", name))
    }
}

#[async_trait]
impl IconSource for FileIconSource {
    async fn load_icon(&self, name: &str) -> anyhow::Result<Option<Bytes>> {
        let path = self.path_for(name);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read icon {}", path.display())),
        }
    }
}
