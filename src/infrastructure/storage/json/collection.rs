//! One JSON document holding a named array of records
//!
//! The document shape is `{"<key>": [ ... ]}`. Every access takes the
//! collection's async mutex, so a read-modify-write is never interleaved
//! with another writer of the same file.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::DomainResult;
use crate::shared::InfraError;

pub struct JsonCollection<T> {
    path: PathBuf,
    key: &'static str,
    lock: Mutex<()>,
    _records: PhantomData<fn() -> T>,
}

impl<T> JsonCollection<T>
where
    T: Serialize + DeserializeOwned + Send,
{
    pub fn new(path: impl Into<PathBuf>, key: &'static str) -> Self {
        Self {
            path: path.into(),
            key,
            lock: Mutex::new(()),
            _records: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of all records
    pub async fn read(&self) -> DomainResult<Vec<T>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?)
    }

    /// Run `change` on a freshly loaded copy and persist it when it succeeds.
    /// On error the file is left as it was.
    pub async fn update<R, F>(&self, change: F) -> DomainResult<R>
    where
        F: FnOnce(&mut Vec<T>) -> DomainResult<R> + Send,
    {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        let result = change(&mut records)?;
        self.save(&records).await?;
        Ok(result)
    }

    async fn load(&self) -> Result<Vec<T>, InfraError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        let mut document: Map<String, Value> = serde_json::from_slice(&bytes)?;
        match document.remove(self.key) {
            Some(items) => Ok(serde_json::from_value(items)?),
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, records: &[T]) -> Result<(), InfraError> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        let mut document = Map::new();
        document.insert(self.key.to_string(), serde_json::to_value(records)?);
        let body = serde_json::to_vec_pretty(&Value::Object(document))?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), records = records.len(), "Collection written");
        Ok(())
    }
}
