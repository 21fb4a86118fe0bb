use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use orrery_core::AssetError;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Byte source for the loader.
///
/// Readers only fetch bytes; decoding happens afterwards on the blocking pool.
pub trait AssetReader: Send + Sync {
    fn read_bytes(&self, uri: &str) -> impl Future<Output = Result<Vec<u8>, AssetError>> + Send;
}

/// Reads files relative to a root directory.
#[derive(Debug)]
pub struct FileAssetReader {
    root_path: PathBuf,
}

impl FileAssetReader {
    /// `path` may be a directory or a file; a file roots the reader at its parent.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let root_path = if path.is_file() {
            path.parent().unwrap_or(Path::new(".")).to_path_buf()
        } else {
            path.to_path_buf()
        };
        Self { root_path }
    }

    #[inline]
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }
}

impl AssetReader for FileAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>, AssetError> {
        let path = self.root_path.join(uri.trim_start_matches('/'));
        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => AssetError::NotFound(uri.to_string()),
            _ => AssetError::Io {
                path: uri.to_string(),
                message: e.to_string(),
            },
        })
    }
}

#[derive(Default)]
struct MemoryEntries {
    blobs: FxHashMap<String, Arc<[u8]>>,
    latency: FxHashMap<String, Duration>,
}

/// In-process blob store, for embedded assets and tests.
///
/// Clones share the same store, so blobs can be registered after the reader
/// has been handed to an [`AssetServer`](crate::AssetServer).
#[derive(Clone, Default)]
pub struct MemoryAssetReader {
    entries: Arc<RwLock<MemoryEntries>>,
}

impl MemoryAssetReader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<String>, bytes: impl Into<Arc<[u8]>>) {
        self.entries.write().blobs.insert(path.into(), bytes.into());
    }

    /// Delays every read of `path`, simulating a slow source.
    pub fn set_latency(&self, path: impl Into<String>, latency: Duration) {
        self.entries.write().latency.insert(path.into(), latency);
    }
}

impl AssetReader for MemoryAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>, AssetError> {
        let latency = self.entries.read().latency.get(uri).copied();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        self.entries
            .read()
            .blobs
            .get(uri)
            .map(|bytes| bytes.to_vec())
            .ok_or_else(|| AssetError::NotFound(uri.to_string()))
    }
}

/// Fetches assets relative to a base URL.
#[cfg(feature = "http")]
#[derive(Debug)]
pub struct HttpAssetReader {
    root_url: url::Url,
}

#[cfg(feature = "http")]
impl HttpAssetReader {
    pub fn new(url_str: &str) -> Result<Self, AssetError> {
        let url = url::Url::parse(url_str)
            .map_err(|e| AssetError::UnsupportedSource(format!("{url_str}: {e}")))?;
        let root_url = if url.path().ends_with('/') {
            url
        } else {
            let mut u = url.clone();
            if let Ok(mut segments) = u.path_segments_mut() {
                segments.pop();
                segments.push("");
            }
            u
        };
        Ok(Self { root_url })
    }

    #[inline]
    #[must_use]
    pub fn root_url(&self) -> &url::Url {
        &self.root_url
    }
}

#[cfg(feature = "http")]
impl AssetReader for HttpAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>, AssetError> {
        let url = self
            .root_url
            .join(uri.trim_start_matches('/'))
            .map_err(|e| AssetError::UnsupportedSource(format!("{uri}: {e}")))?;

        let response = ehttp::fetch_async(ehttp::Request::get(url.as_str()))
            .await
            .map_err(|message| AssetError::Io {
                path: url.to_string(),
                message,
            })?;

        if !response.ok {
            return Err(AssetError::Http {
                url: url.to_string(),
                status: response.status,
            });
        }
        Ok(response.bytes)
    }
}

/// Static dispatch over the compiled-in readers.
#[derive(Clone)]
pub enum AssetReaderVariant {
    File(Arc<FileAssetReader>),
    Memory(MemoryAssetReader),
    #[cfg(feature = "http")]
    Http(Arc<HttpAssetReader>),
}

impl AssetReaderVariant {
    /// Picks a reader from the shape of `source`: `http(s)://` URLs use the
    /// HTTP reader, anything else is a file system root.
    pub fn from_source(source: &str) -> Result<Self, AssetError> {
        if source.starts_with("http://") || source.starts_with("https://") {
            #[cfg(feature = "http")]
            {
                Ok(Self::Http(Arc::new(HttpAssetReader::new(source)?)))
            }
            #[cfg(not(feature = "http"))]
            {
                Err(AssetError::UnsupportedSource(format!(
                    "{source} (enable the `http` feature)"
                )))
            }
        } else {
            Ok(Self::File(Arc::new(FileAssetReader::new(source))))
        }
    }

    pub async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>, AssetError> {
        match self {
            Self::File(r) => r.read_bytes(uri).await,
            Self::Memory(r) => r.read_bytes(uri).await,
            #[cfg(feature = "http")]
            Self::Http(r) => r.read_bytes(uri).await,
        }
    }
}

impl From<MemoryAssetReader> for AssetReaderVariant {
    fn from(reader: MemoryAssetReader) -> Self {
        Self::Memory(reader)
    }
}

impl From<FileAssetReader> for AssetReaderVariant {
    fn from(reader: FileAssetReader) -> Self {
        Self::File(Arc::new(reader))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_reader_serves_registered_blobs() {
        let reader = MemoryAssetReader::new();
        reader.insert("a.bin", vec![1u8, 2, 3]);
        let shared = reader.clone();

        let bytes = pollster::block_on(shared.read_bytes("a.bin")).unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
        assert_eq!(
            pollster::block_on(shared.read_bytes("b.bin")),
            Err(AssetError::NotFound("b.bin".into()))
        );
    }

    #[test]
    fn missing_file_maps_to_not_found() {
        let reader = FileAssetReader::new(std::env::temp_dir());
        let result = pollster::block_on(async {
            // tokio::fs needs a runtime context.
            crate::server::asset_runtime()
                .spawn(async move { reader.read_bytes("orrery-does-not-exist.png").await })
                .await
        })
        .unwrap();
        assert_eq!(
            result,
            Err(AssetError::NotFound("orrery-does-not-exist.png".into()))
        );
    }

    #[cfg(not(feature = "http"))]
    #[test]
    fn urls_need_the_http_feature() {
        assert!(matches!(
            AssetReaderVariant::from_source("https://example.org/textures/"),
            Err(AssetError::UnsupportedSource(_))
        ));
    }
}
