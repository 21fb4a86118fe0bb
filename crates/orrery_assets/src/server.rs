use std::sync::{Arc, OnceLock};
use std::time::Duration;

use orrery_core::AssetError;
use orrery_resources::{Resource, ResourceKind, ResourceRequest};
use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;

use crate::decode::decode_async;
use crate::io::{AssetReaderVariant, MemoryAssetReader};
use crate::pending::{PendingResource, ResolvedResources, await_all};

pub(crate) fn asset_runtime() -> &'static Runtime {
    static RUNTIME: OnceLock<Runtime> = OnceLock::new();
    RUNTIME.get_or_init(|| Runtime::new().expect("Failed to create asset loader runtime"))
}

/// Loader tuning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderSettings {
    /// Upper bound for one resource (read + decode). `None` waits forever.
    pub timeout: Option<Duration>,
}

/// Starts loads on the loader runtime and hands back [`PendingResource`]s.
///
/// Cheap to clone; clones share the reader.
#[derive(Clone)]
pub struct AssetServer {
    reader: AssetReaderVariant,
    settings: LoaderSettings,
}

impl AssetServer {
    #[must_use]
    pub fn new(reader: impl Into<AssetReaderVariant>) -> Self {
        Self {
            reader: reader.into(),
            settings: LoaderSettings::default(),
        }
    }

    /// A server reading from a directory or, with the `http` feature, a base URL.
    pub fn from_source(source: &str) -> Result<Self, AssetError> {
        Ok(Self::new(AssetReaderVariant::from_source(source)?))
    }

    /// A server over a fresh in-memory store, returned alongside the store.
    #[must_use]
    pub fn in_memory() -> (Self, MemoryAssetReader) {
        let reader = MemoryAssetReader::new();
        (Self::new(reader.clone()), reader)
    }

    #[must_use]
    pub fn with_settings(mut self, settings: LoaderSettings) -> Self {
        self.settings = settings;
        self
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &LoaderSettings {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub fn reader(&self) -> &AssetReaderVariant {
        &self.reader
    }

    /// Starts loading `path` as `kind` and returns immediately.
    pub fn load(&self, path: impl Into<String>, kind: ResourceKind) -> PendingResource {
        self.load_request(ResourceRequest::new(path, kind))
    }

    pub fn load_request(&self, request: ResourceRequest) -> PendingResource {
        log::debug!("Loading {} as {}", request.path, request.kind);
        let task = load_task(self.reader.clone(), request.clone(), self.settings.timeout);
        let handle = asset_runtime().spawn(task);
        PendingResource::new(request, handle)
    }

    /// Starts one load per distinct request.
    pub fn load_all<'a, I>(&self, requests: I) -> Vec<PendingResource>
    where
        I: IntoIterator<Item = &'a ResourceRequest>,
    {
        let mut seen: Vec<&ResourceRequest> = Vec::new();
        let mut pending = Vec::new();
        for request in requests {
            if seen.contains(&request) {
                continue;
            }
            seen.push(request);
            pending.push(self.load_request(request.clone()));
        }
        pending
    }

    /// Loads a request set and joins it.
    pub async fn load_set<'a, I>(&self, requests: I) -> Result<ResolvedResources, AssetError>
    where
        I: IntoIterator<Item = &'a ResourceRequest>,
    {
        await_all(self.load_all(requests)).await
    }

    /// Loads and joins a request set in the background.
    ///
    /// `on_complete` runs on the loader runtime with the joined result; it
    /// must only hand the data off (e.g. over a channel).
    pub fn load_set_detached<'a, I, F>(&self, requests: I, on_complete: F)
    where
        I: IntoIterator<Item = &'a ResourceRequest>,
        F: FnOnce(Result<ResolvedResources, AssetError>) + Send + 'static,
    {
        let pending = self.load_all(requests);
        asset_runtime().spawn(async move {
            on_complete(await_all(pending).await);
        });
    }
}

async fn load_task(
    reader: AssetReaderVariant,
    request: ResourceRequest,
    timeout: Option<Duration>,
) -> Result<Resource, AssetError> {
    let path = request.path.clone();
    let kind = request.kind;
    let load = load_resource(reader, request);

    let result = match timeout {
        Some(after) => tokio::time::timeout(after, load)
            .await
            .unwrap_or_else(|_| Err(AssetError::Timeout {
                path: path.clone(),
                after,
            })),
        None => load.await,
    };

    if let Err(err) = &result {
        log::warn!("Failed to load {path} as {kind}: {err}");
    }
    result
}

async fn load_resource(
    reader: AssetReaderVariant,
    request: ResourceRequest,
) -> Result<Resource, AssetError> {
    let bytes = reader.read_bytes(&request.path).await?;
    let image = decode_async(bytes, request.kind, request.path.clone()).await?;
    Ok(Resource {
        path: request.path,
        kind: request.kind,
        image: Arc::new(image),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, Rgba, RgbaImage};
    use orrery_resources::ColorSpace;

    use super::*;

    fn png() -> Vec<u8> {
        let img = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 255]));
        let mut bytes = Cursor::new(Vec::new());
        img.write_to(&mut bytes, ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn load_resolves_to_decoded_resource() {
        let (server, store) = AssetServer::in_memory();
        store.insert("map.png", png());

        let resource =
            pollster::block_on(server.load("map.png", ResourceKind::Texture(ColorSpace::Srgb)))
                .unwrap();
        assert_eq!(resource.path, "map.png");
        assert_eq!(resource.image.width, 2);
    }

    #[test]
    fn duplicate_requests_load_once() {
        let (server, store) = AssetServer::in_memory();
        store.insert("map.png", png());
        let request = ResourceRequest::texture("map.png", ColorSpace::Srgb);

        let pending = server.load_all([&request, &request]);
        assert_eq!(pending.len(), 1);
        let resolved = pollster::block_on(await_all(pending)).unwrap();
        assert_eq!(resolved.len(), 1);
        assert!(resolved.get(&request).is_some());
    }

    #[test]
    fn slow_loads_time_out() {
        let (server, store) = AssetServer::in_memory();
        store.insert("slow.png", png());
        store.set_latency("slow.png", Duration::from_secs(5));
        let server = server.with_settings(LoaderSettings {
            timeout: Some(Duration::from_millis(20)),
        });

        let err = pollster::block_on(server.load("slow.png", ResourceKind::EnvironmentMap))
            .unwrap_err();
        assert!(matches!(err, AssetError::Timeout { ref path, .. } if path == "slow.png"));
    }

    #[test]
    fn empty_set_resolves_immediately() {
        let (server, _) = AssetServer::in_memory();
        let none: [ResourceRequest; 0] = [];
        let resolved = pollster::block_on(server.load_set(&none)).unwrap();
        assert!(resolved.is_empty());
    }
}
