use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use orrery_core::AssetError;
use orrery_resources::{Image, Resource, ResourceRequest};
use rustc_hash::FxHashMap;
use tokio::task::JoinHandle;

/// An in-flight load.
///
/// Resolves exactly once to the decoded [`Resource`]. Dropping it before
/// completion cancels the underlying task.
#[must_use = "dropping a PendingResource cancels the load"]
pub struct PendingResource {
    request: ResourceRequest,
    handle: JoinHandle<Result<Resource, AssetError>>,
}

impl PendingResource {
    pub(crate) fn new(
        request: ResourceRequest,
        handle: JoinHandle<Result<Resource, AssetError>>,
    ) -> Self {
        Self { request, handle }
    }

    #[inline]
    pub fn request(&self) -> &ResourceRequest {
        &self.request
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.request.path
    }

    /// Whether the load task has finished (successfully or not).
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Future for PendingResource {
    type Output = Result<Resource, AssetError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let polled = Pin::new(&mut self.handle).poll(cx);
        match polled {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => {
                Poll::Ready(Err(AssetError::Cancelled(self.request.path.clone())))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for PendingResource {
    fn drop(&mut self) {
        if !self.handle.is_finished() {
            log::debug!("Cancelling load of {}", self.request.path);
            self.handle.abort();
        }
    }
}

/// Decoded resources of one joined request set, keyed by request.
#[derive(Debug, Clone, Default)]
pub struct ResolvedResources {
    resources: FxHashMap<ResourceRequest, Resource>,
}

impl ResolvedResources {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, resource: Resource) {
        let request = ResourceRequest::new(resource.path.clone(), resource.kind);
        self.resources.insert(request, resource);
    }

    #[must_use]
    pub fn get(&self, request: &ResourceRequest) -> Option<&Resource> {
        self.resources.get(request)
    }

    /// First resource loaded from `path`, whatever its kind.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&Resource> {
        self.resources.values().find(|r| r.path == path)
    }

    /// Shared image of a request, in the shape material resolution expects.
    #[must_use]
    pub fn image(&self, request: &ResourceRequest) -> Option<Arc<Image>> {
        self.resources.get(request).map(|r| r.image.clone())
    }

    pub fn take(&mut self, request: &ResourceRequest) -> Option<Resource> {
        self.resources.remove(request)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResourceRequest, &Resource)> {
        self.resources.iter()
    }
}

/// Waits for every pending load of a set.
///
/// Resolves once all loads succeed, or with the first error. On error the
/// loads still in flight are cancelled and whatever already resolved is
/// dropped. An empty set resolves immediately.
pub async fn await_all<I>(pending: I) -> Result<ResolvedResources, AssetError>
where
    I: IntoIterator<Item = PendingResource>,
{
    let resources = futures::future::try_join_all(pending).await?;
    let mut resolved = ResolvedResources::new();
    for resource in resources {
        resolved.insert(resource);
    }
    Ok(resolved)
}
