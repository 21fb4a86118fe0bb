//! Asynchronous resource loading.
//!
//! [`AssetServer::load`] spawns the read and decode of one resource on a
//! dedicated tokio runtime and returns a [`PendingResource`] right away.
//! [`await_all`] joins a set of them: it resolves once every load has
//! succeeded, or with the first failure.
//!
//! ```rust,ignore
//! let server = AssetServer::from_source("assets/")?;
//! let resolved = await_all([
//!     server.load("earth_map.jpg", ResourceKind::Texture(ColorSpace::Srgb)),
//!     server.load("envmap.hdr", ResourceKind::EnvironmentMap),
//! ])
//! .await?;
//! ```

pub mod decode;
pub mod io;
pub mod pending;
pub mod server;

#[cfg(feature = "http")]
pub use io::HttpAssetReader;
pub use io::{AssetReader, AssetReaderVariant, FileAssetReader, MemoryAssetReader};
pub use pending::{PendingResource, ResolvedResources, await_all};
pub use server::{AssetServer, LoaderSettings};
