//! CPU-side resource definitions.
//!
//! Nothing in this crate touches the GPU: images are decoded pixel buffers,
//! geometries are parameter sets and materials are descriptors bound to
//! decoded images.

pub mod geometry;
pub mod image;
pub mod material;
pub mod resource;

pub use geometry::{CylinderOptions, Geometry, SphereOptions};
pub use image::Image;
pub use material::{
    PhysicalMaterial, PhysicalMaterialDescriptor, PhysicalParams, Side, TextureChannel,
    parse_hex_color, srgb_to_linear,
};
pub use resource::{ColorSpace, Resource, ResourceKind, ResourceRequest};
