use bitflags::bitflags;
use orrery_resources::{Geometry, PhysicalMaterial};

bitflags! {
    /// Shadow participation of a mesh.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ShadowFlags: u8 {
        const CAST    = 1 << 0;
        const RECEIVE = 1 << 1;
    }
}

/// Renderable component: a geometry drawn with a fully resolved material.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub geometry: Geometry,
    pub material: PhysicalMaterial,
    pub shadows: ShadowFlags,
}

impl Mesh {
    #[must_use]
    pub fn new(geometry: Geometry, material: PhysicalMaterial) -> Self {
        Self {
            geometry,
            material,
            shadows: ShadowFlags::empty(),
        }
    }

    #[must_use]
    pub fn with_shadows(mut self, shadows: ShadowFlags) -> Self {
        self.shadows = shadows;
        self
    }

    #[inline]
    #[must_use]
    pub fn receives_shadows(&self) -> bool {
        self.shadows.contains(ShadowFlags::RECEIVE)
    }

    #[inline]
    #[must_use]
    pub fn casts_shadows(&self) -> bool {
        self.shadows.contains(ShadowFlags::CAST)
    }
}
