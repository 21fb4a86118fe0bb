//! Geometry descriptors
//!
//! Only the parameters are kept here; tessellation belongs to the render
//! backend. Validation mirrors the minimums a tessellator needs.

use orrery_core::ConfigError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SphereOptions {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl Default for SphereOptions {
    fn default() -> Self {
        Self {
            radius: 1.0,
            width_segments: 32,
            height_segments: 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CylinderOptions {
    pub radius_top: f32,
    pub radius_bottom: f32,
    pub height: f32,
    pub radial_segments: u32,
    pub open_ended: bool,
}

impl Default for CylinderOptions {
    fn default() -> Self {
        Self {
            radius_top: 1.0,
            radius_bottom: 1.0,
            height: 1.0,
            radial_segments: 32,
            open_ended: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Sphere(SphereOptions),
    Cylinder(CylinderOptions),
    Plane { width: f32, height: f32 },
    Box { width: f32, height: f32, depth: f32 },
}

impl Geometry {
    #[must_use]
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        Self::Sphere(SphereOptions {
            radius,
            width_segments,
            height_segments,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Self::Sphere(s) => {
                positive("sphere.radius", s.radius)?;
                min_segments("sphere.width_segments", s.width_segments, 3)?;
                min_segments("sphere.height_segments", s.height_segments, 2)
            }
            Self::Cylinder(c) => {
                if c.radius_top < 0.0 {
                    return Err(ConfigError::out_of_range(
                        "cylinder.radius_top",
                        c.radius_top,
                        ">= 0",
                    ));
                }
                if c.radius_bottom < 0.0 {
                    return Err(ConfigError::out_of_range(
                        "cylinder.radius_bottom",
                        c.radius_bottom,
                        ">= 0",
                    ));
                }
                if c.radius_top == 0.0 && c.radius_bottom == 0.0 {
                    return Err(ConfigError::invalid("cylinder", "both radii are zero"));
                }
                positive("cylinder.height", c.height)?;
                min_segments("cylinder.radial_segments", c.radial_segments, 3)
            }
            Self::Plane { width, height } => {
                positive("plane.width", width)?;
                positive("plane.height", height)
            }
            Self::Box { width, height, depth } => {
                positive("box.width", width)?;
                positive("box.height", height)?;
                positive("box.depth", depth)
            }
        }
    }

    /// Number of vertices a standard UV tessellation of this shape produces.
    #[must_use]
    pub fn vertex_count(&self) -> u32 {
        match *self {
            Self::Sphere(s) => (s.width_segments.max(3) + 1) * (s.height_segments.max(2) + 1),
            Self::Cylinder(c) => {
                let segs = c.radial_segments.max(3);
                let torso = (segs + 1) * 2;
                // Each cap: a centre vertex per segment plus the rim ring.
                let caps = if c.open_ended { 0 } else { 2 * (segs + segs + 1) };
                torso + caps
            }
            Self::Plane { .. } => 4,
            Self::Box { .. } => 24,
        }
    }
}

fn positive(field: &str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::out_of_range(field, value, "> 0"))
    }
}

fn min_segments(field: &str, value: u32, min: u32) -> Result<(), ConfigError> {
    if value >= min {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("needs at least {min} segments, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_vertex_count_matches_uv_grid() {
        let geo = Geometry::sphere(10.0, 70, 70);
        assert_eq!(geo.vertex_count(), 71 * 71);
        assert!(geo.validate().is_ok());
    }

    #[test]
    fn degenerate_shapes_are_rejected() {
        assert!(Geometry::sphere(0.0, 32, 16).validate().is_err());
        assert!(Geometry::sphere(1.0, 2, 16).validate().is_err());
        assert!(
            Geometry::Cylinder(CylinderOptions {
                radius_top: 0.0,
                radius_bottom: 0.0,
                ..Default::default()
            })
            .validate()
            .is_err()
        );
    }
}
