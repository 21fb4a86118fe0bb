use glam::Vec3;
use orrery_core::DrawError;
use orrery_scene::{NodeHandle, Scene};

use crate::backend::{RenderBackend, SurfaceSize, background_color};
use crate::settings::RendererSettings;

/// What one headless draw saw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub frame: u64,
    pub camera: NodeHandle,
    pub camera_position: Vec3,
    pub aspect: f32,
    pub surface: SurfaceSize,
    /// Visible meshes.
    pub meshes: usize,
    /// Vertices of the visible meshes' tessellated geometry.
    pub vertices: u64,
    /// Visible meshes drawn into shadow maps; zero with shadows disabled.
    pub shadow_casters: usize,
    pub lights: usize,
    /// MSAA samples per pixel implied by the settings.
    pub samples: u32,
    /// Output color after exposure and tone mapping.
    pub clear_color: Vec3,
}

/// Backend without a GPU.
///
/// Counts and records draws, and can be armed to fail the next one.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    settings: RendererSettings,
    size: SurfaceSize,
    draws: u64,
    resizes: u64,
    records: Vec<DrawRecord>,
    pending_failure: Option<DrawError>,
}

impl HeadlessRenderer {
    #[must_use]
    pub fn new(settings: RendererSettings, size: SurfaceSize) -> Self {
        Self {
            settings,
            size,
            ..Self::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn draw_count(&self) -> u64 {
        self.draws
    }

    /// Number of resizes that actually changed the surface.
    #[inline]
    #[must_use]
    pub fn resize_count(&self) -> u64 {
        self.resizes
    }

    #[must_use]
    pub fn records(&self) -> &[DrawRecord] {
        &self.records
    }

    #[must_use]
    pub fn last_record(&self) -> Option<&DrawRecord> {
        self.records.last()
    }

    /// Makes the next `render` call fail with `error`.
    pub fn fail_next_draw(&mut self, error: DrawError) {
        self.pending_failure = Some(error);
    }
}

impl RenderBackend for HeadlessRenderer {
    fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    fn resize(&mut self, size: SurfaceSize) {
        if size.is_empty() || size == self.size {
            return;
        }
        self.size = size;
        self.resizes += 1;
    }

    fn surface_size(&self) -> SurfaceSize {
        self.size
    }

    fn render(&mut self, scene: &Scene, camera: NodeHandle) -> Result<(), DrawError> {
        if let Some(error) = self.pending_failure.take() {
            return Err(error);
        }

        let (camera_position, aspect) = scene
            .get_node(camera)
            .and_then(|node| {
                let camera = node.as_camera()?;
                Some((node.transform.world_position(), camera.aspect))
            })
            .ok_or(DrawError::NoActiveCamera)?;

        let stats = scene.stats();
        let visible: Vec<_> = scene
            .iter()
            .filter(|(_, node)| node.visible)
            .filter_map(|(_, node)| node.as_mesh())
            .collect();
        let shadow_casters = if self.settings.shadows.enabled {
            visible.iter().filter(|mesh| mesh.casts_shadows()).count()
        } else {
            0
        };
        self.draws += 1;
        self.records.push(DrawRecord {
            frame: self.draws,
            camera,
            camera_position,
            aspect,
            surface: self.size,
            meshes: visible.len(),
            vertices: visible
                .iter()
                .map(|mesh| u64::from(mesh.geometry.vertex_count()))
                .sum(),
            shadow_casters,
            lights: stats.lights,
            samples: self.settings.msaa_samples(),
            clear_color: self.settings.output_color(background_color(scene, &self.settings)),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use orrery_resources::{Geometry, PhysicalMaterial, PhysicalParams};
    use orrery_scene::{Camera, Mesh, ShadowFlags, Transform};

    use super::*;

    fn scene_with_camera() -> (Scene, NodeHandle) {
        let mut scene = Scene::new();
        let camera = scene.add_camera(
            "camera",
            Camera::new_perspective(45.0, 1.5, 0.1, 100.0),
            Transform::from_position(Vec3::new(0.0, 2.0, 8.0)),
        );
        scene.update_transforms();
        (scene, camera)
    }

    #[test]
    fn records_each_draw() {
        let (scene, camera) = scene_with_camera();
        let mut renderer =
            HeadlessRenderer::new(RendererSettings::default(), SurfaceSize::new(300, 200));
        renderer.render(&scene, camera).unwrap();
        renderer.render(&scene, camera).unwrap();

        assert_eq!(renderer.draw_count(), 2);
        let record = renderer.last_record().unwrap();
        assert_eq!(record.frame, 2);
        assert_eq!(record.aspect, 1.5);
        assert_eq!(record.camera_position, Vec3::new(0.0, 2.0, 8.0));
        assert_eq!(record.surface, SurfaceSize::new(300, 200));
    }

    #[test]
    fn shadow_and_msaa_settings_reach_the_record() {
        let (mut scene, camera) = scene_with_camera();
        let material = PhysicalMaterial::untextured(PhysicalParams::default());
        let rock = Mesh::new(Geometry::sphere(1.0, 8, 8), material.clone())
            .with_shadows(ShadowFlags::CAST);
        let floor = Mesh::new(
            Geometry::Plane {
                width: 10.0,
                height: 10.0,
            },
            material,
        )
        .with_shadows(ShadowFlags::RECEIVE);
        scene.add_mesh("rock", rock, Transform::new());
        scene.add_mesh("floor", floor, Transform::new());

        let mut renderer = HeadlessRenderer::default();
        renderer.render(&scene, camera).unwrap();
        let record = renderer.last_record().unwrap();
        assert_eq!((record.meshes, record.shadow_casters, record.samples), (2, 1, 4));
        assert_eq!(record.vertices, 9 * 9 + 4);

        let mut settings = RendererSettings {
            antialias: false,
            ..RendererSettings::default()
        };
        settings.shadows.enabled = false;
        let mut renderer = HeadlessRenderer::new(settings, SurfaceSize::new(64, 64));
        renderer.render(&scene, camera).unwrap();
        let record = renderer.last_record().unwrap();
        assert_eq!((record.meshes, record.shadow_casters, record.samples), (2, 0, 1));
    }

    #[test]
    fn armed_failure_fires_once() {
        let (scene, camera) = scene_with_camera();
        let mut renderer = HeadlessRenderer::default();
        renderer.fail_next_draw(DrawError::SurfaceLost);

        assert_eq!(renderer.render(&scene, camera), Err(DrawError::SurfaceLost));
        assert_eq!(renderer.draw_count(), 0);
        assert!(renderer.render(&scene, camera).is_ok());
    }

    #[test]
    fn resize_ignores_empty_and_repeated_sizes() {
        let mut renderer = HeadlessRenderer::default();
        renderer.resize(SurfaceSize::new(0, 100));
        renderer.resize(SurfaceSize::new(640, 480));
        renderer.resize(SurfaceSize::new(640, 480));
        assert_eq!(renderer.resize_count(), 1);
        assert_eq!(renderer.surface_size(), SurfaceSize::new(640, 480));
    }
}
