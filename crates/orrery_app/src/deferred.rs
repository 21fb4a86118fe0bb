//! Scene objects whose construction waits on loaded resources.

use orrery_assets::{AssetServer, ResolvedResources};
use orrery_core::{AssetError, ConfigError};
use orrery_resources::{Geometry, PhysicalMaterialDescriptor, ResourceRequest};
use orrery_scene::{
    EnvironmentLayer, GroundProjection, Mesh, Node, NodeHandle, NodeKind, Scene, ShadowFlags,
    Transform,
};

/// A finished object, ready to be inserted in one step.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneObject {
    Mesh {
        name: String,
        mesh: Mesh,
        transform: Transform,
    },
    Group {
        name: String,
        transform: Transform,
        children: Vec<SceneObject>,
    },
    Environment(EnvironmentLayer),
}

impl SceneObject {
    #[must_use]
    pub fn mesh(name: impl Into<String>, mesh: Mesh, transform: Transform) -> Self {
        Self::Mesh {
            name: name.into(),
            mesh,
            transform,
        }
    }

    #[must_use]
    pub fn group(
        name: impl Into<String>,
        transform: Transform,
        children: Vec<SceneObject>,
    ) -> Self {
        Self::Group {
            name: name.into(),
            transform,
            children,
        }
    }

    /// Inserts the object (and its children) into `scene`.
    ///
    /// Returns the root node created, or `None` for environment layers,
    /// which are applied to the scene environment instead.
    pub fn insert_into(self, scene: &mut Scene, parent: Option<NodeHandle>) -> Option<NodeHandle> {
        let handle = match self {
            Self::Mesh {
                name,
                mesh,
                transform,
            } => scene.add_node(Node::new(name, NodeKind::Mesh(mesh)).with_transform(transform)),
            Self::Group {
                name,
                transform,
                children,
            } => {
                let group = scene.add_group(&name, transform);
                for child in children {
                    child.insert_into(scene, Some(group));
                }
                group
            }
            Self::Environment(layer) => {
                scene.environment.apply(layer);
                return None;
            }
        };
        if let Some(parent) = parent {
            scene.attach(handle, parent);
        }
        Some(handle)
    }
}

type BuildFn = Box<dyn FnOnce(&ResolvedResources) -> Result<SceneObject, AssetError>>;

/// A request set paired with the closure that builds the object once every
/// request has resolved.
///
/// The closure runs on the thread that owns the scene, never on the loader.
pub struct DeferredObject {
    label: String,
    requests: Vec<ResourceRequest>,
    build: BuildFn,
}

impl std::fmt::Debug for DeferredObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredObject")
            .field("label", &self.label)
            .field("requests", &self.requests)
            .finish_non_exhaustive()
    }
}

impl DeferredObject {
    pub fn new<F>(label: impl Into<String>, requests: Vec<ResourceRequest>, build: F) -> Self
    where
        F: FnOnce(&ResolvedResources) -> Result<SceneObject, AssetError> + 'static,
    {
        Self {
            label: label.into(),
            requests,
            build: Box::new(build),
        }
    }

    /// A mesh whose material textures load first.
    pub fn mesh(
        name: impl Into<String>,
        geometry: Geometry,
        material: PhysicalMaterialDescriptor,
        transform: Transform,
        shadows: ShadowFlags,
    ) -> Result<Self, ConfigError> {
        geometry.validate()?;
        let name = name.into();
        let requests = material.requests();
        Ok(Self::new(name.clone(), requests, move |resolved| {
            let material = material.resolve(|request| resolved.image(request))?;
            let mesh = Mesh::new(geometry, material).with_shadows(shadows);
            Ok(SceneObject::mesh(name, mesh, transform))
        }))
    }

    /// An image-based lighting map.
    pub fn environment_lighting(path: impl Into<String>, intensity: f32) -> Self {
        let request = ResourceRequest::environment_map(path);
        let label = format!("lighting environment {}", request.path);
        Self::new(label, vec![request.clone()], move |resolved| {
            let map = resolved
                .image(&request)
                .ok_or_else(|| AssetError::NotFound(request.path.clone()))?;
            Ok(SceneObject::Environment(EnvironmentLayer::Lighting { map, intensity }))
        })
    }

    /// A background-only panorama, optionally projected onto the ground.
    pub fn environment_background(
        path: impl Into<String>,
        ground: Option<GroundProjection>,
    ) -> Self {
        let request = ResourceRequest::environment_map(path);
        let label = format!("background environment {}", request.path);
        Self::new(label, vec![request.clone()], move |resolved| {
            let map = resolved
                .image(&request)
                .ok_or_else(|| AssetError::NotFound(request.path.clone()))?;
            Ok(SceneObject::Environment(EnvironmentLayer::Background { map, ground }))
        })
    }

    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    #[must_use]
    pub fn requests(&self) -> &[ResourceRequest] {
        &self.requests
    }

    /// Runs the build closure against a joined set.
    pub fn build(self, resolved: &ResolvedResources) -> Result<SceneObject, AssetError> {
        (self.build)(resolved)
    }

    /// Loads the request set, waits for it and builds the object.
    pub async fn resolve(self, assets: &AssetServer) -> Result<SceneObject, AssetError> {
        let resolved = assets.load_set(&self.requests).await?;
        self.build(&resolved)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use orrery_resources::{Image, PhysicalMaterial, PhysicalParams, Resource, ResourceKind};

    use super::*;

    #[test]
    fn groups_insert_children_under_the_group() {
        let mut scene = Scene::new();
        let mesh = Mesh::new(
            Geometry::sphere(1.0, 8, 8),
            PhysicalMaterial::untextured(PhysicalParams::default()),
        );
        let object = SceneObject::group(
            "meteor",
            Transform::new(),
            vec![SceneObject::mesh("rock", mesh, Transform::new())],
        );

        let group = object.insert_into(&mut scene, None).unwrap();
        let rock = scene.find_by_name("rock").unwrap();
        assert_eq!(scene.get_node(rock).and_then(Node::parent), Some(group));
        assert_eq!(scene.root_nodes(), &[group]);
    }

    #[test]
    fn mesh_build_fails_without_its_textures() {
        let deferred = DeferredObject::mesh(
            "earth",
            Geometry::sphere(10.0, 70, 70),
            PhysicalMaterialDescriptor::default().map("earth_map.jpg"),
            Transform::new(),
            ShadowFlags::RECEIVE,
        )
        .unwrap();
        assert_eq!(deferred.requests().len(), 1);
        assert!(matches!(
            deferred.build(&ResolvedResources::new()),
            Err(AssetError::MissingChannel { .. })
        ));
    }

    #[test]
    fn environment_layers_apply_to_the_scene() {
        let mut resolved = ResolvedResources::new();
        resolved.insert(Resource {
            path: "envmap.hdr".into(),
            kind: ResourceKind::EnvironmentMap,
            image: Arc::new(Image::white("envmap.hdr")),
        });
        let object = DeferredObject::environment_lighting("envmap.hdr", 0.4)
            .build(&resolved)
            .unwrap();

        let mut scene = Scene::new();
        assert!(object.insert_into(&mut scene, None).is_none());
        assert!(scene.environment.has_lighting_map());
        assert_eq!(scene.environment.intensity, 0.4);
        assert_eq!(scene.node_count(), 0);
    }

    #[test]
    fn invalid_geometry_is_rejected_up_front() {
        let result = DeferredObject::mesh(
            "bad",
            Geometry::sphere(-1.0, 8, 8),
            PhysicalMaterialDescriptor::default(),
            Transform::new(),
            ShadowFlags::empty(),
        );
        assert!(result.is_err());
    }
}
