use crate::camera::Camera;
use crate::controls::OrbitControls;
use crate::light::Light;
use crate::mesh::Mesh;
use crate::scene::NodeHandle;
use crate::transform::Transform;

/// What a node contributes to the frame.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Pure hierarchy node.
    Group,
    Camera(Camera),
    Light(Light),
    Mesh(Mesh),
    ControlRig(OrbitControls),
}

impl NodeKind {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Camera(_) => "camera",
            Self::Light(_) => "light",
            Self::Mesh(_) => "mesh",
            Self::ControlRig(_) => "control rig",
        }
    }
}

/// A scene graph node. Owned by exactly one [`Scene`](crate::Scene).
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    pub visible: bool,

    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,
}

impl Node {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            transform: Transform::new(),
            kind,
            visible: true,
            parent: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    #[must_use]
    pub fn as_camera(&self) -> Option<&Camera> {
        match &self.kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    pub fn as_camera_mut(&mut self) -> Option<&mut Camera> {
        match &mut self.kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_light(&self) -> Option<&Light> {
        match &self.kind {
            NodeKind::Light(light) => Some(light),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_controls(&self) -> Option<&OrbitControls> {
        match &self.kind {
            NodeKind::ControlRig(controls) => Some(controls),
            _ => None,
        }
    }
}
