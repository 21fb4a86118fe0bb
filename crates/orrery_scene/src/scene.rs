use std::sync::atomic::{AtomicU32, Ordering};

use glam::{Affine3A, Vec3};
use orrery_core::{ConfigError, Input};
use slotmap::{SlotMap, new_key_type};

use crate::camera::Camera;
use crate::controls::OrbitControls;
use crate::environment::Environment;
use crate::light::Light;
use crate::mesh::Mesh;
use crate::node::{Node, NodeKind};
use crate::transform::Transform;

new_key_type! {
    pub struct NodeHandle;
}

static NEXT_SCENE_ID: AtomicU32 = AtomicU32::new(1);

/// Node counts by kind, used for logging and draw bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneStats {
    pub nodes: usize,
    pub cameras: usize,
    pub lights: usize,
    pub meshes: usize,
    pub control_rigs: usize,
}

/// The scene graph.
///
/// A `Scene` exclusively owns its nodes: they are moved in on insertion and
/// addressed through typed handles afterwards, so a node can never be shared
/// between two graphs.
pub struct Scene {
    id: u32,
    nodes: SlotMap<NodeHandle, Node>,
    root_nodes: Vec<NodeHandle>,

    pub active_camera: Option<NodeHandle>,
    pub environment: Environment,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed),
            nodes: SlotMap::with_key(),
            root_nodes: Vec::new(),
            active_camera: None,
            environment: Environment::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Adds a node at the root of the graph.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    pub fn add_camera(&mut self, name: &str, camera: Camera, transform: Transform) -> NodeHandle {
        self.add_node(Node::new(name, NodeKind::Camera(camera)).with_transform(transform))
    }

    pub fn add_light(&mut self, name: &str, light: Light, transform: Transform) -> NodeHandle {
        self.add_node(Node::new(name, NodeKind::Light(light)).with_transform(transform))
    }

    pub fn add_mesh(&mut self, name: &str, mesh: Mesh, transform: Transform) -> NodeHandle {
        self.add_node(Node::new(name, NodeKind::Mesh(mesh)).with_transform(transform))
    }

    pub fn add_group(&mut self, name: &str, transform: Transform) -> NodeHandle {
        self.add_node(Node::new(name, NodeKind::Group).with_transform(transform))
    }

    /// Adds an orbit rig. The camera it drives must already be in this scene.
    pub fn add_control_rig(
        &mut self,
        name: &str,
        controls: OrbitControls,
    ) -> Result<NodeHandle, ConfigError> {
        let drives_camera = self
            .nodes
            .get(controls.camera)
            .is_some_and(|node| node.as_camera().is_some());
        if !drives_camera {
            return Err(ConfigError::invalid(
                "controls.camera",
                "the controlled camera must be added before its rig",
            ));
        }
        Ok(self.add_node(Node::new(name, NodeKind::ControlRig(controls))))
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Re-parents `child` under `parent`.
    ///
    /// Attaching a node to itself or to one of its own descendants is ignored.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if child == parent
            || !self.nodes.contains_key(child)
            || !self.nodes.contains_key(parent)
            || self.is_ancestor(child, parent)
        {
            log::warn!("Ignoring invalid attach of {child:?} under {parent:?}");
            return;
        }

        self.unlink(child);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
        }
    }

    /// Moves `child` back to the root.
    pub fn detach(&mut self, child: NodeHandle) {
        if self.nodes.get(child).is_some_and(|n| n.parent.is_some()) {
            self.unlink(child);
            self.root_nodes.push(child);
        }
    }

    /// Removes `child` from its parent's children or from the root list.
    fn unlink(&mut self, child: NodeHandle) {
        let Some(old_parent) = self.nodes.get(child).map(|n| n.parent) else {
            return;
        };
        match old_parent {
            Some(parent) => {
                if let Some(p) = self.nodes.get_mut(parent) {
                    p.children.retain(|&c| c != child);
                }
            }
            None => self.root_nodes.retain(|&r| r != child),
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = None;
        }
    }

    fn is_ancestor(&self, ancestor: NodeHandle, mut node: NodeHandle) -> bool {
        while let Some(parent) = self.nodes.get(node).and_then(|n| n.parent) {
            if parent == ancestor {
                return true;
            }
            node = parent;
        }
        false
    }

    /// Removes a node and its whole subtree.
    pub fn remove_node(&mut self, handle: NodeHandle) {
        let Some(children) = self.nodes.get(handle).map(|n| n.children.clone()) else {
            return;
        };
        for child in children {
            self.remove_node(child);
        }

        self.unlink(handle);
        self.nodes.remove(handle);

        if self.active_camera == Some(handle) {
            log::warn!("Active camera removed; frames are skipped until a new one is set.");
            self.active_camera = None;
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[inline]
    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[must_use]
    pub fn root_nodes(&self) -> &[NodeHandle] {
        &self.root_nodes
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, &Node)> {
        self.nodes.iter()
    }

    /// Finds the first node with the given name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<NodeHandle> {
        self.nodes
            .iter()
            .find_map(|(handle, node)| (node.name == name).then_some(handle))
    }

    pub fn cameras(&self) -> impl Iterator<Item = (NodeHandle, &Camera)> {
        self.nodes
            .iter()
            .filter_map(|(h, n)| n.as_camera().map(|c| (h, c)))
    }

    pub fn lights(&self) -> impl Iterator<Item = (NodeHandle, &Light)> {
        self.nodes
            .iter()
            .filter_map(|(h, n)| n.as_light().map(|l| (h, l)))
    }

    pub fn meshes(&self) -> impl Iterator<Item = (NodeHandle, &Mesh)> {
        self.nodes
            .iter()
            .filter_map(|(h, n)| n.as_mesh().map(|m| (h, m)))
    }

    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn camera_count(&self) -> usize {
        self.cameras().count()
    }

    #[must_use]
    pub fn light_count(&self) -> usize {
        self.lights().count()
    }

    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.meshes().count()
    }

    #[must_use]
    pub fn stats(&self) -> SceneStats {
        let mut stats = SceneStats {
            nodes: self.nodes.len(),
            ..SceneStats::default()
        };
        for node in self.nodes.values() {
            match node.kind {
                NodeKind::Camera(_) => stats.cameras += 1,
                NodeKind::Light(_) => stats.lights += 1,
                NodeKind::Mesh(_) => stats.meshes += 1,
                NodeKind::ControlRig(_) => stats.control_rigs += 1,
                NodeKind::Group => {}
            }
        }
        stats
    }

    /// The active camera together with its node transform.
    #[must_use]
    pub fn active_camera_bundle(&self) -> Option<(&Transform, &Camera)> {
        let node = self.nodes.get(self.active_camera?)?;
        node.as_camera().map(|camera| (&node.transform, camera))
    }

    pub fn active_camera_mut(&mut self) -> Option<&mut Camera> {
        let handle = self.active_camera?;
        self.nodes.get_mut(handle)?.as_camera_mut()
    }

    /// Marks a camera node as the one frames are drawn through.
    pub fn set_active_camera(&mut self, handle: NodeHandle) -> bool {
        if self.nodes.get(handle).is_some_and(|n| n.as_camera().is_some()) {
            self.active_camera = Some(handle);
            true
        } else {
            log::error!("Attempted to activate {handle:?}, which is not a camera node.");
            false
        }
    }

    // ========================================================================
    // Per-tick update
    // ========================================================================

    /// Steps every control rig by one tick, then propagates transforms.
    pub fn update(&mut self, input: &Input, dt: f32) {
        self.update_control_rigs(input, dt);
        self.update_transforms();
    }

    fn update_control_rigs(&mut self, input: &Input, dt: f32) {
        let rigs: Vec<(NodeHandle, NodeHandle)> = self
            .nodes
            .iter()
            .filter_map(|(h, n)| n.as_controls().map(|c| (h, c.camera)))
            .collect();

        for (rig, camera) in rigs {
            let Some(fov) = self
                .nodes
                .get(camera)
                .and_then(Node::as_camera)
                .map(Camera::fov_degrees)
            else {
                log::debug!("Control rig {rig:?} lost its camera; skipping.");
                continue;
            };

            let Some(NodeKind::ControlRig(controls)) = self.nodes.get_mut(rig).map(|n| &mut n.kind)
            else {
                continue;
            };
            let position = controls.update(input, fov, dt);
            let target = controls.target;

            if let Some(camera_node) = self.nodes.get_mut(camera) {
                camera_node.transform.position = position;
                camera_node.transform.look_at(target, Vec3::Y);
            }
        }
    }

    /// Recomputes world matrices top-down and refreshes camera view matrices.
    pub fn update_transforms(&mut self) {
        let mut stack: Vec<(NodeHandle, Affine3A)> = self
            .root_nodes
            .iter()
            .map(|&h| (h, Affine3A::IDENTITY))
            .collect();

        while let Some((handle, parent_world)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(handle) else {
                continue;
            };
            node.transform.update_local_matrix();
            let world = parent_world * node.transform.local_matrix;
            node.transform.world_matrix = world;

            if let NodeKind::Camera(camera) = &mut node.kind {
                camera.update_view_projection(&world);
            }
            stack.extend(node.children.iter().map(|&c| (c, world)));
        }
    }
}
