//! Scene graph for the Orrery runtime.
//!
//! A [`Scene`] owns its nodes in a slot map and hands out [`NodeHandle`]s.
//! [`build_base_scene`] creates the deterministic part of a scene (camera,
//! lights, controls) from a [`SceneConfig`].

pub mod builder;
pub mod camera;
pub mod config;
pub mod controls;
pub mod environment;
pub mod light;
pub mod mesh;
pub mod node;
pub mod scene;
pub mod transform;

pub use builder::{CAMERA_NODE, CONTROLS_NODE, build_base_scene};
pub use camera::Camera;
pub use config::{
    CameraConfig, ControlsConfig, LightConfig, LightKindConfig, SceneConfig, ShadowSettings,
};
pub use controls::OrbitControls;
pub use environment::{Background, Environment, EnvironmentLayer, GroundProjection};
pub use light::{Light, LightKind, ShadowCamera, ShadowConfig};
pub use mesh::{Mesh, ShadowFlags};
pub use node::{Node, NodeKind};
pub use scene::{NodeHandle, Scene, SceneStats};
pub use transform::Transform;
