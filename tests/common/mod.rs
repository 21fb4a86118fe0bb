//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::io::Cursor;

use glam::Vec3;
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use orrery::assets::{AssetServer, MemoryAssetReader};
use orrery::scene::{CameraConfig, LightConfig, SceneConfig};

pub fn png(color: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(4, 2, Rgba(color));
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Png).unwrap();
    bytes.into_inner()
}

pub fn jpeg(color: [u8; 3]) -> Vec<u8> {
    let img = RgbImage::from_pixel(8, 8, Rgb(color));
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Jpeg).unwrap();
    bytes.into_inner()
}

/// An asset server over an in-memory store holding the Earth and meteor assets.
pub fn demo_assets() -> (AssetServer, MemoryAssetReader) {
    let (server, store) = AssetServer::in_memory();
    store.insert("earth_map.jpg", jpeg([40, 90, 160]));
    store.insert("earth_bump.jpg", jpeg([128, 128, 128]));
    store.insert("earth_roughness.jpg", jpeg([200, 200, 200]));
    store.insert("envmap.hdr", png([90, 100, 120, 255]));
    store.insert("envmap_blur.hdr", png([30, 30, 40, 255]));
    (server, store)
}

/// One camera (fov 75, near 0.1, far 100) and one directional light.
pub fn camera_and_sun() -> SceneConfig {
    SceneConfig {
        camera: Some(CameraConfig {
            fov: 75.0,
            near: 0.1,
            far: 100.0,
            aspect: 800.0 / 600.0,
            position: Vec3::new(0.0, 0.0, 25.0),
            target: Vec3::ZERO,
        }),
        lights: vec![LightConfig::directional(Vec3::ONE, 1.0, Vec3::new(-2.0, 0.5, 1.5))],
        ..SceneConfig::default()
    }
}
