//! Render-side types shared by the physics engine and whatever drives the scene.

pub mod configs;
pub mod core;
pub mod geometry;
