use std::collections::HashMap;

use glam::{Quat, Vec3};
use log::warn;

use crate::core::components::{RenderableHandle, Transform};
use crate::geometry::Geometry;

/// Receiver of transforms computed by the physics side.
///
/// Writing to a handle the sink does not know about is a no-op.
pub trait TransformSink {
    fn set_transform(&mut self, handle: RenderableHandle, translation: Vec3, rotation: Quat);
}

impl TransformSink for HashMap<RenderableHandle, Transform> {
    fn set_transform(&mut self, handle: RenderableHandle, translation: Vec3, rotation: Quat) {
        if let Some(transform) = self.get_mut(&handle) {
            transform.translation = translation;
            transform.rotation = rotation;
        }
    }
}

/// A render-side object: what it looks like and where it is.
#[derive(Debug, Clone)]
pub struct Renderable {
    pub name: Option<String>,
    pub geometry: Geometry,
    pub transform: Transform,
    pub visible: bool,
}

impl Renderable {
    pub fn new(geometry: Geometry, transform: Transform) -> Self {
        Renderable {
            name: None,
            geometry,
            transform,
            visible: true,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Flat store of renderables. Objects are never removed, so handles stay stable.
#[derive(Debug, Default)]
pub struct Scene {
    renderables: Vec<Renderable>,
    names: HashMap<String, RenderableHandle>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle the next call to [`Scene::add`] will return.
    pub fn next_handle(&self) -> RenderableHandle {
        RenderableHandle(self.renderables.len() as u32)
    }

    pub fn add(&mut self, renderable: Renderable) -> RenderableHandle {
        let handle = self.next_handle();
        if let Some(name) = &renderable.name {
            if self.names.insert(name.clone(), handle).is_some() {
                warn!("Renderable name {:?} reassigned to {}", name, handle);
            }
        }
        self.renderables.push(renderable);
        handle
    }

    pub fn get(&self, handle: RenderableHandle) -> Option<&Renderable> {
        self.renderables.get(handle.index())
    }

    pub fn get_mut(&mut self, handle: RenderableHandle) -> Option<&mut Renderable> {
        self.renderables.get_mut(handle.index())
    }

    pub fn by_name(&self, name: &str) -> Option<RenderableHandle> {
        self.names.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.renderables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderables.is_empty()
    }
}

impl TransformSink for Scene {
    fn set_transform(&mut self, handle: RenderableHandle, translation: Vec3, rotation: Quat) {
        if let Some(renderable) = self.get_mut(handle) {
            renderable.transform.translation = translation;
            renderable.transform.rotation = rotation;
        }
    }
}
