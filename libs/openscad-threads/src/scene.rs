//! # Scene Emission
//!
//! Thin adapter that places generated meshes into a scene. Every entry point
//! has a companion here taking the same spec plus a [`Placement`]; the mesh
//! is computed by the pure function and then positioned.
//!
//! ## Placement Order
//!
//! ```text
//! anchor shift ──► spin about Z ──► orient Z onto `orient` ──► translate
//! ```

use crate::error::{ThreadError, ThreadResult};
use crate::mesh::Mesh;
use crate::ops::boolean::union_all;
use crate::thread::{
    generic_threaded_nut, generic_threaded_rod, thread_helix, HelixSpec, NutSpec, ThreadSpec,
};
use config::constants::GlobalConfig;
use glam::{DMat4, DQuat, DVec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which point of an object lands on the placement origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Bottom,
    #[default]
    Center,
    Top,
}

impl Anchor {
    /// Axial shift for a centered object of the given height.
    fn offset(self, height: f64) -> f64 {
        match self {
            Anchor::Bottom => height / 2.0,
            Anchor::Center => 0.0,
            Anchor::Top => -height / 2.0,
        }
    }
}

/// Position and orientation of a placed object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Placement {
    pub anchor: Anchor,
    /// Rotation about the object's own axis, in degrees.
    pub spin: f64,
    /// Direction the object's +Z axis points to.
    pub orient: DVec3,
    pub translate: DVec3,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            anchor: Anchor::Center,
            spin: 0.0,
            orient: DVec3::Z,
            translate: DVec3::ZERO,
        }
    }
}

impl Placement {
    #[must_use]
    pub fn anchored(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    #[must_use]
    pub fn spun(mut self, degrees: f64) -> Self {
        self.spin = degrees;
        self
    }

    #[must_use]
    pub fn oriented(mut self, direction: DVec3) -> Self {
        self.orient = direction;
        self
    }

    #[must_use]
    pub fn translated(mut self, offset: DVec3) -> Self {
        self.translate = offset;
        self
    }

    /// Matrix placing a centered object of the given height.
    pub fn matrix(&self, height: f64) -> ThreadResult<DMat4> {
        let orient = self.orient.try_normalize().ok_or_else(|| {
            ThreadError::invalid(format!("orientation {} has no direction", self.orient))
        })?;
        let shift = DMat4::from_translation(DVec3::new(0.0, 0.0, self.anchor.offset(height)));
        let spin = DMat4::from_rotation_z(self.spin.to_radians());
        let tilt = DMat4::from_quat(DQuat::from_rotation_arc(DVec3::Z, orient));
        Ok(DMat4::from_translation(self.translate) * tilt * spin * shift)
    }
}

/// A named mesh with its placement applied.
#[derive(Debug, Clone)]
pub struct SceneItem {
    pub name: String,
    pub mesh: Mesh,
}

/// Collection of placed meshes.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    items: Vec<SceneItem>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[SceneItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Places a centered mesh of the given height.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        mut mesh: Mesh,
        height: f64,
        placement: &Placement,
    ) -> ThreadResult<&SceneItem> {
        mesh.transform(&placement.matrix(height)?);
        let name = name.into();
        debug!(name = %name, triangles = mesh.triangle_count(), "scene item added");
        self.items.push(SceneItem { name, mesh });
        Ok(&self.items[self.items.len() - 1])
    }

    /// Emits a finished threaded rod.
    pub fn threaded_rod(
        &mut self,
        name: impl Into<String>,
        spec: &ThreadSpec,
        config: &GlobalConfig,
        placement: &Placement,
    ) -> ThreadResult<&SceneItem> {
        let mesh = generic_threaded_rod(spec, config)?.to_mesh()?;
        self.add(name, mesh, spec.length, placement)
    }

    /// Emits a nut.
    pub fn threaded_nut(
        &mut self,
        name: impl Into<String>,
        spec: &NutSpec,
        config: &GlobalConfig,
        placement: &Placement,
    ) -> ThreadResult<&SceneItem> {
        let mesh = generic_threaded_nut(spec, config)?;
        self.add(name, mesh, spec.height, placement)
    }

    /// Emits a thread helix.
    pub fn thread_helix(
        &mut self,
        name: impl Into<String>,
        spec: &HelixSpec,
        config: &GlobalConfig,
        placement: &Placement,
    ) -> ThreadResult<&SceneItem> {
        let mesh = thread_helix(spec, config)?;
        let height = spec.pitch * f64::from(spec.starts) * spec.turns;
        self.add(name, mesh, height, placement)
    }

    /// Union of every item.
    pub fn combined(&self) -> ThreadResult<Mesh> {
        union_all(self.items.iter().map(|item| &item.mesh))
    }
}
