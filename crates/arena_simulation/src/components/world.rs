//! World компоненты: коллайдер, bounds, spawn point

use bevy::prelude::*;

/// Коллайдер entity (для range trigger эмуляции)
///
/// Выключенный коллайдер не виден `poll_detection_ranges`:
/// toggle off/on через границу тика заново генерирует RangeEvent::Entered.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Collider {
    pub enabled: bool,
}

impl Default for Collider {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Маркер: включить коллайдер на следующем тике
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct ReenableColliderNextTick;

/// Axis-aligned bounds коллайдера (half extents вокруг Transform.translation)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Bounds {
    pub half_extents: Vec3,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            half_extents: Vec3::splat(0.5),
        }
    }
}

impl Bounds {
    pub fn new(half_extents: Vec3) -> Self {
        Self {
            half_extents: half_extents.abs(),
        }
    }

    /// Центр + 8 углов bounding box
    ///
    /// Большие коллайдеры могут пересекать луч углом при центре вне луча.
    pub fn sample_points(&self, center: Vec3) -> [Vec3; 9] {
        let h = self.half_extents;
        [
            center,
            center + Vec3::new(-h.x, -h.y, -h.z),
            center + Vec3::new(h.x, -h.y, -h.z),
            center + Vec3::new(-h.x, h.y, -h.z),
            center + Vec3::new(h.x, h.y, -h.z),
            center + Vec3::new(-h.x, -h.y, h.z),
            center + Vec3::new(h.x, -h.y, h.z),
            center + Vec3::new(-h.x, h.y, h.z),
            center + Vec3::new(h.x, h.y, h.z),
        ]
    }
}

/// Точка респавна (позиция при spawn)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct SpawnPoint(pub Vec3);
