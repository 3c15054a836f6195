//! ECS Components для симулируемых entity
//!
//! Организация по доменам:
//! - entity: идентичность (EntityId, Faction, LifecycleState, capability markers)
//! - vitals: hit points / shield / таймеры (Vitals, Regeneration)
//! - world: позиционирование и коллайдеры (Bounds, Collider, SpawnPoint)
//! - movement: команды перемещения (MovementCommand, Mobility)
//!
//! Боевые capability компоненты (Weapon, Beam, Detector) живут в своих модулях.

pub mod entity;
pub mod movement;
pub mod vitals;
pub mod world;

// Re-exports для удобного импорта
pub use entity::*;
pub use movement::*;
pub use vitals::*;
pub use world::*;
