//! Combat module
//!
//! ECS ответственность:
//! - Damage resolver: shield → HP routing, overflow, смерть
//! - Regeneration: shield/HP regen со stochastic rounding
//! - Beam resolver: line-shaped урон по интервалам
//! - Weapon: single-target выстрелы по CurrentTarget
//!
//! Визуальный слой только читает события (VisualEvent, DamageDealt).

use bevy::prelude::*;

pub mod beam;
pub mod damage;
pub mod regeneration;
pub mod weapon;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod beam_tests;

// Re-export основных типов
pub use beam::{Beam, BeamAim, BeamGeometry, BeamStats};
pub use damage::{apply_damage, DamageDealt, DamageOutcome, DamageRequest, DamageType};
pub use regeneration::regenerate;
pub use weapon::{Weapon, WeaponStats};

use crate::schedule::{SimulationSet, SimulationTick, TickEventsAppExt};

/// Combat Plugin
///
/// Порядок внутри тика:
/// 1. tick_casting, tick_weapon_cooldowns — таймеры
/// 2. aim_beams, update_beams, fire_weapons — генерация DamageRequest
/// 3. apply_damage_requests — резолв урона и смерти
/// 4. regenerate_vitals — regen после урона этого тика
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_tick_event::<DamageRequest>().add_tick_event::<DamageDealt>();

        app.add_systems(
            SimulationTick,
            (
                (regeneration::tick_casting, weapon::tick_weapon_cooldowns)
                    .chain()
                    .in_set(SimulationSet::Input),
                (beam::aim_beams, beam::update_beams, weapon::fire_weapons)
                    .chain()
                    .in_set(SimulationSet::Combat),
                (damage::apply_damage_requests, regeneration::regenerate_vitals)
                    .chain()
                    .in_set(SimulationSet::Resolution),
            ),
        );
    }
}
