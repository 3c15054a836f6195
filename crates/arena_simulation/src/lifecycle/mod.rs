//! Lifecycle module
//!
//! State machine:
//! - обычные entity: Alive → Dead → PendingRemoval → despawn
//! - локальная база: Alive → Dead → Respawning → Alive (entity никогда не удаляется)
//! - база противника: Alive → Dead + GameOver (один раз)
//! - pooled боты: Alive → Dead → Pooled → (deploy) Alive

use bevy::prelude::*;

pub mod death;
pub mod pool;
pub mod respawn;
pub mod transition;

pub use death::{PendingRemoval, RemovalDestination, SpellLifetime};
pub use pool::UnitPool;
pub use respawn::{reset_combat_timers, reset_to_spawn, ConfirmRespawn, ForcePlayerRespawn, RespawnCountdown};
pub use transition::{resolve_death, DeathContext, LifecycleTransition};

use crate::components::Faction;
use crate::schedule::{SimulationSet, SimulationTick, TickEventsAppExt};

/// Общий канал смерти (UI, XP, scoring)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Bookkeeping канал смерти (respawn, strategic registry, pool)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
    /// Фракция убийцы на момент удара (убийца мог исчезнуть)
    pub killer_faction: Option<Faction>,
}

/// Lifecycle Plugin
///
/// Порядок внутри тика:
/// 1. Input: reenable_colliders → advance_respawns
/// 2. Resolution: expire_spells (после урона этого тика)
/// 3. Lifecycle: dispatch_unit_deaths, announce_entity_deaths
/// 4. Cleanup: tick_pending_removals
pub struct LifecyclePlugin;

impl Plugin for LifecyclePlugin {
    fn build(&self, app: &mut App) {
        app.add_tick_event::<EntityDied>()
            .add_tick_event::<UnitDied>()
            .add_tick_event::<ConfirmRespawn>()
            .add_tick_event::<ForcePlayerRespawn>()
            .init_resource::<UnitPool>();

        app.add_systems(
            SimulationTick,
            (
                (respawn::reenable_colliders, respawn::advance_respawns)
                    .chain()
                    .in_set(SimulationSet::Input),
                death::expire_spells
                    .after(crate::combat::damage::apply_damage_requests)
                    .in_set(SimulationSet::Resolution),
                (death::dispatch_unit_deaths, death::announce_entity_deaths)
                    .chain()
                    .in_set(SimulationSet::Lifecycle),
                death::tick_pending_removals.in_set(SimulationSet::Cleanup),
            ),
        );
    }
}
