//! Death dispatch
//!
//! `Dying` — мгновенный переход внутри `apply_damage` (Vitals::kill).
//! Здесь исполняется LifecycleTransition:
//! - EntityDied: общие реакции (death animation, XP)
//! - UnitDied: bookkeeping (remove / pool / respawn / game over, kill метрика)

use bevy::prelude::*;

use crate::components::{BaseStation, Collider, Faction, LifecycleState, Pooled, Vitals};
use crate::config::SimulationConfig;
use crate::context::SimulationContext;
use crate::lifecycle::pool::UnitPool;
use crate::lifecycle::respawn::RespawnCountdown;
use crate::lifecycle::transition::{resolve_death, DeathContext, LifecycleTransition};
use crate::lifecycle::{EntityDied, UnitDied};
use crate::schedule::TickDelta;
use crate::sinks::{GameOver, MetricEvent, VisualEvent};
use crate::targeting::{RangeTracking, StrategicTargetRegistry};

/// Куда уходит entity после grace period
#[derive(Debug, Clone, PartialEq)]
pub enum RemovalDestination {
    Despawn,
    Pool { key: String },
}

/// Отложенное удаление (death animation играет `remaining` секунд)
#[derive(Component, Debug, Clone)]
pub struct PendingRemoval {
    pub remaining: f32,
    pub destination: RemovalDestination,
}

impl PendingRemoval {
    pub fn despawn(grace: f32) -> Self {
        Self {
            remaining: grace.max(0.0),
            destination: RemovalDestination::Despawn,
        }
    }

    pub fn to_pool(key: String, grace: f32) -> Self {
        Self {
            remaining: grace.max(0.0),
            destination: RemovalDestination::Pool { key },
        }
    }
}

/// Время жизни спелла (после истечения — смерть без убийцы)
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct SpellLifetime {
    pub remaining: f32,
}

/// System: исполнить LifecycleTransition для каждой UnitDied
pub fn dispatch_unit_deaths(
    mut deaths: EventReader<UnitDied>,
    mut entities: Query<(
        &Faction,
        &mut LifecycleState,
        Option<&mut Collider>,
        Has<BaseStation>,
        Option<&Pooled>,
    )>,
    config: Res<SimulationConfig>,
    mut context: ResMut<SimulationContext>,
    mut commands: Commands,
    mut metrics: EventWriter<MetricEvent>,
    mut game_over: EventWriter<GameOver>,
) {
    for death in deaths.read() {
        let Ok((faction, mut state, collider, is_base, pooled)) = entities.get_mut(death.entity) else {
            crate::logger::log_warning(&format!(
                "UnitDied for missing entity {:?}, skipping",
                death.entity
            ));
            continue;
        };

        // Повторная смерть в одном тике (или уже умершая entity) — no-op
        if !state.is_alive() {
            continue;
        }
        *state = LifecycleState::Dead;

        // Коллайдер выключается сразу: наблюдатели получат Exited
        if let Some(mut collider) = collider {
            collider.enabled = false;
        }

        if let Some(killer_faction) = death.killer_faction {
            if killer_faction != *faction {
                metrics.write(MetricEvent::Kill {
                    faction: killer_faction,
                });
            }
        }

        let transition = resolve_death(
            DeathContext {
                faction: *faction,
                is_base,
                pool_key: pooled.map(|p| p.key.as_str()),
                local_faction: context.local_faction,
            },
            &config,
        );

        crate::logger::log(&format!("☠️ {:?} ({:?}) → {:?}", death.entity, faction, transition));

        match transition {
            LifecycleTransition::RemoveAfter { grace } => {
                commands.entity(death.entity).try_insert(PendingRemoval::despawn(grace));
            }
            LifecycleTransition::ReturnToPool { key, grace } => {
                commands.entity(death.entity).try_insert(PendingRemoval::to_pool(key, grace));
            }
            LifecycleTransition::Respawn {
                delay,
                requires_confirmation,
            } => {
                *state = LifecycleState::Respawning;
                commands
                    .entity(death.entity)
                    .try_insert(RespawnCountdown::new(delay, requires_confirmation));
            }
            LifecycleTransition::GameOver { loser } => {
                if context.report_game_over() {
                    crate::logger::log_info(&format!("🏁 Game over: {:?} base destroyed", loser));
                    game_over.write(GameOver {
                        loser,
                        winner: loser.opponent(),
                    });
                }
            }
        }
    }
}

/// System: общие реакции на смерть (death animation, XP убийце)
pub fn announce_entity_deaths(
    mut deaths: EventReader<EntityDied>,
    vitals: Query<&Vitals>,
    config: Res<SimulationConfig>,
    mut visuals: EventWriter<VisualEvent>,
) {
    for death in deaths.read() {
        visuals.write(VisualEvent::DeathAnimation {
            entity: death.entity,
        });

        let Some(killer) = death.killer else {
            continue;
        };
        let Ok(killer_vitals) = vitals.get(killer) else {
            continue;
        };
        if killer_vitals.is_dead {
            continue;
        }

        let victim_level = vitals.get(death.entity).map(|v| v.level).unwrap_or(1);
        let amount = victim_level.saturating_mul(config.xp_per_level);
        if amount > 0 {
            visuals.write(VisualEvent::XpGained {
                entity: killer,
                amount,
            });
        }
    }
}

/// System: истечение спеллов → смерть без убийцы
pub fn expire_spells(
    mut spells: Query<(Entity, &mut SpellLifetime, &LifecycleState)>,
    delta: Res<TickDelta>,
    mut entity_died: EventWriter<EntityDied>,
    mut unit_died: EventWriter<UnitDied>,
) {
    for (entity, mut lifetime, state) in spells.iter_mut() {
        if !state.is_alive() || lifetime.remaining <= 0.0 {
            continue;
        }

        lifetime.remaining -= delta.0;
        if lifetime.remaining <= 0.0 {
            lifetime.remaining = 0.0;
            entity_died.write(EntityDied {
                entity,
                killer: None,
            });
            unit_died.write(UnitDied {
                entity,
                killer: None,
                killer_faction: None,
            });
        }
    }
}

/// System: отложенное удаление / возврат в пул
pub fn tick_pending_removals(
    mut pending: Query<(Entity, &mut PendingRemoval, &mut LifecycleState)>,
    delta: Res<TickDelta>,
    mut registry: ResMut<StrategicTargetRegistry>,
    mut tracking: ResMut<RangeTracking>,
    mut pool: ResMut<UnitPool>,
    mut commands: Commands,
) {
    for (entity, mut removal, mut state) in pending.iter_mut() {
        removal.remaining -= delta.0;
        if removal.remaining > 0.0 {
            continue;
        }

        match &removal.destination {
            RemovalDestination::Despawn => {
                registry.unregister(entity);
                tracking.forget(entity);
                commands.entity(entity).despawn();
                crate::logger::log(&format!("🗑️ {:?} removed", entity));
            }
            RemovalDestination::Pool { key } => {
                *state = LifecycleState::Pooled;
                pool.release(key, entity);
                commands.entity(entity).remove::<PendingRemoval>();
                crate::logger::log(&format!("♻️ {:?} returned to pool '{}'", entity, key));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_removal_clamps_grace() {
        assert_eq!(PendingRemoval::despawn(-1.0).remaining, 0.0);
        let pooled = PendingRemoval::to_pool("bot".into(), 2.0);
        assert_eq!(pooled.remaining, 2.0);
        assert_eq!(
            pooled.destination,
            RemovalDestination::Pool {
                key: "bot".to_string()
            }
        );
    }
}
