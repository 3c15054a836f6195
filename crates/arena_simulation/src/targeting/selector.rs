//! Target selector
//!
//! Две политики:
//! - Single-target (юниты/базы): sticky. Текущая цель остаётся, пока она
//!   в кандидатах и жива; иначе первый валидный кандидат.
//! - Nearest (area спеллы, лучи): строго ближайший по евклиду,
//!   при равенстве побеждает первый увиденный.
//!
//! Юнит без цели идёт к стратегическому objective (MovementCommand).

use bevy::prelude::*;

use crate::components::{Faction, MovementCommand, Mobility, Vitals};
use crate::config::SimulationConfig;
use crate::targeting::detector::TargetCandidates;
use crate::targeting::strategic::StrategicTargetRegistry;

/// Текущая цель entity (None = нет цели)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct CurrentTarget(pub Option<Entity>);

/// Sticky выбор цели
///
/// `is_valid` проверяет существование и жизнь кандидата.
pub fn select_current_target(
    current: Option<Entity>,
    candidates: &[Entity],
    is_valid: impl Fn(Entity) -> bool,
) -> Option<Entity> {
    if let Some(target) = current {
        if candidates.contains(&target) && is_valid(target) {
            return Some(target);
        }
    }

    candidates.iter().copied().find(|&candidate| is_valid(candidate))
}

/// Снимок кандидата для nearest политики
#[derive(Debug, Clone, Copy)]
pub struct NearestCandidate {
    pub entity: Entity,
    pub position: Vec3,
    pub faction: Faction,
    pub is_dead: bool,
}

/// Ближайший живой враг (strict `<`: при равенстве остаётся первый)
pub fn nearest_enemy(
    origin: Vec3,
    faction: Faction,
    candidates: impl IntoIterator<Item = NearestCandidate>,
) -> Option<(Entity, Vec3)> {
    let mut best: Option<(Entity, Vec3, f32)> = None;

    for candidate in candidates {
        if candidate.is_dead || !faction.is_hostile_to(candidate.faction) {
            continue;
        }
        let distance = origin.distance_squared(candidate.position);
        match best {
            Some((_, _, best_distance)) if distance >= best_distance => {}
            _ => best = Some((candidate.entity, candidate.position, distance)),
        }
    }

    best.map(|(entity, position, _)| (entity, position))
}

/// System: sticky выбор цели из TargetCandidates
pub fn select_targets(
    mut selectors: Query<(Entity, &TargetCandidates, &mut CurrentTarget, &Vitals)>,
    others: Query<&Vitals>,
) {
    for (entity, candidates, mut current, vitals) in selectors.iter_mut() {
        if vitals.is_dead {
            if current.0.is_some() {
                current.0 = None;
            }
            continue;
        }

        let selected = select_current_target(current.0, &candidates.entities, |candidate| {
            candidate != entity && others.get(candidate).map(|v| v.is_alive()).unwrap_or(false)
        });

        if selected != current.0 {
            crate::logger::log(&format!(
                "🎯 {:?} target changed: {:?} → {:?}",
                entity, current.0, selected
            ));
            current.0 = selected;
        }
    }
}

/// System: MovementCommand из текущей цели / strategic objective
///
/// Есть цель → FollowEntity. Нет цели → MoveToPosition(objective).
/// Мёртвые и disabled юниты стоят.
pub fn update_movement_objectives(
    mut units: Query<(&CurrentTarget, &Transform, &Faction, &Vitals, &mut MovementCommand), With<Mobility>>,
    positions: Query<&Transform>,
    registry: Res<StrategicTargetRegistry>,
    config: Res<SimulationConfig>,
) {
    for (current, transform, faction, vitals, mut command) in units.iter_mut() {
        let next = if vitals.is_dead || !vitals.in_control() {
            MovementCommand::Idle
        } else if let Some(target) = current.0 {
            MovementCommand::FollowEntity { target }
        } else {
            registry
                .get_nearest(*faction, transform.translation, &config, |e| {
                    positions.get(e).ok().map(|t| t.translation)
                })
                .map(|objective| MovementCommand::MoveToPosition {
                    target: objective.position(),
                })
                .unwrap_or(MovementCommand::Idle)
        };

        if *command != next {
            *command = next;
        }
    }
}
