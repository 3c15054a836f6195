//! Kinematic движение по MovementCommand
//!
//! Без физики: position += direction × speed × dt (как headless
//! интеграция velocity → Transform). Юнит с оружием останавливается,
//! когда цель внутри дальности выстрела.

use bevy::prelude::*;

use crate::combat::Weapon;
use crate::components::{MovementCommand, Mobility, Vitals};
use crate::schedule::{SimulationSet, SimulationTick, TickDelta};

/// Насколько близко подходить к точке (MoveToPosition)
pub const ARRIVAL_DISTANCE: f32 = 0.1;

/// Сдвиг к точке за один тик
///
/// `stop_distance` — остановиться, не доходя (дальность оружия).
/// Не перепрыгивает точку остановки.
pub fn step_towards(position: Vec3, target: Vec3, speed: f32, delta: f32, stop_distance: f32) -> Vec3 {
    let offset = target - position;
    let distance = offset.length();
    if distance <= stop_distance || distance <= f32::EPSILON {
        return position;
    }

    let travel = (speed * delta).min(distance - stop_distance);
    position + offset / distance * travel.max(0.0)
}

/// System: исполнить MovementCommand
pub fn move_units(
    mut movers: Query<(Entity, &MovementCommand, &Mobility, &Vitals, Option<&Weapon>)>,
    mut transforms: Query<&mut Transform>,
    delta: Res<TickDelta>,
) {
    for (entity, command, mobility, vitals, weapon) in movers.iter_mut() {
        if vitals.is_dead || !vitals.in_control() {
            continue;
        }

        let (target, stop_distance) = match *command {
            MovementCommand::Idle => continue,
            MovementCommand::MoveToPosition { target } => (target, ARRIVAL_DISTANCE),
            MovementCommand::FollowEntity { target } => {
                let Ok(target_transform) = transforms.get(target) else {
                    continue;
                };
                let range = weapon.map(|w| w.effective_range()).unwrap_or(ARRIVAL_DISTANCE);
                (target_transform.translation, range)
            }
        };

        let Ok(mut transform) = transforms.get_mut(entity) else {
            continue;
        };
        transform.translation = step_towards(
            transform.translation,
            target,
            mobility.speed,
            delta.0,
            stop_distance,
        );
    }
}

/// Movement Plugin
pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            SimulationTick,
            move_units
                .before(crate::combat::weapon::fire_weapons)
                .in_set(SimulationSet::Combat),
        );
    }
}
