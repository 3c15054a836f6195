//! Weapon — single-target оружие юнитов и баз
//!
//! Cooldown тикает каждый тик. Когда готов, текущая цель жива и в радиусе,
//! пишется DamageRequest и cooldown перезапускается.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::damage::{DamageRequest, DamageType};
use crate::components::{Faction, Vitals};
use crate::schedule::TickDelta;
use crate::targeting::CurrentTarget;

/// Параметры оружия из stat block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponStats {
    pub damage: i32,
    pub cooldown: f32,
    pub range: f32,
    pub damage_type: DamageType,
}

impl Default for WeaponStats {
    fn default() -> Self {
        Self {
            damage: 10,
            cooldown: 1.0,
            range: 8.0,
            damage_type: DamageType::Normal,
        }
    }
}

/// Оружие entity
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Weapon {
    pub damage: i32,
    pub damage_type: DamageType,
    /// Cooldown между выстрелами (секунды)
    pub cooldown: f32,
    /// Уменьшается до 0
    pub cooldown_timer: f32,
    /// Дальность выстрела
    pub range: f32,
    /// Множитель дальности от скиллов (detection radius синхронизируется с ним)
    pub range_modifier: f32,
}

impl Default for Weapon {
    fn default() -> Self {
        Self::from_stats(&WeaponStats::default())
    }
}

impl Weapon {
    pub fn from_stats(stats: &WeaponStats) -> Self {
        Self {
            damage: stats.damage.max(0),
            damage_type: stats.damage_type,
            cooldown: stats.cooldown.max(0.0),
            cooldown_timer: 0.0,
            range: stats.range.max(0.0),
            range_modifier: 1.0,
        }
    }

    pub fn effective_range(&self) -> f32 {
        self.range * self.range_modifier
    }

    pub fn can_fire(&self) -> bool {
        self.cooldown_timer <= 0.0
    }

    pub fn start_cooldown(&mut self) {
        self.cooldown_timer = self.cooldown;
    }

    pub fn tick(&mut self, delta: f32) {
        if self.cooldown_timer > 0.0 {
            self.cooldown_timer = (self.cooldown_timer - delta).max(0.0);
        }
    }
}

/// System: обновление cooldown таймеров
pub fn tick_weapon_cooldowns(mut query: Query<&mut Weapon>, delta: Res<TickDelta>) {
    for mut weapon in query.iter_mut() {
        weapon.tick(delta.0);
    }
}

/// System: выстрел по текущей цели
pub fn fire_weapons(
    mut shooters: Query<(Entity, &mut Weapon, &CurrentTarget, &Transform, &Faction, &Vitals)>,
    targets: Query<(&Transform, &Vitals)>,
    mut damage: EventWriter<DamageRequest>,
) {
    for (entity, mut weapon, current, transform, faction, vitals) in shooters.iter_mut() {
        if vitals.is_dead || !vitals.in_control() || !weapon.can_fire() {
            continue;
        }
        let Some(target) = current.0 else {
            continue;
        };
        let Ok((target_transform, target_vitals)) = targets.get(target) else {
            continue;
        };
        if target_vitals.is_dead {
            continue;
        }

        let distance = transform.translation.distance(target_transform.translation);
        if distance > weapon.effective_range() {
            continue;
        }

        damage.write(DamageRequest {
            attacker: Some(entity),
            attacker_faction: Some(*faction),
            target,
            amount: weapon.damage,
            damage_type: weapon.damage_type,
        });
        weapon.start_cooldown();
    }
}
