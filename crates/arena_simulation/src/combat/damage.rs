//! Damage resolver
//!
//! Маршрутизация урона: shield → overflow в HP, либо напрямую в HP
//! (по DamageType). Смерть — идемпотентный переход через `Vitals::kill`.
//!
//! Все источники урона (оружие, лучи, внешние команды) пишут `DamageRequest`,
//! а `apply_damage_requests` применяет их последовательно. Так death callback
//! никогда не мутирует entity set посреди чужой итерации.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::{Faction, Vitals};
use crate::config::SimulationConfig;
use crate::lifecycle::{EntityDied, UnitDied};
use crate::sinks::{MetricEvent, VisualEvent};

/// Тип урона
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
pub enum DamageType {
    /// Сначала щит, overflow в HP
    #[default]
    Normal,
    /// Игнорирует щит, только HP
    Direct,
    /// Только щит, HP не трогает никогда
    Shield,
}

/// Результат одного применения урона
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DamageOutcome {
    pub applied_to_shield: i32,
    pub applied_to_hp: i32,
    /// true только при переходе alive → dead в этом вызове
    pub died: bool,
}

/// Задержки регенерации, которые взводит попадание
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageDelays {
    pub shield_regen_delay: f32,
    pub hp_regen_delay: f32,
}

impl From<&SimulationConfig> for DamageDelays {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            shield_regen_delay: config.shield_regen_delay,
            hp_regen_delay: config.hp_regen_delay,
        }
    }
}

/// Применить урон к entity
///
/// No-op если entity мертва, не в контроле (disabled / кастует) или `amount <= 0`.
/// Каждое прошедшее попадание взводит оба regen таймера, даже Direct.
pub fn apply_damage(
    vitals: &mut Vitals,
    amount: i32,
    damage_type: DamageType,
    delays: DamageDelays,
) -> DamageOutcome {
    if vitals.is_dead || !vitals.in_control() || amount <= 0 {
        return DamageOutcome::default();
    }

    vitals.shield_suppress_timer = delays.shield_regen_delay;
    vitals.hp_regen_timer = delays.hp_regen_delay;

    let shield_before = vitals.shield;
    let hp_before = vitals.hit_points;

    // i64: amount + overflow не переполнят i32 на промежуточных шагах
    let mut shield = i64::from(vitals.shield);
    let mut hit_points = i64::from(vitals.hit_points);
    let amount = i64::from(amount);

    if shield > 0 && damage_type != DamageType::Direct {
        shield -= amount;
        if shield < 0 {
            if damage_type == DamageType::Normal {
                // Отрицательный остаток щита уходит в HP
                hit_points += shield;
            }
            shield = 0;
        }
    } else if damage_type != DamageType::Shield {
        hit_points -= amount;
    }

    let mut died = false;
    if hit_points <= 0 {
        if vitals.immortal {
            hit_points = hit_points.max(1);
        } else {
            hit_points = 0;
        }
    }

    vitals.shield = shield as i32;
    vitals.hit_points = hit_points as i32;

    if vitals.hit_points == 0 && !vitals.immortal {
        died = vitals.kill();
    }
    vitals.clamp();

    DamageOutcome {
        applied_to_shield: shield_before - vitals.shield,
        applied_to_hp: hp_before - vitals.hit_points,
        died,
    }
}

/// Запрос на урон
#[derive(Event, Debug, Clone)]
pub struct DamageRequest {
    /// Кто наносит (None = окружение / внешняя команда)
    pub attacker: Option<Entity>,
    /// Фракция источника (спелл мог уже исчезнуть к моменту резолва)
    pub attacker_faction: Option<Faction>,
    pub target: Entity,
    pub amount: i32,
    pub damage_type: DamageType,
}

/// Событие: урон применён (для реакций и фидбэка)
#[derive(Event, Debug, Clone)]
pub struct DamageDealt {
    pub attacker: Option<Entity>,
    pub target: Entity,
    pub outcome: DamageOutcome,
}

/// Система: применить все DamageRequest этого тика
pub fn apply_damage_requests(
    mut requests: EventReader<DamageRequest>,
    mut targets: Query<(&mut Vitals, &Faction)>,
    config: Res<SimulationConfig>,
    mut damage_dealt: EventWriter<DamageDealt>,
    mut metrics: EventWriter<MetricEvent>,
    mut visuals: EventWriter<VisualEvent>,
    mut entity_died: EventWriter<EntityDied>,
    mut unit_died: EventWriter<UnitDied>,
) {
    let delays = DamageDelays::from(config.as_ref());

    for request in requests.read() {
        let Ok((mut vitals, target_faction)) = targets.get_mut(request.target) else {
            crate::logger::log(&format!(
                "DamageRequest: target {:?} has no Vitals (despawned?)",
                request.target
            ));
            continue;
        };

        let outcome = apply_damage(&mut vitals, request.amount, request.damage_type, delays);
        if outcome == DamageOutcome::default() {
            continue;
        }

        damage_dealt.write(DamageDealt {
            attacker: request.attacker,
            target: request.target,
            outcome,
        });

        // Урон по своей фракции не скорится
        if let Some(attacker_faction) = request.attacker_faction {
            if attacker_faction != *target_faction && outcome.applied_to_hp > 0 {
                metrics.write(MetricEvent::DamageDealt {
                    faction: attacker_faction,
                    amount: outcome.applied_to_hp,
                });
            }
        }

        if outcome.applied_to_shield > 0 {
            visuals.write(VisualEvent::ShieldChanged {
                entity: request.target,
                current: vitals.shield,
                max: vitals.max_shield,
            });
        }
        if outcome.applied_to_hp > 0 {
            visuals.write(VisualEvent::HitPointsChanged {
                entity: request.target,
                current: vitals.hit_points,
                max: vitals.max_hit_points,
            });
        }

        if outcome.died {
            crate::logger::log_info(&format!(
                "💀 {:?} killed by {:?}",
                request.target, request.attacker
            ));
            // Два канала: общие реакции + lifecycle bookkeeping
            entity_died.write(EntityDied {
                entity: request.target,
                killer: request.attacker,
            });
            unit_died.write(UnitDied {
                entity: request.target,
                killer: request.attacker,
                killer_faction: request.attacker_faction,
            });
        }
    }
}
