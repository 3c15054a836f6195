//! Регенерация shield / HP
//!
//! За тик набегает `rate × dt` единиц. Целая часть применяется сразу,
//! дробная — как вероятность одного дополнительного пункта (stochastic rounding).
//! RNG инжектится: в симуляции это DeterministicRng, в тестах mock.

use bevy::prelude::*;
use rand::Rng;

use crate::components::{Regeneration, Vitals};
use crate::schedule::TickDelta;
use crate::sinks::VisualEvent;
use crate::DeterministicRng;

/// Какие бары изменились за тик
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegenOutcome {
    pub shield_changed: bool,
    pub hp_changed: bool,
}

/// Целое количество единиц за тик (stochastic rounding)
pub fn stochastic_gain(rate: f32, delta: f32, rng: &mut impl Rng) -> i32 {
    let amount = rate * delta;
    if !(amount > 0.0) {
        return 0;
    }

    let whole = amount.floor();
    let fraction = amount - whole;
    let mut gain = whole.min(i32::MAX as f32) as i32;
    if fraction > 0.0 && rng.gen::<f32>() < fraction {
        gain = gain.saturating_add(1);
    }
    gain
}

/// Один тик регенерации
///
/// Пока таймер подавления > 0, он уменьшается и бар в этот тик не растёт.
/// Мёртвые не регенерируют.
pub fn regenerate(
    vitals: &mut Vitals,
    regen: &Regeneration,
    delta: f32,
    rng: &mut impl Rng,
) -> RegenOutcome {
    let mut outcome = RegenOutcome::default();
    if vitals.is_dead || !(delta > 0.0) {
        return outcome;
    }

    if vitals.shield_suppress_timer > 0.0 {
        vitals.shield_suppress_timer = (vitals.shield_suppress_timer - delta).max(0.0);
    } else if vitals.shield < vitals.max_shield {
        let gain = stochastic_gain(regen.shield_per_second, delta, rng);
        if gain > 0 {
            vitals.shield = vitals.shield.saturating_add(gain).min(vitals.max_shield);
            outcome.shield_changed = true;
        }
    }

    if vitals.hp_regen_timer > 0.0 {
        vitals.hp_regen_timer = (vitals.hp_regen_timer - delta).max(0.0);
    } else if vitals.hit_points < vitals.max_hit_points {
        let gain = stochastic_gain(regen.hit_points_per_second, delta, rng);
        if gain > 0 {
            vitals.hit_points = vitals.hit_points.saturating_add(gain).min(vitals.max_hit_points);
            outcome.hp_changed = true;
        }
    }

    outcome
}

/// Система: регенерация всех entity с Regeneration
pub fn regenerate_vitals(
    mut query: Query<(Entity, &mut Vitals, &Regeneration)>,
    delta: Res<TickDelta>,
    mut rng: ResMut<DeterministicRng>,
    mut visuals: EventWriter<VisualEvent>,
) {
    let delta = delta.0;

    for (entity, mut vitals, regen) in query.iter_mut() {
        let outcome = regenerate(&mut vitals, regen, delta, &mut rng.rng);

        if outcome.shield_changed {
            visuals.write(VisualEvent::ShieldChanged {
                entity,
                current: vitals.shield,
                max: vitals.max_shield,
            });
        }
        if outcome.hp_changed {
            visuals.write(VisualEvent::HitPointsChanged {
                entity,
                current: vitals.hit_points,
                max: vitals.max_hit_points,
            });
        }
    }
}

/// Система: countdown каста
pub fn tick_casting(mut query: Query<&mut Vitals>, delta: Res<TickDelta>) {
    for mut vitals in query.iter_mut() {
        if vitals.casting_time_remaining > 0.0 {
            vitals.tick_casting(delta.0);
        }
    }
}
