//! Beam resolver (channeled line-shaped урон)
//!
//! Геометрия: отрезок `origin → origin + direction × length` с шириной `width`.
//! Entity "в луче", если хотя бы одна sample point её bounds (центр + 8 углов)
//! проецируется на отрезок на расстоянии ≤ width / 2.
//!
//! Урон батчится по `damage_interval`: новые entity в луче трекаются сразу,
//! но получают урон только на ближайшей границе интервала.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::damage::{DamageRequest, DamageType};
use crate::components::{BaseStation, Bounds, Faction, LifecycleState, Vitals};
use crate::schedule::TickDelta;
use crate::targeting::selector::{nearest_enemy, NearestCandidate};
use crate::targeting::strategic::StrategicTargetRegistry;
use crate::config::SimulationConfig;
use crate::DeterministicRng;

/// Минимальный интервал урона (защита от interval = 0 из битого stat block)
pub const MIN_DAMAGE_INTERVAL: f32 = 0.01;

/// Сколько интервалов урона луч может отработать за один тик
pub const MAX_INTERVALS_PER_TICK: u32 = 4;

/// Параметры луча (из spell stat block)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamStats {
    pub damage_per_second: f32,
    pub damage_interval: f32,
    pub length: f32,
    pub width: f32,
    pub critical_strike_chance: f32,
    pub critical_strike_multiplier: f32,
    pub shield_damage_multiplier: f32,
    pub damage_type: DamageType,
}

impl Default for BeamStats {
    fn default() -> Self {
        Self {
            damage_per_second: 20.0,
            damage_interval: 0.5,
            length: 12.0,
            width: 2.0,
            critical_strike_chance: 0.0,
            critical_strike_multiplier: 2.0,
            shield_damage_multiplier: 1.0,
            damage_type: DamageType::Normal,
        }
    }
}

impl BeamStats {
    /// Урон одного интервала до крит-ролла
    pub fn damage_per_tick(&self) -> i32 {
        (self.damage_per_second * self.damage_interval * self.shield_damage_multiplier).round() as i32
    }
}

/// Геометрия луча на текущем тике
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamGeometry {
    pub origin: Vec3,
    /// Нормализован (или ZERO для вырожденного луча-точки)
    pub direction: Vec3,
    pub length: f32,
    pub width: f32,
}

/// Пересчитать геометрию луча
pub fn update_beam(origin: Vec3, direction: Vec3, length: f32, width: f32) -> BeamGeometry {
    BeamGeometry {
        origin,
        direction: direction.normalize_or_zero(),
        length: length.max(0.0),
        width: width.max(0.0),
    }
}

impl BeamGeometry {
    pub fn end(&self) -> Vec3 {
        self.origin + self.direction * self.length
    }

    /// Точка внутри луча: проекция на отрезок, clamp к [0, length],
    /// перпендикулярное расстояние ≤ width / 2
    pub fn contains_point(&self, point: Vec3) -> bool {
        let t = (point - self.origin).dot(self.direction).clamp(0.0, self.length);
        let closest = self.origin + self.direction * t;
        closest.distance(point) <= self.width * 0.5
    }

    /// Любая sample point bounds внутри луча
    pub fn intersects(&self, center: Vec3, bounds: &Bounds) -> bool {
        bounds
            .sample_points(center)
            .iter()
            .any(|point| self.contains_point(*point))
    }
}

/// Снимок потенциальной цели луча
#[derive(Debug, Clone, Copy)]
pub struct BeamCandidate {
    pub entity: Entity,
    pub position: Vec3,
    pub bounds: Bounds,
    pub faction: Faction,
    pub is_dead: bool,
    pub is_base: bool,
}

/// Все валидные entity в луче
///
/// Пропускает свою фракцию (и нейтральных), мёртвых и базы.
pub fn find_targets_in_beam(
    geometry: &BeamGeometry,
    caster_faction: Faction,
    candidates: impl IntoIterator<Item = BeamCandidate>,
) -> Vec<Entity> {
    candidates
        .into_iter()
        .filter(|c| caster_faction.is_hostile_to(c.faction))
        .filter(|c| !c.is_dead && !c.is_base)
        .filter(|c| geometry.intersects(c.position, &c.bounds))
        .map(|c| c.entity)
        .collect()
}

/// Одно попадание луча
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeamHit {
    pub target: Entity,
    pub amount: i32,
    pub critical: bool,
}

/// Крит: независимый Bernoulli trial на каждое применение
pub fn roll_critical(
    base_damage: i32,
    critical_strike_chance: f32,
    critical_strike_multiplier: f32,
    rng: &mut impl Rng,
) -> (i32, bool) {
    if critical_strike_chance > 0.0 && rng.gen::<f32>() < critical_strike_chance {
        let amount = (base_damage as f32 * critical_strike_multiplier).round() as i32;
        (amount, true)
    } else {
        (base_damage, false)
    }
}

/// Урон интервала по всем целям в луче
pub fn apply_periodic_damage(
    targets: &[Entity],
    damage_per_tick: i32,
    critical_strike_chance: f32,
    critical_strike_multiplier: f32,
    rng: &mut impl Rng,
) -> Vec<BeamHit> {
    targets
        .iter()
        .map(|&target| {
            let (amount, critical) = roll_critical(
                damage_per_tick,
                critical_strike_chance,
                critical_strike_multiplier,
                rng,
            );
            BeamHit {
                target,
                amount,
                critical,
            }
        })
        .collect()
}

/// Как луч выбирает направление
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub enum BeamAim {
    /// Направление задано при deploy
    Fixed,
    /// Каждый тик на ближайшего врага (fallback: strategic objective)
    #[default]
    NearestEnemy,
}

/// Луч (channeled spell)
#[derive(Component, Debug, Clone)]
pub struct Beam {
    pub stats: BeamStats,
    pub aim: BeamAim,
    pub direction: Vec3,
    /// До следующей границы интервала
    pub interval_timer: f32,
    /// Entity в луче на последнем тике
    pub tracked: Vec<Entity>,
}

impl Beam {
    pub fn new(mut stats: BeamStats, aim: BeamAim, direction: Vec3) -> Self {
        stats.damage_interval = stats.damage_interval.max(MIN_DAMAGE_INTERVAL);
        Self {
            interval_timer: stats.damage_interval,
            stats,
            aim,
            direction,
            tracked: Vec::new(),
        }
    }

    pub fn geometry(&self, origin: Vec3) -> BeamGeometry {
        update_beam(origin, self.direction, self.stats.length, self.stats.width)
    }

    /// Countdown интервала; возвращает сколько границ пройдено за тик
    ///
    /// Не больше `MAX_INTERVALS_PER_TICK`: лишние границы длинного тика сгорают.
    pub fn advance_interval(&mut self, delta: f32) -> u32 {
        if !(delta > 0.0) || !delta.is_finite() {
            return 0;
        }

        self.interval_timer -= delta;
        if self.interval_timer > 0.0 {
            return 0;
        }

        let interval = self.stats.damage_interval;
        let boundaries = (-self.interval_timer / interval).floor() + 1.0;
        self.interval_timer += boundaries * interval;
        // f32 на больших delta: остаток может уехать из (0, interval]
        if !(self.interval_timer > 0.0) || self.interval_timer > interval {
            self.interval_timer = interval;
        }

        boundaries.min(MAX_INTERVALS_PER_TICK as f32) as u32
    }
}

/// Система: навести лучи с BeamAim::NearestEnemy
///
/// Area/nearest политика: строго ближайший по евклиду, при равенстве — первый увиденный.
pub fn aim_beams(
    mut beams: Query<(&mut Beam, &Transform, &Faction, &LifecycleState)>,
    targets: Query<(Entity, &Transform, &Faction, &Vitals), Without<BaseStation>>,
    registry: Res<StrategicTargetRegistry>,
    positions: Query<&Transform>,
    config: Res<SimulationConfig>,
) {
    for (mut beam, transform, faction, state) in beams.iter_mut() {
        if beam.aim != BeamAim::NearestEnemy || !state.is_alive() {
            continue;
        }

        let origin = transform.translation;
        let nearest = nearest_enemy(
            origin,
            *faction,
            targets.iter().map(|(entity, t, f, vitals)| NearestCandidate {
                entity,
                position: t.translation,
                faction: *f,
                is_dead: vitals.is_dead,
            }),
        );

        let aim_point = match nearest {
            Some((_, position)) => Some(position),
            None => registry
                .get_nearest(*faction, origin, &config, |e| {
                    positions.get(e).ok().map(|t| t.translation)
                })
                .map(|objective| objective.position()),
        };

        if let Some(point) = aim_point {
            let direction = (point - origin).normalize_or_zero();
            if direction != Vec3::ZERO {
                beam.direction = direction;
            }
        }
    }
}

/// Система: трекинг целей в луче + периодический урон
///
/// Снимок кандидатов собирается до записи DamageRequest:
/// смерть цели резолвится позже, в `apply_damage_requests`.
pub fn update_beams(
    mut beams: Query<(Entity, &mut Beam, &Transform, &Faction, &LifecycleState)>,
    targets: Query<(Entity, &Transform, &Faction, &Vitals, Option<&Bounds>, Has<BaseStation>)>,
    delta: Res<TickDelta>,
    mut rng: ResMut<DeterministicRng>,
    mut damage: EventWriter<DamageRequest>,
) {
    let snapshot: Vec<BeamCandidate> = targets
        .iter()
        .map(|(entity, transform, faction, vitals, bounds, is_base)| BeamCandidate {
            entity,
            position: transform.translation,
            bounds: bounds.copied().unwrap_or_default(),
            faction: *faction,
            is_dead: vitals.is_dead,
            is_base,
        })
        .collect();

    for (beam_entity, mut beam, transform, faction, state) in beams.iter_mut() {
        if !state.is_alive() {
            beam.tracked.clear();
            continue;
        }

        let geometry = beam.geometry(transform.translation);
        beam.tracked = find_targets_in_beam(&geometry, *faction, snapshot.iter().copied());

        let boundaries = beam.advance_interval(delta.0);
        for _ in 0..boundaries {
            let hits = apply_periodic_damage(
                &beam.tracked,
                beam.stats.damage_per_tick(),
                beam.stats.critical_strike_chance,
                beam.stats.critical_strike_multiplier,
                &mut rng.rng,
            );

            for hit in hits {
                if hit.critical {
                    crate::logger::log(&format!(
                        "⚡ Beam {:?} critical on {:?}: {} damage",
                        beam_entity, hit.target, hit.amount
                    ));
                }
                damage.write(DamageRequest {
                    attacker: Some(beam_entity),
                    attacker_faction: Some(*faction),
                    target: hit.target,
                    amount: hit.amount,
                    damage_type: beam.stats.damage_type,
                });
            }
        }
    }
}
