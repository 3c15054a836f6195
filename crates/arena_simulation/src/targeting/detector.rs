//! Target detector
//!
//! Два механизма поддержания TargetCandidates:
//! 1. Incremental: RangeEvent::Entered / Exited (trigger-based)
//! 2. Fallback scan: раз в `scan_interval`, пока нет текущей цели
//!    (trigger события ненадёжны: spawn внутри радиуса, реактивация из пула)
//!
//! Trigger события генерирует `poll_detection_ranges`: сравнивает текущий
//! overlap set с предыдущим (RangeTracking), как VisionCone polling.

use std::collections::{BTreeMap, BTreeSet};

use bevy::prelude::*;

use crate::combat::Weapon;
use crate::components::{Bounds, Collider, EntityId, Faction, Vitals};
use crate::schedule::TickDelta;
use crate::targeting::CurrentTarget;

/// Детектор врагов (радиус обнаружения)
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Detector {
    /// Радиус из stat block (до модификаторов)
    pub base_radius: f32,
    /// Актуальный радиус, синхронизируется с оружием каждый тик
    pub radius: f32,
    /// Период fallback scan
    pub scan_interval: f32,
    /// До следующего fallback scan
    pub scan_timer: f32,
}

impl Detector {
    pub fn new(radius: f32, scan_interval: f32) -> Self {
        let radius = radius.max(0.0);
        Self {
            base_radius: radius,
            radius,
            scan_interval: scan_interval.max(0.0),
            scan_timer: 0.0,
        }
    }
}

/// Живые враги в радиусе обнаружения
///
/// Порядок не значим. Никогда не содержит себя, свою фракцию, мёртвых.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct TargetCandidates {
    pub entities: Vec<Entity>,
}

impl TargetCandidates {
    /// Добавить `other`, если он живой враг
    pub fn on_enter_range(&mut self, owner: Entity, other: Entity, other_alive: bool, hostile: bool) -> bool {
        if other == owner || !other_alive || !hostile || self.contains(other) {
            return false;
        }
        self.entities.push(other);
        true
    }

    /// Убрать `other` без проверок фракции
    pub fn on_exit_range(&mut self, other: Entity) -> bool {
        let before = self.entities.len();
        self.entities.retain(|&e| e != other);
        before != self.entities.len()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains(&entity)
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }
}

/// Trigger события радиуса обнаружения
///
/// Генерирует `poll_detection_ranges`; внешний слой тоже может писать их напрямую.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEvent {
    Entered { observer: Entity, other: Entity },
    Exited { observer: Entity, other: Entity },
}

/// Taunt / внешний сброс: очистить цель и сразу пересканировать
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForceRefreshTarget {
    pub entity: Entity,
}

/// Кто кого "видит" триггером (для Entered/Exited diff)
#[derive(Resource, Debug, Default)]
pub struct RangeTracking {
    pub overlaps: BTreeMap<Entity, BTreeSet<Entity>>,
}

impl RangeTracking {
    pub fn forget(&mut self, entity: Entity) {
        self.overlaps.remove(&entity);
        for set in self.overlaps.values_mut() {
            set.remove(&entity);
        }
    }
}

/// System: detection radius = base radius × модификатор дальности оружия
pub fn sync_detection_radius(mut query: Query<(&mut Detector, Option<&Weapon>)>) {
    for (mut detector, weapon) in query.iter_mut() {
        let modifier = weapon.map(|w| w.range_modifier).unwrap_or(1.0);
        let radius = (detector.base_radius * modifier).max(0.0);
        if detector.radius != radius {
            detector.radius = radius;
        }
    }
}

/// System: эмуляция range trigger через overlap polling
///
/// Выключенный коллайдер (наблюдателя или тела) = нет overlap.
pub fn poll_detection_ranges(
    observers: Query<(Entity, &Detector, &Transform, &Collider)>,
    bodies: Query<(Entity, &Transform, &Collider, Option<&Bounds>)>,
    mut tracking: ResMut<RangeTracking>,
    mut events: EventWriter<RangeEvent>,
) {
    // Наблюдатели, которых больше нет: Exited не нужен, их кандидаты исчезли вместе с ними
    tracking
        .overlaps
        .retain(|observer, _| observers.contains(*observer));

    for (observer, detector, transform, collider) in observers.iter() {
        let mut current = BTreeSet::new();

        if collider.enabled {
            for (other, other_transform, other_collider, bounds) in bodies.iter() {
                if other == observer || !other_collider.enabled {
                    continue;
                }
                let reach = detector.radius + bounds.map(|b| b.half_extents.max_element()).unwrap_or(0.0);
                if transform.translation.distance(other_transform.translation) <= reach {
                    current.insert(other);
                }
            }
        }

        let previous = tracking.overlaps.entry(observer).or_default();

        for &other in current.difference(previous) {
            events.write(RangeEvent::Entered { observer, other });
        }
        for &other in previous.difference(&current) {
            events.write(RangeEvent::Exited { observer, other });
        }

        *previous = current;
    }
}

/// System: применить RangeEvent к TargetCandidates
pub fn apply_range_events(
    mut events: EventReader<RangeEvent>,
    mut observers: Query<(&mut TargetCandidates, &Faction)>,
    others: Query<(&Faction, &Vitals)>,
) {
    for event in events.read() {
        match *event {
            RangeEvent::Entered { observer, other } => {
                let Ok((mut candidates, faction)) = observers.get_mut(observer) else {
                    continue;
                };
                // Без Vitals (спеллы) — не цель
                let Ok((other_faction, other_vitals)) = others.get(other) else {
                    continue;
                };
                if candidates.on_enter_range(
                    observer,
                    other,
                    other_vitals.is_alive(),
                    faction.is_hostile_to(*other_faction),
                ) {
                    crate::logger::log(&format!("👁️ {:?} detected enemy {:?}", observer, other));
                }
            }
            RangeEvent::Exited { observer, other } => {
                if let Ok((mut candidates, _)) = observers.get_mut(observer) {
                    candidates.on_exit_range(other);
                }
            }
        }
    }
}

/// System: убрать мёртвых / исчезнувших / сменивших фракцию из кандидатов
///
/// Exit trigger при смерти не приходит, поэтому чистим явно.
pub fn prune_candidates(
    mut observers: Query<(Entity, &mut TargetCandidates, &Faction)>,
    others: Query<(&Faction, &Vitals)>,
) {
    for (observer, mut candidates, faction) in observers.iter_mut() {
        let initial = candidates.len();
        candidates.entities.retain(|&e| {
            e != observer
                && others
                    .get(e)
                    .map(|(f, v)| v.is_alive() && faction.is_hostile_to(*f))
                    .unwrap_or(false)
        });

        let removed = initial - candidates.len();
        if removed > 0 {
            crate::logger::log(&format!(
                "Targeting: {:?} dropped {} invalid candidates",
                observer, removed
            ));
        }
    }
}

/// Снимок entity для fallback scan
#[derive(Debug, Clone, Copy)]
pub struct ScanCandidate {
    pub entity: Entity,
    pub id: EntityId,
    pub position: Vec3,
    pub faction: Faction,
    pub is_dead: bool,
}

/// Fallback scan: первый (по EntityId) живой враг в радиусе
pub fn fallback_scan(
    owner: Entity,
    origin: Vec3,
    faction: Faction,
    radius: f32,
    candidates: impl IntoIterator<Item = ScanCandidate>,
) -> Option<Entity> {
    candidates
        .into_iter()
        .filter(|c| c.entity != owner && !c.is_dead && faction.is_hostile_to(c.faction))
        .filter(|c| origin.distance(c.position) <= radius)
        .min_by_key(|c| c.id)
        .map(|c| c.entity)
}

/// System: fallback scan + ForceRefreshTarget
///
/// Работает после selector: сканируем только тех, кто остался без цели.
/// Найденная цель добавляется и в кандидаты (trigger её пропустил).
pub fn fallback_target_scan(
    mut refresh_events: EventReader<ForceRefreshTarget>,
    mut scanners: Query<(
        Entity,
        &mut Detector,
        &mut TargetCandidates,
        &mut CurrentTarget,
        &Transform,
        &Faction,
        &Vitals,
    )>,
    everyone: Query<(Entity, &EntityId, &Transform, &Faction, &Vitals)>,
    delta: Res<TickDelta>,
) {
    let forced: BTreeSet<Entity> = refresh_events.read().map(|e| e.entity).collect();

    let snapshot: Vec<ScanCandidate> = everyone
        .iter()
        .map(|(entity, id, transform, faction, vitals)| ScanCandidate {
            entity,
            id: *id,
            position: transform.translation,
            faction: *faction,
            is_dead: vitals.is_dead,
        })
        .collect();

    for (entity, mut detector, mut candidates, mut current, transform, faction, vitals) in scanners.iter_mut() {
        if vitals.is_dead {
            continue;
        }

        let force = forced.contains(&entity);
        if force {
            current.0 = None;
            detector.scan_timer = 0.0;
        } else {
            if current.0.is_some() {
                continue;
            }
            detector.scan_timer -= delta.0;
            if detector.scan_timer > 0.0 {
                continue;
            }
        }
        detector.scan_timer = detector.scan_interval;

        let found = fallback_scan(
            entity,
            transform.translation,
            *faction,
            detector.radius,
            snapshot.iter().copied(),
        );

        if let Some(target) = found {
            if !candidates.contains(target) {
                candidates.entities.push(target);
            }
            current.0 = Some(target);
            crate::logger::log(&format!(
                "🔍 {:?} fallback scan adopted {:?}{}",
                entity,
                target,
                if force { " (forced)" } else { "" }
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(index: u32) -> Entity {
        Entity::from_raw(index)
    }

    fn scan(index: u32, id: u64, position: Vec3, faction: Faction) -> ScanCandidate {
        ScanCandidate {
            entity: e(index),
            id: EntityId(id),
            position,
            faction,
            is_dead: false,
        }
    }

    #[test]
    fn test_enter_range_filters() {
        let mut candidates = TargetCandidates::default();
        let owner = e(1);

        assert!(!candidates.on_enter_range(owner, owner, true, true));
        assert!(!candidates.on_enter_range(owner, e(2), false, true));
        assert!(!candidates.on_enter_range(owner, e(3), true, false));
        assert!(candidates.on_enter_range(owner, e(4), true, true));
        assert!(!candidates.on_enter_range(owner, e(4), true, true));

        assert_eq!(candidates.entities, vec![e(4)]);
    }

    #[test]
    fn test_exit_range_is_unconditional() {
        let mut candidates = TargetCandidates {
            entities: vec![e(2), e(3)],
        };
        assert!(candidates.on_exit_range(e(2)));
        assert!(!candidates.on_exit_range(e(9)));
        assert_eq!(candidates.entities, vec![e(3)]);
    }

    #[test]
    fn test_fallback_scan_picks_lowest_id_in_range() {
        let found = fallback_scan(
            e(1),
            Vec3::ZERO,
            Faction::Player,
            10.0,
            [
                scan(1, 1, Vec3::ZERO, Faction::Enemy),
                scan(2, 9, Vec3::new(2.0, 0.0, 0.0), Faction::Enemy),
                scan(3, 4, Vec3::new(5.0, 0.0, 0.0), Faction::Enemy),
                scan(4, 2, Vec3::new(1.0, 0.0, 0.0), Faction::Player),
                scan(5, 3, Vec3::new(50.0, 0.0, 0.0), Faction::Enemy),
            ],
        );
        assert_eq!(found, Some(e(3)));
    }

    #[test]
    fn test_fallback_scan_skips_dead() {
        let mut dead = scan(2, 1, Vec3::ZERO, Faction::Enemy);
        dead.is_dead = true;
        let found = fallback_scan(e(1), Vec3::ZERO, Faction::Player, 10.0, [dead]);
        assert_eq!(found, None);
    }

    #[test]
    fn test_range_tracking_forget() {
        let mut tracking = RangeTracking::default();
        tracking.overlaps.entry(e(1)).or_default().insert(e(2));
        tracking.overlaps.entry(e(2)).or_default().insert(e(1));

        tracking.forget(e(2));

        assert!(!tracking.overlaps.contains_key(&e(2)));
        assert!(tracking.overlaps[&e(1)].is_empty());
    }
}
