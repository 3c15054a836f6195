//! Strategic target registry
//!
//! Bounded FIFO список приоритетных целей (базы и т.п.) на фракцию.
//! Используется как default objective, когда нет живого боя.

use std::collections::VecDeque;

use bevy::prelude::*;

use crate::components::{BaseStation, Faction};
use crate::config::SimulationConfig;
use crate::lifecycle::UnitDied;

/// Куда идти/целиться без живой цели
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Objective {
    /// Зарегистрированная strategic entity
    Entity { entity: Entity, position: Vec3 },
    /// Legacy fixed позиция базы (registry пуст)
    LegacyPosition(Vec3),
}

impl Objective {
    pub fn position(&self) -> Vec3 {
        match *self {
            Objective::Entity { position, .. } => position,
            Objective::LegacyPosition(position) => position,
        }
    }

    pub fn entity(&self) -> Option<Entity> {
        match *self {
            Objective::Entity { entity, .. } => Some(entity),
            Objective::LegacyPosition(_) => None,
        }
    }
}

/// Per-faction bounded FIFO
///
/// Вставка при заполненном списке вытесняет самую старую запись.
#[derive(Resource, Debug, Clone)]
pub struct StrategicTargetRegistry {
    capacity: usize,
    lists: [VecDeque<Entity>; 3],
}

impl Default for StrategicTargetRegistry {
    fn default() -> Self {
        Self::new(SimulationConfig::default().strategic_capacity)
    }
}

impl StrategicTargetRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            lists: Default::default(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Зарегистрировать entity своей фракции
    ///
    /// Returns вытесненную entity (если список был полон).
    /// Повторная регистрация — no-op.
    pub fn register(&mut self, faction: Faction, entity: Entity) -> Option<Entity> {
        let list = &mut self.lists[faction.index()];
        if list.contains(&entity) {
            return None;
        }

        let evicted = if list.len() >= self.capacity {
            list.pop_front()
        } else {
            None
        };
        list.push_back(entity);

        if let Some(old) = evicted {
            crate::logger::log(&format!(
                "Strategic registry ({:?}) full, evicted {:?} for {:?}",
                faction, old, entity
            ));
        }
        evicted
    }

    /// Убрать entity из всех списков
    pub fn unregister(&mut self, entity: Entity) -> bool {
        let mut removed = false;
        for list in self.lists.iter_mut() {
            let before = list.len();
            list.retain(|&e| e != entity);
            removed |= before != list.len();
        }
        removed
    }

    /// Записи фракции, от старой к новой
    pub fn entries(&self, faction: Faction) -> impl Iterator<Item = Entity> + '_ {
        self.lists[faction.index()].iter().copied()
    }

    pub fn len(&self, faction: Faction) -> usize {
        self.lists[faction.index()].len()
    }

    pub fn is_empty(&self, faction: Faction) -> bool {
        self.lists[faction.index()].is_empty()
    }

    /// Ближайший objective противника для `for_faction`
    ///
    /// `position_of` резолвит позицию entity (None = entity исчезла, пропускаем).
    /// Если у противника нет резолвимых записей — legacy позиция его базы.
    /// Neutral не имеет противника → None.
    pub fn get_nearest(
        &self,
        for_faction: Faction,
        reference: Vec3,
        config: &SimulationConfig,
        position_of: impl Fn(Entity) -> Option<Vec3>,
    ) -> Option<Objective> {
        let opponent = for_faction.opponent()?;

        let mut best: Option<(Entity, Vec3, f32)> = None;
        for entity in self.entries(opponent) {
            let Some(position) = position_of(entity) else {
                continue;
            };
            let distance = reference.distance_squared(position);
            match best {
                Some((_, _, best_distance)) if distance >= best_distance => {}
                _ => best = Some((entity, position, distance)),
            }
        }

        match best {
            Some((entity, position, _)) => Some(Objective::Entity { entity, position }),
            None => config
                .legacy_base_position(opponent)
                .map(Objective::LegacyPosition),
        }
    }
}

/// System: убрать погибшие non-base strategic entity
///
/// Базы остаются (респавн / game over решает lifecycle).
pub fn forget_dead_objectives(
    mut deaths: EventReader<UnitDied>,
    bases: Query<(), With<BaseStation>>,
    mut registry: ResMut<StrategicTargetRegistry>,
) {
    for death in deaths.read() {
        if bases.contains(death.entity) {
            continue;
        }
        registry.unregister(death.entity);
    }
}
