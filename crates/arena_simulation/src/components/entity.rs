//! Идентичность entity: EntityId, Faction, LifecycleState, capability markers

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Стабильный ID симулируемой entity
///
/// Монотонно выдаётся `EntityIdAllocator`, не переиспользуется
/// (в отличие от Bevy `Entity`, у которого index переиспользуется с новым generation).
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Reflect)]
#[reflect(Component)]
pub struct EntityId(pub u64);

/// Выдача EntityId
#[derive(Resource, Debug)]
pub struct EntityIdAllocator {
    next: u64,
}

impl Default for EntityIdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }
}

/// Фракция entity
///
/// Заменяет legacy двухкомандную модель: `Team` — производная проекция.
#[derive(
    Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Reflect, Serialize, Deserialize,
)]
#[reflect(Component)]
pub enum Faction {
    Player,
    Enemy,
    Neutral,
}

/// Legacy команда (Blue = Player, всё остальное Red)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Team {
    Blue,
    Red,
}

impl Faction {
    pub const ALL: [Faction; 3] = [Faction::Player, Faction::Enemy, Faction::Neutral];

    pub fn team(self) -> Team {
        match self {
            Faction::Player => Team::Blue,
            _ => Team::Red,
        }
    }

    /// Враждебны только Player и Enemy; Neutral не атакует и не атакуется
    pub fn is_hostile_to(self, other: Faction) -> bool {
        matches!(
            (self, other),
            (Faction::Player, Faction::Enemy) | (Faction::Enemy, Faction::Player)
        )
    }

    pub fn opponent(self) -> Option<Faction> {
        match self {
            Faction::Player => Some(Faction::Enemy),
            Faction::Enemy => Some(Faction::Player),
            Faction::Neutral => None,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Faction::Player => 0,
            Faction::Enemy => 1,
            Faction::Neutral => 2,
        }
    }
}

/// Lifecycle state machine
///
/// - Обычные entity: Alive → Dead → (despawn)
/// - Базы: Alive → Dead → Respawning → Alive (повторяемо)
/// - Pooled боты: Alive → Dead → Pooled → Alive
///
/// `Dying` не хранится: это мгновенный переход (см. `lifecycle::death`).
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Component)]
pub enum LifecycleState {
    #[default]
    Alive,
    Dead,
    Respawning,
    Pooled,
}

impl LifecycleState {
    pub fn is_alive(self) -> bool {
        self == LifecycleState::Alive
    }
}

/// Маркер: база (never destroyed для локального игрока, game over для противника)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct BaseStation;

/// Маркер: entity возвращается в UnitPool вместо despawn
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct Pooled {
    /// Ключ пула (prefab)
    pub key: String,
}

/// Владелец entity (игрок/спавнер, который её задеплоил)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Owner(pub u64);

/// Prefab для визуального слоя (data-driven)
#[derive(Component, Debug, Clone, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct PrefabRef {
    pub path: String,
}

impl PrefabRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}
