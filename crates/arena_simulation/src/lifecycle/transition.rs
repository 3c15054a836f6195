//! LifecycleTransition — что делать с entity после смерти
//!
//! Чистая функция: решение принимается из capability данных entity,
//! исполняется системами (`death::dispatch_unit_deaths`).

use crate::components::Faction;
use crate::config::SimulationConfig;

/// Что знаем о погибшей entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeathContext<'a> {
    pub faction: Faction,
    pub is_base: bool,
    /// Ключ пула (Some для pooled ботов)
    pub pool_key: Option<&'a str>,
    pub local_faction: Faction,
}

/// Переход после смерти
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleTransition {
    /// Обычная entity: удалить после death animation
    RemoveAfter { grace: f32 },
    /// Pooled бот: вернуть в пул после death animation
    ReturnToPool { key: String, grace: f32 },
    /// Локальная база: никогда не удаляется, респавн после задержки
    Respawn { delay: f32, requires_confirmation: bool },
    /// База противника локального игрока: конец матча
    GameOver { loser: Faction },
}

/// Решение по смерти entity
///
/// Прочие базы (нейтральные постройки) умирают как обычные entity.
pub fn resolve_death(death: DeathContext<'_>, config: &SimulationConfig) -> LifecycleTransition {
    if death.is_base {
        if death.faction == death.local_faction {
            return LifecycleTransition::Respawn {
                delay: config.respawn_delay,
                requires_confirmation: config.respawn_requires_confirmation,
            };
        }
        if Some(death.faction) == death.local_faction.opponent() {
            return LifecycleTransition::GameOver { loser: death.faction };
        }
    }

    match death.pool_key {
        Some(key) => LifecycleTransition::ReturnToPool {
            key: key.to_string(),
            grace: config.death_grace_period,
        },
        None => LifecycleTransition::RemoveAfter {
            grace: config.death_grace_period,
        },
    }
}
