//! Write-only выходы ядра: визуальный слой, метрики, game over
//!
//! Ядро только пишет события. Подписчики (UI, скоринг, game loop) опциональны:
//! если никто не читает, события просто устаревают через два update.

use bevy::prelude::*;

use crate::components::Faction;

/// События для визуального/UI слоя
#[derive(Event, Debug, Clone, PartialEq)]
pub enum VisualEvent {
    HitPointsChanged { entity: Entity, current: i32, max: i32 },
    ShieldChanged { entity: Entity, current: i32, max: i32 },
    DeathAnimation { entity: Entity },
    XpGained { entity: Entity, amount: u32 },
    Warning(UiWarning),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiWarning {
    UnitLimitReached { faction: Faction },
}

/// Дельты для внешней агрегации метрик
#[derive(Event, Debug, Clone, PartialEq)]
pub enum MetricEvent {
    /// Урон, реально снятый с HP (self-faction урон не считается)
    DamageDealt { faction: Faction, amount: i32 },
    Kill { faction: Faction },
    Deploy { faction: Faction, kind: DeployKind },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployKind {
    Unit,
    Spell,
}

/// Матч окончен: база `loser` уничтожена (эмитится один раз)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOver {
    pub loser: Faction,
    pub winner: Option<Faction>,
}
