//! Movement компоненты: команды перемещения, скорость

use bevy::prelude::*;

/// Команда движения (high-level intent)
///
/// Targeting пишет команду, `movement::move_units` её исполняет.
#[derive(Component, Debug, Clone, PartialEq, Default, Reflect)]
#[reflect(Component)]
pub enum MovementCommand {
    /// Стоять на месте
    #[default]
    Idle,
    /// Двигаться к позиции (default attack direction без цели)
    MoveToPosition { target: Vec3 },
    /// Следовать за entity (текущая цель)
    FollowEntity { target: Entity },
}

/// Скорость движения (метры/сек). Без компонента entity неподвижна.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Mobility {
    pub speed: f32,
}
