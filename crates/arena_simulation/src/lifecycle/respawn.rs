//! Respawn локальной базы и reset-to-spawn-defaults
//!
//! Countdown вместо корутины: `RespawnCountdown` тикает каждый тик,
//! опционально ждёт ConfirmRespawn. ForcePlayerRespawn обнуляет таймер.
//!
//! Reset: позиция → SpawnPoint, бары → max, таймеры → 0, коллайдер off
//! на один тик (ReenableColliderNextTick), затем on → триггеры срабатывают заново.

use bevy::prelude::*;

use crate::combat::Weapon;
use crate::components::{
    Collider, LifecycleState, ReenableColliderNextTick, SpawnPoint, Vitals,
};
use crate::schedule::TickDelta;
use crate::sinks::VisualEvent;
use crate::targeting::{CurrentTarget, Detector, ForceRefreshTarget, TargetCandidates};

/// Внешнее подтверждение респавна (UI кнопка)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmRespawn {
    pub entity: Entity,
}

/// Пропустить остаток задержки (и подтверждение) для всех респавнов
#[derive(Event, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForcePlayerRespawn;

/// Countdown респавна базы
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct RespawnCountdown {
    pub remaining: f32,
    pub confirmed: bool,
}

impl RespawnCountdown {
    pub fn new(delay: f32, requires_confirmation: bool) -> Self {
        Self {
            remaining: delay.max(0.0),
            confirmed: !requires_confirmation,
        }
    }

    pub fn tick(&mut self, delta: f32) {
        if self.remaining > 0.0 {
            self.remaining = (self.remaining - delta).max(0.0);
        }
    }

    pub fn confirm(&mut self) {
        self.confirmed = true;
    }

    /// Preempt: таймер в ноль
    pub fn force(&mut self) {
        self.remaining = 0.0;
        self.confirmed = true;
    }

    pub fn is_ready(&self) -> bool {
        self.remaining <= 0.0 && self.confirmed
    }
}

/// Сброс entity к spawn defaults
///
/// Коллайдер остаётся выключенным до следующего тика (вызывающий
/// вешает ReenableColliderNextTick).
pub fn reset_to_spawn(
    vitals: &mut Vitals,
    transform: &mut Transform,
    spawn_point: Vec3,
    state: &mut LifecycleState,
    collider: &mut Collider,
) {
    vitals.reset_to_spawn_defaults();
    transform.translation = spawn_point;
    *state = LifecycleState::Alive;
    collider.enabled = false;
}

/// Сброс боевых таймеров: оружие готово, fallback scan на ближайшем тике
pub fn reset_combat_timers(weapon: Option<&mut Weapon>, detector: Option<&mut Detector>) {
    if let Some(weapon) = weapon {
        weapon.cooldown_timer = 0.0;
    }
    if let Some(detector) = detector {
        detector.scan_timer = 0.0;
    }
}

/// System: countdown + респавн готовых
pub fn advance_respawns(
    mut confirmations: EventReader<ConfirmRespawn>,
    mut forced: EventReader<ForcePlayerRespawn>,
    mut respawning: Query<(
        Entity,
        &mut RespawnCountdown,
        &mut Vitals,
        &mut Transform,
        &SpawnPoint,
        &mut LifecycleState,
        &mut Collider,
        Option<&mut CurrentTarget>,
        Option<&mut TargetCandidates>,
        Option<&mut Weapon>,
        Option<&mut Detector>,
    )>,
    delta: Res<TickDelta>,
    mut refresh: EventWriter<ForceRefreshTarget>,
    mut visuals: EventWriter<VisualEvent>,
    mut commands: Commands,
) {
    for confirmation in confirmations.read() {
        if let Ok((_, mut countdown, ..)) = respawning.get_mut(confirmation.entity) {
            countdown.confirm();
        }
    }

    let force = forced.read().count() > 0;

    for (
        entity,
        mut countdown,
        mut vitals,
        mut transform,
        spawn,
        mut state,
        mut collider,
        target,
        candidates,
        mut weapon,
        mut detector,
    ) in respawning.iter_mut()
    {
        if force {
            countdown.force();
        } else {
            countdown.tick(delta.0);
        }
        if !countdown.is_ready() {
            continue;
        }

        reset_to_spawn(&mut vitals, &mut transform, spawn.0, &mut state, &mut collider);
        reset_combat_timers(weapon.as_deref_mut(), detector.as_deref_mut());

        if let Some(mut target) = target {
            target.0 = None;
        }
        if let Some(mut candidates) = candidates {
            candidates.entities.clear();
        }

        commands
            .entity(entity)
            .remove::<RespawnCountdown>()
            .insert(ReenableColliderNextTick);
        refresh.write(ForceRefreshTarget { entity });

        visuals.write(VisualEvent::HitPointsChanged {
            entity,
            current: vitals.hit_points,
            max: vitals.max_hit_points,
        });
        visuals.write(VisualEvent::ShieldChanged {
            entity,
            current: vitals.shield,
            max: vitals.max_shield,
        });

        crate::logger::log_info(&format!("🔁 {:?} respawned at {:?}", entity, spawn.0));
    }
}

/// System: включить коллайдеры, выключенные на прошлом тике
pub fn reenable_colliders(
    mut query: Query<(Entity, &mut Collider), With<ReenableColliderNextTick>>,
    mut commands: Commands,
) {
    for (entity, mut collider) in query.iter_mut() {
        collider.enabled = true;
        commands.entity(entity).remove::<ReenableColliderNextTick>();
    }
}
