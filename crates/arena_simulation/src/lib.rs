//! Arena Simulation Core
//!
//! Combat / targeting / unit-lifecycle симуляция RTS арены на Bevy 0.16 ECS.
//!
//! ECS = entity registry + scheduler. Визуал, UI, сеть и данные карт —
//! внешние слои: ядро получает DeployCommand / stat blocks и пишет
//! VisualEvent / MetricEvent / GameOver.
//!
//! Тик: `schedule::step(world, dt)` (тесты) или FixedUpdate (игра).

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod combat;
pub mod components;
pub mod config;
pub mod context;
pub mod error;
pub mod lifecycle;
pub mod logger;
pub mod movement;
pub mod schedule;
pub mod sinks;
pub mod spawn;
pub mod targeting;

// Re-export базовых типов для удобства
pub use combat::{
    apply_damage, regenerate, Beam, BeamAim, BeamStats, CombatPlugin, DamageDealt, DamageOutcome, DamageRequest, DamageType,
    Weapon, WeaponStats,
};
pub use components::*;
pub use config::SimulationConfig;
pub use context::{validate_match, SimulationContext};
pub use error::{ConfigError, SimulationError};
pub use lifecycle::{
    ConfirmRespawn, EntityDied, ForcePlayerRespawn, LifecyclePlugin, LifecycleTransition, PendingRemoval,
    RespawnCountdown, UnitDied, UnitPool,
};
pub use logger::init_logger;
pub use movement::MovementPlugin;
pub use schedule::{step, SimulationSet, SimulationTick, TickDelta, TickEventsAppExt};
pub use sinks::{DeployKind, GameOver, MetricEvent, UiWarning, VisualEvent};
pub use spawn::{
    deploy_unit, spawn_spell, spawn_unit, DeployCommand, SpawnPlugin, SpawnRequest, SpellRequest, SpellStats, StatBlock,
    StatBlockRegistry,
};
pub use targeting::{
    CurrentTarget, Detector, ForceRefreshTarget, Objective, RangeEvent, StrategicTargetRegistry, TargetCandidates,
    TargetingPlugin,
};

/// Главный plugin симуляции (объединяет все подсистемы)
///
/// Берёт `SimulationConfig` из World (если вставлен до plugin), иначе default.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<SimulationConfig>()
            .cloned()
            .unwrap_or_default();

        app
            // Fixed timestep для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(config.tick_hz))
            // Детерминистичный RNG (regen rounding, криты)
            .insert_resource(DeterministicRng::new(config.seed))
            .insert_resource(StrategicTargetRegistry::new(config.strategic_capacity))
            .insert_resource(SimulationContext::new(config.local_faction))
            .insert_resource(config)
            // Write-only выходы ядра
            .add_tick_event::<VisualEvent>()
            .add_tick_event::<MetricEvent>()
            .add_tick_event::<GameOver>()
            .add_plugins((
                schedule::SchedulePlugin,
                SpawnPlugin,
                TargetingPlugin,
                CombatPlugin,
                MovementPlugin,
                LifecyclePlugin,
            ));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(config: SimulationConfig) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(config)
        .add_plugins(SimulationPlugin);

    app
}

/// Snapshot мира для сравнения детерминизма
///
/// Сортировка по EntityId (Bevy Entity index переиспользуется).
pub fn world_snapshot<T>(world: &mut World) -> Vec<u8>
where
    T: Component + std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(&EntityId, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();
    entities.sort_by_key(|(id, _)| **id);

    // Сериализуем в байты через Debug (простейший способ)
    for (id, component) in entities {
        snapshot.extend_from_slice(&id.0.to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
