//! Simulation tick schedule
//!
//! Один тик = один прогон `SimulationTick` с фиксированным `TickDelta`.
//! FixedUpdate вызывает тик с `Time<Fixed>` delta; тесты и headless хост вызывают
//! `step` напрямую (без wall-clock → детерминизм).
//!
//! Буферы событий ядра: в FixedUpdate их обновляет сам Bevy (`First`),
//! а `step` обновляет их в конце тика, иначе они растут без ограничений.

use std::any::TypeId;

use bevy::ecs::schedule::{ExecutorKind, ScheduleLabel};
use bevy::prelude::*;

/// Schedule одного тика симуляции
#[derive(ScheduleLabel, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimulationTick;

/// Фазы тика (выполняются строго по порядку)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Таймеры, внешние команды (deploy, respawn confirm)
    Input,
    /// Range triggers → TargetCandidates
    Detection,
    /// CurrentTarget, fallback scan, movement objectives
    Selection,
    /// Оружие и лучи пишут DamageRequest; движение
    Combat,
    /// Урон, смерть, регенерация
    Resolution,
    /// Death dispatch, respawn, pooling
    Lifecycle,
    /// Отложенное удаление, collider toggles
    Cleanup,
}

/// dt текущего тика (секунды)
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct TickDelta(pub f32);

/// Регистрирует schedule и порядок фаз
pub struct SchedulePlugin;

impl Plugin for SchedulePlugin {
    fn build(&self, app: &mut App) {
        app.init_schedule(SimulationTick)
            .init_resource::<TickDelta>()
            .edit_schedule(SimulationTick, |schedule| {
                // Одна entity за раз, без параллельных апдейтов
                schedule.set_executor_kind(ExecutorKind::SingleThreaded);
            })
            .configure_sets(
                SimulationTick,
                (
                    SimulationSet::Input,
                    SimulationSet::Detection,
                    SimulationSet::Selection,
                    SimulationSet::Combat,
                    SimulationSet::Resolution,
                    SimulationSet::Lifecycle,
                    SimulationSet::Cleanup,
                )
                    .chain(),
            )
            .add_systems(FixedUpdate, run_simulation_tick);
    }
}

/// События, которые `step` обновляет после тика
#[derive(Resource, Default)]
pub struct TickEventUpdaters {
    updaters: Vec<(TypeId, fn(&mut World))>,
}

impl TickEventUpdaters {
    fn register<T: Event>(&mut self) {
        let id = TypeId::of::<T>();
        if !self.updaters.iter().any(|(registered, _)| *registered == id) {
            self.updaters.push((id, update_events::<T> as fn(&mut World)));
        }
    }
}

fn update_events<T: Event>(world: &mut World) {
    if let Some(mut events) = world.get_resource_mut::<Events<T>>() {
        events.update();
    }
}

/// `add_event` + регистрация в `TickEventUpdaters`
pub trait TickEventsAppExt {
    fn add_tick_event<T: Event>(&mut self) -> &mut Self;
}

impl TickEventsAppExt for App {
    fn add_tick_event<T: Event>(&mut self) -> &mut Self {
        self.add_event::<T>();
        self.world_mut()
            .get_resource_or_insert_with(TickEventUpdaters::default)
            .register::<T>();
        self
    }
}

/// Прогнать ровно один тик с заданным dt и обновить буферы событий
///
/// Событие живёт два `step`: читатели следующего тика его ещё видят.
pub fn step(world: &mut World, dt: f32) {
    run_tick(world, dt);

    let updaters: Vec<fn(&mut World)> = world
        .get_resource::<TickEventUpdaters>()
        .map(|registry| registry.updaters.iter().map(|(_, update)| *update).collect())
        .unwrap_or_default();
    for update in updaters {
        update(world);
    }
}

/// Один прогон `SimulationTick` (без обновления событий)
///
/// Не-конечный или отрицательный dt превращается в 0.
fn run_tick(world: &mut World, dt: f32) {
    let dt = if dt.is_finite() {
        dt.max(0.0)
    } else {
        crate::logger::log_warning(&format!("Tick with non-finite dt {} treated as 0", dt));
        0.0
    };
    world.insert_resource(TickDelta(dt));
    world.run_schedule(SimulationTick);
}

/// Exclusive system: FixedUpdate → один тик симуляции
///
/// События обновляет `event_update_system` самого Bevy.
pub fn run_simulation_tick(world: &mut World) {
    let dt = world.resource::<Time<Fixed>>().delta_secs();
    run_tick(world, dt);
}
