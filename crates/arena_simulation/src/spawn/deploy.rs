//! Deploy команды (input от UI колоды)
//!
//! Affordability (энергия) проверяет вызывающий слой. Ядро проверяет
//! только лимит юнитов и реюзает pooled ботов.

use bevy::prelude::*;

use crate::components::{BaseStation, Faction, LifecycleState, Vitals};
use crate::config::SimulationConfig;
use crate::error::Result;
use crate::sinks::{DeployKind, MetricEvent, UiWarning, VisualEvent};
use crate::spawn::{reactivate_pooled, spawn_spell, spawn_unit, SpawnRequest, SpellRequest, StatBlockRegistry};

/// Команда deploy
#[derive(Event, Debug, Clone, PartialEq)]
pub enum DeployCommand {
    Unit(SpawnRequest),
    Spell(SpellRequest),
}

/// Живые юниты фракции (базы и спеллы не считаются)
pub fn count_live_units(world: &mut World, faction: Faction) -> usize {
    let mut query =
        world.query_filtered::<(&Faction, &LifecycleState, &Vitals), Without<BaseStation>>();
    query
        .iter(world)
        .filter(|(f, state, vitals)| **f == faction && state.is_alive() && vitals.is_alive())
        .count()
}

/// Deploy юнита
///
/// Ok(None) — отказ по лимиту (UI получает UnitLimitReached).
pub fn deploy_unit(world: &mut World, request: &SpawnRequest) -> Result<Option<Entity>> {
    let limit = world
        .get_resource::<SimulationConfig>()
        .map(|config| config.unit_limit)
        .unwrap_or_else(|| SimulationConfig::default().unit_limit);

    if count_live_units(world, request.faction) >= limit {
        crate::logger::log_warning(&format!(
            "Deploy refused: {:?} reached unit limit {}",
            request.faction, limit
        ));
        world.send_event(VisualEvent::Warning(UiWarning::UnitLimitReached {
            faction: request.faction,
        }));
        return Ok(None);
    }

    let pooled = world
        .get_resource::<StatBlockRegistry>()
        .and_then(|registry| registry.unit(&request.stat_block))
        .map(|stats| stats.pooled)
        .unwrap_or(false);

    let reused = if pooled {
        reactivate_pooled(world, request)
    } else {
        None
    };

    let entity = match reused {
        Some(entity) => entity,
        None => spawn_unit(world, request)?,
    };

    world.send_event(MetricEvent::Deploy {
        faction: request.faction,
        kind: DeployKind::Unit,
    });

    Ok(Some(entity))
}

/// Deploy спелла
pub fn deploy_spell(world: &mut World, request: &SpellRequest) -> Result<Entity> {
    let entity = spawn_spell(world, request)?;
    world.send_event(MetricEvent::Deploy {
        faction: request.faction,
        kind: DeployKind::Spell,
    });
    Ok(entity)
}

/// Exclusive system: обработать все DeployCommand этого тика
///
/// Ошибка одного deploy логируется и не мешает остальным.
pub fn process_deploy_commands(world: &mut World) {
    let Some(mut events) = world.get_resource_mut::<Events<DeployCommand>>() else {
        return;
    };
    let commands: Vec<DeployCommand> = events.drain().collect();

    for command in commands {
        let result = match &command {
            DeployCommand::Unit(request) => deploy_unit(world, request).map(|_| ()),
            DeployCommand::Spell(request) => deploy_spell(world, request).map(|_| ()),
        };

        if let Err(error) = result {
            crate::logger::log_warning(&format!("Deploy failed ({:?}): {}", command, error));
        }
    }
}
