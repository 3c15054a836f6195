//! Spawn — создание юнитов, баз и спеллов из stat blocks
//!
//! `spawn_unit` / `spawn_spell` — bootstrap API (exclusive доступ к World,
//! возвращают Result). Внутри тика deploy идёт через `DeployCommand`.

use bevy::prelude::*;

pub mod deploy;
pub mod stats;

pub use deploy::{count_live_units, deploy_unit, DeployCommand};
pub use stats::{SpellStats, StatBlock, StatBlockRegistry};

use crate::combat::{Beam, BeamAim, Weapon};
use crate::components::{
    BaseStation, Bounds, Collider, EntityIdAllocator, Faction, LifecycleState, Mobility,
    MovementCommand, Owner, Pooled, PrefabRef, Regeneration, ReenableColliderNextTick, SpawnPoint,
    Vitals,
};
use crate::config::SimulationConfig;
use crate::context::SimulationContext;
use crate::error::{Result, SimulationError};
use crate::lifecycle::{reset_combat_timers, reset_to_spawn, SpellLifetime, UnitPool};
use crate::schedule::{SimulationSet, SimulationTick, TickEventsAppExt};
use crate::targeting::{
    CurrentTarget, Detector, ForceRefreshTarget, StrategicTargetRegistry, TargetCandidates,
};

/// Запрос на создание юнита / базы
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    pub prefab: Option<String>,
    pub position: Vec3,
    pub faction: Faction,
    /// Ключ в StatBlockRegistry
    pub stat_block: String,
    pub owner: Option<u64>,
}

impl SpawnRequest {
    pub fn new(prefab: impl Into<String>, stat_block: impl Into<String>, faction: Faction, position: Vec3) -> Self {
        Self {
            prefab: Some(prefab.into()),
            position,
            faction,
            stat_block: stat_block.into(),
            owner: None,
        }
    }

    pub fn with_owner(mut self, owner: u64) -> Self {
        self.owner = Some(owner);
        self
    }
}

/// Запрос на создание спелла (луча)
#[derive(Debug, Clone, PartialEq)]
pub struct SpellRequest {
    pub prefab: Option<String>,
    pub position: Vec3,
    pub faction: Faction,
    /// Ключ в StatBlockRegistry::spells
    pub spell: String,
    /// Начальное направление (для fixed лучей — единственное)
    pub direction: Option<Vec3>,
    pub owner: Option<u64>,
}

impl SpellRequest {
    pub fn new(prefab: impl Into<String>, spell: impl Into<String>, faction: Faction, position: Vec3) -> Self {
        Self {
            prefab: Some(prefab.into()),
            position,
            faction,
            spell: spell.into(),
            direction: None,
            owner: None,
        }
    }

    pub fn with_direction(mut self, direction: Vec3) -> Self {
        self.direction = Some(direction);
        self
    }
}

fn require_prefab(prefab: &Option<String>) -> Result<&str> {
    prefab
        .as_deref()
        .filter(|path| !path.trim().is_empty())
        .ok_or(SimulationError::MissingPrefab)
}

fn simulation_config(world: &World) -> SimulationConfig {
    world.get_resource::<SimulationConfig>().cloned().unwrap_or_default()
}

/// Создать юнит или базу
///
/// Ошибки (нет prefab / stat block) — спавн отменяется, entity не создаётся.
pub fn spawn_unit(world: &mut World, request: &SpawnRequest) -> Result<Entity> {
    let prefab = require_prefab(&request.prefab)?.to_string();
    let stats = world
        .get_resource::<StatBlockRegistry>()
        .and_then(|registry| registry.unit(&request.stat_block))
        .cloned()
        .ok_or_else(|| SimulationError::MissingStatBlock {
            key: request.stat_block.clone(),
        })?;

    let config = simulation_config(world);
    let stats = stats.sanitized(config.fallback_hit_points, &request.stat_block);
    let id = world
        .get_resource_or_insert_with(EntityIdAllocator::default)
        .allocate();

    let mut vitals = Vitals::new(stats.hit_points, stats.shield).with_level(stats.level);
    vitals.immortal = stats.immortal;

    let mut entity = world.spawn((
        id,
        request.faction,
        Transform::from_translation(request.position),
        SpawnPoint(request.position),
        LifecycleState::Alive,
        Collider::default(),
        Bounds::new(Vec3::from_array(stats.bounds)),
        vitals,
        Regeneration::new(stats.shield_regen, stats.hp_regen),
        PrefabRef::new(prefab),
    ));

    if let Some(owner) = request.owner {
        entity.insert(Owner(owner));
    }
    if stats.speed > 0.0 && !stats.base_station {
        entity.insert((Mobility { speed: stats.speed }, MovementCommand::default()));
    }
    if let Some(weapon_stats) = stats.weapon {
        let weapon = Weapon::from_stats(&weapon_stats);
        let radius = stats.detection_range.unwrap_or(weapon.range);
        entity.insert((
            weapon,
            Detector::new(radius, config.fallback_scan_interval),
            TargetCandidates::default(),
            CurrentTarget::default(),
        ));
    }
    if stats.base_station {
        entity.insert(BaseStation);
    }
    if stats.pooled {
        entity.insert(Pooled {
            key: request.stat_block.clone(),
        });
    }

    let entity = entity.id();

    if stats.is_strategic() {
        if let Some(mut registry) = world.get_resource_mut::<StrategicTargetRegistry>() {
            registry.register(request.faction, entity);
        }
    }
    if stats.base_station {
        if let Some(mut context) = world.get_resource_mut::<SimulationContext>() {
            context.register_base(request.faction, entity);
        }
    }

    crate::logger::log(&format!(
        "✨ Spawned {:?} ({:?}) '{}' {:?} at {:?}",
        entity, id, request.stat_block, request.faction, request.position
    ));

    Ok(entity)
}

/// Создать спелл-луч
pub fn spawn_spell(world: &mut World, request: &SpellRequest) -> Result<Entity> {
    let prefab = require_prefab(&request.prefab)?.to_string();
    let stats = world
        .get_resource::<StatBlockRegistry>()
        .and_then(|registry| registry.spell(&request.spell))
        .cloned()
        .ok_or_else(|| SimulationError::MissingStatBlock {
            key: request.spell.clone(),
        })?;

    let id = world
        .get_resource_or_insert_with(EntityIdAllocator::default)
        .allocate();

    // Без явного направления — в сторону противника
    let direction = request.direction.unwrap_or(match request.faction {
        Faction::Enemy => Vec3::NEG_Z,
        _ => Vec3::Z,
    });
    let aim = if stats.auto_target {
        BeamAim::NearestEnemy
    } else {
        BeamAim::Fixed
    };

    let mut entity = world.spawn((
        id,
        request.faction,
        Transform::from_translation(request.position),
        LifecycleState::Alive,
        PrefabRef::new(prefab),
        Beam::new(stats.beam, aim, direction),
        SpellLifetime {
            remaining: stats.duration.max(0.0),
        },
    ));
    if let Some(owner) = request.owner {
        entity.insert(Owner(owner));
    }

    let entity = entity.id();
    crate::logger::log(&format!(
        "✨ Spell {:?} '{}' {:?} at {:?}",
        entity, request.spell, request.faction, request.position
    ));

    Ok(entity)
}

/// Реюз pooled бота: reset как при респавне базы, но без confirmation gate
///
/// Returns None, если в пуле нет entity для этого stat block.
pub fn reactivate_pooled(world: &mut World, request: &SpawnRequest) -> Option<Entity> {
    let entity = world.get_resource_mut::<UnitPool>()?.acquire(&request.stat_block)?;

    let mut entity_mut = world.get_entity_mut(entity).ok()?;
    if let Some(mut spawn_point) = entity_mut.get_mut::<SpawnPoint>() {
        spawn_point.0 = request.position;
    }
    entity_mut.insert(request.faction);

    let mut query = world.query::<(
        &mut Vitals,
        &mut Transform,
        &mut LifecycleState,
        &mut Collider,
        Option<&mut CurrentTarget>,
        Option<&mut TargetCandidates>,
        Option<&mut Weapon>,
        Option<&mut Detector>,
    )>();
    let Ok((mut vitals, mut transform, mut state, mut collider, target, candidates, mut weapon, mut detector)) =
        query.get_mut(world, entity)
    else {
        crate::logger::log_warning(&format!(
            "Pooled {:?} lost its components, spawning fresh instead",
            entity
        ));
        return None;
    };

    reset_to_spawn(&mut vitals, &mut transform, request.position, &mut state, &mut collider);
    reset_combat_timers(weapon.as_deref_mut(), detector.as_deref_mut());
    if let Some(mut target) = target {
        target.0 = None;
    }
    if let Some(mut candidates) = candidates {
        candidates.entities.clear();
    }

    world.entity_mut(entity).insert(ReenableColliderNextTick);
    world.send_event(ForceRefreshTarget { entity });

    crate::logger::log(&format!("♻️ {:?} reactivated from pool at {:?}", entity, request.position));
    Some(entity)
}

/// Spawn Plugin: registry + обработка DeployCommand
pub struct SpawnPlugin;

impl Plugin for SpawnPlugin {
    fn build(&self, app: &mut App) {
        app.add_tick_event::<DeployCommand>()
            .init_resource::<StatBlockRegistry>()
            .init_resource::<EntityIdAllocator>();

        app.add_systems(
            SimulationTick,
            deploy::process_deploy_commands
                .after(crate::lifecycle::respawn::advance_respawns)
                .in_set(SimulationSet::Input),
        );
    }
}
