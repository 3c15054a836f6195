//! Общие helpers для интеграционных тестов

#![allow(dead_code)]

use bevy::prelude::*;

use arena_simulation::*;

pub const DT: f32 = 0.5;

/// Stat blocks тестовой арены
pub fn test_stat_blocks() -> StatBlockRegistry {
    let mut registry = StatBlockRegistry::default();
    registry
        .insert_unit(
            "base",
            StatBlock {
                hit_points: 500,
                shield: 100,
                speed: 0.0,
                weapon: Some(WeaponStats {
                    damage: 5,
                    cooldown: 1.0,
                    range: 8.0,
                    ..Default::default()
                }),
                bounds: [3.0, 2.0, 3.0],
                base_station: true,
                ..Default::default()
            },
        )
        .insert_unit(
            "bunker",
            StatBlock {
                hit_points: 300,
                speed: 0.0,
                weapon: None,
                base_station: true,
                ..Default::default()
            },
        )
        .insert_unit(
            "turret",
            StatBlock {
                hit_points: 100,
                speed: 0.0,
                weapon: Some(WeaponStats {
                    damage: 10,
                    cooldown: 1.0,
                    range: 5.0,
                    ..Default::default()
                }),
                ..Default::default()
            },
        )
        .insert_unit(
            "fighter",
            StatBlock {
                hit_points: 100,
                shield: 20,
                speed: 4.0,
                shield_regen: 2.5,
                hp_regen: 0.7,
                weapon: Some(WeaponStats {
                    damage: 10,
                    cooldown: 1.0,
                    range: 3.0,
                    ..Default::default()
                }),
                ..Default::default()
            },
        )
        .insert_unit(
            "dummy",
            StatBlock {
                hit_points: 100,
                speed: 0.0,
                weapon: None,
                ..Default::default()
            },
        )
        .insert_unit(
            "weak",
            StatBlock {
                hit_points: 10,
                level: 3,
                speed: 0.0,
                weapon: None,
                ..Default::default()
            },
        )
        .insert_unit(
            "bot",
            StatBlock {
                hit_points: 50,
                speed: 0.0,
                weapon: None,
                pooled: true,
                ..Default::default()
            },
        )
        .insert_unit(
            "gunbot",
            StatBlock {
                hit_points: 50,
                speed: 0.0,
                weapon: Some(WeaponStats {
                    damage: 5,
                    cooldown: 2.0,
                    range: 4.0,
                    ..Default::default()
                }),
                pooled: true,
                ..Default::default()
            },
        )
        .insert_spell(
            "laser",
            SpellStats {
                duration: 1.0,
                ..Default::default()
            },
        );
    registry
}

/// Журнал событий T за весь тест (step обновляет буферы каждый тик)
#[derive(Resource)]
pub struct EventLog<T: Event>(pub Vec<T>);

fn record_events<T: Event + Clone>(mut reader: EventReader<T>, mut log: ResMut<EventLog<T>>) {
    log.0.extend(reader.read().cloned());
}

fn record<T: Event + Clone>(app: &mut App) {
    app.insert_resource(EventLog::<T>(Vec::new())).add_systems(
        SimulationTick,
        record_events::<T>.after(SimulationSet::Cleanup),
    );
}

pub fn test_app(config: SimulationConfig) -> App {
    let mut app = create_headless_app(config);
    app.insert_resource(test_stat_blocks());

    record::<DamageDealt>(&mut app);
    record::<EntityDied>(&mut app);
    record::<UnitDied>(&mut app);
    record::<GameOver>(&mut app);
    record::<MetricEvent>(&mut app);
    record::<VisualEvent>(&mut app);
    app
}

pub fn spawn(world: &mut World, key: &str, faction: Faction, position: Vec3) -> Entity {
    let request = SpawnRequest::new(format!("prefabs/{}", key), key, faction, position);
    spawn_unit(world, &request).expect("test stat block must spawn")
}

pub fn unit_request(key: &str, faction: Faction, position: Vec3) -> SpawnRequest {
    SpawnRequest::new(format!("prefabs/{}", key), key, faction, position)
}

/// Урон из окружения (без атакующего)
pub fn damage(world: &mut World, target: Entity, amount: i32, damage_type: DamageType) {
    world.send_event(DamageRequest {
        attacker: None,
        attacker_faction: None,
        target,
        amount,
        damage_type,
    });
}

/// Все события T с начала теста (пишутся `EventLog<T>` в конце каждого тика)
pub fn collect_events<T: Event + Clone>(world: &World) -> Vec<T> {
    world
        .get_resource::<EventLog<T>>()
        .map(|log| log.0.clone())
        .expect("event type must be recorded in test_app")
}

pub fn vitals(world: &World, entity: Entity) -> Vitals {
    world
        .get::<Vitals>(entity)
        .cloned()
        .expect("entity must have Vitals")
}

pub fn state(world: &World, entity: Entity) -> LifecycleState {
    *world
        .get::<LifecycleState>(entity)
        .expect("entity must have LifecycleState")
}

pub fn steps(world: &mut World, count: usize, dt: f32) {
    for _ in 0..count {
        step(world, dt);
    }
}
