//! Headless симуляция арены
//!
//! Две базы, волна юнитов с каждой стороны, один луч. Без рендера.
//! `arena_simulation [config.json]`

use bevy::prelude::*;

use arena_simulation::{
    create_headless_app,
    logger::{self, LogLevel},
    schedule::step, validate_match, DeployCommand, Faction, GameOver, SimulationConfig,
    SpawnRequest, SpellRequest, SpellStats, StatBlock, StatBlockRegistry, Vitals, WeaponStats,
};

fn demo_stat_blocks() -> StatBlockRegistry {
    let mut registry = StatBlockRegistry::default();
    registry
        .insert_unit(
            "base",
            StatBlock {
                hit_points: 600,
                shield: 200,
                speed: 0.0,
                shield_regen: 4.0,
                weapon: Some(WeaponStats {
                    damage: 12,
                    cooldown: 1.5,
                    range: 10.0,
                    ..Default::default()
                }),
                bounds: [3.0, 2.0, 3.0],
                base_station: true,
                ..Default::default()
            },
        )
        .insert_unit(
            "fighter",
            StatBlock {
                hit_points: 80,
                shield: 20,
                speed: 4.0,
                shield_regen: 2.5,
                hp_regen: 0.5,
                ..Default::default()
            },
        )
        .insert_spell("laser", SpellStats::default());
    registry
}

fn main() {
    let config = match std::env::args().nth(1) {
        Some(path) => match SimulationConfig::from_file(&path) {
            Ok(config) => config,
            Err(error) => {
                eprintln!("Failed to load config '{}': {}", path, error);
                std::process::exit(1);
            }
        },
        None => SimulationConfig::default(),
    };

    let dt = (1.0 / config.tick_hz) as f32;
    println!("Starting arena headless simulation (seed: {})", config.seed);

    let mut app = create_headless_app(config);
    logger::set_log_level(LogLevel::Info);
    app.insert_resource(demo_stat_blocks());
    let world = app.world_mut();

    for (faction, z) in [(Faction::Player, -40.0), (Faction::Enemy, 40.0)] {
        let request = SpawnRequest::new("prefabs/base", "base", faction, Vec3::new(0.0, 0.0, z));
        if let Err(error) = arena_simulation::spawn_unit(world, &request) {
            eprintln!("Bootstrap failed: {}", error);
            std::process::exit(1);
        }
    }

    if let Err(error) = validate_match(world) {
        eprintln!("{}", error);
        std::process::exit(1);
    }

    for i in 0..5 {
        let x = i as f32 * 2.0 - 4.0;
        world.send_event(DeployCommand::Unit(SpawnRequest::new(
            "prefabs/fighter",
            "fighter",
            Faction::Player,
            Vec3::new(x, 0.0, -30.0),
        )));
        world.send_event(DeployCommand::Unit(SpawnRequest::new(
            "prefabs/fighter",
            "fighter",
            Faction::Enemy,
            Vec3::new(x, 0.0, 30.0),
        )));
    }
    world.send_event(DeployCommand::Spell(SpellRequest::new(
        "prefabs/laser",
        "laser",
        Faction::Player,
        Vec3::new(0.0, 0.0, -10.0),
    )));

    let mut game_over = world.resource::<Events<GameOver>>().get_cursor();

    for tick in 0..3600 {
        step(world, dt);

        if tick % 600 == 0 {
            let mut query = world.query::<(&Faction, &Vitals)>();
            let mut alive = |faction: Faction| {
                query
                    .iter(world)
                    .filter(|(f, v)| **f == faction && v.is_alive())
                    .count()
            };
            let (player, enemy) = (alive(Faction::Player), alive(Faction::Enemy));
            println!("Tick {}: player {} alive, enemy {} alive", tick, player, enemy);
        }

        let events = world.resource::<Events<GameOver>>();
        if let Some(over) = game_over.read(events).next() {
            println!("Game over at tick {}: {:?} lost", tick, over.loser);
            break;
        }
    }

    println!("Simulation complete!");
}
