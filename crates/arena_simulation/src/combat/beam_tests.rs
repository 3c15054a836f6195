//! Tests for beam resolver.

use bevy::prelude::*;
use rand::rngs::mock::StepRng;

use crate::combat::beam::*;
use crate::combat::damage::DamageType;
use crate::components::{Bounds, Faction};

const EPSILON: f32 = 1e-3;

fn beam_along_x() -> BeamGeometry {
    update_beam(Vec3::ZERO, Vec3::X * 5.0, 10.0, 2.0)
}

fn point_candidate(index: u32, position: Vec3, faction: Faction) -> BeamCandidate {
    BeamCandidate {
        entity: Entity::from_raw(index),
        position,
        bounds: Bounds::new(Vec3::ZERO),
        faction,
        is_dead: false,
        is_base: false,
    }
}

#[test]
fn test_direction_is_normalized() {
    let geometry = beam_along_x();
    assert_eq!(geometry.direction, Vec3::X);
    assert_eq!(geometry.end(), Vec3::new(10.0, 0.0, 0.0));
}

#[test]
fn test_midpoint_detection_symmetry() {
    let geometry = beam_along_x();
    let half_width = geometry.width * 0.5;

    assert!(geometry.contains_point(Vec3::new(5.0, 0.0, half_width - EPSILON)));
    assert!(geometry.contains_point(Vec3::new(5.0, 0.0, -(half_width - EPSILON))));
    assert!(!geometry.contains_point(Vec3::new(5.0, 0.0, half_width + EPSILON)));
    assert!(!geometry.contains_point(Vec3::new(5.0, 0.0, -(half_width + EPSILON))));
}

#[test]
fn test_projection_is_clamped_to_segment() {
    let geometry = beam_along_x();

    // За концом луча: расстояние считается до конечной точки
    assert!(geometry.contains_point(Vec3::new(10.5, 0.0, 0.0)));
    assert!(!geometry.contains_point(Vec3::new(11.5, 0.0, 0.0)));
    // Позади origin
    assert!(!geometry.contains_point(Vec3::new(-1.5, 0.0, 0.0)));
}

#[test]
fn test_large_collider_detected_by_corner() {
    let geometry = beam_along_x();
    let center = Vec3::new(5.0, 0.0, 2.5);
    let bounds = Bounds::new(Vec3::new(1.0, 0.0, 2.0));

    // Центр вне луча, ближний угол (z = 0.5) внутри
    assert!(!geometry.contains_point(center));
    assert!(geometry.intersects(center, &bounds));
}

#[test]
fn test_find_targets_filters_faction_dead_and_bases() {
    let geometry = beam_along_x();
    let on_beam = Vec3::new(3.0, 0.0, 0.0);

    let enemy = point_candidate(1, on_beam, Faction::Enemy);
    let ally = point_candidate(2, on_beam, Faction::Player);
    let neutral = point_candidate(3, on_beam, Faction::Neutral);
    let mut dead = point_candidate(4, on_beam, Faction::Enemy);
    dead.is_dead = true;
    let mut base = point_candidate(5, on_beam, Faction::Enemy);
    base.is_base = true;
    let far_enemy = point_candidate(6, Vec3::new(3.0, 0.0, 8.0), Faction::Enemy);

    let targets = find_targets_in_beam(
        &geometry,
        Faction::Player,
        [enemy, ally, neutral, dead, base, far_enemy],
    );

    assert_eq!(targets, vec![Entity::from_raw(1)]);
}

#[test]
fn test_damage_per_tick_is_rounded() {
    let stats = BeamStats {
        damage_per_second: 25.0,
        damage_interval: 0.3,
        shield_damage_multiplier: 1.5,
        ..Default::default()
    };
    // 25 × 0.3 × 1.5 = 11.25 → 11
    assert_eq!(stats.damage_per_tick(), 11);
}

#[test]
fn test_critical_roll() {
    let (amount, critical) = roll_critical(10, 0.5, 2.5, &mut StepRng::new(0, 0));
    assert!(critical);
    assert_eq!(amount, 25);

    let (amount, critical) = roll_critical(10, 0.5, 2.5, &mut StepRng::new(u64::MAX, 0));
    assert!(!critical);
    assert_eq!(amount, 10);

    let (amount, critical) = roll_critical(10, 0.0, 2.5, &mut StepRng::new(0, 0));
    assert!(!critical);
    assert_eq!(amount, 10);
}

#[test]
fn test_periodic_damage_hits_every_target() {
    let targets = [Entity::from_raw(1), Entity::from_raw(2)];
    let hits = apply_periodic_damage(&targets, 7, 0.0, 2.0, &mut StepRng::new(0, 0));

    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|hit| hit.amount == 7 && !hit.critical));
}

#[test]
fn test_interval_batching() {
    let stats = BeamStats {
        damage_interval: 0.5,
        damage_type: DamageType::Direct,
        ..Default::default()
    };
    let mut beam = Beam::new(stats, BeamAim::Fixed, Vec3::X);

    assert_eq!(beam.advance_interval(0.2), 0);
    assert_eq!(beam.advance_interval(0.2), 0);
    assert_eq!(beam.advance_interval(0.2), 1);
    // Длинный тик пересекает две границы
    assert_eq!(beam.advance_interval(1.0), 2);
}

#[test]
fn test_huge_tick_is_capped() {
    let stats = BeamStats {
        damage_interval: MIN_DAMAGE_INTERVAL,
        ..Default::default()
    };
    let mut beam = Beam::new(stats, BeamAim::Fixed, Vec3::Z);

    assert_eq!(beam.advance_interval(1.0e5), MAX_INTERVALS_PER_TICK);
    assert_eq!(beam.advance_interval(1.0e7), MAX_INTERVALS_PER_TICK);
    assert!(beam.interval_timer > 0.0 && beam.interval_timer <= MIN_DAMAGE_INTERVAL);

    // Не-конечный dt не двигает таймер
    assert_eq!(beam.advance_interval(f32::INFINITY), 0);
    assert_eq!(beam.advance_interval(f32::NAN), 0);
    assert!(beam.interval_timer > 0.0);

    // После большого тика обычный ритм восстанавливается
    let timer = beam.interval_timer;
    assert_eq!(beam.advance_interval(timer), 1);
}

#[test]
fn test_zero_interval_is_clamped() {
    let stats = BeamStats {
        damage_interval: 0.0,
        ..Default::default()
    };
    let beam = Beam::new(stats, BeamAim::Fixed, Vec3::X);
    assert_eq!(beam.stats.damage_interval, MIN_DAMAGE_INTERVAL);
}
