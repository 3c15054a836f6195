//! Stat blocks — immutable числа юнитов/спеллов из внешнего data source
//!
//! `StatBlockRegistry` хранит blueprints по ключу (как карточки колоды).
//! Сами карты/NFT ядро не видит, только разрешённые числа.

use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::{BeamStats, WeaponStats};
use crate::error::ConfigError;

/// Числа юнита/базы
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatBlock {
    pub hit_points: i32,
    pub shield: i32,
    /// 0 = неподвижен (базы, турели)
    pub speed: f32,
    pub level: u32,
    pub shield_regen: f32,
    pub hp_regen: f32,
    /// None = без оружия (и без детектора)
    pub weapon: Option<WeaponStats>,
    /// None = радиус оружия
    pub detection_range: Option<f32>,
    /// Half extents коллайдера
    pub bounds: [f32; 3],
    /// После смерти в пул, а не despawn
    pub pooled: bool,
    pub base_station: bool,
    /// Регистрировать в StrategicTargetRegistry (базы всегда)
    pub strategic: bool,
    pub immortal: bool,
}

impl Default for StatBlock {
    fn default() -> Self {
        Self {
            hit_points: 100,
            shield: 0,
            speed: 3.0,
            level: 1,
            shield_regen: 0.0,
            hp_regen: 0.0,
            weapon: Some(WeaponStats::default()),
            detection_range: None,
            bounds: [0.5, 0.5, 0.5],
            pooled: false,
            base_station: false,
            strategic: false,
            immortal: false,
        }
    }
}

impl StatBlock {
    /// Починить битые значения, чтобы entity осталась играбельной
    ///
    /// HP ≤ 0 → `fallback_hit_points`, shield < 0 → 0, level 0 → 1.
    pub fn sanitized(mut self, fallback_hit_points: i32, key: &str) -> Self {
        if self.hit_points <= 0 {
            crate::logger::log_warning(&format!(
                "Stat block '{}': hit_points {} replaced with {}",
                key, self.hit_points, fallback_hit_points
            ));
            self.hit_points = fallback_hit_points;
        }
        if self.shield < 0 {
            crate::logger::log_warning(&format!(
                "Stat block '{}': shield {} replaced with 0",
                key, self.shield
            ));
            self.shield = 0;
        }
        if self.level == 0 {
            self.level = 1;
        }
        self.speed = self.speed.max(0.0);
        self
    }

    pub fn is_strategic(&self) -> bool {
        self.base_station || self.strategic
    }
}

/// Числа спелла (луч)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellStats {
    #[serde(flatten)]
    pub beam: BeamStats,
    /// Время жизни (секунды)
    pub duration: f32,
    /// Наводиться на ближайшего врага каждый тик
    pub auto_target: bool,
}

impl Default for SpellStats {
    fn default() -> Self {
        Self {
            beam: BeamStats::default(),
            duration: 3.0,
            auto_target: true,
        }
    }
}

/// Blueprints по ключу
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatBlockRegistry {
    pub units: HashMap<String, StatBlock>,
    pub spells: HashMap<String, SpellStats>,
}

impl StatBlockRegistry {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn insert_unit(&mut self, key: impl Into<String>, stats: StatBlock) -> &mut Self {
        self.units.insert(key.into(), stats);
        self
    }

    pub fn insert_spell(&mut self, key: impl Into<String>, stats: SpellStats) -> &mut Self {
        self.spells.insert(key.into(), stats);
        self
    }

    pub fn unit(&self, key: &str) -> Option<&StatBlock> {
        self.units.get(key)
    }

    pub fn spell(&self, key: &str) -> Option<&SpellStats> {
        self.spells.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::DamageType;

    #[test]
    fn test_sanitize_broken_stats() {
        let broken = StatBlock {
            hit_points: -20,
            shield: -5,
            level: 0,
            speed: -1.0,
            ..Default::default()
        };
        let fixed = broken.sanitized(10, "broken");

        assert_eq!(fixed.hit_points, 10);
        assert_eq!(fixed.shield, 0);
        assert_eq!(fixed.level, 1);
        assert_eq!(fixed.speed, 0.0);
    }

    #[test]
    fn test_registry_from_json() {
        let registry = StatBlockRegistry::from_json_str(
            r#"{
                "units": {
                    "base": { "hit_points": 1000, "shield": 200, "speed": 0.0, "base_station": true },
                    "drone": { "hit_points": 40, "weapon": { "damage": 4, "range": 6.0 } }
                },
                "spells": {
                    "laser": { "damage_per_second": 30.0, "damage_type": "Direct", "duration": 2.0 }
                }
            }"#,
        )
        .unwrap();

        let base = registry.unit("base").unwrap();
        assert!(base.base_station && base.is_strategic());
        assert_eq!(base.shield, 200);

        let drone = registry.unit("drone").unwrap();
        let weapon = drone.weapon.unwrap();
        assert_eq!(weapon.damage, 4);
        assert_eq!(weapon.cooldown, WeaponStats::default().cooldown);

        let laser = registry.spell("laser").unwrap();
        assert_eq!(laser.beam.damage_per_second, 30.0);
        assert_eq!(laser.beam.damage_type, DamageType::Direct);
        assert!(laser.auto_target);
    }
}
