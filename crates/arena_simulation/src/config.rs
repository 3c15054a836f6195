//! Конфигурация симуляции
//!
//! Все задержки и лимиты ядра в одном Resource. Загружается из JSON
//! (`#[serde(default)]`: отсутствующие поля берутся из `Default`).

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::Faction;
use crate::error::ConfigError;

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed для DeterministicRng
    pub seed: u64,
    /// Частота FixedUpdate тика (Hz)
    pub tick_hz: f64,

    /// Пауза shield regen после попадания (секунды)
    pub shield_regen_delay: f32,
    /// Пауза HP regen после попадания (секунды)
    pub hp_regen_delay: f32,

    /// Сколько труп живёт до удаления (death animation)
    pub death_grace_period: f32,
    /// Задержка респавна локальной базы
    pub respawn_delay: f32,
    /// Респавн базы ждёт ConfirmRespawn от внешнего слоя
    pub respawn_requires_confirmation: bool,

    /// Период fallback scan (пока нет текущей цели)
    pub fallback_scan_interval: f32,

    /// Ёмкость StrategicTargetRegistry на фракцию
    pub strategic_capacity: usize,
    /// Лимит живых юнитов на фракцию для deploy
    pub unit_limit: usize,

    /// Фракция локального игрока (его база не умирает насовсем)
    pub local_faction: Faction,
    /// XP за убийство = level жертвы × xp_per_level
    pub xp_per_level: u32,
    /// HP, которым заменяется битый stat block (<= 0)
    pub fallback_hit_points: i32,

    /// Legacy позиции баз (fallback когда registry пуст)
    pub legacy_player_base_position: [f32; 3],
    pub legacy_enemy_base_position: [f32; 3],
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tick_hz: 60.0,
            shield_regen_delay: 3.0,
            hp_regen_delay: 5.0,
            death_grace_period: 2.0,
            respawn_delay: 5.0,
            respawn_requires_confirmation: false,
            fallback_scan_interval: 1.0,
            strategic_capacity: 5,
            unit_limit: 20,
            local_faction: Faction::Player,
            xp_per_level: 10,
            fallback_hit_points: 10,
            legacy_player_base_position: [0.0, 0.0, -40.0],
            legacy_enemy_base_position: [0.0, 0.0, 40.0],
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tick_hz > 0.0) {
            return Err(invalid("tick_hz", format!("must be > 0, got {}", self.tick_hz)));
        }
        if self.strategic_capacity == 0 {
            return Err(invalid("strategic_capacity", "must be at least 1".into()));
        }
        if self.fallback_hit_points <= 0 {
            return Err(invalid(
                "fallback_hit_points",
                format!("must be > 0, got {}", self.fallback_hit_points),
            ));
        }
        if self.local_faction == Faction::Neutral {
            return Err(invalid("local_faction", "neutral faction has no base".into()));
        }

        let delays = [
            ("shield_regen_delay", self.shield_regen_delay),
            ("hp_regen_delay", self.hp_regen_delay),
            ("death_grace_period", self.death_grace_period),
            ("respawn_delay", self.respawn_delay),
            ("fallback_scan_interval", self.fallback_scan_interval),
        ];
        for (field, value) in delays {
            if !(value >= 0.0) {
                return Err(invalid(field, format!("must be >= 0, got {}", value)));
            }
        }

        Ok(())
    }

    /// Legacy fixed "base position" для фракции
    pub fn legacy_base_position(&self, faction: Faction) -> Option<Vec3> {
        match faction {
            Faction::Player => Some(Vec3::from_array(self.legacy_player_base_position)),
            Faction::Enemy => Some(Vec3::from_array(self.legacy_enemy_base_position)),
            Faction::Neutral => None,
        }
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimulationConfig::from_json_str(r#"{ "seed": 7, "respawn_delay": 1.5 }"#)
            .expect("valid config");

        assert_eq!(config.seed, 7);
        assert_eq!(config.respawn_delay, 1.5);
        assert_eq!(config.strategic_capacity, 5);
        assert_eq!(config.local_faction, Faction::Player);
    }

    #[test]
    fn test_rejects_negative_delay() {
        let err = SimulationConfig::from_json_str(r#"{ "shield_regen_delay": -1.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "shield_regen_delay", .. }));
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let err = SimulationConfig::from_json_str(r#"{ "strategic_capacity": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "strategic_capacity", .. }));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = SimulationConfig::from_json_str("{ seed: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_legacy_positions() {
        let config = SimulationConfig::default();
        assert_eq!(
            config.legacy_base_position(Faction::Enemy),
            Some(Vec3::new(0.0, 0.0, 40.0))
        );
        assert_eq!(config.legacy_base_position(Faction::Neutral), None);
    }
}
