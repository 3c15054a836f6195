//! Vitals: hit points, shield, control flags, таймеры

use bevy::prelude::*;

/// Боевое состояние entity (юнит, база)
///
/// Инварианты (после каждого шага резолва):
/// - 0 ≤ hit_points ≤ max_hit_points
/// - 0 ≤ shield ≤ max_shield
/// - is_dead ⇒ hit_points == 0
///
/// Отрицательные промежуточные значения допустимы только внутри
/// `combat::damage::apply_damage` (overflow щита), до commit.
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Vitals {
    pub hit_points: i32,
    pub max_hit_points: i32,
    pub shield: i32,
    pub max_shield: i32,

    /// Терминальный флаг: снимается только lifecycle reset
    pub is_dead: bool,
    /// Урон и движение подавлены (без смерти)
    pub is_disabled: bool,
    /// Урон не может опустить HP до смерти
    pub immortal: bool,

    /// Пока > 0 — entity "не в контроле": не получает урон, не действует
    pub casting_time_remaining: f32,
    /// Пока > 0 — shield regen заблокирован
    pub shield_suppress_timer: f32,
    /// Пока > 0 — HP regen заблокирован
    pub hp_regen_timer: f32,

    pub level: u32,
}

impl Default for Vitals {
    fn default() -> Self {
        Self::new(100, 0)
    }
}

impl Vitals {
    pub fn new(max_hit_points: i32, max_shield: i32) -> Self {
        let max_hit_points = max_hit_points.max(0);
        let max_shield = max_shield.max(0);
        Self {
            hit_points: max_hit_points,
            max_hit_points,
            shield: max_shield,
            max_shield,
            is_dead: false,
            is_disabled: false,
            immortal: false,
            casting_time_remaining: 0.0,
            shield_suppress_timer: 0.0,
            hp_regen_timer: 0.0,
            level: 1,
        }
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level.max(1);
        self
    }

    /// Может действовать и получать урон
    pub fn in_control(&self) -> bool {
        !self.is_disabled && self.casting_time_remaining <= 0.0
    }

    pub fn is_alive(&self) -> bool {
        !self.is_dead
    }

    /// Переход в dead (идемпотентный)
    ///
    /// Возвращает true только при реальном переходе alive → dead.
    pub fn kill(&mut self) -> bool {
        if self.is_dead {
            return false;
        }
        self.hit_points = 0;
        self.is_dead = true;
        true
    }

    /// Сброс к spawn defaults (респавн базы, реюз pooled бота)
    pub fn reset_to_spawn_defaults(&mut self) {
        self.hit_points = self.max_hit_points;
        self.shield = self.max_shield;
        self.is_dead = false;
        self.is_disabled = false;
        self.casting_time_remaining = 0.0;
        self.shield_suppress_timer = 0.0;
        self.hp_regen_timer = 0.0;
    }

    /// Приводит бары к инвариантам
    pub fn clamp(&mut self) {
        self.max_hit_points = self.max_hit_points.max(0);
        self.max_shield = self.max_shield.max(0);
        self.hit_points = self.hit_points.clamp(0, self.max_hit_points);
        self.shield = self.shield.clamp(0, self.max_shield);
        if self.is_dead {
            self.hit_points = 0;
        }
    }

    /// Countdown каста
    pub fn tick_casting(&mut self, delta: f32) {
        if self.casting_time_remaining > 0.0 {
            self.casting_time_remaining = (self.casting_time_remaining - delta).max(0.0);
        }
    }
}

/// Скорость регенерации (единиц в секунду)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Regeneration {
    pub shield_per_second: f32,
    pub hit_points_per_second: f32,
}

impl Regeneration {
    pub fn new(shield_per_second: f32, hit_points_per_second: f32) -> Self {
        Self {
            shield_per_second: shield_per_second.max(0.0),
            hit_points_per_second: hit_points_per_second.max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kill_is_idempotent() {
        let mut vitals = Vitals::new(100, 20);
        assert!(vitals.kill());
        assert!(!vitals.kill());
        assert!(vitals.is_dead);
        assert_eq!(vitals.hit_points, 0);
    }

    #[test]
    fn test_in_control() {
        let mut vitals = Vitals::new(100, 0);
        assert!(vitals.in_control());

        vitals.casting_time_remaining = 0.5;
        assert!(!vitals.in_control());

        vitals.tick_casting(0.5);
        assert!(vitals.in_control());

        vitals.is_disabled = true;
        assert!(!vitals.in_control());
    }

    #[test]
    fn test_reset_to_spawn_defaults() {
        let mut vitals = Vitals::new(80, 30);
        vitals.shield = 0;
        vitals.kill();
        vitals.shield_suppress_timer = 2.0;
        vitals.hp_regen_timer = 4.0;

        vitals.reset_to_spawn_defaults();

        assert!(!vitals.is_dead);
        assert_eq!(vitals.hit_points, 80);
        assert_eq!(vitals.shield, 30);
        assert_eq!(vitals.shield_suppress_timer, 0.0);
        assert_eq!(vitals.hp_regen_timer, 0.0);
    }

    #[test]
    fn test_clamp() {
        let mut vitals = Vitals::new(50, 10);
        vitals.hit_points = 70;
        vitals.shield = -4;
        vitals.clamp();
        assert_eq!(vitals.hit_points, 50);
        assert_eq!(vitals.shield, 0);
    }
}
