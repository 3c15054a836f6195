//! SimulationContext — явный контекст матча вместо глобальных синглтонов

use bevy::prelude::*;

use crate::components::{BaseStation, Faction};
use crate::error::{Result, SimulationError};

/// Состояние матча
#[derive(Resource, Debug, Clone)]
pub struct SimulationContext {
    /// Фракция локального игрока
    pub local_faction: Faction,
    /// База локального игрока (респавнится)
    pub local_base: Option<Entity>,
    /// База противника (её смерть = game over)
    pub opposing_base: Option<Entity>,
    game_over_reported: bool,
}

impl SimulationContext {
    pub fn new(local_faction: Faction) -> Self {
        Self {
            local_faction,
            local_base: None,
            opposing_base: None,
            game_over_reported: false,
        }
    }

    /// Запомнить базу фракции
    pub fn register_base(&mut self, faction: Faction, entity: Entity) {
        if faction == self.local_faction {
            self.local_base = Some(entity);
        } else if Some(faction) == self.local_faction.opponent() {
            self.opposing_base = Some(entity);
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over_reported
    }

    /// Латч game over: true только при первом вызове
    pub fn report_game_over(&mut self) -> bool {
        if self.game_over_reported {
            return false;
        }
        self.game_over_reported = true;
        true
    }
}

impl Default for SimulationContext {
    fn default() -> Self {
        Self::new(Faction::Player)
    }
}

/// Проверка матча перед стартом: обе базы на месте
///
/// Вызывается bootstrap слоем один раз; ошибка не ретраится.
pub fn validate_match(world: &mut World) -> Result<()> {
    let Some(context) = world.get_resource::<SimulationContext>().cloned() else {
        return Err(SimulationError::MissingBase {
            faction: Faction::Player,
        });
    };

    let mut bases = world.query_filtered::<(Entity, &Faction), With<BaseStation>>();
    let present: Vec<(Entity, Faction)> = bases.iter(world).map(|(e, f)| (e, *f)).collect();

    let local = context.local_faction;
    let opponent = local.opponent().unwrap_or(Faction::Enemy);

    for (faction, recorded) in [(local, context.local_base), (opponent, context.opposing_base)] {
        let found = present
            .iter()
            .any(|&(entity, f)| f == faction && recorded.map_or(true, |r| r == entity));
        if !found {
            crate::logger::log_error(&format!("Match validation failed: no {:?} base", faction));
            return Err(SimulationError::MissingBase { faction });
        }
    }

    crate::logger::log_info("Match validated: both bases present");
    Ok(())
}
