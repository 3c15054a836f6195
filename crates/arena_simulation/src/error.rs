//! Ошибки bootstrap слоя
//!
//! Внутри тика ошибки не пробрасываются: per-entity сбой логируется и изолируется.
//! `Result` возвращают только spawn/deploy и инициализация матча.

use thiserror::Error;

use crate::components::Faction;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("spawn aborted: prefab reference is missing")]
    MissingPrefab,

    #[error("spawn aborted: stat block `{key}` is missing")]
    MissingStatBlock { key: String },

    #[error("match cannot start: base station for {faction:?} is missing")]
    MissingBase { faction: Faction },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type Result<T, E = SimulationError> = std::result::Result<T, E>;
