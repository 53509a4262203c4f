//! Конфигурация симуляции (RON файлы в assets/)
//!
//! - `SimulationConfig` — тик, seed, тайминги смерти и оглушения
//! - `EnemyRegistry` — определения врагов (assets/enemies/*.ron)
//! - `DropTable` живёт в `crate::drops`, ошибки загрузки общие

use thiserror::Error;

pub mod enemy;
pub mod simulation;

pub use enemy::{EnemyDefinition, EnemyRegistry};
pub use simulation::SimulationConfig;

/// Ошибки загрузки конфигурации
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Файл/директория не читается
    #[error("Failed to read '{path}': {details}")]
    Io { path: String, details: String },

    /// RON не распарсился
    #[error("Parse error in '{path}': {details}")]
    Parse { path: String, details: String },

    /// Запрошенного врага нет в реестре
    #[error("Unknown enemy definition: {0}")]
    UnknownEnemy(String),

    /// Значения вне допустимого диапазона
    #[error("Invalid '{name}': {details}")]
    Invalid { name: String, details: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// RON строка → T (`origin` — путь или метка для сообщения об ошибке)
pub(crate) fn parse_ron<T: serde::de::DeserializeOwned>(origin: &str, text: &str) -> ConfigResult<T> {
    ron::from_str(text).map_err(|e| ConfigError::Parse {
        path: origin.to_string(),
        details: e.to_string(),
    })
}

pub(crate) fn read_file(path: &std::path::Path) -> ConfigResult<String> {
    std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        details: e.to_string(),
    })
}
