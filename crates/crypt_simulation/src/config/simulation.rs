//! Глобальные параметры симуляции

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{parse_ron, read_file, ConfigError, ConfigResult};
use crate::ai::DeathTiming;
use crate::logger::{log_error, log_warning};

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// FixedUpdate частота (Hz)
    pub tick_hz: f64,
    pub seed: u64,
    /// Задержка после анимации смерти перед уборкой (секунды)
    pub death_grace_delay: f32,
    /// Если анимация смерти так и не доиграла
    pub death_animation_timeout: f32,
    pub stun_duration: f32,
    pub initial_scene: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_hz: 60.0,
            seed: 42,
            death_grace_delay: 2.0,
            death_animation_timeout: 10.0,
            stun_duration: 3.0,
            initial_scene: "Town".to_string(),
        }
    }
}

impl SimulationConfig {
    pub fn from_ron_str(text: &str) -> ConfigResult<Self> {
        let config: Self = parse_ron("<simulation config>", text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let config: Self = parse_ron(&path.display().to_string(), &read_file(path)?)?;
        config.validate()?;
        Ok(config)
    }

    /// Нет файла → defaults (warning), битый файл → defaults (error)
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(config) => {
                crate::log("⚙️ Simulation config loaded");
                config
            }
            Err(e @ ConfigError::Io { .. }) => {
                log_warning(&format!("{}. Using defaults.", e));
                Self::default()
            }
            Err(e) => {
                log_error(&format!("{}. Using defaults.", e));
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let invalid = |details: String| ConfigError::Invalid {
            name: "simulation".to_string(),
            details,
        };
        if !(self.tick_hz.is_finite() && self.tick_hz > 0.0) {
            return Err(invalid(format!("tick_hz must be > 0 (got {})", self.tick_hz)));
        }
        if self.death_grace_delay < 0.0 || self.death_animation_timeout <= 0.0 {
            return Err(invalid("death timings must be non-negative".to_string()));
        }
        if self.stun_duration < 0.0 {
            return Err(invalid(format!("stun_duration must be ≥ 0 (got {})", self.stun_duration)));
        }
        Ok(())
    }

    pub fn death_timing(&self) -> DeathTiming {
        DeathTiming {
            grace_delay: self.death_grace_delay,
            animation_timeout: self.death_animation_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = SimulationConfig::from_ron_str("(seed: 7, initial_scene: \"Crypt_01\")").unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.initial_scene, "Crypt_01");
        assert_eq!(config.tick_hz, 60.0);
        assert_eq!(config.stun_duration, 3.0);
    }

    #[test]
    fn test_invalid_tick_rate_rejected() {
        let result = SimulationConfig::from_ron_str("(tick_hz: 0.0)");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = SimulationConfig::load_or_default("does/not/exist.ron");
        assert_eq!(config, SimulationConfig::default());
    }
}
