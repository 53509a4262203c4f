//! Типы врагов и их тюнинг
//!
//! Один tagged enum вместо иерархии классов: поведение каждого kind'а —
//! ветка в `brain.rs`, параметры — здесь. Все конфиги грузятся из RON
//! (`#[serde(default)]` — в файле достаточно указать отличия).

use serde::{Deserialize, Serialize};

/// Dasher: stand-off + одиночный рывок с cooldown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub dash_speed: f32,
    pub dash_duration: f32,
    pub dash_cooldown: f32,
    /// Рывок разрешён когда цель ближе этой дистанции
    pub dash_start_distance: f32,
    pub pre_dash_wait: f32,
    /// Stand-off: держимся не ближе
    pub desired_min_distance: f32,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            dash_speed: 10.0,
            dash_duration: 1.0,
            dash_cooldown: 2.0,
            dash_start_distance: 5.0,
            pre_dash_wait: 1.0,
            desired_min_distance: 8.0,
        }
    }
}

/// ConsecutiveDasher: серия из N рывков, без cooldown между сериями
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiDashConfig {
    pub dash_speed: f32,
    pub dash_duration: f32,
    pub dash_start_distance: f32,
    pub pre_dash_wait: f32,
    pub dashes_per_cycle: u32,
    pub time_between_dashes: f32,
    pub desired_min_distance: f32,
}

impl Default for MultiDashConfig {
    fn default() -> Self {
        Self {
            dash_speed: 10.0,
            dash_duration: 0.5,
            dash_start_distance: 5.0,
            pre_dash_wait: 1.0,
            dashes_per_cycle: 3,
            time_between_dashes: 1.8,
            desired_min_distance: 8.0,
        }
    }
}

/// Ranged: держит дистанцию, стреляет очередями
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangedConfig {
    pub desired_distance: f32,
    pub max_retreat_time: f32,
    pub shots_per_burst: u32,
    pub time_between_shots: f32,
    pub burst_interval: f32,
    pub projectile_speed: f32,
    /// Обнаружение и стрельба только когда bounding box целиком в кадре
    pub visibility_gate: bool,
}

impl Default for RangedConfig {
    fn default() -> Self {
        Self {
            desired_distance: 10.0,
            max_retreat_time: 3.0,
            shots_per_burst: 3,
            time_between_shots: 0.5,
            burst_interval: 3.0,
            projectile_speed: 20.0,
            visibility_gate: true,
        }
    }
}

/// Shockwave: подходит, бьёт AoE один раз, отходит, перезаряжается
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShockwaveConfig {
    pub desired_min_distance: f32,
    pub shockwave_radius: f32,
    pub shockwave_damage: u32,
    pub pre_shockwave_wait: f32,
    pub maintain_distance_time: f32,
    pub shockwave_cooldown: f32,
    /// Дистанция отхода = desired_min_distance × retreat_multiplier
    pub retreat_multiplier: f32,
}

impl Default for ShockwaveConfig {
    fn default() -> Self {
        Self {
            desired_min_distance: 5.0,
            shockwave_radius: 8.0,
            shockwave_damage: 20,
            pre_shockwave_wait: 1.0,
            maintain_distance_time: 3.0,
            shockwave_cooldown: 2.0,
            retreat_multiplier: 2.0,
        }
    }
}

/// DemonFly: рывок в контакт → захват → серия ударов → отпускает
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrappleConfig {
    pub dash_speed: f32,
    pub dash_time: f32,
    pub dash_start_distance: f32,
    /// Дистанция контакта для захвата
    pub contact_radius: f32,
    /// Интервал между ударами в захвате
    pub attack_interval: f32,
    pub attack_count: u32,
    pub hit_damage: u32,
    pub attack_cooldown: f32,
    pub retreat_duration: f32,
    pub retreat_min_distance: f32,
}

impl Default for GrappleConfig {
    fn default() -> Self {
        Self {
            dash_speed: 10.0,
            dash_time: 0.5,
            dash_start_distance: 5.0,
            contact_radius: 1.5,
            attack_interval: 1.0,
            attack_count: 3,
            hit_damage: 10,
            attack_cooldown: 5.0,
            retreat_duration: 3.0,
            retreat_min_distance: 8.0,
        }
    }
}

/// Тип врага (стратегия поведения)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Базовый: патруль + преследование
    Chaser,
    Dasher(DashConfig),
    ConsecutiveDasher(MultiDashConfig),
    /// Ranged и boss (boss = ranged без visibility gate)
    Ranged(RangedConfig),
    Shockwave(ShockwaveConfig),
    DemonFly(GrappleConfig),
}

impl Default for EnemyKind {
    fn default() -> Self {
        Self::Chaser
    }
}

impl EnemyKind {
    /// Босс: ranged поведение, стреляет и вне кадра
    pub fn boss() -> Self {
        Self::Ranged(RangedConfig {
            visibility_gate: false,
            ..Default::default()
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            EnemyKind::Chaser => "Chaser",
            EnemyKind::Dasher(_) => "Dasher",
            EnemyKind::ConsecutiveDasher(_) => "ConsecutiveDasher",
            EnemyKind::Ranged(c) if !c.visibility_gate => "Boss",
            EnemyKind::Ranged(_) => "Ranged",
            EnemyKind::Shockwave(_) => "Shockwave",
            EnemyKind::DemonFly(_) => "DemonFly",
        }
    }

    pub fn visibility_gated(&self) -> bool {
        matches!(self, EnemyKind::Ranged(c) if c.visibility_gate)
    }

    /// Проверка тюнинга после загрузки из файла
    pub fn validate(&self) -> Result<(), String> {
        let positive = |name: &str, value: f32| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(format!("{} must be > 0 (got {})", name, value))
            }
        };

        match self {
            EnemyKind::Chaser => Ok(()),
            EnemyKind::Dasher(c) => {
                positive("dash_speed", c.dash_speed)?;
                positive("dash_duration", c.dash_duration)
            }
            EnemyKind::ConsecutiveDasher(c) => {
                positive("dash_speed", c.dash_speed)?;
                positive("dash_duration", c.dash_duration)?;
                if c.dashes_per_cycle == 0 {
                    return Err("dashes_per_cycle must be ≥ 1".to_string());
                }
                Ok(())
            }
            EnemyKind::Ranged(c) => {
                positive("desired_distance", c.desired_distance)?;
                if c.shots_per_burst == 0 {
                    return Err("shots_per_burst must be ≥ 1".to_string());
                }
                Ok(())
            }
            EnemyKind::Shockwave(c) => {
                positive("shockwave_radius", c.shockwave_radius)?;
                positive("retreat_multiplier", c.retreat_multiplier)
            }
            EnemyKind::DemonFly(c) => {
                positive("contact_radius", c.contact_radius)?;
                if c.attack_count == 0 {
                    return Err("attack_count must be ≥ 1".to_string());
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boss_is_ungated_ranged() {
        let boss = EnemyKind::boss();
        assert_eq!(boss.name(), "Boss");
        assert!(!boss.visibility_gated());
        assert!(EnemyKind::Ranged(RangedConfig::default()).visibility_gated());
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let kind: EnemyKind = ron::from_str("Dasher((dash_speed: 12.0))").unwrap();
        let EnemyKind::Dasher(config) = kind else {
            panic!("expected Dasher");
        };
        assert_eq!(config.dash_speed, 12.0);
        assert_eq!(config.dash_cooldown, 2.0);
        assert_eq!(config.desired_min_distance, 8.0);
    }

    #[test]
    fn test_validate_rejects_zero_burst() {
        let kind = EnemyKind::Ranged(RangedConfig {
            shots_per_burst: 0,
            ..Default::default()
        });
        assert!(kind.validate().is_err());
        assert!(EnemyKind::Shockwave(ShockwaveConfig::default()).validate().is_ok());
    }
}
