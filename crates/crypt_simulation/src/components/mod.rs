//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: базовые характеристики (faction, health, player marker)
//!
//! Доменные компоненты живут рядом со своими системами:
//! AI — `crate::ai`, урон/оглушение/захват — `crate::combat`,
//! persistence — `crate::persistence`, лут — `crate::drops`.

pub mod actor;

// Re-exports для удобного импорта
pub use actor::*;
