//! Записывающий animator: хранит флаги/триггеры, эмулирует state "Death"

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

pub use crate::ai::brain::DEATH_STATE;
use crate::collaborators::Animator;

pub const LOCOMOTION_STATE: &str = "Locomotion";

#[derive(Debug, Default)]
struct AnimatorRecord {
    bools: HashMap<String, bool>,
    triggers: Vec<String>,
    state: String,
    normalized_time: f32,
}

/// Клоны делят одну запись: один клон уходит в `AnimatorHandle`,
/// второй остаётся у теста/инструмента для проверки флагов.
#[derive(Debug, Clone)]
pub struct RecordingAnimator {
    record: Arc<Mutex<AnimatorRecord>>,
    /// Длина state "Death" в секундах
    pub death_clip_length: f32,
}

impl Default for RecordingAnimator {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl RecordingAnimator {
    pub fn new(death_clip_length: f32) -> Self {
        let record = AnimatorRecord {
            state: LOCOMOTION_STATE.to_string(),
            ..Default::default()
        };
        Self {
            record: Arc::new(Mutex::new(record)),
            death_clip_length,
        }
    }

    fn record(&self) -> MutexGuard<'_, AnimatorRecord> {
        self.record.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn triggers(&self) -> Vec<String> {
        self.record().triggers.clone()
    }

    pub fn flag(&self, name: &str) -> bool {
        self.record().bools.get(name).copied().unwrap_or(false)
    }
}

impl Animator for RecordingAnimator {
    fn set_bool(&mut self, name: &str, value: bool) {
        let mut record = self.record();
        let previous = record.bools.insert(name.to_string(), value);
        if name == "isDead" && value && previous != Some(true) {
            record.state = DEATH_STATE.to_string();
            record.normalized_time = 0.0;
        }
    }

    fn get_bool(&self, name: &str) -> bool {
        self.flag(name)
    }

    fn set_trigger(&mut self, name: &str) {
        self.record().triggers.push(name.to_string());
    }

    fn current_state_name(&self) -> String {
        self.record().state.clone()
    }

    fn normalized_time(&self) -> f32 {
        self.record().normalized_time
    }

    fn advance(&mut self, dt: f32) {
        let clip_length = self.death_clip_length.max(f32::EPSILON);
        self.record().normalized_time += dt / clip_length;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_dead_switches_to_death_state() {
        let handle = RecordingAnimator::new(2.0);
        let mut animator = handle.clone();

        animator.advance(5.0);
        animator.set_bool("isDead", true);
        assert_eq!(handle.current_state_name(), DEATH_STATE);
        assert_eq!(handle.normalized_time(), 0.0);

        animator.advance(1.0);
        assert!((handle.normalized_time() - 0.5).abs() < 1e-6);
        assert!(handle.flag("isDead"));
    }

    #[test]
    fn test_triggers_recorded_in_order() {
        let mut animator = RecordingAnimator::default();
        animator.set_trigger("Dash");
        animator.set_trigger("Shockwave");
        assert_eq!(animator.triggers(), vec!["Dash".to_string(), "Shockwave".to_string()]);
    }
}
