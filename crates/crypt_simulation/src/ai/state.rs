//! AI FSM состояния + память между состояниями

use bevy::prelude::*;

use crate::collaborators::NearbyActor;

/// Состояние enemy FSM
///
/// Ровно одно активное состояние на актора. Все таймеры ≥ 0.
/// `Disabled` — терминальное: переходов из него нет.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum AIState {
    /// Начальное состояние после спавна (первый тик → Patrol)
    Idle,

    /// Патруль: ждём у точки `wait_timer` секунд, потом выбираем новую
    Patrol { wait_timer: f32 },

    /// Цель обнаружена: преследование / stand-off / стрельба (зависит от kind)
    Detected,

    /// Подготовка атаки (разворот к цели, навигация остановлена)
    PreparingAttack { timer: f32 },

    /// Рывок по прямой с постоянной скоростью
    Dashing { timer: f32, direction: Vec3 },

    /// Пауза между рывками серии
    WaitingForNextDash { timer: f32 },

    /// Цель захвачена: удары с фиксированным интервалом
    Grappling {
        target: Entity,
        hit_timer: f32,
        hits_remaining: u32,
    },

    /// Отступление / удержание дистанции после атаки
    Retreating { timer: f32 },

    /// Перезарядка атаки
    Cooldown { timer: f32 },

    /// Мёртв: движение выключено, ждём анимацию смерти + grace delay
    Disabled { phase: DeathPhase },
}

impl Default for AIState {
    fn default() -> Self {
        Self::Idle
    }
}

impl AIState {
    pub fn name(&self) -> &'static str {
        match self {
            AIState::Idle => "Idle",
            AIState::Patrol { .. } => "Patrol",
            AIState::Detected => "Detected",
            AIState::PreparingAttack { .. } => "PreparingAttack",
            AIState::Dashing { .. } => "Dashing",
            AIState::WaitingForNextDash { .. } => "WaitingForNextDash",
            AIState::Grappling { .. } => "Grappling",
            AIState::Retreating { .. } => "Retreating",
            AIState::Cooldown { .. } => "Cooldown",
            AIState::Disabled { .. } => "Disabled",
        }
    }

    /// Состояния "в бою": потеря цели в них → Patrol
    pub fn is_engaged(&self) -> bool {
        !matches!(
            self,
            AIState::Idle | AIState::Patrol { .. } | AIState::Disabled { .. }
        )
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, AIState::Disabled { .. })
    }

    pub fn is_dashing(&self) -> bool {
        matches!(self, AIState::Dashing { .. })
    }
}

/// Фаза смерти
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum DeathPhase {
    /// Ждём пока animator войдёт в "Death" и доиграет (normalized time ≥ 1)
    AwaitingAnimation { elapsed: f32, entered: bool },
    /// Анимация доиграна, держим труп `remaining` секунд
    Grace { remaining: f32 },
    /// Можно убирать со сцены
    Finished,
}

/// Тайминги смерти
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct DeathTiming {
    /// Задержка после анимации смерти (секунды)
    pub grace_delay: f32,
    /// Если animator так и не дошёл до "Death" — сдаёмся через столько секунд
    pub animation_timeout: f32,
}

impl Default for DeathTiming {
    fn default() -> Self {
        Self {
            grace_delay: 2.0,
            animation_timeout: 10.0,
        }
    }
}

/// Burst fire таймеры (ranged)
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct BurstClock {
    pub next_burst_timer: f32,
    pub shots_remaining: u32,
    pub shot_timer: f32,
}

/// Отступление ranged врага, когда цель ближе stand-off дистанции
///
/// Exhausted: лимит времени отступления израсходован, стоим и стреляем
/// пока дистанция не восстановится (тогда → Idle и лимит снова доступен).
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub enum RetreatClock {
    #[default]
    Idle,
    Active { remaining: f32 },
    Exhausted,
}

/// Память FSM, переживающая смену состояний
#[derive(Debug, Clone, PartialEq)]
pub struct BrainMemory {
    /// Текущая цель (первый hit последней detection)
    pub target: Option<NearbyActor>,
    /// Dasher: cooldown рывка (тикает только в Detected)
    pub dash_cooldown: f32,
    /// ConsecutiveDasher: сколько рывков осталось в серии
    pub dashes_remaining: u32,
    pub burst: BurstClock,
    pub retreat: RetreatClock,
    /// Shockwave: готов к следующей волне
    pub shockwave_ready: bool,
    pub warned_missing_navigator: bool,
    pub warned_missing_animator: bool,
}

impl Default for BrainMemory {
    fn default() -> Self {
        Self {
            target: None,
            dash_cooldown: 0.0,
            dashes_remaining: 0,
            burst: BurstClock::default(),
            retreat: RetreatClock::Idle,
            shockwave_ready: true,
            warned_missing_navigator: false,
            warned_missing_animator: false,
        }
    }
}

/// Уменьшает таймер (не ниже 0). true — таймер истёк.
pub fn countdown(timer: &mut f32, dt: f32) -> bool {
    *timer = (*timer - dt).max(0.0);
    *timer <= 0.0
}
