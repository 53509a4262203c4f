//! Enemy brain: FSM одного врага
//!
//! Порядок тика (как в движковом Update):
//! 1. Disabled → только фаза смерти, больше ничего
//! 2. Обновление текущего состояния (ветка по kind)
//! 3. Анимация ходьбы (isWalking по скорости агента)
//! 4. Detection: hostile в радиусе → Detected, пусто в бою → Patrol
//!
//! Коллабораторы приходят через `BrainContext` на каждый тик. Отсутствие
//! navigator/animator не фатально: один warning, поведение пропускается.

use bevy::prelude::*;
use rand_chacha::ChaCha8Rng;

use super::effects::AiEffect;
use super::kinds::EnemyKind;
use super::patrol::{choose_patrol_destination, PatrolConfig};
use super::state::{countdown, AIState, BrainMemory, DeathPhase, DeathTiming, RetreatClock};
use super::visibility::{is_fully_visible, VisibilityBounds};
use crate::collaborators::{
    Animator, FactionFilter, NearbyActor, Navigator, SpatialQuery, ViewportProjector,
};
use crate::logger::log_warning;

/// Имя state анимации смерти
pub const DEATH_STATE: &str = "Death";

/// Запас к stand-off дистанции shockwave врага
const SHOCKWAVE_TRIGGER_SLACK: f32 = 0.5;
/// Скорость агента, выше которой играем ходьбу
const WALKING_SPEED_THRESHOLD: f32 = 0.1;

/// Всё, что brain видит и трогает за один тик
pub struct BrainContext<'a> {
    pub entity: Entity,
    pub faction_id: u64,
    pub transform: &'a mut Transform,
    pub navigator: Option<&'a mut dyn Navigator>,
    pub animator: Option<&'a mut dyn Animator>,
    pub spatial: &'a dyn SpatialQuery,
    pub camera: Option<&'a dyn ViewportProjector>,
    pub bounds: Option<&'a VisibilityBounds>,
    pub rng: &'a mut ChaCha8Rng,
    pub effects: &'a mut Vec<AiEffect>,
}

impl BrainContext<'_> {
    pub fn position(&self) -> Vec3 {
        self.transform.translation
    }

    fn hostiles_within(&self, radius: f32) -> Vec<NearbyActor> {
        self.spatial
            .find_nearby(self.position(), radius, FactionFilter::HostileTo(self.faction_id))
    }

    /// Мгновенный разворот к точке (только по горизонтали)
    fn face(&mut self, point: Vec3) {
        let to = point - self.position();
        let flat = Vec3::new(to.x, 0.0, to.z);
        if flat.length_squared() > f32::EPSILON {
            self.transform.look_to(flat, Vec3::Y);
        }
    }

    fn forward(&self) -> Vec3 {
        let forward = *self.transform.forward();
        Vec3::new(forward.x, 0.0, forward.z).normalize_or_zero()
    }

    fn set_destination(&mut self, point: Vec3) {
        if let Some(nav) = self.navigator.as_deref_mut() {
            nav.set_destination(point);
        }
    }

    fn stop(&mut self) {
        if let Some(nav) = self.navigator.as_deref_mut() {
            nav.stop();
        }
    }

    fn resume(&mut self) {
        if let Some(nav) = self.navigator.as_deref_mut() {
            nav.resume();
        }
    }

    fn sample_position(&self, point: Vec3, max_distance: f32) -> Option<Vec3> {
        self.navigator
            .as_deref()
            .and_then(|nav| nav.sample_position(point, max_distance))
    }

    fn has_arrived(&self, extra_tolerance: f32) -> bool {
        self.navigator.as_deref().map_or(true, |nav| {
            nav.is_path_complete()
                && nav.remaining_distance() <= nav.stopping_distance() + extra_tolerance
        })
    }

    fn set_anim_bool(&mut self, name: &str, value: bool) {
        if let Some(animator) = self.animator.as_deref_mut() {
            animator.set_bool(name, value);
        }
    }

    fn trigger(&mut self, name: &str) {
        if let Some(animator) = self.animator.as_deref_mut() {
            animator.set_trigger(name);
        }
    }

    fn fully_visible(&self) -> bool {
        match (self.camera, self.bounds) {
            (Some(camera), Some(bounds)) => is_fully_visible(camera, bounds, self.position()),
            _ => false,
        }
    }
}

/// Component: мозг врага (state + kind + память)
#[derive(Component, Debug, Clone)]
pub struct EnemyBrain {
    pub state: AIState,
    pub kind: EnemyKind,
    pub memory: BrainMemory,
    pub detection_radius: f32,
    pub patrol: PatrolConfig,
    pub death: DeathTiming,
}

impl Default for EnemyBrain {
    fn default() -> Self {
        Self::new(EnemyKind::Chaser)
    }
}

impl EnemyBrain {
    pub fn new(kind: EnemyKind) -> Self {
        Self {
            state: AIState::Idle,
            kind,
            memory: BrainMemory::default(),
            detection_radius: 10.0,
            patrol: PatrolConfig::default(),
            death: DeathTiming::default(),
        }
    }

    pub fn with_detection_radius(mut self, radius: f32) -> Self {
        self.detection_radius = radius;
        self
    }

    pub fn with_patrol(mut self, patrol: PatrolConfig) -> Self {
        self.patrol = patrol;
        self
    }

    pub fn with_death_timing(mut self, death: DeathTiming) -> Self {
        self.death = death;
        self
    }

    pub fn is_dead(&self) -> bool {
        self.state.is_disabled()
    }

    /// Смерть доиграна — entity можно убирать
    pub fn is_finished(&self) -> bool {
        matches!(self.state, AIState::Disabled { phase: DeathPhase::Finished })
    }

    pub fn target(&self) -> Option<&NearbyActor> {
        self.memory.target.as_ref()
    }

    /// Кого держит в захвате (если держит)
    pub fn grappled_target(&self) -> Option<Entity> {
        match self.state {
            AIState::Grappling { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Захват не состоялся (цель уже держит другой): сразу в Cooldown.
    /// Возвращает false, если brain не держит `target`.
    pub fn abandon_grapple(&mut self, target: Entity) -> bool {
        if self.grappled_target() != Some(target) {
            return false;
        }
        let timer = match &self.kind {
            EnemyKind::DemonFly(config) => config.attack_cooldown,
            _ => 0.0,
        };
        self.state = AIState::Cooldown { timer };
        true
    }

    // ========================================================================
    // Tick
    // ========================================================================

    pub fn tick(&mut self, ctx: &mut BrainContext, dt: f32) {
        let dt = dt.max(0.0);
        self.warn_missing_collaborators(ctx);

        if let AIState::Disabled { phase } = self.state {
            self.state = AIState::Disabled {
                phase: self.advance_death(phase, ctx, dt),
            };
            return;
        }

        self.refresh_target(ctx);
        self.update_state(ctx, dt);
        self.update_walking_animation(ctx);
        self.check_detection(ctx);
    }

    /// Смерть: навигация выключена, isDead, захват отпущен. Повторный вызов — no-op.
    pub fn disable(&mut self, ctx: &mut BrainContext) {
        if self.state.is_disabled() {
            return;
        }
        self.warn_missing_collaborators(ctx);
        self.release_grapple(ctx);

        match ctx.navigator.as_deref_mut() {
            Some(nav) => {
                nav.stop();
                nav.set_enabled(false);
            }
            None => log_warning(&format!(
                "AI: {:?} ({}) has no navigator, skipping agent disable",
                ctx.entity,
                self.kind.name()
            )),
        }

        let phase = match ctx.animator.as_deref_mut() {
            Some(animator) => {
                animator.set_bool("isAttacking", false);
                animator.set_bool("isWalking", false);
                animator.set_bool("isDead", true);
                DeathPhase::AwaitingAnimation { elapsed: 0.0, entered: false }
            }
            None => {
                log_warning(&format!(
                    "AI: {:?} ({}) has no animator, disabling immediately",
                    ctx.entity,
                    self.kind.name()
                ));
                DeathPhase::Finished
            }
        };

        self.memory.target = None;
        self.transition(ctx, AIState::Disabled { phase });
    }

    fn warn_missing_collaborators(&mut self, ctx: &BrainContext) {
        if ctx.navigator.is_none() && !self.memory.warned_missing_navigator {
            self.memory.warned_missing_navigator = true;
            log_warning(&format!(
                "AI: {:?} ({}) has no navigator, movement skipped",
                ctx.entity,
                self.kind.name()
            ));
        }
        if ctx.animator.is_none() && !self.memory.warned_missing_animator {
            self.memory.warned_missing_animator = true;
            log_warning(&format!(
                "AI: {:?} ({}) has no animator, animation flags skipped",
                ctx.entity,
                self.kind.name()
            ));
        }
    }

    fn transition(&mut self, ctx: &BrainContext, new_state: AIState) {
        if self.state.name() != new_state.name() {
            crate::log(&format!(
                "AI: {:?} ({}) {} → {}",
                ctx.entity,
                self.kind.name(),
                self.state.name(),
                new_state.name()
            ));
        }
        self.state = new_state;
    }

    fn advance_death(&self, phase: DeathPhase, ctx: &BrainContext, dt: f32) -> DeathPhase {
        match phase {
            DeathPhase::AwaitingAnimation { elapsed, entered } => {
                let Some(animator) = ctx.animator.as_deref() else {
                    return DeathPhase::Finished;
                };
                let elapsed = elapsed + dt;
                let in_death = animator.current_state_name() == DEATH_STATE;

                let done = (in_death && animator.normalized_time() >= 1.0) || (entered && !in_death);
                if done {
                    return DeathPhase::Grace { remaining: self.death.grace_delay };
                }
                if elapsed >= self.death.animation_timeout {
                    log_warning(&format!(
                        "AI: {:?} death animation did not finish in {:.1}s, continuing",
                        ctx.entity, self.death.animation_timeout
                    ));
                    return DeathPhase::Grace { remaining: self.death.grace_delay };
                }
                DeathPhase::AwaitingAnimation { elapsed, entered: entered || in_death }
            }
            DeathPhase::Grace { mut remaining } => {
                if countdown(&mut remaining, dt) {
                    crate::log(&format!("AI: {:?} death sequence finished", ctx.entity));
                    DeathPhase::Finished
                } else {
                    DeathPhase::Grace { remaining }
                }
            }
            DeathPhase::Finished => DeathPhase::Finished,
        }
    }

    /// Позиция цели обновляется каждый тик (актор мог сдвинуться)
    fn refresh_target(&mut self, ctx: &BrainContext) {
        let Some(current) = self.memory.target else {
            return;
        };
        if let Some(fresh) = ctx
            .hostiles_within(self.detection_radius)
            .into_iter()
            .find(|hit| hit.entity == current.entity)
        {
            self.memory.target = Some(fresh);
        }
    }

    fn check_detection(&mut self, ctx: &mut BrainContext) {
        if self.kind.visibility_gated() && !ctx.fully_visible() {
            return;
        }

        let hits = ctx.hostiles_within(self.detection_radius);
        match hits.first() {
            Some(hit) => {
                self.memory.target = Some(*hit);
                if !self.state.is_engaged() {
                    self.enter_detected(ctx);
                }
            }
            None => {
                self.memory.target = None;
                if self.state.is_engaged() {
                    self.enter_patrol(ctx);
                }
            }
        }
    }

    fn update_walking_animation(&mut self, ctx: &mut BrainContext) {
        let Some(speed) = ctx.navigator.as_deref().map(|nav| nav.velocity().length()) else {
            return;
        };
        ctx.set_anim_bool("isWalking", speed > WALKING_SPEED_THRESHOLD);
    }

    fn update_state(&mut self, ctx: &mut BrainContext, dt: f32) {
        match self.state {
            AIState::Idle => self.enter_patrol(ctx),
            AIState::Patrol { wait_timer } => self.update_patrol(ctx, wait_timer, dt),
            AIState::Detected => self.update_detected(ctx, dt),
            AIState::PreparingAttack { timer } => self.update_preparing(ctx, timer, dt),
            AIState::Dashing { timer, direction } => self.update_dashing(ctx, timer, direction, dt),
            AIState::WaitingForNextDash { mut timer } => {
                if countdown(&mut timer, dt) {
                    self.enter_dashing(ctx);
                } else {
                    self.state = AIState::WaitingForNextDash { timer };
                }
            }
            AIState::Grappling { target, hit_timer, hits_remaining } => {
                self.update_grappling(ctx, target, hit_timer, hits_remaining, dt)
            }
            AIState::Retreating { timer } => self.update_retreating(ctx, timer, dt),
            AIState::Cooldown { timer } => self.update_cooldown(ctx, timer, dt),
            AIState::Disabled { .. } => {}
        }
    }

    // ========================================================================
    // Patrol
    // ========================================================================

    fn enter_patrol(&mut self, ctx: &mut BrainContext) {
        self.release_grapple(ctx);

        // Прерванные атаки не должны залипать до следующего обнаружения
        self.memory.dashes_remaining = 0;
        self.memory.shockwave_ready = true;
        self.memory.burst.shots_remaining = 0;

        ctx.set_anim_bool("isAttacking", false);
        ctx.resume();
        let wait_timer = self.pick_patrol_destination(ctx);
        self.transition(ctx, AIState::Patrol { wait_timer });
    }

    /// Ставит следующую patrol точку, возвращает новый таймер ожидания.
    /// Подходящей точки нет — остаёмся на месте, таймер всё равно сбрасывается.
    fn pick_patrol_destination(&mut self, ctx: &mut BrainContext) -> f32 {
        let position = ctx.position();
        let chosen = match ctx.navigator.as_deref() {
            Some(nav) => choose_patrol_destination(&self.patrol, position, nav, ctx.spatial, &mut *ctx.rng),
            None => None,
        };

        match chosen {
            Some(point) => ctx.set_destination(point),
            None => {
                if ctx.navigator.is_some() {
                    crate::log(&format!(
                        "AI: {:?} no valid patrol point, holding position",
                        ctx.entity
                    ));
                }
                ctx.set_destination(position);
            }
        }

        self.patrol.roll_wait(&mut *ctx.rng)
    }

    fn update_patrol(&mut self, ctx: &mut BrainContext, mut wait_timer: f32, dt: f32) {
        if ctx.has_arrived(0.0) && countdown(&mut wait_timer, dt) {
            wait_timer = self.pick_patrol_destination(ctx);
        }
        self.state = AIState::Patrol { wait_timer };
    }

    // ========================================================================
    // Detected (per-kind)
    // ========================================================================

    fn enter_detected(&mut self, ctx: &mut BrainContext) {
        if let EnemyKind::Ranged(_) = self.kind {
            self.memory.burst = Default::default();
            self.memory.retreat = RetreatClock::Idle;
        }
        ctx.resume();
        self.transition(ctx, AIState::Detected);
    }

    fn update_detected(&mut self, ctx: &mut BrainContext, dt: f32) {
        let Some(target) = self.memory.target else {
            self.enter_patrol(ctx);
            return;
        };
        let distance = ctx.position().distance(target.position);

        match self.kind.clone() {
            EnemyKind::Chaser => {
                ctx.resume();
                ctx.set_destination(target.position);
            }
            EnemyKind::Dasher(config) => {
                keep_stand_off(ctx, target.position, config.desired_min_distance);
                countdown(&mut self.memory.dash_cooldown, dt);
                if self.memory.dash_cooldown <= 0.0 && distance <= config.dash_start_distance {
                    self.enter_preparing(ctx, config.pre_dash_wait);
                }
            }
            EnemyKind::ConsecutiveDasher(config) => {
                keep_stand_off(ctx, target.position, config.desired_min_distance);
                if distance <= config.dash_start_distance && self.memory.dashes_remaining == 0 {
                    self.memory.dashes_remaining = config.dashes_per_cycle;
                    self.enter_preparing(ctx, config.pre_dash_wait);
                }
            }
            EnemyKind::Ranged(config) => {
                if distance < config.desired_distance {
                    if self.memory.retreat == RetreatClock::Idle {
                        self.memory.retreat = RetreatClock::Active { remaining: config.max_retreat_time };
                    }
                    if let RetreatClock::Active { mut remaining } = self.memory.retreat {
                        self.memory.retreat = if countdown(&mut remaining, dt) {
                            RetreatClock::Exhausted
                        } else {
                            RetreatClock::Active { remaining }
                        };
                        retreat_to_distance(ctx, target.position, distance, config.desired_distance);
                    } else {
                        self.hold_and_fire(ctx, target.position, dt);
                    }
                } else {
                    self.memory.retreat = RetreatClock::Idle;
                    self.hold_and_fire(ctx, target.position, dt);
                }
            }
            EnemyKind::Shockwave(config) => {
                keep_stand_off(ctx, target.position, config.desired_min_distance);
                if self.memory.shockwave_ready
                    && distance <= config.desired_min_distance + SHOCKWAVE_TRIGGER_SLACK
                {
                    self.enter_preparing(ctx, config.pre_shockwave_wait);
                }
            }
            EnemyKind::DemonFly(config) => {
                if distance <= config.dash_start_distance {
                    self.enter_dashing(ctx);
                } else {
                    ctx.resume();
                    ctx.set_destination(target.position);
                }
            }
        }
    }

    // ========================================================================
    // Ranged burst fire
    // ========================================================================

    fn hold_and_fire(&mut self, ctx: &mut BrainContext, target: Vec3, dt: f32) {
        let position = ctx.position();
        ctx.set_destination(position);
        ctx.face(target);
        self.handle_firing(ctx, dt);
    }

    /// Очередь: `shots_per_burst` выстрелов через `time_between_shots`,
    /// потом пауза `burst_interval`. Первая очередь — сразу после обнаружения.
    fn handle_firing(&mut self, ctx: &mut BrainContext, dt: f32) {
        let EnemyKind::Ranged(config) = &self.kind else {
            return;
        };
        if config.visibility_gate && !ctx.fully_visible() {
            return;
        }

        let burst = &mut self.memory.burst;
        if burst.shots_remaining == 0 && countdown(&mut burst.next_burst_timer, dt) {
            burst.shots_remaining = config.shots_per_burst;
            burst.shot_timer = 0.0;
            ctx.set_anim_bool("isAttacking", true);
        } else if burst.shots_remaining > 0 {
            countdown(&mut burst.shot_timer, dt);
        }

        if burst.shots_remaining > 0 && burst.shot_timer <= 0.0 {
            let direction = ctx.forward();
            let origin = ctx.position() + Vec3::Y + direction * 0.5;
            ctx.effects.push(AiEffect::FireProjectile {
                shooter: ctx.entity,
                origin,
                direction,
                speed: config.projectile_speed,
            });
            burst.shots_remaining -= 1;
            if burst.shots_remaining > 0 {
                burst.shot_timer = config.time_between_shots;
            } else {
                burst.next_burst_timer = config.burst_interval;
                ctx.set_anim_bool("isAttacking", false);
            }
        }
    }

    // ========================================================================
    // Preparing / Dashing
    // ========================================================================

    fn enter_preparing(&mut self, ctx: &mut BrainContext, wait: f32) {
        ctx.stop();
        let position = ctx.position();
        ctx.set_destination(position);
        if let Some(target) = self.memory.target {
            ctx.face(target.position);
        }
        self.transition(ctx, AIState::PreparingAttack { timer: wait });
    }

    fn update_preparing(&mut self, ctx: &mut BrainContext, mut timer: f32, dt: f32) {
        if !countdown(&mut timer, dt) {
            self.state = AIState::PreparingAttack { timer };
            return;
        }
        match self.kind {
            EnemyKind::Shockwave(_) => {
                self.perform_shockwave(ctx);
                self.enter_maintain_distance(ctx);
            }
            _ => self.enter_dashing(ctx),
        }
    }

    fn enter_dashing(&mut self, ctx: &mut BrainContext) {
        let duration = match &self.kind {
            EnemyKind::Dasher(c) => c.dash_duration,
            EnemyKind::ConsecutiveDasher(c) => c.dash_duration,
            EnemyKind::DemonFly(c) => c.dash_time,
            _ => return,
        };

        ctx.stop();
        if let Some(target) = self.memory.target {
            ctx.face(target.position);
        }
        let direction = ctx.forward();
        ctx.trigger("Dash");
        self.transition(ctx, AIState::Dashing { timer: duration, direction });
    }

    /// Перемещение ровно на speed × duration: последний шаг обрезается по таймеру
    fn update_dashing(&mut self, ctx: &mut BrainContext, timer: f32, direction: Vec3, dt: f32) {
        let speed = match &self.kind {
            EnemyKind::Dasher(c) => c.dash_speed,
            EnemyKind::ConsecutiveDasher(c) => c.dash_speed,
            EnemyKind::DemonFly(c) => c.dash_speed,
            _ => 0.0,
        };

        let step = dt.min(timer);
        ctx.transform.translation += direction * speed * step;
        let remaining = (timer - step).max(0.0);

        if let EnemyKind::DemonFly(config) = &self.kind {
            let contact = ctx
                .hostiles_within(config.contact_radius)
                .into_iter()
                .find(|hit| !hit.restrained);
            if let Some(hit) = contact {
                let (interval, count) = (config.attack_interval, config.attack_count);
                self.enter_grappling(ctx, hit, interval, count);
                return;
            }
        }

        if remaining > 0.0 {
            self.state = AIState::Dashing { timer: remaining, direction };
            return;
        }

        match self.kind.clone() {
            EnemyKind::Dasher(config) => {
                self.memory.dash_cooldown = config.dash_cooldown;
                self.enter_detected(ctx);
            }
            EnemyKind::ConsecutiveDasher(config) => {
                self.memory.dashes_remaining = self.memory.dashes_remaining.saturating_sub(1);
                if self.memory.dashes_remaining > 0 {
                    self.transition(
                        ctx,
                        AIState::WaitingForNextDash { timer: config.time_between_dashes },
                    );
                } else {
                    self.enter_detected(ctx);
                }
            }
            _ => self.enter_detected(ctx),
        }
    }

    // ========================================================================
    // Grapple (DemonFly)
    // ========================================================================

    fn enter_grappling(&mut self, ctx: &mut BrainContext, hit: NearbyActor, interval: f32, count: u32) {
        ctx.stop();
        ctx.effects.push(AiEffect::Grapple { holder: ctx.entity, target: hit.entity });
        ctx.set_anim_bool("isAttacking", true);
        self.transition(
            ctx,
            AIState::Grappling {
                target: hit.entity,
                hit_timer: interval,
                hits_remaining: count,
            },
        );
    }

    fn update_grappling(
        &mut self,
        ctx: &mut BrainContext,
        target: Entity,
        mut hit_timer: f32,
        mut hits_remaining: u32,
        dt: f32,
    ) {
        let EnemyKind::DemonFly(config) = self.kind.clone() else {
            return;
        };

        if countdown(&mut hit_timer, dt) {
            ctx.effects.push(AiEffect::Damage {
                source: ctx.entity,
                target,
                amount: config.hit_damage,
            });
            hits_remaining = hits_remaining.saturating_sub(1);

            if hits_remaining == 0 {
                self.release_grapple(ctx);
                ctx.set_anim_bool("isAttacking", false);
                ctx.resume();
                self.transition(ctx, AIState::Cooldown { timer: config.attack_cooldown });
                return;
            }
            hit_timer = config.attack_interval;
        }

        self.state = AIState::Grappling { target, hit_timer, hits_remaining };
    }

    fn release_grapple(&mut self, ctx: &mut BrainContext) {
        if let AIState::Grappling { target, .. } = self.state {
            ctx.effects.push(AiEffect::Release { holder: ctx.entity, target });
        }
    }

    // ========================================================================
    // Shockwave / Retreat / Cooldown
    // ========================================================================

    fn perform_shockwave(&mut self, ctx: &mut BrainContext) {
        let EnemyKind::Shockwave(config) = &self.kind else {
            return;
        };
        let hits = ctx.hostiles_within(config.shockwave_radius);
        crate::log(&format!(
            "AI: {:?} shockwave hits {} target(s) for {} damage",
            ctx.entity,
            hits.len(),
            config.shockwave_damage
        ));
        for hit in hits {
            ctx.effects.push(AiEffect::Damage {
                source: ctx.entity,
                target: hit.entity,
                amount: config.shockwave_damage,
            });
        }
        ctx.trigger("Shockwave");
        self.memory.shockwave_ready = false;
    }

    fn enter_maintain_distance(&mut self, ctx: &mut BrainContext) {
        let EnemyKind::Shockwave(config) = self.kind.clone() else {
            return;
        };
        ctx.resume();
        if let Some(target) = self.memory.target {
            let retreat_distance = config.desired_min_distance * config.retreat_multiplier;
            let away = flat_direction(target.position, ctx.position());
            let point = ctx.position() + away * retreat_distance;
            let point = ctx.sample_position(point, retreat_distance).unwrap_or(point);
            ctx.set_destination(point);
        }
        self.transition(ctx, AIState::Retreating { timer: config.maintain_distance_time });
    }

    fn enter_grapple_retreat(&mut self, ctx: &mut BrainContext, target: Vec3, distance: f32, duration: f32) {
        let away = flat_direction(target, ctx.position());
        let point = ctx.position() + away * distance;
        ctx.set_destination(point);
        ctx.resume();
        self.transition(ctx, AIState::Retreating { timer: duration });
    }

    fn update_retreating(&mut self, ctx: &mut BrainContext, mut timer: f32, dt: f32) {
        match self.kind.clone() {
            EnemyKind::Shockwave(config) => {
                let expired = countdown(&mut timer, dt);
                if ctx.has_arrived(0.1) {
                    let position = ctx.position();
                    ctx.set_destination(position);
                }
                if expired {
                    self.transition(ctx, AIState::Cooldown { timer: config.shockwave_cooldown });
                } else {
                    self.state = AIState::Retreating { timer };
                }
            }
            EnemyKind::DemonFly(config) => {
                let Some(target) = self.memory.target else {
                    self.enter_detected(ctx);
                    return;
                };
                let distance = ctx.position().distance(target.position);
                if distance >= config.retreat_min_distance || countdown(&mut timer, dt) {
                    self.enter_detected(ctx);
                } else {
                    self.state = AIState::Retreating { timer };
                }
            }
            _ => self.enter_detected(ctx),
        }
    }

    fn update_cooldown(&mut self, ctx: &mut BrainContext, mut timer: f32, dt: f32) {
        let expired = countdown(&mut timer, dt);

        match self.kind.clone() {
            EnemyKind::Shockwave(config) => {
                if let Some(target) = self.memory.target {
                    keep_stand_off(ctx, target.position, config.desired_min_distance);
                }
                if expired {
                    self.memory.shockwave_ready = true;
                    self.enter_detected(ctx);
                    return;
                }
            }
            EnemyKind::DemonFly(config) => {
                if expired {
                    let target = self.memory.target;
                    match target {
                        Some(target)
                            if ctx.position().distance(target.position) < config.retreat_min_distance =>
                        {
                            self.enter_grapple_retreat(
                                ctx,
                                target.position,
                                config.retreat_min_distance,
                                config.retreat_duration,
                            );
                        }
                        _ => self.enter_detected(ctx),
                    }
                    return;
                }
            }
            _ => {
                if expired {
                    self.enter_detected(ctx);
                    return;
                }
            }
        }

        self.state = AIState::Cooldown { timer };
    }
}

/// Stand-off: подходим не ближе `min_distance`, внутри — стоим
fn keep_stand_off(ctx: &mut BrainContext, target: Vec3, min_distance: f32) {
    let position = ctx.position();
    let distance = position.distance(target);
    if distance > min_distance {
        let direction = (target - position).normalize_or_zero();
        ctx.set_destination(target - direction * min_distance);
    } else {
        ctx.set_destination(position);
    }
}

/// Ranged: отойти так, чтобы дистанция стала `desired`
fn retreat_to_distance(ctx: &mut BrainContext, target: Vec3, distance: f32, desired: f32) {
    let position = ctx.position();
    let away = (position - target).normalize_or_zero();
    let point = position + away * (desired - distance);
    let destination = ctx.sample_position(point, desired).unwrap_or(position);
    ctx.set_destination(destination);
}

/// Горизонтальное направление from → to (ноль если совпадают)
fn flat_direction(from: Vec3, to: Vec3) -> Vec3 {
    let d = to - from;
    Vec3::new(d.x, 0.0, d.z).normalize_or_zero()
}
