/// The step function: advances a level by one tick.
///
/// Processing order:
///   1. Player dead or time exhausted → physics only (fall and settle)
///   2. Exit reached → convert remaining time into score
///   3. Normal tick:
///      a. Timer
///      b. Player (attack, physics, animation)
///      c. Gems (bounce, pickup)
///      d. Fall death
///      e. Enemies (AI, contact kills, melee kills), then purge
///      f. Exit check
///   4. Camera follow
///
/// Score never decreases. Remaining time never increases and never goes
/// below zero.

use std::time::Duration;

use tracing::{debug, info};

use crate::domain::ai;
use crate::domain::entity::FrameInput;
use crate::domain::physics;
use super::event::GameEvent;
use super::world::Level;

/// Time since the last tick and since the session started.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct GameTime {
    pub elapsed: Duration,
    pub total: Duration,
}

impl GameTime {
    pub fn new(elapsed: Duration, total: Duration) -> Self {
        GameTime { elapsed, total }
    }
}

/// Length of one simulation step. Positions are rounded every step, so
/// the integrator only holds together at this size.
pub const SIM_STEP: Duration = Duration::from_nanos(16_666_667);

/// Steps run for a single frame at most; any larger backlog is dropped.
const MAX_STEPS_PER_FRAME: u32 = 3;

/// Turns wall-clock frame times into whole `SIM_STEP`s.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct FixedStep {
    accumulator: Duration,
}

impl FixedStep {
    /// Add real time and return how many steps to run now.
    pub fn advance(&mut self, real: Duration) -> u32 {
        self.accumulator += real;
        let mut steps = 0;
        while self.accumulator >= SIM_STEP && steps < MAX_STEPS_PER_FRAME {
            self.accumulator -= SIM_STEP;
            steps += 1;
        }
        if self.accumulator >= SIM_STEP {
            debug!(dropped_ms = self.accumulator.as_millis() as u64, "simulation fell behind");
            self.accumulator = Duration::ZERO;
        }
        steps
    }
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn update(level: &mut Level, time: GameTime, input: FrameInput) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();
    let dt = time.elapsed.as_secs_f32();

    if !level.player.alive || level.time_exhausted() {
        // Still fall and land, but nothing else happens
        physics::apply_physics(&mut level.player, &level.grid, &level.tuning.physics, 0.0, false, dt);
    } else if level.reached_exit {
        convert_time_to_score(level, time.elapsed);
    } else {
        level.time_remaining = level.time_remaining.saturating_sub(time.elapsed);
        update_player(level, &input, dt, &mut events);
        update_gems(level, time.total, &mut events);
        check_fall(level, &mut events);
        update_enemies(level, dt, &mut events);
        check_exit(level, &mut events);
    }

    level.scroll_camera();
    events
}

// ══════════════════════════════════════════════════════════════
// Exit: time → score
// ══════════════════════════════════════════════════════════════

fn convert_time_to_score(level: &mut Level, elapsed: Duration) {
    let remaining = level.time_remaining;
    let cap = remaining.as_secs_f64().ceil() as u64;
    let seconds = ((elapsed.as_secs_f64() * 100.0).round_ties_even() as u64).min(cap);

    level.time_remaining = remaining.saturating_sub(Duration::from_secs(seconds));
    level.score += seconds as u32 * level.tuning.scoring.points_per_second;
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

fn update_player(level: &mut Level, input: &FrameInput, dt: f32, events: &mut Vec<GameEvent>) {
    let outcome = level.player.update(&level.grid, &level.tuning.physics, input, dt);
    if outcome.started {
        events.push(GameEvent::PlayerJumped);
    }
}

fn check_fall(level: &mut Level, events: &mut Vec<GameEvent>) {
    if level.player.alive && level.player.bounding_rect().top >= level.grid.pixel_height() {
        level.player.on_killed();
        info!("player fell out of the level");
        events.push(GameEvent::PlayerKilled { killer: None });
    }
}

// ══════════════════════════════════════════════════════════════
// Gems
// ══════════════════════════════════════════════════════════════

fn update_gems(level: &mut Level, total: Duration, events: &mut Vec<GameEvent>) {
    let player_rect = level.player.bounding_rect();
    let total_seconds = total.as_secs_f64();
    let params = level.tuning.gem;

    let mut i = 0;
    while i < level.gems.len() {
        let gem = &mut level.gems[i];
        gem.update(total_seconds, &params);
        if gem.bounding_circle().intersects(&player_rect) {
            let p = gem.position();
            level.gems.remove(i);
            level.score += params.point_value;
            debug!(x = p.x, y = p.y, score = level.score, "gem collected");
            events.push(GameEvent::GemCollected { x: p.x, y: p.y });
        } else {
            i += 1;
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Enemies
// ══════════════════════════════════════════════════════════════

/// Contact with a live enemy kills the player. Independently, a live
/// enemy inside the swing while the player attacks is killed. Both can
/// happen to the same enemy in one tick.
fn update_enemies(level: &mut Level, dt: f32, events: &mut Vec<GameEvent>) {
    let enemy_params = level.tuning.enemy;

    for index in 0..level.enemies.len() {
        let enemy = &mut level.enemies[index];
        ai::update_enemy(enemy, &level.grid, &enemy_params, dt);
        if !enemy.is_alive() {
            continue;
        }

        let enemy_rect = enemy.bounding_rect();

        if level.player.alive && enemy_rect.intersects(&level.player.bounding_rect()) {
            level.player.on_killed();
            info!(enemy = index, "player killed by enemy");
            events.push(GameEvent::PlayerKilled { killer: Some(index) });
        }

        if level.player.is_attacking()
            && enemy_rect.intersects(&level.player.melee_rect())
            && ai::kill(enemy, &enemy_params)
        {
            debug!(enemy = index, "enemy killed");
            events.push(GameEvent::EnemyKilled { index });
        }
    }

    level.enemies.retain(|e| !ai::can_purge(e));
}

// ══════════════════════════════════════════════════════════════
// Exit
// ══════════════════════════════════════════════════════════════

fn check_exit(level: &mut Level, events: &mut Vec<GameEvent>) {
    let player = &mut level.player;
    if player.alive && player.on_ground && player.bounding_rect().contains(level.exit) {
        level.reached_exit = true;
        player.on_reached_exit();
        info!(score = level.score, remaining = ?level.time_remaining, "exit reached");
        events.push(GameEvent::ExitReached);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::animation::PlayerAnimation;
    use crate::domain::entity::Facing;
    use crate::domain::geometry::Vec2;
    use crate::sim::level::{embedded_levels, parse_layout};
    use crate::sim::rng::SeededVariants;
    use crate::sim::world::Tuning;
    use proptest::prelude::*;

    const DT: f64 = 1.0 / 60.0;

    fn level(rows: &[&str]) -> Level {
        let layout = parse_layout(&rows.join("\n"), &mut SeededVariants::default()).unwrap();
        Level::new(layout, Tuning::default())
    }

    fn tick(level: &mut Level, input: FrameInput, n: u32) -> Vec<GameEvent> {
        let t = GameTime::new(Duration::from_secs_f64(DT), Duration::from_secs_f64(DT * n as f64));
        update(level, t, input)
    }

    #[test]
    fn gem_pickup_is_idempotent() {
        let mut lv = level(&["G....", "1...X", "#####"]);
        let events = tick(&mut lv, FrameInput::default(), 1);
        assert!(events.iter().any(|e| matches!(e, GameEvent::GemCollected { .. })));
        assert_eq!(lv.score, 50);
        assert!(lv.gems.is_empty());

        let events = tick(&mut lv, FrameInput::default(), 2);
        assert!(events.is_empty());
        assert_eq!(lv.score, 50);
    }

    #[test]
    fn player_settles_on_spawn_floor() {
        let mut lv = level(&[".....", "1...X", "#####"]);
        tick(&mut lv, FrameInput::default(), 1);
        assert!(lv.player.on_ground);
        assert_eq!(lv.player.position, Vec2::new(20.0, 64.0));
        assert_eq!(lv.player.sprite.current(), PlayerAnimation::Idle);
    }

    #[test]
    fn jump_event_fires_once() {
        let mut lv = level(&["......", "......", "1....X", "######"]);
        tick(&mut lv, FrameInput::default(), 1);
        let jump = FrameInput { jump: true, ..Default::default() };
        let events = tick(&mut lv, jump, 2);
        assert_eq!(events, vec![GameEvent::PlayerJumped]);
        assert!(lv.player.velocity.y < 0.0);
        assert_eq!(lv.player.sprite.current(), PlayerAnimation::Jump);
        let events = tick(&mut lv, jump, 3);
        assert!(events.is_empty());
    }

    #[test]
    fn melee_kills_enemy_in_front() {
        let mut lv = level(&["......", ".1A..X", "######"]);
        lv.player.facing = Facing::Right;
        let attack = FrameInput { attack: true, ..Default::default() };
        let events = tick(&mut lv, attack, 1);
        assert_eq!(events, vec![GameEvent::EnemyKilled { index: 0 }]);
        assert!(!lv.enemies[0].is_alive());
        assert!(lv.player.alive);
    }

    #[test]
    fn contact_and_melee_both_fire_on_the_same_enemy() {
        let mut lv = level(&["......", ".1A..X", "######"]);
        lv.enemies[0].position.x = 80.0;
        lv.player.facing = Facing::Right;
        let attack = FrameInput { attack: true, ..Default::default() };
        let events = tick(&mut lv, attack, 1);
        assert_eq!(
            events,
            vec![GameEvent::PlayerKilled { killer: Some(0) }, GameEvent::EnemyKilled { index: 0 }]
        );
        assert!(!lv.player.alive);
        assert!(!lv.enemies[0].is_alive());
    }

    #[test]
    fn melee_misses_enemy_behind() {
        let mut lv = level(&["......", ".1A..X", "######"]);
        lv.player.facing = Facing::Left;
        let attack = FrameInput { attack: true, ..Default::default() };
        let events = tick(&mut lv, attack, 1);
        assert!(events.is_empty());
        assert!(lv.enemies[0].is_alive());
    }

    #[test]
    fn dead_enemy_is_purged_after_its_timer() {
        let mut lv = level(&["......", ".1A..X", "######"]);
        lv.player.facing = Facing::Right;
        tick(&mut lv, FrameInput { attack: true, ..Default::default() }, 1);
        for n in 2..=62 {
            tick(&mut lv, FrameInput::default(), n);
        }
        assert!(lv.enemies.is_empty());
    }

    #[test]
    fn touching_enemy_kills_player_once() {
        let mut lv = level(&["......", ".1A..X", "######"]);
        lv.enemies[0].position.x = 70.0;
        let events = tick(&mut lv, FrameInput::default(), 1);
        assert_eq!(events, vec![GameEvent::PlayerKilled { killer: Some(0) }]);
        assert!(!lv.player.alive);
        assert_eq!(lv.player.sprite.current(), PlayerAnimation::Die);

        let events = tick(&mut lv, FrameInput::default(), 2);
        assert!(events.is_empty());
    }

    #[test]
    fn falling_out_kills_without_killer() {
        let mut lv = level(&[".....", "1...X", "#####"]);
        lv.player.position = Vec2::new(60.0, 200.0);
        lv.player.previous_bottom = 200.0;
        let events = tick(&mut lv, FrameInput::default(), 1);
        assert_eq!(events, vec![GameEvent::PlayerKilled { killer: None }]);
        assert!(!lv.player.alive);
    }

    #[test]
    fn exit_converts_time_into_score() {
        let mut lv = level(&["......", "1.X...", "######"]);
        lv.player.position = Vec2::new(100.0, 64.0);
        let events = tick(&mut lv, FrameInput::default(), 1);
        assert_eq!(events, vec![GameEvent::ExitReached]);
        assert!(lv.reached_exit);
        assert_eq!(lv.player.sprite.current(), PlayerAnimation::Celebrate);

        lv.time_remaining = Duration::from_secs(10);
        tick(&mut lv, FrameInput::default(), 2);
        assert_eq!(lv.time_remaining, Duration::from_secs(8));
        assert_eq!(lv.score, 10);

        let big = GameTime::new(Duration::from_millis(100), Duration::from_secs(1));
        update(&mut lv, big, FrameInput::default());
        assert_eq!(lv.time_remaining, Duration::ZERO);
        assert_eq!(lv.score, 50);
    }

    #[test]
    fn exit_conversion_rounds_up_partial_seconds() {
        let mut lv = level(&["......", "1.X...", "######"]);
        lv.reached_exit = true;
        lv.time_remaining = Duration::from_millis(500);
        tick(&mut lv, FrameInput::default(), 1);
        assert_eq!(lv.time_remaining, Duration::ZERO);
        assert_eq!(lv.score, 5);
    }

    #[test]
    fn nothing_happens_when_time_is_up() {
        let mut lv = level(&["G....", "1...X", "#####"]);
        lv.time_remaining = Duration::ZERO;
        let events = tick(&mut lv, FrameInput::default(), 1);
        assert!(events.is_empty());
        assert_eq!(lv.gems.len(), 1);
        assert_eq!(lv.score, 0);
        assert!(lv.player.on_ground);
    }

    #[test]
    fn timer_counts_down() {
        let mut lv = level(&[".....", "1...X", "#####"]);
        for n in 1..=60 {
            tick(&mut lv, FrameInput::default(), n);
        }
        let left = lv.time_remaining.as_secs_f64();
        assert!((left - 119.0).abs() < 1e-3);
    }

    #[test]
    fn fixed_step_accumulates_short_frames() {
        let mut clock = FixedStep::default();
        assert_eq!(clock.advance(Duration::from_millis(10)), 0);
        assert_eq!(clock.advance(Duration::from_millis(10)), 1);
        assert_eq!(clock.advance(Duration::from_secs(1)), MAX_STEPS_PER_FRAME);
        assert_eq!(clock.advance(Duration::ZERO), 0);
    }

    /// Drives `update` the way the game loop does: real frames of
    /// `frame` length fed through the fixed-step clock.
    fn run_frames(level: &mut Level, input: FrameInput, frame: Duration, frames: u32) -> Vec<GameEvent> {
        let mut clock = FixedStep::default();
        let mut total = Duration::ZERO;
        let mut events = Vec::new();
        for _ in 0..frames {
            for _ in 0..clock.advance(frame) {
                total += SIM_STEP;
                events.extend(update(level, GameTime::new(SIM_STEP, total), input));
            }
        }
        events
    }

    #[test]
    fn short_frames_still_fall_land_and_jump() {
        let mut lv = level(&[".....", "1...X", "#####"]);
        lv.player.position = Vec2::new(20.0, 32.0);
        lv.player.previous_bottom = 32.0;

        run_frames(&mut lv, FrameInput::default(), Duration::from_millis(10), 200);
        assert!(lv.player.on_ground);
        assert_eq!(lv.player.position, Vec2::new(20.0, 64.0));

        let jump = FrameInput { jump: true, ..Default::default() };
        let events = run_frames(&mut lv, jump, Duration::from_millis(5), 8);
        assert_eq!(events, vec![GameEvent::PlayerJumped]);
        assert!(lv.player.velocity.y < 0.0);
    }

    fn input_strategy() -> impl Strategy<Value = FrameInput> {
        (-1.0f32..=1.0, any::<bool>(), any::<bool>())
            .prop_map(|(movement, jump, attack)| FrameInput { movement, jump, attack })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn score_rises_and_time_falls(
            level_index in 0usize..3,
            inputs in proptest::collection::vec(input_strategy(), 1..240),
        ) {
            let def = &embedded_levels()[level_index];
            let layout = parse_layout(&def.text, &mut SeededVariants::default()).unwrap();
            let mut lv = Level::new(layout, Tuning::default());

            let mut score = lv.score;
            let mut time = lv.time_remaining;
            for (n, input) in inputs.into_iter().enumerate() {
                tick(&mut lv, input, n as u32 + 1);
                prop_assert!(lv.score >= score);
                prop_assert!(lv.time_remaining <= time);
                score = lv.score;
                time = lv.time_remaining;
            }
        }
    }
}
