/// Player physics: velocity integration, jump control curve, attack timer.
///
/// ## Tick order
///
///   1. Horizontal acceleration from the movement axis
///   2. Gravity, clamped to the fall speed
///   3. Jump curve overrides the vertical velocity
///   4. Multiplicative drag (ground or air, using last tick's ground flag)
///   5. Horizontal speed clamp
///   6. Integrate, then snap to whole pixels
///   7. Resolve collisions against the grid
///   8. Zero each velocity axis whose position did not change

use super::collision;
use super::entity::{Facing, Player, PLAYER_SHAPE};
use super::grid::TileGrid;

/// Movement tuning. Velocities are pixels/second, times are seconds.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PhysicsParams {
    pub move_acceleration: f32,
    pub max_move_speed: f32,
    pub ground_drag_factor: f32,
    pub air_drag_factor: f32,
    pub max_jump_time: f32,
    pub jump_launch_velocity: f32,
    pub gravity_acceleration: f32,
    pub max_fall_speed: f32,
    pub jump_control_power: f32,
    pub move_stick_scale: f32,
    pub accelerometer_scale: f32,
    pub max_attack_time: f32,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        PhysicsParams {
            move_acceleration: 13000.0,
            max_move_speed: 1750.0,
            ground_drag_factor: 0.48,
            air_drag_factor: 0.58,
            max_jump_time: 0.35,
            jump_launch_velocity: -3500.0,
            gravity_acceleration: 3400.0,
            max_fall_speed: 550.0,
            jump_control_power: 0.14,
            move_stick_scale: 1.0,
            accelerometer_scale: 1.5,
            max_attack_time: 0.33,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct JumpState {
    /// Seconds since the current jump phase began; 0 when not jumping.
    pub jump_time: f32,
    /// Extra jumps used since last grounded.
    pub jump_count: u32,
    pub was_jumping: bool,
}

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct AttackState {
    pub attack_time: f32,
    pub attacking: bool,
}

impl AttackState {
    /// Fresh attack press.
    pub fn press(&mut self, max_attack_time: f32) {
        if self.attack_time != max_attack_time {
            self.attacking = true;
            self.attack_time = max_attack_time;
        }
    }

    /// Count the swing down; it ends on the tick after the timer runs out.
    pub fn tick(&mut self, dt: f32) {
        if self.attacking {
            if self.attack_time > 0.0 {
                self.attack_time -= dt;
            } else {
                self.attacking = false;
            }
        } else {
            self.attack_time = 0.0;
        }
    }
}

/// What the jump logic did this tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct JumpOutcome {
    /// A new jump left the ground (fires the jump sound).
    pub started: bool,
    /// A jump started or continued (shows the jump animation).
    pub active: bool,
}

/// Primary ascent velocity after `jump_time` seconds of holding jump.
#[inline]
pub fn jump_curve(jump_time: f32, params: &PhysicsParams) -> f32 {
    params.jump_launch_velocity
        * (1.0 - (jump_time / params.max_jump_time).powf(params.jump_control_power))
}

/// Apply the jump control curve and double-jump rule to `velocity_y`.
pub fn do_jump(
    velocity_y: f32,
    jump: &mut JumpState,
    is_jumping: bool,
    on_ground: bool,
    dt: f32,
    params: &PhysicsParams,
) -> (f32, JumpOutcome) {
    let mut velocity_y = velocity_y;
    let mut outcome = JumpOutcome::default();

    if is_jumping {
        if (!jump.was_jumping && on_ground) || jump.jump_time > 0.0 {
            if jump.jump_time == 0.0 {
                outcome.started = true;
            }
            jump.jump_time += dt;
            outcome.active = true;
        }

        if 0.0 < jump.jump_time && jump.jump_time <= params.max_jump_time {
            velocity_y = jump_curve(jump.jump_time, params);
        } else if velocity_y > -params.max_fall_speed * 0.5
            && !jump.was_jumping
            && jump.jump_count < 1
        {
            // Mid-air jump: half the launch, then the primary curve takes over
            velocity_y = params.jump_launch_velocity
                * (0.5 - (jump.jump_time / params.max_jump_time).powf(params.jump_control_power));
            jump.jump_time += dt;
            jump.jump_count += 1;
        } else {
            jump.jump_time = 0.0;
        }
    } else {
        jump.jump_time = 0.0;
    }

    jump.was_jumping = is_jumping;
    (velocity_y, outcome)
}

/// Integrate one tick of player motion and resolve it against the grid.
pub fn apply_physics(
    player: &mut Player,
    grid: &TileGrid,
    params: &PhysicsParams,
    movement: f32,
    is_jumping: bool,
    dt: f32,
) -> JumpOutcome {
    let previous_position = player.position;

    player.velocity.x += movement * params.move_acceleration * dt;
    player.velocity.y = (player.velocity.y + params.gravity_acceleration * dt)
        .clamp(-params.max_fall_speed, params.max_fall_speed);

    let (velocity_y, outcome) = do_jump(
        player.velocity.y,
        &mut player.jump,
        is_jumping,
        player.on_ground,
        dt,
        params,
    );
    player.velocity.y = velocity_y;

    player.velocity.x *= if player.on_ground {
        params.ground_drag_factor
    } else {
        params.air_drag_factor
    };
    player.velocity.x = player.velocity.x.clamp(-params.max_move_speed, params.max_move_speed);

    player.position += player.velocity * dt;
    player.position = player.position.snapped();

    player.on_ground = collision::resolve_collisions(
        &mut player.position,
        &mut player.previous_bottom,
        &PLAYER_SHAPE,
        grid,
    );

    if player.position.x == previous_position.x {
        player.velocity.x = 0.0;
    }
    if player.position.y == previous_position.y {
        player.velocity.y = 0.0;
    }

    if let Some(facing) = Facing::from_velocity(player.velocity.x) {
        player.facing = facing;
    }

    outcome
}
