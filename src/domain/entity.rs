/// Entities: Player, Enemy, Gem.
/// The Level owns all of them; grid queries take `&TileGrid` as an argument.
/// Positions are bottom-center anchors for characters, centers for gems.

use super::ai::EnemyState;
use super::animation::{AnimationPlayer, EnemyAnimation, PlayerAnimation};
use super::collision::BodyShape;
use super::geometry::{Circle, Rect, Vec2};
use super::grid::TileGrid;
use super::physics::{self, AttackState, JumpOutcome, JumpState, PhysicsParams};
use super::tile::TILE_WIDTH;

/// Player collision box: 40% of the frame wide, 80% tall.
pub const PLAYER_SHAPE: BodyShape = BodyShape { local: Rect::new(19, 13, 25, 51) };

/// Enemy collision box: 35% of the frame wide, 70% tall.
pub const ENEMY_SHAPE: BodyShape = BodyShape { local: Rect::new(21, 20, 22, 44) };

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn sign(self) -> i32 {
        match self {
            Facing::Left => -1,
            Facing::Right => 1,
        }
    }

    pub fn flipped(self) -> Facing {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    /// Facing implied by a horizontal velocity; `None` at rest.
    pub fn from_velocity(vx: f32) -> Option<Facing> {
        if vx > 0.0 {
            Some(Facing::Right)
        } else if vx < 0.0 {
            Some(Facing::Left)
        } else {
            None
        }
    }

    /// Character sheets are drawn facing left.
    pub fn sprite_flip(self) -> bool {
        self == Facing::Right
    }
}

/// Frame input: the movement axis is continuous, jump is held,
/// attack is edge-triggered (fresh press).
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct FrameInput {
    /// Horizontal axis in [-1, 1].
    pub movement: f32,
    pub jump: bool,
    pub attack: bool,
}

/// Which monster sheet an enemy uses.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum SpriteSet {
    A,
    B,
    C,
    D,
}

impl SpriteSet {
    pub fn from_char(c: char) -> Option<SpriteSet> {
        match c {
            'A' => Some(SpriteSet::A),
            'B' => Some(SpriteSet::B),
            'C' => Some(SpriteSet::C),
            'D' => Some(SpriteSet::D),
            _ => None,
        }
    }

    pub fn asset_dir(self) -> &'static str {
        match self {
            SpriteSet::A => "Sprites/MonsterA",
            SpriteSet::B => "Sprites/MonsterB",
            SpriteSet::C => "Sprites/MonsterC",
            SpriteSet::D => "Sprites/MonsterD",
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct Player {
    pub position: Vec2,
    pub velocity: Vec2,
    /// One-way true→false until the next reset.
    pub alive: bool,
    pub on_ground: bool,
    /// Bottom edge after last tick's collision pass.
    pub previous_bottom: f32,
    pub jump: JumpState,
    pub attack: AttackState,
    pub facing: Facing,
    pub sprite: AnimationPlayer<PlayerAnimation>,
}

impl Player {
    pub fn new(position: Vec2) -> Self {
        Player {
            position,
            velocity: Vec2::ZERO,
            alive: true,
            on_ground: false,
            previous_bottom: position.y,
            jump: JumpState::default(),
            attack: AttackState::default(),
            facing: Facing::Left,
            sprite: AnimationPlayer::new(PlayerAnimation::Idle),
        }
    }

    /// Bring the player back to life at `position`.
    pub fn reset(&mut self, position: Vec2) {
        let facing = self.facing;
        *self = Player::new(position);
        self.facing = facing;
    }

    pub fn bounding_rect(&self) -> Rect {
        PLAYER_SHAPE.bounds_at(self.position)
    }

    /// Hit region of a swing: the bounding box shifted one width forward.
    pub fn melee_rect(&self) -> Rect {
        let b = self.bounding_rect();
        b.offset_x(b.width * self.facing.sign())
    }

    pub fn is_attacking(&self) -> bool {
        self.attack.attacking
    }

    /// Full player tick: attack timer, physics, animation choice.
    pub fn update(
        &mut self,
        grid: &TileGrid,
        params: &PhysicsParams,
        input: &FrameInput,
        dt: f32,
    ) -> JumpOutcome {
        if input.attack {
            self.attack.press(params.max_attack_time);
        }
        self.attack.tick(dt);

        let outcome = physics::apply_physics(self, grid, params, input.movement, input.jump, dt);
        if outcome.active {
            self.sprite.play(PlayerAnimation::Jump);
        }

        if self.alive && self.on_ground {
            let anim = if self.attack.attacking {
                PlayerAnimation::Attack
            } else if self.velocity.x.abs() - 0.02 > 0.0 {
                PlayerAnimation::Run
            } else {
                PlayerAnimation::Idle
            };
            self.sprite.play(anim);
        }

        if self.on_ground {
            self.jump.jump_count = 0;
        }
        outcome
    }

    pub fn on_killed(&mut self) {
        self.alive = false;
        self.sprite.play(PlayerAnimation::Die);
    }

    pub fn on_reached_exit(&mut self) {
        self.sprite.play(PlayerAnimation::Celebrate);
    }
}

// ══════════════════════════════════════════════════════════════
// Enemy
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct Enemy {
    pub position: Vec2,
    pub facing: Facing,
    pub state: EnemyState,
    /// Seconds left in the Waiting state.
    pub wait_time: f32,
    /// Seconds left before a dead enemy is purged.
    pub death_time: f32,
    pub sprite_set: SpriteSet,
    pub sprite: AnimationPlayer<EnemyAnimation>,
}

impl Enemy {
    pub fn new(position: Vec2, sprite_set: SpriteSet) -> Self {
        Enemy {
            position,
            facing: Facing::Left,
            state: EnemyState::Moving,
            wait_time: 0.0,
            death_time: 0.0,
            sprite_set,
            sprite: AnimationPlayer::new(EnemyAnimation::Idle),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.state != EnemyState::Dead
    }

    pub fn bounding_rect(&self) -> Rect {
        ENEMY_SHAPE.bounds_at(self.position)
    }
}

// ══════════════════════════════════════════════════════════════
// Gem
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct GemParams {
    pub point_value: u32,
    /// Bounce amplitude as a fraction of the texture height.
    pub bounce_height: f32,
    /// Radians per second.
    pub bounce_rate: f32,
    /// Phase shift per pixel of x, so neighbouring gems bob in a wave.
    pub bounce_sync: f32,
    pub texture_height: f32,
}

impl Default for GemParams {
    fn default() -> Self {
        GemParams {
            point_value: 50,
            bounce_height: 0.18,
            bounce_rate: 3.0,
            bounce_sync: -0.75,
            texture_height: 32.0,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Gem {
    pub base_position: Vec2,
    bounce: f32,
}

impl Gem {
    pub fn new(base_position: Vec2) -> Self {
        Gem { base_position, bounce: 0.0 }
    }

    /// Recompute the bounce offset from total game time.
    pub fn update(&mut self, total_seconds: f64, params: &GemParams) {
        let t = total_seconds * params.bounce_rate as f64
            + (self.base_position.x * params.bounce_sync) as f64;
        self.bounce = t.sin() as f32 * params.bounce_height * params.texture_height;
    }

    pub fn position(&self) -> Vec2 {
        self.base_position + Vec2::new(0.0, self.bounce)
    }

    pub fn bounding_circle(&self) -> Circle {
        Circle { center: self.position(), radius: TILE_WIDTH as f32 / 3.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes_match_frame_fractions() {
        assert_eq!(PLAYER_SHAPE, BodyShape::from_fractions(64, 0.4, 0.8));
        assert_eq!(ENEMY_SHAPE, BodyShape::from_fractions(64, 0.35, 0.7));
    }

    #[test]
    fn melee_rect_is_in_front() {
        let mut p = Player::new(Vec2::new(100.0, 64.0));
        p.facing = Facing::Right;
        let b = p.bounding_rect();
        assert_eq!(p.melee_rect().left, b.right());
        p.facing = Facing::Left;
        assert_eq!(p.melee_rect().right(), b.left);
    }

    #[test]
    fn reset_revives_at_start() {
        let mut p = Player::new(Vec2::new(100.0, 64.0));
        p.velocity = Vec2::new(30.0, 40.0);
        p.on_killed();
        assert!(!p.alive);
        assert_eq!(p.sprite.current(), PlayerAnimation::Die);
        p.reset(Vec2::new(20.0, 32.0));
        assert!(p.alive);
        assert_eq!(p.velocity, Vec2::ZERO);
        assert_eq!(p.position, Vec2::new(20.0, 32.0));
        assert_eq!(p.sprite.current(), PlayerAnimation::Idle);
    }

    #[test]
    fn gem_bounces_around_base() {
        let params = GemParams::default();
        let mut g = Gem::new(Vec2::new(60.0, 48.0));
        for i in 0..50 {
            g.update(i as f64 * 0.1, &params);
            let dy = g.position().y - 48.0;
            assert!(dy.abs() <= params.bounce_height * params.texture_height + 1e-4);
            assert_eq!(g.position().x, 60.0);
        }
    }

    #[test]
    fn facing_from_velocity() {
        assert_eq!(Facing::from_velocity(3.0), Some(Facing::Right));
        assert_eq!(Facing::from_velocity(-0.1), Some(Facing::Left));
        assert_eq!(Facing::from_velocity(0.0), None);
        assert!(Facing::Right.sprite_flip());
    }
}
