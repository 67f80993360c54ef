/// Animation catalog and frame bookkeeping.
///
/// The simulation decides *which* animation an actor shows; the
/// `AnimationPlayer` turns elapsed draw time into a frame index that is
/// handed to the sprite renderer. Drawing itself is a collaborator's job.

use super::geometry::Vec2;

/// Character sheets use square frames of this size.
pub const FRAME_SIZE: i32 = 64;

/// Frame origin: bottom-center, so an actor's position is its feet.
pub const FRAME_ORIGIN: Vec2 = Vec2::new(FRAME_SIZE as f32 / 2.0, FRAME_SIZE as f32);

/// Timing and length of one animation strip.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Animation {
    pub frame_time: f32,
    pub looping: bool,
    pub frame_count: usize,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PlayerAnimation {
    Idle,
    Run,
    Jump,
    Celebrate,
    Die,
    Attack,
}

impl PlayerAnimation {
    pub const ALL: [PlayerAnimation; 6] = [
        PlayerAnimation::Idle,
        PlayerAnimation::Run,
        PlayerAnimation::Jump,
        PlayerAnimation::Celebrate,
        PlayerAnimation::Die,
        PlayerAnimation::Attack,
    ];

    pub fn animation(self) -> Animation {
        match self {
            PlayerAnimation::Idle => Animation { frame_time: 0.1, looping: true, frame_count: 1 },
            PlayerAnimation::Run => Animation { frame_time: 0.1, looping: true, frame_count: 10 },
            PlayerAnimation::Jump => Animation { frame_time: 0.1, looping: false, frame_count: 11 },
            PlayerAnimation::Celebrate => Animation { frame_time: 0.1, looping: false, frame_count: 11 },
            PlayerAnimation::Die => Animation { frame_time: 0.1, looping: false, frame_count: 12 },
            PlayerAnimation::Attack => Animation { frame_time: 0.1, looping: false, frame_count: 6 },
        }
    }

    pub fn asset_path(self) -> &'static str {
        match self {
            PlayerAnimation::Idle => "Sprites/Player/Idle",
            PlayerAnimation::Run => "Sprites/Player/Run",
            PlayerAnimation::Jump => "Sprites/Player/Jump",
            PlayerAnimation::Celebrate => "Sprites/Player/Celebrate",
            PlayerAnimation::Die => "Sprites/Player/Die",
            PlayerAnimation::Attack => "Sprites/Player/Attack",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum EnemyAnimation {
    Idle,
    Run,
    Die,
}

impl EnemyAnimation {
    pub const ALL: [EnemyAnimation; 3] = [EnemyAnimation::Idle, EnemyAnimation::Run, EnemyAnimation::Die];

    pub fn animation(self) -> Animation {
        match self {
            EnemyAnimation::Idle => Animation { frame_time: 0.15, looping: true, frame_count: 1 },
            EnemyAnimation::Run => Animation { frame_time: 0.1, looping: true, frame_count: 10 },
            EnemyAnimation::Die => Animation { frame_time: 0.07, looping: false, frame_count: 12 },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EnemyAnimation::Idle => "Idle",
            EnemyAnimation::Run => "Run",
            EnemyAnimation::Die => "Die",
        }
    }
}

/// Plays one animation at a time. Requesting the animation that is
/// already running does not restart it.
#[derive(Clone, Debug)]
pub struct AnimationPlayer<K> {
    current: K,
    frame_index: usize,
    time: f32,
}

impl<K: Copy + PartialEq> AnimationPlayer<K> {
    pub fn new(initial: K) -> Self {
        AnimationPlayer { current: initial, frame_index: 0, time: 0.0 }
    }

    pub fn current(&self) -> K {
        self.current
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn play(&mut self, animation: K) {
        if self.current == animation {
            return;
        }
        self.current = animation;
        self.frame_index = 0;
        self.time = 0.0;
    }

    /// Advance by `elapsed` seconds; loops or clamps at the last frame.
    pub fn advance(&mut self, elapsed: f32, anim: &Animation) -> usize {
        if anim.frame_count == 0 || anim.frame_time <= 0.0 {
            return self.frame_index;
        }
        self.time += elapsed;
        while self.time > anim.frame_time {
            self.time -= anim.frame_time;
            self.frame_index = if anim.looping {
                (self.frame_index + 1) % anim.frame_count
            } else {
                (self.frame_index + 1).min(anim.frame_count - 1)
            };
        }
        self.frame_index
    }
}
