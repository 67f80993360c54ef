/// Events emitted during a simulation step.
/// The simulation never plays sounds itself; the session turns these
/// into `SoundId`s and hands them to the audio port.

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum GameEvent {
    PlayerJumped,
    GemCollected { x: f32, y: f32 },
    /// `killer` is the enemy index, `None` for a fall.
    PlayerKilled { killer: Option<usize> },
    EnemyKilled { index: usize },
    ExitReached,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum SoundId {
    PlayerJump,
    PlayerKilled,
    PlayerFall,
    MonsterKilled,
    GemCollected,
    ExitReached,
}

impl SoundId {
    pub const ALL: [SoundId; 6] = [
        SoundId::PlayerJump,
        SoundId::PlayerKilled,
        SoundId::PlayerFall,
        SoundId::MonsterKilled,
        SoundId::GemCollected,
        SoundId::ExitReached,
    ];

    pub fn asset_path(self) -> &'static str {
        match self {
            SoundId::PlayerJump => "Sounds/PlayerJump",
            SoundId::PlayerKilled => "Sounds/PlayerKilled",
            SoundId::PlayerFall => "Sounds/PlayerFall",
            SoundId::MonsterKilled => "Sounds/MonsterKilled",
            SoundId::GemCollected => "Sounds/GemCollected",
            SoundId::ExitReached => "Sounds/ExitReached",
        }
    }
}

impl GameEvent {
    pub fn sound(&self) -> SoundId {
        match self {
            GameEvent::PlayerJumped => SoundId::PlayerJump,
            GameEvent::GemCollected { .. } => SoundId::GemCollected,
            GameEvent::PlayerKilled { killer: Some(_) } => SoundId::PlayerKilled,
            GameEvent::PlayerKilled { killer: None } => SoundId::PlayerFall,
            GameEvent::EnemyKilled { .. } => SoundId::MonsterKilled,
            GameEvent::ExitReached => SoundId::ExitReached,
        }
    }
}
