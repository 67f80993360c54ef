/// Input state tracker.
///
/// Tracks which keys are currently held down, enabling:
///   - Continuous running and variable-height jumps while a key is held
///   - Edge-triggered attack and continue (only fire on initial press)
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.
///
/// `TerminalInput` merges keyboard and gamepad into the simulation's
/// `InputSnapshot`.

use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::{execute, terminal};
use tracing::{debug, info};

use crate::config::GamepadConfig;
use crate::domain::controls::InputSnapshot;
use crate::sim::ports::InputPort;
use super::gamepad::GamepadState;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

const LEFT_KEYS: [KeyCode; 3] = [KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const RIGHT_KEYS: [KeyCode; 3] = [KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const JUMP_KEYS: [KeyCode; 4] = [KeyCode::Char(' '), KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const ATTACK_KEYS: [KeyCode; 4] = [KeyCode::Char('x'), KeyCode::Char('X'), KeyCode::Char('j'), KeyCode::Char('J')];
const CONTINUE_KEYS: [KeyCode; 1] = [KeyCode::Enter];
const QUIT_KEYS: [KeyCode; 1] = [KeyCode::Esc];
const MUTE_KEYS: [KeyCode; 2] = [KeyCode::Char('m'), KeyCode::Char('M')];

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that transitioned from "not held" → "held" during the
    /// most recent drain_events() call. Used for edge-triggered actions.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for meta-key handling.
    pub raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before simulation tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        // Read all available events without blocking
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.record(key, Instant::now());
            }
        }

        self.expire(Instant::now());
    }

    fn record(&mut self, key: KeyEvent, now: Instant) {
        self.raw_events.push(key);

        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                // Explicit release: remove from active set
                self.last_active.remove(&key.code);
            }
            KeyEventKind::Release => {
                // Ignore release when enhancement not confirmed;
                // rely on timeout-based expiry instead
            }
            _ => {
                let was_held = self.held_at(key.code, now);
                self.last_active.insert(key.code, now);
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    /// Expire keys that have timed out (fallback for terminals without Release)
    fn expire(&mut self, now: Instant) {
        if !self.honor_release {
            self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
        }
    }

    /// Is this key currently held down?
    pub fn is_held(&self, code: KeyCode) -> bool {
        self.held_at(code, Instant::now())
    }

    /// Convenience: is any of these keys held?
    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    /// Convenience: was any of these keys freshly pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    // ── Internal ──

    fn held_at(&self, code: KeyCode, now: Instant) -> bool {
        match self.last_active.get(&code) {
            Some(_) if self.honor_release => true,
            Some(t) => now.duration_since(*t) < HOLD_TIMEOUT,
            None => false,
        }
    }
}

// ── Keyboard + gamepad ──

/// Meta actions handled by the game loop, outside the simulation.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct MetaInput {
    pub quit: bool,
    pub toggle_mute: bool,
}

pub struct TerminalInput {
    keys: InputState,
    pad: GamepadState,
    /// Edge presses seen since the last snapshot. Polling runs faster
    /// than the simulation tick, so presses are latched until consumed.
    pending_attack: bool,
    pending_continue: bool,
}

impl TerminalInput {
    pub fn new(gamepad: &GamepadConfig) -> Self {
        let mut pad = GamepadState::new();
        pad.load_button_config(gamepad);
        TerminalInput {
            keys: InputState::new(),
            pad,
            pending_attack: false,
            pending_continue: false,
        }
    }

    /// Ask the terminal for key Release events. Returns whether the
    /// terminal agreed; without them holds expire by timeout.
    pub fn enable_release_events(&mut self) -> io::Result<bool> {
        if !terminal::supports_keyboard_enhancement()? {
            info!("keyboard enhancement unsupported, using hold timeout");
            return Ok(false);
        }
        execute!(
            io::stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
        self.keys.honor_release = true;
        debug!("key release events enabled");
        Ok(true)
    }

    pub fn restore(&mut self) -> io::Result<()> {
        if self.keys.honor_release {
            execute!(io::stdout(), PopKeyboardEnhancementFlags)?;
            self.keys.honor_release = false;
        }
        Ok(())
    }

    /// Poll both devices. Call once per frame.
    pub fn poll(&mut self) -> MetaInput {
        self.keys.drain_events();
        self.pad.update();
        self.latch();
        self.meta()
    }

    fn latch(&mut self) {
        self.pending_attack |= self.keys.any_pressed(&ATTACK_KEYS) || self.pad.attack_pressed();
        self.pending_continue |= self.keys.any_pressed(&CONTINUE_KEYS) || self.pad.confirm_pressed();
    }

    fn meta(&self) -> MetaInput {
        MetaInput {
            quit: self.keys.ctrl_c_pressed()
                || self.keys.any_pressed(&QUIT_KEYS)
                || self.pad.cancel_pressed(),
            toggle_mute: self.keys.any_pressed(&MUTE_KEYS),
        }
    }

}

impl InputPort for TerminalInput {
    /// Held state is sampled now; latched presses are consumed.
    fn snapshot(&mut self) -> InputSnapshot {
        let keys = &self.keys;
        let pad = &self.pad;
        InputSnapshot {
            stick_x: pad.stick_x(),
            digital_left: keys.any_held(&LEFT_KEYS) || pad.left_held(),
            digital_right: keys.any_held(&RIGHT_KEYS) || pad.right_held(),
            jump: keys.any_held(&JUMP_KEYS) || pad.jump_held(),
            attack: std::mem::take(&mut self.pending_attack),
            continue_pressed: std::mem::take(&mut self.pending_continue),
            ..InputSnapshot::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Press)
    }

    fn release(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Release)
    }

    fn input() -> TerminalInput {
        TerminalInput::new(&crate::config::GameConfig::default().gamepad)
    }

    #[test]
    fn first_press_is_fresh_repeat_is_not() {
        let mut state = InputState::new();
        let t0 = Instant::now();
        state.record(press(KeyCode::Char('x')), t0);
        assert!(state.was_pressed(KeyCode::Char('x')));

        state.fresh_presses.clear();
        state.record(press(KeyCode::Char('x')), t0 + Duration::from_millis(30));
        assert!(!state.was_pressed(KeyCode::Char('x')));
    }

    #[test]
    fn holds_expire_without_release_events() {
        let mut state = InputState::new();
        let t0 = Instant::now();
        state.record(press(KeyCode::Left), t0);
        state.record(release(KeyCode::Left), t0);
        assert!(state.held_at(KeyCode::Left, t0 + Duration::from_millis(50)));

        state.expire(t0 + HOLD_TIMEOUT * 2);
        assert!(!state.held_at(KeyCode::Left, t0 + HOLD_TIMEOUT * 2));
    }

    #[test]
    fn release_events_end_holds_when_honored() {
        let mut state = InputState::new();
        state.honor_release = true;
        let t0 = Instant::now();
        state.record(press(KeyCode::Char(' ')), t0);
        state.expire(t0 + HOLD_TIMEOUT * 4);
        assert!(state.held_at(KeyCode::Char(' '), t0 + HOLD_TIMEOUT * 4));

        state.record(release(KeyCode::Char(' ')), t0);
        assert!(!state.held_at(KeyCode::Char(' '), t0));
    }

    #[test]
    fn snapshot_maps_keys_to_actions() {
        let mut inp = input();
        inp.keys.honor_release = true;
        let now = Instant::now();
        for code in [KeyCode::Char('d'), KeyCode::Char(' '), KeyCode::Char('j'), KeyCode::Enter] {
            inp.keys.record(press(code), now);
        }
        inp.latch();

        let snap = inp.snapshot();
        assert!(snap.digital_right);
        assert!(!snap.digital_left);
        assert!(snap.jump);
        assert!(snap.attack);
        assert!(snap.continue_pressed);
        assert_eq!(inp.meta(), MetaInput::default());
    }

    #[test]
    fn presses_survive_until_the_next_snapshot() {
        let mut inp = input();
        inp.keys.record(press(KeyCode::Char('x')), Instant::now());
        inp.latch();
        // A later poll with no new events must not drop the press
        inp.keys.fresh_presses.clear();
        inp.latch();

        assert!(inp.snapshot().attack);
        assert!(!inp.snapshot().attack);
    }

    #[test]
    fn escape_and_ctrl_c_quit() {
        let mut inp = input();
        inp.keys.record(press(KeyCode::Esc), Instant::now());
        assert!(inp.meta().quit);

        let mut inp = input();
        inp.keys.record(
            KeyEvent::new_with_kind(KeyCode::Char('c'), KeyModifiers::CONTROL, KeyEventKind::Press),
            Instant::now(),
        );
        assert!(inp.meta().quit);
    }
}
