/// Gamepad input tracker using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Run left / right (stick is analog)
///   A                     →  Jump (held)
///   X / B                 →  Attack
///   Start                 →  Continue
///   Select                →  Quit
///
/// Without the `gamepad` feature the tracker compiles to a pad that is
/// never connected and reports nothing.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};
#[cfg(feature = "gamepad")]
use tracing::{debug, info, warn};

use crate::config::GamepadConfig;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    L2,      // LeftTrigger2
    R2,      // RightTrigger2
    Start,
    Select,
}

const BUTTON_COUNT: usize = 10;

/// Config names for each button; matching ignores case.
const BUTTON_NAMES: [(Btn, &[&str]); BUTTON_COUNT] = [
    (Btn::A, &["A", "SOUTH"]),
    (Btn::B, &["B", "EAST"]),
    (Btn::X, &["X", "WEST"]),
    (Btn::Y, &["Y", "NORTH"]),
    (Btn::L1, &["L1", "LB", "LEFTTRIGGER"]),
    (Btn::R1, &["R1", "RB", "RIGHTTRIGGER"]),
    (Btn::L2, &["L2", "LT", "LEFTTRIGGER2"]),
    (Btn::R2, &["R2", "RT", "RIGHTTRIGGER2"]),
    (Btn::Start, &["START"]),
    (Btn::Select, &["SELECT", "BACK"]),
];

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        let upper = s.trim().to_uppercase();
        BUTTON_NAMES
            .iter()
            .find(|(_, names)| names.contains(&upper.as_str()))
            .map(|&(btn, _)| btn)
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        let btn = match btn {
            Button::South => Btn::A,
            Button::East => Btn::B,
            Button::West => Btn::X,
            Button::North => Btn::Y,
            Button::LeftTrigger => Btn::L1,
            Button::RightTrigger => Btn::R1,
            Button::LeftTrigger2 => Btn::L2,
            Button::RightTrigger2 => Btn::R2,
            Button::Start => Btn::Start,
            Button::Select => Btn::Select,
            _ => return None,
        };
        Some(btn)
    }
}

/// Per-button state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

/// Action-to-button mapping (loaded from config).
#[derive(Clone, Debug, PartialEq)]
struct ActionMap {
    jump: Vec<Btn>,
    attack: Vec<Btn>,
    confirm: Vec<Btn>,
    cancel: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            jump:    vec![Btn::A],
            attack:  vec![Btn::X, Btn::B],
            confirm: vec![Btn::Start],
            cancel:  vec![Btn::Select],
        }
    }
}

impl ActionMap {
    /// Unknown names are skipped; an action left with no buttons keeps
    /// its default binding.
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse_list(names: &[String], fallback: Vec<Btn>) -> Vec<Btn> {
            let parsed: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
            if parsed.is_empty() { fallback } else { parsed }
        }
        let defaults = ActionMap::default();
        ActionMap {
            jump: parse_list(&cfg.jump, defaults.jump),
            attack: parse_list(&cfg.attack, defaults.attack),
            confirm: parse_list(&cfg.confirm, defaults.confirm),
            cancel: parse_list(&cfg.cancel, defaults.cancel),
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: [BtnState; BUTTON_COUNT],
    dpad_left: BtnState,
    dpad_right: BtnState,
    stick_x: f32,

    action_map: ActionMap,
    pub connected: bool,
}

fn btn_index(btn: Btn) -> usize {
    btn as usize
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                info!(connected = has_pad, "gamepad backend ready");
                (Some(g), has_pad)
            }
            Err(e) => {
                warn!(error = %e, "gamepad backend unavailable");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            buttons: [BtnState::default(); BUTTON_COUNT],
            dpad_left: BtnState::default(),
            dpad_right: BtnState::default(),
            stick_x: 0.0,
            action_map: ActionMap::default(),
            connected,
        }
    }

    /// Load button mapping from config.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        self.action_map = ActionMap::from_config(cfg);
    }

    pub fn update(&mut self) {
        self.clear_just_pressed();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(Axis::LeftStickX, value, _) => {
                    self.connected = true;
                    self.stick_x = value.clamp(-1.0, 1.0);
                }
                EventType::Connected => {
                    debug!(id = ?event.id, "gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    debug!(id = ?event.id, "gamepad disconnected");
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        // D-pad handled separately (not in Btn enum)
        let state = match gilrs_btn {
            Button::DPadLeft => &mut self.dpad_left,
            Button::DPadRight => &mut self.dpad_right,
            other => match Btn::from_gilrs(other) {
                Some(btn) => &mut self.buttons[btn_index(btn)],
                None => return,
            },
        };
        state.held = held;
        if held {
            state.just_pressed = true;
        }
    }

    // ── Action queries (config-driven) ──

    fn any_held(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[btn_index(b)].held)
    }

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[btn_index(b)].just_pressed)
    }

    pub fn jump_held(&self) -> bool {
        self.any_held(&self.action_map.jump)
    }
    pub fn attack_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.attack)
    }
    pub fn confirm_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.confirm)
    }
    pub fn cancel_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.cancel)
    }

    /// Analog left stick x in [-1, 1]. The dead zone is applied by
    /// the control resolver, not here.
    pub fn stick_x(&self) -> f32 {
        self.stick_x
    }
    pub fn left_held(&self) -> bool {
        self.dpad_left.held
    }
    pub fn right_held(&self) -> bool {
        self.dpad_right.held
    }

    // ── Internal ──

    fn clear_just_pressed(&mut self) {
        for b in &mut self.buttons { b.just_pressed = false; }
        self.dpad_left.just_pressed = false;
        self.dpad_right.just_pressed = false;
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        for b in &mut self.buttons { *b = BtnState::default(); }
        self.dpad_left = BtnState::default();
        self.dpad_right = BtnState::default();
        self.stick_x = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn button_names_accept_aliases() {
        assert_eq!(Btn::from_name("south"), Some(Btn::A));
        assert_eq!(Btn::from_name("RB"), Some(Btn::R1));
        assert_eq!(Btn::from_name("Back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("Turbo"), None);
    }

    #[test]
    fn unknown_names_keep_default_binding() {
        let cfg = GamepadConfig {
            jump: names(&["Turbo"]),
            attack: names(&["Y", "R2"]),
            confirm: vec![],
            cancel: names(&["Select"]),
        };
        let map = ActionMap::from_config(&cfg);
        assert_eq!(map.jump, vec![Btn::A]);
        assert_eq!(map.attack, vec![Btn::Y, Btn::R2]);
        assert_eq!(map.confirm, vec![Btn::Start]);
    }

    #[test]
    fn presses_are_edge_triggered() {
        let mut pad = GamepadState::new();
        pad.buttons[btn_index(Btn::X)] = BtnState { held: true, just_pressed: true };
        pad.buttons[btn_index(Btn::A)] = BtnState { held: true, just_pressed: true };
        assert!(pad.attack_pressed());
        assert!(pad.jump_held());

        pad.clear_just_pressed();
        assert!(!pad.attack_pressed());
        assert!(pad.jump_held());

        pad.release_all();
        assert!(!pad.jump_held());
    }
}
