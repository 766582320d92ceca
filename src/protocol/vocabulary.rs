//! Logical key identifiers and their press/release commands.
//!
//! Every key that can be bound to a grid cell is listed exactly once in
//! [`KEY_TABLE`]. Press codes, release codes and display labels are all
//! derived from that one table.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::command::{Command, Direction};

/// Logical key that can be bound to a keypad cell.
///
/// Names are written in snake_case in the configuration file, e.g.
/// `keys = ["escape", "left_ctrl", "cursor_up", "char_a"]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    // Function keys
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,

    // Modifiers and editing
    LeftCtrl,
    Delete,
    LeftShift,
    LeftAlt,
    Insert,

    // Letters
    CharA,
    CharB,
    CharC,
    CharD,
    CharE,
    CharF,
    CharG,
    CharH,
    CharI,
    CharJ,
    CharK,
    CharL,
    CharM,
    CharN,
    CharO,
    CharP,
    CharQ,
    CharR,
    CharS,
    CharT,
    CharU,
    CharV,
    CharW,
    CharX,
    CharY,
    CharZ,

    // Digits
    Digit0,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,

    // Punctuation
    Semicolon,
    Backslash,
    At,
    Slash,
    Colon,
    Equals,
    Question,
    Plus,
    Minus,
    Comma,
    Period,

    // Whitespace and navigation
    Escape,
    Space,
    Return,
    Tab,
    Backspace,
    PageUp,
    PageDown,
    Home,
    End,
    CursorUp,
    CursorDown,
    CursorLeft,
    CursorRight,

    // Numeric keypad
    Keypad0,
    Keypad1,
    Keypad2,
    Keypad3,
    Keypad4,
    Keypad5,
    Keypad6,
    Keypad7,
    Keypad8,
    Keypad9,

    // Mouse
    MouseLeft,
    MouseRight,
    MouseUp,
    MouseDown,
    MouseClick,
    MouseRightClick,
    WheelUp,
    WheelDown,
    ZoomIn,
    ZoomOut,
    ZoomReset,

    // Compass directions (game pads)
    North,
    South,
    West,
    East,
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,

    /// Unassigned cell; never sends anything.
    Dummy,
}

/// What a key sends on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Keyboard key: `KBP<code>` / `KBR<code>`
    Key(u32),
    /// Held pointer move: `MM?` / `MS?`
    Pointer(Direction),
    LeftButton,
    RightButton,
    /// One-shot commands without a release
    WheelUp,
    WheelDown,
    ZoomIn,
    ZoomOut,
    ZoomReset,
    Nop,
}

/// One row of the vocabulary table.
#[derive(Debug, Clone, Copy)]
pub struct KeyEntry {
    pub action: KeyAction,
    pub label: &'static str,
    pub binding: Binding,
}

const fn key(action: KeyAction, label: &'static str, code: u32) -> KeyEntry {
    KeyEntry {
        action,
        label,
        binding: Binding::Key(code),
    }
}

const fn other(action: KeyAction, label: &'static str, binding: Binding) -> KeyEntry {
    KeyEntry {
        action,
        label,
        binding,
    }
}

use KeyAction as A;

/// The complete key vocabulary.
pub const KEY_TABLE: &[KeyEntry] = &[
    key(A::F1, "F1", 1101),
    key(A::F2, "F2", 1102),
    key(A::F3, "F3", 1103),
    key(A::F4, "F4", 1104),
    key(A::F5, "F5", 1105),
    key(A::F6, "F6", 1106),
    key(A::F7, "F7", 1107),
    key(A::F8, "F8", 1108),
    key(A::F9, "F9", 1109),
    key(A::F10, "F10", 1110),
    key(A::F11, "F11", 1111),
    key(A::F12, "F12", 1112),
    key(A::LeftCtrl, "Ctrl", 1200),
    key(A::Delete, "Del", 1201),
    key(A::LeftShift, "Shift", 1202),
    key(A::LeftAlt, "Alt", 1203),
    key(A::Insert, "Ins", 1204),
    key(A::CharA, "a", 97),
    key(A::CharB, "b", 98),
    key(A::CharC, "c", 99),
    key(A::CharD, "d", 100),
    key(A::CharE, "e", 101),
    key(A::CharF, "f", 102),
    key(A::CharG, "g", 103),
    key(A::CharH, "h", 104),
    key(A::CharI, "i", 105),
    key(A::CharJ, "j", 106),
    key(A::CharK, "k", 107),
    key(A::CharL, "l", 108),
    key(A::CharM, "m", 109),
    key(A::CharN, "n", 110),
    key(A::CharO, "o", 111),
    key(A::CharP, "p", 112),
    key(A::CharQ, "q", 113),
    key(A::CharR, "r", 114),
    key(A::CharS, "s", 115),
    key(A::CharT, "t", 116),
    key(A::CharU, "u", 117),
    key(A::CharV, "v", 118),
    key(A::CharW, "w", 119),
    key(A::CharX, "x", 120),
    key(A::CharY, "y", 121),
    key(A::CharZ, "z", 122),
    key(A::Digit0, "0", 48),
    key(A::Digit1, "1", 49),
    key(A::Digit2, "2", 50),
    key(A::Digit3, "3", 51),
    key(A::Digit4, "4", 52),
    key(A::Digit5, "5", 53),
    key(A::Digit6, "6", 54),
    key(A::Digit7, "7", 55),
    key(A::Digit8, "8", 56),
    key(A::Digit9, "9", 57),
    key(A::Semicolon, ";", 59),
    key(A::Backslash, "\\", 1213),
    key(A::At, "@", 1212),
    key(A::Slash, "/", 47),
    key(A::Colon, ":", 58),
    key(A::Equals, "=", 1218),
    key(A::Question, "?", 63),
    key(A::Plus, "+", 1205),
    key(A::Minus, "-", 1206),
    key(A::Comma, ",", 1215),
    key(A::Period, ".", 1216),
    key(A::Escape, "ESC", 27),
    key(A::Space, "Space", 32),
    key(A::Return, "Return", 10),
    key(A::Tab, "Tab", 1207),
    key(A::Backspace, "Back", 1208),
    key(A::PageUp, "PgUp", 1209),
    key(A::PageDown, "PgDn", 1210),
    key(A::Home, "Home", 1219),
    key(A::End, "End", 1217),
    key(A::CursorUp, "Up", 38),
    key(A::CursorDown, "Down", 40),
    key(A::CursorLeft, "Left", 37),
    key(A::CursorRight, "Right", 39),
    key(A::Keypad0, "NUM 0", 1015),
    key(A::Keypad1, "NUM 1", 1016),
    key(A::Keypad2, "NUM 2", 1017),
    key(A::Keypad3, "NUM 3", 1018),
    key(A::Keypad4, "NUM 4", 1019),
    key(A::Keypad5, "NUM 5", 1020),
    key(A::Keypad6, "NUM 6", 1021),
    key(A::Keypad7, "NUM 7", 1022),
    key(A::Keypad8, "NUM 8", 1023),
    key(A::Keypad9, "NUM 9", 1024),
    other(A::MouseLeft, "M-Left", Binding::Pointer(Direction::Left)),
    other(A::MouseRight, "M-Right", Binding::Pointer(Direction::Right)),
    other(A::MouseUp, "M-Up", Binding::Pointer(Direction::Up)),
    other(A::MouseDown, "M-Down", Binding::Pointer(Direction::Down)),
    other(A::MouseClick, "M-LClick", Binding::LeftButton),
    other(A::MouseRightClick, "M-RClick", Binding::RightButton),
    other(A::WheelUp, "Wheel up", Binding::WheelUp),
    other(A::WheelDown, "Wheel down", Binding::WheelDown),
    other(A::ZoomIn, "Zoom in", Binding::ZoomIn),
    other(A::ZoomOut, "Zoom out", Binding::ZoomOut),
    other(A::ZoomReset, "Zoom Reset", Binding::ZoomReset),
    key(A::North, "(N)", 1300),
    key(A::South, "(S)", 1301),
    key(A::West, "(W)", 1302),
    key(A::East, "(E)", 1303),
    key(A::NorthWest, "(NW)", 1304),
    key(A::NorthEast, "(NE)", 1305),
    key(A::SouthWest, "(SW)", 1306),
    key(A::SouthEast, "(SE)", 1307),
    other(A::Dummy, "NOP", Binding::Nop),
];

const DUMMY_ENTRY: KeyEntry = other(A::Dummy, "NOP", Binding::Nop);

impl KeyAction {
    /// Iterates every key in vocabulary order.
    pub fn all() -> impl Iterator<Item = KeyAction> {
        KEY_TABLE.iter().map(|entry| entry.action)
    }

    /// Returns this key's vocabulary row.
    pub fn entry(self) -> &'static KeyEntry {
        match KEY_TABLE.iter().find(|entry| entry.action == self) {
            Some(entry) => entry,
            None => {
                debug_assert!(false, "{self:?} missing from KEY_TABLE");
                &DUMMY_ENTRY
            }
        }
    }

    /// Human-readable label shown on the key.
    pub fn label(self) -> &'static str {
        self.entry().label
    }

    /// Command sent when the key goes down, if any.
    pub fn press(self) -> Option<Command> {
        match self.entry().binding {
            Binding::Key(code) => Some(Command::KeyPress(code)),
            Binding::Pointer(dir) => Some(Command::PointerStart(dir)),
            Binding::LeftButton => Some(Command::LeftPress),
            Binding::RightButton => Some(Command::RightPress),
            Binding::WheelUp => Some(Command::WheelUp),
            Binding::WheelDown => Some(Command::WheelDown),
            Binding::ZoomIn => Some(Command::PinchZoom(1)),
            Binding::ZoomOut => Some(Command::PinchZoom(-1)),
            Binding::ZoomReset => Some(Command::ZoomReset),
            Binding::Nop => None,
        }
    }

    /// Command sent when the key goes up, if any.
    ///
    /// Wheel and zoom keys are one-shot and have no release.
    pub fn release(self) -> Option<Command> {
        match self.entry().binding {
            Binding::Key(code) => Some(Command::KeyRelease(code)),
            Binding::Pointer(dir) => Some(Command::PointerStop(dir)),
            Binding::LeftButton => Some(Command::LeftRelease),
            Binding::RightButton => Some(Command::RightRelease),
            Binding::WheelUp
            | Binding::WheelDown
            | Binding::ZoomIn
            | Binding::ZoomOut
            | Binding::ZoomReset
            | Binding::Nop => None,
        }
    }

    /// Snake-case name as written in the configuration file.
    pub fn config_name(self) -> String {
        serde_json::to_value(self)
            .ok()
            .and_then(|value| value.as_str().map(str::to_string))
            .unwrap_or_else(|| format!("{self:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn table_has_no_duplicate_actions() {
        let mut seen = HashSet::new();
        for entry in KEY_TABLE {
            assert!(seen.insert(entry.action), "{:?} listed twice", entry.action);
        }
    }

    #[test]
    fn keyboard_keys_press_and_release_with_same_code() {
        assert_eq!(KeyAction::CursorLeft.press(), Some(Command::KeyPress(37)));
        assert_eq!(KeyAction::CursorLeft.release(), Some(Command::KeyRelease(37)));
        assert_eq!(KeyAction::F12.press().unwrap().to_string(), "KBP1112");
        assert_eq!(KeyAction::CharA.release().unwrap().to_string(), "KBR97");
    }

    #[test]
    fn mouse_keys_use_mouse_commands() {
        assert_eq!(KeyAction::MouseClick.press().unwrap().to_string(), "MLC");
        assert_eq!(KeyAction::MouseClick.release().unwrap().to_string(), "MLR");
        assert_eq!(KeyAction::MouseRightClick.release().unwrap().to_string(), "MRR");
        assert_eq!(KeyAction::MouseUp.press().unwrap().to_string(), "MMU");
        assert_eq!(KeyAction::MouseUp.release().unwrap().to_string(), "MSU");
    }

    #[test]
    fn one_shot_keys_have_no_release() {
        for action in [
            KeyAction::WheelUp,
            KeyAction::WheelDown,
            KeyAction::ZoomIn,
            KeyAction::ZoomOut,
            KeyAction::ZoomReset,
        ] {
            assert!(action.press().is_some());
            assert_eq!(action.release(), None, "{action:?}");
        }
        assert_eq!(KeyAction::ZoomOut.press().unwrap().to_string(), "MPZ-1");
    }

    #[test]
    fn dummy_sends_nothing() {
        assert_eq!(KeyAction::Dummy.press(), None);
        assert_eq!(KeyAction::Dummy.release(), None);
        assert_eq!(KeyAction::Dummy.label(), "NOP");
    }

    #[test]
    fn config_names_round_trip_through_serde() {
        assert_eq!(KeyAction::CursorUp.config_name(), "cursor_up");
        assert_eq!(KeyAction::Digit7.config_name(), "digit7");
        let parsed: KeyAction = serde_json::from_str("\"mouse_right_click\"").unwrap();
        assert_eq!(parsed, KeyAction::MouseRightClick);
    }
}
