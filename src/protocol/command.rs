//! Outbound command tokens and their textual wire form.

use std::fmt;
use std::str::FromStr;

/// Direction of a discrete pointer move (`MML`/`MMR`/`MMU`/`MMD`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    fn suffix(self) -> char {
        match self {
            Direction::Left => 'L',
            Direction::Right => 'R',
            Direction::Up => 'U',
            Direction::Down => 'D',
        }
    }

    fn from_suffix(c: &str) -> Option<Self> {
        match c {
            "L" => Some(Direction::Left),
            "R" => Some(Direction::Right),
            "U" => Some(Direction::Up),
            "D" => Some(Direction::Down),
            _ => None,
        }
    }

    /// Keyboard code of the matching cursor key (used by sensor cursor mode).
    pub fn cursor_key_code(self) -> u32 {
        match self {
            Direction::Left => 37,
            Direction::Up => 38,
            Direction::Right => 39,
            Direction::Down => 40,
        }
    }
}

/// A single outbound protocol message.
///
/// `Display` renders the exact text that goes on the wire (before the cipher
/// is applied); `FromStr` parses it back.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    /// `KBP<code>`
    KeyPress(u32),
    /// `KBR<code>`
    KeyRelease(u32),
    /// `XMM<n>` relative horizontal move
    MoveX(i32),
    /// `YMM<n>` relative vertical move
    MoveY(i32),
    /// `MLC`
    LeftPress,
    /// `MLR`
    LeftRelease,
    /// `MRC`
    RightPress,
    /// `MRR`
    RightRelease,
    /// `MML`/`MMR`/`MMU`/`MMD`
    PointerStart(Direction),
    /// `MSL`/`MSR`/`MSU`/`MSD`
    PointerStop(Direction),
    /// `MWU`
    WheelUp,
    /// `MWD`
    WheelDown,
    /// `MWS<n>`
    WheelStep(i32),
    /// `MPZ<n>`
    PinchZoom(i32),
    /// `MZR`
    ZoomReset,
    /// `MMC`
    CenterMouse,
    /// `LNG<index>`
    Language(u32),
    /// `ping`
    Ping,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::KeyPress(code) => write!(f, "KBP{code}"),
            Command::KeyRelease(code) => write!(f, "KBR{code}"),
            Command::MoveX(n) => write!(f, "XMM{n}"),
            Command::MoveY(n) => write!(f, "YMM{n}"),
            Command::LeftPress => f.write_str("MLC"),
            Command::LeftRelease => f.write_str("MLR"),
            Command::RightPress => f.write_str("MRC"),
            Command::RightRelease => f.write_str("MRR"),
            Command::PointerStart(dir) => write!(f, "MM{}", dir.suffix()),
            Command::PointerStop(dir) => write!(f, "MS{}", dir.suffix()),
            Command::WheelUp => f.write_str("MWU"),
            Command::WheelDown => f.write_str("MWD"),
            Command::WheelStep(n) => write!(f, "MWS{n}"),
            Command::PinchZoom(n) => write!(f, "MPZ{n}"),
            Command::ZoomReset => f.write_str("MZR"),
            Command::CenterMouse => f.write_str("MMC"),
            Command::Language(index) => write!(f, "LNG{index}"),
            Command::Ping => f.write_str("ping"),
        }
    }
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let fixed = match s {
            "MLC" => Some(Command::LeftPress),
            "MLR" => Some(Command::LeftRelease),
            "MRC" => Some(Command::RightPress),
            "MRR" => Some(Command::RightRelease),
            "MWU" => Some(Command::WheelUp),
            "MWD" => Some(Command::WheelDown),
            "MZR" => Some(Command::ZoomReset),
            "MMC" => Some(Command::CenterMouse),
            "ping" => Some(Command::Ping),
            _ => None,
        };
        if let Some(command) = fixed {
            return Ok(command);
        }

        if s.len() < 3 || !s.is_char_boundary(3) {
            return Err(format!("Unknown command: {s}"));
        }
        let (prefix, arg) = s.split_at(3);

        let signed = || {
            arg.parse::<i32>()
                .map_err(|e| format!("Invalid argument in '{s}': {e}"))
        };
        let unsigned = || {
            arg.parse::<u32>()
                .map_err(|e| format!("Invalid argument in '{s}': {e}"))
        };

        match prefix {
            "KBP" => unsigned().map(Command::KeyPress),
            "KBR" => unsigned().map(Command::KeyRelease),
            "XMM" => signed().map(Command::MoveX),
            "YMM" => signed().map(Command::MoveY),
            "MWS" => signed().map(Command::WheelStep),
            "MPZ" => signed().map(Command::PinchZoom),
            "LNG" => unsigned().map(Command::Language),
            _ => {
                let (head, tail) = (s.get(..2), s.get(2..));
                match (head, tail.and_then(Direction::from_suffix)) {
                    (Some("MM"), Some(dir)) => Ok(Command::PointerStart(dir)),
                    (Some("MS"), Some(dir)) => Ok(Command::PointerStop(dir)),
                    _ => Err(format!("Unknown command: {s}")),
                }
            }
        }
    }
}
