//! Command line interpretation.
//!
//! Maps one received line to the effects it asks for. Parsing never touches
//! game state; the session applies the returned [`Effect`]s.
//!
//! | line                          | effect                      |
//! |-------------------------------|-----------------------------|
//! | `CMD:START`, `S`              | [`Effect::StartGame`]       |
//! | `CMD:PAUSE`, `P`              | [`Effect::PauseToggle`]     |
//! | `CMD:RESET`, `R`              | [`Effect::Reset`]           |
//! | `CMD:SHOT:<x>,<y>`            | [`Effect::Shot`]            |
//! | `CMD:STORM_UPDATE:<dx>,<dy>`  | [`Effect::AdjustDisturbance`] |
//! | `STATUS`                      | [`Effect::Status`]          |
//! | `HELLO`                       | [`Effect::Hello`]           |
//! | anything else                 | [`Effect::Unknown`]         |

use heapless::Vec;

use crate::serial::Line;

/// What a command line asks the game to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    StartGame,
    PauseToggle,
    Reset,
    /// Resolve a shot at field coordinates.
    Shot { x: u16, y: u16 },
    /// Nudge the storm amplitudes by a signed delta.
    AdjustDisturbance { dx: i16, dy: i16 },
    /// Report score, hits, shots, accuracy and time.
    Status,
    /// Connection greeting from the display host.
    Hello,
    /// A numeric field had no digits and was read as zero. Logged only.
    Malformed { line: Line },
    /// Unrecognised line. Logged only.
    Unknown { line: Line },
}

/// Effects of a single line. A malformed numeric command yields its
/// diagnostic first, then the command itself.
pub type Effects = Vec<Effect, 2>;

const START: &[u8] = b"CMD:START";
const PAUSE: &[u8] = b"CMD:PAUSE";
const RESET: &[u8] = b"CMD:RESET";
const SHOT: &[u8] = b"CMD:SHOT:";
const STORM_UPDATE: &[u8] = b"CMD:STORM_UPDATE:";

/// Interpret one command line.
pub fn interpret(line: &[u8]) -> Effects {
    let mut effects = Effects::new();
    let mut add = |effect| {
        // Two slots, at most two effects per line.
        let _ = effects.push(effect);
    };

    if let Some(args) = line.strip_prefix(SHOT) {
        let (x, y, clean) = pair(args);
        if !clean {
            add(Effect::Malformed { line: copy(line) });
        }
        add(Effect::Shot {
            x: saturate_u16(x),
            y: saturate_u16(y),
        });
    } else if let Some(args) = line.strip_prefix(STORM_UPDATE) {
        let (dx, dy, clean) = pair(args);
        if !clean {
            add(Effect::Malformed { line: copy(line) });
        }
        add(Effect::AdjustDisturbance {
            dx: saturate_i16(dx),
            dy: saturate_i16(dy),
        });
    } else if line.starts_with(START) || line == b"S" {
        add(Effect::StartGame);
    } else if line.starts_with(PAUSE) || line == b"P" {
        add(Effect::PauseToggle);
    } else if line.starts_with(RESET) || line == b"R" {
        add(Effect::Reset);
    } else if line == b"STATUS" {
        add(Effect::Status);
    } else if line == b"HELLO" {
        add(Effect::Hello);
    } else {
        add(Effect::Unknown { line: copy(line) });
    }

    effects
}

/// `a,b` → both values and whether each had at least one digit.
fn pair(args: &[u8]) -> (i32, i32, bool) {
    let mut fields = args.splitn(2, |&b| b == b',');
    let (a, a_ok) = decimal(fields.next().unwrap_or_default());
    let (b, b_ok) = decimal(fields.next().unwrap_or_default());
    (a, b, a_ok && b_ok)
}

/// Leading-digits decimal parse in the manner of C `atoi`: optional spaces,
/// optional sign, then digits up to the first non-digit. Saturates instead of
/// overflowing.
fn decimal(field: &[u8]) -> (i32, bool) {
    let mut rest = field;
    while let [b' ', tail @ ..] = rest {
        rest = tail;
    }
    let negative = match rest {
        [b'-', tail @ ..] => {
            rest = tail;
            true
        }
        [b'+', tail @ ..] => {
            rest = tail;
            false
        }
        _ => false,
    };

    let mut value: i32 = 0;
    let mut digits = 0;
    for &b in rest {
        if !b.is_ascii_digit() {
            break;
        }
        let d = i32::from(b - b'0');
        value = value.saturating_mul(10).saturating_add(d);
        digits += 1;
    }

    let value = if negative { value.saturating_neg() } else { value };
    (value, digits > 0)
}

fn saturate_u16(v: i32) -> u16 {
    v.clamp(0, i32::from(u16::MAX)) as u16
}

fn saturate_i16(v: i32) -> i16 {
    v.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

fn copy(line: &[u8]) -> Line {
    // Lines come from the decoder and always fit; anything longer is cut.
    let mut out = Line::new();
    let _ = out.extend_from_slice(&line[..line.len().min(out.capacity())]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one(line: &[u8]) -> Effect {
        let effects = interpret(line);
        assert_eq!(effects.len(), 1, "{effects:?}");
        effects[0].clone()
    }

    #[test]
    fn fixed_commands() {
        assert_eq!(one(b"CMD:START"), Effect::StartGame);
        assert_eq!(one(b"CMD:PAUSE"), Effect::PauseToggle);
        assert_eq!(one(b"CMD:RESET"), Effect::Reset);
        assert_eq!(one(b"STATUS"), Effect::Status);
        assert_eq!(one(b"HELLO"), Effect::Hello);
    }

    #[test]
    fn short_aliases() {
        assert_eq!(one(b"S"), Effect::StartGame);
        assert_eq!(one(b"P"), Effect::PauseToggle);
        assert_eq!(one(b"R"), Effect::Reset);
    }

    #[test]
    fn prefix_match_ignores_trailing_text() {
        assert_eq!(one(b"CMD:START now"), Effect::StartGame);
    }

    #[test]
    fn shot_coordinates() {
        assert_eq!(one(b"CMD:SHOT:400,300"), Effect::Shot { x: 400, y: 300 });
        assert_eq!(one(b"CMD:SHOT:7,0"), Effect::Shot { x: 7, y: 0 });
    }

    #[test]
    fn shot_saturates_to_field_type() {
        assert_eq!(one(b"CMD:SHOT:-5,99999"), Effect::Shot { x: 0, y: u16::MAX });
    }

    #[test]
    fn storm_update_takes_signed_deltas() {
        assert_eq!(
            one(b"CMD:STORM_UPDATE:-3,12"),
            Effect::AdjustDisturbance { dx: -3, dy: 12 }
        );
    }

    #[test]
    fn trailing_garbage_after_digits_is_tolerated() {
        assert_eq!(one(b"CMD:SHOT:12px,34px"), Effect::Shot { x: 12, y: 34 });
    }

    #[test]
    fn malformed_numbers_read_as_zero_with_diagnostic() {
        let effects = interpret(b"CMD:SHOT:abc,5");
        assert_eq!(effects.len(), 2);
        assert!(matches!(effects[0], Effect::Malformed { .. }));
        assert_eq!(effects[1], Effect::Shot { x: 0, y: 5 });

        let effects = interpret(b"CMD:STORM_UPDATE:4");
        assert!(matches!(effects[0], Effect::Malformed { .. }));
        assert_eq!(effects[1], Effect::AdjustDisturbance { dx: 4, dy: 0 });
    }

    #[test]
    fn unknown_lines_keep_their_text() {
        match one(b"FIRE!") {
            Effect::Unknown { line } => assert_eq!(line.as_slice(), b"FIRE!"),
            other => panic!("unexpected {other:?}"),
        }
        // Case sensitive.
        assert!(matches!(one(b"cmd:start"), Effect::Unknown { .. }));
    }
}
