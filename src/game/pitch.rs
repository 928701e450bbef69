//! MIDI pitch domain: note names, key colors, octave folding, and the
//! physical key layout that maps a computer keyboard onto a piano range.

use crate::game::error::GameError;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// A MIDI note number. The playable domain is 21 (A0) through 108 (C8).
pub type Pitch = u8;

pub const PITCH_MIN: Pitch = 21;
pub const PITCH_MAX: Pitch = 108;

pub const DEFAULT_KEY_RANGE_START: Pitch = 57; // A3
pub const DEFAULT_KEY_RANGE_END: Pitch = 74; // D5

const SEMITONES_PER_OCTAVE: i32 = 12;

const PITCH_CLASS_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

// The two physical key rows. A black key borrows the slot above the
// white key it follows; slot 0 stays empty because a valid range never
// starts on a black key.
const WHITE_KEY_ROW: [char; 11] = ['a', 's', 'd', 'f', 'g', 'h', 'j', 'k', 'l', ';', '\''];
const BLACK_KEY_ROW: [char; 11] = [' ', 'w', 'e', 'r', 't', 'y', 'u', 'i', 'o', 'p', '['];

pub fn is_valid_pitch(pitch: u8) -> bool {
    (PITCH_MIN..=PITCH_MAX).contains(&pitch)
}

pub fn validate_pitch(pitch: u8) -> Result<Pitch, GameError> {
    if is_valid_pitch(pitch) {
        Ok(pitch)
    } else {
        Err(GameError::range(format!(
            "MIDI pitch {} outside playable range {}..={}",
            pitch, PITCH_MIN, PITCH_MAX
        )))
    }
}

/// Whether a pitch lands on a black key of a piano keyboard.
pub fn is_black_key(pitch: Pitch) -> bool {
    matches!(pitch % 12, 1 | 3 | 6 | 8 | 10)
}

/// "C4"-style name for a pitch (C4 = middle C = MIDI 60).
pub fn note_name(pitch: Pitch) -> String {
    let class = PITCH_CLASS_NAMES[(pitch % 12) as usize];
    let octave = (pitch / 12) as i32 - 1;
    format!("{}{}", class, octave)
}

/// Parses a "C4" / "A#3" style name back into a pitch.
pub fn parse_note_name(name: &str) -> Result<Pitch, GameError> {
    let (class_str, octave_str) = match name.len() {
        2 => name.split_at(1),
        3 => name.split_at(2),
        _ => {
            return Err(GameError::range(format!(
                "\"{}\" is not a note name",
                name
            )));
        }
    };

    let class = PITCH_CLASS_NAMES
        .iter()
        .position(|c| *c == class_str)
        .ok_or_else(|| GameError::range(format!("\"{}\" is not a note name", name)))?;
    let octave: i32 = octave_str
        .parse()
        .map_err(|_| GameError::range(format!("\"{}\" has no octave digit", name)))?;

    let value = (octave + 1) * SEMITONES_PER_OCTAVE + class as i32;
    if !(PITCH_MIN as i32..=PITCH_MAX as i32).contains(&value) {
        return Err(GameError::range(format!(
            "note \"{}\" resolves to pitch {} outside {}..={}",
            name, value, PITCH_MIN, PITCH_MAX
        )));
    }
    Ok(value as Pitch)
}

/// The lowest full C..B octave contained in `[lo, hi]`.
pub fn octave_window(lo: Pitch, hi: Pitch) -> Result<(Pitch, Pitch), GameError> {
    let mut c = lo;
    while c % 12 != 0 {
        c += 1;
    }
    if c + 11 <= hi {
        Ok((c, c + 11))
    } else {
        Err(GameError::range(format!(
            "keyboard range {}..{} does not contain a full C..B octave",
            note_name(lo),
            note_name(hi)
        )))
    }
}

/// Shifts `pitch` by whole octaves until it lands inside the window
/// `[window_lo, window_hi]` (12 consecutive semitones).
pub fn fold_into_window(pitch: Pitch, window_lo: Pitch, window_hi: Pitch) -> Pitch {
    debug_assert_eq!(window_lo + 11, window_hi);
    let offset = (pitch as i32 - window_lo as i32).rem_euclid(SEMITONES_PER_OCTAVE);
    (window_lo as i32 + offset) as Pitch
}

/// A validated keyboard pitch range together with its folding window.
///
/// Neither endpoint may be a black key, and the span must contain a full
/// C..B octave so that every pitch class has a home inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardRange {
    start: Pitch,
    end: Pitch,
    window: (Pitch, Pitch),
}

impl KeyboardRange {
    pub fn new(start: Pitch, end: Pitch) -> Result<Self, GameError> {
        validate_pitch(start)?;
        validate_pitch(end)?;
        if start >= end {
            return Err(GameError::range(format!(
                "keyboard range must start below its end ({} >= {})",
                start, end
            )));
        }
        if is_black_key(start) || is_black_key(end) {
            return Err(GameError::range(
                "keyboard range cannot start or end on a black key",
            ));
        }
        let window = octave_window(start, end)?;
        Ok(Self { start, end, window })
    }

    pub fn start(&self) -> Pitch {
        self.start
    }

    pub fn end(&self) -> Pitch {
        self.end
    }

    pub fn window(&self) -> (Pitch, Pitch) {
        self.window
    }

    pub fn contains(&self, pitch: Pitch) -> bool {
        (self.start..=self.end).contains(&pitch)
    }

    /// Folds an arbitrary pitch into the playable range: a pitch already
    /// inside `[start, end]` is untouched, anything else is transposed by
    /// whole octaves into the C..B window.
    pub fn fold(&self, pitch: Pitch) -> Pitch {
        if self.contains(pitch) {
            pitch
        } else {
            fold_into_window(pitch, self.window.0, self.window.1)
        }
    }
}

impl Default for KeyboardRange {
    fn default() -> Self {
        Self {
            start: DEFAULT_KEY_RANGE_START,
            end: DEFAULT_KEY_RANGE_END,
            window: (60, 71), // C4..B4
        }
    }
}

/// Maps physical keys to the pitches of a [`KeyboardRange`].
#[derive(Debug, Clone)]
pub struct KeyLayout {
    key_to_pitch: HashMap<char, Pitch>,
}

impl KeyLayout {
    /// Lays the range out over the two key rows, walking the range in
    /// pitch order: white keys consume the home row left to right, black
    /// keys take the slot above the white key they follow.
    pub fn for_range(range: &KeyboardRange) -> Result<Self, GameError> {
        let mut key_to_pitch = HashMap::new();
        let mut white_count = 0usize;
        for pitch in range.start()..=range.end() {
            if white_count >= WHITE_KEY_ROW.len() {
                return Err(GameError::range(format!(
                    "keyboard range {}..{} needs more than {} white keys",
                    note_name(range.start()),
                    note_name(range.end()),
                    WHITE_KEY_ROW.len()
                )));
            }
            if is_black_key(pitch) {
                key_to_pitch.insert(BLACK_KEY_ROW[white_count], pitch);
            } else {
                key_to_pitch.insert(WHITE_KEY_ROW[white_count], pitch);
                white_count += 1;
            }
        }
        Ok(Self { key_to_pitch })
    }

    pub fn pitch_for(&self, key: char) -> Option<Pitch> {
        self.key_to_pitch.get(&key).copied()
    }

    pub fn key_for(&self, pitch: Pitch) -> Option<char> {
        self.key_to_pitch
            .iter()
            .find(|(_, p)| **p == pitch)
            .map(|(k, _)| *k)
    }

    pub fn len(&self) -> usize {
        self.key_to_pitch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key_to_pitch.is_empty()
    }
}

/// Layout for the default A3..D5 range: 11 white keys plus 7 black keys.
pub static DEFAULT_KEY_LAYOUT: Lazy<KeyLayout> = Lazy::new(|| {
    KeyLayout::for_range(&KeyboardRange::default()).expect("default keyboard range fits the key rows")
});
