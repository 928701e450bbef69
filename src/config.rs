use crate::game::error::GameError;
use crate::game::pitch::{KeyboardRange, Pitch};
use configparser::ini::Ini;
use log::warn;
use std::path::Path;

// Gameplay Defaults
pub const DEFAULT_NOTE_FALLING_SPEED: f32 = 140.0; // px/s
pub const DEFAULT_NOTE_MISS_TIME_LIMIT: f32 = 0.5; // s
pub const DEFAULT_NOTE_LATE_TIME_LIMIT: f32 = 0.1; // s
pub const DEFAULT_NOTE_EARLY_TRIGGER_LIMIT: f32 = 0.5; // s
pub const DEFAULT_NOTE_AREA_HEIGHT: f32 = 540.0; // px

/// Tunable engine settings for one round.
///
/// Every setter validates; the range checks are part of the engine's
/// contract, not incidental. Fields are private so a `Settings` can only
/// hold values that passed them.
#[derive(Debug, Clone)]
pub struct Settings {
    note_falling_speed: f32,
    note_miss_time_limit: f32,
    note_late_time_limit: f32,
    note_early_trigger_limit: f32,
    note_area_height: f32,
    key_range: KeyboardRange,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            note_falling_speed: DEFAULT_NOTE_FALLING_SPEED,
            note_miss_time_limit: DEFAULT_NOTE_MISS_TIME_LIMIT,
            note_late_time_limit: DEFAULT_NOTE_LATE_TIME_LIMIT,
            note_early_trigger_limit: DEFAULT_NOTE_EARLY_TRIGGER_LIMIT,
            note_area_height: DEFAULT_NOTE_AREA_HEIGHT,
            key_range: KeyboardRange::default(),
        }
    }
}

impl Settings {
    /// Falling speed of a note in pixels per second.
    pub fn note_falling_speed(&self) -> f32 {
        self.note_falling_speed
    }

    /// Seconds an already-passed note waits for input before it is missed.
    pub fn note_miss_time_limit(&self) -> f32 {
        self.note_miss_time_limit
    }

    /// Seconds of lateness past which a hit only earns the capped rating.
    pub fn note_late_time_limit(&self) -> f32 {
        self.note_late_time_limit
    }

    /// Seconds ahead of its start time that a note becomes triggerable.
    pub fn note_early_trigger_limit(&self) -> f32 {
        self.note_early_trigger_limit
    }

    /// Height of the visible note area in pixels.
    pub fn note_area_height(&self) -> f32 {
        self.note_area_height
    }

    pub fn key_range(&self) -> KeyboardRange {
        self.key_range
    }

    pub fn set_note_falling_speed(&mut self, value: f32) -> Result<(), GameError> {
        positive("note falling speed", value)?;
        self.note_falling_speed = value;
        Ok(())
    }

    pub fn set_note_miss_time_limit(&mut self, value: f32) -> Result<(), GameError> {
        positive("note miss time limit", value)?;
        self.note_miss_time_limit = value;
        Ok(())
    }

    pub fn set_note_late_time_limit(&mut self, value: f32) -> Result<(), GameError> {
        positive("note late time limit", value)?;
        self.note_late_time_limit = value;
        Ok(())
    }

    pub fn set_note_early_trigger_limit(&mut self, value: f32) -> Result<(), GameError> {
        positive("note early trigger limit", value)?;
        self.note_early_trigger_limit = value;
        Ok(())
    }

    pub fn set_note_area_height(&mut self, value: f32) -> Result<(), GameError> {
        positive("note area height", value)?;
        self.note_area_height = value;
        Ok(())
    }

    pub fn set_key_range(&mut self, start: Pitch, end: Pitch) -> Result<(), GameError> {
        self.key_range = KeyboardRange::new(start, end)?;
        Ok(())
    }

    /// Reads overrides from ini text. Missing keys keep their defaults;
    /// malformed or out-of-range values are logged and skipped so a bad
    /// settings file never takes the game down.
    pub fn from_ini_str(text: &str) -> Self {
        let mut settings = Settings::default();
        let mut conf = Ini::new();
        if conf.read(text.to_string()).is_err() {
            warn!("Failed to parse settings ini, using defaults.");
            return settings;
        }
        settings.apply(&conf);
        settings
    }

    /// Loads settings from an ini file, falling back to defaults when the
    /// file is absent or unreadable.
    pub fn load(path: &Path) -> Self {
        let mut settings = Settings::default();
        let mut conf = Ini::new();
        if conf.load(path).is_err() {
            warn!(
                "Failed to load '{}', using default settings.",
                path.display()
            );
            return settings;
        }
        settings.apply(&conf);
        settings
    }

    fn apply(&mut self, conf: &Ini) {
        if let Some(value) = read_float(conf, "gameplay", "falling_speed") {
            if let Err(e) = self.set_note_falling_speed(value) {
                warn!("Ignoring falling_speed: {}", e);
            }
        }
        if let Some(value) = read_float(conf, "gameplay", "miss_time_limit") {
            if let Err(e) = self.set_note_miss_time_limit(value) {
                warn!("Ignoring miss_time_limit: {}", e);
            }
        }
        if let Some(value) = read_float(conf, "gameplay", "late_time_limit") {
            if let Err(e) = self.set_note_late_time_limit(value) {
                warn!("Ignoring late_time_limit: {}", e);
            }
        }
        if let Some(value) = read_float(conf, "gameplay", "early_trigger_limit") {
            if let Err(e) = self.set_note_early_trigger_limit(value) {
                warn!("Ignoring early_trigger_limit: {}", e);
            }
        }
        if let Some(value) = read_float(conf, "gameplay", "note_area_height") {
            if let Err(e) = self.set_note_area_height(value) {
                warn!("Ignoring note_area_height: {}", e);
            }
        }

        let start = read_pitch(conf, "keyboard", "range_start");
        let end = read_pitch(conf, "keyboard", "range_end");
        if let (Some(start), Some(end)) = (start, end) {
            if let Err(e) = self.set_key_range(start, end) {
                warn!("Ignoring keyboard range {}..{}: {}", start, end, e);
            }
        }
    }
}

fn positive(name: &str, value: f32) -> Result<(), GameError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(GameError::range(format!(
            "cannot set {} to {}; it must be greater than 0",
            name, value
        )))
    }
}

fn read_float(conf: &Ini, section: &str, key: &str) -> Option<f32> {
    conf.get(section, key).and_then(|v| v.parse::<f32>().ok())
}

fn read_pitch(conf: &Ini, section: &str, key: &str) -> Option<Pitch> {
    conf.get(section, key).and_then(|v| v.parse::<Pitch>().ok())
}
