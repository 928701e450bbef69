use crate::game::error::GameError;
use crate::game::note::SheetNote;
use crate::game::pitch;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const DEFAULT_BPM: f32 = 90.0;
pub const DEFAULT_TIME_SIGNATURE: (u8, u8) = (4, 4);

/// Wire form of a sheet, as produced by chart tooling. Reading it from
/// storage is the host's job; the engine only parses in-memory text.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SheetData {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm: Option<f32>,
    /// "4/4"-style string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_signature: Option<String>,
    pub notes: Vec<SheetNote>,
}

/// A validated, time-ordered song sheet.
///
/// Construction is the only place ordering is enforced; everything
/// downstream (the scan cursor, the display walk) relies on it.
#[derive(Clone, Debug)]
pub struct MusicSheet {
    pub name: String,
    pub bpm: f32,
    pub time_signature: (u8, u8),
    notes: Vec<SheetNote>,
}

impl MusicSheet {
    pub fn new(
        name: impl Into<String>,
        bpm: f32,
        time_signature: (u8, u8),
        mut notes: Vec<SheetNote>,
    ) -> Result<Self, GameError> {
        if !(bpm > 0.0) {
            return Err(GameError::range(format!("bpm {} must be greater than 0", bpm)));
        }
        for note in &notes {
            pitch::validate_pitch(note.pitch)?;
            if !(note.start >= 0.0) {
                return Err(GameError::range(format!(
                    "note {} starts at {}; start times cannot be negative",
                    pitch::note_name(note.pitch),
                    note.start
                )));
            }
            if !(note.duration > 0.0) {
                return Err(GameError::range(format!(
                    "note {} has duration {}; durations must be greater than 0",
                    pitch::note_name(note.pitch),
                    note.duration
                )));
            }
            if let Some(fully_play_time) = note.fully_play_time {
                if !(fully_play_time > 0.0) {
                    return Err(GameError::range(format!(
                        "note {} has fully-play time {}; it must be greater than 0",
                        pitch::note_name(note.pitch),
                        fully_play_time
                    )));
                }
            }
        }
        notes.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap_or(Ordering::Equal));
        Ok(Self {
            name: name.into(),
            bpm,
            time_signature,
            notes,
        })
    }

    /// Parses the JSON wire form, applying the usual chart defaults for
    /// absent bpm and time signature.
    pub fn from_json_str(text: &str) -> Result<Self, GameError> {
        let data: SheetData = serde_json::from_str(text)
            .map_err(|e| GameError::range(format!("sheet is not valid JSON: {}", e)))?;
        let time_signature = match data.time_signature.as_deref() {
            Some(raw) => parse_time_signature(raw)?,
            None => DEFAULT_TIME_SIGNATURE,
        };
        Self::new(
            data.name,
            data.bpm.unwrap_or(DEFAULT_BPM),
            time_signature,
            data.notes,
        )
    }

    pub fn notes(&self) -> &[SheetNote] {
        &self.notes
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    pub fn into_notes(self) -> Vec<SheetNote> {
        self.notes
    }
}

fn parse_time_signature(raw: &str) -> Result<(u8, u8), GameError> {
    let mut parts = raw.split('/');
    let beats = parts.next().and_then(|s| s.trim().parse::<u8>().ok());
    let unit = parts.next().and_then(|s| s.trim().parse::<u8>().ok());
    match (beats, unit, parts.next()) {
        (Some(beats), Some(unit), None) if beats > 0 && unit > 0 => Ok((beats, unit)),
        _ => Err(GameError::range(format!(
            "\"{}\" is not a time signature",
            raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_compact_wire_form() {
        let sheet = MusicSheet::from_json_str(
            r#"{
                "name": "scale study",
                "bpm": 120,
                "time_signature": "3/4",
                "notes": [
                    {"n": 64, "t": 1.0, "d": 0.5},
                    {"n": 60, "t": 0.0, "d": 0.5, "p": 0.5, "k": "d"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(sheet.name, "scale study");
        assert_eq!(sheet.bpm, 120.0);
        assert_eq!(sheet.time_signature, (3, 4));
        // Sorted by start time regardless of wire order.
        assert_eq!(sheet.notes()[0].pitch, 60);
        assert_eq!(sheet.notes()[0].fully_play_time, Some(0.5));
        assert_eq!(sheet.notes()[0].suggested_key, Some('d'));
        assert_eq!(sheet.notes()[1].pitch, 64);
    }

    #[test]
    fn absent_bpm_and_signature_get_defaults() {
        let sheet =
            MusicSheet::from_json_str(r#"{"name": "", "notes": [{"n": 60, "t": 0, "d": 1}]}"#)
                .unwrap();
        assert_eq!(sheet.bpm, DEFAULT_BPM);
        assert_eq!(sheet.time_signature, DEFAULT_TIME_SIGNATURE);
    }

    #[test]
    fn rejects_out_of_range_notes() {
        let bad_pitch = r#"{"name": "", "notes": [{"n": 12, "t": 0, "d": 1}]}"#;
        assert!(MusicSheet::from_json_str(bad_pitch).is_err());

        let bad_duration = r#"{"name": "", "notes": [{"n": 60, "t": 0, "d": 0}]}"#;
        assert!(MusicSheet::from_json_str(bad_duration).is_err());

        let bad_start = r#"{"name": "", "notes": [{"n": 60, "t": -1, "d": 1}]}"#;
        assert!(MusicSheet::from_json_str(bad_start).is_err());
    }

    #[test]
    fn rejects_malformed_time_signatures() {
        for raw in ["", "4", "4/0", "4/4/4", "x/y"] {
            assert!(parse_time_signature(raw).is_err(), "accepted {:?}", raw);
        }
    }
}
