use crate::game::pitch::Pitch;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteRating {
    NotRatedYet,
    Missed,
    Bad,
    Good,
    Great,
    Perfect,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NoteKind {
    Tap,
    Hold,
}

/// Sentinel on `press_starts_at`: the note aged out without any input.
pub const MISSED_PRESS: f32 = -1.0;
/// Sentinel on `press_ends_at`: tap note, or hold not yet released.
pub const NO_RELEASE: f32 = 0.0;

/// One note of a sheet, in its compact wire form. Times are seconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SheetNote {
    /// MIDI note number.
    #[serde(rename = "n")]
    pub pitch: Pitch,
    /// Seconds from the start of the song.
    #[serde(rename = "t")]
    pub start: f32,
    /// Seconds the note sounds for.
    #[serde(rename = "d")]
    pub duration: f32,
    /// Present on notes that must be held rather than tapped.
    #[serde(rename = "p", default, skip_serializing_if = "Option::is_none")]
    pub fully_play_time: Option<f32>,
    /// Suggested physical key, for chart authoring tools.
    #[serde(rename = "k", default, skip_serializing_if = "Option::is_none")]
    pub suggested_key: Option<char>,
}

impl SheetNote {
    /// Tap or hold semantics, fixed at load time by `fully_play_time`.
    pub fn kind(&self) -> NoteKind {
        if self.fully_play_time.is_some() {
            NoteKind::Hold
        } else {
            NoteKind::Tap
        }
    }

    pub fn end(&self) -> f32 {
        self.start + self.duration
    }
}

/// A sheet note plus its mutable play state for the current round.
#[derive(Clone, Debug, PartialEq)]
pub struct GameNote {
    pub sheet: SheetNote,
    /// False until the note leaves the playable window by hit or miss.
    /// Monotonic; never reset within a round.
    pub is_triggered: bool,
    pub press_starts_at: f32,
    pub press_ends_at: f32,
    pub rating: NoteRating,
}

impl GameNote {
    fn new(sheet: SheetNote) -> Self {
        Self {
            sheet,
            is_triggered: false,
            press_starts_at: 0.0,
            press_ends_at: NO_RELEASE,
            rating: NoteRating::NotRatedYet,
        }
    }

    /// `rating` is `NotRatedYet` exactly while the note is untriggered.
    pub fn rating_state_consistent(&self) -> bool {
        self.is_triggered == (self.rating != NoteRating::NotRatedYet)
    }
}

/// The ordered note sequence of one round.
///
/// Notes stay sorted ascending by start time; the scan relies on that
/// order for its single forward pass. `first_open` caches the index of
/// the first untriggered note and only ever moves forward, so a full
/// round costs one sweep over the sequence rather than one per tick.
#[derive(Debug, Clone)]
pub struct NoteTimeline {
    notes: Vec<GameNote>,
    first_open: usize,
}

impl NoteTimeline {
    /// Builds play state for an already-sorted sheet.
    pub fn new(sheet_notes: Vec<SheetNote>) -> Self {
        debug_assert!(sheet_notes.windows(2).all(|w| w[0].start <= w[1].start));
        Self {
            notes: sheet_notes.into_iter().map(GameNote::new).collect(),
            first_open: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Read-only view for renderers and the aggregator.
    pub fn notes(&self) -> &[GameNote] {
        &self.notes
    }

    pub fn note(&self, index: usize) -> &GameNote {
        &self.notes[index]
    }

    /// Mutation entry point, reserved for the judgment engine.
    pub(crate) fn note_mut(&mut self, index: usize) -> &mut GameNote {
        &mut self.notes[index]
    }

    /// Index of the first untriggered note, advancing the cached cursor
    /// past everything already resolved. `None` once the round is done.
    pub fn first_open(&mut self) -> Option<usize> {
        while self.first_open < self.notes.len() && self.notes[self.first_open].is_triggered {
            self.first_open += 1;
        }
        if self.first_open < self.notes.len() {
            Some(self.first_open)
        } else {
            None
        }
    }
}
