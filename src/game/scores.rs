use crate::game::judgment;
use crate::game::note::{GameNote, NoteRating};
use std::collections::HashMap;

/// Summary of a finished round: one point-sum plus per-rating counts.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSummary {
    pub total_score: f32,
    pub rating_counts: HashMap<NoteRating, u32>,
}

impl RoundSummary {
    pub fn note_count(&self) -> u32 {
        self.rating_counts.values().sum()
    }

    pub fn count(&self, rating: NoteRating) -> u32 {
        self.rating_counts.get(&rating).copied().unwrap_or(0)
    }
}

/// Folds the timeline into a [`RoundSummary`].
///
/// Pure and read-only; safe to re-derive at any point after a round
/// finishes. Every note lands in exactly one bucket.
pub fn summarize(notes: &[GameNote]) -> RoundSummary {
    let mut rating_counts = HashMap::from_iter([
        (NoteRating::Missed, 0),
        (NoteRating::Bad, 0),
        (NoteRating::Good, 0),
        (NoteRating::Great, 0),
        (NoteRating::Perfect, 0),
    ]);
    let mut total_score = 0.0;

    for note in notes {
        total_score += judgment::rating_points(note.rating);
        *rating_counts.entry(note.rating).or_insert(0) += 1;
    }

    RoundSummary {
        total_score,
        rating_counts,
    }
}
