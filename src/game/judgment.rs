use crate::game::note::{GameNote, NoteKind, NoteRating};

// Rating thresholds over the normalized timing error. Strictly above a
// bound rates at that tier; an exact hit falls through them all.
const MISSED_BOUND: f32 = 1.0;
const BAD_BOUND: f32 = 0.6;
const GOOD_BOUND: f32 = 0.4;
const GREAT_BOUND: f32 = 0.05;

/// Penalty for a press later than the late window: the error stops being
/// proportional and is capped at the Bad boundary.
const LATE_CAP: f32 = 0.6;

/// Rates a resolved note from its press timestamps.
///
/// `miss_limit` is the miss window and `late_limit` the late window, both
/// in seconds. Total over all inputs: every finite timing produces a
/// rating, so a single odd note can never abort the tick loop.
pub fn rate_note(note: &GameNote, miss_limit: f32, late_limit: f32) -> NoteRating {
    if note.press_starts_at < 0.0 {
        return NoteRating::Missed;
    }

    let time_diff = note.press_starts_at - note.sheet.start;
    let diff_percent = match note.sheet.kind() {
        NoteKind::Tap => {
            if time_diff < late_limit {
                time_diff.abs() / miss_limit
            } else {
                LATE_CAP
            }
        }
        NoteKind::Hold => {
            let note_end = note.sheet.end();
            let trigger_diff = if time_diff < late_limit {
                time_diff.abs()
            } else {
                LATE_CAP
            };
            let release_diff = if note.press_ends_at > note_end {
                0.0
            } else {
                (note.press_ends_at - note_end).abs()
            };
            (trigger_diff + release_diff) / 2.0 / miss_limit
        }
    };

    rating_for(diff_percent)
}

fn rating_for(diff_percent: f32) -> NoteRating {
    if !diff_percent.is_finite() {
        // Unreachable from validated input; resolve rather than abort.
        return NoteRating::Missed;
    }
    if diff_percent > MISSED_BOUND {
        NoteRating::Missed
    } else if diff_percent > BAD_BOUND {
        NoteRating::Bad
    } else if diff_percent > GOOD_BOUND {
        NoteRating::Good
    } else if diff_percent > GREAT_BOUND {
        NoteRating::Great
    } else {
        // Covers the exact-zero case: a perfectly timed hit is Perfect.
        NoteRating::Perfect
    }
}

/// Point value of a rating when summing a round's score.
pub fn rating_points(rating: NoteRating) -> f32 {
    match rating {
        NoteRating::NotRatedYet | NoteRating::Missed => 0.0,
        NoteRating::Bad => 0.1,
        NoteRating::Good => 0.4,
        NoteRating::Great => 0.8,
        NoteRating::Perfect => 1.0,
    }
}
