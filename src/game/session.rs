use crate::config::Settings;
use crate::game::clock::Transport;
use crate::game::error::GameError;
use crate::game::judgment;
use crate::game::note::{GameNote, MISSED_PRESS, NoteKind, NoteRating, NoteTimeline};
use crate::game::pitch::{self, KeyLayout, Pitch};
use crate::game::scores::{self, RoundSummary};
use crate::game::sheet::MusicSheet;
use log::{debug, info};
use std::collections::HashMap;
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameStatus {
    NotStarted,
    Running,
    Paused,
    /// Terminal; a new round needs a fresh session.
    Finished,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameStatus::NotStarted => "not started",
            GameStatus::Running => "running",
            GameStatus::Paused => "paused",
            GameStatus::Finished => "finished",
        };
        write!(f, "{}", name)
    }
}

/// One note prepared for drawing: display pitch folded into the keyboard
/// range, plus the approach distance above the keyboard edge.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NoteView {
    pub note_index: usize,
    pub pitch: Pitch,
    pub kind: NoteKind,
    pub distance: f32,
}

/// What one tick hands to the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct TickFrame {
    /// In ascending start-time order.
    pub notes: Vec<NoteView>,
    pub status: GameStatus,
}

/// Result of a key event, for the host's renderer and sound layer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum InputOutcome {
    /// Key is outside the layout, or the session is not running.
    Ignored,
    /// Key resolved to a pitch but no playable note matched.
    KeyOnly { pitch: Pitch },
    Tapped {
        pitch: Pitch,
        note_index: usize,
        rating: NoteRating,
    },
    HoldStarted { pitch: Pitch, note_index: usize },
    HoldFinished {
        pitch: Pitch,
        note_index: usize,
        rating: NoteRating,
    },
}

/// One round of play: the status machine, the note timeline, and the
/// working sets the scan and the input handlers share.
///
/// The session is a plain value owned by the host; nothing here is
/// process-global, so rounds can run back to back or side by side.
pub struct Session {
    status: GameStatus,
    settings: Settings,
    layout: KeyLayout,
    transport: Box<dyn Transport>,
    timeline: Option<NoteTimeline>,
    /// This tick's input-eligible notes, as timeline indices. Rebuilt
    /// from scratch every tick; never aliased across ticks.
    triggerable: Vec<usize>,
    /// Hold notes whose key is currently down, keyed by physical key.
    in_hand: HashMap<char, usize>,
    paused_at: f32,
    summary: Option<RoundSummary>,
}

impl Session {
    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_note_falling_speed(&mut self, value: f32) -> Result<(), GameError> {
        self.settings.set_note_falling_speed(value)
    }

    pub fn set_note_miss_time_limit(&mut self, value: f32) -> Result<(), GameError> {
        self.settings.set_note_miss_time_limit(value)
    }

    pub fn set_note_late_time_limit(&mut self, value: f32) -> Result<(), GameError> {
        self.settings.set_note_late_time_limit(value)
    }

    pub fn set_note_early_trigger_limit(&mut self, value: f32) -> Result<(), GameError> {
        self.settings.set_note_early_trigger_limit(value)
    }

    pub fn set_note_area_height(&mut self, value: f32) -> Result<(), GameError> {
        self.settings.set_note_area_height(value)
    }

    /// Changes the keyboard range, rebuilding the key layout with it.
    /// Either both change or neither does.
    pub fn set_key_range(&mut self, start: Pitch, end: Pitch) -> Result<(), GameError> {
        let mut updated = self.settings.clone();
        updated.set_key_range(start, end)?;
        let layout = KeyLayout::for_range(&updated.key_range())?;
        self.settings = updated;
        self.layout = layout;
        Ok(())
    }

    /// Read-only view of the timeline for renderers and result screens.
    pub fn notes(&self) -> &[GameNote] {
        self.timeline.as_ref().map_or(&[], |t| t.notes())
    }

    /// The finished round's summary; `None` until the round finishes.
    pub fn summary(&self) -> Option<&RoundSummary> {
        self.summary.as_ref()
    }
}

pub fn init(settings: Settings, transport: Box<dyn Transport>) -> Result<Session, GameError> {
    let layout = KeyLayout::for_range(&settings.key_range())?;
    Ok(Session {
        status: GameStatus::NotStarted,
        settings,
        layout,
        transport,
        timeline: None,
        triggerable: Vec::new(),
        in_hand: HashMap::new(),
        paused_at: 0.0,
        summary: None,
    })
}

pub fn load_sheet(session: &mut Session, sheet: MusicSheet) {
    info!(
        "Loaded sheet '{}' with {} notes.",
        sheet.name,
        sheet.note_count()
    );
    session.timeline = Some(NoteTimeline::new(sheet.into_notes()));
}

/// Starts a fresh round. Legal only before the first start.
pub fn start(session: &mut Session) -> Result<(), GameError> {
    if session.status != GameStatus::NotStarted {
        return Err(GameError::invalid_state("start a round", session.status));
    }
    if session.timeline.is_none() {
        return Err(GameError::missing_data("start a round"));
    }
    session.transport.start();
    session.status = GameStatus::Running;
    info!("Round started.");
    Ok(())
}

/// Pauses a running round, recording the clock position to resume from.
pub fn pause(session: &mut Session) -> Result<(), GameError> {
    if session.status != GameStatus::Running {
        return Err(GameError::invalid_state("pause the round", session.status));
    }
    session.paused_at = session.transport.current_seconds();
    session.transport.pause();
    session.status = GameStatus::Paused;
    info!("Round paused at {:.3}s.", session.paused_at);
    Ok(())
}

/// Resumes a paused round at the recorded clock position.
pub fn resume(session: &mut Session) -> Result<(), GameError> {
    if session.status != GameStatus::Paused {
        return Err(GameError::invalid_state("resume the round", session.status));
    }
    if session.timeline.is_none() {
        return Err(GameError::missing_data("resume the round"));
    }
    session.transport.resume(session.paused_at);
    session.status = GameStatus::Running;
    info!("Round resumed at {:.3}s.", session.paused_at);
    Ok(())
}

/// Advances the engine by one tick and returns the frame to draw.
///
/// The host calls this once per loop pass. The status check at the top
/// makes a pause observable before the next pass runs; no tick straddles
/// a pause or finish boundary. Within the tick, overdue notes are missed
/// before the triggerable set is republished, so input arriving after
/// this tick can never match a note the same tick already missed.
pub fn update(session: &mut Session) -> TickFrame {
    if session.status != GameStatus::Running {
        return TickFrame {
            notes: Vec::new(),
            status: session.status,
        };
    }

    let now = session.transport.current_seconds();

    age_out_stale_holds(session, now);
    apply_passive_misses(session, now);
    rebuild_triggerable(session, now);
    let notes = collect_note_views(session, now);

    let all_resolved = match session.timeline.as_mut() {
        Some(timeline) => timeline.first_open().is_none(),
        None => true,
    };
    if all_resolved && now > session.transport.song_length_seconds() {
        finish(session);
    }

    TickFrame {
        notes,
        status: session.status,
    }
}

/// Feeds one de-duplicated key press into the engine.
pub fn handle_key_down(session: &mut Session, key: char) -> InputOutcome {
    if session.status != GameStatus::Running {
        return InputOutcome::Ignored;
    }
    let Some(pitch) = session.layout.pitch_for(key) else {
        return InputOutcome::Ignored;
    };
    let now = session.transport.current_seconds();
    let range = session.settings.key_range();

    // First match in timeline order wins among this tick's triggerable
    // notes; notes already in hand under another key are skipped.
    let matched = match session.timeline.as_ref() {
        Some(timeline) => session.triggerable.iter().copied().find(|&index| {
            let note = timeline.note(index);
            !note.is_triggered
                && !session.in_hand.values().any(|&held| held == index)
                && range.fold(note.sheet.pitch) == pitch
        }),
        None => None,
    };
    let Some(index) = matched else {
        return InputOutcome::KeyOnly { pitch };
    };

    let miss_limit = session.settings.note_miss_time_limit();
    let late_limit = session.settings.note_late_time_limit();
    let Some(timeline) = session.timeline.as_mut() else {
        return InputOutcome::KeyOnly { pitch };
    };
    let note = timeline.note_mut(index);
    match note.sheet.kind() {
        NoteKind::Tap => {
            note.is_triggered = true;
            note.press_starts_at = now;
            note.rating = judgment::rate_note(note, miss_limit, late_limit);
            debug_assert!(note.rating_state_consistent());
            info!(
                "Tap {} at {:.3}s rated {:?}.",
                pitch::note_name(note.sheet.pitch),
                now,
                note.rating
            );
            InputOutcome::Tapped {
                pitch,
                note_index: index,
                rating: note.rating,
            }
        }
        NoteKind::Hold => {
            note.press_starts_at = now;
            debug!(
                "Hold {} started at {:.3}s.",
                pitch::note_name(note.sheet.pitch),
                now
            );
            session.in_hand.insert(key, index);
            InputOutcome::HoldStarted {
                pitch,
                note_index: index,
            }
        }
    }
}

/// Feeds one key release into the engine, resolving an in-hand hold.
pub fn handle_key_up(session: &mut Session, key: char) -> InputOutcome {
    if session.status != GameStatus::Running {
        return InputOutcome::Ignored;
    }
    let Some(pitch) = session.layout.pitch_for(key) else {
        return InputOutcome::Ignored;
    };
    let Some(index) = session.in_hand.remove(&key) else {
        return InputOutcome::KeyOnly { pitch };
    };

    let now = session.transport.current_seconds();
    let miss_limit = session.settings.note_miss_time_limit();
    let late_limit = session.settings.note_late_time_limit();
    let Some(timeline) = session.timeline.as_mut() else {
        return InputOutcome::KeyOnly { pitch };
    };
    let note = timeline.note_mut(index);
    note.press_ends_at = now;
    note.is_triggered = true;
    note.rating = judgment::rate_note(note, miss_limit, late_limit);
    debug_assert!(note.rating_state_consistent());
    info!(
        "Hold {} released at {:.3}s rated {:?}.",
        pitch::note_name(note.sheet.pitch),
        now,
        note.rating
    );
    InputOutcome::HoldFinished {
        pitch,
        note_index: index,
        rating: note.rating,
    }
}

fn finish(session: &mut Session) {
    let summary = match session.timeline.as_ref() {
        Some(timeline) => scores::summarize(timeline.notes()),
        None => scores::summarize(&[]),
    };
    info!(
        "Round finished: total score {:.1} over {} notes.",
        summary.total_score,
        summary.note_count()
    );
    session.summary = Some(summary);
    session.triggerable.clear();
    session.in_hand.clear();
    session.status = GameStatus::Finished;
}

/// A hold whose key is still down long past the note's end can no longer
/// be resolved by a release; it leaves the in-hand set as a miss.
fn age_out_stale_holds(session: &mut Session, now: f32) {
    let miss_limit = session.settings.note_miss_time_limit();
    let Some(timeline) = session.timeline.as_mut() else {
        return;
    };
    let stale: Vec<char> = session
        .in_hand
        .iter()
        .filter(|(_, index)| now - timeline.note(**index).sheet.end() > miss_limit)
        .map(|(&key, _)| key)
        .collect();
    for key in stale {
        if let Some(index) = session.in_hand.remove(&key) {
            mark_missed(timeline.note_mut(index), now);
        }
    }
}

/// Marks overdue notes missed, walking forward from the scan cursor.
/// Notes currently in hand are resolved by the age-out pass instead.
fn apply_passive_misses(session: &mut Session, now: f32) {
    let miss_limit = session.settings.note_miss_time_limit();
    let Some(timeline) = session.timeline.as_mut() else {
        return;
    };
    let Some(cursor) = timeline.first_open() else {
        return;
    };

    let mut overdue: Vec<usize> = Vec::new();
    for index in cursor..timeline.len() {
        let note = timeline.note(index);
        if note.is_triggered {
            continue;
        }
        if now - note.sheet.start <= miss_limit {
            break;
        }
        if session.in_hand.values().any(|&held| held == index) {
            continue;
        }
        overdue.push(index);
    }
    for index in overdue {
        mark_missed(timeline.note_mut(index), now);
    }
}

/// Publishes this tick's input-eligible notes: every untriggered note
/// whose start lies within the early-trigger window of the clock.
fn rebuild_triggerable(session: &mut Session, now: f32) {
    session.triggerable.clear();
    let early_limit = session.settings.note_early_trigger_limit();
    let Some(timeline) = session.timeline.as_mut() else {
        return;
    };
    let Some(cursor) = timeline.first_open() else {
        return;
    };
    for index in cursor..timeline.len() {
        let note = timeline.note(index);
        if note.is_triggered {
            continue;
        }
        if note.sheet.start - now > early_limit {
            break;
        }
        session.triggerable.push(index);
    }
}

/// Walks forward from the scan cursor annotating untriggered notes with
/// their approach distance, stopping once a note would spawn beyond the
/// visible area. Ascending start-time order by construction.
fn collect_note_views(session: &mut Session, now: f32) -> Vec<NoteView> {
    let falling_speed = session.settings.note_falling_speed();
    let area_height = session.settings.note_area_height();
    let range = session.settings.key_range();
    let mut views = Vec::new();

    let Some(timeline) = session.timeline.as_mut() else {
        return views;
    };
    let Some(cursor) = timeline.first_open() else {
        return views;
    };
    for index in cursor..timeline.len() {
        let note = timeline.note(index);
        if note.is_triggered {
            continue;
        }
        let time_diff = note.sheet.start - now;
        // A passed-but-not-yet-missed note waits at the keyboard edge.
        let distance = if time_diff >= 0.0 {
            time_diff * falling_speed
        } else {
            0.0
        };
        if distance > area_height {
            break;
        }
        views.push(NoteView {
            note_index: index,
            pitch: range.fold(note.sheet.pitch),
            kind: note.sheet.kind(),
            distance,
        });
    }
    views
}

fn mark_missed(note: &mut GameNote, now: f32) {
    note.is_triggered = true;
    note.press_starts_at = MISSED_PRESS;
    note.rating = NoteRating::Missed;
    debug_assert!(note.rating_state_consistent());
    debug!(
        "Missed {} (due {:.3}s, clock {:.3}s).",
        pitch::note_name(note.sheet.pitch),
        note.sheet.start,
        now
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::clock::ManualTransport;
    use crate::game::note::SheetNote;

    fn tap(pitch: Pitch, start: f32) -> SheetNote {
        SheetNote {
            pitch,
            start,
            duration: 0.25,
            fully_play_time: None,
            suggested_key: None,
        }
    }

    fn hold(pitch: Pitch, start: f32, duration: f32) -> SheetNote {
        SheetNote {
            pitch,
            start,
            duration,
            fully_play_time: Some(duration),
            suggested_key: None,
        }
    }

    fn sheet(notes: Vec<SheetNote>) -> MusicSheet {
        MusicSheet::new("test", 90.0, (4, 4), notes).unwrap()
    }

    fn session_with(notes: Vec<SheetNote>, song_length: f32) -> (ManualTransport, Session) {
        let clock = ManualTransport::new(song_length);
        let mut session = init(Settings::default(), Box::new(clock.clone())).unwrap();
        load_sheet(&mut session, sheet(notes));
        (clock, session)
    }

    /// Steps the clock to `target` in small increments, updating as a
    /// host loop would.
    fn step_to(clock: &ManualTransport, session: &mut Session, target: f32) {
        while clock.position() < target {
            clock.advance((target - clock.position()).min(0.01));
            update(session);
        }
    }

    #[test]
    fn start_requires_a_timeline() {
        let clock = ManualTransport::new(10.0);
        let mut session = init(Settings::default(), Box::new(clock)).unwrap();
        assert!(matches!(
            start(&mut session),
            Err(GameError::MissingData { .. })
        ));
    }

    #[test]
    fn transition_matrix_is_enforced() {
        let (_, mut session) = session_with(vec![tap(60, 1.0)], 10.0);

        assert!(matches!(pause(&mut session), Err(GameError::InvalidState { .. })));
        assert!(matches!(resume(&mut session), Err(GameError::InvalidState { .. })));

        start(&mut session).unwrap();
        assert_eq!(session.status(), GameStatus::Running);
        assert!(matches!(start(&mut session), Err(GameError::InvalidState { .. })));
        assert!(matches!(resume(&mut session), Err(GameError::InvalidState { .. })));

        pause(&mut session).unwrap();
        assert_eq!(session.status(), GameStatus::Paused);
        assert!(matches!(pause(&mut session), Err(GameError::InvalidState { .. })));

        resume(&mut session).unwrap();
        assert_eq!(session.status(), GameStatus::Running);
    }

    #[test]
    fn finished_is_terminal() {
        let (clock, mut session) = session_with(vec![tap(60, 0.1)], 1.0);
        start(&mut session).unwrap();
        step_to(&clock, &mut session, 1.2);
        assert_eq!(session.status(), GameStatus::Finished);
        assert!(session.summary().is_some());

        assert!(matches!(start(&mut session), Err(GameError::InvalidState { .. })));
        assert!(matches!(pause(&mut session), Err(GameError::InvalidState { .. })));
        assert!(matches!(resume(&mut session), Err(GameError::InvalidState { .. })));
    }

    #[test]
    fn update_is_inert_outside_running() {
        let (clock, mut session) = session_with(vec![tap(60, 0.5)], 10.0);
        let frame = update(&mut session);
        assert_eq!(frame.status, GameStatus::NotStarted);
        assert!(frame.notes.is_empty());

        start(&mut session).unwrap();
        pause(&mut session).unwrap();
        clock.advance(5.0);
        let frame = update(&mut session);
        assert_eq!(frame.status, GameStatus::Paused);
        assert!(frame.notes.is_empty());
        // The pause froze the clock, so nothing was missed meanwhile.
        assert!(session.notes().iter().all(|n| !n.is_triggered));
    }

    #[test]
    fn key_outside_layout_is_ignored() {
        let (_, mut session) = session_with(vec![tap(60, 0.5)], 10.0);
        start(&mut session).unwrap();
        update(&mut session);
        assert_eq!(handle_key_down(&mut session, 'z'), InputOutcome::Ignored);
    }

    #[test]
    fn rejected_key_range_leaves_the_layout_intact() {
        let (_, mut session) = session_with(vec![tap(60, 0.5)], 10.0);
        // A0..E2 needs more white keys than the rows have.
        assert!(session.set_key_range(21, 40).is_err());
        assert_eq!(session.settings().key_range().start(), 57);

        start(&mut session).unwrap();
        update(&mut session);
        assert!(matches!(
            handle_key_down(&mut session, 'd'),
            InputOutcome::Tapped { .. }
        ));
    }

    #[test]
    fn early_trigger_window_gates_matching() {
        let (clock, mut session) = session_with(vec![tap(60, 1.0)], 10.0);
        start(&mut session).unwrap();

        step_to(&clock, &mut session, 0.4);
        // 0.6s ahead of the note: outside the 0.5s early window.
        assert!(matches!(
            handle_key_down(&mut session, 'd'),
            InputOutcome::KeyOnly { pitch: 60 }
        ));

        step_to(&clock, &mut session, 0.6);
        match handle_key_down(&mut session, 'd') {
            InputOutcome::Tapped { pitch, note_index, .. } => {
                assert_eq!(pitch, 60);
                assert_eq!(note_index, 0);
            }
            other => panic!("expected a tap, got {:?}", other),
        }
    }

    #[test]
    fn folded_pitch_matches_out_of_range_notes() {
        // A2 (45) folds into the C4..B4 window as A4 (69), key 'k'.
        let (clock, mut session) = session_with(vec![tap(45, 0.5)], 10.0);
        start(&mut session).unwrap();
        step_to(&clock, &mut session, 0.5);

        let frame = update(&mut session);
        assert_eq!(frame.notes[0].pitch, 69);

        match handle_key_down(&mut session, 'k') {
            InputOutcome::Tapped { rating, .. } => assert_eq!(rating, NoteRating::Perfect),
            other => panic!("expected a tap, got {:?}", other),
        }
    }

    #[test]
    fn first_in_timeline_order_wins_ties() {
        let (clock, mut session) = session_with(vec![tap(60, 0.2), tap(60, 0.4)], 10.0);
        start(&mut session).unwrap();
        step_to(&clock, &mut session, 0.1);

        match handle_key_down(&mut session, 'd') {
            InputOutcome::Tapped { note_index, .. } => assert_eq!(note_index, 0),
            other => panic!("expected a tap, got {:?}", other),
        }
        match handle_key_down(&mut session, 'd') {
            InputOutcome::Tapped { note_index, .. } => assert_eq!(note_index, 1),
            other => panic!("expected a tap, got {:?}", other),
        }
    }

    #[test]
    fn overdue_notes_are_missed_before_input_can_match() {
        let (clock, mut session) = session_with(vec![tap(60, 0.2)], 10.0);
        start(&mut session).unwrap();
        step_to(&clock, &mut session, 0.8);

        let note = &session.notes()[0];
        assert!(note.is_triggered);
        assert_eq!(note.rating, NoteRating::Missed);
        assert_eq!(note.press_starts_at, MISSED_PRESS);

        // The key arrives late; the note is gone.
        assert!(matches!(
            handle_key_down(&mut session, 'd'),
            InputOutcome::KeyOnly { .. }
        ));
    }

    #[test]
    fn hold_is_not_missed_while_in_hand() {
        let (clock, mut session) = session_with(vec![hold(60, 0.2, 2.0)], 10.0);
        start(&mut session).unwrap();
        step_to(&clock, &mut session, 0.2);

        assert!(matches!(
            handle_key_down(&mut session, 'd'),
            InputOutcome::HoldStarted { note_index: 0, .. }
        ));

        // Well past start + miss window, but the key is still down.
        step_to(&clock, &mut session, 1.5);
        assert!(!session.notes()[0].is_triggered);

        step_to(&clock, &mut session, 2.2);
        match handle_key_up(&mut session, 'd') {
            InputOutcome::HoldFinished { rating, .. } => assert_eq!(rating, NoteRating::Perfect),
            other => panic!("expected a hold finish, got {:?}", other),
        }
    }

    #[test]
    fn hold_ages_out_as_a_miss_when_never_released() {
        let (clock, mut session) = session_with(vec![hold(60, 0.2, 0.5)], 2.0);
        start(&mut session).unwrap();
        step_to(&clock, &mut session, 0.2);
        handle_key_down(&mut session, 'd');

        // note end 0.7 + miss window 0.5: stale past 1.2.
        step_to(&clock, &mut session, 1.4);
        let note = &session.notes()[0];
        assert!(note.is_triggered);
        assert_eq!(note.rating, NoteRating::Missed);

        // The eventual release finds nothing in hand.
        assert!(matches!(
            handle_key_up(&mut session, 'd'),
            InputOutcome::KeyOnly { .. }
        ));

        // And the round can still finish.
        step_to(&clock, &mut session, 2.2);
        assert_eq!(session.status(), GameStatus::Finished);
    }

    #[test]
    fn second_key_cannot_restart_an_in_hand_note() {
        // 'd' (C4, 60) and ';' (C5, 72) fold to the same pitch class but
        // different pitches, so use one note reachable from both keys.
        let (clock, mut session) = session_with(vec![hold(48, 0.2, 1.0)], 10.0);
        start(&mut session).unwrap();
        step_to(&clock, &mut session, 0.2);

        // C3 folds to C4; 'd' starts the hold.
        assert!(matches!(
            handle_key_down(&mut session, 'd'),
            InputOutcome::HoldStarted { .. }
        ));
        // A second matching press finds no open note.
        assert!(matches!(
            handle_key_down(&mut session, 'd'),
            InputOutcome::KeyOnly { .. }
        ));
    }

    #[test]
    fn frame_views_are_ordered_and_clamped() {
        let settings = Settings::default();
        let speed = settings.note_falling_speed();
        let (clock, mut session) = session_with(
            vec![tap(60, 0.3), tap(62, 1.0), tap(64, 2.0), tap(65, 60.0)],
            70.0,
        );
        start(&mut session).unwrap();
        step_to(&clock, &mut session, 0.5);
        let frame = update(&mut session);

        // The far-future note is beyond the visible area.
        assert_eq!(frame.notes.len(), 3);
        // Passed note waits at the keyboard edge.
        assert_eq!(frame.notes[0].distance, 0.0);
        let d1 = frame.notes[1].distance;
        let d2 = frame.notes[2].distance;
        assert!((d1 - 0.5 * speed).abs() < speed * 0.02);
        assert!((d2 - 1.5 * speed).abs() < speed * 0.02);
        assert!(d1 < d2);
        let indices: Vec<usize> = frame.notes.iter().map(|v| v.note_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn ratings_stay_consistent_with_triggered_flags() {
        let (clock, mut session) = session_with(
            vec![tap(60, 0.2), hold(62, 0.5, 0.5), tap(64, 1.5)],
            3.0,
        );
        start(&mut session).unwrap();

        step_to(&clock, &mut session, 0.2);
        handle_key_down(&mut session, 'd');
        for note in session.notes() {
            assert!(note.rating_state_consistent());
        }

        step_to(&clock, &mut session, 0.5);
        handle_key_down(&mut session, 'f');
        for note in session.notes() {
            assert!(note.rating_state_consistent());
        }

        step_to(&clock, &mut session, 1.0);
        handle_key_up(&mut session, 'f');
        step_to(&clock, &mut session, 3.2);
        assert_eq!(session.status(), GameStatus::Finished);
        for note in session.notes() {
            assert!(note.rating_state_consistent());
            assert!(note.is_triggered);
        }
    }

    #[test]
    fn empty_sheet_finishes_once_the_song_ends() {
        let (clock, mut session) = session_with(Vec::new(), 0.5);
        start(&mut session).unwrap();
        step_to(&clock, &mut session, 0.6);
        assert_eq!(session.status(), GameStatus::Finished);
        let summary = session.summary().unwrap();
        assert_eq!(summary.note_count(), 0);
        assert_eq!(summary.total_score, 0.0);
    }
}
