//! keyfall: a rhythm-game judgment engine for piano-style keyboards.
//!
//! The engine owns the note timeline and the judgment rules; rendering,
//! audio playback, and storage stay with the host. Each round is one
//! [`game::session::Session`] value driven by a cooperative tick loop
//! plus de-duplicated key events.

pub mod config;
pub mod game;

pub use config::Settings;
pub use game::clock::{ManualTransport, Transport, WallTransport};
pub use game::error::GameError;
pub use game::note::{GameNote, NoteKind, NoteRating, SheetNote};
pub use game::scores::RoundSummary;
pub use game::session::{GameStatus, InputOutcome, Session, TickFrame};
pub use game::sheet::MusicSheet;
