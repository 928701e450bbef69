use keyfall::config::Settings;
use keyfall::game::clock::ManualTransport;
use keyfall::game::note::SheetNote;
use keyfall::game::session::{self, GameStatus, InputOutcome};
use keyfall::game::sheet::MusicSheet;
use log::{info, LevelFilter};
use std::error::Error;

const TICK_SECONDS: f32 = 1.0 / 60.0;

/// A short inline chart: three taps and one hold around middle C.
fn demo_sheet() -> Result<MusicSheet, Box<dyn Error>> {
    let notes = vec![
        SheetNote {
            pitch: 60,
            start: 0.5,
            duration: 0.25,
            fully_play_time: None,
            suggested_key: None,
        },
        SheetNote {
            pitch: 64,
            start: 1.0,
            duration: 0.25,
            fully_play_time: None,
            suggested_key: None,
        },
        SheetNote {
            pitch: 67,
            start: 1.5,
            duration: 1.0,
            fully_play_time: Some(1.0),
            suggested_key: None,
        },
        SheetNote {
            pitch: 72,
            start: 3.0,
            duration: 0.25,
            fully_play_time: None,
            suggested_key: None,
        },
    ];
    Ok(MusicSheet::new("demo", 90.0, (4, 4), notes)?)
}

fn main() -> Result<(), Box<dyn Error>> {
    // --- Logging Setup ---
    env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Info)
        .filter_module("keyfall::game::session", LevelFilter::Debug)
        .init();

    info!("keyfall demo starting...");

    // Scripted performance: (time, key, pressed). The player lands the
    // first tap exactly, is a hair late on the second, holds the G4 for
    // its full length, and nails the last C5.
    let script = [
        (0.5, 'd', true),
        (0.55, 'd', false),
        (1.03, 'g', true),
        (1.08, 'g', false),
        (1.5, 'j', true),
        (2.55, 'j', false),
        (3.0, ';', true),
        (3.05, ';', false),
    ];

    let clock = ManualTransport::new(3.5);
    let mut session = session::init(Settings::default(), Box::new(clock.clone()))?;
    session::load_sheet(&mut session, demo_sheet()?);
    session::start(&mut session)?;

    let mut next_event = 0;
    while session::update(&mut session).status != GameStatus::Finished {
        clock.advance(TICK_SECONDS);
        let now = clock.position();
        while next_event < script.len() && script[next_event].0 <= now {
            let (_, key, pressed) = script[next_event];
            let outcome = if pressed {
                session::handle_key_down(&mut session, key)
            } else {
                session::handle_key_up(&mut session, key)
            };
            match outcome {
                InputOutcome::Tapped { rating, .. } | InputOutcome::HoldFinished { rating, .. } => {
                    info!("'{}' scored {:?}", key, rating);
                }
                _ => {}
            }
            next_event += 1;
        }
    }

    if let Some(summary) = session.summary() {
        info!("Round complete: total score {:.1}", summary.total_score);
        for (rating, count) in &summary.rating_counts {
            info!("  {:?}: {}", rating, count);
        }
    }

    info!("keyfall demo exited gracefully.");
    Ok(())
}
