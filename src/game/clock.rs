use std::sync::{Arc, Mutex};
use std::time::Instant;

/// The playback clock the engine judges against.
///
/// Implementations wrap whatever drives the music: an audio backend's
/// transport, or a stepped clock in tests. Time is monotonic seconds from
/// the start of the song.
pub trait Transport {
    fn current_seconds(&self) -> f32;
    fn start(&mut self);
    fn pause(&mut self);
    /// Restarts the clock at a recorded position.
    fn resume(&mut self, at_seconds: f32);
    fn song_length_seconds(&self) -> f32;
}

/// Wall-clock transport for hosts without an audio-side clock.
pub struct WallTransport {
    song_length: f32,
    started_at: Option<Instant>,
    position: f32,
}

impl WallTransport {
    pub fn new(song_length: f32) -> Self {
        Self {
            song_length,
            started_at: None,
            position: 0.0,
        }
    }
}

impl Transport for WallTransport {
    fn current_seconds(&self) -> f32 {
        match self.started_at {
            Some(at) => self.position + at.elapsed().as_secs_f32(),
            None => self.position,
        }
    }

    fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
    }

    fn pause(&mut self) {
        if let Some(at) = self.started_at.take() {
            self.position += at.elapsed().as_secs_f32();
        }
    }

    fn resume(&mut self, at_seconds: f32) {
        self.position = at_seconds;
        self.started_at = Some(Instant::now());
    }

    fn song_length_seconds(&self) -> f32 {
        self.song_length
    }
}

/// Explicitly stepped transport for tests and headless runs.
///
/// Cloning yields a handle onto the same clock, so the host can keep one
/// to step time while the session owns another.
#[derive(Clone)]
pub struct ManualTransport {
    inner: Arc<Mutex<ManualInner>>,
}

struct ManualInner {
    position: f32,
    running: bool,
    song_length: f32,
}

impl ManualTransport {
    pub fn new(song_length: f32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ManualInner {
                position: 0.0,
                running: false,
                song_length,
            })),
        }
    }

    /// Moves the clock forward. Paused clocks stay frozen.
    pub fn advance(&self, delta_seconds: f32) {
        let mut inner = self.inner.lock().unwrap();
        if inner.running {
            inner.position += delta_seconds;
        }
    }

    pub fn position(&self) -> f32 {
        self.inner.lock().unwrap().position
    }
}

impl Transport for ManualTransport {
    fn current_seconds(&self) -> f32 {
        self.inner.lock().unwrap().position
    }

    fn start(&mut self) {
        self.inner.lock().unwrap().running = true;
    }

    fn pause(&mut self) {
        self.inner.lock().unwrap().running = false;
    }

    fn resume(&mut self, at_seconds: f32) {
        let mut inner = self.inner.lock().unwrap();
        inner.position = at_seconds;
        inner.running = true;
    }

    fn song_length_seconds(&self) -> f32 {
        self.inner.lock().unwrap().song_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_only_advances_while_running() {
        let clock = ManualTransport::new(10.0);
        clock.advance(1.0);
        assert_eq!(clock.position(), 0.0);

        let mut handle = clock.clone();
        handle.start();
        clock.advance(1.0);
        assert_eq!(clock.position(), 1.0);

        handle.pause();
        clock.advance(1.0);
        assert_eq!(clock.position(), 1.0);

        handle.resume(0.5);
        assert_eq!(clock.position(), 0.5);
        clock.advance(0.25);
        assert_eq!(clock.position(), 0.75);
    }

    #[test]
    fn wall_clock_pause_freezes_position() {
        let mut clock = WallTransport::new(10.0);
        assert_eq!(clock.current_seconds(), 0.0);
        clock.start();
        clock.pause();
        let frozen = clock.current_seconds();
        assert_eq!(clock.current_seconds(), frozen);
        clock.resume(2.0);
        assert!(clock.current_seconds() >= 2.0);
        assert_eq!(clock.song_length_seconds(), 10.0);
    }
}
