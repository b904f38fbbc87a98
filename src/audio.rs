//! Progress model for a topic's audio attachment.
//!
//! The player tracks play/pause state and elapsed position on the app's tick
//! rather than on playback callbacks; audible output is handed to the system
//! handler, so position advances on wall-clock time and clamps at the known
//! duration.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Default)]
pub struct AudioPlayer {
    source: Option<String>,
    playing: bool,
    position: Duration,
    duration: Option<Duration>,
    last_tick: Option<Instant>,
}

impl AudioPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a new source, stopping playback and zeroing the position.
    ///
    /// `loaded_at` is a unix timestamp appended as a cache-busting query
    /// parameter so a re-entered topic never plays a stale attachment.
    pub fn set_source(&mut self, url: &str, loaded_at: i64) {
        self.source = Some(format!("{url}?t={loaded_at}"));
        self.stop();
    }

    /// Clears the source entirely (topic without audio).
    pub fn clear(&mut self) {
        self.source = None;
        self.duration = None;
        self.stop();
    }

    fn stop(&mut self) {
        self.playing = false;
        self.position = Duration::ZERO;
        self.last_tick = None;
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn position(&self) -> Duration {
        self.position
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Records the attachment length once known (probed or server-supplied).
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = Some(duration);
    }

    /// Toggles play/pause. No-op without a source.
    pub fn toggle(&mut self) {
        if self.source.is_none() {
            return;
        }
        self.playing = !self.playing;
        self.last_tick = self.playing.then(Instant::now);
    }

    /// Advances the position from the app tick. Call at ~200 ms intervals;
    /// the elapsed wall-clock time since the previous tick is what counts.
    pub fn tick(&mut self) {
        if !self.playing {
            return;
        }
        let now = Instant::now();
        let elapsed = self
            .last_tick
            .map_or(Duration::ZERO, |prev| now.duration_since(prev));
        self.last_tick = Some(now);
        self.step(elapsed);
    }

    /// Advances position by `elapsed`, pausing at the end of a known
    /// duration. Split from `tick` so tests can drive it deterministically.
    fn step(&mut self, elapsed: Duration) {
        self.position += elapsed;
        if let Some(duration) = self.duration {
            if self.position >= duration {
                self.position = duration;
                self.playing = false;
                self.last_tick = None;
            }
        }
    }

    /// Progress in percent, `0.0` while the duration is unknown or zero.
    pub fn progress_percent(&self) -> f64 {
        progress_percent(self.position, self.duration)
    }
}

/// `current / duration * 100`, clamped to `[0, 100]`; `0.0` when the
/// duration is unknown or zero.
pub fn progress_percent(current: Duration, duration: Option<Duration>) -> f64 {
    match duration {
        Some(d) if !d.is_zero() => {
            (current.as_secs_f64() / d.as_secs_f64() * 100.0).clamp(0.0, 100.0)
        }
        _ => 0.0,
    }
}

/// Formats a position as `minutes:seconds` with the seconds zero-padded.
pub fn format_time(t: Duration) -> String {
    let total = t.as_secs();
    format!("{}:{:02}", total / 60, total % 60)
}
