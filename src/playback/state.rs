//! Observable transport state published by the playback controller.

/// Transport status
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// Nothing sounding; also the state after playback runs to the end
    #[default]
    Idle,
    Playing,
    Paused,
}

/// Snapshot sent to observers on every change and every poll tick
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaybackState {
    pub status: PlaybackStatus,
    /// Position in the timeline, seconds
    pub current_time: f64,
    /// Length of the loaded timeline, seconds
    pub total_duration: f64,
    /// Position captured by the last pause or paused seek
    pub paused_at: f64,
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    /// Idle at the end of the timeline after playing it through
    pub fn is_complete(&self) -> bool {
        self.status == PlaybackStatus::Idle
            && self.total_duration > 0.0
            && self.current_time >= self.total_duration
    }

    /// Fraction of the timeline played, 0.0 - 1.0
    pub fn progress(&self) -> f32 {
        if self.total_duration <= 0.0 {
            return 0.0;
        }
        (self.current_time / self.total_duration).clamp(0.0, 1.0) as f32
    }

    /// Get status text and color for UI display
    pub fn status_text(&self) -> (&'static str, StatusColor) {
        match self.status {
            PlaybackStatus::Idle if self.is_complete() => {
                ("Finished - type what you heard", StatusColor::Green)
            }
            PlaybackStatus::Idle if self.total_duration > 0.0 => {
                ("Ready - press Play", StatusColor::LightBlue)
            }
            PlaybackStatus::Idle => ("Enter text or generate a lesson", StatusColor::Gray),
            PlaybackStatus::Playing => ("Playing...", StatusColor::Yellow),
            PlaybackStatus::Paused => ("Paused", StatusColor::Orange),
        }
    }
}

/// Status colors for UI display
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusColor {
    Gray,
    Yellow,
    LightBlue,
    Green,
    Orange,
}

/// Format seconds as m:ss.t for the transport display
pub fn format_time(seconds: f64) -> String {
    let tenths = (seconds.max(0.0) * 10.0).floor() as u64;
    format!("{}:{:02}.{}", tenths / 600, (tenths / 10) % 60, tenths % 10)
}
