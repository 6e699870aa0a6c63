//! Turns a keying timeline into envelope automation on the output device.

use super::chain::lock_chain;
use super::device::OutputDevice;
use super::envelope::EnvelopeParam;
use super::error::AudioError;
use crate::morse::timeline::FADE_DURATION;
use crate::morse::Timeline;

/// Owns the output device and anchors timelines against its clock.
///
/// When the device could not be opened the scheduler is inert: every call
/// does nothing, reports zero durations and logs that audio is unavailable.
pub struct AudioScheduler {
    device: Option<Box<dyn OutputDevice>>,
    timeline: Option<Timeline>,
    /// Device-clock instant of timeline time 0
    play_start_time: f64,
}

impl AudioScheduler {
    pub fn new(device: Result<Box<dyn OutputDevice>, AudioError>) -> Self {
        let device = match device {
            Ok(device) => Some(device),
            Err(e) => {
                log::error!("Failed to initialize audio: {}", e);
                None
            }
        };

        Self {
            device,
            timeline: None,
            play_start_time: 0.0,
        }
    }

    pub fn is_available(&self) -> bool {
        self.device.as_ref().is_some_and(|d| !d.is_closed())
    }

    /// Cancel anything pending and schedule `timeline` from now.
    /// Returns the timeline duration.
    pub fn schedule(&mut self, timeline: &Timeline) -> f64 {
        let Some(device) = self.live_device("schedule") else {
            return 0.0;
        };

        let mut chain = lock_chain(device.chain());
        let now = chain.now();
        chain.envelope.set_immediate(0.0, now);
        let count = submit(
            &mut chain.envelope,
            timeline.envelope_events().map(|(t, v)| (now + t, v)),
        );
        drop(chain);

        log::debug!("Scheduled {} envelope points at clock {:.3}", count, now);
        self.play_start_time = now;
        self.timeline = Some(timeline.clone());
        timeline.duration()
    }

    /// Re-schedule the retained timeline starting `offset` seconds in.
    /// Returns the remaining duration.
    pub fn schedule_from(&mut self, offset: f64) -> f64 {
        let Some(device) = self.live_device("schedule_from") else {
            return 0.0;
        };
        let Some(timeline) = self.timeline.as_ref() else {
            log::warn!("No timeline to schedule from {:.3}s", offset);
            return 0.0;
        };

        let total = timeline.duration();
        let offset = if offset.is_nan() {
            0.0
        } else {
            offset.clamp(0.0, total)
        };

        // Fade from wherever the envelope is now into the timeline's level
        // one fade later, so entering mid-element never steps.
        let entry = (offset + FADE_DURATION).min(total);
        let entry_value = timeline.envelope_value_at(entry);

        let mut chain = lock_chain(device.chain());
        let now = chain.now();
        let current = chain.envelope.value();
        chain.envelope.set_immediate(current, now);
        chain
            .envelope
            .linear_ramp_to(now + (entry - offset), entry_value);
        let mut count = 1;
        for (t, v) in timeline.envelope_events().filter(|(t, _)| *t > entry) {
            chain.envelope.linear_ramp_to(now + (t - offset), v);
            count += 1;
        }
        drop(chain);

        log::debug!(
            "Rescheduled {} envelope points from {:.3}s at clock {:.3}",
            count,
            offset,
            now
        );
        self.play_start_time = now - offset;
        total - offset
    }

    /// Position in the current timeline, in seconds
    pub fn current_time(&self) -> f64 {
        match (self.device.as_ref(), self.timeline.as_ref()) {
            (Some(device), Some(_)) => (device.clock_now() - self.play_start_time).max(0.0),
            _ => 0.0,
        }
    }

    /// Silence the tone now without touching the retained timeline
    pub fn release(&mut self) {
        let Some(device) = self.live_device("release") else {
            return;
        };
        let mut chain = lock_chain(device.chain());
        let now = chain.now();
        chain.envelope.set_immediate(0.0, now);
    }

    /// Cancel everything and forget the timeline
    pub fn stop(&mut self) {
        self.release();
        self.timeline = None;
        self.play_start_time = 0.0;
    }

    pub fn set_frequency(&mut self, tone_hz: f32) {
        if let Some(device) = self.live_device("set_frequency") {
            let mut chain = lock_chain(device.chain());
            chain.set_frequency(tone_hz);
            log::debug!("Tone set to {:.0} Hz", chain.oscillator.frequency());
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        if let Some(device) = self.live_device("set_volume") {
            let mut chain = lock_chain(device.chain());
            chain.set_gain(volume);
            log::debug!("Volume set to {:.2}", chain.gain());
        }
    }

    /// Start the device clock. Returns false when audio is unavailable.
    pub fn resume_clock(&mut self) -> bool {
        let Some(device) = self.device.as_mut() else {
            log::debug!("Audio unavailable, ignoring resume_clock");
            return false;
        };
        match device.resume() {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to resume audio output: {}", e);
                false
            }
        }
    }

    pub fn suspend_clock(&mut self) {
        let Some(device) = self.device.as_mut() else {
            log::debug!("Audio unavailable, ignoring suspend_clock");
            return;
        };
        if let Err(e) = device.suspend() {
            log::warn!("Failed to suspend audio output: {}", e);
        }
    }

    /// Close the device. The scheduler is inert afterwards.
    pub fn dispose(&mut self) {
        if let Some(mut device) = self.device.take() {
            {
                let mut chain = lock_chain(device.chain());
                let now = chain.now();
                chain.envelope.set_immediate(0.0, now);
            }
            device.close();
            log::debug!("Disposed audio scheduler");
        }
        self.timeline = None;
    }

    /// Pending envelope points not yet reached by the device clock
    #[cfg(test)]
    pub fn pending_instructions(&self) -> usize {
        self.device
            .as_ref()
            .map(|d| lock_chain(d.chain()).envelope.pending_len())
            .unwrap_or(0)
    }

    fn live_device(&self, operation: &str) -> Option<&dyn OutputDevice> {
        match self.device.as_deref() {
            Some(device) if !device.is_closed() => Some(device),
            _ => {
                log::debug!("Audio unavailable, ignoring {}", operation);
                None
            }
        }
    }
}

impl Drop for AudioScheduler {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// The first point is a step, every later one a linear ramp ending at its
/// own time; the ramps are the fade edges.
fn submit(envelope: &mut EnvelopeParam, points: impl Iterator<Item = (f64, f32)>) -> usize {
    let mut count = 0;
    for (time, value) in points {
        if count == 0 {
            envelope.set_value_at(time, value);
        } else {
            envelope.linear_ramp_to(time, value);
        }
        count += 1;
    }
    count
}
