use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::envelope::EnvelopeParam;

pub const MIN_TONE_HZ: f32 = 300.0;
pub const MAX_TONE_HZ: f32 = 1500.0;

/// Sine oscillator with a continuous phase accumulator
pub struct ToneGenerator {
    frequency_hz: f32,
    sample_rate: f32,
    phase: f64,
}

impl ToneGenerator {
    pub fn new(frequency_hz: f32, sample_rate: u32) -> Self {
        Self {
            frequency_hz,
            sample_rate: sample_rate as f32,
            phase: 0.0,
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency_hz
    }

    /// Takes effect on the next sample; phase stays continuous
    pub fn set_frequency(&mut self, frequency_hz: f32) {
        self.frequency_hz = frequency_hz;
    }

    /// Generate a sample at the current phase
    pub fn next_sample(&mut self) -> f32 {
        let sample = (self.phase * 2.0 * std::f64::consts::PI).sin() as f32;
        self.phase += self.frequency_hz as f64 / self.sample_rate as f64;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        sample
    }
}

/// Oscillator → envelope → output gain, plus the device clock.
///
/// The clock is the number of frames rendered while running, so it only
/// moves when the device actually consumes audio and stands still while
/// suspended.
pub struct ToneChain {
    pub oscillator: ToneGenerator,
    pub envelope: EnvelopeParam,
    gain: f32,
    sample_rate: u32,
    frames_rendered: u64,
    running: bool,
}

pub type SharedChain = Arc<Mutex<ToneChain>>;

/// Lock the chain, recovering it if the device thread panicked mid-render
pub fn lock_chain(chain: &SharedChain) -> MutexGuard<'_, ToneChain> {
    chain.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ToneChain {
    /// New chain, suspended at clock 0
    pub fn new(sample_rate: u32, tone_hz: f32, volume: f32) -> Self {
        Self {
            oscillator: ToneGenerator::new(clamp_tone(tone_hz), sample_rate),
            envelope: EnvelopeParam::new(),
            gain: clamp_volume(volume),
            sample_rate,
            frames_rendered: 0,
            running: false,
        }
    }

    pub fn shared(self) -> SharedChain {
        Arc::new(Mutex::new(self))
    }

    /// Device clock in seconds
    pub fn now(&self) -> f64 {
        self.frames_rendered as f64 / self.sample_rate as f64
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn set_gain(&mut self, volume: f32) {
        self.gain = clamp_volume(volume);
    }

    pub fn set_frequency(&mut self, tone_hz: f32) {
        self.oscillator.set_frequency(clamp_tone(tone_hz));
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    /// Fill a mono buffer. While suspended the buffer is silent and the
    /// clock does not advance.
    pub fn fill_buffer(&mut self, buffer: &mut [f32]) {
        if !self.running {
            buffer.fill(0.0);
            return;
        }

        for sample in buffer.iter_mut() {
            let time = self.now();
            let envelope = self.envelope.advance(time);
            let raw = self.oscillator.next_sample();
            let mut out = raw * envelope * self.gain;
            // Soft clipping using tanh
            if out.abs() > 0.8 {
                out = out.signum() * (0.8 + 0.2 * (out.abs() - 0.8).tanh());
            }
            *sample = out;
            self.frames_rendered += 1;
        }
    }
}

pub fn clamp_tone(tone_hz: f32) -> f32 {
    if tone_hz.is_nan() {
        MIN_TONE_HZ
    } else {
        tone_hz.clamp(MIN_TONE_HZ, MAX_TONE_HZ)
    }
}

pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_suspended_chain_is_silent_and_frozen() {
        let mut chain = ToneChain::new(8000, 600.0, 1.0);
        chain.envelope.set_immediate(1.0, 0.0);
        let mut buffer = vec![1.0; 64];
        chain.fill_buffer(&mut buffer);
        assert!(buffer.iter().all(|s| *s == 0.0));
        assert_eq!(chain.now(), 0.0);
    }

    #[test]
    fn test_clock_advances_with_rendered_frames() {
        let mut chain = ToneChain::new(8000, 600.0, 1.0);
        chain.set_running(true);
        let mut buffer = vec![0.0; 4000];
        chain.fill_buffer(&mut buffer);
        assert_abs_diff_eq!(chain.now(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_envelope_gates_the_tone() {
        let mut chain = ToneChain::new(8000, 600.0, 0.5);
        chain.set_running(true);
        let mut buffer = vec![0.0; 800];

        chain.fill_buffer(&mut buffer);
        assert!(buffer.iter().all(|s| *s == 0.0));

        chain.envelope.set_immediate(1.0, chain.now());
        chain.fill_buffer(&mut buffer);
        let peak = buffer.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert_abs_diff_eq!(peak, 0.5, epsilon = 0.01);
    }

    #[test]
    fn test_setters_clamp() {
        let mut chain = ToneChain::new(8000, 10.0, 3.0);
        assert_eq!(chain.oscillator.frequency(), MIN_TONE_HZ);
        assert_eq!(chain.gain(), 1.0);
        chain.set_frequency(9000.0);
        chain.set_gain(f32::NAN);
        assert_eq!(chain.oscillator.frequency(), MAX_TONE_HZ);
        assert_eq!(chain.gain(), 0.0);
        chain.set_gain(0.3);
        chain.set_gain(0.3);
        assert_eq!(chain.gain(), 0.3);
    }
}
