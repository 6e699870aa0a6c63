//! Morse interval durations from character and effective (Farnsworth) speed.
//!
//! All durations are in seconds. The PARIS calibration word is 50 units
//! long, 19 of which are spacing between elements, characters and words.

pub const MIN_CHAR_SPEED: f64 = 5.0;
pub const MAX_CHAR_SPEED: f64 = 50.0;
pub const MAX_EFF_SPEED: f64 = 50.0;

/// Spacing units in one PARIS word (element, character and word gaps)
const PARIS_SPACE_UNITS: f64 = 19.0;

/// Average code elements per character assumed by the estimator
const AVG_ELEMENTS_PER_CHAR: f64 = 3.0;

/// Callers refining an estimate against a built timeline stop after this many passes
pub const MAX_REFINEMENT_PASSES: usize = 3;

/// Durations of every Morse interval for one speed setting
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimingConfig {
    pub dit_time: f64,
    pub dah_time: f64,
    pub element_space: f64,
    pub char_space: f64,
    pub word_space: f64,
}

impl TimingConfig {
    /// Compute timing for `char_speed` WPM characters sent at an overall
    /// `eff_speed` WPM. An `eff_speed` of 0, or one not below `char_speed`,
    /// gives standard timing. Inputs are clamped to the supported ranges;
    /// a nonzero `eff_speed` is never slower than [`MIN_CHAR_SPEED`].
    pub fn new(char_speed: f64, eff_speed: f64) -> Self {
        let char_speed = clamp_speed(char_speed, MIN_CHAR_SPEED, MAX_CHAR_SPEED);
        let eff_speed = clamp_eff_speed(eff_speed);

        let dit_time = 1.2 / char_speed;
        let standard_char_space = 3.0 * dit_time;
        let standard_word_space = 7.0 * dit_time;

        let (char_space, word_space) = if eff_speed > 0.0 && eff_speed < char_speed {
            let word_at_char_speed = paris_word_time(char_speed);
            let word_at_eff_speed = paris_word_time(eff_speed);
            let extra_per_unit = (word_at_eff_speed - word_at_char_speed) / PARIS_SPACE_UNITS;
            (
                standard_char_space + 3.0 * extra_per_unit,
                standard_word_space + 7.0 * extra_per_unit,
            )
        } else {
            (standard_char_space, standard_word_space)
        };

        Self {
            dit_time,
            dah_time: 3.0 * dit_time,
            element_space: dit_time,
            char_space,
            word_space,
        }
    }

    /// Standard timing at a single speed
    #[cfg(test)]
    pub fn standard(wpm: f64) -> Self {
        Self::new(wpm, 0.0)
    }

    pub fn is_farnsworth(&self) -> bool {
        self.char_space > 3.0 * self.dit_time + 1e-12
    }

    /// Rough duration of one character, assuming three elements split
    /// evenly between dits and dahs.
    pub fn estimate_char_duration(&self) -> f64 {
        let avg_element = (self.dit_time + self.dah_time) / 2.0;
        AVG_ELEMENTS_PER_CHAR * avg_element + (AVG_ELEMENTS_PER_CHAR - 1.0) * self.element_space
    }

    /// Rough duration of `chars` characters split into `words` words
    pub fn estimate_text_duration(&self, chars: usize, words: usize) -> f64 {
        if chars == 0 {
            return 0.0;
        }
        let words = words.clamp(1, chars);
        chars as f64 * self.estimate_char_duration()
            + (chars - words) as f64 * self.char_space
            + (words - 1) as f64 * self.word_space
    }

    /// How many groups of `avg_group_len` characters fit in `target_seconds`.
    /// Always at least one.
    pub fn estimate_group_count(&self, target_seconds: f64, avg_group_len: f64) -> usize {
        let group_len = avg_group_len.max(1.0);
        let group_duration = group_len * self.estimate_char_duration()
            + (group_len - 1.0) * self.char_space
            + self.word_space;
        if !target_seconds.is_finite() || target_seconds <= 0.0 {
            return 1;
        }
        ((target_seconds / group_duration).round() as usize).max(1)
    }
}

/// Seconds taken by one PARIS word at standard spacing
fn paris_word_time(wpm: f64) -> f64 {
    60.0 / wpm
}

fn clamp_speed(speed: f64, min: f64, max: f64) -> f64 {
    if speed.is_nan() {
        min
    } else {
        speed.clamp(min, max)
    }
}

/// 0 (off) passes through; any other speed lands in the character range
pub fn clamp_eff_speed(eff_speed: f64) -> f64 {
    match clamp_speed(eff_speed, 0.0, MAX_EFF_SPEED) {
        eff if eff > 0.0 && eff < MIN_CHAR_SPEED => MIN_CHAR_SPEED,
        eff => eff,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_standard_ratios_for_all_speeds() {
        for wpm in 5..=50 {
            let t = TimingConfig::new(wpm as f64, 0.0);
            assert_abs_diff_eq!(t.dit_time, 1.2 / wpm as f64, epsilon = 1e-9);
            assert_abs_diff_eq!(t.dah_time, 3.0 * t.dit_time, epsilon = 1e-9);
            assert_abs_diff_eq!(t.element_space, t.dit_time, epsilon = 1e-9);
            assert_abs_diff_eq!(t.char_space, 3.0 * t.dit_time, epsilon = 1e-9);
            assert_abs_diff_eq!(t.word_space, 7.0 * t.dit_time, epsilon = 1e-9);
            assert!(!t.is_farnsworth());
        }
    }

    #[test]
    fn test_twenty_wpm() {
        let t = TimingConfig::new(20.0, 0.0);
        assert_relative_eq!(t.dit_time, 0.06, epsilon = 1e-12);
        assert_relative_eq!(t.dah_time, 0.18, epsilon = 1e-12);
    }

    #[test]
    fn test_farnsworth_twenty_over_ten() {
        let t = TimingConfig::new(20.0, 10.0);
        let extra_per_unit = (6.0 - 3.0) / 19.0;
        assert_relative_eq!(t.dit_time, 0.06, epsilon = 1e-12);
        assert_relative_eq!(t.element_space, 0.06, epsilon = 1e-12);
        assert_abs_diff_eq!(t.char_space, 0.18 + 3.0 * extra_per_unit, epsilon = 1e-9);
        assert_abs_diff_eq!(t.word_space, 0.42 + 7.0 * extra_per_unit, epsilon = 1e-9);
        assert_abs_diff_eq!(t.char_space, 0.6537, epsilon = 1e-4);
        assert_abs_diff_eq!(t.word_space, 1.5253, epsilon = 1e-4);
        assert!(t.is_farnsworth());
    }

    #[test]
    fn test_farnsworth_is_monotonic_in_eff_speed() {
        let base = TimingConfig::standard(25.0);
        let mut previous = base;
        for eff in (5..25).rev() {
            let t = TimingConfig::new(25.0, eff as f64);
            assert!(t.char_space > previous.char_space, "eff {eff}");
            assert!(t.word_space > previous.word_space, "eff {eff}");
            assert_abs_diff_eq!(t.dit_time, base.dit_time, epsilon = 1e-12);
            assert_abs_diff_eq!(t.dah_time, base.dah_time, epsilon = 1e-12);
            assert_abs_diff_eq!(t.element_space, base.element_space, epsilon = 1e-12);
            assert!(t.element_space <= t.char_space && t.char_space <= t.word_space);
            previous = t;
        }
    }

    #[test]
    fn test_eff_speed_at_or_above_char_speed_is_standard() {
        assert_eq!(TimingConfig::new(20.0, 20.0), TimingConfig::standard(20.0));
        assert_eq!(TimingConfig::new(20.0, 35.0), TimingConfig::standard(20.0));
    }

    #[test]
    fn test_out_of_range_speeds_are_clamped() {
        assert_eq!(TimingConfig::new(0.0, 0.0), TimingConfig::standard(5.0));
        assert_eq!(TimingConfig::new(500.0, -3.0), TimingConfig::standard(50.0));
        assert_eq!(TimingConfig::new(f64::NAN, 0.0), TimingConfig::standard(5.0));
    }

    #[test]
    fn test_tiny_eff_speed_is_raised_to_minimum() {
        let floor = TimingConfig::new(20.0, MIN_CHAR_SPEED);
        assert_eq!(TimingConfig::new(20.0, 0.001), floor);
        assert_eq!(TimingConfig::new(20.0, 3.0), floor);
        assert!(floor.word_space < 5.0);
        assert_eq!(clamp_eff_speed(0.0), 0.0);
        assert_eq!(clamp_eff_speed(0.5), MIN_CHAR_SPEED);
        assert_eq!(clamp_eff_speed(12.0), 12.0);
        assert_eq!(clamp_eff_speed(f64::NAN), 0.0);
    }

    #[test]
    fn test_estimates() {
        let t = TimingConfig::standard(20.0);
        // 3 elements * 0.12 average + 2 gaps * 0.06
        assert_relative_eq!(t.estimate_char_duration(), 0.48, epsilon = 1e-12);
        assert_relative_eq!(
            t.estimate_text_duration(10, 2),
            10.0 * 0.48 + 8.0 * 0.18 + 0.42,
            epsilon = 1e-9
        );
        assert_eq!(t.estimate_text_duration(0, 0), 0.0);
        // 5-char group: 2.4 + 0.72 + 0.42 = 3.54s
        assert_eq!(t.estimate_group_count(60.0, 5.0), 17);
        assert_eq!(t.estimate_group_count(0.0, 5.0), 1);
        assert_eq!(t.estimate_group_count(1.0, 5.0), 1);
    }
}
