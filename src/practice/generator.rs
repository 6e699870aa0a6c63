//! Koch-method practice text: random groups drawn from the lesson's
//! characters, sized to fill a target listening time.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::config::PracticeSettings;
use crate::morse::encoder::difficulty_weight;
use crate::morse::timing::MAX_REFINEMENT_PASSES;
use crate::morse::{build_timeline, TimingConfig};

/// Order in which characters are introduced, one per lesson
pub const KOCH_ORDER: &[char] = &[
    'K', 'M', 'U', 'R', 'E', 'S', 'N', 'A', 'P', 'T', 'L', 'W', 'I', '.', 'J', 'Z', '=', 'F',
    'O', 'Y', ',', 'V', 'G', '5', '/', 'Q', '9', '2', 'H', '3', '8', 'B', '?', '4', '7', 'C',
    '1', 'D', '6', '0', 'X',
];

/// Characters taught up to `level`, never fewer than two
pub fn lesson_chars(level: usize) -> &'static [char] {
    let level = level.clamp(PracticeSettings::MIN_KOCH_LEVEL, KOCH_ORDER.len());
    &KOCH_ORDER[..level]
}

/// The character added by `level`
pub fn newest_char(level: usize) -> char {
    let chars = lesson_chars(level);
    chars[chars.len() - 1]
}

pub struct PracticeGenerator {
    rng: SmallRng,
}

impl Default for PracticeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl PracticeGenerator {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Repeatable output for a given seed
    #[cfg(test)]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Space-separated groups of lesson characters lasting roughly
    /// `target_seconds` when keyed with `timing`.
    ///
    /// Longer characters are drawn more often. The group count starts from
    /// the duration estimate and is corrected against the real timeline a
    /// few times.
    pub fn generate(&mut self, practice: &PracticeSettings, timing: &TimingConfig) -> String {
        let practice = practice.clamped(KOCH_ORDER.len());
        let chars = lesson_chars(practice.koch_level);
        let weights: Vec<f64> = chars.iter().map(|&ch| difficulty_weight(ch)).collect();
        let dist = match WeightedIndex::new(&weights) {
            Ok(dist) => dist,
            Err(e) => {
                log::error!("Invalid lesson weights: {}", e);
                return String::new();
            }
        };

        let count = timing.estimate_group_count(practice.target_seconds, practice.group_size as f64);
        log::debug!(
            "Estimated {} groups, about {:.1}s",
            count,
            timing.estimate_text_duration(count * practice.group_size, count)
        );
        let mut groups: Vec<String> = (0..count)
            .map(|_| self.group(chars, &dist, practice.group_size))
            .collect();

        for pass in 0..MAX_REFINEMENT_PASSES {
            let duration = build_timeline(&groups.join(" "), timing).duration();
            let per_group = duration / groups.len() as f64;
            let error = duration - practice.target_seconds;

            if error < -per_group / 2.0 {
                groups.push(self.group(chars, &dist, practice.group_size));
            } else if error > per_group / 2.0 && groups.len() > 1 {
                groups.pop();
            } else {
                break;
            }
            log::debug!(
                "Refinement pass {}: {:.1}s for {} groups",
                pass + 1,
                duration,
                groups.len()
            );
        }

        groups.join(" ")
    }

    fn group(&mut self, chars: &[char], dist: &WeightedIndex<f64>, size: usize) -> String {
        (0..size).map(|_| chars[dist.sample(&mut self.rng)]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morse::encoder;

    fn practice(level: usize) -> PracticeSettings {
        PracticeSettings {
            koch_level: level,
            group_size: 5,
            target_seconds: 60.0,
        }
    }

    #[test]
    fn test_koch_order_is_encodable_and_unique() {
        assert_eq!(KOCH_ORDER.len(), 41);
        for (i, ch) in KOCH_ORDER.iter().enumerate() {
            assert!(encoder::is_supported(*ch), "{} has no code", ch);
            assert!(!KOCH_ORDER[..i].contains(ch), "{} repeated", ch);
        }
    }

    #[test]
    fn test_lesson_chars() {
        assert_eq!(lesson_chars(0), &['K', 'M']);
        assert_eq!(lesson_chars(5), &['K', 'M', 'U', 'R', 'E']);
        assert_eq!(lesson_chars(500).len(), KOCH_ORDER.len());
        assert_eq!(newest_char(3), 'U');
    }

    #[test]
    fn test_groups_use_only_lesson_chars() {
        let mut generator = PracticeGenerator::seeded(7);
        let text = generator.generate(&practice(4), &TimingConfig::standard(20.0));
        let allowed = lesson_chars(4);
        for group in text.split(' ') {
            assert_eq!(group.chars().count(), 5);
            assert!(group.chars().all(|ch| allowed.contains(&ch)));
        }
    }

    #[test]
    fn test_same_seed_same_text() {
        let timing = TimingConfig::new(20.0, 10.0);
        let a = PracticeGenerator::seeded(42).generate(&practice(10), &timing);
        let b = PracticeGenerator::seeded(42).generate(&practice(10), &timing);
        assert_eq!(a, b);
    }

    #[test]
    fn test_duration_near_target() {
        let timing = TimingConfig::standard(20.0);
        let mut generator = PracticeGenerator::seeded(3);
        let text = generator.generate(&practice(2), &timing);
        let duration = build_timeline(&text, &timing).duration();
        assert!((duration - 60.0).abs() < 6.0, "got {:.2}s", duration);
    }

    #[test]
    fn test_tiny_target_still_yields_a_group() {
        let timing = TimingConfig::standard(5.0);
        let settings = PracticeSettings {
            koch_level: 2,
            group_size: 10,
            target_seconds: 5.0,
        };
        let text = PracticeGenerator::seeded(1).generate(&settings, &timing);
        assert_eq!(text.len(), 10);
    }
}
