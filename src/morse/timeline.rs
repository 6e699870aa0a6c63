//! Keying timeline: the single source of truth for playback duration,
//! audio scheduling and the visual waveform.

use super::encoder::{self, MorseElement};
use super::timing::TimingConfig;

/// Length of each click-free keying edge
pub const FADE_DURATION: f64 = 0.005;

/// Silence before the first element
pub const LEAD_IN: f64 = 0.05;

/// One timestamped entry in a timeline
#[derive(Clone, Debug, PartialEq)]
pub enum KeyEvent {
    /// Envelope reaches `value` at `time`
    Envelope { time: f64, value: f32 },
    /// A character starts keying at `time`; `index` is its position in the
    /// source text, counted in chars
    CharBoundary { time: f64, ch: char, index: usize },
}

impl KeyEvent {
    pub fn time(&self) -> f64 {
        match self {
            KeyEvent::Envelope { time, .. } | KeyEvent::CharBoundary { time, .. } => *time,
        }
    }

    pub fn envelope_value(&self) -> Option<f32> {
        match self {
            KeyEvent::Envelope { value, .. } => Some(*value),
            KeyEvent::CharBoundary { .. } => None,
        }
    }
}

/// Ordered keying events, always ending in silence
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Timeline {
    events: Vec<KeyEvent>,
}

impl Timeline {
    pub fn events(&self) -> &[KeyEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Time of the last event
    pub fn duration(&self) -> f64 {
        self.events.last().map(KeyEvent::time).unwrap_or(0.0)
    }

    /// Envelope events only, in order
    pub fn envelope_events(&self) -> impl Iterator<Item = (f64, f32)> + '_ {
        self.events
            .iter()
            .filter_map(|e| e.envelope_value().map(|v| (e.time(), v)))
    }

    /// Envelope level at `time`, interpolating linearly across fade edges
    pub fn envelope_value_at(&self, time: f64) -> f32 {
        let mut before: Option<(f64, f32)> = None;
        for (t, v) in self.envelope_events() {
            if t > time {
                return match before {
                    Some((t0, v0)) if t > t0 => v0 + (v - v0) * ((time - t0) / (t - t0)) as f32,
                    Some((_, v0)) => v0,
                    None => 0.0,
                };
            }
            before = Some((t, v));
        }
        before.map(|(_, v)| v).unwrap_or(0.0)
    }

    /// The character being keyed (or last keyed) at `time`
    pub fn char_at(&self, time: f64) -> Option<(char, usize)> {
        self.events
            .iter()
            .take_while(|e| e.time() <= time)
            .filter_map(|e| match e {
                KeyEvent::CharBoundary { ch, index, .. } => Some((*ch, *index)),
                KeyEvent::Envelope { .. } => None,
            })
            .last()
    }
}

/// A character that survives normalization, with its source position
#[derive(Clone, Copy, Debug, PartialEq)]
enum Token {
    Char { ch: char, index: usize },
    Space,
}

/// Drop characters without a mapping; whitespace becomes a word gap.
fn tokenize(text: &str) -> Vec<Token> {
    text.chars()
        .enumerate()
        .filter_map(|(index, ch)| {
            if ch.is_whitespace() {
                Some(Token::Space)
            } else if encoder::is_supported(ch) {
                Some(Token::Char {
                    ch: ch.to_ascii_uppercase(),
                    index,
                })
            } else {
                None
            }
        })
        .collect()
}

/// Build the keying timeline for `text`. Pure: the same inputs always give
/// the same events.
pub fn build_timeline(text: &str, timing: &TimingConfig) -> Timeline {
    let tokens = tokenize(text);
    let mut events = Vec::new();
    let mut t = LEAD_IN;

    for (pos, token) in tokens.iter().enumerate() {
        let (ch, index) = match *token {
            Token::Space => {
                t += timing.word_space;
                continue;
            }
            Token::Char { ch, index } => (ch, index),
        };
        let Some(elements) = encoder::char_to_elements(ch) else {
            continue;
        };

        events.push(KeyEvent::CharBoundary { time: t, ch, index });

        for (elem_idx, element) in elements.iter().enumerate() {
            let duration = element_duration(*element, timing);
            push_keyed_element(&mut events, t, duration);
            t += duration;
            if elem_idx < elements.len() - 1 {
                t += timing.element_space;
            }
        }

        let next_is_space = matches!(tokens.get(pos + 1), Some(Token::Space));
        if !next_is_space {
            t += timing.char_space;
        }
    }

    events.push(KeyEvent::Envelope { time: t, value: 0.0 });

    Timeline { events }
}

fn element_duration(element: MorseElement, timing: &TimingConfig) -> f64 {
    match element {
        MorseElement::Dit => timing.dit_time,
        MorseElement::Dah => timing.dah_time,
    }
}

/// Fade in, optional sustain plateau, fade out
fn push_keyed_element(events: &mut Vec<KeyEvent>, start: f64, duration: f64) {
    let fade = FADE_DURATION.min(duration / 2.0);
    let end = start + duration;

    events.push(KeyEvent::Envelope {
        time: start,
        value: 0.0,
    });
    events.push(KeyEvent::Envelope {
        time: start + fade,
        value: 1.0,
    });
    if duration > 2.0 * FADE_DURATION {
        events.push(KeyEvent::Envelope {
            time: end - fade,
            value: 1.0,
        });
    }
    events.push(KeyEvent::Envelope {
        time: end,
        value: 0.0,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn boundaries(timeline: &Timeline) -> Vec<(char, usize)> {
        timeline
            .events()
            .iter()
            .filter_map(|e| match e {
                KeyEvent::CharBoundary { ch, index, .. } => Some((*ch, *index)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_k_at_twenty_wpm() {
        let timing = TimingConfig::standard(20.0);
        let timeline = build_timeline("K", &timing);

        // -.- keyed + gaps, then the trailing character space
        let keyed = 0.18 + 0.06 + 0.06 + 0.06 + 0.18;
        assert_abs_diff_eq!(keyed, 0.54, epsilon = 1e-12);
        assert_abs_diff_eq!(timeline.duration(), LEAD_IN + keyed + 0.18, epsilon = 1e-9);

        // boundary + 3 elements * 4 events + trailing silence
        assert_eq!(timeline.events().len(), 1 + 12 + 1);
        assert_eq!(boundaries(&timeline), vec![('K', 0)]);
    }

    #[test]
    fn test_fade_edges_bracket_each_element() {
        let timing = TimingConfig::standard(20.0);
        let timeline = build_timeline("E", &timing);
        let env: Vec<(f64, f32)> = timeline.envelope_events().collect();

        assert_eq!(env.len(), 5);
        assert_abs_diff_eq!(env[0].0, LEAD_IN, epsilon = 1e-12);
        assert_eq!(env[0].1, 0.0);
        assert_abs_diff_eq!(env[1].0 - env[0].0, FADE_DURATION, epsilon = 1e-12);
        assert_eq!(env[1].1, 1.0);
        assert_eq!(env[2].1, 1.0);
        assert_abs_diff_eq!(env[3].0 - env[2].0, FADE_DURATION, epsilon = 1e-12);
        assert_eq!(env[3].1, 0.0);
        assert_eq!(env[4].1, 0.0);
    }

    #[test]
    fn test_short_element_omits_plateau() {
        let timing = TimingConfig {
            dit_time: 0.008,
            dah_time: 0.024,
            element_space: 0.008,
            char_space: 0.024,
            word_space: 0.056,
        };
        let timeline = build_timeline("E", &timing);
        let env: Vec<(f64, f32)> = timeline.envelope_events().collect();

        // fade in start, peak, fade out end, trailing silence
        assert_eq!(env.len(), 4);
        assert_abs_diff_eq!(env[1].0 - env[0].0, 0.004, epsilon = 1e-12);
        assert_abs_diff_eq!(env[2].0 - env[1].0, 0.004, epsilon = 1e-12);
    }

    #[test]
    fn test_word_space_replaces_char_space() {
        let timing = TimingConfig::standard(20.0);
        let joined = build_timeline("EE", &timing).duration();
        let spaced = build_timeline("E E", &timing).duration();
        assert_abs_diff_eq!(
            spaced - joined,
            timing.word_space - timing.char_space,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_unsupported_chars_are_skipped() {
        let timing = TimingConfig::standard(20.0);
        let clean = build_timeline("KM", &timing);
        let noisy = build_timeline("K#M", &timing);
        assert_abs_diff_eq!(clean.duration(), noisy.duration(), epsilon = 1e-12);
        assert_eq!(boundaries(&noisy), vec![('K', 0), ('M', 2)]);
    }

    #[test]
    fn test_lowercase_is_keyed() {
        let timing = TimingConfig::standard(20.0);
        assert_eq!(
            build_timeline("paris", &timing).duration(),
            build_timeline("PARIS", &timing).duration()
        );
    }

    #[test]
    fn test_empty_text_is_trailing_silence_only() {
        let timeline = build_timeline("", &TimingConfig::standard(20.0));
        assert_eq!(
            timeline.events(),
            &[KeyEvent::Envelope {
                time: LEAD_IN,
                value: 0.0
            }]
        );
    }

    #[test]
    fn test_deterministic_and_ordered() {
        let timing = TimingConfig::new(18.0, 8.0);
        let text = "CQ CQ DE K1ABC/P = 73?";
        let a = build_timeline(text, &timing);
        let b = build_timeline(text, &timing);
        assert_eq!(a, b);

        let times: Vec<f64> = a.events().iter().map(KeyEvent::time).collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(a.events().last().and_then(KeyEvent::envelope_value), Some(0.0));
    }

    #[test]
    fn test_envelope_value_at() {
        let timing = TimingConfig::standard(20.0);
        let timeline = build_timeline("T", &timing);
        assert_eq!(timeline.envelope_value_at(0.0), 0.0);
        assert_abs_diff_eq!(
            timeline.envelope_value_at(LEAD_IN + FADE_DURATION / 2.0),
            0.5,
            epsilon = 1e-6
        );
        assert_eq!(timeline.envelope_value_at(LEAD_IN + 0.1), 1.0);
        assert_abs_diff_eq!(
            timeline.envelope_value_at(LEAD_IN + 0.18 - FADE_DURATION / 4.0),
            0.25,
            epsilon = 1e-6
        );
        assert_eq!(timeline.envelope_value_at(timeline.duration() + 1.0), 0.0);
    }

    #[test]
    fn test_char_at() {
        let timing = TimingConfig::standard(20.0);
        let timeline = build_timeline("K M", &timing);
        assert_eq!(timeline.char_at(0.0), None);
        assert_eq!(timeline.char_at(LEAD_IN), Some(('K', 0)));
        assert_eq!(timeline.char_at(timeline.duration()), Some(('M', 2)));
    }
}
