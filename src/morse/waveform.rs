use super::timeline::Timeline;

/// Sample the keying envelope at fixed intervals for display.
///
/// Each tick holds the value of the most recent envelope event at or before
/// it (step-hold, no interpolation between fade edges). Ticks run from 0 to
/// the timeline duration, with the final tick landing exactly on the end.
pub fn sample(timeline: &Timeline, interval: f64) -> Vec<(f64, f32)> {
    if !(interval > 0.0) || timeline.is_empty() {
        return Vec::new();
    }

    let total = timeline.duration();
    let tick_count = (total / interval).ceil() as usize;
    let envelope: Vec<(f64, f32)> = timeline.envelope_events().collect();

    let mut samples: Vec<(f64, f32)> = Vec::with_capacity(tick_count + 1);
    let mut next_event = 0;
    let mut value = 0.0;

    for tick in 0..=tick_count {
        let time = (tick as f64 * interval).min(total);
        while next_event < envelope.len() && envelope[next_event].0 <= time {
            value = envelope[next_event].1;
            next_event += 1;
        }
        match samples.last_mut() {
            // rounding can land the clamped final tick on the previous one
            Some(last) if last.0 >= time => *last = (time, value),
            _ => samples.push((time, value)),
        }
    }

    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morse::timeline::{build_timeline, LEAD_IN};
    use crate::morse::timing::TimingConfig;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_last_sample_matches_duration() {
        let timing = TimingConfig::standard(20.0);
        for text in ["K", "PARIS", "CQ DE N0CALL", ""] {
            let timeline = build_timeline(text, &timing);
            let samples = sample(&timeline, 0.01);
            let (last_time, last_value) = *samples.last().unwrap();
            assert!((timeline.duration() - last_time).abs() <= 0.01, "{text}");
            assert_eq!(last_value, 0.0);
        }
    }

    #[test]
    fn test_step_hold_values() {
        let timing = TimingConfig::standard(20.0);
        let timeline = build_timeline("T", &timing);
        let samples = sample(&timeline, 0.01);

        assert_eq!(samples[0], (0.0, 0.0));
        // lead-in silence
        assert!(samples
            .iter()
            .filter(|(t, _)| *t < LEAD_IN)
            .all(|(_, v)| *v == 0.0));
        // middle of the dah is keyed
        let mid = samples
            .iter()
            .find(|(t, _)| *t >= LEAD_IN + 0.09)
            .unwrap();
        assert_eq!(mid.1, 1.0);
        // after the dah is silent
        let after = samples
            .iter()
            .find(|(t, _)| *t >= LEAD_IN + 0.2)
            .unwrap();
        assert_eq!(after.1, 0.0);
    }

    #[test]
    fn test_ticks_are_evenly_spaced() {
        let timeline = build_timeline("EE", &TimingConfig::standard(20.0));
        let samples = sample(&timeline, 0.005);
        for pair in samples.windows(2) {
            let step = pair[1].0 - pair[0].0;
            assert!(step > 0.0 && step <= 0.005 + 1e-12);
        }
        assert_abs_diff_eq!(samples.last().unwrap().0, timeline.duration(), epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_interval() {
        let timeline = build_timeline("E", &TimingConfig::standard(20.0));
        assert!(sample(&timeline, 0.0).is_empty());
        assert!(sample(&timeline, -1.0).is_empty());
        assert!(sample(&timeline, f64::NAN).is_empty());
        assert!(sample(&Timeline::default(), 0.01).is_empty());
    }
}
