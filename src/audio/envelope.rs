use std::collections::VecDeque;

/// One scheduled change of the keying envelope, in device-clock seconds
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Automation {
    /// Jump to `value` at `time`
    SetValueAt { time: f64, value: f32 },
    /// Ramp linearly from the previous point, reaching `value` at `time`
    LinearRampTo { time: f64, value: f32 },
}

impl Automation {
    pub fn time(&self) -> f64 {
        match self {
            Automation::SetValueAt { time, .. } | Automation::LinearRampTo { time, .. } => *time,
        }
    }

    pub fn value(&self) -> f32 {
        match self {
            Automation::SetValueAt { value, .. } | Automation::LinearRampTo { value, .. } => *value,
        }
    }
}

/// Envelope gain driven by a queue of timed automation points.
///
/// Rendering calls [`EnvelopeParam::advance`] once per sample with the
/// device clock; every point whose time has passed is applied and a pending
/// ramp interpolates from the last applied point (or from the value given
/// to [`EnvelopeParam::set_immediate`]).
#[derive(Clone, Debug)]
pub struct EnvelopeParam {
    value: f32,
    anchor_time: f64,
    anchor_value: f32,
    pending: VecDeque<Automation>,
}

impl Default for EnvelopeParam {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvelopeParam {
    pub fn new() -> Self {
        Self {
            value: 0.0,
            anchor_time: 0.0,
            anchor_value: 0.0,
            pending: VecDeque::new(),
        }
    }

    /// Current output value
    pub fn value(&self) -> f32 {
        self.value
    }

    #[cfg(test)]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn set_value_at(&mut self, time: f64, value: f32) {
        self.insert(Automation::SetValueAt { time, value });
    }

    pub fn linear_ramp_to(&mut self, time: f64, value: f32) {
        self.insert(Automation::LinearRampTo { time, value });
    }

    /// Drop every pending point and jump to `value` at `now`
    pub fn set_immediate(&mut self, value: f32, now: f64) {
        self.pending.clear();
        self.value = value;
        self.anchor_time = now;
        self.anchor_value = value;
    }

    /// Move the envelope to device time `time` and return its value
    pub fn advance(&mut self, time: f64) -> f32 {
        while let Some(point) = self.pending.front().copied() {
            if point.time() > time {
                break;
            }
            self.pending.pop_front();
            self.value = point.value();
            self.anchor_time = point.time();
            self.anchor_value = point.value();
        }

        if let Some(Automation::LinearRampTo {
            time: end,
            value: target,
        }) = self.pending.front().copied()
        {
            let span = end - self.anchor_time;
            if span > 0.0 && time >= self.anchor_time {
                let frac = ((time - self.anchor_time) / span) as f32;
                self.value = self.anchor_value + (target - self.anchor_value) * frac;
            }
        }

        self.value
    }

    // Points arrive in time order from the scheduler; keep the queue sorted
    // if a caller submits one out of order.
    fn insert(&mut self, point: Automation) {
        let at = self.pending.partition_point(|p| p.time() <= point.time());
        self.pending.insert(at, point);
    }
}
