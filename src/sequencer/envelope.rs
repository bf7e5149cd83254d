//! Attack/release envelope planning for a single note.

/// Attack-release envelope. Times are in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub attack_ms: f64,
    pub release_ms: f64,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            attack_ms: 2.0,
            release_ms: 20.0,
        }
    }
}

/// Absolute automation points for one note, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampPlan {
    pub start: f64,
    /// Peak reached at the end of the attack ramp.
    pub attack_end: f64,
    /// Peak held until the release ramp begins.
    pub release_start: f64,
    /// Back at zero.
    pub end: f64,
    pub peak: f64,
}

impl Envelope {
    /// Plan the ramps for a note starting at `start` lasting `duration` seconds.
    ///
    /// Neither ramp may take more than half the note, so short notes still
    /// reach silence by `start + duration`.
    pub fn plan(&self, start: f64, duration: f64, peak: f64) -> RampPlan {
        let half = duration / 2.0;
        let attack = (self.attack_ms / 1000.0).min(half).max(0.0);
        let release = (self.release_ms / 1000.0).min(half).max(0.0);
        RampPlan {
            start,
            attack_end: start + attack,
            release_start: start + duration - release,
            end: start + duration,
            peak,
        }
    }
}

impl RampPlan {
    /// Amplitude at absolute time `t`.
    ///
    /// - Before `start` and after `end`: 0.
    /// - `[start, attack_end)`: linear ramp from 0 to peak.
    /// - `[attack_end, release_start)`: peak.
    /// - `[release_start, end)`: linear ramp from peak to 0.
    pub fn amplitude(&self, t: f64) -> f64 {
        if t < self.start || t >= self.end {
            0.0
        } else if t < self.attack_end {
            self.peak * (t - self.start) / (self.attack_end - self.start)
        } else if t < self.release_start {
            self.peak
        } else {
            let span = self.end - self.release_start;
            if span <= 0.0 {
                0.0
            } else {
                self.peak * (self.end - t) / span
            }
        }
    }
}
