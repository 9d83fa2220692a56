//! One-pole output filters applied after the non-linear mixer.

use std::f32::consts::PI;

/// Pole of a one-pole IIR with the given cutoff.
pub(crate) fn pole_coeff(sample_rate: f32, cutoff_hz: f32) -> f32 {
    (-2.0 * PI * cutoff_hz / sample_rate).exp()
}

pub(crate) fn pole_alpha(sample_rate: f32, cutoff_hz: f32) -> f32 {
    1.0 - pole_coeff(sample_rate, cutoff_hz)
}

/// One-pole low-pass: `state += alpha * (input - state)`.
#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LowPass {
    alpha: f32,
    state: f32,
}

impl LowPass {
    pub(crate) fn new(sample_rate: f32, cutoff_hz: f32) -> Self {
        Self {
            alpha: pole_alpha(sample_rate, cutoff_hz),
            state: 0.0,
        }
    }

    pub(crate) fn process(&mut self, input: f32) -> f32 {
        self.state += (input - self.state) * self.alpha;
        self.state
    }
}

/// DC-blocking high-pass with a single running-average scalar.
///
/// `dc` tracks the slow component of the input and is subtracted from it.
#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DcBlocker {
    coefficient: f32,
    dc: f32,
}

impl DcBlocker {
    pub(crate) fn new(coefficient: f32) -> Self {
        Self {
            coefficient,
            dc: 0.0,
        }
    }

    pub(crate) fn process(&mut self, input: f32) -> f32 {
        self.dc = self.coefficient * self.dc + (1.0 - self.coefficient) * input;
        input - self.dc
    }

    #[cfg(test)]
    pub(crate) fn dc(&self) -> f32 {
        self.dc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_pass_settles_on_constant_input() {
        let mut lp = LowPass::new(44_100.0, 14_000.0);
        let out = (0..64).map(|_| lp.process(0.5)).last().unwrap_or_default();
        assert!((out - 0.5).abs() < 1e-4, "{out}");
    }

    #[test]
    fn low_pass_alpha_follows_cutoff() {
        let slow = pole_alpha(44_100.0, 1_000.0);
        let fast = pole_alpha(44_100.0, 14_000.0);
        assert!(slow > 0.0 && slow < fast && fast < 1.0);
    }

    #[test]
    fn dc_blocker_removes_offset() {
        let mut dc = DcBlocker::new(0.995);
        let out = (0..5_000).map(|_| dc.process(1.0)).last().unwrap_or(1.0);
        assert!(out.abs() < 1e-3, "{out}");
        assert!((dc.dc() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn dc_state_decays_on_silence() {
        let mut dc = DcBlocker::new(0.995);
        for _ in 0..100 {
            dc.process(0.8);
        }
        let charged = dc.dc().abs();
        for _ in 0..5_000 {
            dc.process(0.0);
        }
        assert!(dc.dc().abs() < charged * 1e-3);
    }
}
