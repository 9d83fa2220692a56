//! Non-linear channel mixer followed by the low-pass / DC-block chain.

use crate::{
    audio::{
        AudioChannel,
        filters::{DcBlocker, LowPass},
    },
    config::ApuConfig,
};

/// Raw channel amplitudes indexed by [`AudioChannel::idx`].
pub type ChannelLevels = [u8; AudioChannel::COUNT];

#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Mixer {
    lowpass: LowPass,
    dc_blocker: DcBlocker,
}

impl Mixer {
    pub(crate) fn new(config: &ApuConfig) -> Self {
        Self {
            lowpass: LowPass::new(config.sample_rate as f32, config.lowpass_cutoff_hz),
            dc_blocker: DcBlocker::new(config.dc_coefficient),
        }
    }

    /// Runs one mixed sample through the filter chain, advancing its state.
    pub(crate) fn sample(&mut self, levels: &ChannelLevels) -> f32 {
        let mixed = mix(levels);
        let smoothed = self.lowpass.process(mixed);
        self.dc_blocker.process(smoothed)
    }

    #[cfg(test)]
    pub(crate) fn dc_state(&self) -> f32 {
        self.dc_blocker.dc()
    }
}

/// Combines channel amplitudes with the NESdev non-linear approximation,
/// before any filtering.
pub fn mix(levels: &ChannelLevels) -> f32 {
    let level = |ch: AudioChannel| f32::from(levels[ch.idx()]);

    let square = level(AudioChannel::Pulse1) + level(AudioChannel::Pulse2);
    let square_out = if square > 0.0 {
        95.88 / (8128.0 / square + 100.0)
    } else {
        0.0
    };

    let triangle = level(AudioChannel::Triangle);
    let noise = level(AudioChannel::Noise);
    let dmc = level(AudioChannel::Dmc);
    let tnd_out = if triangle > 0.0 || noise > 0.0 || dmc > 0.0 {
        159.79 / (1.0 / (triangle / 8227.0 + noise / 12241.0 + dmc / 22638.0) + 100.0)
    } else {
        0.0
    };

    square_out + tnd_out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels(p1: u8, p2: u8, t: u8, n: u8, d: u8) -> ChannelLevels {
        [p1, p2, t, n, d]
    }

    #[test]
    fn silence_mixes_to_zero() {
        assert_eq!(mix(&levels(0, 0, 0, 0, 0)), 0.0);
    }

    #[test]
    fn pulse_group_formula() {
        let out = mix(&levels(15, 15, 0, 0, 0));
        let expected = 95.88 / (8128.0 / 30.0 + 100.0);
        assert!((out - expected).abs() < 1e-6);
    }

    #[test]
    fn tnd_group_formula() {
        let out = mix(&levels(0, 0, 15, 15, 127));
        let expected =
            159.79 / (1.0 / (15.0 / 8227.0 + 15.0 / 12241.0 + 127.0 / 22638.0) + 100.0);
        assert!((out - expected).abs() < 1e-6);
    }

    #[test]
    fn full_scale_stays_below_one() {
        let out = mix(&levels(15, 15, 15, 15, 127));
        assert!(out > 0.9 && out < 1.1, "{out}");
    }

    #[test]
    fn dc_state_converges_on_silence() {
        let mut mixer = Mixer::new(&ApuConfig::default());
        for _ in 0..200 {
            mixer.sample(&levels(15, 0, 15, 0, 64));
        }
        assert!(mixer.dc_state() > 0.0);

        let last = (0..10_000)
            .map(|_| mixer.sample(&levels(0, 0, 0, 0, 0)))
            .last()
            .unwrap_or(f32::MAX);
        assert!(mixer.dc_state().abs() < 1e-6);
        assert!(last.abs() < 1e-6);
    }
}
