//! APU construction settings.

pub mod region;

pub use region::Region;

use crate::{
    audio::SampleSink,
    error::{Error, Result},
    rational::Rational,
};

/// Default host output rate.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
/// Cutoff of the output low-pass, approximating the console's analog stage.
pub const DEFAULT_LOWPASS_CUTOFF_HZ: f32 = 14_000.0;
/// Pole of the output DC blocker.
pub const DEFAULT_DC_COEFFICIENT: f32 = 0.995;

/// Settings fixed for the lifetime of an [`Apu`](crate::Apu).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApuConfig {
    /// Timing profile (CPU clock, frame sequencer and rate tables).
    pub region: Region,
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Low-pass cutoff in Hz, applied before the DC blocker.
    pub lowpass_cutoff_hz: f32,
    /// Feedback coefficient of the DC blocker.
    pub dc_coefficient: f32,
}

impl Default for ApuConfig {
    fn default() -> Self {
        Self {
            region: Region::Ntsc,
            sample_rate: DEFAULT_SAMPLE_RATE,
            lowpass_cutoff_hz: DEFAULT_LOWPASS_CUTOFF_HZ,
            dc_coefficient: DEFAULT_DC_COEFFICIENT,
        }
    }
}

impl ApuConfig {
    /// Default settings at the rate the sink asks for. Low rates pull the
    /// low-pass cutoff down to stay under Nyquist.
    pub fn for_sink<S: SampleSink + ?Sized>(sink: &S) -> Self {
        let sample_rate = sink.sample_rate();
        Self {
            sample_rate,
            lowpass_cutoff_hz: DEFAULT_LOWPASS_CUTOFF_HZ.min(sample_rate as f32 * 0.45),
            ..Self::default()
        }
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    /// CPU cycles per output sample, kept exact.
    pub fn cycles_per_sample(&self) -> Rational {
        Rational::new(
            i64::from(self.region.cpu_clock_hz()),
            i64::from(self.sample_rate.max(1)),
        )
    }

    pub fn validate(&self) -> Result<()> {
        let cpu_clock_hz = self.region.cpu_clock_hz();
        // The sample clock needs at least `Timer::MIN_PERIOD` cycles per tick.
        if self.sample_rate == 0 || u64::from(self.sample_rate) * 2 > u64::from(cpu_clock_hz) {
            return Err(Error::InvalidSampleRate {
                sample_rate: self.sample_rate,
                cpu_clock_hz,
            });
        }

        let nyquist_hz = self.sample_rate as f32 / 2.0;
        let cutoff_hz = self.lowpass_cutoff_hz;
        if !cutoff_hz.is_finite() || cutoff_hz <= 0.0 || cutoff_hz >= nyquist_hz {
            return Err(Error::InvalidCutoff {
                cutoff_hz,
                nyquist_hz,
            });
        }

        let coeff = self.dc_coefficient;
        if !(coeff > 0.0 && coeff < 1.0) {
            return Err(Error::InvalidDcCoefficient(coeff));
        }

        Ok(())
    }
}
