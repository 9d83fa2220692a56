use thiserror::Error;

/// Errors raised while configuring or persisting an [`Apu`](crate::Apu).
///
/// Register writes and cycle advancement never fail; only construction and
/// save-state handling can.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("sample rate {sample_rate} Hz must be non-zero and at most half the {cpu_clock_hz} Hz CPU clock")]
    InvalidSampleRate { sample_rate: u32, cpu_clock_hz: u32 },

    #[error("low-pass cutoff {cutoff_hz} Hz must be positive and below Nyquist ({nyquist_hz} Hz)")]
    InvalidCutoff { cutoff_hz: f32, nyquist_hz: f32 },

    #[error("DC blocker coefficient {0} must lie strictly between 0 and 1")]
    InvalidDcCoefficient(f32),

    #[error("save state error: {0}")]
    State(String),
}

pub type Result<T> = core::result::Result<T, Error>;
