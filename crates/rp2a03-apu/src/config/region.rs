use core::fmt;

use crate::apu::tables::{
    DMC_RATE_TABLE_NTSC, DMC_RATE_TABLE_PAL, NOISE_PERIOD_TABLE_NTSC, NOISE_PERIOD_TABLE_PAL,
};

/// Console timing profile.
///
/// Everything region-dependent in the APU is resolved through this type: the
/// CPU clock that drives the timers, the frame sequencer length and the noise
/// and DMC period tables.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Region {
    /// North American / Japanese NTSC timing.
    #[default]
    Ntsc,
    /// European PAL timing.
    Pal,
}

impl Region {
    /// CPU clock in Hz. The APU is driven in CPU cycles.
    pub const fn cpu_clock_hz(self) -> u32 {
        match self {
            Region::Ntsc => 1_789_773,
            Region::Pal => 1_662_607,
        }
    }

    /// Length of a full four-step frame sequence in CPU cycles.
    pub const fn four_step_period(self) -> u32 {
        match self {
            Region::Ntsc => 29_830,
            Region::Pal => 33_254,
        }
    }

    /// Length of a full five-step frame sequence in CPU cycles.
    pub const fn five_step_period(self) -> u32 {
        match self {
            Region::Ntsc => 37_282,
            Region::Pal => 41_566,
        }
    }

    pub(crate) const fn noise_periods(self) -> &'static [u16; 16] {
        match self {
            Region::Ntsc => &NOISE_PERIOD_TABLE_NTSC,
            Region::Pal => &NOISE_PERIOD_TABLE_PAL,
        }
    }

    pub(crate) const fn dmc_rates(self) -> &'static [u16; 16] {
        match self {
            Region::Ntsc => &DMC_RATE_TABLE_NTSC,
            Region::Pal => &DMC_RATE_TABLE_PAL,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Region::Ntsc => "ntsc",
            Region::Pal => "pal",
        };
        f.write_str(s)
    }
}
