//! Frame sequencer responsible for clocking envelopes, length counters,
//! linear counters and sweep units at quarter- and half-frame intervals.
//!
//! Frame IRQ generation is not modelled: bit 6 of `$17` is accepted and
//! ignored, and the sequencer never raises the CPU interrupt line.

use tracing::debug;

use crate::{config::Region, rational::Rational, timer::Timer};

/// Frame sequencer timing mode.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrameSequencerMode {
    #[default]
    FourStep,
    FiveStep,
}

impl FrameSequencerMode {
    /// Decodes bit 7 of a `$17` write.
    pub fn from_register(value: u8) -> Self {
        if value & 0b1000_0000 == 0 {
            Self::FourStep
        } else {
            Self::FiveStep
        }
    }

    fn schedule(self) -> &'static [FrameTick] {
        match self {
            Self::FourStep => &FOUR_STEP,
            Self::FiveStep => &FIVE_STEP,
        }
    }
}

/// Which frame units to clock after a sequencer advance.
#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameTick {
    pub quarter: bool,
    pub half: bool,
}

impl FrameTick {
    const NONE: Self = Self::new(false, false);
    const QUARTER: Self = Self::new(true, false);
    const BOTH: Self = Self::new(true, true);

    pub const fn new(quarter: bool, half: bool) -> Self {
        Self { quarter, half }
    }

    pub fn any(&self) -> bool {
        self.quarter || self.half
    }

    fn merge(self, other: Self) -> Self {
        Self::new(self.quarter || other.quarter, self.half || other.half)
    }
}

const FOUR_STEP: [FrameTick; 4] = [
    FrameTick::BOTH,
    FrameTick::QUARTER,
    FrameTick::BOTH,
    FrameTick::QUARTER,
];

const FIVE_STEP: [FrameTick; 5] = [
    FrameTick::BOTH,
    FrameTick::QUARTER,
    FrameTick::BOTH,
    FrameTick::NONE,
    FrameTick::BOTH,
];

#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct FrameSequencer {
    region: Region,
    mode: FrameSequencerMode,
    step: usize,
    timer: Timer,
    /// Set by a switch into five-step mode; the next advance reports a full
    /// quarter+half tick once, whatever the table says.
    force_tick: bool,
}

impl FrameSequencer {
    pub(crate) fn new(region: Region) -> Self {
        let mode = FrameSequencerMode::default();
        Self {
            region,
            mode,
            step: 0,
            timer: Timer::new(step_period(region, mode)),
            force_tick: false,
        }
    }

    pub(crate) fn mode(&self) -> FrameSequencerMode {
        self.mode
    }

    #[cfg(test)]
    pub(crate) fn step(&self) -> usize {
        self.step
    }

    /// Handles a `$17` write: selects the mode, restarts the step table and
    /// keeps the divider phase.
    pub(crate) fn set_mode(&mut self, mode: FrameSequencerMode) {
        debug!(from = ?self.mode, to = ?mode, "frame sequencer mode switch");
        self.mode = mode;
        self.step = 0;
        self.timer.set_period(step_period(self.region, mode));
        self.force_tick = mode == FrameSequencerMode::FiveStep;
    }

    pub(crate) fn tick_pending(&self) -> bool {
        self.force_tick
    }

    pub(crate) fn cycles_until_tick(&self) -> Option<u64> {
        self.timer.cycles_until_tick()
    }

    /// Feeds `cycles` into the divider and reports the frame units to clock.
    ///
    /// Callers are expected to stop on every step edge, as the APU does. If
    /// several steps elapse in one call anyway, their ticks are merged into
    /// one as a fallback and the per-step order is lost.
    pub(crate) fn advance(&mut self, cycles: u64) -> FrameTick {
        let mut tick = if core::mem::take(&mut self.force_tick) {
            FrameTick::BOTH
        } else {
            FrameTick::NONE
        };

        let fired = self.timer.advance(cycles);
        if fired == 0 {
            return tick;
        }

        let schedule = self.mode.schedule();
        for offset in 0..fired.min(schedule.len() as u64) as usize {
            tick = tick.merge(schedule[(self.step + offset) % schedule.len()]);
        }
        self.step = (self.step + (fired % schedule.len() as u64) as usize) % schedule.len();
        tick
    }
}

fn step_period(region: Region, mode: FrameSequencerMode) -> Rational {
    match mode {
        FrameSequencerMode::FourStep => Rational::new(i64::from(region.four_step_period()), 4),
        FrameSequencerMode::FiveStep => Rational::new(i64::from(region.five_step_period()), 5),
    }
}
