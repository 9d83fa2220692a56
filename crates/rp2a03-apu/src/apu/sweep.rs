//! Sweep unit of the two pulse channels.
//!
//! Periods handled here are in CPU cycles (twice the 11-bit APU value), which
//! is why the mute thresholds read 16 and `0xFFE` rather than 8 and `0x7FF`.

use crate::{rational::Rational, timer::Timer};

const MIN_PERIOD: u16 = 16;
const MAX_TARGET: u16 = 0xFFE;

/// How a pulse unit negates its shifted period. Pulse 1 subtracts one extra
/// (one's complement), pulse 2 does not (two's complement).
#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Negation {
    OnesComplement,
    TwosComplement,
}

#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Sweep {
    negation: Negation,
    enabled: bool,
    negate: bool,
    shift: u8,
    period: u8,
    counter: u8,
    reload: bool,
}

impl Sweep {
    pub(crate) fn new(negation: Negation) -> Self {
        Self {
            negation,
            enabled: false,
            negate: false,
            shift: 0,
            period: 0,
            counter: 0,
            reload: false,
        }
    }

    /// Applies the sweep register and schedules a divider reload.
    pub(crate) fn write(&mut self, value: u8) {
        self.enabled = value & 0b1000_0000 != 0;
        self.period = (value >> 4) & 0b0000_0111;
        self.negate = value & 0b0000_1000 != 0;
        self.shift = value & 0b0000_0111;
        self.reload = true;
    }

    fn target_period(&self, current: u16) -> u16 {
        let delta = current >> self.shift;
        if !self.negate {
            return current + delta;
        }
        match self.negation {
            Negation::OnesComplement => current.saturating_sub(delta + 1),
            Negation::TwosComplement => current.saturating_sub(delta),
        }
    }

    /// Whether the channel is silenced at its current period. Evaluated even
    /// while the unit is disabled.
    pub(crate) fn muted(&self, timer: &Timer) -> bool {
        let current = current_period(timer);
        current < MIN_PERIOD || self.target_period(current) > MAX_TARGET
    }

    /// Half-frame clock. Muting only blocks the period write-back; the divider
    /// keeps counting either way.
    pub(crate) fn advance(&mut self, timer: &mut Timer) {
        if self.reload {
            self.reload = false;
            self.counter = self.period;
        }

        if self.counter == 0 {
            self.counter = self.period;
            if self.enabled && self.shift != 0 && !self.muted(timer) {
                let target = self.target_period(current_period(timer));
                timer.set_period(Rational::from_integer(i64::from(target)));
            }
        } else {
            self.counter -= 1;
        }
    }
}

fn current_period(timer: &Timer) -> u16 {
    timer.period().floor().clamp(0, i64::from(u16::MAX)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer(period: i64) -> Timer {
        Timer::new(Rational::from_integer(period))
    }

    fn run(sweep: &mut Sweep, timer: &mut Timer, clocks: usize) -> Vec<i64> {
        (0..clocks)
            .map(|_| {
                sweep.advance(timer);
                timer.period().floor()
            })
            .collect()
    }

    #[test]
    fn ones_complement_sweep_down() {
        let mut sweep = Sweep::new(Negation::OnesComplement);
        let mut timer = timer(64);
        // enabled, divider 3, negate, shift 2
        sweep.write(0b1011_1010);
        assert_eq!(
            run(&mut sweep, &mut timer, 8),
            vec![64, 64, 64, 47, 47, 47, 47, 35]
        );
    }

    #[test]
    fn twos_complement_sweep_down() {
        let mut sweep = Sweep::new(Negation::TwosComplement);
        let mut timer = timer(64);
        sweep.write(0b1011_1010);
        assert_eq!(
            run(&mut sweep, &mut timer, 8),
            vec![64, 64, 64, 48, 48, 48, 48, 36]
        );
    }

    #[test]
    fn sweep_up_adds_shifted_period() {
        let mut sweep = Sweep::new(Negation::TwosComplement);
        let mut timer = timer(100);
        // enabled, divider 0, shift 1
        sweep.write(0b1000_0001);
        assert_eq!(run(&mut sweep, &mut timer, 3), vec![150, 225, 337]);
    }

    #[test]
    fn mute_on_short_period() {
        let sweep = Sweep::new(Negation::OnesComplement);
        assert!(sweep.muted(&timer(14)));
        assert!(!sweep.muted(&timer(16)));
    }

    #[test]
    fn mute_on_overflowing_target_blocks_write_back() {
        let mut sweep = Sweep::new(Negation::TwosComplement);
        let mut timer = timer(0xC00);
        sweep.write(0b1000_0001); // target = 0x1200
        assert!(sweep.muted(&timer));
        assert_eq!(run(&mut sweep, &mut timer, 4), vec![0xC00; 4]);
    }

    #[test]
    fn zero_shift_leaves_period_alone() {
        let mut sweep = Sweep::new(Negation::OnesComplement);
        let mut timer = timer(200);
        sweep.write(0b1000_1000);
        assert_eq!(run(&mut sweep, &mut timer, 3), vec![200; 3]);
    }
}
