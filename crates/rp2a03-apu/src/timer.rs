//! Period divider shared by every channel, the frame sequencer and the
//! output sample clock.

use crate::rational::Rational;

/// Divider that converts elapsed CPU cycles into whole ticks.
///
/// `position` counts the cycles left until the next tick. Installing a new
/// period never touches `position`, so whatever fraction of the old period is
/// still in flight drains first and the new period only governs the ticks
/// after it.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timer {
    period: Rational,
    position: Rational,
}

impl Timer {
    /// Shortest period that still produces ticks. Anything below parks the
    /// timer instead of aliasing or dividing by zero.
    pub const MIN_PERIOD: Rational = Rational::from_integer(2);

    /// Largest cycle count applied in one step, keeping the rational
    /// arithmetic well inside `i64`.
    const MAX_STEP: u64 = u32::MAX as u64;

    pub fn new(period: Rational) -> Self {
        Self {
            period,
            position: period,
        }
    }

    pub fn period(&self) -> Rational {
        self.period
    }

    /// Installs a new period for future ticks.
    pub fn set_period(&mut self, period: Rational) {
        self.period = period;
    }

    /// Cycles still owed before the next tick fires.
    pub fn position(&self) -> Rational {
        self.position
    }

    pub fn is_running(&self) -> bool {
        self.period >= Self::MIN_PERIOD
    }

    /// Consumes `cycles` and returns how many ticks elapsed.
    pub fn advance(&mut self, cycles: u64) -> u64 {
        if !self.is_running() {
            return 0;
        }

        let mut remaining = cycles;
        let mut ticks = 0;
        while remaining > 0 {
            let chunk = remaining.min(Self::MAX_STEP);
            ticks += self.advance_chunk(i64::try_from(chunk).unwrap_or(i64::MAX));
            remaining -= chunk;
        }
        ticks
    }

    /// Whole cycles until the next tick, or `None` while parked.
    pub fn cycles_until_tick(&self) -> Option<u64> {
        if !self.is_running() {
            return None;
        }
        Some(self.position.ceil().max(1) as u64)
    }

    fn advance_chunk(&mut self, cycles: i64) -> u64 {
        self.position -= Rational::from_integer(cycles);
        if self.position > Rational::ZERO {
            return 0;
        }

        // Solve for the tick count directly instead of looping once per period.
        let ticks = (-self.position / self.period).floor() + 1;
        self.position += self.period * Rational::from_integer(ticks);
        ticks as u64
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new(Self::MIN_PERIOD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycles(n: i64) -> Rational {
        Rational::from_integer(n)
    }

    #[test]
    fn first_tick_lands_after_one_period() {
        let mut timer = Timer::new(cycles(4));
        assert_eq!(timer.advance(3), 0);
        assert_eq!(timer.advance(1), 1);
        assert_eq!(timer.advance(3), 0);
        assert_eq!(timer.advance(1), 1);
    }

    #[test]
    fn multi_tick_jump_in_one_call() {
        let mut timer = Timer::new(cycles(16));
        assert_eq!(timer.advance(16 * 10 + 3), 10);
        assert_eq!(timer.position(), cycles(13));
    }

    #[test]
    fn fractional_period_does_not_drift() {
        let mut timer = Timer::new(Rational::new(29830, 4));
        let total: u64 = (0..4).map(|_| timer.advance(7457)).sum();
        // Four steps of 7457.5 need 29830 cycles, so 29828 leaves one owed.
        assert_eq!(total, 3);
        assert_eq!(timer.advance(2), 1);
        assert_eq!(timer.position(), Rational::new(29830, 4));
    }

    #[test]
    fn period_change_keeps_in_flight_phase() {
        let mut timer = Timer::new(cycles(16));
        assert_eq!(timer.advance(1), 0);
        timer.set_period(cycles(4));
        assert_eq!(timer.position(), cycles(15));

        let ticks: Vec<u64> = (0..23).map(|_| timer.advance(1)).collect();
        // 15 cycles drain the old period before the new one takes over.
        let fired: Vec<usize> = ticks
            .iter()
            .enumerate()
            .filter(|(_, t)| **t == 1)
            .map(|(i, _)| i + 1)
            .collect();
        assert_eq!(fired, vec![15, 19, 23]);
    }

    #[test]
    fn chunking_does_not_change_tick_count() {
        let mut whole = Timer::new(Rational::new(596_591, 14_700));
        let mut split = whole;
        let a = whole.advance(100);
        let b = split.advance(40) + split.advance(60);
        assert_eq!(a, b);
        assert_eq!(whole, split);
    }

    #[test]
    fn short_period_parks_timer() {
        let mut timer = Timer::new(cycles(8));
        timer.advance(3);
        timer.set_period(cycles(1));
        assert!(!timer.is_running());
        assert_eq!(timer.advance(1000), 0);
        assert_eq!(timer.cycles_until_tick(), None);
        assert_eq!(timer.position(), cycles(5));

        timer.set_period(cycles(8));
        assert_eq!(timer.cycles_until_tick(), Some(5));
    }

    #[test]
    fn cycles_until_tick_rounds_up_fractions() {
        let mut timer = Timer::new(Rational::new(81, 2));
        assert_eq!(timer.cycles_until_tick(), Some(41));
        assert_eq!(timer.advance(40), 0);
        assert_eq!(timer.cycles_until_tick(), Some(1));
        assert_eq!(timer.advance(1), 1);
    }

    #[test]
    fn huge_jump_is_applied_in_steps() {
        let period = 1u64 << 20;
        let mut timer = Timer::new(cycles(1 << 20));
        let jump = 3 * u64::from(u32::MAX) + 5;
        let ticks = timer.advance(jump);
        assert_eq!(ticks, jump / period);
        let owed = (ticks + 1) * period - jump;
        assert_eq!(timer.position(), cycles(owed as i64));
    }
}
