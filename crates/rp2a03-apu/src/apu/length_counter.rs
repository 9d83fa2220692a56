//! Length counter shared by the pulse, triangle and noise channels.

use tracing::trace;

use super::tables::LENGTH_TABLE;

#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct LengthCounter {
    enabled: bool,
    halt: bool,
    /// Table value of the last accepted load.
    configured_length: u8,
    remaining: u8,
}

impl LengthCounter {
    /// Follows the channel's bit in `$15`. Every write clears both the
    /// configured and the remaining length, even when the bit is unchanged.
    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.configured_length = 0;
        self.remaining = 0;
    }

    pub(crate) fn set_halt(&mut self, halt: bool) {
        self.halt = halt;
    }

    #[cfg(test)]
    pub(crate) fn halted(&self) -> bool {
        self.halt
    }

    /// Loads the counter from the 5-bit table index. Ignored while disabled.
    pub(crate) fn load(&mut self, index: u8) {
        if !self.enabled {
            trace!(index, "length load ignored while channel disabled");
            return;
        }
        self.configured_length = LENGTH_TABLE[(index & 0x1F) as usize];
        self.remaining = self.configured_length;
    }

    /// Half-frame clock.
    pub(crate) fn clock(&mut self) {
        if self.remaining > 0 && !self.halt {
            self.remaining -= 1;
            if self.remaining == 0 {
                trace!(configured = self.configured_length, "length counter expired");
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn configured_length(&self) -> u8 {
        self.configured_length
    }

    #[cfg(test)]
    pub(crate) fn remaining(&self) -> u8 {
        self.remaining
    }

    pub(crate) fn active(&self) -> bool {
        self.remaining > 0
    }

    /// Whether the owning channel should be forced silent. An exhausted
    /// counter only silences when it is not halted.
    pub(crate) fn silences(&self) -> bool {
        !self.enabled || (self.remaining == 0 && !self.halt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled() -> LengthCounter {
        let mut counter = LengthCounter::default();
        counter.set_enabled(true);
        counter
    }

    #[test]
    fn load_ignored_while_disabled() {
        let mut counter = LengthCounter::default();
        counter.load(1);
        assert_eq!(counter.configured_length(), 0);
        assert_eq!(counter.remaining(), 0);
        assert!(counter.silences());

        let mut counter = enabled();
        counter.load(3);
        counter.set_enabled(false);
        counter.load(1);
        assert_eq!(counter.configured_length(), 0);
        assert_eq!(counter.remaining(), 0);
    }

    #[test]
    fn load_uses_length_table() {
        let mut counter = enabled();
        counter.load(1);
        assert_eq!(counter.remaining(), 254);
        assert_eq!(counter.configured_length(), 254);
        counter.load(0b11111);
        assert_eq!(counter.remaining(), 30);
        assert_eq!(counter.configured_length(), 30);
    }

    #[test]
    fn clock_counts_down_unless_halted() {
        let mut counter = enabled();
        counter.load(3); // 2
        counter.clock();
        assert_eq!(counter.remaining(), 1);
        counter.set_halt(true);
        counter.clock();
        assert_eq!(counter.remaining(), 1);
        counter.set_halt(false);
        counter.clock();
        counter.clock();
        assert_eq!(counter.remaining(), 0);
        assert!(counter.silences());
    }

    #[test]
    fn every_enable_write_resets_counter() {
        let mut counter = enabled();
        counter.load(1);
        counter.clock();
        assert_eq!(counter.remaining(), 253);
        counter.set_enabled(true);
        assert_eq!(counter.configured_length(), 0);
        assert_eq!(counter.remaining(), 0);

        counter.load(1);

        counter.set_enabled(false);
        assert_eq!(counter.remaining(), 0);
        counter.set_enabled(true);
        assert_eq!(counter.remaining(), 0);
    }

    #[test]
    fn halted_counter_keeps_channel_audible_when_exhausted() {
        let mut counter = enabled();
        counter.set_halt(true);
        assert_eq!(counter.remaining(), 0);
        assert!(!counter.silences());
    }
}
