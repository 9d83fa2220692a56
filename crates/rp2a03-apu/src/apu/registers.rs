//! Per-channel shadow of the four raw register bytes.
//!
//! Some fields span two writes (the 11-bit timer period is split between the
//! low byte and the bottom of the length register), so each channel keeps the
//! last byte written to every slot and rebuilds derived values from here.

#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct RegisterShadow([u8; 4]);

impl RegisterShadow {
    pub(crate) fn store(&mut self, index: usize, value: u8) {
        self.0[index] = value;
    }

    pub(crate) fn raw(&self, index: usize) -> u8 {
        self.0[index]
    }

    /// Duty selector from the control register (pulse).
    pub(crate) fn duty(&self) -> u8 {
        self.0[0] >> 6
    }

    /// Length-halt / envelope-loop bit of the control register (pulse, noise).
    pub(crate) fn envelope_halt(&self) -> bool {
        self.0[0] & 0b0010_0000 != 0
    }

    /// Control bit of the triangle linear counter register.
    pub(crate) fn linear_control(&self) -> bool {
        self.0[0] & 0b1000_0000 != 0
    }

    /// Linear counter reload value (triangle).
    pub(crate) fn linear_reload(&self) -> u8 {
        self.0[0] & 0b0111_1111
    }

    /// 11-bit timer value split across the low and high registers.
    pub(crate) fn timer_period(&self) -> u16 {
        (u16::from(self.0[3] & 0b0000_0111) << 8) | u16::from(self.0[2])
    }

    /// 5-bit length table index.
    pub(crate) fn length_index(&self) -> u8 {
        self.0[3] >> 3
    }

    /// Noise mode bit.
    pub(crate) fn noise_short_mode(&self) -> bool {
        self.0[2] & 0b1000_0000 != 0
    }

    /// Noise period table index.
    pub(crate) fn noise_period_index(&self) -> usize {
        (self.0[2] & 0b0000_1111) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_period_combines_low_and_high() {
        let mut regs = RegisterShadow::default();
        regs.store(2, 0xAB);
        regs.store(3, 0b1010_1101);
        assert_eq!(regs.timer_period(), 0x5AB);
        assert_eq!(regs.length_index(), 0b10101);
    }

    #[test]
    fn control_fields() {
        let mut regs = RegisterShadow::default();
        regs.store(0, 0b1110_0101);
        assert_eq!(regs.duty(), 3);
        assert!(regs.envelope_halt());
        assert!(regs.linear_control());
        assert_eq!(regs.linear_reload(), 0b110_0101);
    }
}
