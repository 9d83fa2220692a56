//! Noise channel state and linear feedback shift register (LFSR).

use super::{envelope::Envelope, length_counter::LengthCounter, registers::RegisterShadow};
use crate::{config::Region, rational::Rational, timer::Timer};

#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NoiseSynth {
    /// Short mode taps bit 6 (93-step sequence) instead of bit 1.
    short_mode: bool,
    shift_register: u16,
    pub(crate) length: LengthCounter,
}

impl Default for NoiseSynth {
    fn default() -> Self {
        Self {
            short_mode: false,
            shift_register: 1,
            length: LengthCounter::default(),
        }
    }
}

impl NoiseSynth {
    pub(crate) fn set_short_mode(&mut self, short_mode: bool) {
        self.short_mode = short_mode;
    }

    fn step_lfsr(&mut self) {
        let tap = if self.short_mode { 6 } else { 1 };
        let bit = (self.shift_register ^ (self.shift_register >> tap)) & 1;
        self.shift_register >>= 1;
        self.shift_register |= bit << 14;
    }

    pub(crate) fn on_timer(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step_lfsr();
        }
    }

    pub(crate) fn on_half_frame(&mut self) {
        self.length.clock();
    }

    pub(crate) fn output(&self) -> u8 {
        if self.length.silences() {
            return 0;
        }
        (self.shift_register & 1) as u8
    }
}

#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NoiseChannel {
    region: Region,
    regs: RegisterShadow,
    timer: Timer,
    envelope: Envelope,
    synth: NoiseSynth,
}

impl NoiseChannel {
    pub(crate) fn new(region: Region) -> Self {
        let regs = RegisterShadow::default();
        Self {
            region,
            regs,
            timer: Timer::new(timer_period(region, &regs)),
            envelope: Envelope::default(),
            synth: NoiseSynth::default(),
        }
    }

    pub(crate) fn write(&mut self, index: usize, value: u8) {
        self.regs.store(index, value);
        match index {
            0 => {
                self.synth.length.set_halt(self.regs.envelope_halt());
                self.envelope.configure(value);
            }
            1 => {}
            2 => {
                self.synth.set_short_mode(self.regs.noise_short_mode());
                self.timer.set_period(timer_period(self.region, &self.regs));
            }
            3 => {
                self.synth.length.load(self.regs.length_index());
                self.envelope.restart();
            }
            _ => unreachable!("noise register index {index}"),
        }
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.synth.length.set_enabled(enabled);
    }

    pub(crate) fn length_active(&self) -> bool {
        self.synth.length.active()
    }

    pub(crate) fn on_quarter_frame(&mut self) {
        self.envelope.advance();
    }

    pub(crate) fn on_half_frame(&mut self) {
        self.synth.on_half_frame();
    }

    pub(crate) fn advance(&mut self, cycles: u64) {
        let ticks = self.timer.advance(cycles);
        self.synth.on_timer(ticks);
    }

    pub(crate) fn output(&self) -> u8 {
        self.synth.output() * self.envelope.level()
    }
}

fn timer_period(region: Region, regs: &RegisterShadow) -> Rational {
    Rational::from_integer(i64::from(
        region.noise_periods()[regs.noise_period_index()],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sounding_synth(short_mode: bool) -> NoiseSynth {
        let mut synth = NoiseSynth::default();
        synth.set_short_mode(short_mode);
        synth.length.set_enabled(true);
        synth.length.load(1);
        synth
    }

    fn collect(synth: &mut NoiseSynth, count: usize) -> Vec<u8> {
        (0..count)
            .map(|_| {
                synth.on_timer(1);
                synth.output()
            })
            .collect()
    }

    #[test]
    fn long_mode_period_is_32767() {
        let mut synth = sounding_synth(false);
        let first = collect(&mut synth, 32_767);
        assert_eq!(first.iter().filter(|&&b| b == 1).count(), 16_384);

        let second = collect(&mut synth, 32_767);
        assert_eq!(first, second);
        assert_eq!(synth.shift_register, 1);
    }

    #[test]
    fn short_mode_repeats_after_93_steps() {
        let mut synth = sounding_synth(true);
        synth.on_timer(500);
        let start = synth.shift_register;
        synth.on_timer(93);
        assert_eq!(synth.shift_register, start);
    }

    #[test]
    fn shift_register_feedback_enters_bit_14() {
        let mut synth = sounding_synth(false);
        synth.on_timer(1);
        // 1 ^ 0 = 1 shifted into bit 14.
        assert_eq!(synth.shift_register, 0x4000);
    }

    #[test]
    fn exhausted_length_silences() {
        let mut synth = NoiseSynth::default();
        synth.length.set_enabled(true);
        assert_eq!(synth.output(), 0);
    }

    #[test]
    fn period_register_selects_table_entry() {
        let mut ch = NoiseChannel::new(Region::Ntsc);
        ch.write(2, 0x8F);
        assert!(ch.synth.short_mode);
        assert_eq!(ch.timer.period(), Rational::from_integer(4068));

        let mut pal = NoiseChannel::new(Region::Pal);
        pal.write(2, 0x0F);
        assert_eq!(pal.timer.period(), Rational::from_integer(3778));
    }

    #[test]
    fn envelope_scales_output() {
        let mut ch = NoiseChannel::new(Region::Ntsc);
        ch.set_enabled(true);
        ch.write(0, 0b0001_0110); // constant volume 6
        ch.write(3, 0b0000_1000);
        // Seed register has bit 0 set.
        assert_eq!(ch.output(), 6);
    }
}
