//! Delta Modulation Channel (DMC) state machine.
//!
//! The channel owns two sub-units clocked by the same timer tick: a memory
//! reader that keeps a one-byte sample buffer topped up from the CPU bus, and
//! an output unit that shifts that byte out one bit per tick, nudging the
//! 7-bit output level up or down by two.

use tracing::debug;

use super::{
    registers::RegisterShadow,
    tables::{DMC_SAMPLE_ADDR_STRIDE, DMC_SAMPLE_BASE, DMC_SAMPLE_LEN_STRIDE},
};
use crate::{config::Region, memory::Memory, rational::Rational, timer::Timer};

const LEVEL_MAX: u8 = 125;
const LEVEL_MIN: u8 = 2;

#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct DmcSynth {
    irq_enable: bool,
    loop_flag: bool,
    irq: bool,
    output_level: u8,
    sample_address: u16,
    sample_length: u16,
    current_address: u16,
    bytes_remaining: u16,
    sample_buffer: Option<u8>,
    shift_register: u8,
    bits_remaining: u8,
    silence: bool,
}

impl Default for DmcSynth {
    fn default() -> Self {
        Self {
            irq_enable: false,
            loop_flag: false,
            irq: false,
            output_level: 0,
            sample_address: DMC_SAMPLE_BASE,
            sample_length: 1,
            current_address: DMC_SAMPLE_BASE,
            bytes_remaining: 0,
            sample_buffer: None,
            shift_register: 0,
            bits_remaining: 8,
            silence: true,
        }
    }
}

impl DmcSynth {
    pub(crate) fn write_control(&mut self, value: u8) {
        self.irq_enable = value & 0b1000_0000 != 0;
        self.loop_flag = value & 0b0100_0000 != 0;
        if !self.irq_enable {
            self.irq = false;
        }
    }

    pub(crate) fn write_direct_load(&mut self, value: u8) {
        self.output_level = value & 0b0111_1111;
    }

    pub(crate) fn write_sample_address(&mut self, value: u8) {
        self.sample_address =
            DMC_SAMPLE_BASE.wrapping_add(u16::from(value) * DMC_SAMPLE_ADDR_STRIDE);
    }

    pub(crate) fn write_sample_length(&mut self, value: u8) {
        self.sample_length = u16::from(value) * DMC_SAMPLE_LEN_STRIDE + 1;
    }

    /// Enabling only restarts playback once the previous sample has run out;
    /// disabling drops the remaining bytes and acknowledges the IRQ.
    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        if enabled {
            if self.bytes_remaining == 0 {
                self.restart();
            }
        } else {
            self.bytes_remaining = 0;
            self.irq = false;
        }
    }

    pub(crate) fn active(&self) -> bool {
        self.bytes_remaining > 0
    }

    pub(crate) fn irq(&self) -> bool {
        self.irq
    }

    pub(crate) fn on_timer<M: Memory + ?Sized>(&mut self, ticks: u64, memory: &mut M) {
        for _ in 0..ticks {
            self.fill_buffer(memory);
            self.shift_output();
            self.count_bit();
        }
    }

    pub(crate) fn output(&self) -> u8 {
        self.output_level
    }

    fn restart(&mut self) {
        debug!(
            address = format_args!("{:#06X}", self.sample_address),
            length = self.sample_length,
            "dmc sample restart"
        );
        self.current_address = self.sample_address;
        self.bytes_remaining = self.sample_length;
    }

    fn fill_buffer<M: Memory + ?Sized>(&mut self, memory: &mut M) {
        if self.sample_buffer.is_some() || self.bytes_remaining == 0 {
            return;
        }

        self.sample_buffer = Some(memory.read(self.current_address));
        self.current_address = next_address(self.current_address);
        self.bytes_remaining -= 1;

        if self.bytes_remaining == 0 {
            if self.loop_flag {
                self.restart();
            } else if self.irq_enable {
                debug!("dmc irq latched");
                self.irq = true;
            }
        }
    }

    fn shift_output(&mut self) {
        if self.silence {
            return;
        }
        self.output_level = if self.shift_register & 1 != 0 {
            (self.output_level + 2).min(LEVEL_MAX)
        } else {
            self.output_level.saturating_sub(2).max(LEVEL_MIN)
        };
        self.shift_register >>= 1;
    }

    fn count_bit(&mut self) {
        self.bits_remaining -= 1;
        if self.bits_remaining > 0 {
            return;
        }
        self.bits_remaining = 8;
        match self.sample_buffer.take() {
            Some(byte) => {
                self.shift_register = byte;
                self.silence = false;
            }
            None => self.silence = true,
        }
    }
}

/// Sample fetches wrap from the top of the address space back into ROM.
fn next_address(addr: u16) -> u16 {
    if addr == 0xFFFF { 0x8000 } else { addr + 1 }
}

#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct DmcChannel {
    region: Region,
    regs: RegisterShadow,
    timer: Timer,
    synth: DmcSynth,
}

impl DmcChannel {
    pub(crate) fn new(region: Region) -> Self {
        let regs = RegisterShadow::default();
        Self {
            region,
            regs,
            timer: Timer::new(timer_period(region, &regs)),
            synth: DmcSynth::default(),
        }
    }

    pub(crate) fn write(&mut self, index: usize, value: u8) {
        self.regs.store(index, value);
        match index {
            0 => {
                self.synth.write_control(value);
                self.timer.set_period(timer_period(self.region, &self.regs));
            }
            1 => self.synth.write_direct_load(value),
            2 => self.synth.write_sample_address(value),
            3 => self.synth.write_sample_length(value),
            _ => unreachable!("dmc register index {index}"),
        }
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.synth.set_enabled(enabled);
    }

    pub(crate) fn active(&self) -> bool {
        self.synth.active()
    }

    pub(crate) fn irq(&self) -> bool {
        self.synth.irq()
    }

    pub(crate) fn advance<M: Memory + ?Sized>(&mut self, cycles: u64, memory: &mut M) {
        let ticks = self.timer.advance(cycles);
        self.synth.on_timer(ticks, memory);
    }

    /// The DMC has neither envelope nor sweep; the level goes straight out.
    pub(crate) fn output(&self) -> u8 {
        self.synth.output()
    }
}

fn timer_period(region: Region, regs: &RegisterShadow) -> Rational {
    let rate_index = (regs.raw(0) & 0b0000_1111) as usize;
    Rational::from_integer(i64::from(region.dmc_rates()[rate_index]))
}
