//! Triangle channel state and linear counter.

use super::{length_counter::LengthCounter, registers::RegisterShadow, tables::TRIANGLE_SEQUENCE};
use crate::{rational::Rational, timer::Timer};

#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct TriangleSynth {
    /// Control bit: halts the length counter and keeps the reload flag set.
    control: bool,
    linear_length: u8,
    linear_counter: u8,
    linear_reload: bool,
    sequence_pos: u8,
    pub(crate) length: LengthCounter,
}

impl TriangleSynth {
    pub(crate) fn set_control(&mut self, control: bool, linear_length: u8) {
        self.control = control;
        self.linear_length = linear_length;
        self.length.set_halt(control);
    }

    pub(crate) fn request_linear_reload(&mut self) {
        self.linear_reload = true;
    }

    /// The sequence only moves while both counters are non-zero; otherwise
    /// it holds its last value instead of dropping to zero.
    fn gate_open(&self) -> bool {
        self.linear_counter > 0 && self.length.active()
    }

    pub(crate) fn on_timer(&mut self, ticks: u64) {
        if self.gate_open() {
            self.sequence_pos = ((u64::from(self.sequence_pos) + ticks) % 32) as u8;
        }
    }

    pub(crate) fn on_quarter_frame(&mut self) {
        if self.linear_reload {
            self.linear_counter = self.linear_length;
        } else if self.linear_counter > 0 {
            self.linear_counter -= 1;
        }

        if !self.control {
            self.linear_reload = false;
        }
    }

    pub(crate) fn on_half_frame(&mut self) {
        self.length.clock();
    }

    pub(crate) fn output(&self) -> u8 {
        TRIANGLE_SEQUENCE[self.sequence_pos as usize]
    }
}

#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct TriangleChannel {
    regs: RegisterShadow,
    timer: Timer,
    synth: TriangleSynth,
}

impl Default for TriangleChannel {
    fn default() -> Self {
        let regs = RegisterShadow::default();
        Self {
            regs,
            timer: Timer::new(timer_period(&regs)),
            synth: TriangleSynth::default(),
        }
    }
}

impl TriangleChannel {
    pub(crate) fn write(&mut self, index: usize, value: u8) {
        self.regs.store(index, value);
        match index {
            0 => self
                .synth
                .set_control(self.regs.linear_control(), self.regs.linear_reload()),
            1 => {}
            2 => self.timer.set_period(timer_period(&self.regs)),
            3 => {
                self.timer.set_period(timer_period(&self.regs));
                self.synth.length.load(self.regs.length_index());
                self.synth.request_linear_reload();
            }
            _ => unreachable!("triangle register index {index}"),
        }
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.synth.length.set_enabled(enabled);
    }

    pub(crate) fn length_active(&self) -> bool {
        self.synth.length.active()
    }

    pub(crate) fn on_quarter_frame(&mut self) {
        self.synth.on_quarter_frame();
    }

    pub(crate) fn on_half_frame(&mut self) {
        self.synth.on_half_frame();
    }

    pub(crate) fn advance(&mut self, cycles: u64) {
        let ticks = self.timer.advance(cycles);
        self.synth.on_timer(ticks);
    }

    /// The triangle has no envelope, so its amplitude is the raw ramp value.
    pub(crate) fn output(&self) -> u8 {
        self.synth.output()
    }
}

/// Triangle timers are clocked every CPU cycle.
fn timer_period(regs: &RegisterShadow) -> Rational {
    Rational::from_integer(i64::from(regs.timer_period()) + 1)
}
