//! Pulse channel: duty sequencer, envelope, sweep and length counter.

use super::{
    envelope::Envelope,
    length_counter::LengthCounter,
    registers::RegisterShadow,
    sweep::{Negation, Sweep},
    tables::PULSE_DUTY_TABLE,
};
use crate::{rational::Rational, timer::Timer};

/// Square wave generator. The phase always advances with the timer; silencing
/// happens on the output side through the length counter gate.
#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SquareSynth {
    duty: u8,
    step: u8,
    pub(crate) length: LengthCounter,
}

impl SquareSynth {
    pub(crate) fn set_duty(&mut self, duty: u8) {
        self.duty = duty & 0b11;
    }

    pub(crate) fn reset_phase(&mut self) {
        self.step = 0;
    }

    pub(crate) fn on_timer(&mut self, ticks: u64) {
        self.step = ((u64::from(self.step) + ticks) % 8) as u8;
    }

    pub(crate) fn on_half_frame(&mut self) {
        self.length.clock();
    }

    pub(crate) fn output(&self) -> u8 {
        if self.length.silences() {
            return 0;
        }
        PULSE_DUTY_TABLE[self.duty as usize][self.step as usize]
    }
}

#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct PulseChannel {
    regs: RegisterShadow,
    timer: Timer,
    sweep: Sweep,
    envelope: Envelope,
    synth: SquareSynth,
}

impl PulseChannel {
    pub(crate) fn new(negation: Negation) -> Self {
        let regs = RegisterShadow::default();
        Self {
            regs,
            timer: Timer::new(timer_period(&regs)),
            sweep: Sweep::new(negation),
            envelope: Envelope::default(),
            synth: SquareSynth::default(),
        }
    }

    pub(crate) fn write(&mut self, index: usize, value: u8) {
        self.regs.store(index, value);
        match index {
            0 => {
                self.synth.set_duty(self.regs.duty());
                self.synth.length.set_halt(self.regs.envelope_halt());
                self.envelope.configure(value);
            }
            1 => self.sweep.write(value),
            2 => self.timer.set_period(timer_period(&self.regs)),
            3 => {
                self.timer.set_period(timer_period(&self.regs));
                self.synth.length.load(self.regs.length_index());
                self.synth.reset_phase();
                self.envelope.restart();
            }
            _ => unreachable!("pulse register index {index}"),
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
        self.sweep.advance(&mut self.timer);
        self.synth.on_half_frame();
    }

    pub(crate) fn advance(&mut self, cycles: u64) {
        let ticks = self.timer.advance(cycles);
        self.synth.on_timer(ticks);
    }

    pub(crate) fn output(&self) -> u8 {
        if self.sweep.muted(&self.timer) {
            return 0;
        }
        self.synth.output() * self.envelope.level()
    }

    #[cfg(test)]
    pub(crate) fn registers(&self) -> &RegisterShadow {
        &self.regs
    }
}

/// Pulse timers count CPU cycles, two per APU cycle.
fn timer_period(regs: &RegisterShadow) -> Rational {
    Rational::from_integer((i64::from(regs.timer_period()) + 1) * 2)
}
