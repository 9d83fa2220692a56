//! Audio Processing Unit (APU).
//!
//! The 2A03 APU exposes five sound generators (2x pulse, triangle, noise,
//! DMC) behind a small set of CPU-visible registers. Channel logic, the frame
//! sequencer and the modulation units each live in their own submodule; this
//! module wires them together, decodes register writes and turns elapsed CPU
//! cycles into output samples.
//!
//! Frame sequencer IRQs are not generated. The only interrupt source exposed
//! here is the DMC's end-of-sample flag.

mod dmc;
mod envelope;
mod frame_sequencer;
mod length_counter;
mod noise;
mod pulse;
mod registers;
mod sweep;
pub(crate) mod tables;
mod triangle;

use bitflags::bitflags;
use tracing::{debug, trace};

use crate::{
    audio::{
        AudioChannel, SampleSink,
        mixer::{ChannelLevels, Mixer, mix},
    },
    config::ApuConfig,
    error::Result,
    memory::{
        Memory,
        apu::{REGISTER_BASE, Register, STATUS},
    },
    timer::Timer,
};

pub use frame_sequencer::FrameSequencerMode;

use dmc::DmcChannel;
use frame_sequencer::{FrameSequencer, FrameTick};
use noise::NoiseChannel;
use pulse::PulseChannel;
use sweep::Negation;
use triangle::TriangleChannel;

bitflags! {
    /// Bit layout of `$4015`.
    ///
    /// On write the low five bits enable channels. On read they report which
    /// channels still have output pending (length counter or DMC bytes), and
    /// bit 7 mirrors the DMC IRQ flag.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Status: u8 {
        const PULSE1 = 0b0000_0001;
        const PULSE2 = 0b0000_0010;
        const TRIANGLE = 0b0000_0100;
        const NOISE = 0b0000_1000;
        const DMC = 0b0001_0000;
        const DMC_IRQ = 0b1000_0000;
    }
}

/// Cycle-driven model of the 2A03 audio hardware.
///
/// The host issues register writes and calls [`advance`](Self::advance) with
/// elapsed CPU cycles; the APU fetches DMC bytes from the supplied bus and
/// pushes mixed samples into the supplied sink at the configured rate. How the
/// elapsed cycles are chunked across calls never changes the result.
#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, PartialEq)]
pub struct Apu {
    config: ApuConfig,
    pulse: [PulseChannel; 2],
    triangle: TriangleChannel,
    noise: NoiseChannel,
    dmc: DmcChannel,
    frame: FrameSequencer,
    /// Fires once per output sample.
    sample_clock: Timer,
    mixer: Mixer,
    cycles: u64,
}

impl Apu {
    /// Builds a powered-on APU. Fails if `config` does not validate.
    pub fn new(config: ApuConfig) -> Result<Self> {
        config.validate()?;
        let apu = Self::power_on(config);
        debug!(
            region = %config.region,
            sample_rate = config.sample_rate,
            cycles_per_sample = %apu.sample_clock.period(),
            "apu created"
        );
        Ok(apu)
    }

    /// Builds an APU producing samples at the rate `sink` declares.
    pub fn with_sink<S: SampleSink + ?Sized>(sink: &S) -> Result<Self> {
        Self::new(ApuConfig::for_sink(sink))
    }

    fn power_on(config: ApuConfig) -> Self {
        let region = config.region;
        Self {
            config,
            pulse: [
                PulseChannel::new(Negation::OnesComplement),
                PulseChannel::new(Negation::TwosComplement),
            ],
            triangle: TriangleChannel::default(),
            noise: NoiseChannel::new(region),
            dmc: DmcChannel::new(region),
            frame: FrameSequencer::new(region),
            sample_clock: Timer::new(config.cycles_per_sample()),
            mixer: Mixer::new(&config),
            cycles: 0,
        }
    }

    /// Returns every channel, the frame sequencer and the output filters to
    /// their power-on state. The configuration is kept.
    pub fn reset(&mut self) {
        debug!(cycles = self.cycles, "apu reset");
        *self = Self::power_on(self.config);
    }

    pub fn config(&self) -> &ApuConfig {
        &self.config
    }

    /// Total CPU cycles consumed since power-on or the last reset.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn frame_mode(&self) -> FrameSequencerMode {
        self.frame.mode()
    }

    /// Writes `value` to the register at `offset` from the APU base.
    ///
    /// Offsets outside the register map are ignored.
    pub fn write_register(&mut self, offset: u8, value: u8) {
        let Some(register) = Register::from_offset(offset) else {
            trace!(offset, value, "write to unmapped apu offset ignored");
            return;
        };
        trace!(?register, offset, value, "apu register write");

        if let Some((channel, index)) = register.channel_slot() {
            match channel {
                0 | 1 => self.pulse[channel].write(index, value),
                2 => self.triangle.write(index, value),
                3 => self.noise.write(index, value),
                4 => self.dmc.write(index, value),
                _ => unreachable!("apu channel {channel}"),
            }
            return;
        }

        match register {
            Register::Status => self.write_status(Status::from_bits_truncate(value)),
            Register::FrameCounter => self
                .frame
                .set_mode(FrameSequencerMode::from_register(value)),
            _ => unreachable!("{register:?} has a channel slot"),
        }
    }

    /// CPU-bus form of [`write_register`](Self::write_register) for the
    /// canonical `$4000-$4017` mapping.
    pub fn cpu_write(&mut self, addr: u16, value: u8) {
        match addr.checked_sub(REGISTER_BASE) {
            Some(offset) if offset <= 0xFF => self.write_register(offset as u8, value),
            _ => trace!(addr, value, "write outside apu range ignored"),
        }
    }

    /// Reads the register at `offset`. Only the status register is readable;
    /// everything else reads as `0`. Reads never change state.
    pub fn read_register(&self, offset: u8) -> u8 {
        if offset == STATUS {
            self.read_status()
        } else {
            0
        }
    }

    pub fn cpu_read(&self, addr: u16) -> u8 {
        match Register::from_cpu_addr(addr) {
            Some(register) => self.read_register(register.offset()),
            None => 0,
        }
    }

    /// Current `$4015` value.
    pub fn read_status(&self) -> u8 {
        self.status().bits()
    }

    pub fn status(&self) -> Status {
        let mut status = Status::empty();
        status.set(Status::PULSE1, self.pulse[0].length_active());
        status.set(Status::PULSE2, self.pulse[1].length_active());
        status.set(Status::TRIANGLE, self.triangle.length_active());
        status.set(Status::NOISE, self.noise.length_active());
        status.set(Status::DMC, self.dmc.active());
        status.set(Status::DMC_IRQ, self.dmc.irq());
        status
    }

    /// Level of the interrupt line. Only the DMC raises it.
    pub fn irq_pending(&self) -> bool {
        self.dmc.irq()
    }

    fn write_status(&mut self, enables: Status) {
        debug!(?enables, "channel enables written");
        self.pulse[0].set_enabled(enables.contains(Status::PULSE1));
        self.pulse[1].set_enabled(enables.contains(Status::PULSE2));
        self.triangle.set_enabled(enables.contains(Status::TRIANGLE));
        self.noise.set_enabled(enables.contains(Status::NOISE));
        self.dmc.set_enabled(enables.contains(Status::DMC));
    }

    /// Runs the APU for `cycles` CPU cycles.
    ///
    /// DMC sample bytes are read from `memory`; every finished output sample
    /// is pushed to `sink`. The work is split on frame sequencer and sample
    /// boundaries so that within each slice channels consume their timer
    /// ticks first, then the frame tick lands, then the sample is taken.
    pub fn advance<M, S>(&mut self, cycles: u64, memory: &mut M, sink: &mut S)
    where
        M: Memory + ?Sized,
        S: SampleSink + ?Sized,
    {
        if self.frame.tick_pending() {
            let tick = self.frame.advance(0);
            self.apply_frame_tick(tick);
        }

        let mut remaining = cycles;
        while remaining > 0 {
            let mut slice = remaining;
            if let Some(until) = self.frame.cycles_until_tick() {
                slice = slice.min(until);
            }
            if let Some(until) = self.sample_clock.cycles_until_tick() {
                slice = slice.min(until);
            }

            self.clock_channels(slice, memory);
            let tick = self.frame.advance(slice);
            self.apply_frame_tick(tick);

            for _ in 0..self.sample_clock.advance(slice) {
                let levels = self.levels();
                sink.push(self.mixer.sample(&levels));
            }

            self.cycles += slice;
            remaining -= slice;
        }
    }

    fn clock_channels<M: Memory + ?Sized>(&mut self, cycles: u64, memory: &mut M) {
        for pulse in &mut self.pulse {
            pulse.advance(cycles);
        }
        self.triangle.advance(cycles);
        self.noise.advance(cycles);
        self.dmc.advance(cycles, memory);
    }

    fn apply_frame_tick(&mut self, tick: FrameTick) {
        if !tick.any() {
            return;
        }
        if tick.quarter {
            for pulse in &mut self.pulse {
                pulse.on_quarter_frame();
            }
            self.triangle.on_quarter_frame();
            self.noise.on_quarter_frame();
        }
        if tick.half {
            for pulse in &mut self.pulse {
                pulse.on_half_frame();
            }
            self.triangle.on_half_frame();
            self.noise.on_half_frame();
        }
    }

    /// Current amplitude of one channel after mute and envelope gating.
    pub fn channel_output(&self, channel: AudioChannel) -> u8 {
        match channel {
            AudioChannel::Pulse1 => self.pulse[0].output(),
            AudioChannel::Pulse2 => self.pulse[1].output(),
            AudioChannel::Triangle => self.triangle.output(),
            AudioChannel::Noise => self.noise.output(),
            AudioChannel::Dmc => self.dmc.output(),
        }
    }

    fn levels(&self) -> ChannelLevels {
        AudioChannel::ALL.map(|channel| self.channel_output(channel))
    }

    /// Mixed amplitude at this instant, before filtering. Filter state is
    /// left untouched.
    pub fn mix_now(&self) -> f32 {
        mix(&self.levels())
    }
}
