//! Cycle-exact model of the Ricoh 2A03 audio processing unit.
//!
//! The crate covers the audio pipeline of the NES: exact rational clocking,
//! the frame sequencer, the two pulse channels, triangle, noise and delta
//! modulation channels with their envelope, sweep and length units, and the
//! non-linear mixer followed by a low-pass / DC-block filter chain.
//!
//! The CPU, the memory bus and host audio output stay outside. The host
//! writes registers, advances the APU by elapsed CPU cycles while lending it a
//! bus for DMC fetches and a [`SampleSink`] for finished samples, and polls
//! [`Apu::irq_pending`].
//!
//! ```
//! use rp2a03_apu::{Apu, BufferSink};
//!
//! let mut sink = BufferSink::new(44_100);
//! let mut apu = Apu::with_sink(&sink)?;
//! apu.write_register(0x15, 0b0000_0001);
//! apu.write_register(0x00, 0b1011_1111);
//! apu.write_register(0x02, 0xFD);
//! apu.write_register(0x03, 0b0000_1000);
//! apu.advance(29_830, &mut |_: u16| 0u8, &mut sink);
//! assert_eq!(sink.len(), 735);
//! # Ok::<(), rp2a03_apu::Error>(())
//! ```

pub mod apu;
pub mod audio;
pub mod config;
pub mod error;
pub mod memory;
pub mod rational;
pub mod state;
pub mod timer;

pub use apu::{Apu, FrameSequencerMode, Status};
pub use audio::{AudioChannel, BufferSink, SampleSink};
pub use config::{ApuConfig, Region};
pub use error::{Error, Result};
pub use memory::Memory;
pub use rational::Rational;
pub use timer::Timer;
