#![allow(dead_code)]

use anyhow::Result;
use rp2a03_apu::{Apu, ApuConfig, Memory, Region, SampleSink};

pub const SAMPLE_RATE: u32 = 44_100;

/// Sink that records every sample it receives.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecordingSink {
    pub samples: Vec<f32>,
}

impl SampleSink for RecordingSink {
    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn push(&mut self, sample: f32) {
        self.samples.push(sample);
    }
}

/// Bus returning `0xFF` on even addresses and `0xAA` on odd ones, logging
/// every fetch.
#[derive(Debug, Default, Clone)]
pub struct PatternedMemory {
    pub reads: Vec<u16>,
}

impl Memory for PatternedMemory {
    fn read(&mut self, addr: u16) -> u8 {
        self.reads.push(addr);
        if addr & 1 == 0 { 0xFF } else { 0xAA }
    }
}

pub fn new_apu(region: Region) -> Result<Apu> {
    let config = ApuConfig::for_sink(&RecordingSink::default()).with_region(region);
    Ok(Apu::new(config)?)
}

/// Applies `(offset, value)` writes in order.
pub fn write_all(apu: &mut Apu, writes: &[(u8, u8)]) {
    for &(offset, value) in writes {
        apu.write_register(offset, value);
    }
}

/// A register script that keeps every channel busy: two pulses (one
/// sweeping), triangle, noise in short mode and a looping DMC sample.
pub const BUSY_SCRIPT: &[(u8, u8)] = &[
    (0x15, 0x1F),
    (0x00, 0b1001_1000),
    (0x01, 0b1010_0010),
    (0x02, 0x80),
    (0x03, 0b0000_1001),
    (0x04, 0b0101_1111),
    (0x05, 0b1001_1011),
    (0x06, 0x40),
    (0x07, 0b0000_1010),
    (0x08, 0b0001_0000),
    (0x0A, 0x30),
    (0x0B, 0b0000_1000),
    (0x0C, 0b0000_0111),
    (0x0E, 0b1000_0100),
    (0x0F, 0b0001_1000),
    (0x10, 0b0100_1101),
    (0x11, 0x20),
    (0x12, 0x03),
    (0x13, 0x01),
];
