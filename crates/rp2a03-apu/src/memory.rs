//! Register map and the bus interface used for DMC sample fetches.

/// Read-only view of the CPU bus consumed by the DMC memory reader.
///
/// The bus always yields a byte; open-bus and unmapped behaviour is the
/// implementor's business. Any `FnMut(u16) -> u8` closure works as a bus.
pub trait Memory {
    fn read(&mut self, addr: u16) -> u8;
}

impl<F> Memory for F
where
    F: FnMut(u16) -> u8,
{
    fn read(&mut self, addr: u16) -> u8 {
        self(addr)
    }
}

/// Audio Processing Unit (APU) register layout.
pub mod apu {
    /// Canonical CPU address of register offset `0x00`.
    pub const REGISTER_BASE: u16 = 0x4000;
    /// Last offset that belongs to a channel (`$4013`).
    pub const CHANNEL_REGISTER_END: u8 = 0x13;
    /// Registers per channel.
    pub const REGISTERS_PER_CHANNEL: u8 = 4;

    /// APU register identifiers, numbered by offset from the register base.
    ///
    /// Offsets `0x00-0x13` configure the five channels four bytes at a time;
    /// `0x15` and `0x17` are the global status and frame counter registers.
    #[repr(u8)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Register {
        /// `$4000` - Pulse 1: duty, envelope, length counter halt.
        Pulse1Control = 0x00,
        /// `$4001` - Pulse 1: sweep unit.
        Pulse1Sweep = 0x01,
        /// `$4002` - Pulse 1: timer low byte.
        Pulse1TimerLow = 0x02,
        /// `$4003` - Pulse 1: timer high 3 bits + length counter load.
        Pulse1TimerHigh = 0x03,

        /// `$4004` - Pulse 2: duty, envelope, length counter halt.
        Pulse2Control = 0x04,
        /// `$4005` - Pulse 2: sweep unit.
        Pulse2Sweep = 0x05,
        /// `$4006` - Pulse 2: timer low byte.
        Pulse2TimerLow = 0x06,
        /// `$4007` - Pulse 2: timer high 3 bits + length counter load.
        Pulse2TimerHigh = 0x07,

        /// `$4008` - Triangle: control flag + linear counter reload.
        TriangleControl = 0x08,
        /// `$4009` - Triangle: unused.
        TriangleUnused = 0x09,
        /// `$400A` - Triangle: timer low byte.
        TriangleTimerLow = 0x0A,
        /// `$400B` - Triangle: timer high 3 bits + length counter load.
        TriangleTimerHigh = 0x0B,

        /// `$400C` - Noise: envelope and length counter halt.
        NoiseControl = 0x0C,
        /// `$400D` - Noise: unused.
        NoiseUnused = 0x0D,
        /// `$400E` - Noise: mode flag and period index.
        NoiseModeAndPeriod = 0x0E,
        /// `$400F` - Noise: length counter load.
        NoiseLength = 0x0F,

        /// `$4010` - DMC: IRQ enable, loop flag, rate index.
        DmcControl = 0x10,
        /// `$4011` - DMC: direct load of the output level.
        DmcDirectLoad = 0x11,
        /// `$4012` - DMC: sample address.
        DmcSampleAddress = 0x12,
        /// `$4013` - DMC: sample length.
        DmcSampleLength = 0x13,

        /// `$4015` - Status: channel enables on write, activity on read.
        Status = 0x15,
        /// `$4017` - Frame counter: mode select (IRQ inhibit is ignored).
        FrameCounter = 0x17,
    }

    impl Register {
        /// Offset of this register from [`REGISTER_BASE`].
        pub const fn offset(self) -> u8 {
            self as u8
        }

        /// Canonical CPU address of this register.
        pub const fn addr(self) -> u16 {
            REGISTER_BASE + self as u16
        }

        /// Resolves a register offset; `None` for the holes at `0x14`, `0x16`
        /// and anything past `0x17`.
        pub const fn from_offset(offset: u8) -> Option<Self> {
            Some(match offset {
                0x00 => Self::Pulse1Control,
                0x01 => Self::Pulse1Sweep,
                0x02 => Self::Pulse1TimerLow,
                0x03 => Self::Pulse1TimerHigh,
                0x04 => Self::Pulse2Control,
                0x05 => Self::Pulse2Sweep,
                0x06 => Self::Pulse2TimerLow,
                0x07 => Self::Pulse2TimerHigh,
                0x08 => Self::TriangleControl,
                0x09 => Self::TriangleUnused,
                0x0A => Self::TriangleTimerLow,
                0x0B => Self::TriangleTimerHigh,
                0x0C => Self::NoiseControl,
                0x0D => Self::NoiseUnused,
                0x0E => Self::NoiseModeAndPeriod,
                0x0F => Self::NoiseLength,
                0x10 => Self::DmcControl,
                0x11 => Self::DmcDirectLoad,
                0x12 => Self::DmcSampleAddress,
                0x13 => Self::DmcSampleLength,
                0x15 => Self::Status,
                0x17 => Self::FrameCounter,
                _ => return None,
            })
        }

        /// Resolves a canonical CPU address in `$4000-$4017`.
        pub const fn from_cpu_addr(addr: u16) -> Option<Self> {
            if addr < REGISTER_BASE || addr > REGISTER_BASE + 0x17 {
                return None;
            }
            Self::from_offset((addr - REGISTER_BASE) as u8)
        }

        /// Channel number (`0..5`, pulse 1 first) and register index (`0..4`)
        /// for channel registers; `None` for status and frame counter.
        pub const fn channel_slot(self) -> Option<(usize, usize)> {
            let offset = self.offset();
            if offset > CHANNEL_REGISTER_END {
                return None;
            }
            Some((
                (offset / REGISTERS_PER_CHANNEL) as usize,
                (offset % REGISTERS_PER_CHANNEL) as usize,
            ))
        }
    }

    /// Offset of the status register (`$4015`).
    pub const STATUS: u8 = Register::Status as u8;
    /// Offset of the frame counter register (`$4017`).
    pub const FRAME_COUNTER: u8 = Register::FrameCounter as u8;
}
