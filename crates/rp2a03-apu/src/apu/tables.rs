//! Fixed lookup tables shared by the channels.

/// Length counter loads, indexed by the 5-bit field of the length register.
pub(crate) const LENGTH_TABLE: [u8; 32] = [
    10, 254, 20, 2, 40, 4, 80, 6, 160, 8, 60, 10, 14, 12, 26, 14, //
    12, 16, 24, 18, 48, 20, 96, 22, 192, 24, 72, 26, 16, 28, 32, 30,
];

/// Pulse waveforms for the four duty settings (12.5%, 25%, 50%, 25% negated).
pub(crate) const PULSE_DUTY_TABLE: [[u8; 8]; 4] = [
    [0, 1, 0, 0, 0, 0, 0, 0],
    [0, 1, 1, 0, 0, 0, 0, 0],
    [0, 1, 1, 1, 1, 0, 0, 0],
    [1, 0, 0, 1, 1, 1, 1, 1],
];

/// Triangle ramp: 15 down to 0, then 0 back up to 15.
pub(crate) const TRIANGLE_SEQUENCE: [u8; 32] = [
    15, 14, 13, 12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0, //
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15,
];

/// Noise timer periods in CPU cycles (NTSC).
pub(crate) const NOISE_PERIOD_TABLE_NTSC: [u16; 16] = [
    4, 8, 16, 32, 64, 96, 128, 160, 202, 254, 380, 508, 762, 1016, 2034, 4068,
];

/// Noise timer periods in CPU cycles (PAL).
pub(crate) const NOISE_PERIOD_TABLE_PAL: [u16; 16] = [
    4, 8, 14, 30, 60, 88, 118, 148, 188, 236, 354, 472, 708, 944, 1890, 3778,
];

/// DMC bit periods in CPU cycles (NTSC).
pub(crate) const DMC_RATE_TABLE_NTSC: [u16; 16] = [
    428, 380, 340, 320, 286, 254, 226, 214, 190, 160, 142, 128, 106, 84, 72, 54,
];

/// DMC bit periods in CPU cycles (PAL).
pub(crate) const DMC_RATE_TABLE_PAL: [u16; 16] = [
    398, 354, 316, 298, 276, 236, 210, 198, 176, 148, 132, 118, 98, 78, 66, 50,
];

/// `$12` selects the sample start in 64-byte steps from `$C000`.
pub(crate) const DMC_SAMPLE_BASE: u16 = 0xC000;
pub(crate) const DMC_SAMPLE_ADDR_STRIDE: u16 = 64;
/// `$13` selects the sample length in 16-byte steps, plus one.
pub(crate) const DMC_SAMPLE_LEN_STRIDE: u16 = 16;
