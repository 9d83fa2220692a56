/// The five APU voices, in mixer order.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioChannel {
    Pulse1 = 0,
    Pulse2 = 1,
    Triangle = 2,
    Noise = 3,
    Dmc = 4,
}

impl AudioChannel {
    pub const COUNT: usize = 5;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Pulse1,
        Self::Pulse2,
        Self::Triangle,
        Self::Noise,
        Self::Dmc,
    ];

    pub fn idx(self) -> usize {
        self as usize
    }
}
