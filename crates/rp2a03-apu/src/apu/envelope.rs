//! Envelope unit shared by pulse and noise channels.

#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Envelope {
    loop_flag: bool,
    constant_volume: bool,
    /// Divider period, doubling as the volume in constant-volume mode.
    param: u8,
    start: bool,
    divider: u8,
    decay_level: u8,
}

impl Envelope {
    /// Applies the low six bits of a channel's control register.
    pub(crate) fn configure(&mut self, value: u8) {
        self.loop_flag = value & 0b0010_0000 != 0;
        self.constant_volume = value & 0b0001_0000 != 0;
        self.param = value & 0b0000_1111;
    }

    /// Arms a reload for the next quarter-frame clock. The decay level is left
    /// untouched until then.
    pub(crate) fn restart(&mut self) {
        self.start = true;
    }

    /// Quarter-frame clock.
    pub(crate) fn advance(&mut self) {
        if self.start {
            self.start = false;
            self.decay_level = 15;
            self.divider = self.param;
            return;
        }

        if self.divider == 0 {
            self.divider = self.param;
            if self.decay_level > 0 {
                self.decay_level -= 1;
            } else if self.loop_flag {
                self.decay_level = 15;
            }
        } else {
            self.divider -= 1;
        }
    }

    pub(crate) fn level(&self) -> u8 {
        if self.constant_volume {
            self.param
        } else {
            self.decay_level
        }
    }
}
