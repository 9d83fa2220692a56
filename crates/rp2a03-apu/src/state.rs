//! Save-state capture and restore for the APU.
//!
//! [`SaveState`] is format-agnostic: it hands out an owned snapshot that the
//! caller can serialize however it likes. With the `savestate-postcard`
//! feature the APU also offers a ready-made byte encoding.

use crate::{
    apu::Apu,
    error::{Error, Result},
};

/// Metadata stored alongside a snapshot payload.
#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotMeta {
    /// Layout version of the payload.
    pub format_version: u32,
    /// CPU cycle count when the snapshot was captured.
    pub cycles: u64,
}

/// Snapshot payload with its metadata.
#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    pub meta: SnapshotMeta,
    pub data: T,
}

/// Full save/load contract.
pub trait SaveState {
    type Full;

    /// Bumped whenever the snapshot layout changes.
    const FORMAT_VERSION: u32 = 1;

    fn save_full(&self) -> Snapshot<Self::Full>;

    /// Restores from `snapshot`. Snapshots from another layout version are
    /// rejected and leave `self` untouched.
    fn load_full(&mut self, snapshot: &Snapshot<Self::Full>) -> Result<()>;
}

impl SaveState for Apu {
    type Full = Apu;

    fn save_full(&self) -> Snapshot<Apu> {
        Snapshot {
            meta: SnapshotMeta {
                format_version: Self::FORMAT_VERSION,
                cycles: self.cycles(),
            },
            data: self.clone(),
        }
    }

    fn load_full(&mut self, snapshot: &Snapshot<Apu>) -> Result<()> {
        if snapshot.meta.format_version != Self::FORMAT_VERSION {
            return Err(Error::State(format!(
                "unsupported snapshot version {} (expected {})",
                snapshot.meta.format_version,
                Self::FORMAT_VERSION
            )));
        }
        *self = snapshot.data.clone();
        Ok(())
    }
}

#[cfg(feature = "savestate-postcard")]
impl Apu {
    /// Encodes the complete APU state, configuration included.
    pub fn save_state(&self) -> Result<Vec<u8>> {
        postcard::to_allocvec(&self.save_full()).map_err(|e| Error::State(e.to_string()))
    }

    /// Replaces this APU with a state produced by [`save_state`](Self::save_state).
    pub fn load_state(&mut self, bytes: &[u8]) -> Result<()> {
        let snapshot: Snapshot<Apu> =
            postcard::from_bytes(bytes).map_err(|e| Error::State(e.to_string()))?;
        self.load_full(&snapshot)?;
        tracing::debug!(cycles = snapshot.meta.cycles, "apu state loaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{audio::BufferSink, config::ApuConfig};

    fn busy_apu() -> Apu {
        let mut apu = Apu::new(ApuConfig::default()).expect("default config is valid");
        apu.write_register(0x15, 0x0F);
        apu.write_register(0x00, 0b1011_1111);
        apu.write_register(0x02, 0x40);
        apu.write_register(0x03, 0x08);
        apu.write_register(0x0C, 0b0011_1100);
        apu.write_register(0x0E, 0x03);
        apu.write_register(0x0F, 0x08);
        let mut sink = BufferSink::new(44_100);
        apu.advance(12_345, &mut |_: u16| 0u8, &mut sink);
        apu
    }

    #[test]
    fn snapshot_restores_identical_stream() {
        let mut apu = busy_apu();
        let snapshot = apu.save_full();
        assert_eq!(snapshot.meta.cycles, 12_345);

        let mut expected = BufferSink::new(44_100);
        apu.advance(20_000, &mut |_: u16| 0u8, &mut expected);

        let mut restored = Apu::new(ApuConfig::default()).expect("default config is valid");
        restored.load_full(&snapshot).expect("same format version");
        let mut actual = BufferSink::new(44_100);
        restored.advance(20_000, &mut |_: u16| 0u8, &mut actual);

        assert_eq!(expected.samples(), actual.samples());
        assert_eq!(apu, restored);
    }

    #[test]
    fn rejects_foreign_format_version() {
        let mut apu = busy_apu();
        let mut snapshot = apu.save_full();
        snapshot.meta.format_version += 1;
        let before = apu.clone();
        assert!(matches!(apu.load_full(&snapshot), Err(Error::State(_))));
        assert_eq!(apu, before);
    }

    #[cfg(feature = "savestate-postcard")]
    #[test]
    fn postcard_round_trip_keeps_stream() -> anyhow::Result<()> {
        let mut apu = busy_apu();
        let bytes = apu.save_state()?;

        let mut restored = Apu::new(ApuConfig::default())?;
        restored.load_state(&bytes)?;

        let mut a = BufferSink::new(44_100);
        let mut b = BufferSink::new(44_100);
        apu.advance(9_000, &mut |_: u16| 0u8, &mut a);
        restored.advance(9_000, &mut |_: u16| 0u8, &mut b);
        assert_eq!(a.samples(), b.samples());
        Ok(())
    }

    #[cfg(feature = "savestate-postcard")]
    #[test]
    fn garbage_bytes_are_a_state_error() {
        let mut apu = busy_apu();
        assert!(matches!(apu.load_state(&[0xFF; 3]), Err(Error::State(_))));
    }
}
