//! Destinations for finished output samples.

/// Consumer of mixed, filtered samples.
///
/// The sink names its sample rate before any audio is produced; the APU
/// derives its cycles-per-sample ratio from it and then pushes one sample per
/// period. `push` is called from inside [`Apu::advance`](crate::Apu::advance)
/// and must not block.
pub trait SampleSink {
    fn sample_rate(&self) -> u32;

    fn push(&mut self, sample: f32);
}

impl<S: SampleSink + ?Sized> SampleSink for &mut S {
    fn sample_rate(&self) -> u32 {
        (**self).sample_rate()
    }

    fn push(&mut self, sample: f32) {
        (**self).push(sample);
    }
}

/// Sink that appends every sample to a growable buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BufferSink {
    sample_rate: u32,
    samples: Vec<f32>,
}

impl BufferSink {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            samples: Vec::new(),
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Hands out the collected samples and leaves the buffer empty.
    pub fn drain(&mut self) -> Vec<f32> {
        std::mem::take(&mut self.samples)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl SampleSink for BufferSink {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn push(&mut self, sample: f32) {
        self.samples.push(sample);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_sink_collects_and_drains() {
        let mut sink = BufferSink::new(48_000);
        sink.push(0.25);
        sink.push(-0.5);
        assert_eq!(sink.sample_rate(), 48_000);
        assert_eq!(sink.samples(), &[0.25, -0.5]);
        assert_eq!(sink.drain(), vec![0.25, -0.5]);
        assert!(sink.is_empty());
    }

    fn feed<S: SampleSink>(mut sink: S) -> u32 {
        sink.push(1.0);
        sink.sample_rate()
    }

    #[test]
    fn mutable_reference_forwards() {
        let mut sink = BufferSink::new(22_050);
        assert_eq!(feed(&mut sink), 22_050);
        assert_eq!(sink.len(), 1);
    }
}
