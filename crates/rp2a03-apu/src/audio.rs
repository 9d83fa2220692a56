//! Output side of the APU: channel identifiers, the mixer and filter chain,
//! and the sample sink interface.

mod channel;
pub(crate) mod filters;
pub(crate) mod mixer;
mod sink;

pub use channel::AudioChannel;
pub use mixer::{ChannelLevels, mix};
pub use sink::{BufferSink, SampleSink};
