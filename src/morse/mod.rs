pub mod encoder;
pub mod timeline;
pub mod timing;
pub mod waveform;

pub use timeline::{build_timeline, Timeline};
pub use timing::TimingConfig;
