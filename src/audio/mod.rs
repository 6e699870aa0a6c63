pub mod chain;
pub mod device;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod scheduler;

pub use device::OutputDevice;
pub use engine::CpalOutput;
pub use error::AudioError;
pub use scheduler::AudioScheduler;
