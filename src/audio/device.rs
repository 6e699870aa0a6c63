use super::chain::{lock_chain, SharedChain};
use super::error::AudioError;

/// An output that renders one tone chain and owns its clock.
///
/// Each device is owned by exactly one scheduler. Once closed it stays
/// closed; a new device is opened instead of reviving an old one.
pub trait OutputDevice {
    fn chain(&self) -> &SharedChain;

    /// Start (or restart) the clock. Returns once audio is flowing.
    fn resume(&mut self) -> Result<(), AudioError>;

    /// Freeze the clock and output silence
    fn suspend(&mut self) -> Result<(), AudioError>;

    /// Release the underlying stream
    fn close(&mut self);

    fn is_closed(&self) -> bool;

    /// Current device clock in seconds
    fn clock_now(&self) -> f64 {
        lock_chain(self.chain()).now()
    }
}

#[cfg(test)]
pub use offline::OfflineOutput;
