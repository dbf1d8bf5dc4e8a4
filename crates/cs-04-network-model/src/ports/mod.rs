//! Outbound ports (SPI) for message delivery.

use shared_types::SimTime;

/// Delay applied to a message of a given size on one edge.
///
/// Implementations are pure: the same size always yields the same delay.
pub trait LatencyModel: Send + Sync {
    /// Seconds between send and delivery for `size_bytes` on the wire.
    fn delay(&self, size_bytes: u64) -> SimTime;
}

impl<T: LatencyModel + ?Sized> LatencyModel for &T {
    fn delay(&self, size_bytes: u64) -> SimTime {
        (**self).delay(size_bytes)
    }
}
