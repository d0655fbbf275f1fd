//! # Bus Transport Module
//!
//! Trait abstraction over the shared two-wire bus so the transaction layer can be driven by real
//! hardware, the in-memory simulator or a scripted mock.
//!
//! The transport only moves bytes. It never computes checksums or interprets payloads.

pub mod sim;

use async_trait::async_trait;
use thiserror::Error;

pub use sim::SimulatedAdcs;

/// Failures raised by the bus itself
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// No device acknowledged the address
    #[error("device 0x{device:02X} did not acknowledge")]
    Nack { device: u8 },

    /// Another master holds the bus
    #[error("bus busy")]
    Busy,

    /// The call exceeded the configured bus timeout
    #[error("bus call timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// Fewer or more bytes arrived than the frame needs
    #[error("read returned {actual} bytes, expected {expected}")]
    ShortRead { expected: usize, actual: usize },

    /// Any other driver-level failure
    #[error("bus I/O failure: {0}")]
    Io(String),
}

/// Raw register access on the two-wire bus
///
/// `command_id` is the 8-bit wire identifier the device decodes as its register address.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BusTransport: Send {
    /// Write `bytes` to register `command_id` of `device`
    async fn write(&mut self, device: u8, command_id: u8, bytes: &[u8]) -> Result<(), TransportError>;

    /// Read `expected_len` bytes from register `command_id` of `device`
    async fn read(
        &mut self,
        device: u8,
        command_id: u8,
        expected_len: usize,
    ) -> Result<Vec<u8>, TransportError>;
}

#[async_trait]
impl<T: BusTransport + ?Sized> BusTransport for Box<T> {
    async fn write(&mut self, device: u8, command_id: u8, bytes: &[u8]) -> Result<(), TransportError> {
        (**self).write(device, command_id, bytes).await
    }

    async fn read(
        &mut self,
        device: u8,
        command_id: u8,
        expected_len: usize,
    ) -> Result<Vec<u8>, TransportError> {
        (**self).read(device, command_id, expected_len).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn test_boxed_transport_forwards_calls() {
        let mut mock = MockBusTransport::new();
        mock.expect_read()
            .with(eq(0x57), eq(0xF0), eq(5))
            .times(1)
            .returning(|_, _, _| Ok(vec![0x00; 5]));
        mock.expect_write()
            .times(1)
            .returning(|_, _, _| Err(TransportError::Busy));

        let mut boxed: Box<dyn BusTransport> = Box::new(mock);

        assert_eq!(boxed.read(0x57, 0xF0, 5).await.unwrap().len(), 5);
        assert_eq!(boxed.write(0x57, 0x01, &[0x5A]).await, Err(TransportError::Busy));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            TransportError::Nack { device: 0x57 }.to_string(),
            "device 0x57 did not acknowledge"
        );
        assert_eq!(
            TransportError::ShortRead { expected: 5, actual: 2 }.to_string(),
            "read returned 2 bytes, expected 5"
        );
    }
}
