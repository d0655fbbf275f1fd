//! # Transaction Layer
//!
//! Framed command and telemetry exchanges with the ADCS over a [`BusTransport`].
//!
//! This module handles:
//! - Appending and verifying CRC8 checksums
//! - Acknowledgment polling after every telecommand
//! - Resending on device-reported CRC failures and re-reading on corrupt telemetry
//! - Bounding every bus call with the configured timeout
//!
//! ## Command flow
//!
//! ```text
//! write frame ──> Sent ──> Polling{n} ──┬─> processed, flag none/crc ──> settle ──> final ack ──> Acked
//!                   ^                   ├─> flag crc, attempts left ──> resend ─┐
//!                   └───────────────────┼───────────────────────────────────────┘
//!                                       └─> rejection flag / budget spent ──> Failed
//! ```
//!
//! A command that has been written but not driven to a terminal state is an [`Outstanding`]
//! borrow of the transaction. If it is dropped early, the next command first drains its
//! acknowledgment before writing anything.

use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::catalog::{tlm, AckPolicy, CatalogEntry};
use crate::error::{AdcsError, Result};
use crate::protocol::crc::Crc8;
use crate::protocol::frame::{decode_frame, encode_frame, frame_len, Ack, Direction, ErrorFlag, FrameError};
use crate::transport::{BusTransport, TransportError};

/// Default number of attempts for a checksummed exchange
pub const DEFAULT_CHECKSUM_ATTEMPTS: u32 = 100;

/// Default number of acknowledgment polls per command attempt
pub const DEFAULT_ACK_POLL_BUDGET: u32 = 1000;

/// Default bound on a single bus call
pub const DEFAULT_BUS_TIMEOUT: Duration = Duration::from_millis(1000);

/// Default pause between acknowledgment polls
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(10);

/// Retry and timeout bounds for every transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts for a checksummed exchange, first try included
    pub checksum_attempts: u32,
    /// Acknowledgment polls before declaring a processing timeout
    pub ack_poll_budget: u32,
    /// Bound on every single transport call
    pub bus_timeout: Duration,
    /// Pause between polls and before the final acknowledgment read
    pub settle_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            checksum_attempts: DEFAULT_CHECKSUM_ATTEMPTS,
            ack_poll_budget: DEFAULT_ACK_POLL_BUDGET,
            bus_timeout: DEFAULT_BUS_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

/// Why a command transaction failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    Transport,
    Checksum,
    Protocol(ErrorFlag),
    ProcessingTimeout,
    Codec,
}

impl FailureKind {
    fn of(err: &AdcsError) -> Self {
        match err {
            AdcsError::Transport(_) => Self::Transport,
            AdcsError::Checksum { .. } => Self::Checksum,
            AdcsError::Protocol { flag, .. } => Self::Protocol(*flag),
            AdcsError::ProcessingTimeout { .. } => Self::ProcessingTimeout,
            _ => Self::Codec,
        }
    }
}

/// Acknowledgment state of the last telecommand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AckState {
    /// Frame written, no acknowledgment read yet
    Sent,
    /// `polls` acknowledgment reads done for the current attempt
    Polling { polls: u32 },
    /// Device processed the command with this final flag
    Acked(ErrorFlag),
    Failed(FailureKind),
}

impl AckState {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Acked(_) | Self::Failed(_))
    }
}

/// Checksum framing and acknowledgment handling over one bus transport
pub struct Transaction<T> {
    transport: T,
    device: u8,
    crc: Crc8,
    policy: RetryPolicy,
    last: Option<(&'static CatalogEntry, AckState)>,
}

impl<T> std::fmt::Debug for Transaction<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("device", &format_args!("0x{:02X}", self.device))
            .field("policy", &self.policy)
            .field("last", &self.last.map(|(entry, state)| (entry.name, state)))
            .finish_non_exhaustive()
    }
}

impl<T: BusTransport> Transaction<T> {
    /// Create a transaction layer for the device at `device`
    ///
    /// # Arguments
    ///
    /// * `transport` - Bus the device hangs off
    /// * `device` - Seven-bit device address (0x57 for the ADCS)
    /// * `policy` - Retry and timeout bounds
    pub fn new(transport: T, device: u8, policy: RetryPolicy) -> Self {
        Self {
            transport,
            device,
            crc: Crc8::init(),
            policy,
            last: None,
        }
    }

    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Acknowledgment state of the last telecommand, `None` if nothing awaits an acknowledgment
    #[must_use]
    pub fn state(&self) -> Option<AckState> {
        self.last.map(|(_, state)| state)
    }

    /// Give back the transport
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Send a telecommand and drive it to completion
    ///
    /// # Arguments
    ///
    /// * `entry` - Catalog entry of a telecommand
    /// * `payload` - Encoded arguments, exactly `entry.length` bytes
    ///
    /// # Errors
    ///
    /// * `AdcsError::Transport` - the write or an acknowledgment read failed on the bus
    /// * `AdcsError::Protocol` - the device rejected the command
    /// * `AdcsError::ProcessingTimeout` - the device never reported the command processed
    /// * `AdcsError::Checksum` - the device kept reporting CRC failures
    /// * `AdcsError::InvalidArgument` - `entry` is not a telecommand or the payload length is wrong
    pub async fn send_command(&mut self, entry: &'static CatalogEntry, payload: &[u8]) -> Result<()> {
        let outstanding = self.begin_command(entry, payload).await?;

        match entry.ack {
            AckPolicy::FireAndForget => {
                outstanding.forget();
                Ok(())
            }
            AckPolicy::Poll => outstanding.complete().await,
        }
    }

    /// Write a telecommand frame without waiting for its acknowledgment
    ///
    /// A previous command still awaiting its acknowledgment is drained first.
    ///
    /// # Errors
    ///
    /// Same as [`Transaction::send_command`] for the write itself and for draining the
    /// previous command.
    pub async fn begin_command(
        &mut self,
        entry: &'static CatalogEntry,
        payload: &[u8],
    ) -> Result<Outstanding<'_, T>> {
        if entry.direction() != Direction::Command {
            return Err(AdcsError::InvalidArgument(format!(
                "{} ({}) is not a telecommand",
                entry.name, entry.id
            )));
        }
        if payload.len() != entry.length {
            return Err(AdcsError::InvalidArgument(format!(
                "{} takes {} bytes, got {}",
                entry.name,
                entry.length,
                payload.len()
            )));
        }

        if let Some((previous, state)) = self.last {
            if !state.is_terminal() {
                self.drain(previous).await?;
            }
        }

        let frame = encode_frame(payload, entry.checksum, &self.crc);
        debug!("TC {} ({}) -> {:02X?}", entry.name, entry.id, frame.as_ref());

        if let Err(e) = self.bus_write(entry.id.raw(), &frame).await {
            error!("Failed to write {} ({}): {}", entry.name, entry.id, e);
            self.last = Some((entry, AckState::Failed(FailureKind::Transport)));
            return Err(e);
        }
        self.last = Some((entry, AckState::Sent));

        Ok(Outstanding { tx: self, entry, frame, attempts: 1 })
    }

    /// Read one telemetry frame and verify its checksum
    ///
    /// Corrupt frames are re-read up to the checksum attempt budget.
    ///
    /// # Returns
    ///
    /// * `Result<Vec<u8>>` - Payload without the checksum byte, exactly `entry.length` bytes
    ///
    /// # Errors
    ///
    /// * `AdcsError::Transport` - bus failure, or a frame of the wrong size
    /// * `AdcsError::Checksum` - every attempt returned a corrupt frame
    /// * `AdcsError::InvalidArgument` - `entry` is not a telemetry request
    pub async fn request_telemetry(&mut self, entry: &'static CatalogEntry) -> Result<Vec<u8>> {
        if entry.direction() != Direction::Telemetry {
            return Err(AdcsError::InvalidArgument(format!(
                "{} ({}) is not a telemetry request",
                entry.name, entry.id
            )));
        }

        let len = frame_len(entry.length, entry.checksum);
        let attempts = self.policy.checksum_attempts;

        for attempt in 1..=attempts {
            let frame = self.bus_read(entry.id.raw(), len).await?;

            match decode_frame(&frame, entry.length, entry.checksum, &self.crc) {
                Ok(payload) => {
                    debug!("TLM {} ({}) <- {:02X?}", entry.name, entry.id, payload);
                    return Ok(payload.to_vec());
                }
                Err(FrameError::Length { expected, actual }) => {
                    return Err(TransportError::ShortRead { expected, actual }.into());
                }
                Err(e @ FrameError::ChecksumMismatch { .. }) => {
                    warn!("{} ({}): {} (attempt {}/{})", entry.name, entry.id, e, attempt, attempts);
                }
            }
        }

        error!("{} ({}) still corrupt after {} attempts", entry.name, entry.id, attempts);
        Err(AdcsError::Checksum { id: entry.id.raw(), attempts })
    }

    /// Read and decode the acknowledgment frame once
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Transaction::request_telemetry`], or `AdcsError::Codec` for an
    /// unknown error flag.
    pub async fn read_ack(&mut self) -> Result<Ack> {
        let payload = self.request_telemetry(&tlm::ACK).await?;
        Ack::decode(&payload)
    }

    /// Poll until the device reports `entry` processed
    async fn await_processed(&mut self, entry: &'static CatalogEntry) -> Result<Ack> {
        let id = entry.id.raw();
        let budget = self.policy.ack_poll_budget;

        for polls in 1..=budget {
            self.last = Some((entry, AckState::Polling { polls }));

            let ack = self.read_ack().await?;
            if ack.error_flag.is_rejection() {
                return Err(AdcsError::Protocol { id, flag: ack.error_flag, index: ack.error_index });
            }
            if ack.processed {
                return Ok(ack);
            }

            if polls < budget {
                tokio::time::sleep(self.policy.settle_delay).await;
            }
        }

        Err(AdcsError::ProcessingTimeout { id, polls: budget })
    }

    /// Finish the acknowledgment of a command abandoned mid-poll
    async fn drain(&mut self, previous: &'static CatalogEntry) -> Result<()> {
        warn!("{} ({}) still awaiting acknowledgment, draining first", previous.name, previous.id);

        match self.await_processed(previous).await {
            Ok(ack) => {
                self.last = Some((previous, AckState::Acked(ack.error_flag)));
                Ok(())
            }
            // The device finished with the old command; the new one may proceed
            Err(e @ AdcsError::Protocol { .. }) => {
                warn!("Drained {} with rejection: {}", previous.name, e);
                self.last = Some((previous, AckState::Failed(FailureKind::of(&e))));
                Ok(())
            }
            Err(e) => {
                self.last = Some((previous, AckState::Failed(FailureKind::of(&e))));
                Err(e)
            }
        }
    }

    fn timeout_error(&self) -> TransportError {
        TransportError::Timeout {
            timeout_ms: u64::try_from(self.policy.bus_timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    async fn bus_write(&mut self, command_id: u8, frame: &[u8]) -> Result<()> {
        let call = self.transport.write(self.device, command_id, frame);
        match tokio::time::timeout(self.policy.bus_timeout, call).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(self.timeout_error().into()),
        }
    }

    async fn bus_read(&mut self, command_id: u8, len: usize) -> Result<Vec<u8>> {
        let call = self.transport.read(self.device, command_id, len);
        match tokio::time::timeout(self.policy.bus_timeout, call).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(self.timeout_error().into()),
        }
    }
}

/// A telecommand that has been written and still awaits its acknowledgment
///
/// Holds the transaction mutably, so no other exchange can start until it is completed,
/// forgotten or dropped.
#[must_use = "an outstanding command must be completed"]
pub struct Outstanding<'a, T: BusTransport> {
    tx: &'a mut Transaction<T>,
    entry: &'static CatalogEntry,
    frame: Bytes,
    attempts: u32,
}

impl<'a, T: BusTransport> Outstanding<'a, T> {
    #[must_use]
    pub fn entry(&self) -> &'static CatalogEntry {
        self.entry
    }

    #[must_use]
    pub fn state(&self) -> Option<AckState> {
        self.tx.state()
    }

    /// Poll the acknowledgment to a terminal state
    ///
    /// # Errors
    ///
    /// See [`Transaction::send_command`].
    pub async fn complete(mut self) -> Result<()> {
        let result = self.run().await;

        let state = match &result {
            Ok(()) => AckState::Acked(ErrorFlag::None),
            Err(e) => {
                error!("{} ({}) failed: {}", self.entry.name, self.entry.id, e);
                AckState::Failed(FailureKind::of(e))
            }
        };
        self.tx.last = Some((self.entry, state));

        result
    }

    /// Stop tracking the command; used for commands the device cannot acknowledge
    pub fn forget(self) {
        debug!("{} ({}) sent without acknowledgment", self.entry.name, self.entry.id);
        self.tx.last = None;
    }

    async fn run(&mut self) -> Result<()> {
        let id = self.entry.id.raw();
        let max_attempts = self.tx.policy.checksum_attempts;

        loop {
            let ack = self.tx.await_processed(self.entry).await?;
            if ack.error_flag != ErrorFlag::Crc || self.attempts >= max_attempts {
                break;
            }

            self.attempts += 1;
            warn!(
                "Device saw a corrupt {} ({}), resending (attempt {}/{})",
                self.entry.name, self.entry.id, self.attempts, max_attempts
            );
            self.tx.bus_write(id, &self.frame).await?;
            self.tx.last = Some((self.entry, AckState::Sent));
        }

        tokio::time::sleep(self.tx.policy.settle_delay).await;

        let ack = self.tx.read_ack().await?;
        match ack.error_flag {
            ErrorFlag::None => Ok(()),
            ErrorFlag::Crc => Err(AdcsError::Checksum { id, attempts: self.attempts }),
            flag => Err(AdcsError::Protocol { id, flag, index: ack.error_index }),
        }
    }
}
