//! # File Download
//!
//! Pulls a whole file off the ADCS SD card over the two-wire bus.
//!
//! Files move in blocks of 1024 packets of 20 bytes. For each block:
//! - Stage it with a load-download-block command (file type, file counter, byte offset)
//! - Poll download-block-ready until the device has it buffered
//! - Start a burst and read one download-buffer record per packet
//! - Upload the eight hole maps of packets still missing and burst again, a bounded number of
//!   times
//!
//! The last block is cut to the file size reported by the file list.

use tracing::{debug, info, warn};

use crate::catalog::{tc, tlm};
use crate::codec::files::{
    DownloadBlockReady, DownloadBuffer, DownloadBurst, FileInfo, HoleMap, LoadDownloadBlock,
    DOWNLOAD_PACKET_LEN, HOLE_MAP_PACKETS,
};
use crate::codec::{Decode, Encode};
use crate::driver::FilePolicy;
use crate::error::{AdcsError, Result};
use crate::transaction::Transaction;
use crate::transport::BusTransport;

/// Packets in one download block
pub const BLOCK_PACKETS: usize = 1024;

/// Bytes in one download block
pub const BLOCK_LEN: usize = BLOCK_PACKETS * DOWNLOAD_PACKET_LEN;

const HOLE_MAPS: usize = BLOCK_PACKETS / HOLE_MAP_PACKETS;

/// Received packets of one block, as the eight hole maps the device expects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockMap {
    maps: [HoleMap; HOLE_MAPS],
}

impl BlockMap {
    pub fn mark_received(&mut self, packet: usize) {
        if let Some(map) = self.maps.get_mut(packet / HOLE_MAP_PACKETS) {
            map.mark_received(packet % HOLE_MAP_PACKETS);
        }
    }

    #[must_use]
    pub fn is_received(&self, packet: usize) -> bool {
        self.maps
            .get(packet / HOLE_MAP_PACKETS)
            .is_some_and(|map| map.is_received(packet % HOLE_MAP_PACKETS))
    }

    /// Packets below `required` that have not arrived
    #[must_use]
    pub fn missing(&self, required: usize) -> usize {
        (0..required).filter(|&p| !self.is_received(p)).count()
    }

    /// Hole maps 1 to 8, in upload order
    #[must_use]
    pub fn maps(&self) -> &[HoleMap; HOLE_MAPS] {
        &self.maps
    }
}

/// Blocks needed for a file of `size` bytes
#[must_use]
pub fn block_count(size: u32) -> u32 {
    size.div_ceil(BLOCK_LEN as u32)
}

/// Packets the device sends for `block` of a file of `size` bytes
#[must_use]
pub fn required_packets(size: u32, block: u32) -> usize {
    let remaining = (size as usize).saturating_sub(block as usize * BLOCK_LEN);
    remaining.min(BLOCK_LEN).div_ceil(DOWNLOAD_PACKET_LEN)
}

/// Download the file described by `info`; the file-list pointer need not point at it
pub(crate) async fn download_file<T: BusTransport>(
    tx: &mut Transaction<T>,
    info: &FileInfo,
    policy: &FilePolicy,
) -> Result<Vec<u8>> {
    let file_type = info
        .file_type
        .ok_or_else(|| AdcsError::FileNotFound("end-of-list entry".to_string()))?;
    let blocks = block_count(info.size);

    info!(
        "Downloading ADCS file {:?} #{} ({} bytes, {} blocks)",
        file_type, info.counter, info.size, blocks
    );

    let mut contents = Vec::with_capacity(info.size as usize);
    for block in 0..blocks {
        // The counter names the nth file of this type, not the block
        let request = LoadDownloadBlock {
            file_type,
            counter: info.counter,
            offset: block * BLOCK_LEN as u32,
            block_length: BLOCK_PACKETS as u16,
        };
        let data = download_block(tx, &request, block, required_packets(info.size, block), policy).await?;
        contents.extend_from_slice(&data);
    }

    contents.truncate(info.size as usize);
    info!("Downloaded {} bytes", contents.len());
    Ok(contents)
}

async fn download_block<T: BusTransport>(
    tx: &mut Transaction<T>,
    request: &LoadDownloadBlock,
    block: u32,
    required: usize,
    policy: &FilePolicy,
) -> Result<Vec<u8>> {
    tx.send_command(&tc::LOAD_DOWNLOAD_BLOCK, &request.encode()?).await?;
    wait_block_ready(tx, block, policy.block_ready_polls).await?;

    let mut buffer = vec![0u8; BLOCK_LEN];
    let mut received = BlockMap::default();

    start_burst(tx, true, policy).await?;
    read_packets(tx, required, &mut buffer, &mut received).await?;

    let mut attempts = 0;
    loop {
        let missing = received.missing(required);
        if missing == 0 {
            break;
        }
        if attempts >= policy.hole_map_attempts {
            return Err(AdcsError::DownloadIncomplete { block, missing });
        }
        attempts += 1;

        warn!(
            "Block {} missing {} of {} packets, re-requesting ({}/{})",
            block, missing, required, attempts, policy.hole_map_attempts
        );

        for (entry, map) in tc::SET_HOLE_MAP.iter().zip(received.maps()) {
            tx.send_command(entry, &map.encode()?).await?;
        }
        start_burst(tx, false, policy).await?;
        read_packets(tx, missing, &mut buffer, &mut received).await?;
    }

    buffer.truncate(required * DOWNLOAD_PACKET_LEN);
    debug!("Block {} complete", block);
    Ok(buffer)
}

async fn wait_block_ready<T: BusTransport>(
    tx: &mut Transaction<T>,
    block: u32,
    polls: u32,
) -> Result<DownloadBlockReady> {
    for poll in 1..=polls {
        let ready = DownloadBlockReady::decode(&tx.request_telemetry(&tlm::DOWNLOAD_BLOCK_READY).await?)?;
        if ready.parameter_error {
            return Err(AdcsError::BlockRejected { block });
        }
        if ready.ready {
            debug!("Block {} ready after {} polls ({} bytes)", block, poll, ready.length);
            return Ok(ready);
        }
    }

    Err(AdcsError::BlockNotReady { block, polls })
}

async fn start_burst<T: BusTransport>(
    tx: &mut Transaction<T>,
    ignore_hole_map: bool,
    policy: &FilePolicy,
) -> Result<()> {
    let burst = DownloadBurst { ignore_hole_map };
    tx.send_command(&tc::INITIATE_DOWNLOAD_BURST, &burst.encode()?).await?;
    // The first packet can be garbage if read before the burst is running
    tokio::time::sleep(policy.burst_delay).await;
    Ok(())
}

async fn read_packets<T: BusTransport>(
    tx: &mut Transaction<T>,
    count: usize,
    buffer: &mut [u8],
    received: &mut BlockMap,
) -> Result<()> {
    for _ in 0..count {
        let packet = DownloadBuffer::decode(&tx.request_telemetry(&tlm::DOWNLOAD_BUFFER).await?)?;

        // Counters run on across blocks
        let index = usize::from(packet.packet_counter) % BLOCK_PACKETS;
        let start = index * DOWNLOAD_PACKET_LEN;
        buffer[start..start + DOWNLOAD_PACKET_LEN].copy_from_slice(&packet.data);
        received.mark_received(index);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_arithmetic() {
        assert_eq!(BLOCK_LEN, 20480);
        assert_eq!(block_count(0), 0);
        assert_eq!(block_count(1), 1);
        assert_eq!(block_count(20480), 1);
        assert_eq!(block_count(20481), 2);

        assert_eq!(required_packets(20480, 0), 1024);
        assert_eq!(required_packets(20530, 0), 1024);
        assert_eq!(required_packets(20530, 1), 3);
        assert_eq!(required_packets(19, 0), 1);
    }

    #[test]
    fn test_block_map_splits_into_hole_maps() {
        let mut map = BlockMap::default();
        map.mark_received(0);
        map.mark_received(130);
        map.mark_received(1023);
        map.mark_received(5000);

        assert!(map.is_received(130));
        assert!(!map.is_received(131));
        assert!(!map.is_received(5000));
        assert_eq!(map.missing(4), 3);
        assert_eq!(map.missing(1024), 1021);

        // packet 130 is bit 2 of the first byte of hole map 2
        assert_eq!(map.maps()[1].bits[0], 0x04);
        assert_eq!(map.maps()[7].bits[15], 0x80);
    }
}
